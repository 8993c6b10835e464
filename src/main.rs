use clap::{Parser, Subcommand, ValueEnum};
use csquare_rs::{
    CsquareError, CsvCsquareConfig, Crs, GeometryFormat, GridRecordsToGeoJson,
    GridRecordsToGeoParquet, aggregate_csv, decode, emit, encode, to_wgs84, validate,
    write_aggregation_csv,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Encode, decode, validate and aggregate c-square grid codes.
#[derive(Debug, Parser)]
#[command(name = "csquare", version)]
struct Args {
    /// Log verbosity: `-v` for "debug", `-vv` for "trace".
    ///
    /// Defaults to "info". `RUST_LOG` takes precedence when set.
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the c-square code of a point.
    Encode {
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        /// Cell size in degrees: 10, 5, 1, 0.5, 0.1, ...
        #[arg(long, short)]
        resolution: f64,
        /// EPSG code of the input coordinates, WGS84 when omitted.
        #[arg(long)]
        epsg: Option<u32>,
    },
    /// Print the limits of a c-square code.
    Decode {
        code: String,
        /// Print the cell polygon instead of its limits.
        #[arg(long, value_enum)]
        geometry: Option<GeometryArg>,
    },
    /// Check a c-square code and print the reason it is rejected, if any.
    Validate { code: String },
    /// Count the points of a CSV file per c-square cell.
    Aggregate {
        input: PathBuf,
        output: PathBuf,
        #[arg(long, short)]
        resolution: f64,
        /// Column holding WKT or GeoJSON point geometry.
        #[arg(long, conflicts_with_all = ["lon_column", "lat_column"], required_unless_present = "lon_column")]
        geometry_column: Option<String>,
        /// Column holding x / longitude values.
        #[arg(long, requires = "lat_column")]
        lon_column: Option<String>,
        /// Column holding y / latitude values.
        #[arg(long, requires = "lon_column")]
        lat_column: Option<String>,
        /// EPSG code of the input coordinates, WGS84 when omitted.
        #[arg(long)]
        epsg: Option<u32>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
        format: OutputFormat,
        /// Add cell polygons to CSV output.
        #[arg(long, value_enum)]
        cell_geometry: Option<GeometryArg>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Csv,
    Geojson,
    Parquet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum GeometryArg {
    Wkt,
    Geojson,
}

impl From<GeometryArg> for GeometryFormat {
    fn from(arg: GeometryArg) -> Self {
        match arg {
            GeometryArg::Wkt => GeometryFormat::Wkt,
            GeometryArg::Geojson => GeometryFormat::GeoJson,
        }
    }
}

fn crs_from_epsg(epsg: Option<u32>) -> Crs {
    epsg.map(Crs::Epsg).unwrap_or_default()
}

fn setup_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<(), CsquareError> {
    let args = Args::parse();
    setup_logging(args.verbose);

    match args.cmd {
        Command::Encode {
            lon,
            lat,
            resolution,
            epsg,
        } => {
            let point = to_wgs84(&(lon, lat), crs_from_epsg(epsg))?;
            println!("{}", encode(&point, resolution)?);
        }
        Command::Decode { code, geometry } => {
            let bounds = decode(&code)?;
            match geometry.map(GeometryFormat::from) {
                Some(GeometryFormat::Wkt) => {
                    use wkt::ToWkt;
                    println!("{}", bounds.to_polygon().wkt_string());
                }
                Some(GeometryFormat::GeoJson) => {
                    println!("{}", geojson::Geometry::from(&bounds.to_polygon()));
                }
                None => println!(
                    "north={} south={} west={} east={}",
                    bounds.north, bounds.south, bounds.west, bounds.east
                ),
            }
        }
        Command::Validate { code } => match validate(&code) {
            Ok(()) => println!("{}", csquare_rs::VALID_CODE_MESSAGE),
            Err(reason) => {
                println!("{}", reason);
                std::process::exit(1);
            }
        },
        Command::Aggregate {
            input,
            output,
            resolution,
            geometry_column,
            lon_column,
            lat_column,
            epsg,
            format,
            cell_geometry,
        } => {
            let config = match (geometry_column, lon_column, lat_column) {
                (Some(column), _, _) => CsvCsquareConfig::new(column, resolution),
                (None, Some(x), Some(y)) => CsvCsquareConfig::from_coords(x, y, resolution),
                _ => {
                    return Err(CsquareError::CsvError(
                        "either --geometry-column or --lon-column and --lat-column are required"
                            .to_string(),
                    ));
                }
            }
            .crs(crs_from_epsg(epsg));

            let result = aggregate_csv(&input, &config)?;
            if result.rejected() > 0 {
                tracing::warn!(rejected = result.rejected(), "points left out of the counts");
            }

            match format {
                OutputFormat::Csv => {
                    write_aggregation_csv(&result, &output, cell_geometry.map(GeometryFormat::from))?
                }
                OutputFormat::Geojson => emit(&result)?.to_geojson_file(&output)?,
                OutputFormat::Parquet => emit(&result)?.to_geoparquet(&output)?,
            }

            info!(
                cells = result.len(),
                points = result.total(),
                output = %output.display(),
                "wrote aggregation"
            );
        }
    }

    Ok(())
}
