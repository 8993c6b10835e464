use crate::aggregate::{AggregationResult, CsquareAggregator};
use crate::cell::CsquareCell;
use crate::coord::{Crs, Reprojector};
use crate::emit::{GridRecord, GridRecordSink, emit_into};
use crate::error::CsquareError;
use crate::geom::parse_points;
use geo_types::Point;
use std::collections::HashSet;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

enum SourceIndices {
    Geometry(usize),
    Coordinates { x_idx: usize, y_idx: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryFormat {
    /// Well-Known Text format (e.g., "POLYGON((...))")
    Wkt,
    /// GeoJSON format
    GeoJson,
}

#[derive(Debug, Clone)]
pub enum CoordinateSource {
    /// A single column containing WKT or GeoJSON point geometry
    GeometryColumn(String),
    /// Separate X and Y coordinate columns (e.g., Lon/Lat or Easting/Northing)
    CoordinateColumns { x_column: String, y_column: String },
}

#[derive(Debug, Clone)]
pub struct CsvCsquareConfig {
    pub source: CoordinateSource,
    pub exclude_columns: Vec<String>,
    pub resolution: f64,
    pub crs: Crs,
    pub include_cell_geometry: Option<GeometryFormat>,
}

impl CsvCsquareConfig {
    /// Create config for a CSV with a point geometry column (WKT or GeoJSON).
    ///
    /// # Example
    /// ```
    /// use csquare_rs::CsvCsquareConfig;
    ///
    /// let config = CsvCsquareConfig::new("geometry", 0.5);
    /// ```
    pub fn new(geometry_column: impl Into<String>, resolution: f64) -> Self {
        Self {
            source: CoordinateSource::GeometryColumn(geometry_column.into()),
            exclude_columns: Vec::new(),
            resolution,
            crs: Crs::default(),
            include_cell_geometry: None,
        }
    }

    /// Create config for a CSV with separate X/Y coordinate columns.
    ///
    /// # Example
    /// ```
    /// use csquare_rs::{CsvCsquareConfig, Crs};
    ///
    /// // WGS84 longitude/latitude columns
    /// let config = CsvCsquareConfig::from_coords("Longitude", "Latitude", 1.0);
    ///
    /// // British National Grid easting/northing, reprojected before encoding
    /// let config = CsvCsquareConfig::from_coords("Easting", "Northing", 0.1)
    ///     .crs(Crs::Epsg(27700));
    /// ```
    pub fn from_coords(
        x_column: impl Into<String>,
        y_column: impl Into<String>,
        resolution: f64,
    ) -> Self {
        Self {
            source: CoordinateSource::CoordinateColumns {
                x_column: x_column.into(),
                y_column: y_column.into(),
            },
            exclude_columns: Vec::new(),
            resolution,
            crs: Crs::default(),
            include_cell_geometry: None,
        }
    }

    pub fn exclude(mut self, columns: Vec<String>) -> Self {
        self.exclude_columns = columns;
        self
    }

    pub fn crs(mut self, crs: Crs) -> Self {
        self.crs = crs;
        self
    }

    // Include cell polygon geometry in output.
    pub fn with_cell_geometry(mut self, format: GeometryFormat) -> Self {
        self.include_cell_geometry = Some(format);
        self
    }
}

pub trait CsvToCsquare {
    fn to_csquare_csv(
        &self,
        output_path: impl AsRef<Path>,
        config: &CsvCsquareConfig,
    ) -> Result<(), CsquareError>;
}

impl<P: AsRef<Path>> CsvToCsquare for P {
    fn to_csquare_csv(
        &self,
        output_path: impl AsRef<Path>,
        config: &CsvCsquareConfig,
    ) -> Result<(), CsquareError> {
        csv_to_csquare_csv(self, output_path, config)
    }
}

fn polygon_to_wkt(polygon: &geo_types::Polygon<f64>) -> String {
    use wkt::ToWkt;
    polygon.wkt_string()
}

fn polygon_to_geojson(polygon: &geo_types::Polygon<f64>) -> String {
    let geom = geojson::Geometry::from(polygon);
    geom.to_string()
}

fn format_polygon(polygon: &geo_types::Polygon<f64>, format: GeometryFormat) -> String {
    match format {
        GeometryFormat::Wkt => polygon_to_wkt(polygon),
        GeometryFormat::GeoJson => polygon_to_geojson(polygon),
    }
}

/// An open CSV source with its point columns resolved.
struct PointCsv {
    reader: csv::Reader<File>,
    headers: csv::StringRecord,
    source: SourceIndices,
    source_columns: HashSet<usize>,
    reprojector: Reprojector,
}

impl PointCsv {
    fn open(csv_path: impl AsRef<Path>, config: &CsvCsquareConfig) -> Result<Self, CsquareError> {
        let file = File::open(csv_path).map_err(|e| CsquareError::CsvError(e.to_string()))?;
        let mut reader = csv::Reader::from_reader(file);

        let headers = reader
            .headers()
            .map_err(|e| CsquareError::CsvError(e.to_string()))?
            .clone();

        let find = |label: &str, col: &str| -> Result<usize, CsquareError> {
            if col.is_empty() {
                return Err(CsquareError::CsvError(format!(
                    "{} column name cannot be empty",
                    label
                )));
            }
            headers
                .iter()
                .position(|h| h == col)
                .ok_or_else(|| CsquareError::CsvError(format!("{} column '{}' not found", label, col)))
        };

        let (source, source_columns) = match &config.source {
            CoordinateSource::GeometryColumn(col) => {
                let idx = find("Geometry", col)?;
                (SourceIndices::Geometry(idx), HashSet::from([idx]))
            }
            CoordinateSource::CoordinateColumns { x_column, y_column } => {
                let x_idx = find("X", x_column)?;
                let y_idx = find("Y", y_column)?;
                (
                    SourceIndices::Coordinates { x_idx, y_idx },
                    HashSet::from([x_idx, y_idx]),
                )
            }
        };

        Ok(Self {
            reader,
            headers,
            source,
            source_columns,
            reprojector: Reprojector::new(config.crs)?,
        })
    }

    /// WGS84 points held by one row.
    fn points(
        source: &SourceIndices,
        reprojector: &Reprojector,
        record: &csv::StringRecord,
    ) -> Result<Vec<Point<f64>>, CsquareError> {
        let raw = match source {
            SourceIndices::Geometry(idx) => {
                let geom_str = record.get(*idx).ok_or_else(|| {
                    CsquareError::CsvError(format!("Missing geometry column at index {}", idx))
                })?;
                parse_points(geom_str)?
            }
            SourceIndices::Coordinates { x_idx, y_idx } => {
                let x_str = record
                    .get(*x_idx)
                    .ok_or_else(|| {
                        CsquareError::CsvError(format!("Missing X column at index {}", x_idx))
                    })?
                    .trim();
                let y_str = record
                    .get(*y_idx)
                    .ok_or_else(|| {
                        CsquareError::CsvError(format!("Missing Y column at index {}", y_idx))
                    })?
                    .trim();

                let x: f64 = x_str.parse().map_err(|_| {
                    CsquareError::CsvError(format!("Invalid X coordinate: '{}'", x_str))
                })?;
                let y: f64 = y_str.parse().map_err(|_| {
                    CsquareError::CsvError(format!("Invalid Y coordinate: '{}'", y_str))
                })?;
                vec![Point::new(x, y)]
            }
        };

        raw.iter().map(|p| reprojector.to_wgs84(p)).collect()
    }
}

/// Tags every row of a CSV file with the c-square code of its point(s).
///
/// Streams output to minimize memory usage for large files. Rows holding a
/// MultiPoint produce one output row per point.
///
/// # Example with geometry column (WKT or GeoJSON)
///
/// ```no_run
/// use csquare_rs::{csv_to_csquare_csv, CsvCsquareConfig, Crs};
///
/// let config = CsvCsquareConfig::new("Geo Point", 0.5)
///     .exclude(vec!["Geo Shape".into()])
///     .crs(Crs::Wgs84);
///
/// csv_to_csquare_csv("input.csv", "output.csv", &config).unwrap();
/// ```
///
/// # Example with coordinate columns
///
/// ```no_run
/// use csquare_rs::{csv_to_csquare_csv, CsvCsquareConfig};
///
/// let config = CsvCsquareConfig::from_coords("Longitude", "Latitude", 0.1);
///
/// csv_to_csquare_csv("sightings.csv", "output.csv", &config).unwrap();
/// ```
pub fn csv_to_csquare_csv(
    csv_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &CsvCsquareConfig,
) -> Result<(), CsquareError> {
    let mut input = PointCsv::open(csv_path, config)?;

    let mut exclude_indices = input.source_columns.clone();
    for col_name in &config.exclude_columns {
        if let Some(idx) = input.headers.iter().position(|h| h == col_name) {
            exclude_indices.insert(idx);
        }
    }

    let out_file = File::create(output_path).map_err(|e| CsquareError::IoError(e.to_string()))?;
    let mut writer = csv::Writer::from_writer(out_file);

    let mut header_row: Vec<&str> = vec!["csquare_code"];
    if config.include_cell_geometry.is_some() {
        header_row.push("cell_geometry");
    }
    for (i, h) in input.headers.iter().enumerate() {
        if !exclude_indices.contains(&i) {
            header_row.push(h);
        }
    }
    writer
        .write_record(&header_row)
        .map_err(|e| CsquareError::CsvError(e.to_string()))?;

    let mut rows = 0usize;
    for result in input.reader.records() {
        let record = result.map_err(|e| CsquareError::CsvError(e.to_string()))?;
        let points = PointCsv::points(&input.source, &input.reprojector, &record)?;

        for point in points {
            let cell = CsquareCell::from_wgs84(&point, config.resolution)?;
            let mut row: Vec<String> = vec![cell.code.clone()];

            if let Some(format) = config.include_cell_geometry {
                row.push(format_polygon(&cell.to_polygon(), format));
            }

            for (i, field) in record.iter().enumerate() {
                if !exclude_indices.contains(&i) {
                    row.push(field.to_string());
                }
            }
            writer
                .write_record(&row)
                .map_err(|e| CsquareError::CsvError(e.to_string()))?;
            rows += 1;
        }
    }

    writer
        .flush()
        .map_err(|e| CsquareError::CsvError(e.to_string()))?;

    debug!(rows, resolution = config.resolution, "tagged csv rows with c-square codes");
    Ok(())
}

/// Aggregates the points of a CSV file into per-cell counts.
///
/// Points are reprojected to WGS84 first when the config names another CRS.
/// A single unparseable or out-of-range point fails the whole file.
pub fn aggregate_csv(
    csv_path: impl AsRef<Path>,
    config: &CsvCsquareConfig,
) -> Result<AggregationResult, CsquareError> {
    let mut input = PointCsv::open(csv_path, config)?;
    let mut aggregator = CsquareAggregator::new(config.resolution)?;

    for result in input.reader.records() {
        let record = result.map_err(|e| CsquareError::CsvError(e.to_string()))?;
        for point in PointCsv::points(&input.source, &input.reprojector, &record)? {
            aggregator.push(&point)?;
        }
    }

    let result = aggregator.finish();
    info!(
        cells = result.len(),
        points = result.total(),
        resolution = result.resolution(),
        "aggregated csv points"
    );
    Ok(result)
}

/// Grid record sink writing `csquare_code,resolution,count[,geometry]` rows.
pub struct CsvRecordWriter<W: Write> {
    writer: csv::Writer<W>,
    geometry: Option<GeometryFormat>,
}

impl<W: Write> CsvRecordWriter<W> {
    /// Wraps `inner` and writes the header row.
    pub fn new(inner: W, geometry: Option<GeometryFormat>) -> Result<Self, CsquareError> {
        let mut writer = csv::Writer::from_writer(inner);

        let mut header_row = vec!["csquare_code", "resolution", "count"];
        if geometry.is_some() {
            header_row.push("geometry");
        }
        writer
            .write_record(&header_row)
            .map_err(|e| CsquareError::CsvError(e.to_string()))?;

        Ok(Self { writer, geometry })
    }

    pub fn finish(mut self) -> Result<(), CsquareError> {
        self.writer
            .flush()
            .map_err(|e| CsquareError::CsvError(e.to_string()))
    }
}

impl<W: Write> GridRecordSink for CsvRecordWriter<W> {
    fn accept(&mut self, record: GridRecord) -> Result<(), CsquareError> {
        let mut row = vec![
            record.code,
            record.resolution.to_string(),
            record.count.to_string(),
        ];
        if let Some(format) = self.geometry {
            row.push(format_polygon(&record.geometry, format));
        }
        self.writer
            .write_record(&row)
            .map_err(|e| CsquareError::CsvError(e.to_string()))
    }
}

/// Writes an aggregation result as CSV, one row per cell.
pub fn write_aggregation_csv(
    result: &AggregationResult,
    output_path: impl AsRef<Path>,
    geometry: Option<GeometryFormat>,
) -> Result<(), CsquareError> {
    let out_file = File::create(output_path).map_err(|e| CsquareError::IoError(e.to_string()))?;
    let mut writer = CsvRecordWriter::new(out_file, geometry)?;
    emit_into(result, &mut writer)?;
    writer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use tempfile::tempdir;

    fn write_file(path: &Path, lines: &[&str]) -> Result<(), CsquareError> {
        let mut file = File::create(path).map_err(|e| CsquareError::IoError(e.to_string()))?;
        for line in lines {
            writeln!(file, "{}", line).map_err(|e| CsquareError::IoError(e.to_string()))?;
        }
        Ok(())
    }

    #[test]
    fn test_csv_to_csquare_csv_geojson_column() -> Result<(), CsquareError> {
        let dir = tempdir().map_err(|e| CsquareError::IoError(e.to_string()))?;
        let csv_path = dir.path().join("test.csv");
        let output_path = dir.path().join("output.csv");

        write_file(
            &csv_path,
            &[
                "SPECIES,COUNT,geometry",
                "Thunnus,3,\"{\"\"type\"\":\"\"Point\"\",\"\"coordinates\"\":[145.35,-42.85]}\"",
            ],
        )?;

        let config = CsvCsquareConfig::new("geometry", 0.1).crs(Crs::Wgs84);
        csv_to_csquare_csv(&csv_path, &output_path, &config)?;

        let output =
            std::fs::read_to_string(&output_path).map_err(|e| CsquareError::IoError(e.to_string()))?;
        let mut lines = output.lines();
        assert_eq!(lines.next(), Some("csquare_code,SPECIES,COUNT"));
        assert_eq!(lines.next(), Some("3414:225:383,Thunnus,3"));
        Ok(())
    }

    #[test]
    fn test_csv_wkt_column_with_geometry_output() -> Result<(), CsquareError> {
        let dir = tempdir().map_err(|e| CsquareError::IoError(e.to_string()))?;
        let csv_path = dir.path().join("test.csv");
        let output_path = dir.path().join("output.csv");

        write_file(&csv_path, &["ID,geometry", "1,POINT(-49.5 35.5)"])?;

        let config = CsvCsquareConfig::new("geometry", 1.0).with_cell_geometry(GeometryFormat::Wkt);
        csv_path.to_csquare_csv(&output_path, &config)?;
        assert!(output_path.exists());

        let output =
            std::fs::read_to_string(&output_path).map_err(|e| CsquareError::IoError(e.to_string()))?;
        assert!(output.starts_with("csquare_code,cell_geometry,ID"));
        assert!(output.contains("7304:459"));
        assert!(output.contains("POLYGON"));
        Ok(())
    }

    #[test]
    fn test_csv_from_coords_excludes_source_columns() -> Result<(), CsquareError> {
        let dir = tempdir().map_err(|e| CsquareError::IoError(e.to_string()))?;
        let csv_path = dir.path().join("test.csv");
        let output_path = dir.path().join("output.csv");

        write_file(
            &csv_path,
            &[
                "ID,Longitude,Latitude,Description,Notes",
                "1,-2.58302,51.44827,Bristol Temple Meads,x",
                "2,0.5,0.5,Gulf of Guinea,y",
            ],
        )?;

        let config = CsvCsquareConfig::from_coords("Longitude", "Latitude", 1.0)
            .exclude(vec!["Notes".into()]);
        csv_to_csquare_csv(&csv_path, &output_path, &config)?;

        let output =
            std::fs::read_to_string(&output_path).map_err(|e| CsquareError::IoError(e.to_string()))?;
        assert!(output.starts_with("csquare_code,ID,Description\n"));
        assert!(output.contains("7500:112,1,Bristol Temple Meads"));
        assert!(output.contains("1000:100,2,Gulf of Guinea"));
        assert!(!output.contains("Longitude"));
        assert!(!output.contains("Notes"));
        Ok(())
    }

    #[test]
    fn test_csv_missing_column() -> Result<(), CsquareError> {
        let dir = tempdir().map_err(|e| CsquareError::IoError(e.to_string()))?;
        let csv_path = dir.path().join("test.csv");
        write_file(&csv_path, &["ID,lon,lat", "1,0,0"])?;

        let config = CsvCsquareConfig::from_coords("x", "lat", 1.0);
        let result = aggregate_csv(&csv_path, &config);
        assert!(matches!(result, Err(CsquareError::CsvError(_))));
        Ok(())
    }

    #[test]
    fn test_aggregate_csv_coords() -> Result<(), CsquareError> {
        let dir = tempdir().map_err(|e| CsquareError::IoError(e.to_string()))?;
        let csv_path = dir.path().join("points.csv");
        write_file(
            &csv_path,
            &["lon,lat", "0.1,0.1", "0.2,0.2", "9.9,9.9", "-0.1,-0.1"],
        )?;

        let config = CsvCsquareConfig::from_coords("lon", "lat", 10.0);
        let result = aggregate_csv(&csv_path, &config)?;

        assert_eq!(result.get("1000"), Some(3));
        assert_eq!(result.get("5000"), Some(1));
        Ok(())
    }

    #[test]
    fn test_aggregate_csv_bng_reprojected() -> Result<(), CsquareError> {
        let dir = tempdir().map_err(|e| CsquareError::IoError(e.to_string()))?;
        let csv_path = dir.path().join("stops.csv");
        write_file(
            &csv_path,
            &[
                "StopCode,Easting,Northing",
                "ABC123,359581,172304",
                "DEF456,358500,173100",
            ],
        )?;

        // Bristol, roughly 2.6 W 51.45 N
        let config = CsvCsquareConfig::from_coords("Easting", "Northing", 1.0).crs(Crs::Epsg(27700));
        let result = aggregate_csv(&csv_path, &config)?;
        assert_eq!(result.get("7500:112"), Some(2));
        Ok(())
    }

    #[test]
    fn test_aggregate_csv_rejects_bad_point() -> Result<(), CsquareError> {
        let dir = tempdir().map_err(|e| CsquareError::IoError(e.to_string()))?;
        let csv_path = dir.path().join("points.csv");
        write_file(&csv_path, &["lon,lat", "0.1,0.1", "0.2,95.0"])?;

        let config = CsvCsquareConfig::from_coords("lon", "lat", 1.0);
        let result = aggregate_csv(&csv_path, &config);
        assert!(matches!(result, Err(CsquareError::MalformedPoint { .. })));
        Ok(())
    }

    #[test]
    fn test_write_aggregation_csv() -> Result<(), CsquareError> {
        let dir = tempdir().map_err(|e| CsquareError::IoError(e.to_string()))?;
        let output_path = dir.path().join("cells.csv");

        let result = aggregate(vec![(0.5, 0.5), (0.6, 0.6), (-0.5, -0.5)], 1.0)?;
        write_aggregation_csv(&result, &output_path, None)?;

        let output =
            std::fs::read_to_string(&output_path).map_err(|e| CsquareError::IoError(e.to_string()))?;
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(
            lines,
            vec!["csquare_code,resolution,count", "1000:100,1,2", "5000:100,1,1"]
        );
        Ok(())
    }

    #[test]
    fn test_record_writer_geojson_geometry() -> Result<(), CsquareError> {
        let result = aggregate(vec![(0.5, 0.5)], 10.0)?;
        let mut buffer = Vec::new();
        {
            let mut writer = CsvRecordWriter::new(&mut buffer, Some(GeometryFormat::GeoJson))?;
            emit_into(&result, &mut writer)?;
            writer.finish()?;
        }

        let output = String::from_utf8(buffer).map_err(|e| CsquareError::IoError(e.to_string()))?;
        assert!(output.starts_with("csquare_code,resolution,count,geometry\n"));
        assert!(output.contains("1000,10,1,"));
        assert!(output.contains("Polygon"));
        Ok(())
    }
}
