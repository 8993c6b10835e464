//! # csquare-rs
//!
//! Encoding, decoding and validation of c-square grid codes, and aggregation
//! of point occurrences into c-square cells.
//!
//! There are currently four main entry points.
//!
//! ### 1. `encode` / `decode` / `validate` - The Code Itself
//!
//! ```
//! use csquare_rs::{decode, encode, validity_reason};
//!
//! # fn main() -> Result<(), csquare_rs::CsquareError> {
//! let code = encode(&(145.35, -42.85), 0.1)?;
//! assert_eq!(code, "3414:225:383");
//!
//! let bounds = decode(&code)?;
//! assert_eq!((bounds.south, bounds.north), (-42.9, -42.8));
//!
//! assert_eq!(validity_reason("3414:225:383"), "Valid c-square code");
//! assert_eq!(validity_reason("3414:"), "code cannot terminate with a colon");
//! # Ok(())
//! # }
//! ```
//!
//! ### 2. `aggregate` - Counting Points per Cell
//!
//! ```
//! use csquare_rs::{aggregate, emit, GridRecordsToArrow};
//!
//! # fn main() -> Result<(), csquare_rs::CsquareError> {
//! let points = vec![(0.1, 0.1), (0.2, 0.2), (9.9, 9.9)];
//! let result = aggregate(points, 10.0)?;
//! assert_eq!(result.get("1000"), Some(3));
//!
//! let records = emit(&result)?;
//! let batch = records.to_record_batch()?;
//! assert_eq!(batch.num_rows(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! ### 3. `CsquareCell` and `CsquareGrid` - Cells and Collections of Cells
//!
//! ```
//! use csquare_rs::{CsquareCell, CsquareGrid};
//! use geo_types::point;
//!
//! # fn main() -> Result<(), csquare_rs::CsquareError> {
//! let cell = CsquareCell::from_wgs84(&(-49.5, 35.5), 1.0)?;
//! let polygon = cell.to_polygon();
//!
//! let grid = CsquareGrid::builder()
//!     .resolution(1.0)
//!     .extent(-52.0, 34.0, -48.0, 38.0)
//!     .build()?;
//!
//! let pt = point! { x: -49.5, y: 35.5 };
//! if let Some(found) = grid.get_cell_at(&pt) {
//!     assert_eq!(found.code, cell.code);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### 4. `CsvToCsquare` / `aggregate_csv` - CSV File Conversion
//!
//! Tag CSV rows holding point geometry (WKT or GeoJSON) with their c-square:
//!
//! ```no_run
//! use csquare_rs::{CsvToCsquare, CsvCsquareConfig, Crs, GeometryFormat};
//!
//! let config = CsvCsquareConfig::new("geometry", 0.5)
//!     .exclude(vec!["Geo Shape".into()])
//!     .crs(Crs::Wgs84)
//!     .with_cell_geometry(GeometryFormat::Wkt);
//!
//! // Using trait method
//! "input.csv".to_csquare_csv("output.csv", &config).unwrap();
//! ```
//!
//! Or aggregate projected coordinates from separate columns:
//!
//! ```no_run
//! use csquare_rs::{CsvCsquareConfig, Crs, aggregate_csv, write_aggregation_csv};
//!
//! let config = CsvCsquareConfig::from_coords("Easting", "Northing", 0.1)
//!     .crs(Crs::Epsg(27700));
//!
//! let result = aggregate_csv("bus_stops.csv", &config).unwrap();
//! write_aggregation_csv(&result, "cells.csv", None).unwrap();
//! ```
//!

pub mod aggregate;
pub mod cell;
pub mod coord;
pub mod emit;
pub mod error;
pub mod geom;
pub mod grid;
pub mod index;
pub mod io;

pub use aggregate::{AggregationResult, CsquareAggregator, aggregate, par_aggregate};
pub use cell::CsquareCell;
pub use coord::{
    Coordinate, Crs, Reprojector, check_lon_lat, to_wgs84, truncate_coordinate, truncate_point,
};
pub use emit::{GridRecord, GridRecordSink, emit, emit_into};
pub use error::CsquareError;
pub use geom::{create_rectangle, parse_points};
pub use grid::{CsquareGrid, CsquareGridBuilder, MAX_GRID_CELLS};
pub use index::{
    CSQUARE_CRS, CsquareBounds, Cycle, GlobalQuadrant, InvalidCodeReason, MAX_CYCLES,
    MAX_RESOLUTION, ParsedCsquare, Resolution, VALID_CODE_MESSAGE, decode, encode, encode_with,
    is_valid_resolution, parse, validate, validity_reason,
};
pub use io::{
    CoordinateSource, CsvCsquareConfig, CsvRecordWriter, CsvToCsquare, GeometryFormat,
    GridRecordsToArrow, GridRecordsToGeoJson, GridRecordsToGeoParquet, aggregate_csv,
    csv_to_csquare_csv, write_aggregation_csv, write_geoparquet,
};

pub use geo_types;
pub use geoarrow_array;
pub use geoarrow_schema;
pub use geoparquet;
