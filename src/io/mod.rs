pub mod arrow;
pub mod csv;
pub mod features;
pub mod parquet;

pub use arrow::GridRecordsToArrow;
pub use csv::{
    CoordinateSource, CsvCsquareConfig, CsvRecordWriter, CsvToCsquare, GeometryFormat,
    aggregate_csv, csv_to_csquare_csv, write_aggregation_csv,
};
pub use features::GridRecordsToGeoJson;
pub use parquet::{GridRecordsToGeoParquet, write_geoparquet};
