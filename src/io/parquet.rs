use crate::emit::GridRecord;
use crate::error::CsquareError;
use crate::io::arrow::GridRecordsToArrow;
use arrow_array::RecordBatch;
use geoparquet::writer::{
    GeoParquetRecordBatchEncoder, GeoParquetWriterEncoding, GeoParquetWriterOptionsBuilder,
};
use parquet::arrow::ArrowWriter;
use std::fs::File;
use std::path::Path;

/// Writes a record batch with a GeoArrow geometry column as a GeoParquet file (WKB encoded).
pub fn write_geoparquet(batch: &RecordBatch, path: impl AsRef<Path>) -> Result<(), CsquareError> {
    let schema = batch.schema();

    let options = GeoParquetWriterOptionsBuilder::default()
        .set_encoding(GeoParquetWriterEncoding::WKB)
        .build();

    let mut encoder = GeoParquetRecordBatchEncoder::try_new(&schema, &options)
        .map_err(|e| CsquareError::IoError(e.to_string()))?;

    let file = File::create(path).map_err(|e| CsquareError::IoError(e.to_string()))?;
    let mut writer = ArrowWriter::try_new(file, encoder.target_schema(), None)
        .map_err(|e| CsquareError::IoError(e.to_string()))?;

    let encoded_batch = encoder
        .encode_record_batch(batch)
        .map_err(|e| CsquareError::IoError(e.to_string()))?;

    writer
        .write(&encoded_batch)
        .map_err(|e| CsquareError::IoError(e.to_string()))?;

    let kv_metadata = encoder
        .into_keyvalue()
        .map_err(|e| CsquareError::IoError(e.to_string()))?;

    writer.append_key_value_metadata(kv_metadata);
    writer
        .finish()
        .map_err(|e| CsquareError::IoError(e.to_string()))?;

    Ok(())
}

pub trait GridRecordsToGeoParquet: GridRecordsToArrow {
    fn to_geoparquet(&self, path: impl AsRef<Path>) -> Result<(), CsquareError>;
}

impl GridRecordsToGeoParquet for [GridRecord] {
    fn to_geoparquet(&self, path: impl AsRef<Path>) -> Result<(), CsquareError> {
        let batch = self.to_record_batch()?;
        write_geoparquet(&batch, path)
    }
}

impl GridRecordsToGeoParquet for Vec<GridRecord> {
    fn to_geoparquet(&self, path: impl AsRef<Path>) -> Result<(), CsquareError> {
        self.as_slice().to_geoparquet(path)
    }
}
