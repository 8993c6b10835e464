use crate::emit::GridRecord;
use crate::error::CsquareError;
use crate::index::CSQUARE_CRS;
use arrow_array::{Float64Array, RecordBatch, StringArray, UInt64Array};
use arrow_schema::{DataType, Field, Schema};
use geo::Centroid;
use geoarrow_array::IntoArrow;
use geoarrow_array::array::{PointArray, PolygonArray};
use geoarrow_array::builder::{PointBuilder, PolygonBuilder};
use geoarrow_schema::{Crs, Dimension, Metadata, PointType, PolygonType};
use std::sync::Arc;

fn wgs84_metadata() -> Arc<Metadata> {
    let crs = Crs::from_authority_code(CSQUARE_CRS.to_string());
    Arc::new(Metadata::new(crs, None))
}

/// Trait for converting collections of [`GridRecord`]s to Arrow arrays.
///
/// Implemented for `[GridRecord]` and `Vec<GridRecord>`.
pub trait GridRecordsToArrow {
    /// Converts cell centroids to an Arrow PointArray.
    fn to_arrow_points(&self) -> PointArray;
    /// Converts cell polygons to an Arrow PolygonArray.
    fn to_arrow_polygons(&self) -> PolygonArray;
    /// Converts records to a RecordBatch with csquare_code, resolution, count and geometry.
    fn to_record_batch(&self) -> Result<RecordBatch, CsquareError>;
}

impl GridRecordsToArrow for [GridRecord] {
    fn to_arrow_points(&self) -> PointArray {
        let point = PointType::new(Dimension::XY, wgs84_metadata());
        let mut builder = PointBuilder::with_capacity(point, self.len());

        for record in self {
            builder.push_point(record.geometry.centroid().as_ref());
        }
        builder.finish()
    }

    fn to_arrow_polygons(&self) -> PolygonArray {
        let poly = PolygonType::new(Dimension::XY, wgs84_metadata());
        let polygons: Vec<_> = self.iter().map(|r| r.geometry.clone()).collect();
        PolygonBuilder::from_polygons(&polygons, poly).finish()
    }

    fn to_record_batch(&self) -> Result<RecordBatch, CsquareError> {
        let polygon_array = self.to_arrow_polygons();
        let codes: StringArray = self.iter().map(|r| Some(r.code.as_str())).collect();
        let resolutions: Float64Array = self.iter().map(|r| Some(r.resolution)).collect();
        let counts: UInt64Array = self.iter().map(|r| Some(r.count)).collect();

        let geometry_field = polygon_array.extension_type().to_field("geometry", false);
        let schema = Schema::new(vec![
            Field::new("csquare_code", DataType::Utf8, false),
            Field::new("resolution", DataType::Float64, false),
            Field::new("count", DataType::UInt64, false),
            geometry_field,
        ]);

        RecordBatch::try_new(
            Arc::new(schema),
            vec![
                Arc::new(codes),
                Arc::new(resolutions),
                Arc::new(counts),
                Arc::new(polygon_array.into_arrow()),
            ],
        )
        .map_err(|e| CsquareError::IoError(e.to_string()))
    }
}

impl GridRecordsToArrow for Vec<GridRecord> {
    fn to_arrow_points(&self) -> PointArray {
        self.as_slice().to_arrow_points()
    }

    fn to_arrow_polygons(&self) -> PolygonArray {
        self.as_slice().to_arrow_polygons()
    }

    fn to_record_batch(&self) -> Result<RecordBatch, CsquareError> {
        self.as_slice().to_record_batch()
    }
}
