use crate::emit::GridRecord;
use crate::error::CsquareError;
use geojson::feature::Id;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

fn record_to_feature(record: &GridRecord) -> Feature {
    let mut properties = JsonObject::new();
    properties.insert("csquare_code".to_string(), serde_json::json!(record.code));
    properties.insert("resolution".to_string(), serde_json::json!(record.resolution));
    properties.insert("count".to_string(), serde_json::json!(record.count));

    Feature {
        bbox: None,
        geometry: Some(Geometry::from(&record.geometry)),
        id: Some(Id::String(record.code.clone())),
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Conversion of grid records to a GeoJSON FeatureCollection.
///
/// Each feature carries the cell polygon, the code as its id, and
/// `csquare_code`, `resolution` and `count` properties.
pub trait GridRecordsToGeoJson {
    fn to_feature_collection(&self) -> FeatureCollection;
    fn to_geojson_file(&self, path: impl AsRef<Path>) -> Result<(), CsquareError>;
}

impl GridRecordsToGeoJson for [GridRecord] {
    fn to_feature_collection(&self) -> FeatureCollection {
        FeatureCollection {
            bbox: None,
            features: self.iter().map(record_to_feature).collect(),
            foreign_members: None,
        }
    }

    fn to_geojson_file(&self, path: impl AsRef<Path>) -> Result<(), CsquareError> {
        let file = File::create(path).map_err(|e| CsquareError::IoError(e.to_string()))?;
        serde_json::to_writer(BufWriter::new(file), &self.to_feature_collection())
            .map_err(|e| CsquareError::IoError(e.to_string()))
    }
}

impl GridRecordsToGeoJson for Vec<GridRecord> {
    fn to_feature_collection(&self) -> FeatureCollection {
        self.as_slice().to_feature_collection()
    }

    fn to_geojson_file(&self, path: impl AsRef<Path>) -> Result<(), CsquareError> {
        self.as_slice().to_geojson_file(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::emit::emit;
    use geojson::GeoJson;
    use tempfile::tempdir;

    #[test]
    fn test_feature_collection() -> Result<(), CsquareError> {
        let result = aggregate(vec![(0.1, 0.1), (0.2, 0.2), (-12.0, 30.0)], 10.0)?;
        let records = emit(&result)?;
        let fc = records.to_feature_collection();

        assert_eq!(fc.features.len(), 2);
        let first = &fc.features[0];
        assert_eq!(first.id, Some(Id::String("1000".to_string())));
        assert_eq!(first.property("count"), Some(&serde_json::json!(2)));
        assert_eq!(first.property("resolution"), Some(&serde_json::json!(10.0)));
        assert!(first.geometry.is_some());
        Ok(())
    }

    #[test]
    fn test_geojson_file_round_trip() -> Result<(), CsquareError> {
        let result = aggregate(vec![(145.35, -42.85)], 0.5)?;
        let records = emit(&result)?;

        let dir = tempdir().map_err(|e| CsquareError::IoError(e.to_string()))?;
        let path = dir.path().join("cells.geojson");
        records.to_geojson_file(&path)?;

        let text = std::fs::read_to_string(&path).map_err(|e| CsquareError::IoError(e.to_string()))?;
        let parsed: GeoJson = text
            .parse()
            .map_err(|e: geojson::Error| CsquareError::IoError(e.to_string()))?;
        match parsed {
            GeoJson::FeatureCollection(fc) => {
                assert_eq!(fc.features.len(), 1);
                assert_eq!(fc.features[0].id, Some(Id::String("3414:225:3".to_string())));
            }
            _ => panic!("Expected FeatureCollection"),
        }
        Ok(())
    }
}
