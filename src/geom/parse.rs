use crate::error::CsquareError;
use geo_types::{Geometry, Point};
use geojson::GeoJson;
use std::str::FromStr;
use wkt::Wkt;

/// Parses point data held as WKT or GeoJSON.
///
/// GeoJSON is recognised by a leading `{`. A bare geometry or a single feature
/// is accepted; anything other than a point or multipoint is an error.
///
/// # Example
///
/// ```
/// use csquare_rs::parse_points;
///
/// # fn main() -> Result<(), csquare_rs::CsquareError> {
/// assert_eq!(parse_points("POINT(145.35 -42.85)")?.len(), 1);
/// assert_eq!(parse_points(r#"{"type":"MultiPoint","coordinates":[[1,2],[3,4]]}"#)?.len(), 2);
/// # Ok(())
/// # }
/// ```
pub fn parse_points(s: &str) -> Result<Vec<Point<f64>>, CsquareError> {
    let trimmed = s.trim();
    let geometry = if trimmed.starts_with('{') {
        from_geojson(trimmed)?
    } else {
        from_wkt(trimmed)?
    };

    match geometry {
        Geometry::Point(pt) => Ok(vec![pt]),
        Geometry::MultiPoint(mp) => Ok(mp.0),
        _ => Err(parse_error("expected Point or MultiPoint geometry")),
    }
}

fn from_geojson(s: &str) -> Result<Geometry<f64>, CsquareError> {
    let geometry = match s.parse::<GeoJson>().map_err(parse_error)? {
        GeoJson::Geometry(geometry) => geometry,
        GeoJson::Feature(feature) => feature
            .geometry
            .ok_or_else(|| parse_error("feature has no geometry"))?,
        GeoJson::FeatureCollection(_) => {
            return Err(parse_error("expected a geometry or a feature, found a collection"));
        }
    };
    Geometry::try_from(geometry).map_err(parse_error)
}

fn from_wkt(s: &str) -> Result<Geometry<f64>, CsquareError> {
    let wkt = Wkt::<f64>::from_str(s).map_err(parse_error)?;
    wkt.try_into().map_err(|_| parse_error("WKT geometry cannot be converted"))
}

fn parse_error(e: impl ToString) -> CsquareError {
    CsquareError::GeometryParseError(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_geojson_point() -> Result<(), CsquareError> {
        let points = parse_points(r#"{"type":"Point","coordinates":[-0.1,51.5]}"#)?;
        assert_eq!(points, vec![Point::new(-0.1, 51.5)]);
        Ok(())
    }

    #[test]
    fn test_parse_geojson_feature() -> Result<(), CsquareError> {
        let json = r#"{"type":"Feature","properties":{},"geometry":{"type":"Point","coordinates":[12.5,-3.25]}}"#;
        let points = parse_points(json)?;
        assert_eq!(points, vec![Point::new(12.5, -3.25)]);
        Ok(())
    }

    #[test]
    fn test_parse_wkt_point() -> Result<(), CsquareError> {
        let points = parse_points("  POINT(-0.1 51.5) ")?;
        assert_eq!(points, vec![Point::new(-0.1, 51.5)]);
        Ok(())
    }

    #[test]
    fn test_parse_multipoints() -> Result<(), CsquareError> {
        let points = parse_points(r#"{"type":"MultiPoint","coordinates":[[1,2],[3,4]]}"#)?;
        assert_eq!(points, vec![Point::new(1.0, 2.0), Point::new(3.0, 4.0)]);

        let points = parse_points("MULTIPOINT((1 2),(3 4))")?;
        assert_eq!(points.len(), 2);
        Ok(())
    }

    #[test]
    fn test_parse_points_rejects_other_geometries() {
        let result = parse_points("LINESTRING(-0.1 51.5, -0.2 51.6)");
        assert!(matches!(result, Err(CsquareError::GeometryParseError(_))));

        let collection = r#"{"type":"FeatureCollection","features":[]}"#;
        assert!(matches!(
            parse_points(collection),
            Err(CsquareError::GeometryParseError(_))
        ));

        let empty_feature = r#"{"type":"Feature","properties":{},"geometry":null}"#;
        assert!(parse_points(empty_feature).is_err());
    }

    #[test]
    fn test_parse_garbage() {
        assert!(parse_points("not a geometry").is_err());
        assert!(parse_points("{not json").is_err());
    }
}
