use crate::coord::{Coordinate, Crs};
use crate::error::CsquareError;
use crate::index::CSQUARE_CRS;
use geo_types::Point;
use proj::Proj;

/// Converts coordinates from a source CRS into WGS84 lon/lat.
///
/// Holds a single `Proj` instance so a whole stream of points can be
/// converted without rebuilding the transformation. WGS84 input passes
/// through untouched.
pub struct Reprojector {
    proj: Option<Proj>,
}

impl Reprojector {
    pub fn new(source: Crs) -> Result<Self, CsquareError> {
        let proj = match source {
            Crs::Epsg(code) if !source.is_wgs84() => Some(
                Proj::new_known_crs(&format!("EPSG:{}", code), CSQUARE_CRS, None)
                    .map_err(|e| CsquareError::ProjectionError(e.to_string()))?,
            ),
            _ => None,
        };
        Ok(Self { proj })
    }

    pub fn to_wgs84<C: Coordinate>(&self, coord: &C) -> Result<Point<f64>, CsquareError> {
        match &self.proj {
            None => Ok(Point::new(coord.x(), coord.y())),
            Some(proj) => {
                let (lon, lat) = proj
                    .convert((coord.x(), coord.y()))
                    .map_err(|e| CsquareError::ProjectionError(e.to_string()))?;
                Ok(Point::new(lon, lat))
            }
        }
    }
}

/// One-off conversion of a coordinate in `source` to WGS84 lon/lat.
pub fn to_wgs84<C: Coordinate>(coord: &C, source: Crs) -> Result<Point<f64>, CsquareError> {
    Reprojector::new(source)?.to_wgs84(coord)
}
