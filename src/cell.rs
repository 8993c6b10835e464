use crate::coord::{Coordinate, Crs, to_wgs84};
use crate::error::CsquareError;
use crate::index::{CsquareBounds, bounds_of, encode, parse};
use geo::Intersects;
use geo_types::{Coord, Point, Polygon};
use std::str::FromStr;

/// A single c-square grid cell.
///
/// Each `CsquareCell` holds a validated code together with the limits it
/// decodes to. Cells are always derived from their code, never stored apart
/// from it.
///
/// # Example
///
/// ```
/// use csquare_rs::CsquareCell;
///
/// # fn main() -> Result<(), csquare_rs::CsquareError> {
/// // Create from WGS84 lon/lat at 1 degree resolution
/// let cell = CsquareCell::from_wgs84(&(-49.5, 35.5), 1.0)?;
/// assert_eq!(cell.code, "7304:459");
///
/// // Convert the cell to a polygon for GIS operations
/// let polygon = cell.to_polygon();
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CsquareCell {
    /// The c-square code string
    pub code: String,
    /// Signed limits in WGS84 degrees
    pub bounds: CsquareBounds,
    /// Edge length in decimal degrees, implied by the code length
    pub resolution: f64,
    /// True when the code ends with a half-cell truncation digit
    pub is_intermediate: bool,
}

impl CsquareCell {
    /// Create a cell from a c-square code, validating it first.
    ///
    /// # Example
    /// ```
    /// use csquare_rs::CsquareCell;
    ///
    /// # fn main() -> Result<(), csquare_rs::CsquareError> {
    /// let cell = CsquareCell::from_code("1000:4")?;
    /// assert_eq!(cell.resolution, 5.0);
    /// assert!(cell.is_intermediate);
    /// assert!(CsquareCell::from_code("1000:9").is_err());
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_code(code: &str) -> Result<Self, CsquareError> {
        let parsed = parse(code).map_err(|reason| CsquareError::invalid_code(code, reason))?;

        Ok(Self {
            code: code.to_string(),
            bounds: bounds_of(&parsed),
            resolution: parsed.resolution(),
            is_intermediate: parsed.is_intermediate(),
        })
    }

    /// Create the cell containing a WGS84 (lon/lat) coordinate.
    pub fn from_wgs84(coord: &impl Coordinate, resolution: f64) -> Result<Self, CsquareError> {
        let code = encode(coord, resolution)?;
        Self::from_code(&code)
    }

    /// Create the cell containing a coordinate expressed in `crs`.
    ///
    /// Non-WGS84 coordinates are reprojected to EPSG:4326 first.
    pub fn from_crs(
        coord: &impl Coordinate,
        crs: Crs,
        resolution: f64,
    ) -> Result<Self, CsquareError> {
        let wgs84 = to_wgs84(coord, crs)?;
        Self::from_wgs84(&wgs84, resolution)
    }

    pub fn north(&self) -> f64 {
        self.bounds.north
    }

    pub fn south(&self) -> f64 {
        self.bounds.south
    }

    pub fn west(&self) -> f64 {
        self.bounds.west
    }

    pub fn east(&self) -> f64 {
        self.bounds.east
    }

    /// Returns the centroid of the cell as a raw lon/lat coordinate.
    pub fn center(&self) -> Coord<f64> {
        self.bounds.to_rect().center()
    }

    /// Returns the centroid of the cell as a point geometry.
    pub fn to_point(&self) -> Point<f64> {
        Point::from(self.center())
    }

    /// Converts this cell to a rectangular polygon in EPSG:4326.
    pub fn to_polygon(&self) -> Polygon<f64> {
        self.bounds.to_polygon()
    }

    /// True if the coordinate lies inside the cell or on its boundary.
    pub fn contains(&self, coord: &impl Coordinate) -> bool {
        Point::new(coord.x(), coord.y()).intersects(&self.to_polygon())
    }
}

impl FromStr for CsquareCell {
    type Err = CsquareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s)
    }
}

impl std::fmt::Display for CsquareCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code() -> Result<(), CsquareError> {
        let cell = CsquareCell::from_code("7304:459")?;

        assert_eq!(cell.code, "7304:459");
        assert_eq!(cell.resolution, 1.0);
        assert!(!cell.is_intermediate);
        assert_eq!(cell.north(), 36.0);
        assert_eq!(cell.south(), 35.0);
        assert_eq!(cell.west(), -50.0);
        assert_eq!(cell.east(), -49.0);
        Ok(())
    }

    #[test]
    fn test_from_code_invalid() {
        let result = CsquareCell::from_code("7304:45");
        assert!(matches!(result, Err(CsquareError::InvalidCode { .. })));
    }

    #[test]
    fn test_from_wgs84_tuple_and_point() -> Result<(), CsquareError> {
        let from_tuple = CsquareCell::from_wgs84(&(145.35, -42.85), 0.1)?;
        let from_point = CsquareCell::from_wgs84(&Point::new(145.35, -42.85), 0.1)?;

        assert_eq!(from_tuple, from_point);
        assert_eq!(from_tuple.code, "3414:225:383");
        Ok(())
    }

    #[test]
    fn test_same_point_same_cell() -> Result<(), CsquareError> {
        let cell1 = CsquareCell::from_wgs84(&(12.34, 56.78), 0.5)?;
        let cell2 = CsquareCell::from_wgs84(&(12.34, 56.78), 0.5)?;
        assert_eq!(cell1.code, cell2.code);

        // The cell center maps back to the same cell
        let cell3 = CsquareCell::from_wgs84(&cell1.to_point(), 0.5)?;
        assert_eq!(cell1.code, cell3.code);
        Ok(())
    }

    #[test]
    fn test_from_crs_web_mercator() -> Result<(), CsquareError> {
        // 1 degree east of the origin in EPSG:3857
        let cell = CsquareCell::from_crs(&(111319.49079327357, 1000.0), Crs::Epsg(3857), 1.0)?;
        assert!(cell.code.starts_with("1000:"));
        Ok(())
    }

    #[test]
    fn test_center_and_point() -> Result<(), CsquareError> {
        let cell: CsquareCell = "1000:4".parse()?;
        assert_eq!(cell.center(), Coord { x: 7.5, y: 7.5 });
        assert_eq!(cell.to_point(), Point::new(7.5, 7.5));
        Ok(())
    }

    #[test]
    fn test_contains_includes_boundary() -> Result<(), CsquareError> {
        let cell = CsquareCell::from_code("1000")?;
        assert!(cell.contains(&(0.0, 0.0)));
        assert!(cell.contains(&(10.0, 10.0)));
        assert!(cell.contains(&(5.0, 5.0)));
        assert!(!cell.contains(&(10.1, 5.0)));
        Ok(())
    }

    #[test]
    fn test_polygon_has_five_coords() -> Result<(), CsquareError> {
        let cell = CsquareCell::from_code("5817:499:4")?;
        let polygon = cell.to_polygon();
        assert_eq!(polygon.exterior().coords().count(), 5);
        assert_eq!(cell.to_string(), "5817:499:4");
        Ok(())
    }
}
