use crate::coord::ScaledDegrees;
use crate::error::CsquareError;
use crate::geom::create_rectangle;
use crate::index::parse::{ParsedCsquare, parse};
use crate::index::pow10;
use geo::Intersects;
use geo_types::{Point, Polygon, Rect, coord};

/// Geographic limits of a c-square cell, in signed decimal degrees.
///
/// Always `north >= south` and `east >= west`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CsquareBounds {
    pub north: f64,
    pub south: f64,
    pub west: f64,
    pub east: f64,
}

impl CsquareBounds {
    pub fn to_rect(&self) -> Rect<f64> {
        Rect::new(
            coord! { x: self.west, y: self.south },
            coord! { x: self.east, y: self.north },
        )
    }

    /// Closed ring (W,N) -> (W,S) -> (E,S) -> (E,N) -> (W,N).
    pub fn to_polygon(&self) -> Polygon<f64> {
        create_rectangle(self.west, self.south, self.east, self.north)
    }

    pub fn center(&self) -> Point<f64> {
        Point::from(self.to_rect().center())
    }

    /// True if the point lies inside the cell or on its boundary.
    pub fn contains(&self, point: &Point<f64>) -> bool {
        point.intersects(&self.to_polygon())
    }
}

/// Decodes a c-square code into its geographic limits.
///
/// # Example
///
/// ```
/// use csquare_rs::decode;
///
/// # fn main() -> Result<(), csquare_rs::CsquareError> {
/// let bounds = decode("7304:459")?;
/// assert_eq!(bounds.north, 36.0);
/// assert_eq!(bounds.south, 35.0);
/// assert_eq!(bounds.west, -50.0);
/// assert_eq!(bounds.east, -49.0);
/// # Ok(())
/// # }
/// ```
pub fn decode(code: &str) -> Result<CsquareBounds, CsquareError> {
    let parsed = parse(code).map_err(|reason| CsquareError::invalid_code(code, reason))?;
    Ok(bounds_of(&parsed))
}

/// Computes the limits of an already parsed code.
///
/// Sums are done in integer units of `10^-(cycles + 1)` degrees, in which the
/// last full decade always spans 100 units.
pub fn bounds_of(parsed: &ParsedCsquare) -> CsquareBounds {
    let cell = CellUnits::of(parsed);

    let divisor = pow10(cell.scale) as f64;
    let lat_lo = cell.start_lat as f64 / divisor;
    let lat_hi = (cell.start_lat + cell.size) as f64 / divisor;
    let lon_lo = cell.start_lon as f64 / divisor;
    let lon_hi = (cell.start_lon + cell.size) as f64 / divisor;

    let (south, north) = if cell.lat_negative {
        (negate(lat_hi), negate(lat_lo))
    } else {
        (lat_lo, lat_hi)
    };
    let (west, east) = if cell.lon_negative {
        (negate(lon_hi), negate(lon_lo))
    } else {
        (lon_lo, lon_hi)
    };

    CsquareBounds {
        north,
        south,
        west,
        east,
    }
}

/// Cell limits as unsigned counts of `10^-scale` degrees away from the
/// equator and the prime meridian.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CellUnits {
    pub lat_negative: bool,
    pub lon_negative: bool,
    pub start_lat: u128,
    pub start_lon: u128,
    pub size: u128,
    pub scale: u32,
}

impl CellUnits {
    pub fn of(parsed: &ParsedCsquare) -> Self {
        let depth = parsed.cycles.len() as u32;
        let mut weight = pow10(depth + 2);
        let mut start_lat = parsed.lat_tens as u128 * weight;
        let mut start_lon = parsed.lon_tens as u128 * weight;

        for cycle in &parsed.cycles {
            weight /= 10;
            start_lat += cycle.lat as u128 * weight;
            start_lon += cycle.lon as u128 * weight;
        }

        let mut size = weight;
        if let Some(t) = parsed.truncation {
            size /= 2;
            if t == 3 || t == 4 {
                start_lat += size;
            }
            if t == 2 || t == 4 {
                start_lon += size;
            }
        }

        Self {
            lat_negative: parsed.quadrant.lat_negative(),
            lon_negative: parsed.quadrant.lon_negative(),
            start_lat,
            start_lon,
            size,
            scale: depth + 1,
        }
    }

    /// Boundary-inclusive containment of a truncated coordinate, without
    /// going through f64.
    pub fn contains(&self, lon: &ScaledDegrees, lat: &ScaledDegrees) -> bool {
        self.axis_contains(self.lat_negative, self.start_lat, lat)
            && self.axis_contains(self.lon_negative, self.start_lon, lon)
    }

    fn axis_contains(&self, negative: bool, start: u128, value: &ScaledDegrees) -> bool {
        // zero sits on the edge of both hemispheres
        if value.units != 0 && value.negative != negative {
            return false;
        }
        let common = self.scale.max(value.places);
        let cell_factor = pow10(common - self.scale);
        let value_units = value.units * pow10(common - value.places);
        start * cell_factor <= value_units && value_units <= (start + self.size) * cell_factor
    }
}

/// True if the truncated coordinate lies inside the cell of `parsed` or on
/// its boundary.
pub(crate) fn cell_contains(
    parsed: &ParsedCsquare,
    lon: &ScaledDegrees,
    lat: &ScaledDegrees,
) -> bool {
    CellUnits::of(parsed).contains(lon, lat)
}

// no -0.0 on the equator or the prime meridian
fn negate(v: f64) -> f64 {
    0.0 - v
}
