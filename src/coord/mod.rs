mod reproject;

pub use reproject::{Reprojector, to_wgs84};

use crate::error::CsquareError;
use crate::index::pow10;
use geo_types::Point;

/// Trait for types that can provide x/y coordinates.
///
/// Implemented for `(f64, f64)` tuples and `geo_types::Point<f64>`.
/// For WGS84 input, x is the longitude and y the latitude.
pub trait Coordinate {
    /// Returns the x-coordinate (longitude).
    fn x(&self) -> f64;
    /// Returns the y-coordinate (latitude).
    fn y(&self) -> f64;
}

impl Coordinate for (f64, f64) {
    fn x(&self) -> f64 {
        self.0
    }
    fn y(&self) -> f64 {
        self.1
    }
}

impl Coordinate for Point<f64> {
    fn x(&self) -> f64 {
        Point::x(*self)
    }
    fn y(&self) -> f64 {
        Point::y(*self)
    }
}

impl<C: Coordinate> Coordinate for &C {
    fn x(&self) -> f64 {
        (*self).x()
    }
    fn y(&self) -> f64 {
        (*self).y()
    }
}

/// Coordinate reference system of input point data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Crs {
    /// WGS84 (EPSG:4326) - longitude/latitude coordinates
    #[default]
    Wgs84,
    /// Any other EPSG code, reprojected to WGS84 before encoding
    Epsg(u32),
}

impl Crs {
    pub fn is_wgs84(&self) -> bool {
        matches!(self, Crs::Wgs84 | Crs::Epsg(4326))
    }
}

/// Rejects non-finite coordinates and anything outside [-180, 180] x [-90, 90].
pub fn check_lon_lat(lon: f64, lat: f64) -> Result<(), CsquareError> {
    if !lon.is_finite() || !lat.is_finite() || lon.abs() > 180.0 || lat.abs() > 90.0 {
        return Err(CsquareError::MalformedPoint { lon, lat });
    }
    Ok(())
}

/// A coordinate value truncated toward zero, held as an unsigned count of
/// `10^-places` degrees plus a sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ScaledDegrees {
    pub negative: bool,
    pub units: u128,
    pub places: u32,
}

impl ScaledDegrees {
    /// Truncates `value` toward zero at `places` decimals.
    ///
    /// Works on the shortest decimal rendering of the f64, so binary noise such
    /// as `35.75000000000006` truncates to `35.75` rather than something below it.
    pub fn truncate(value: f64, places: u32) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        let rendered = value.abs().to_string();
        let (int_part, frac_part) = rendered.split_once('.').unwrap_or((rendered.as_str(), ""));

        let int_units: u128 = int_part.parse().ok()?;
        let mut frac_units: u128 = 0;
        let mut digits = frac_part.bytes();
        for _ in 0..places {
            let d = match digits.next() {
                Some(b) if b.is_ascii_digit() => (b - b'0') as u128,
                Some(_) => return None,
                None => 0,
            };
            frac_units = frac_units * 10 + d;
        }

        let units = int_units.checked_mul(pow10(places))?.checked_add(frac_units)?;
        Some(Self {
            negative: value < 0.0 && units > 0,
            units,
            places,
        })
    }

    pub fn to_f64(&self) -> f64 {
        let magnitude = self.units as f64 / pow10(self.places) as f64;
        if self.negative { -magnitude } else { magnitude }
    }
}

/// Truncates a coordinate toward zero at `places` decimal places.
///
/// # Example
///
/// ```
/// use csquare_rs::truncate_coordinate;
///
/// assert_eq!(truncate_coordinate(-49.99999999999994, 4), -49.9999);
/// assert_eq!(truncate_coordinate(35.75000000000006, 4), 35.75);
/// ```
pub fn truncate_coordinate(value: f64, places: u32) -> f64 {
    ScaledDegrees::truncate(value, places)
        .map(|s| s.to_f64())
        .unwrap_or(value)
}

/// Truncates both axes of a point toward zero at `places` decimal places.
pub fn truncate_point<C: Coordinate>(coord: &C, places: u32) -> Point<f64> {
    Point::new(
        truncate_coordinate(coord.x(), places),
        truncate_coordinate(coord.y(), places),
    )
}
