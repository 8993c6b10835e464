mod parse;

pub use parse::parse_points;

use geo_types::{Coord, LineString, Polygon};

/// Builds the closed rectangle ring (W,N) -> (W,S) -> (E,S) -> (E,N) -> (W,N).
pub fn create_rectangle(west: f64, south: f64, east: f64, north: f64) -> Polygon<f64> {
    let coords = vec![
        Coord { x: west, y: north },
        Coord { x: west, y: south },
        Coord { x: east, y: south },
        Coord { x: east, y: north },
        Coord { x: west, y: north },
    ];

    Polygon::new(LineString::from(coords), vec![])
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Area;

    #[test]
    fn test_create_rectangle() {
        let rect = create_rectangle(-1.0, -2.0, 3.0, 4.0);
        let exterior = rect.exterior();
        assert_eq!(exterior.coords().count(), 5); // 4 corners + 1 to close
        assert_eq!(exterior.0[0], exterior.0[4]);
        assert!(rect.interiors().is_empty());
        assert!((rect.unsigned_area() - 24.0).abs() < 1e-12);
    }
}
