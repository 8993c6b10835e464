use crate::coord::{Coordinate, ScaledDegrees, check_lon_lat};
use crate::error::CsquareError;
use crate::index::constants::TRUNCATION_DECIMALS;
use crate::index::parse::{GlobalQuadrant, intermediate_quadrant};
use crate::index::pow10;
use crate::index::resolution::Resolution;

/// Encodes a WGS84 lon/lat coordinate into a c-square code at `resolution`.
///
/// Coordinates are first truncated toward zero (see [`truncation_places`]).
///
/// # Example
///
/// ```
/// use csquare_rs::encode;
///
/// # fn main() -> Result<(), csquare_rs::CsquareError> {
/// assert_eq!(encode(&(0.1, 0.1), 10.0)?, "1000");
/// assert_eq!(encode(&(-49.99999999999994, 35.75000000000006), 1.0)?, "7304:459");
/// # Ok(())
/// # }
/// ```
pub fn encode<C: Coordinate>(coord: &C, resolution: f64) -> Result<String, CsquareError> {
    let resolution = Resolution::new(resolution)?;
    encode_with(coord, &resolution)
}

/// Same as [`encode`] with an already validated resolution.
pub fn encode_with<C: Coordinate>(
    coord: &C,
    resolution: &Resolution,
) -> Result<String, CsquareError> {
    let (lon, lat) = (coord.x(), coord.y());
    check_lon_lat(lon, lat)?;

    let places = truncation_places(resolution);
    let malformed = || CsquareError::MalformedPoint { lon, lat };
    let lat = ScaledDegrees::truncate(lat, places).ok_or_else(malformed)?;
    let lon = ScaledDegrees::truncate(lon, places).ok_or_else(malformed)?;

    Ok(encode_scaled(&lat, &lon, resolution))
}

/// Decimal places coordinates are truncated to before encoding.
///
/// Four places, or as many as the resolution itself carries when it is finer.
pub fn truncation_places(resolution: &Resolution) -> u32 {
    TRUNCATION_DECIMALS.max(resolution.decimals())
}

/// Code of the cell at absolute grid indices counted away from the equator
/// (latitude) and the prime meridian (longitude).
pub(crate) fn encode_cell(
    lat_negative: bool,
    lat_index: u128,
    lon_negative: bool,
    lon_index: u128,
    resolution: &Resolution,
) -> String {
    let places = truncation_places(resolution) + 1;
    let step = resolution.step_units(places);
    let center = |negative: bool, index: u128| ScaledDegrees {
        negative,
        units: index * step + step / 2,
        places,
    };

    encode_scaled(
        &center(lat_negative, lat_index),
        &center(lon_negative, lon_index),
        resolution,
    )
}

fn encode_scaled(lat: &ScaledDegrees, lon: &ScaledDegrees, resolution: &Resolution) -> String {
    let places = lat.places;
    let step = resolution.step_units(places);

    // the poles and the antimeridian fall in the outermost cell
    let lat_units = lat.units.min(90 * pow10(places) - step);
    let lon_units = lon.units.min(180 * pow10(places) - step);

    let digit = |units: u128, exponent: i32| -> u8 {
        ((units / pow10((exponent + places as i32) as u32)) % 10) as u8
    };

    let quadrant = GlobalQuadrant::from_signs(lat.negative, lon.negative);
    let tens = pow10(places + 1);
    let mut code = String::with_capacity(4 + 4 * (resolution.full_cycles() + 1));
    push_digit(&mut code, quadrant.digit());
    push_digit(&mut code, (lat_units / tens) as u8);
    code.push_str(&format!("{:02}", lon_units / tens));

    let cycles = resolution.full_cycles();
    for i in 0..cycles {
        let exponent = -(i as i32);
        let a = digit(lat_units, exponent);
        let b = digit(lon_units, exponent);
        code.push(':');
        push_digit(&mut code, intermediate_quadrant(a, b));
        push_digit(&mut code, a);
        push_digit(&mut code, b);
    }

    if resolution.is_intermediate() {
        let exponent = -(cycles as i32);
        let a = digit(lat_units, exponent);
        let b = digit(lon_units, exponent);
        code.push(':');
        push_digit(&mut code, intermediate_quadrant(a, b));
    }

    code
}

fn push_digit(code: &mut String, d: u8) {
    code.push(char::from(b'0' + d));
}
