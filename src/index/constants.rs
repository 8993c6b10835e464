/// Coarsest c-square resolution, in decimal degrees
pub const MAX_RESOLUTION: f64 = 10.0;

/// Finest resolution accepted, as a count of decimal places.
///
/// Beyond 12 decimals, cell limits of coordinates near 180 degrees no longer
/// fit the 15-16 significant digits an f64 carries.
pub const MAX_RESOLUTION_DECIMALS: u32 = 12;

/// Decimal places kept when truncating input coordinates
pub const TRUNCATION_DECIMALS: u32 = 4;

/// Longest code accepted by the parser, in 3-digit cycles after the initial segment
pub const MAX_CYCLES: usize = 30;

/// Global quadrant digits: NE, SE, SW, NW
pub const GLOBAL_QUADRANTS: [u8; 4] = [1, 3, 5, 7];

/// CRS of every c-square geometry
pub const CSQUARE_CRS: &str = "EPSG:4326";

/// Message reported by `validity_reason` for a well-formed code
pub const VALID_CODE_MESSAGE: &str = "Valid c-square code";
