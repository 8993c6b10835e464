pub mod constants;
mod encode;
mod limits;
mod parse;
mod resolution;

pub use constants::{
    CSQUARE_CRS, GLOBAL_QUADRANTS, MAX_CYCLES, MAX_RESOLUTION, MAX_RESOLUTION_DECIMALS,
    TRUNCATION_DECIMALS, VALID_CODE_MESSAGE,
};
pub(crate) use encode::encode_cell;
pub(crate) use limits::cell_contains;
pub use encode::{encode, encode_with, truncation_places};
pub use limits::{CsquareBounds, bounds_of, decode};
pub use parse::{
    Cycle, GlobalQuadrant, InvalidCodeReason, ParsedCsquare, intermediate_quadrant, parse,
    validate, validity_reason,
};
pub use resolution::{Resolution, is_valid_resolution};

pub(crate) fn pow10(exp: u32) -> u128 {
    10u128.pow(exp)
}
