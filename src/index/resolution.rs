use crate::error::CsquareError;
use crate::index::constants::{MAX_RESOLUTION, MAX_RESOLUTION_DECIMALS};
use crate::index::pow10;

/// A validated c-square resolution (cell edge length in decimal degrees).
///
/// Legal values form a decimal halving sequence: 10, 5, 1, 0.5, 0.1, 0.05, ...
/// Internally a resolution is `m * 10^exponent` with `m` either 1 or 5.
///
/// # Example
///
/// ```
/// use csquare_rs::Resolution;
///
/// # fn main() -> Result<(), csquare_rs::CsquareError> {
/// let r = Resolution::new(0.5)?;
/// assert_eq!(r.decimals(), 1);
/// assert_eq!(r.full_cycles(), 1);
/// assert!(r.is_intermediate());
/// assert!(Resolution::new(0.3).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    value: f64,
    exponent: i32,
    half: bool,
}

impl Resolution {
    pub fn new(value: f64) -> Result<Self, CsquareError> {
        let (exponent, half) =
            decimal_step(value).ok_or(CsquareError::InvalidResolution(value))?;
        Ok(Self {
            value,
            exponent,
            half,
        })
    }

    /// Edge length in decimal degrees.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Number of decimal places in the literal resolution (0 for 10, 5 and 1).
    pub fn decimals(&self) -> u32 {
        (-self.exponent).max(0) as u32
    }

    /// Number of 3-digit cycles following the initial 4-character segment.
    pub fn full_cycles(&self) -> usize {
        if self.half {
            (-self.exponent) as usize
        } else {
            (1 - self.exponent) as usize
        }
    }

    /// True for the "5" resolutions, whose codes end with a truncation digit.
    pub fn is_intermediate(&self) -> bool {
        self.half
    }

    /// Edge length expressed in units of `10^-scale` degrees.
    pub(crate) fn step_units(&self, scale: u32) -> u128 {
        let mantissa = if self.half { 5 } else { 1 };
        mantissa * pow10((self.exponent + scale as i32) as u32)
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Returns true if `value` is a legal c-square resolution.
///
/// The check works on the shortest decimal rendering of the value rather than
/// on logarithms, so `0.05` is valid while `0.05000000000000001` is not.
pub fn is_valid_resolution(value: f64) -> bool {
    decimal_step(value).is_some()
}

// (exponent, half) such that value == (half ? 5 : 1) * 10^exponent
fn decimal_step(value: f64) -> Option<(i32, bool)> {
    if !value.is_finite() || value <= 0.0 || value > MAX_RESOLUTION {
        return None;
    }
    if value == MAX_RESOLUTION {
        return Some((1, false));
    }

    let rendered = value.to_string();
    match rendered.as_str() {
        "5" => return Some((0, true)),
        "1" => return Some((0, false)),
        _ => {}
    }

    let fraction = rendered.strip_prefix("0.")?;
    if fraction.len() as u32 > MAX_RESOLUTION_DECIMALS {
        return None;
    }
    let (zeros, last) = fraction.split_at(fraction.len().checked_sub(1)?);
    if !zeros.bytes().all(|b| b == b'0') {
        return None;
    }

    let exponent = -(fraction.len() as i32);
    match last {
        "1" => Some((exponent, false)),
        "5" => Some((exponent, true)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_resolutions() {
        for r in [10.0, 5.0, 1.0, 0.5, 0.1, 0.05, 0.01, 0.005, 0.0001, 0.00005] {
            assert!(is_valid_resolution(r), "{} should be valid", r);
        }
    }

    #[test]
    fn test_invalid_resolutions() {
        for r in [3.0, 7.0, 0.3, 20.0, -1.0, 0.0, 50.0, 2.5, 0.25, 0.15, f64::NAN, f64::INFINITY] {
            assert!(!is_valid_resolution(r), "{} should be invalid", r);
        }
    }

    #[test]
    fn test_float_noise_is_not_a_resolution() {
        // 0.1 * 3 renders as 0.30000000000000004
        assert!(!is_valid_resolution(0.1 * 3.0));
        assert!(!is_valid_resolution(0.05000000000000001));
    }

    #[test]
    fn test_too_fine_resolution_rejected() {
        assert!(is_valid_resolution(1e-12));
        assert!(is_valid_resolution(5e-12));
        assert!(!is_valid_resolution(5e-13));
        assert!(!is_valid_resolution(1e-13));
        assert!(!is_valid_resolution(1e-20));
        assert_eq!(Resolution::new(1e-13), Err(CsquareError::InvalidResolution(1e-13)));
    }

    #[test]
    fn test_cycle_counts() -> Result<(), CsquareError> {
        assert_eq!(Resolution::new(10.0)?.full_cycles(), 0);
        assert_eq!(Resolution::new(5.0)?.full_cycles(), 0);
        assert_eq!(Resolution::new(1.0)?.full_cycles(), 1);
        assert_eq!(Resolution::new(0.5)?.full_cycles(), 1);
        assert_eq!(Resolution::new(0.1)?.full_cycles(), 2);
        assert_eq!(Resolution::new(0.05)?.full_cycles(), 2);
        assert_eq!(Resolution::new(0.001)?.full_cycles(), 4);
        Ok(())
    }

    #[test]
    fn test_decimals_and_step_units() -> Result<(), CsquareError> {
        let ten = Resolution::new(10.0)?;
        assert_eq!(ten.decimals(), 0);
        assert_eq!(ten.step_units(4), 100_000);

        let half = Resolution::new(0.05)?;
        assert_eq!(half.decimals(), 2);
        assert!(half.is_intermediate());
        assert_eq!(half.step_units(4), 500);
        Ok(())
    }

    #[test]
    fn test_invalid_resolution_error() {
        assert_eq!(
            Resolution::new(7.0),
            Err(CsquareError::InvalidResolution(7.0))
        );
    }
}
