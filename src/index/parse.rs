use crate::index::constants::{MAX_CYCLES, VALID_CODE_MESSAGE};

/// Why a c-square code string was rejected.
///
/// The `Display` text is the human-readable reason reported to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidCodeReason {
    /// A character outside `[0-9:*]`, or a non-digit in the initial segment.
    BadCharacter(String),
    /// Fewer than 4 characters.
    Incomplete,
    InitialCycleTooShort,
    InitialCycleTooLong,
    /// Leading digit not in {1, 3, 5, 7}.
    IllegalGlobalQuadrant(char),
    /// Tens of latitude not in [0, 9).
    IllegalLatitude(char),
    /// Tens of longitude not in [0, 18).
    IllegalLongitude(String),
    /// Final single digit in 5-9.
    IllegalFinalQuadrant,
    TrailingColon,
    IncompleteCycle,
    CycleTooLong(String),
    /// Cycle quadrant digit not in {1, 2, 3, 4}.
    IllegalIntermediateQuadrant(String),
    /// Cycle digits disagree with the cycle quadrant digit.
    IllegalTriplet(String),
    TooManyCycles(usize),
}

impl std::fmt::Display for InvalidCodeReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidCodeReason::BadCharacter(code) => write!(f, "bad character found in {}", code),
            InvalidCodeReason::Incomplete => write!(f, "c-square code missing or incomplete"),
            InvalidCodeReason::InitialCycleTooShort => {
                write!(f, "initial cycle contains less than 4 digits")
            }
            InvalidCodeReason::InitialCycleTooLong => {
                write!(f, "initial cycle contains more than 4 digits")
            }
            InvalidCodeReason::IllegalGlobalQuadrant(d) => {
                write!(f, "illegal global quadrant value at {}xxx", d)
            }
            InvalidCodeReason::IllegalLatitude(d) => {
                write!(f, "illegal latitude value at x{}xx", d)
            }
            InvalidCodeReason::IllegalLongitude(dd) => {
                write!(f, "illegal longitude value at xx{}", dd)
            }
            InvalidCodeReason::IllegalFinalQuadrant => {
                write!(f, "illegal final intermediate quadrant value")
            }
            InvalidCodeReason::TrailingColon => write!(f, "code cannot terminate with a colon"),
            InvalidCodeReason::IncompleteCycle => {
                write!(f, "incomplete cycle after colon character")
            }
            InvalidCodeReason::CycleTooLong(head) => {
                write!(f, "cycle :{}... contains more than 3 digits", head)
            }
            InvalidCodeReason::IllegalIntermediateQuadrant(cycle) => {
                write!(f, "illegal intermediate quadrant value at :{}", cycle)
            }
            InvalidCodeReason::IllegalTriplet(cycle) => write!(f, "illegal triplet at :{}", cycle),
            InvalidCodeReason::TooManyCycles(n) => write!(
                f,
                "code has {} cycles, more than the supported {}",
                n, MAX_CYCLES
            ),
        }
    }
}

/// One of the four hemispheric quadrants, split by the equator and the prime meridian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlobalQuadrant {
    NorthEast = 1,
    SouthEast = 3,
    SouthWest = 5,
    NorthWest = 7,
}

impl GlobalQuadrant {
    pub fn from_digit(digit: u8) -> Option<Self> {
        match digit {
            1 => Some(GlobalQuadrant::NorthEast),
            3 => Some(GlobalQuadrant::SouthEast),
            5 => Some(GlobalQuadrant::SouthWest),
            7 => Some(GlobalQuadrant::NorthWest),
            _ => None,
        }
    }

    /// Zero counts as positive on both axes.
    pub fn from_signs(lat_negative: bool, lon_negative: bool) -> Self {
        match (lat_negative, lon_negative) {
            (false, false) => GlobalQuadrant::NorthEast,
            (true, false) => GlobalQuadrant::SouthEast,
            (true, true) => GlobalQuadrant::SouthWest,
            (false, true) => GlobalQuadrant::NorthWest,
        }
    }

    pub fn digit(&self) -> u8 {
        *self as u8
    }

    pub fn lat_negative(&self) -> bool {
        matches!(self, GlobalQuadrant::SouthEast | GlobalQuadrant::SouthWest)
    }

    pub fn lon_negative(&self) -> bool {
        matches!(self, GlobalQuadrant::SouthWest | GlobalQuadrant::NorthWest)
    }
}

/// Intermediate quadrant digit for a pair of decade digits:
/// 1 low/low, 2 low lat/high lon, 3 high lat/low lon, 4 high/high.
pub fn intermediate_quadrant(lat_digit: u8, lon_digit: u8) -> u8 {
    1 + 2 * u8::from(lat_digit >= 5) + u8::from(lon_digit >= 5)
}

/// A 3-digit refinement cycle: intermediate quadrant, latitude digit, longitude digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cycle {
    pub quadrant: u8,
    pub lat: u8,
    pub lon: u8,
}

/// The immutable parsed form of a well-formed c-square code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCsquare {
    pub quadrant: GlobalQuadrant,
    /// Tens of degrees of absolute latitude (0-8)
    pub lat_tens: u8,
    /// Tens of degrees of absolute longitude (0-17)
    pub lon_tens: u8,
    pub cycles: Vec<Cycle>,
    /// Final half-cell digit (1-4), if any
    pub truncation: Option<u8>,
}

impl ParsedCsquare {
    pub fn is_intermediate(&self) -> bool {
        self.truncation.is_some()
    }

    /// Edge length of the cell in decimal degrees.
    pub fn resolution(&self) -> f64 {
        let decade = 10f64.powi(1 - self.cycles.len() as i32);
        if self.is_intermediate() {
            decade / 2.0
        } else {
            decade
        }
    }
}

/// Parses and validates a c-square code in one pass.
///
/// # Example
///
/// ```
/// use csquare_rs::{parse, GlobalQuadrant, InvalidCodeReason};
///
/// let parsed = parse("7304:459").unwrap();
/// assert_eq!(parsed.quadrant, GlobalQuadrant::NorthWest);
/// assert_eq!(parsed.cycles.len(), 1);
///
/// assert_eq!(parse("1000:"), Err(InvalidCodeReason::TrailingColon));
/// ```
pub fn parse(code: &str) -> Result<ParsedCsquare, InvalidCodeReason> {
    if code
        .bytes()
        .any(|b| !(b.is_ascii_digit() || b == b':' || b == b'*'))
    {
        return Err(InvalidCodeReason::BadCharacter(code.to_string()));
    }
    if code.len() < 4 {
        return Err(InvalidCodeReason::Incomplete);
    }

    let first_len = code.find(':').unwrap_or(code.len());
    if first_len < 4 {
        return Err(InvalidCodeReason::InitialCycleTooShort);
    }
    if first_len > 4 {
        return Err(InvalidCodeReason::InitialCycleTooLong);
    }

    let head = &code.as_bytes()[..4];
    if !head.iter().all(u8::is_ascii_digit) {
        return Err(InvalidCodeReason::BadCharacter(code.to_string()));
    }
    let quadrant = GlobalQuadrant::from_digit(head[0] - b'0')
        .ok_or(InvalidCodeReason::IllegalGlobalQuadrant(head[0] as char))?;
    let lat_tens = head[1] - b'0';
    if lat_tens >= 9 {
        return Err(InvalidCodeReason::IllegalLatitude(head[1] as char));
    }
    let lon_tens = (head[2] - b'0') * 10 + (head[3] - b'0');
    if lon_tens >= 18 {
        return Err(InvalidCodeReason::IllegalLongitude(code[2..4].to_string()));
    }

    let mut rest = &code[4..];
    let mut truncation = None;
    if !rest.is_empty() {
        let bytes = rest.as_bytes();
        let n = bytes.len();
        if n >= 2 && bytes[n - 2] == b':' && bytes[n - 1].is_ascii_digit() {
            match bytes[n - 1] {
                b'1'..=b'4' => {
                    truncation = Some(bytes[n - 1] - b'0');
                    rest = &rest[..n - 2];
                }
                b'5'..=b'9' => return Err(InvalidCodeReason::IllegalFinalQuadrant),
                _ => {}
            }
        } else if rest.ends_with(':') {
            return Err(InvalidCodeReason::TrailingColon);
        }
    }

    let mut cycles = Vec::new();
    if !rest.is_empty() {
        // rest starts with the colon closing the initial segment
        for segment in rest[1..].split(':') {
            cycles.push(parse_cycle(segment)?);
        }
    }
    if cycles.len() > MAX_CYCLES {
        return Err(InvalidCodeReason::TooManyCycles(cycles.len()));
    }

    Ok(ParsedCsquare {
        quadrant,
        lat_tens,
        lon_tens,
        cycles,
        truncation,
    })
}

fn parse_cycle(segment: &str) -> Result<Cycle, InvalidCodeReason> {
    if segment.len() < 3 {
        return Err(InvalidCodeReason::IncompleteCycle);
    }
    if segment.len() > 3 {
        return Err(InvalidCodeReason::CycleTooLong(segment[..3].to_string()));
    }

    let bytes = segment.as_bytes();
    let quadrant = match bytes[0] {
        b'1'..=b'4' => bytes[0] - b'0',
        _ => {
            return Err(InvalidCodeReason::IllegalIntermediateQuadrant(
                segment.to_string(),
            ));
        }
    };
    if !bytes[1].is_ascii_digit() || !bytes[2].is_ascii_digit() {
        return Err(InvalidCodeReason::IllegalTriplet(segment.to_string()));
    }
    let lat = bytes[1] - b'0';
    let lon = bytes[2] - b'0';
    if intermediate_quadrant(lat, lon) != quadrant {
        return Err(InvalidCodeReason::IllegalTriplet(segment.to_string()));
    }

    Ok(Cycle { quadrant, lat, lon })
}

/// Checks a c-square code, returning the rejection reason if it is malformed.
pub fn validate(code: &str) -> Result<(), InvalidCodeReason> {
    parse(code).map(|_| ())
}

/// Returns `"Valid c-square code"` or the reason the code was rejected.
pub fn validity_reason(code: &str) -> String {
    match validate(code) {
        Ok(()) => VALID_CODE_MESSAGE.to_string(),
        Err(reason) => reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_initial_segment_only() -> Result<(), InvalidCodeReason> {
        let parsed = parse("1000")?;
        assert_eq!(parsed.quadrant, GlobalQuadrant::NorthEast);
        assert_eq!(parsed.lat_tens, 0);
        assert_eq!(parsed.lon_tens, 0);
        assert!(parsed.cycles.is_empty());
        assert_eq!(parsed.truncation, None);
        assert_eq!(parsed.resolution(), 10.0);
        Ok(())
    }

    #[test]
    fn test_parse_cycles_and_truncation() -> Result<(), InvalidCodeReason> {
        let parsed = parse("3414:227:383:2")?;
        assert_eq!(parsed.quadrant, GlobalQuadrant::SouthEast);
        assert_eq!(parsed.lat_tens, 4);
        assert_eq!(parsed.lon_tens, 14);
        assert_eq!(
            parsed.cycles,
            vec![
                Cycle { quadrant: 2, lat: 2, lon: 7 },
                Cycle { quadrant: 3, lat: 8, lon: 3 },
            ]
        );
        assert_eq!(parsed.truncation, Some(2));
        assert!(parsed.is_intermediate());
        assert!((parsed.resolution() - 0.05).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn test_rejection_table() {
        let cases: Vec<(&str, InvalidCodeReason)> = vec![
            ("1000a", InvalidCodeReason::BadCharacter("1000a".into())),
            ("10 0", InvalidCodeReason::BadCharacter("10 0".into())),
            ("100", InvalidCodeReason::Incomplete),
            ("", InvalidCodeReason::Incomplete),
            ("100:123", InvalidCodeReason::InitialCycleTooShort),
            ("10000:123", InvalidCodeReason::InitialCycleTooLong),
            ("10*0", InvalidCodeReason::BadCharacter("10*0".into())),
            ("2000", InvalidCodeReason::IllegalGlobalQuadrant('2')),
            ("1900", InvalidCodeReason::IllegalLatitude('9')),
            ("1018", InvalidCodeReason::IllegalLongitude("18".into())),
            ("1000:5", InvalidCodeReason::IllegalFinalQuadrant),
            ("1000:9", InvalidCodeReason::IllegalFinalQuadrant),
            ("1000:", InvalidCodeReason::TrailingColon),
            ("1000:100:", InvalidCodeReason::TrailingColon),
            ("1000:12", InvalidCodeReason::IncompleteCycle),
            ("1000::1", InvalidCodeReason::IncompleteCycle),
            ("1000:1000", InvalidCodeReason::CycleTooLong("100".into())),
            ("1000:500", InvalidCodeReason::IllegalIntermediateQuadrant("500".into())),
            ("1000:*00", InvalidCodeReason::IllegalIntermediateQuadrant("*00".into())),
            ("1000:150", InvalidCodeReason::IllegalTriplet("150".into())),
            ("1000:250", InvalidCodeReason::IllegalTriplet("250".into())),
            ("1000:200", InvalidCodeReason::IllegalTriplet("200".into())),
            ("1000:355", InvalidCodeReason::IllegalTriplet("355".into())),
            ("1000:444", InvalidCodeReason::IllegalTriplet("444".into())),
            ("1000:1*0", InvalidCodeReason::IllegalTriplet("1*0".into())),
        ];

        for (code, expected) in cases {
            assert_eq!(validate(code), Err(expected), "code {:?}", code);
        }
    }

    #[test]
    fn test_valid_codes() {
        for code in [
            "1000", "3000", "5000", "7000", "7817", "1000:1", "1000:4", "1000:100",
            "1000:245", "1000:350", "1000:499", "7304:459", "5100:111:227:362:499",
            "1000:100:4",
        ] {
            assert!(validate(code).is_ok(), "{} should be valid", code);
        }
    }

    #[test]
    fn test_too_many_cycles() {
        let code = format!("1000{}", ":100".repeat(MAX_CYCLES + 1));
        assert_eq!(
            validate(&code),
            Err(InvalidCodeReason::TooManyCycles(MAX_CYCLES + 1))
        );
        let code = format!("1000{}", ":100".repeat(MAX_CYCLES));
        assert!(validate(&code).is_ok());
    }

    #[test]
    fn test_validity_reason_messages() {
        assert_eq!(validity_reason("1000:100"), "Valid c-square code");
        assert_eq!(
            validity_reason("2000"),
            "illegal global quadrant value at 2xxx"
        );
        assert_eq!(validity_reason("1000:150"), "illegal triplet at :150");
        assert_eq!(
            validity_reason("1000:1000"),
            "cycle :100... contains more than 3 digits"
        );
        assert_eq!(validity_reason("1018"), "illegal longitude value at xx18");
    }

    #[test]
    fn test_intermediate_quadrant() {
        assert_eq!(intermediate_quadrant(0, 0), 1);
        assert_eq!(intermediate_quadrant(4, 5), 2);
        assert_eq!(intermediate_quadrant(5, 4), 3);
        assert_eq!(intermediate_quadrant(9, 9), 4);
    }

    #[test]
    fn test_global_quadrant_signs() {
        assert_eq!(GlobalQuadrant::from_signs(false, false).digit(), 1);
        assert_eq!(GlobalQuadrant::from_signs(true, false).digit(), 3);
        assert_eq!(GlobalQuadrant::from_signs(true, true).digit(), 5);
        assert_eq!(GlobalQuadrant::from_signs(false, true).digit(), 7);
        assert!(GlobalQuadrant::SouthWest.lat_negative());
        assert!(GlobalQuadrant::SouthWest.lon_negative());
        assert!(!GlobalQuadrant::NorthWest.lat_negative());
    }
}
