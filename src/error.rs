use crate::index::InvalidCodeReason;

/// Error type for csquare-rs operations.
#[derive(Debug, Clone, PartialEq)]
pub enum CsquareError {
    /// The resolution is not one of 10, 5, 1, 0.5, 0.1, 0.05, ...
    InvalidResolution(f64),
    /// The c-square code failed validation.
    InvalidCode {
        code: String,
        reason: InvalidCodeReason,
    },
    /// Non-finite or out-of-range longitude/latitude.
    MalformedPoint { lon: f64, lat: f64 },
    /// A grid extent is inverted, non-finite or missing.
    InvalidExtent(String),
    /// Coordinate projection failed (source CRS to WGS84).
    ProjectionError(String),
    /// File I/O or serialization error.
    IoError(String),
    /// CSV parsing or reading error.
    CsvError(String),
    /// Failed to parse geometry from string (GeoJSON or WKT).
    GeometryParseError(String),
}

impl CsquareError {
    pub(crate) fn invalid_code(code: &str, reason: InvalidCodeReason) -> Self {
        CsquareError::InvalidCode {
            code: code.to_string(),
            reason,
        }
    }
}

impl std::fmt::Display for CsquareError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CsquareError::InvalidResolution(r) => write!(
                f,
                "Invalid resolution: {} (expected 10, 5, 1, 0.5, 0.1, 0.05, ...)",
                r
            ),
            CsquareError::InvalidCode { code, reason } => {
                write!(f, "Invalid c-square code '{}': {}", code, reason)
            }
            CsquareError::MalformedPoint { lon, lat } => {
                write!(f, "Malformed point: lon={}, lat={}", lon, lat)
            }
            CsquareError::InvalidExtent(msg) => write!(f, "Invalid extent: {}", msg),
            CsquareError::ProjectionError(msg) => write!(f, "Projection error: {}", msg),
            CsquareError::IoError(msg) => write!(f, "IO error: {}", msg),
            CsquareError::CsvError(msg) => write!(f, "CSV error: {}", msg),
            CsquareError::GeometryParseError(msg) => write!(f, "Geometry parse error: {}", msg),
        }
    }
}

impl std::error::Error for CsquareError {}
