use crate::aggregate::AggregationResult;
use crate::error::CsquareError;
use crate::index::decode;
use geo_types::Polygon;
use serde::Serialize;

/// One aggregated cell: its polygon in EPSG:4326, code, resolution and count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridRecord {
    #[serde(skip)]
    pub geometry: Polygon<f64>,
    pub code: String,
    pub resolution: f64,
    pub count: u64,
}

impl GridRecord {
    /// Builds the record for a code, decoding its polygon.
    pub fn new(code: &str, resolution: f64, count: u64) -> Result<Self, CsquareError> {
        Ok(Self {
            geometry: decode(code)?.to_polygon(),
            code: code.to_string(),
            resolution,
            count,
        })
    }
}

/// Destination for emitted grid records.
pub trait GridRecordSink {
    fn accept(&mut self, record: GridRecord) -> Result<(), CsquareError>;
}

impl GridRecordSink for Vec<GridRecord> {
    fn accept(&mut self, record: GridRecord) -> Result<(), CsquareError> {
        self.push(record);
        Ok(())
    }
}

/// Turns an aggregation result into one record per distinct code, in code order.
///
/// # Example
///
/// ```
/// use csquare_rs::{aggregate, emit};
///
/// # fn main() -> Result<(), csquare_rs::CsquareError> {
/// let result = aggregate(vec![(0.1, 0.1), (0.2, 0.2), (9.9, 9.9)], 10.0)?;
/// let records = emit(&result)?;
///
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].code, "1000");
/// assert_eq!(records[0].count, 3);
/// # Ok(())
/// # }
/// ```
pub fn emit(result: &AggregationResult) -> Result<Vec<GridRecord>, CsquareError> {
    let mut records = Vec::with_capacity(result.len());
    emit_into(result, &mut records)?;
    Ok(records)
}

/// Pushes one record per distinct code into `sink`.
pub fn emit_into<S>(result: &AggregationResult, sink: &mut S) -> Result<(), CsquareError>
where
    S: GridRecordSink + ?Sized,
{
    for (code, count) in result.iter() {
        sink.accept(GridRecord::new(code, result.resolution(), count)?)?;
    }
    Ok(())
}
