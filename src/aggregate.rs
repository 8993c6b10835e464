use crate::coord::{Coordinate, ScaledDegrees};
use crate::error::CsquareError;
use crate::index::{Resolution, cell_contains, encode_with, parse, truncation_places};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, trace, warn};

const PAR_CHUNK_SIZE: usize = 4096;

/// Point counts per c-square code at a single resolution.
///
/// Codes are kept in lexicographic order so output is deterministic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationResult {
    resolution: f64,
    counts: BTreeMap<String, u64>,
    rejected: u64,
}

impl AggregationResult {
    pub fn new(resolution: f64) -> Self {
        Self {
            resolution,
            counts: BTreeMap::new(),
            rejected: 0,
        }
    }

    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    /// Count for a code, `None` if no point fell in it.
    pub fn get(&self, code: &str) -> Option<u64> {
        self.counts.get(code).copied()
    }

    pub fn counts(&self) -> &BTreeMap<String, u64> {
        &self.counts
    }

    pub fn into_counts(self) -> BTreeMap<String, u64> {
        self.counts
    }

    /// Iterates `(code, count)` pairs in code order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(code, count)| (code.as_str(), *count))
    }

    /// Number of distinct cells.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Total number of counted points.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Points whose truncated position fell outside the cell their code decodes to.
    ///
    /// Stays zero for well-formed input; a non-zero value means a point was
    /// encoded inconsistently and was left out of the counts.
    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    fn increment(&mut self, code: String) {
        *self.counts.entry(code).or_insert(0) += 1;
    }

    fn merge(mut self, other: AggregationResult) -> Self {
        for (code, count) in other.counts {
            *self.counts.entry(code).or_insert(0) += count;
        }
        self.rejected += other.rejected;
        self
    }
}

/// Incremental aggregator for streaming point sources.
///
/// # Example
///
/// ```
/// use csquare_rs::CsquareAggregator;
///
/// # fn main() -> Result<(), csquare_rs::CsquareError> {
/// let mut aggregator = CsquareAggregator::new(10.0)?;
/// aggregator.push(&(0.1, 0.1))?;
/// aggregator.push(&(9.9, 9.9))?;
///
/// let result = aggregator.finish();
/// assert_eq!(result.get("1000"), Some(2));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CsquareAggregator {
    resolution: Resolution,
    places: u32,
    result: AggregationResult,
}

impl CsquareAggregator {
    pub fn new(resolution: f64) -> Result<Self, CsquareError> {
        Ok(Self::with_resolution(Resolution::new(resolution)?))
    }

    pub fn with_resolution(resolution: Resolution) -> Self {
        Self {
            places: truncation_places(&resolution),
            result: AggregationResult::new(resolution.value()),
            resolution,
        }
    }

    /// Counts a single WGS84 point.
    ///
    /// Fails with [`CsquareError::MalformedPoint`] for non-finite or
    /// out-of-range coordinates.
    pub fn push<C: Coordinate>(&mut self, point: &C) -> Result<(), CsquareError> {
        let code = encode_with(point, &self.resolution)?;
        let parsed = parse(&code).map_err(|reason| CsquareError::invalid_code(&code, reason))?;
        let lon = ScaledDegrees::truncate(point.x(), self.places);
        let lat = ScaledDegrees::truncate(point.y(), self.places);

        match (lon, lat) {
            (Some(lon), Some(lat)) if cell_contains(&parsed, &lon, &lat) => {
                trace!(code = %code, lon = lon.to_f64(), lat = lat.to_f64(), "point counted");
                self.result.increment(code);
            }
            _ => {
                warn!(
                    code = %code,
                    lon = point.x(),
                    lat = point.y(),
                    "point outside its encoded cell, not counted"
                );
                self.result.rejected += 1;
            }
        }
        Ok(())
    }

    pub fn finish(self) -> AggregationResult {
        debug!(
            resolution = self.result.resolution,
            cells = self.result.len(),
            points = self.result.total(),
            rejected = self.result.rejected,
            "aggregation finished"
        );
        self.result
    }
}

/// Counts points per c-square cell in a single pass.
///
/// The first malformed point aborts the whole batch.
///
/// # Example
///
/// ```
/// use csquare_rs::aggregate;
///
/// # fn main() -> Result<(), csquare_rs::CsquareError> {
/// let points = vec![(0.1, 0.1), (0.2, 0.2), (9.9, 9.9)];
/// let result = aggregate(points, 10.0)?;
///
/// assert_eq!(result.len(), 1);
/// assert_eq!(result.get("1000"), Some(3));
/// # Ok(())
/// # }
/// ```
pub fn aggregate<I>(points: I, resolution: f64) -> Result<AggregationResult, CsquareError>
where
    I: IntoIterator,
    I::Item: Coordinate,
{
    let mut aggregator = CsquareAggregator::new(resolution)?;
    for point in points {
        aggregator.push(&point)?;
    }
    Ok(aggregator.finish())
}

/// Parallel version of [`aggregate`] over a slice.
///
/// Chunks are folded independently and their counts summed, which gives the
/// same result as the sequential fold. When several points are malformed,
/// which one is reported is unspecified.
pub fn par_aggregate<C>(points: &[C], resolution: f64) -> Result<AggregationResult, CsquareError>
where
    C: Coordinate + Sync,
{
    let resolution = Resolution::new(resolution)?;

    let result = points
        .par_chunks(PAR_CHUNK_SIZE)
        .map(|chunk| -> Result<AggregationResult, CsquareError> {
            let mut partial = CsquareAggregator::with_resolution(resolution);
            for point in chunk {
                partial.push(point)?;
            }
            Ok(partial.result)
        })
        .try_reduce(
            || AggregationResult::new(resolution.value()),
            |a, b| Ok(a.merge(b)),
        )?;

    debug!(
        resolution = result.resolution,
        cells = result.len(),
        points = result.total(),
        "parallel aggregation finished"
    );
    Ok(result)
}
