use crate::cell::CsquareCell;
use crate::coord::{Coordinate, ScaledDegrees};
use crate::error::CsquareError;
use crate::index::{Resolution, encode_cell, encode_with, pow10, truncation_places};
use geo_types::{Polygon, Rect};

/// Largest number of cells a single grid may hold.
pub const MAX_GRID_CELLS: usize = 10_000_000;

/// All c-square cells of one resolution covering a lon/lat extent.
///
/// Cells are ordered south to north, then west to east.
#[derive(Debug, Clone)]
pub struct CsquareGrid {
    cells: Vec<CsquareCell>,
    resolution: f64,
}

impl CsquareGrid {
    pub fn builder() -> CsquareGridBuilder {
        CsquareGridBuilder::new()
    }

    /// Creates the grid of cells whose interior overlaps the extent.
    ///
    /// # Example
    ///
    /// ```
    /// use csquare_rs::CsquareGrid;
    ///
    /// # fn main() -> Result<(), csquare_rs::CsquareError> {
    /// let grid = CsquareGrid::from_extent(-10.0, -10.0, 10.0, 10.0, 10.0)?;
    /// assert_eq!(grid.len(), 4);
    /// assert_eq!(grid.codes(), vec!["5000", "3000", "7000", "1000"]);
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_extent(
        min_lon: f64,
        min_lat: f64,
        max_lon: f64,
        max_lat: f64,
        resolution: f64,
    ) -> Result<Self, CsquareError> {
        let resolution = Resolution::new(resolution)?;
        let cells = generate_cells_for_extent(min_lon, min_lat, max_lon, max_lat, &resolution)?;
        Ok(Self {
            cells,
            resolution: resolution.value(),
        })
    }

    pub fn from_rect(rect: &Rect<f64>, resolution: f64) -> Result<Self, CsquareError> {
        Self::from_extent(
            rect.min().x,
            rect.min().y,
            rect.max().x,
            rect.max().y,
            resolution,
        )
    }

    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[CsquareCell] {
        &self.cells
    }

    pub fn iter(&self) -> impl Iterator<Item = &CsquareCell> {
        self.cells.iter()
    }

    pub fn codes(&self) -> Vec<&str> {
        self.cells.iter().map(|cell| cell.code.as_str()).collect()
    }

    /// Returns the grid cell a WGS84 point encodes to, if it is part of the grid.
    pub fn get_cell_at(&self, point: &impl Coordinate) -> Option<&CsquareCell> {
        let resolution = Resolution::new(self.resolution).ok()?;
        let code = encode_with(point, &resolution).ok()?;
        self.cells.iter().find(|cell| cell.code == code)
    }

    pub fn to_polygons(&self) -> Vec<Polygon<f64>> {
        self.cells.iter().map(|cell| cell.to_polygon()).collect()
    }

    pub fn filter<F>(&self, predicate: F) -> Vec<&CsquareCell>
    where
        F: Fn(&CsquareCell) -> bool,
    {
        self.cells.iter().filter(|cell| predicate(cell)).collect()
    }
}

#[derive(Debug, Default)]
pub struct CsquareGridBuilder {
    resolution: Option<f64>,
    min_lon: Option<f64>,
    min_lat: Option<f64>,
    max_lon: Option<f64>,
    max_lat: Option<f64>,
}

impl CsquareGridBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolution(mut self, resolution: f64) -> Self {
        self.resolution = Some(resolution);
        self
    }

    pub fn extent(mut self, min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        self.min_lon = Some(min_lon);
        self.min_lat = Some(min_lat);
        self.max_lon = Some(max_lon);
        self.max_lat = Some(max_lat);
        self
    }

    pub fn rect(mut self, rect: &Rect<f64>) -> Self {
        self.min_lon = Some(rect.min().x);
        self.min_lat = Some(rect.min().y);
        self.max_lon = Some(rect.max().x);
        self.max_lat = Some(rect.max().y);
        self
    }

    pub fn build(self) -> Result<CsquareGrid, CsquareError> {
        let resolution = self
            .resolution
            .ok_or_else(|| CsquareError::InvalidExtent("resolution must be set".to_string()))?;
        let missing = || CsquareError::InvalidExtent("extent must be set".to_string());

        CsquareGrid::from_extent(
            self.min_lon.ok_or_else(missing)?,
            self.min_lat.ok_or_else(missing)?,
            self.max_lon.ok_or_else(missing)?,
            self.max_lat.ok_or_else(missing)?,
            resolution,
        )
    }
}

/// Decimal places at which extent limits are read.
const EXTENT_PLACES: u32 = 20;

/// Signed count of `10^-EXTENT_PLACES` degrees.
fn extent_units(value: f64) -> Result<i128, CsquareError> {
    let scaled = ScaledDegrees::truncate(value, EXTENT_PLACES)
        .ok_or_else(|| CsquareError::InvalidExtent(format!("cannot read {} as degrees", value)))?;
    let units = scaled.units as i128;
    Ok(if scaled.negative { -units } else { units })
}

/// Signed cell indices along one axis; cell `k` spans `[k * step, (k + 1) * step]`.
///
/// `min`, `max` and `step` share the same unit.
fn axis_range(min: i128, max: i128, step: i128, cells_per_side: i128) -> (i128, i128) {
    let first = min.div_euclid(step).clamp(-cells_per_side, cells_per_side - 1);
    let ceil = -(-max).div_euclid(step);
    let last = (ceil - 1).clamp(first, cells_per_side - 1);
    (first, last)
}

fn check_extent(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Result<(), CsquareError> {
    let values = [min_lon, min_lat, max_lon, max_lat];
    if values.iter().any(|v| !v.is_finite()) {
        return Err(CsquareError::InvalidExtent(
            "extent values must be finite".to_string(),
        ));
    }
    if min_lon > max_lon || min_lat > max_lat {
        return Err(CsquareError::InvalidExtent(format!(
            "min ({}, {}) is greater than max ({}, {})",
            min_lon, min_lat, max_lon, max_lat
        )));
    }
    if min_lon < -180.0 || max_lon > 180.0 || min_lat < -90.0 || max_lat > 90.0 {
        return Err(CsquareError::InvalidExtent(
            "extent must lie within [-180, 180] x [-90, 90]".to_string(),
        ));
    }
    Ok(())
}

fn generate_cells_for_extent(
    min_lon: f64,
    min_lat: f64,
    max_lon: f64,
    max_lat: f64,
    resolution: &Resolution,
) -> Result<Vec<CsquareCell>, CsquareError> {
    check_extent(min_lon, min_lat, max_lon, max_lat)?;

    let places = truncation_places(resolution);
    let step_units = resolution.step_units(places);
    let lat_cells = (90 * pow10(places) / step_units) as i128;
    let lon_cells = (180 * pow10(places) / step_units) as i128;

    let step = (step_units * pow10(EXTENT_PLACES - places)) as i128;
    let (lat_first, lat_last) = axis_range(
        extent_units(min_lat)?,
        extent_units(max_lat)?,
        step,
        lat_cells,
    );
    let (lon_first, lon_last) = axis_range(
        extent_units(min_lon)?,
        extent_units(max_lon)?,
        step,
        lon_cells,
    );

    let count = (lat_last - lat_first + 1) * (lon_last - lon_first + 1);
    if count > MAX_GRID_CELLS as i128 {
        return Err(CsquareError::InvalidExtent(format!(
            "extent covers {} cells at resolution {}, limit is {}",
            count, resolution, MAX_GRID_CELLS
        )));
    }

    // negative index k maps to absolute index -k - 1 on the negative side
    let absolute = |k: i128| -> (bool, u128) {
        if k < 0 {
            (true, (-k - 1) as u128)
        } else {
            (false, k as u128)
        }
    };

    let mut cells = Vec::with_capacity(count as usize);
    for lat_k in lat_first..=lat_last {
        let (lat_negative, lat_index) = absolute(lat_k);
        for lon_k in lon_first..=lon_last {
            let (lon_negative, lon_index) = absolute(lon_k);
            let code = encode_cell(lat_negative, lat_index, lon_negative, lon_index, resolution);
            cells.push(CsquareCell::from_code(&code)?);
        }
    }

    Ok(cells)
}
