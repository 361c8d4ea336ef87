//! Grid identities: variables deduplicated by their spatial dimensions.
//!
//! Two variables share a grid when their non-time dimension names match in
//! order. Ids are handed out in first-seen order and never change for the
//! lifetime of a session.

use std::collections::HashMap;
use std::fmt;

use roms_dataset::{Catalog, VariableInfo};
use tracing::debug;

use crate::error::{BmiError, BmiResult};

/// Ordered non-time dimension names of a variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GridSignature(pub Vec<String>);

impl GridSignature {
    /// Signature of `info`, dropping the time dimension.
    pub fn of(info: &VariableInfo, time_dimension: &str) -> Self {
        Self(
            info.dimensions
                .iter()
                .filter(|d| d.as_str() != time_dimension)
                .cloned()
                .collect(),
        )
    }

    pub fn dimensions(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for GridSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.0.join(", "))
    }
}

/// Geometry of one grid.
///
/// Spacing and origin come from the first two coordinate samples of each
/// dimension; coordinates are assumed uniformly spaced.
#[derive(Debug, Clone, PartialEq)]
pub struct GridIdentity {
    pub id: usize,
    pub signature: GridSignature,
    pub shape: Vec<usize>,
    pub spacing: Vec<f64>,
    pub origin: Vec<f64>,
}

impl GridIdentity {
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Number of nodes.
    pub fn size(&self) -> usize {
        self.shape.iter().product()
    }
}

/// Grid identities keyed by signature, in allocation order.
#[derive(Debug, Default)]
pub struct GridTable {
    grids: Vec<GridIdentity>,
    index: HashMap<GridSignature, usize>,
}

impl GridTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grid id for `info`, allocating and measuring a new grid on first
    /// sight of its signature.
    pub fn resolve(
        &mut self,
        catalog: &Catalog,
        info: &VariableInfo,
        time_dimension: &str,
    ) -> BmiResult<usize> {
        let signature = GridSignature::of(info, time_dimension);
        if let Some(&id) = self.index.get(&signature) {
            return Ok(id);
        }

        let id = self.grids.len();
        let grid = measure(catalog, id, signature)?;
        debug!(
            grid = id,
            signature = %grid.signature,
            shape = ?grid.shape,
            "Allocated grid"
        );
        self.index.insert(grid.signature.clone(), id);
        self.grids.push(grid);
        Ok(id)
    }

    pub fn get(&self, id: usize) -> BmiResult<&GridIdentity> {
        self.grids.get(id).ok_or(BmiError::UnknownGrid(id))
    }

    pub fn len(&self) -> usize {
        self.grids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grids.is_empty()
    }
}

fn measure(catalog: &Catalog, id: usize, signature: GridSignature) -> BmiResult<GridIdentity> {
    let rank = signature.0.len();
    let mut shape = Vec::with_capacity(rank);
    let mut spacing = Vec::with_capacity(rank);
    let mut origin = Vec::with_capacity(rank);

    for name in signature.dimensions() {
        shape.push(catalog.dimension(name)?.len);

        let coords = catalog.coordinate_array(name)?;
        let (first, step) = sample_axis(&coords);
        origin.push(first);
        spacing.push(step);
    }

    Ok(GridIdentity {
        id,
        signature,
        shape,
        spacing,
        origin,
    })
}

/// `(origin, spacing)` from the first two coordinates.
fn sample_axis(coords: &[f64]) -> (f64, f64) {
    match coords {
        [] => (0.0, 0.0),
        [first] => (*first, 0.0),
        [first, second, ..] => (*first, second - first),
    }
}
