//! The dataset catalog: what a dataset contains, independent of exchange.
//!
//! The catalog owns the store handle. It classifies dimensions once at
//! open, builds the output-variable inventory, and answers metadata,
//! coordinate and value queries until [`Catalog::close`] is called.

use ndarray::{ArrayD, Axis};
use tracing::{debug, info, warn};

use crate::dimension::{Dimension, DimensionRole};
use crate::error::{DatasetError, DatasetResult};
use crate::source::SourceSpec;
use crate::store::{DataType, DatasetStore, VariableMeta};

/// Units reported for variables kept without a `units` attribute.
pub const MISSING_UNITS: &str = "N/A";

/// Calendar assumed when the time coordinate declares none.
pub const DEFAULT_CALENDAR: &str = "standard";

/// Inventory options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogOptions {
    /// Keep variables that have no `units` attribute (reported as `"N/A"`).
    pub include_unitless: bool,
}

/// Metadata of one output variable.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableInfo {
    pub name: String,
    pub long_name: Option<String>,
    pub units: String,
    /// Dimension names as declared in the dataset.
    pub dimensions: Vec<String>,
    /// Dimension lengths, same order as `dimensions`.
    pub shape: Vec<usize>,
    /// Native element type.
    pub dtype: DataType,
}

impl VariableInfo {
    pub fn rank(&self) -> usize {
        self.dimensions.len()
    }

    pub fn itemsize(&self) -> usize {
        self.dtype.itemsize()
    }

    /// Total number of elements across all dimensions.
    pub fn size(&self) -> usize {
        self.shape.iter().product()
    }

    /// Native size in bytes across all time steps.
    pub fn nbytes(&self) -> usize {
        self.itemsize() * self.size()
    }

    /// Position of the named dimension, if the variable uses it.
    pub fn axis_of(&self, dimension: &str) -> Option<usize> {
        self.dimensions.iter().position(|d| d == dimension)
    }
}

/// The temporal coordinate of a dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeAxis {
    pub dimension: String,
    /// Raw coordinate values, in `units`.
    pub values: Vec<f64>,
    /// Units string as stored (`"hours since 2017-11-01 00:00:00"`).
    pub units: String,
    pub calendar: String,
}

/// Read-only view over an opened dataset.
pub struct Catalog {
    store: Option<Box<dyn DatasetStore>>,
    source: String,
    dimensions: Vec<Dimension>,
    variables: Vec<VariableMeta>,
    inventory: Vec<VariableInfo>,
    time_dimension: String,
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("source", &self.source)
            .field("open", &self.is_open())
            .field("dimensions", &self.dimensions)
            .field("inventory", &self.inventory.len())
            .field("time_dimension", &self.time_dimension)
            .finish()
    }
}

impl Catalog {
    /// Acquire and open a dataset.
    #[cfg(feature = "netcdf")]
    pub fn open(spec: &SourceSpec, options: CatalogOptions) -> DatasetResult<Self> {
        info!(
            source = %spec.locator,
            download = spec.download,
            "Opening dataset"
        );
        let path = spec.resolve()?;
        let store = crate::native::NetCdfStore::open(&path)?;
        Self::from_store(Box::new(store), spec.locator.to_string(), options)
    }

    /// Acquire and open a dataset.
    ///
    /// Without the `netcdf` feature there is no file backend; this only
    /// validates the source and then fails.
    #[cfg(not(feature = "netcdf"))]
    pub fn open(spec: &SourceSpec, _options: CatalogOptions) -> DatasetResult<Self> {
        info!(
            source = %spec.locator,
            download = spec.download,
            "Opening dataset"
        );
        let path = spec.resolve()?;
        Err(DatasetError::source_unavailable(format!(
            "cannot read {}: built without the `netcdf` feature",
            path.display()
        )))
    }

    /// Build a catalog over an already opened store.
    pub fn from_store(
        store: Box<dyn DatasetStore>,
        source: impl Into<String>,
        options: CatalogOptions,
    ) -> DatasetResult<Self> {
        let source = source.into();
        let dimensions: Vec<Dimension> = store
            .dimensions()
            .into_iter()
            .map(|(name, len)| Dimension::new(name, len))
            .collect();
        let variables = store.variables();

        let mut inventory = Vec::new();
        for meta in &variables {
            match classify_variable(meta, &dimensions, options) {
                Ok(info) => inventory.push(info),
                Err(reason) => debug!(variable = %meta.name, reason = %reason, "Skipping variable"),
            }
        }

        let time_dimension = select_time_dimension(&dimensions, &inventory)?;
        inventory.retain(|info| {
            let foreign_time = info.dimensions.iter().any(|d| {
                d != &time_dimension && DimensionRole::classify(d) == Some(DimensionRole::Time)
            });
            if foreign_time {
                warn!(
                    variable = %info.name,
                    time_dimension = %time_dimension,
                    "Skipping variable on a secondary time dimension"
                );
            }
            !foreign_time
        });

        let has_horizontal = inventory.iter().any(|info| {
            info.dimensions.iter().any(|d| {
                DimensionRole::classify(d)
                    .map(|role| role.is_horizontal())
                    .unwrap_or(false)
            })
        });
        if !has_horizontal {
            return Err(DatasetError::incompatible(
                "no variable uses a recognised horizontal dimension",
            ));
        }

        info!(
            source = %source,
            variables = inventory.len(),
            time_dimension = %time_dimension,
            "Dataset catalog ready"
        );

        Ok(Self {
            store: Some(store),
            source,
            dimensions,
            variables,
            inventory,
            time_dimension,
        })
    }

    /// The locator this catalog was opened from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_open(&self) -> bool {
        self.store.is_some()
    }

    /// Names of output variables, in dataset order.
    pub fn list_variables(&self) -> DatasetResult<Vec<&str>> {
        self.ensure_open()?;
        Ok(self.inventory.iter().map(|v| v.name.as_str()).collect())
    }

    /// Metadata of an output variable.
    pub fn describe_variable(&self, name: &str) -> DatasetResult<&VariableInfo> {
        self.ensure_open()?;
        self.inventory
            .iter()
            .find(|v| v.name == name)
            .ok_or_else(|| DatasetError::UnknownVariable(name.to_string()))
    }

    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    pub fn dimension(&self, name: &str) -> DatasetResult<&Dimension> {
        self.dimensions
            .iter()
            .find(|d| d.name == name)
            .ok_or_else(|| DatasetError::UnknownDimension(name.to_string()))
    }

    /// Name of the temporal dimension.
    pub fn time_dimension(&self) -> &str {
        &self.time_dimension
    }

    /// Coordinate values along a dimension.
    ///
    /// Uses, in order: a 1-D variable named after the dimension; for
    /// `xi_*`/`eta_*` the projected `x_*`/`y_*` field (first row or column);
    /// otherwise the index sequence `0..len`.
    pub fn coordinate_array(&self, dimension: &str) -> DatasetResult<Vec<f64>> {
        let store = self.store()?;
        let dim = self.dimension(dimension)?;

        if let Some(coord) = self.find_meta(dimension) {
            if coord.dimensions.len() == 1 && coord.dimensions[0] == dimension {
                return Ok(store.read_all(dimension)?.iter().copied().collect());
            }
        }

        if let Some(projected) = projected_coordinate_name(dimension) {
            if let Some(coord) = self.find_meta(&projected) {
                if let Some(axis) = coord.dimensions.iter().position(|d| d == dimension) {
                    if coord.dimensions.len() == 2 {
                        let values = store.read_all(&projected)?;
                        let line = values.index_axis(Axis(1 - axis), 0);
                        return Ok(line.iter().copied().collect());
                    }
                }
            }
        }

        Ok((0..dim.len).map(|i| i as f64).collect())
    }

    /// The temporal coordinate with its units and calendar.
    pub fn time_axis(&self) -> DatasetResult<TimeAxis> {
        let values = self.coordinate_array(&self.time_dimension)?;
        let coord = self.find_meta(&self.time_dimension);

        let units = coord
            .and_then(|m| m.text_attr("units"))
            .unwrap_or("")
            .to_string();
        let calendar = coord
            .and_then(|m| m.text_attr("calendar"))
            .unwrap_or(DEFAULT_CALENDAR)
            .to_string();

        Ok(TimeAxis {
            dimension: self.time_dimension.clone(),
            values,
            units,
            calendar,
        })
    }

    /// All values of an output variable, in native shape.
    pub fn raw_values(&self, name: &str) -> DatasetResult<ArrayD<f64>> {
        let store = self.store()?;
        self.describe_variable(name)?;
        store.read_all(name)
    }

    /// Values of an output variable at one time step.
    ///
    /// Variables without a time dimension are returned whole, whatever
    /// `step` is.
    pub fn step_values(&self, name: &str, step: usize) -> DatasetResult<ArrayD<f64>> {
        let store = self.store()?;
        let info = self.describe_variable(name)?;
        match info.axis_of(&self.time_dimension) {
            Some(axis) => store.read_step(name, axis, step),
            None => store.read_all(name),
        }
    }

    /// Release the store. Safe to call more than once.
    pub fn close(&mut self) {
        if self.store.take().is_some() {
            info!(source = %self.source, "Dataset closed");
        }
    }

    fn ensure_open(&self) -> DatasetResult<()> {
        self.store().map(|_| ())
    }

    fn store(&self) -> DatasetResult<&dyn DatasetStore> {
        self.store.as_deref().ok_or(DatasetError::Closed)
    }

    fn find_meta(&self, name: &str) -> Option<&VariableMeta> {
        self.variables.iter().find(|v| v.name == name)
    }
}

/// Decide whether a variable is an output field; `Err` carries the reason.
fn classify_variable(
    meta: &VariableMeta,
    dimensions: &[Dimension],
    options: CatalogOptions,
) -> Result<VariableInfo, String> {
    if !(2..=4).contains(&meta.rank()) {
        return Err(format!("rank {} is not 2, 3 or 4", meta.rank()));
    }
    if meta.dimensions.iter().any(|d| d == &meta.name) {
        return Err("dimension coordinate".to_string());
    }

    let mut shape = Vec::with_capacity(meta.rank());
    let mut spatial = 0;
    for name in &meta.dimensions {
        let dim = dimensions
            .iter()
            .find(|d| &d.name == name)
            .ok_or_else(|| format!("undeclared dimension {}", name))?;
        match dim.role {
            None => return Err(format!("unrecognised dimension {}", name)),
            Some(DimensionRole::Time) => {}
            Some(_) => spatial += 1,
        }
        shape.push(dim.len);
    }
    if spatial == 0 {
        return Err("no spatial dimensions".to_string());
    }

    let units = match meta.text_attr("units") {
        Some(units) => units.to_string(),
        None if options.include_unitless => MISSING_UNITS.to_string(),
        None => {
            warn!(variable = %meta.name, "Variable has no units attribute, not exposed");
            return Err("missing units".to_string());
        }
    };

    Ok(VariableInfo {
        name: meta.name.clone(),
        long_name: meta.text_attr("long_name").map(str::to_string),
        units,
        dimensions: meta.dimensions.clone(),
        shape,
        dtype: meta.dtype,
    })
}

/// Pick the time dimension: the first one used by an output variable,
/// else the first declared.
fn select_time_dimension(
    dimensions: &[Dimension],
    inventory: &[VariableInfo],
) -> DatasetResult<String> {
    let used = inventory
        .iter()
        .flat_map(|info| info.dimensions.iter())
        .find(|d| DimensionRole::classify(d) == Some(DimensionRole::Time));

    let dim = match used {
        Some(name) => dimensions.iter().find(|d| &d.name == name),
        None => dimensions.iter().find(|d| d.is_time()),
    }
    .ok_or_else(|| DatasetError::incompatible("no temporal dimension"))?;

    if dim.len == 0 {
        return Err(DatasetError::incompatible(format!(
            "time dimension {} is empty",
            dim.name
        )));
    }
    Ok(dim.name.clone())
}

/// `xi_rho` -> `x_rho`, `eta_u` -> `y_u`.
fn projected_coordinate_name(dimension: &str) -> Option<String> {
    if let Some(stagger) = dimension.strip_prefix("xi_") {
        Some(format!("x_{}", stagger))
    } else {
        dimension
            .strip_prefix("eta_")
            .map(|stagger| format!("y_{}", stagger))
    }
}
