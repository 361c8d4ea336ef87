//! `BmiRoms`: the BMI handle over one ROMS dataset.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use ndarray::ArrayD;
use roms_dataset::Catalog;
use tracing::{debug, info, instrument};

use crate::bmi::Bmi;
use crate::config::RomsConfig;
use crate::cursor::TimeCursor;
use crate::error::{BmiError, BmiResult};
use crate::exchange::{flatten_into, gather_into};
use crate::grid::{GridIdentity, GridTable};

pub const COMPONENT_NAME: &str = "ROMS Model Data";

/// Every variable is reported on grid nodes; ROMS staggering is carried
/// by distinct grids instead.
pub const VAR_LOCATION: &str = "node";

pub const GRID_TYPE: &str = "rectilinear";

/// Exchanged values are always widened to `f64`.
pub const EXCHANGE_TYPE: &str = "float64";
const EXCHANGE_ITEMSIZE: usize = std::mem::size_of::<f64>();

/// Everything derived at initialization.
#[derive(Debug)]
struct Session {
    catalog: Catalog,
    names: Vec<String>,
    var_grids: HashMap<String, usize>,
    grids: GridTable,
    cursor: TimeCursor,
    /// Flattened current-step values handed out by `get_value_ref`.
    value_cache: HashMap<String, Vec<f64>>,
}

impl Session {
    fn build(catalog: Catalog) -> BmiResult<Self> {
        let names: Vec<String> = catalog
            .list_variables()?
            .into_iter()
            .map(str::to_string)
            .collect();

        let time_dimension = catalog.time_dimension().to_string();
        let mut grids = GridTable::new();
        let mut var_grids = HashMap::with_capacity(names.len());
        for name in &names {
            let info = catalog.describe_variable(name)?;
            let id = grids.resolve(&catalog, info, &time_dimension)?;
            var_grids.insert(name.clone(), id);
        }

        let cursor = TimeCursor::from_axis(&catalog.time_axis()?)?;

        Ok(Self {
            catalog,
            names,
            var_grids,
            grids,
            cursor,
            value_cache: HashMap::new(),
        })
    }

    fn grid_of(&self, name: &str) -> BmiResult<&GridIdentity> {
        let id = self
            .var_grids
            .get(name)
            .ok_or_else(|| BmiError::UnknownVariable(name.to_string()))?;
        self.grids.get(*id)
    }

    fn current_values(&self, name: &str) -> BmiResult<ArrayD<f64>> {
        Ok(self.catalog.step_values(name, self.cursor.step())?)
    }
}

#[derive(Debug)]
enum State {
    Uninitialized,
    Ready(Box<Session>),
    Finalized,
}

/// BMI handle. Each handle owns its own dataset, grids and time cursor.
#[derive(Debug)]
pub struct BmiRoms {
    state: State,
}

impl Default for BmiRoms {
    fn default() -> Self {
        Self::new()
    }
}

impl BmiRoms {
    pub fn new() -> Self {
        Self {
            state: State::Uninitialized,
        }
    }

    pub fn is_initialized(&self) -> bool {
        matches!(self.state, State::Ready(_))
    }

    /// Initialize from already loaded settings.
    #[instrument(skip(self, config), fields(source = %config.filename))]
    pub fn initialize_with_config(&mut self, config: &RomsConfig) -> BmiResult<()> {
        self.ensure_uninitialized()?;
        config.validate()?;
        let catalog = Catalog::open(&config.source_spec(), config.catalog_options())?;
        self.initialize_from_catalog(catalog)
    }

    /// Initialize over an opened catalog.
    pub fn initialize_from_catalog(&mut self, catalog: Catalog) -> BmiResult<()> {
        self.ensure_uninitialized()?;
        let session = Session::build(catalog)?;

        info!(
            source = %session.catalog.source(),
            variables = session.names.len(),
            grids = session.grids.len(),
            steps = session.cursor.total(),
            "BMI session ready"
        );
        self.state = State::Ready(Box::new(session));
        Ok(())
    }

    /// Calendar of the time coordinate (`"standard"` when undeclared).
    pub fn get_time_calendar(&self) -> BmiResult<&str> {
        Ok(self.session()?.cursor.calendar())
    }

    /// Current model time as a UTC datetime, or `None` when the time
    /// units are not of the `<unit> since <epoch>` form.
    pub fn get_current_datetime(&self) -> BmiResult<Option<DateTime<Utc>>> {
        Ok(self.session()?.cursor.current_datetime())
    }

    /// The underlying catalog, for metadata the BMI contract does not carry.
    pub fn catalog(&self) -> BmiResult<&Catalog> {
        Ok(&self.session()?.catalog)
    }

    fn session(&self) -> BmiResult<&Session> {
        match &self.state {
            State::Ready(session) => Ok(session.as_ref()),
            _ => Err(BmiError::NotInitialized),
        }
    }

    fn session_mut(&mut self) -> BmiResult<&mut Session> {
        match &mut self.state {
            State::Ready(session) => Ok(session.as_mut()),
            _ => Err(BmiError::NotInitialized),
        }
    }

    fn ensure_uninitialized(&self) -> BmiResult<()> {
        match self.state {
            State::Uninitialized => Ok(()),
            State::Ready(_) => Err(BmiError::invalid_state("already initialized")),
            State::Finalized => Err(BmiError::invalid_state(
                "finalized handles cannot be re-initialized",
            )),
        }
    }

    fn grid(&self, grid: usize) -> BmiResult<&GridIdentity> {
        self.session()?.grids.get(grid)
    }
}

impl Bmi for BmiRoms {
    fn initialize(&mut self, config_file: &str) -> BmiResult<()> {
        self.ensure_uninitialized()?;
        let config = if config_file.trim().is_empty() {
            debug!("No configuration file given, reading environment");
            RomsConfig::from_env()?
        } else {
            RomsConfig::load(config_file)?
        };
        self.initialize_with_config(&config)
    }

    fn update(&mut self) -> BmiResult<()> {
        let session = self.session_mut()?;
        let before = session.cursor.step();
        if let Err(e) = session.cursor.advance() {
            debug!(error = %e, "Update rejected");
            return Err(e);
        }
        if session.cursor.step() != before {
            session.value_cache.clear();
        }
        Ok(())
    }

    fn update_until(&mut self, time: f64) -> BmiResult<()> {
        let session = self.session_mut()?;
        let taken = session.cursor.advance_until(time);
        if taken > 0 {
            session.value_cache.clear();
        }
        debug!(
            target_time = time,
            steps = taken,
            current_time = session.cursor.current_time(),
            "Updated until"
        );
        Ok(())
    }

    fn finalize(&mut self) -> BmiResult<()> {
        match std::mem::replace(&mut self.state, State::Finalized) {
            State::Ready(mut session) => {
                session.catalog.close();
                info!(source = %session.catalog.source(), "BMI session finalized");
            }
            State::Uninitialized => debug!("Finalized before initialization"),
            State::Finalized => {}
        }
        Ok(())
    }

    fn get_component_name(&self) -> &str {
        COMPONENT_NAME
    }

    fn get_input_item_count(&self) -> BmiResult<usize> {
        self.session()?;
        Ok(0)
    }

    fn get_output_item_count(&self) -> BmiResult<usize> {
        Ok(self.session()?.names.len())
    }

    fn get_input_var_names(&self) -> BmiResult<Vec<String>> {
        self.session()?;
        Ok(Vec::new())
    }

    fn get_output_var_names(&self) -> BmiResult<Vec<String>> {
        Ok(self.session()?.names.clone())
    }

    fn get_var_grid(&self, name: &str) -> BmiResult<usize> {
        Ok(self.session()?.grid_of(name)?.id)
    }

    fn get_var_type(&self, name: &str) -> BmiResult<&str> {
        self.session()?.grid_of(name)?;
        Ok(EXCHANGE_TYPE)
    }

    fn get_var_units(&self, name: &str) -> BmiResult<&str> {
        let info = self.session()?.catalog.describe_variable(name)?;
        Ok(info.units.as_str())
    }

    fn get_var_itemsize(&self, name: &str) -> BmiResult<usize> {
        self.session()?.grid_of(name)?;
        Ok(EXCHANGE_ITEMSIZE)
    }

    fn get_var_nbytes(&self, name: &str) -> BmiResult<usize> {
        let grid = self.session()?.grid_of(name)?;
        Ok(EXCHANGE_ITEMSIZE * grid.size())
    }

    fn get_var_location(&self, name: &str) -> BmiResult<&str> {
        self.session()?.grid_of(name)?;
        Ok(VAR_LOCATION)
    }

    fn get_current_time(&self) -> BmiResult<f64> {
        Ok(self.session()?.cursor.current_time())
    }

    fn get_start_time(&self) -> BmiResult<f64> {
        Ok(self.session()?.cursor.start())
    }

    fn get_end_time(&self) -> BmiResult<f64> {
        Ok(self.session()?.cursor.end())
    }

    fn get_time_units(&self) -> BmiResult<&str> {
        Ok(self.session()?.cursor.units())
    }

    fn get_time_step(&self) -> BmiResult<f64> {
        Ok(self.session()?.cursor.step_size())
    }

    fn get_value(&self, name: &str, dest: &mut [f64]) -> BmiResult<()> {
        let session = self.session()?;
        let size = session.grid_of(name)?.size();
        if dest.len() != size {
            return Err(BmiError::BufferSizeMismatch {
                expected: size,
                actual: dest.len(),
            });
        }
        let values = session.current_values(name)?;
        flatten_into(&values, dest)
    }

    fn get_value_ref(&mut self, name: &str) -> BmiResult<&[f64]> {
        let session = self.session_mut()?;
        if !session.value_cache.contains_key(name) {
            let values = session.current_values(name)?;
            session
                .value_cache
                .insert(name.to_string(), values.iter().copied().collect());
        }
        session
            .value_cache
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| BmiError::UnknownVariable(name.to_string()))
    }

    fn get_value_at_indices(
        &self,
        name: &str,
        dest: &mut [f64],
        indices: &[usize],
    ) -> BmiResult<()> {
        let session = self.session()?;
        session.grid_of(name)?;
        let values = session.current_values(name)?;
        gather_into(&values, indices, dest)
    }

    fn get_grid_rank(&self, grid: usize) -> BmiResult<usize> {
        Ok(self.grid(grid)?.rank())
    }

    fn get_grid_size(&self, grid: usize) -> BmiResult<usize> {
        Ok(self.grid(grid)?.size())
    }

    fn get_grid_type(&self, grid: usize) -> BmiResult<&str> {
        self.grid(grid)?;
        Ok(GRID_TYPE)
    }

    fn get_grid_shape(&self, grid: usize, shape: &mut [usize]) -> BmiResult<()> {
        copy_exact(&self.grid(grid)?.shape, shape)
    }

    fn get_grid_spacing(&self, grid: usize, spacing: &mut [f64]) -> BmiResult<()> {
        copy_exact(&self.grid(grid)?.spacing, spacing)
    }

    fn get_grid_origin(&self, grid: usize, origin: &mut [f64]) -> BmiResult<()> {
        copy_exact(&self.grid(grid)?.origin, origin)
    }
}

fn copy_exact<T: Copy>(src: &[T], dest: &mut [T]) -> BmiResult<()> {
    if src.len() != dest.len() {
        return Err(BmiError::BufferSizeMismatch {
            expected: src.len(),
            actual: dest.len(),
        });
    }
    dest.copy_from_slice(src);
    Ok(())
}
