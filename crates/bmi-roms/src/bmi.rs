//! The Basic Model Interface contract.
//!
//! This is the output-only subset an orchestration framework needs to
//! drive a dataset-backed component: lifecycle, variable and grid
//! introspection, time introspection and flat-buffer value exchange.
//! There is no `set_value` and no unstructured-mesh query.
//!
//! Every call other than `initialize` and `finalize` fails with
//! [`BmiError::NotInitialized`](crate::BmiError::NotInitialized) outside
//! the ready state.

use crate::error::BmiResult;

pub trait Bmi {
    /// Open the dataset named by the YAML file at `config_file` and derive
    /// grids and the time cursor. An empty path reads the settings from
    /// `ROMS_*` environment variables instead.
    fn initialize(&mut self, config_file: &str) -> BmiResult<()>;

    /// Advance one time step.
    fn update(&mut self) -> BmiResult<()>;

    /// Advance until the current time reaches `time` or the last step.
    fn update_until(&mut self, time: f64) -> BmiResult<()>;

    /// Release the dataset. Calling it again is a no-op.
    fn finalize(&mut self) -> BmiResult<()>;

    fn get_component_name(&self) -> &str;

    fn get_input_item_count(&self) -> BmiResult<usize>;

    fn get_output_item_count(&self) -> BmiResult<usize>;

    fn get_input_var_names(&self) -> BmiResult<Vec<String>>;

    /// Output variables in dataset order.
    fn get_output_var_names(&self) -> BmiResult<Vec<String>>;

    fn get_var_grid(&self, name: &str) -> BmiResult<usize>;

    /// Element type of exchanged buffers (`"float64"`).
    fn get_var_type(&self, name: &str) -> BmiResult<&str>;

    fn get_var_units(&self, name: &str) -> BmiResult<&str>;

    fn get_var_itemsize(&self, name: &str) -> BmiResult<usize>;

    /// Bytes needed for one time step of `name`.
    fn get_var_nbytes(&self, name: &str) -> BmiResult<usize>;

    fn get_var_location(&self, name: &str) -> BmiResult<&str>;

    fn get_current_time(&self) -> BmiResult<f64>;

    fn get_start_time(&self) -> BmiResult<f64>;

    fn get_end_time(&self) -> BmiResult<f64>;

    fn get_time_units(&self) -> BmiResult<&str>;

    fn get_time_step(&self) -> BmiResult<f64>;

    /// Copy the current time step of `name` into `dest`, row-major.
    ///
    /// `dest` must hold exactly the grid's node count; otherwise
    /// `BufferSizeMismatch` is returned and `dest` is left untouched.
    fn get_value(&self, name: &str, dest: &mut [f64]) -> BmiResult<()>;

    /// Borrow the current time step of `name` as a flat slice.
    ///
    /// The slice is cached until the next time advance.
    fn get_value_ref(&mut self, name: &str) -> BmiResult<&[f64]>;

    /// Copy the values at flat `indices` of the current time step into
    /// `dest`, which must be as long as `indices`.
    fn get_value_at_indices(&self, name: &str, dest: &mut [f64], indices: &[usize])
        -> BmiResult<()>;

    fn get_grid_rank(&self, grid: usize) -> BmiResult<usize>;

    fn get_grid_size(&self, grid: usize) -> BmiResult<usize>;

    fn get_grid_type(&self, grid: usize) -> BmiResult<&str>;

    /// Fill `shape` (length = rank) with the grid's dimension lengths.
    fn get_grid_shape(&self, grid: usize, shape: &mut [usize]) -> BmiResult<()>;

    fn get_grid_spacing(&self, grid: usize, spacing: &mut [f64]) -> BmiResult<()>;

    fn get_grid_origin(&self, grid: usize, origin: &mut [f64]) -> BmiResult<()>;
}
