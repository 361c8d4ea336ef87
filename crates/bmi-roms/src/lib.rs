//! Basic Model Interface (BMI) adapter for ROMS ocean-model datasets.
//!
//! Lets a generic coupling framework drive a ROMS output dataset as if it
//! were a running model: the time cursor steps through the dataset's time
//! dimension and each output variable is exchanged as a flat `f64` buffer
//! on one of a few deduplicated grids.
//!
//! # Example
//!
//! ```ignore
//! use bmi_roms::{Bmi, BmiRoms};
//!
//! let mut model = BmiRoms::new();
//! model.initialize("bmi-roms.yaml")?;
//!
//! let grid = model.get_var_grid("salt")?;
//! let mut salt = vec![0.0; model.get_grid_size(grid)?];
//! model.get_value("salt", &mut salt)?;
//!
//! model.finalize()?;
//! ```

pub mod bmi;
pub mod config;
pub mod cursor;
pub mod error;
pub mod exchange;
pub mod grid;
pub mod model;

pub use bmi::Bmi;
pub use config::{RomsConfig, CONFIG_SECTION};
pub use cursor::TimeCursor;
pub use error::{BmiError, BmiErrorKind, BmiResult};
pub use exchange::{flatten_into, gather_into};
pub use grid::{GridIdentity, GridSignature, GridTable};
pub use model::{BmiRoms, COMPONENT_NAME, EXCHANGE_TYPE, GRID_TYPE, VAR_LOCATION};
