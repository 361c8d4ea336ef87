//! Dataset catalog for ROMS ocean-model output.
//!
//! This crate answers "what does this dataset contain" for gridded
//! ocean-model output with time, vertical and horizontal dimensions:
//!
//! - **Inventory**: which variables are output fields (rank 2-4, recognised
//!   dimensions, with units) and their metadata
//! - **Dimension roles**: time / vertical / horizontal, assigned once by name
//! - **Coordinates**: per-dimension coordinate arrays and the time axis
//! - **Values**: native-layout reads, whole or one time step at a time
//!
//! # Backends
//!
//! The NetCDF backend is behind the `netcdf` feature (requires libnetcdf and
//! HDF5 on the system). [`MemoryStore`] needs nothing and is what the tests
//! use.
//!
//! # Example
//!
//! ```ignore
//! use roms_dataset::{Catalog, CatalogOptions, SourceSpec};
//!
//! let spec = SourceSpec::new("https://tds.example.org/thredds/dodsC/roms/avg")
//!     .with_download(true);
//! let catalog = Catalog::open(&spec, CatalogOptions::default())?;
//!
//! for name in catalog.list_variables()? {
//!     let info = catalog.describe_variable(name)?;
//!     println!("{} [{}] {:?}", name, info.units, info.shape);
//! }
//! ```

pub mod catalog;
pub mod dimension;
pub mod error;
#[cfg(feature = "netcdf")]
pub mod native;
pub mod source;
pub mod store;
pub mod time;

pub use catalog::{Catalog, CatalogOptions, TimeAxis, VariableInfo, DEFAULT_CALENDAR, MISSING_UNITS};
pub use dimension::{Dimension, DimensionRole};
pub use error::{DatasetError, DatasetResult};
#[cfg(feature = "netcdf")]
pub use native::{silence_hdf5_errors, NetCdfStore};
pub use source::{cached_file_name, SourceLocator, SourceSpec};
pub use store::{AttrValue, DataType, DatasetStore, MemoryStore, MemoryStoreBuilder, VariableMeta};
pub use time::{TimeUnit, TimeUnits};
