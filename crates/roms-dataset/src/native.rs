//! Native NetCDF store using the netcdf library.
//!
//! Opens local files directly. Remote OPeNDAP locators are handed to
//! libnetcdf as-is, which reads them over DAP when the library was built
//! with DAP support.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Once;

use ndarray::{ArrayD, IxDyn};
use netcdf::types::{FloatType, IntType, NcVariableType};
use netcdf::{AttributeValue, Extent};
use tracing::debug;

use crate::error::{DatasetError, DatasetResult};
use crate::store::{AttrValue, DataType, DatasetStore, VariableMeta};

/// Silence HDF5's automatic error printing to stderr.
///
/// The HDF5 C library prints verbose diagnostics even when a missing
/// attribute is handled gracefully on the Rust side. Safe to call many
/// times; only the first call does anything.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: H5Eset_auto2 is thread-safe and null handlers are a
        // documented way to disable error output.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

/// A NetCDF file (or DAP endpoint) opened for reading.
pub struct NetCdfStore {
    file: netcdf::File,
}

impl NetCdfStore {
    /// Open a NetCDF file or OPeNDAP URL.
    pub fn open(location: impl AsRef<Path>) -> DatasetResult<Self> {
        silence_hdf5_errors();

        let location = location.as_ref();
        let file = netcdf::open(location).map_err(|e| {
            DatasetError::source_unavailable(format!(
                "failed to open {}: {}",
                location.display(),
                e
            ))
        })?;

        debug!(location = %location.display(), "Opened NetCDF store");

        Ok(Self { file })
    }

    fn variable(&self, name: &str) -> DatasetResult<netcdf::Variable<'_>> {
        self.file
            .variable(name)
            .ok_or_else(|| DatasetError::UnknownVariable(name.to_string()))
    }
}

impl DatasetStore for NetCdfStore {
    fn dimensions(&self) -> Vec<(String, usize)> {
        self.file
            .dimensions()
            .map(|dim| (dim.name().to_string(), dim.len()))
            .collect()
    }

    fn variables(&self) -> Vec<VariableMeta> {
        self.file
            .variables()
            .filter_map(|var| {
                let dtype = data_type_of(&var.vartype())?;
                Some(VariableMeta {
                    name: var.name().to_string(),
                    dimensions: var.dimensions().iter().map(|d| d.name().to_string()).collect(),
                    dtype,
                    attributes: read_attributes(&var),
                })
            })
            .collect()
    }

    fn read_all(&self, name: &str) -> DatasetResult<ArrayD<f64>> {
        let var = self.variable(name)?;

        let shape: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();

        // Read using (..) to get all extents, converted to f64 by libnetcdf
        let values: Vec<f64> = var
            .get_values(..)
            .map_err(|e| DatasetError::read(name, e.to_string()))?;

        Ok(ArrayD::from_shape_vec(IxDyn(&shape), values)?)
    }

    /// Hyperslab read of one index along `axis`; only that slab leaves
    /// the file (or the DAP server).
    fn read_step(&self, name: &str, axis: usize, step: usize) -> DatasetResult<ArrayD<f64>> {
        let var = self.variable(name)?;
        let lens: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();
        let (extents, shape) = step_extents(&lens, axis, step).ok_or_else(|| {
            DatasetError::read(name, format!("index {} out of range on axis {}", step, axis))
        })?;

        let values: Vec<f64> = var
            .get_values::<f64, _>(extents)
            .map_err(|e| DatasetError::read(name, e.to_string()))?;

        Ok(ArrayD::from_shape_vec(IxDyn(&shape), values)?)
    }
}

/// Extents selecting index `step` of `axis` from a variable with dimension
/// lengths `lens`, plus the shape of the result with `axis` removed.
fn step_extents(lens: &[usize], axis: usize, step: usize) -> Option<(Vec<Extent>, Vec<usize>)> {
    if step >= *lens.get(axis)? {
        return None;
    }
    let extents = lens
        .iter()
        .enumerate()
        .map(|(i, &len)| {
            if i == axis {
                Extent::from(step..step + 1)
            } else {
                Extent::from(0..len)
            }
        })
        .collect();
    let shape = lens
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != axis)
        .map(|(_, &len)| len)
        .collect();
    Some((extents, shape))
}

/// Map a NetCDF variable type onto a numeric [`DataType`].
///
/// Non-numeric variables (strings, chars, compound types) are not data
/// fields and yield `None`.
fn data_type_of(vartype: &NcVariableType) -> Option<DataType> {
    match vartype {
        NcVariableType::Float(FloatType::F32) => Some(DataType::Float32),
        NcVariableType::Float(FloatType::F64) => Some(DataType::Float64),
        NcVariableType::Int(IntType::I8) => Some(DataType::Int8),
        NcVariableType::Int(IntType::U8) => Some(DataType::UInt8),
        NcVariableType::Int(IntType::I16) => Some(DataType::Int16),
        NcVariableType::Int(IntType::U16) => Some(DataType::UInt16),
        NcVariableType::Int(IntType::I32) => Some(DataType::Int32),
        NcVariableType::Int(IntType::U32) => Some(DataType::UInt32),
        NcVariableType::Int(IntType::I64) => Some(DataType::Int64),
        NcVariableType::Int(IntType::U64) => Some(DataType::UInt64),
        _ => None,
    }
}

/// Collect scalar text and numeric attributes of a variable.
fn read_attributes(var: &netcdf::Variable) -> BTreeMap<String, AttrValue> {
    let mut attributes = BTreeMap::new();

    for attr in var.attributes() {
        let value = match attr.value() {
            Ok(AttributeValue::Str(s)) => AttrValue::Text(s),
            Ok(AttributeValue::Double(v)) => AttrValue::Number(v),
            Ok(AttributeValue::Float(v)) => AttrValue::Number(v as f64),
            Ok(AttributeValue::Int(v)) => AttrValue::Number(v as f64),
            Ok(AttributeValue::Short(v)) => AttrValue::Number(v as f64),
            _ => continue,
        };
        attributes.insert(attr.name().to_string(), value);
    }

    attributes
}
