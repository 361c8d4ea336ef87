//! Dataset store abstraction and the in-memory implementation.
//!
//! A store is the labeled multi-dimensional array layer underneath the
//! catalog: named dimensions, named variables with attributes, and value
//! reads in native layout. The NetCDF backend lives in [`crate::native`].

use std::collections::BTreeMap;
use std::fmt;

use ndarray::{ArrayD, Axis, IxDyn};

use crate::error::{DatasetError, DatasetResult};

/// Native element type of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float32,
    Float64,
}

impl DataType {
    /// Size of one element in bytes.
    pub fn itemsize(&self) -> usize {
        match self {
            Self::Int8 | Self::UInt8 => 1,
            Self::Int16 | Self::UInt16 => 2,
            Self::Int32 | Self::UInt32 | Self::Float32 => 4,
            Self::Int64 | Self::UInt64 | Self::Float64 => 8,
        }
    }

    /// Numpy-style type name (`"float64"`, `"int16"`, ...).
    pub fn name(&self) -> &'static str {
        match self {
            Self::Int8 => "int8",
            Self::UInt8 => "uint8",
            Self::Int16 => "int16",
            Self::UInt16 => "uint16",
            Self::Int32 => "int32",
            Self::UInt32 => "uint32",
            Self::Int64 => "int64",
            Self::UInt64 => "uint64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Attribute value attached to a variable.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Text(String),
    Number(f64),
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// Declared metadata of one variable in a store.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableMeta {
    pub name: String,
    /// Dimension names in declaration order.
    pub dimensions: Vec<String>,
    pub dtype: DataType,
    pub attributes: BTreeMap<String, AttrValue>,
}

impl VariableMeta {
    /// Get a text attribute, if present.
    pub fn text_attr(&self, key: &str) -> Option<&str> {
        match self.attributes.get(key) {
            Some(AttrValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn rank(&self) -> usize {
        self.dimensions.len()
    }
}

/// Read access to a labeled multi-dimensional array store.
pub trait DatasetStore {
    /// Dimensions as `(name, length)` in declaration order.
    fn dimensions(&self) -> Vec<(String, usize)>;

    /// Variable metadata in declaration order.
    fn variables(&self) -> Vec<VariableMeta>;

    /// Read a whole variable, widened to `f64`, in native shape.
    fn read_all(&self, name: &str) -> DatasetResult<ArrayD<f64>>;

    /// Read one index along `axis`, dropping that axis from the result.
    fn read_step(&self, name: &str, axis: usize, step: usize) -> DatasetResult<ArrayD<f64>> {
        let values = self.read_all(name)?;
        if axis >= values.ndim() || step >= values.len_of(Axis(axis)) {
            return Err(DatasetError::read(
                name,
                format!("index {} out of range on axis {}", step, axis),
            ));
        }
        Ok(values.index_axis(Axis(axis), step).to_owned())
    }
}

#[derive(Debug, Clone)]
struct MemoryVariable {
    meta: VariableMeta,
    values: ArrayD<f64>,
}

/// A dataset held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    dimensions: Vec<(String, usize)>,
    variables: Vec<MemoryVariable>,
}

impl MemoryStore {
    pub fn builder() -> MemoryStoreBuilder {
        MemoryStoreBuilder::default()
    }
}

impl DatasetStore for MemoryStore {
    fn dimensions(&self) -> Vec<(String, usize)> {
        self.dimensions.clone()
    }

    fn variables(&self) -> Vec<VariableMeta> {
        self.variables.iter().map(|v| v.meta.clone()).collect()
    }

    fn read_all(&self, name: &str) -> DatasetResult<ArrayD<f64>> {
        self.variables
            .iter()
            .find(|v| v.meta.name == name)
            .map(|v| v.values.clone())
            .ok_or_else(|| DatasetError::UnknownVariable(name.to_string()))
    }

    fn read_step(&self, name: &str, axis: usize, step: usize) -> DatasetResult<ArrayD<f64>> {
        let var = self
            .variables
            .iter()
            .find(|v| v.meta.name == name)
            .ok_or_else(|| DatasetError::UnknownVariable(name.to_string()))?;
        if axis >= var.values.ndim() || step >= var.values.len_of(Axis(axis)) {
            return Err(DatasetError::read(
                name,
                format!("index {} out of range on axis {}", step, axis),
            ));
        }
        Ok(var.values.index_axis(Axis(axis), step).to_owned())
    }
}

/// Builder for [`MemoryStore`]. Values are given flat in row-major order.
#[derive(Debug, Default)]
pub struct MemoryStoreBuilder {
    dimensions: Vec<(String, usize)>,
    variables: Vec<(VariableMeta, Vec<f64>)>,
}

impl MemoryStoreBuilder {
    /// Declare a dimension.
    pub fn dimension(mut self, name: &str, len: usize) -> Self {
        self.dimensions.push((name.to_string(), len));
        self
    }

    /// Add a `float64` variable over the named dimensions.
    pub fn variable(mut self, name: &str, dims: &[&str], values: Vec<f64>) -> Self {
        let meta = VariableMeta {
            name: name.to_string(),
            dimensions: dims.iter().map(|d| d.to_string()).collect(),
            dtype: DataType::Float64,
            attributes: BTreeMap::new(),
        };
        self.variables.push((meta, values));
        self
    }

    /// Set an attribute on a previously added variable.
    pub fn attribute(mut self, var: &str, key: &str, value: impl Into<AttrValue>) -> Self {
        if let Some((meta, _)) = self.variables.iter_mut().find(|(m, _)| m.name == var) {
            meta.attributes.insert(key.to_string(), value.into());
        }
        self
    }

    /// Shorthand for the `units` attribute.
    pub fn units(self, var: &str, units: &str) -> Self {
        self.attribute(var, "units", units)
    }

    /// Override the declared native type of a previously added variable.
    pub fn dtype(mut self, var: &str, dtype: DataType) -> Self {
        if let Some((meta, _)) = self.variables.iter_mut().find(|(m, _)| m.name == var) {
            meta.dtype = dtype;
        }
        self
    }

    /// Validate dimensions and value counts and build the store.
    pub fn build(self) -> DatasetResult<MemoryStore> {
        let mut variables = Vec::with_capacity(self.variables.len());

        for (meta, values) in self.variables {
            let shape = meta
                .dimensions
                .iter()
                .map(|dim| {
                    self.dimensions
                        .iter()
                        .find(|(name, _)| name == dim)
                        .map(|(_, len)| *len)
                        .ok_or_else(|| DatasetError::UnknownDimension(dim.clone()))
                })
                .collect::<DatasetResult<Vec<usize>>>()?;

            let values = ArrayD::from_shape_vec(IxDyn(&shape), values)?;
            variables.push(MemoryVariable { meta, values });
        }

        Ok(MemoryStore {
            dimensions: self.dimensions,
            variables,
        })
    }
}
