//! Moving native arrays into caller-owned flat buffers.

use ndarray::ArrayD;

use crate::error::{BmiError, BmiResult};

/// Copy `values` into `dest` in row-major order.
///
/// `dest` must hold exactly as many elements as `values`; on mismatch
/// nothing is written.
pub fn flatten_into(values: &ArrayD<f64>, dest: &mut [f64]) -> BmiResult<()> {
    if dest.len() != values.len() {
        return Err(BmiError::BufferSizeMismatch {
            expected: values.len(),
            actual: dest.len(),
        });
    }
    for (slot, value) in dest.iter_mut().zip(values.iter()) {
        *slot = *value;
    }
    Ok(())
}

/// Copy the elements at flat row-major `indices` of `values` into `dest`.
///
/// All indices are checked before anything is written.
pub fn gather_into(values: &ArrayD<f64>, indices: &[usize], dest: &mut [f64]) -> BmiResult<()> {
    if dest.len() != indices.len() {
        return Err(BmiError::BufferSizeMismatch {
            expected: indices.len(),
            actual: dest.len(),
        });
    }
    let size = values.len();
    if let Some(&index) = indices.iter().find(|&&i| i >= size) {
        return Err(BmiError::IndexOutOfRange { index, size });
    }

    let owned: Vec<f64>;
    let flat = match values.as_slice() {
        Some(flat) => flat,
        None => {
            owned = values.iter().copied().collect();
            &owned
        }
    };
    for (slot, &i) in dest.iter_mut().zip(indices) {
        *slot = flat[i];
    }
    Ok(())
}
