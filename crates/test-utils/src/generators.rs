//! Generators for synthetic ocean-model values and coordinates.
//!
//! Values are predictable so a test can tell exactly which element of the
//! native array ended up where in a flattened buffer.

/// Values `0.0, 1.0, 2.0, ...` of length `len`.
///
/// # Example
///
/// ```
/// use test_utils::ramp_values;
///
/// assert_eq!(ramp_values(3), vec![0.0, 1.0, 2.0]);
/// ```
pub fn ramp_values(len: usize) -> Vec<f64> {
    (0..len).map(|i| i as f64).collect()
}

/// A uniformly spaced coordinate axis.
///
/// # Example
///
/// ```
/// use test_utils::uniform_axis;
///
/// assert_eq!(uniform_axis(10.0, 24.0, 3), vec![10.0, 34.0, 58.0]);
/// ```
pub fn uniform_axis(origin: f64, step: f64, len: usize) -> Vec<f64> {
    (0..len).map(|i| origin + step * i as f64).collect()
}

/// Values encoding their own multi-index over `shape`.
///
/// Each element is `sum(index[k] * 1000^(n-1-k))`, so for a
/// `[time, level, row, col]` array the value at `[1, 2, 3, 4]` is
/// `1_002_003_004.0`. Row-major order.
pub fn indexed_values(shape: &[usize]) -> Vec<f64> {
    let len: usize = shape.iter().product();
    let mut data = Vec::with_capacity(len);
    let mut index = vec![0usize; shape.len()];

    for _ in 0..len {
        let value = index
            .iter()
            .fold(0.0, |acc, &i| acc * 1000.0 + i as f64);
        data.push(value);

        for k in (0..shape.len()).rev() {
            index[k] += 1;
            if index[k] < shape[k] {
                break;
            }
            index[k] = 0;
        }
    }
    data
}

/// Salinity-like values (psu) with a gentle gradient, `len` long.
pub fn salinity_values(len: usize) -> Vec<f64> {
    (0..len).map(|i| 30.0 + (i % 100) as f64 * 0.05).collect()
}
