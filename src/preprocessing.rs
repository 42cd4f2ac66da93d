//! Column standardization for design matrices.
//!
//! `Scaler` holds per-column mean and standard deviation. It is learned on
//! training rows and applied unchanged to any later matrix, the same
//! fit/transform split used by the design encoder.

use ndarray::{Array2, Axis};

use crate::error::{Result, SimError};

/// Simple standard scaler (per-column mean/std).
#[derive(Clone, Debug, PartialEq)]
pub struct Scaler {
    pub mean: Vec<f64>,
    pub std: Vec<f64>,
}

impl Scaler {
    /// Minimum stddev to avoid division by zero when transforming.
    const MIN_STD: f64 = 1e-12;
}

/// Fit a `Scaler` where rows are samples and columns are features.
/// Uses the population standard deviation; constant columns keep a std of
/// `MIN_STD` and transform to zero.
pub fn fit_scaler(x: &Array2<f64>) -> Result<Scaler> {
    let (nrows, ncols) = x.dim();
    if nrows == 0 || ncols == 0 {
        return Err(SimError::shape("fit_scaler requires a non-empty matrix"));
    }

    let mut mean = Vec::with_capacity(ncols);
    let mut std = Vec::with_capacity(ncols);
    for col in x.axis_iter(Axis(1)) {
        let m = col.sum() / nrows as f64;
        let var = col.iter().map(|v| (v - m).powi(2)).sum::<f64>() / nrows as f64;
        mean.push(m);
        std.push(var.sqrt().max(Scaler::MIN_STD));
    }

    Ok(Scaler { mean, std })
}

/// Transform all rows using the provided `Scaler` and return a new matrix.
pub fn transform_all(x: &Array2<f64>, sc: &Scaler) -> Result<Array2<f64>> {
    if x.ncols() != sc.mean.len() {
        return Err(SimError::shape(format!(
            "scaler was fitted on {} columns, got {}",
            sc.mean.len(),
            x.ncols()
        )));
    }
    let mut out = x.to_owned();
    for (c, mut col) in out.axis_iter_mut(Axis(1)).enumerate() {
        col.mapv_inplace(|v| (v - sc.mean[c]) / sc.std[c]);
    }
    Ok(out)
}

/// Fit a scaler and return it together with the transformed matrix.
pub fn fit_transform(x: &Array2<f64>) -> Result<(Scaler, Array2<f64>)> {
    let sc = fit_scaler(x)?;
    let out = transform_all(x, &sc)?;
    Ok((sc, out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn standardizes_columns() {
        let x = array![[1.0, 5.0], [3.0, 5.0]];
        let (sc, z) = fit_transform(&x).unwrap();
        assert_eq!(sc.mean, vec![2.0, 5.0]);
        assert!((z[(0, 0)] + 1.0).abs() < 1e-12);
        assert!((z[(1, 0)] - 1.0).abs() < 1e-12);
        // constant column maps to zero
        assert_eq!(z[(0, 1)], 0.0);
        assert_eq!(z[(1, 1)], 0.0);
    }

    #[test]
    fn column_count_must_match() {
        let sc = fit_scaler(&array![[1.0, 2.0]]).unwrap();
        assert!(transform_all(&array![[1.0]], &sc).is_err());
    }
}
