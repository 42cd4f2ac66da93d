use ndarray::Array2;
use rand::RngCore;

use crate::error::{Result, SimError};

/// Contract shared by the tree ensemble and the regularized linear model:
/// fit on a design matrix with boolean labels, then score new rows.
pub trait ClassifierModel {
    /// Fit the model. `rng` drives any internal resampling (e.g. the
    /// cross-validation folds of the penalty search).
    fn fit(&mut self, x: &Array2<f64>, y: &[bool], rng: &mut dyn RngCore) -> Result<()>;

    /// Score rows; higher means more likely `true`. Probabilistic models
    /// return probabilities, linear models a continuous score.
    fn predict_proba(&self, x: &Array2<f64>) -> Result<Vec<f64>>;

    /// Optional human readable name for the model
    fn name(&self) -> &str {
        "classifier"
    }
}

/// Preconditions every model shares: matching lengths, a non-empty matrix
/// and both classes present.
pub(crate) fn check_training_data(x: &Array2<f64>, y: &[bool]) -> Result<()> {
    if x.nrows() != y.len() {
        return Err(SimError::model(format!(
            "feature matrix has {} rows but {} labels were given",
            x.nrows(),
            y.len()
        )));
    }
    if x.nrows() == 0 || x.ncols() == 0 {
        return Err(SimError::model(format!(
            "cannot fit on an empty {}x{} matrix",
            x.nrows(),
            x.ncols()
        )));
    }
    let positives = y.iter().filter(|&&l| l).count();
    if positives == 0 || positives == y.len() {
        return Err(SimError::model(format!(
            "training labels contain a single class ({} of {} positive)",
            positives,
            y.len()
        )));
    }
    Ok(())
}

pub(crate) fn check_prediction_input(x: &Array2<f64>, n_features: usize) -> Result<()> {
    if x.ncols() != n_features {
        return Err(SimError::model(format!(
            "model was fitted on {} features, got {}",
            n_features,
            x.ncols()
        )));
    }
    Ok(())
}
