//! Model-agnostic permutation importance.
use ndarray::{Array2, Axis};
use rand::seq::SliceRandom;
use rand::{Rng, RngCore};

use crate::config::ModelConfig;
use crate::design::DesignMatrix;
use crate::error::{Result, SimError};
use crate::models::{build_model, ClassifierModel};
use crate::stats::brier_score;

/// Permutation importance of every column of `x` for a fitted model.
///
/// Each column is shuffled `n_repeats` times and the mean increase of the
/// Brier score over the unshuffled predictions is reported. A column the
/// model never reads scores exactly zero.
pub fn permutation_importance<R: Rng + ?Sized>(
    model: &dyn ClassifierModel,
    x: &Array2<f64>,
    y: &[bool],
    n_repeats: usize,
    rng: &mut R,
) -> Result<Vec<f64>> {
    if n_repeats == 0 {
        return Err(SimError::invalid("n_repeats must be at least 1"));
    }
    if x.nrows() != y.len() {
        return Err(SimError::shape(format!(
            "{} rows but {} labels",
            x.nrows(),
            y.len()
        )));
    }

    let base = brier_score(&model.predict_proba(x)?, y);
    let mut importance = Vec::with_capacity(x.ncols());
    let mut permuted = x.clone();

    for j in 0..x.ncols() {
        let original = x.column(j).to_vec();
        let mut total = 0.0;
        for _ in 0..n_repeats {
            let mut shuffled = original.clone();
            shuffled.shuffle(rng);
            permuted
                .column_mut(j)
                .iter_mut()
                .zip(shuffled)
                .for_each(|(dst, v)| *dst = v);
            total += brier_score(&model.predict_proba(&permuted)?, y) - base;
        }
        permuted
            .column_mut(j)
            .iter_mut()
            .zip(original)
            .for_each(|(dst, v)| *dst = v);
        importance.push(total / n_repeats as f64);
    }

    Ok(importance)
}

/// Column indices by decreasing importance; ties keep column order.
pub fn rank_features(importance: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..importance.len()).collect();
    order.sort_by(|&a, &b| importance[b].total_cmp(&importance[a]));
    order
}

/// Fit a model on the whole design matrix and return `(name, importance)`
/// pairs sorted from most to least important.
pub fn feature_importance(
    config: &ModelConfig,
    design: &DesignMatrix,
    y: &[bool],
    n_repeats: usize,
    rng: &mut dyn RngCore,
) -> Result<Vec<(String, f64)>> {
    let mut model = build_model(config.clone());
    model.fit(&design.x, y, rng)?;
    let importance = permutation_importance(model.as_ref(), &design.x, y, n_repeats, rng)?;
    log::debug!(
        "{} permutation importance over {} columns computed",
        model.name(),
        importance.len()
    );
    Ok(rank_features(&importance)
        .into_iter()
        .map(|i| (design.names[i].clone(), importance[i]))
        .collect())
}

/// Copy of `x` restricted to `columns`.
pub(crate) fn subset_columns(x: &Array2<f64>, columns: &[usize]) -> Array2<f64> {
    x.select(Axis(1), columns)
}
