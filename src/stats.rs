use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{Result, SimError};

/// Empirical quantile with linear interpolation between order statistics
/// (Hyndman & Fan type 7, the default of R's `quantile`).
///
/// # Arguments
///
/// * `values` - The sample. Must be non-empty and free of NaN.
/// * `p` - Probability in `[0, 1]`.
pub fn quantile(values: &[f64], p: f64) -> Result<f64> {
    if values.is_empty() {
        return Err(SimError::invalid("quantile of an empty sample"));
    }
    if !(0.0..=1.0).contains(&p) {
        return Err(SimError::invalid(format!(
            "quantile probability must be in [0, 1], got {}",
            p
        )));
    }
    if values.iter().any(|v| v.is_nan()) {
        return Err(SimError::invalid("quantile of a sample containing NaN"));
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let h = (sorted.len() - 1) as f64 * p;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    Ok(sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo]))
}

/// Mean and sample standard deviation (n - 1 denominator; 0 for a single value).
pub fn mean_and_sd(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (f64::NAN, f64::NAN);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if values.len() == 1 {
        return (mean, 0.0);
    }
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    (mean, var.sqrt())
}

/// Mean squared difference between predicted probabilities and 0/1 labels.
pub fn brier_score(probs: &[f64], labels: &[bool]) -> f64 {
    let n = probs.len().max(1) as f64;
    probs
        .iter()
        .zip(labels)
        .map(|(p, &l)| {
            let y = if l { 1.0 } else { 0.0 };
            (p - y).powi(2)
        })
        .sum::<f64>()
        / n
}

/// Receiver operating characteristic curve over every achievable threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct RocCurve {
    pub fpr: Vec<f64>,
    pub tpr: Vec<f64>,
    /// Score threshold for each point; the first point uses `+inf`.
    pub thresholds: Vec<f64>,
}

impl RocCurve {
    /// Compute the ROC curve of `scores` against `labels` (higher scores
    /// predict `true`).
    ///
    /// Rows are sorted by decreasing score and the cumulative true/false
    /// positive counts are read off at the end of each group of tied scores,
    /// so tied rows contribute one diagonal step.
    pub fn compute(scores: &[f64], labels: &[bool]) -> Result<Self> {
        if scores.len() != labels.len() {
            return Err(SimError::shape(format!(
                "scores ({}) and labels ({}) must have equal length",
                scores.len(),
                labels.len()
            )));
        }
        let nan_count = scores.iter().filter(|s| !s.is_finite()).count();
        if nan_count > 0 {
            return Err(SimError::invalid(format!(
                "found {} non-finite values in scores",
                nan_count
            )));
        }
        let n_pos = labels.iter().filter(|&&l| l).count();
        let n_neg = labels.len() - n_pos;
        if n_pos == 0 || n_neg == 0 {
            return Err(SimError::invalid(
                "ROC curve needs both positive and negative labels",
            ));
        }

        let mut order: Vec<usize> = (0..scores.len()).collect();
        order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

        let mut fpr = vec![0.0];
        let mut tpr = vec![0.0];
        let mut thresholds = vec![f64::INFINITY];
        let (mut tp, mut fp) = (0usize, 0usize);

        for (pos, &idx) in order.iter().enumerate() {
            if labels[idx] {
                tp += 1;
            } else {
                fp += 1;
            }
            let last_of_group = order
                .get(pos + 1)
                .map_or(true, |&next| scores[next] != scores[idx]);
            if last_of_group {
                fpr.push(fp as f64 / n_neg as f64);
                tpr.push(tp as f64 / n_pos as f64);
                thresholds.push(scores[idx]);
            }
        }

        Ok(RocCurve {
            fpr,
            tpr,
            thresholds,
        })
    }

    /// Area under the curve by the trapezoid rule.
    pub fn auc(&self) -> f64 {
        self.fpr
            .windows(2)
            .zip(self.tpr.windows(2))
            .map(|(x, y)| (x[1] - x[0]) * (y[1] + y[0]) / 2.0)
            .sum()
    }

    pub fn len(&self) -> usize {
        self.fpr.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fpr.is_empty()
    }
}

pub fn roc_auc(scores: &[f64], labels: &[bool]) -> Result<f64> {
    Ok(RocCurve::compute(scores, labels)?.auc())
}

/// Assign each row to one of `k` folds, spreading each class evenly.
///
/// Rows of each class are shuffled and then dealt round-robin, continuing the
/// rotation from one class to the next so fold sizes differ by at most one.
pub fn stratified_folds<R: Rng + ?Sized>(
    labels: &[bool],
    k: usize,
    rng: &mut R,
) -> Result<Vec<usize>> {
    if k < 2 {
        return Err(SimError::invalid(format!("need at least 2 folds, got {}", k)));
    }
    if k > labels.len() {
        return Err(SimError::invalid(format!(
            "{} folds requested for {} rows",
            k,
            labels.len()
        )));
    }

    let mut folds = vec![0usize; labels.len()];
    let mut next = 0usize;
    for class in [true, false] {
        let mut members: Vec<usize> = (0..labels.len()).filter(|&i| labels[i] == class).collect();
        members.shuffle(rng);
        for idx in members {
            folds[idx] = next % k;
            next += 1;
        }
    }
    Ok(folds)
}

/// Row indices outside and inside `fold`.
pub fn split_fold(folds: &[usize], fold: usize) -> (Vec<usize>, Vec<usize>) {
    let mut train = Vec::new();
    let mut held_out = Vec::new();
    for (i, &f) in folds.iter().enumerate() {
        if f == fold {
            held_out.push(i);
        } else {
            train.push(i);
        }
    }
    (train, held_out)
}
