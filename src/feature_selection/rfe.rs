//! Recursive feature elimination with an outer cross-validation loop,
//! following caret's `rfe`: rank predictors, keep the top `size`, refit,
//! score the held-out rows, and optionally re-rank the survivors.
use ndarray::{Array2, Axis};
use rand::RngCore;

use crate::config::RfeConfig;
use crate::design::DesignMatrix;
use crate::error::{Result, SimError};
use crate::feature_selection::importance::{
    permutation_importance, rank_features, subset_columns,
};
use crate::models::{build_model, ClassifierModel};
use crate::stats::{mean_and_sd, roc_auc, split_fold, stratified_folds};

/// Held-out performance of one subset size.
#[derive(Debug, Clone, PartialEq)]
pub struct RfeStep {
    pub size: usize,
    pub mean_auc: f64,
    pub sd_auc: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RfeResult {
    /// Performance profile, ascending by size.
    pub profile: Vec<RfeStep>,
    pub best_size: usize,
    /// Predictors kept at `best_size` when refitting on all rows.
    pub selected: Vec<String>,
    /// Importance of every predictor from the full model on all rows,
    /// most important first.
    pub ranking: Vec<(String, f64)>,
    /// Share of folds whose best-size subset contains each predictor, in
    /// design column order.
    pub selection_frequency: Vec<(String, f64)>,
}

struct Elimination {
    /// Kept column indices per size, aligned with the descending size list.
    subsets: Vec<Vec<usize>>,
    /// Importance from the fit on every column.
    full_importance: Vec<f64>,
}

pub struct RecursiveFeatureElimination {
    config: RfeConfig,
}

impl RecursiveFeatureElimination {
    pub fn new(config: RfeConfig) -> Self {
        Self { config }
    }

    /// Deduplicated sizes clipped to `1..=p`, descending, always starting
    /// with `p`.
    fn candidate_sizes(&self, p: usize) -> Result<Vec<usize>> {
        if self.config.sizes.is_empty() {
            return Err(SimError::invalid("RFE needs at least one subset size"));
        }
        if self.config.sizes.contains(&0) {
            return Err(SimError::invalid("RFE subset sizes must be positive"));
        }
        let mut sizes: Vec<usize> = self
            .config
            .sizes
            .iter()
            .copied()
            .filter(|&s| s < p)
            .collect();
        sizes.push(p);
        sizes.sort_unstable_by(|a, b| b.cmp(a));
        sizes.dedup();
        Ok(sizes)
    }

    /// Walk down `sizes`, fitting a model on each subset and handing it to
    /// `on_fit` together with the subset's column indices.
    fn eliminate<F>(
        &self,
        x: &Array2<f64>,
        y: &[bool],
        sizes: &[usize],
        rng: &mut dyn RngCore,
        mut on_fit: F,
    ) -> Result<Elimination>
    where
        F: FnMut(usize, &[usize], &dyn ClassifierModel) -> Result<()>,
    {
        let mut ranking: Vec<usize> = (0..x.ncols()).collect();
        let mut subsets = Vec::with_capacity(sizes.len());
        let mut full_importance = Vec::new();

        for (pos, &size) in sizes.iter().enumerate() {
            let mut subset = ranking[..size].to_vec();
            subset.sort_unstable();

            let xs = subset_columns(x, &subset);
            let mut model = build_model(self.config.model.clone());
            model.fit(&xs, y, rng)?;
            on_fit(pos, &subset, model.as_ref())?;

            if pos == 0 || self.config.rerank {
                let importance =
                    permutation_importance(model.as_ref(), &xs, y, self.config.n_repeats, rng)?;
                ranking = rank_features(&importance)
                    .into_iter()
                    .map(|i| subset[i])
                    .collect();
                if pos == 0 {
                    full_importance = importance;
                }
            } else {
                ranking.retain(|i| subset.contains(i));
            }

            log::trace!("RFE size {}: kept columns {:?}", size, subset);
            subsets.push(subset);
        }

        Ok(Elimination {
            subsets,
            full_importance,
        })
    }

    fn pick_size(&self, profile: &[RfeStep]) -> usize {
        let best = profile
            .iter()
            .fold(f64::NEG_INFINITY, |acc, s| acc.max(s.mean_auc));
        match self.config.tolerance_pct {
            Some(tol) => profile
                .iter()
                .find(|s| (best - s.mean_auc) / best * 100.0 <= tol)
                .map(|s| s.size),
            None => profile.iter().find(|s| s.mean_auc == best).map(|s| s.size),
        }
        .unwrap_or_else(|| profile.last().map(|s| s.size).unwrap_or(0))
    }

    /// Every held-out fold needs both classes to be scored by AUC.
    fn check_class_counts(&self, y: &[bool]) -> Result<()> {
        let positives = y.iter().filter(|&&l| l).count();
        let negatives = y.len() - positives;
        if positives.min(negatives) < self.config.n_folds {
            return Err(SimError::invalid(format!(
                "n_folds = {} exceeds the smaller class ({} positive, {} negative rows); \
                 some held-out folds would lack a class",
                self.config.n_folds, positives, negatives
            )));
        }
        Ok(())
    }

    /// Run the outer cross-validation, choose the subset size and refit on all
    /// rows.
    pub fn fit(
        &self,
        design: &DesignMatrix,
        y: &[bool],
        rng: &mut dyn RngCore,
    ) -> Result<RfeResult> {
        if design.nrows() != y.len() {
            return Err(SimError::shape(format!(
                "design has {} rows but {} labels were given",
                design.nrows(),
                y.len()
            )));
        }
        let p = design.ncols();
        let sizes = self.candidate_sizes(p)?;
        self.check_class_counts(y)?;
        let folds = stratified_folds(y, self.config.n_folds, rng)?;

        log::info!(
            "RFE over {} predictors, sizes {:?}, {} folds",
            p,
            sizes,
            self.config.n_folds
        );

        let mut perf: Vec<Vec<f64>> =
            vec![Vec::with_capacity(self.config.n_folds); sizes.len()];
        let mut fold_subsets = Vec::with_capacity(self.config.n_folds);

        for fold in 0..self.config.n_folds {
            let (train_idx, held_idx) = split_fold(&folds, fold);
            let x_train = design.x.select(Axis(0), &train_idx);
            let y_train: Vec<bool> = train_idx.iter().map(|&i| y[i]).collect();
            let x_held = design.x.select(Axis(0), &held_idx);
            let y_held: Vec<bool> = held_idx.iter().map(|&i| y[i]).collect();

            let elimination =
                self.eliminate(&x_train, &y_train, &sizes, rng, |pos, subset, model| {
                    let scores = model.predict_proba(&subset_columns(&x_held, subset))?;
                    perf[pos].push(roc_auc(&scores, &y_held)?);
                    Ok(())
                })?;

            log::debug!(
                "RFE fold {}: held-out AUC by size {:?}",
                fold,
                sizes
                    .iter()
                    .zip(perf.iter())
                    .map(|(s, v)| (*s, v.last().copied().unwrap_or(f64::NAN)))
                    .collect::<Vec<_>>()
            );
            fold_subsets.push(elimination.subsets);
        }

        let mut profile: Vec<RfeStep> = sizes
            .iter()
            .zip(perf.iter())
            .map(|(&size, aucs)| {
                let (mean_auc, sd_auc) = mean_and_sd(aucs);
                RfeStep {
                    size,
                    mean_auc,
                    sd_auc,
                }
            })
            .collect();
        profile.reverse();

        let best_size = self.pick_size(&profile);
        let best_pos = sizes
            .iter()
            .position(|&s| s == best_size)
            .ok_or_else(|| SimError::invalid("no subset size could be evaluated"))?;

        let final_run = self.eliminate(&design.x, y, &sizes, rng, |_, _, _| Ok(()))?;
        let selected = final_run.subsets[best_pos]
            .iter()
            .map(|&i| design.names[i].clone())
            .collect::<Vec<_>>();
        let ranking = rank_features(&final_run.full_importance)
            .into_iter()
            .map(|i| (design.names[i].clone(), final_run.full_importance[i]))
            .collect();

        let n_folds = fold_subsets.len() as f64;
        let selection_frequency = (0..p)
            .map(|j| {
                let hits = fold_subsets
                    .iter()
                    .filter(|subsets| subsets[best_pos].contains(&j))
                    .count();
                (design.names[j].clone(), hits as f64 / n_folds)
            })
            .collect();

        log::info!("RFE selected {} predictors: {:?}", best_size, selected);

        Ok(RfeResult {
            profile,
            best_size,
            selected,
            ranking,
            selection_frequency,
        })
    }
}
