//! Side-by-side evaluation of the tree ensemble and the cross-validated
//! elastic net on one train/test split.
use plotly::Plot;
use rand::RngCore;

use crate::config::ComparisonConfig;
use crate::design::{label_vector, DesignEncoder};
use crate::error::{Result, SimError};
use crate::models::build_model;
use crate::report::plot_roc_curves;
use crate::simulate::Frame;
use crate::stats::RocCurve;

/// Test-set ROC curve and AUC of one model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelScore {
    pub model: String,
    pub curve: RocCurve,
    pub auc: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub scores: Vec<ModelScore>,
}

impl Comparison {
    pub fn auc(&self, model: &str) -> Option<f64> {
        self.scores.iter().find(|s| s.model == model).map(|s| s.auc)
    }

    pub fn plot(&self) -> Plot {
        plot_roc_curves(&self.scores, "ROC curves on the test table")
    }
}

/// Fit both configured models on `train` and score them on `test`.
///
/// The design encoder is learned on `train` only, so both matrices share the
/// same columns even when a categorical level is missing from one table.
pub fn compare_models<S: AsRef<str>>(
    train: &Frame,
    test: &Frame,
    label: &str,
    predictors: &[S],
    config: &ComparisonConfig,
    rng: &mut dyn RngCore,
) -> Result<Comparison> {
    if predictors.is_empty() {
        return Err(SimError::invalid("predictor list is empty"));
    }

    let encoder = DesignEncoder::fit(train, predictors)?;
    let train_x = encoder.transform(train)?;
    let test_x = encoder.transform(test)?;
    let train_y = label_vector(train, label)?;
    let test_y = label_vector(test, label)?;

    log::info!(
        "Comparing models on {} training and {} test rows ({} design columns)",
        train_x.nrows(),
        test_x.nrows(),
        encoder.ncols()
    );

    let mut scores = Vec::with_capacity(2);
    for params in [&config.tree_ensemble, &config.linear] {
        let mut model = build_model(params.clone());
        model.fit(&train_x.x, &train_y, rng)?;
        let predictions = model.predict_proba(&test_x.x)?;
        let curve = RocCurve::compute(&predictions, &test_y)?;
        let auc = curve.auc();
        log::info!("{}: test AUC = {:.4}", model.name(), auc);
        scores.push(ModelScore {
            model: model.name().to_string(),
            curve,
            auc,
        });
    }

    Ok(Comparison { scores })
}
