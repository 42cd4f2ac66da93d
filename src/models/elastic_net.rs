//! Cross-validated elastic net (penalty chosen glmnet-style).
use itertools_num::linspace;
use linfa::traits::{Fit, Predict};
use linfa::Dataset;
use linfa_elasticnet::ElasticNet;
use ndarray::{Array1, Array2, Axis};
use rand::RngCore;

use crate::config::{LambdaRule, ModelConfig, ModelType};
use crate::error::{Result, SimError};
use crate::models::classifier_trait::{
    check_prediction_input, check_training_data, ClassifierModel,
};
use crate::preprocessing::{fit_transform, transform_all, Scaler};
use crate::stats::{mean_and_sd, split_fold, stratified_folds};

/// Cross-validated error at one penalty of the path.
#[derive(Debug, Clone, PartialEq)]
pub struct CvPoint {
    pub penalty: f64,
    pub mean_mse: f64,
    pub se_mse: f64,
}

/// One cross-validation split, standardized with the training rows only.
struct ScaledFold {
    z_train: Array2<f64>,
    y_train: Array1<f64>,
    z_held: Array2<f64>,
    y_held: Array1<f64>,
}

#[derive(Debug, Clone, Copy)]
struct NetSettings {
    l1_ratio: f64,
    n_lambda: usize,
    lambda_min_ratio: f64,
    n_folds: usize,
    lambda_rule: LambdaRule,
    max_iterations: u32,
    tolerance: f64,
}

/// Elastic net regression on the 0/1 label whose penalty is picked by
/// stratified k-fold cross-validation over a log-spaced path.
pub struct CvElasticNet {
    params: ModelConfig,
    scaler: Option<Scaler>,
    model: Option<ElasticNet<f64>>,
    cv_profile: Vec<CvPoint>,
    selected_penalty: Option<f64>,
}

impl CvElasticNet {
    pub fn new(params: ModelConfig) -> Self {
        CvElasticNet {
            params,
            scaler: None,
            model: None,
            cv_profile: Vec::new(),
            selected_penalty: None,
        }
    }

    pub fn cv_profile(&self) -> &[CvPoint] {
        &self.cv_profile
    }

    pub fn selected_penalty(&self) -> Option<f64> {
        self.selected_penalty
    }

    /// Coefficients on the standardized scale, in design column order.
    pub fn coefficients(&self) -> Option<Vec<f64>> {
        self.model.as_ref().map(|m| m.hyperplane().to_vec())
    }

    fn settings(&self) -> Result<NetSettings> {
        match &self.params.model_type {
            ModelType::ElasticNet {
                l1_ratio,
                n_lambda,
                lambda_min_ratio,
                n_folds,
                lambda_rule,
                max_iterations,
                tolerance,
            } => {
                if !(0.0..=1.0).contains(l1_ratio) {
                    return Err(SimError::invalid(format!(
                        "l1_ratio must be in [0, 1], got {}",
                        l1_ratio
                    )));
                }
                if *n_lambda == 0 {
                    return Err(SimError::invalid("n_lambda must be at least 1"));
                }
                if !(*lambda_min_ratio > 0.0 && *lambda_min_ratio < 1.0) {
                    return Err(SimError::invalid(format!(
                        "lambda_min_ratio must be in (0, 1), got {}",
                        lambda_min_ratio
                    )));
                }
                Ok(NetSettings {
                    l1_ratio: *l1_ratio,
                    n_lambda: *n_lambda,
                    lambda_min_ratio: *lambda_min_ratio,
                    n_folds: *n_folds,
                    lambda_rule: *lambda_rule,
                    max_iterations: *max_iterations,
                    tolerance: *tolerance,
                })
            }
            other => Err(SimError::model(format!(
                "Expected ModelType::ElasticNet params, got {:?}",
                other
            ))),
        }
    }

    fn fit_one(
        settings: &NetSettings,
        penalty: f64,
        x: Array2<f64>,
        y: Array1<f64>,
    ) -> Result<ElasticNet<f64>> {
        let dataset = Dataset::new(x, y);
        ElasticNet::<f64>::params()
            .penalty(penalty)
            .l1_ratio(settings.l1_ratio)
            .max_iterations(settings.max_iterations)
            .tolerance(settings.tolerance)
            .with_intercept(true)
            .fit(&dataset)
            .map_err(|e| SimError::model(format!("elastic net (penalty {}): {}", penalty, e)))
    }

    /// Smallest penalty that sets every coefficient to zero, for standardized
    /// columns and a centred response.
    fn lambda_max(z: &Array2<f64>, y: &Array1<f64>, l1_ratio: f64) -> f64 {
        let n = z.nrows() as f64;
        let y_mean = y.mean().unwrap_or(0.0);
        let centred = y.mapv(|v| v - y_mean);
        let max_corr = z
            .axis_iter(Axis(1))
            .map(|col| col.dot(&centred).abs())
            .fold(0.0f64, f64::max);
        let lambda = max_corr / (n * l1_ratio.max(1e-3));
        if lambda.is_finite() && lambda > 0.0 {
            lambda
        } else {
            1e-3
        }
    }

    fn scaled_folds(
        x: &Array2<f64>,
        target: &Array1<f64>,
        folds: &[usize],
        n_folds: usize,
    ) -> Result<Vec<ScaledFold>> {
        (0..n_folds)
            .map(|fold| {
                let (train_idx, held_idx) = split_fold(folds, fold);
                let (fold_scaler, z_train) = fit_transform(&x.select(Axis(0), &train_idx))?;
                let z_held = transform_all(&x.select(Axis(0), &held_idx), &fold_scaler)?;
                Ok(ScaledFold {
                    z_train,
                    y_train: target.select(Axis(0), &train_idx),
                    z_held,
                    y_held: target.select(Axis(0), &held_idx),
                })
            })
            .collect()
    }

    fn penalty_path(lambda_max: f64, settings: &NetSettings) -> Vec<f64> {
        if settings.n_lambda == 1 {
            return vec![lambda_max];
        }
        let hi = lambda_max.ln();
        let lo = (lambda_max * settings.lambda_min_ratio).ln();
        linspace(hi, lo, settings.n_lambda).map(f64::exp).collect()
    }

    fn choose(profile: &[CvPoint], rule: LambdaRule) -> usize {
        let best = profile
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.mean_mse.total_cmp(&b.1.mean_mse))
            .map(|(i, _)| i)
            .unwrap_or(0);
        match rule {
            LambdaRule::Min => best,
            LambdaRule::OneStandardError => {
                let limit = profile[best].mean_mse + profile[best].se_mse;
                // the path runs from the largest penalty down
                profile
                    .iter()
                    .position(|p| p.mean_mse <= limit)
                    .unwrap_or(best)
            }
        }
    }
}

impl ClassifierModel for CvElasticNet {
    fn fit(&mut self, x: &Array2<f64>, y: &[bool], rng: &mut dyn RngCore) -> Result<()> {
        check_training_data(x, y)?;
        let settings = self.settings()?;

        let (scaler, z) = fit_transform(x)?;
        let target: Array1<f64> = y.iter().map(|&l| if l { 1.0 } else { 0.0 }).collect();

        let lambda_max = Self::lambda_max(&z, &target, settings.l1_ratio);
        let path = Self::penalty_path(lambda_max, &settings);
        let folds = stratified_folds(y, settings.n_folds, rng)?;
        let scaled = Self::scaled_folds(x, &target, &folds, settings.n_folds)?;

        let mut profile = Vec::with_capacity(path.len());
        for &penalty in &path {
            let mut errors = Vec::with_capacity(settings.n_folds);
            for fold in &scaled {
                let model = Self::fit_one(
                    &settings,
                    penalty,
                    fold.z_train.clone(),
                    fold.y_train.clone(),
                )?;
                let pred: Array1<f64> = model.predict(&fold.z_held);
                let mse = (&pred - &fold.y_held)
                    .mapv(|d| d * d)
                    .mean()
                    .unwrap_or(f64::NAN);
                errors.push(mse);
            }
            let (mean, sd) = mean_and_sd(&errors);
            profile.push(CvPoint {
                penalty,
                mean_mse: mean,
                se_mse: sd / (errors.len() as f64).sqrt(),
            });
        }

        let chosen = Self::choose(&profile, settings.lambda_rule);
        let penalty = profile[chosen].penalty;
        log::debug!(
            "Elastic net: chose penalty {:.5} ({:?}) with CV MSE {:.4} from {} candidates",
            penalty,
            settings.lambda_rule,
            profile[chosen].mean_mse,
            profile.len()
        );

        let model = Self::fit_one(&settings, penalty, z, target)?;

        self.scaler = Some(scaler);
        self.model = Some(model);
        self.cv_profile = profile;
        self.selected_penalty = Some(penalty);
        Ok(())
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Vec<f64>> {
        let (Some(model), Some(scaler)) = (self.model.as_ref(), self.scaler.as_ref()) else {
            return Err(SimError::model("elastic net has not been fitted"));
        };
        check_prediction_input(x, scaler.mean.len())?;
        let z = transform_all(x, scaler)?;
        let pred: Array1<f64> = model.predict(&z);
        Ok(pred.to_vec())
    }

    fn name(&self) -> &str {
        "Elastic net"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::roc_auc;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn linear_data(rng: &mut StdRng, n: usize) -> (Array2<f64>, Vec<bool>) {
        let mut x = Array2::<f64>::zeros((n, 3));
        let mut y = Vec::with_capacity(n);
        for i in 0..n {
            let a: f64 = rng.gen_range(-1.0..1.0);
            let b: f64 = rng.gen_range(-1.0..1.0);
            let c: f64 = rng.gen_range(-1.0..1.0);
            x[(i, 0)] = a;
            x[(i, 1)] = b;
            x[(i, 2)] = c;
            y.push(2.0 * a - b + 0.1 * c > 0.0);
        }
        (x, y)
    }

    #[test]
    fn learns_a_linear_boundary() {
        let mut rng = StdRng::seed_from_u64(11);
        let (x, y) = linear_data(&mut rng, 300);
        let mut model = CvElasticNet::new(ModelConfig::elastic_net());
        model.fit(&x, &y, &mut rng).unwrap();

        let scores = model.predict_proba(&x).unwrap();
        assert!(roc_auc(&scores, &y).unwrap() > 0.9);
        assert!(model.selected_penalty().unwrap() > 0.0);
        assert_eq!(model.cv_profile().len(), 30);
        let coef = model.coefficients().unwrap();
        assert!(coef[0] > 0.0 && coef[1] < 0.0);
    }

    #[test]
    fn penalty_path_is_descending() {
        let settings = NetSettings {
            l1_ratio: 0.5,
            n_lambda: 5,
            lambda_min_ratio: 0.01,
            n_folds: 3,
            lambda_rule: LambdaRule::Min,
            max_iterations: 100,
            tolerance: 1e-4,
        };
        let path = CvElasticNet::penalty_path(2.0, &settings);
        assert_eq!(path.len(), 5);
        assert!((path[0] - 2.0).abs() < 1e-9);
        assert!((path[4] - 0.02).abs() < 1e-9);
        assert!(path.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn one_standard_error_prefers_larger_penalty() {
        let point = |penalty, mean_mse| CvPoint {
            penalty,
            mean_mse,
            se_mse: 0.01,
        };
        let profile = vec![point(1.0, 0.30), point(0.5, 0.205), point(0.1, 0.20)];
        assert_eq!(CvElasticNet::choose(&profile, LambdaRule::Min), 2);
        assert_eq!(CvElasticNet::choose(&profile, LambdaRule::OneStandardError), 1);
    }

    #[test]
    fn folds_are_standardized_on_their_own_training_rows() {
        let mut rng = StdRng::seed_from_u64(3);
        let (x, y) = linear_data(&mut rng, 60);
        let target: Array1<f64> = y.iter().map(|&l| if l { 1.0 } else { 0.0 }).collect();
        let folds = stratified_folds(&y, 3, &mut rng).unwrap();

        let scaled = CvElasticNet::scaled_folds(&x, &target, &folds, 3).unwrap();
        assert_eq!(scaled.len(), 3);
        for (fold, split) in scaled.iter().enumerate() {
            let (train_idx, held_idx) = split_fold(&folds, fold);
            assert_eq!(split.z_train.nrows(), train_idx.len());
            assert_eq!(split.z_held.nrows(), held_idx.len());
            for col in split.z_train.axis_iter(Axis(1)) {
                assert!(col.mean().unwrap().abs() < 1e-9);
            }
        }
    }

    #[test]
    fn extra_prediction_column_is_a_fit_error() {
        let mut rng = StdRng::seed_from_u64(5);
        let (x, y) = linear_data(&mut rng, 90);
        let mut model = CvElasticNet::new(ModelConfig::elastic_net());
        model.fit(&x, &y, &mut rng).unwrap();

        let wider = Array2::<f64>::zeros((2, 4));
        assert!(matches!(
            model.predict_proba(&wider),
            Err(SimError::ModelFit(_))
        ));
    }

    #[test]
    fn single_class_is_a_fit_error() {
        let x = Array2::<f64>::zeros((6, 2));
        let mut rng = StdRng::seed_from_u64(1);
        let mut model = CvElasticNet::new(ModelConfig::elastic_net());
        assert!(matches!(
            model.fit(&x, &[false; 6], &mut rng),
            Err(SimError::ModelFit(_))
        ));
    }
}
