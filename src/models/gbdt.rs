use gbdt::config::Config;
use gbdt::decision_tree::{Data, DataVec};
use gbdt::gradient_boost::GBDT;
use ndarray::Array2;
use rand::RngCore;

use crate::config::{ModelConfig, ModelType};
use crate::error::{Result, SimError};
use crate::models::classifier_trait::{
    check_prediction_input, check_training_data, ClassifierModel,
};

/// The only loss in `gbdt` that is trained as a log loss on {-1, 1} labels.
/// Unknown names fall back to squared error inside the crate.
const LOG_LOSS: &str = "LogLikelyhood";

/// Gradient Boosting Decision Tree (GBDT) classifier
pub struct GBDTClassifier {
    model: Option<GBDT>,
    params: ModelConfig,
    n_features: usize,
}

impl GBDTClassifier {
    pub fn new(params: ModelConfig) -> Self {
        GBDTClassifier {
            model: None,
            params,
            n_features: 0,
        }
    }

    fn to_data_vec(x: &Array2<f64>, y: Option<&[bool]>) -> DataVec {
        let mut data = DataVec::with_capacity(x.nrows());
        for (i, row) in x.outer_iter().enumerate() {
            let features: Vec<f32> = row.iter().map(|&v| v as f32).collect();
            // LogLikelyhood loss expects labels in {-1, 1}
            let label = match y {
                Some(y) if y[i] => 1.0,
                Some(_) => -1.0,
                None => 0.0,
            };
            data.push(Data::new_training_data(features, 1.0, label, None));
        }
        data
    }
}

impl ClassifierModel for GBDTClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &[bool], _rng: &mut dyn RngCore) -> Result<()> {
        check_training_data(x, y)?;
        let feature_size = x.ncols();

        match &self.params.model_type {
            ModelType::GBDT {
                max_depth,
                num_boost_round,
                debug,
                training_optimization_level,
                loss_type,
            } => {
                if loss_type != LOG_LOSS {
                    return Err(SimError::invalid(format!(
                        "unsupported GBDT loss_type '{}', expected '{}'",
                        loss_type, LOG_LOSS
                    )));
                }
                let mut config = Config::new();

                config.set_feature_size(feature_size);
                config.set_shrinkage(self.params.learning_rate);
                config.set_max_depth(*max_depth);
                config.set_iterations(*num_boost_round as usize);
                config.set_debug(*debug);
                config.set_training_optimization_level(*training_optimization_level);
                config.set_loss(loss_type);
                config.set_data_sample_ratio(1.0);
                config.set_feature_sample_ratio(1.0);

                let mut gbdt = GBDT::new(&config);
                let mut train_x = Self::to_data_vec(x, Some(y));
                gbdt.fit(&mut train_x);

                log::trace!(
                    "Fitted GBDT on {} rows x {} features ({} rounds, depth {})",
                    x.nrows(),
                    feature_size,
                    num_boost_round,
                    max_depth
                );

                self.model = Some(gbdt);
                self.n_features = feature_size;
                Ok(())
            }
            other => Err(SimError::model(format!(
                "Expected ModelType::GBDT params, got {:?}",
                other
            ))),
        }
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Vec<f64>> {
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| SimError::model("GBDT model has not been fitted"))?;
        check_prediction_input(x, self.n_features)?;
        let test_x = Self::to_data_vec(x, None);
        let predictions = model.predict(&test_x);
        Ok(predictions.into_iter().map(|p| p as f64).collect())
    }

    fn name(&self) -> &str {
        "GBDT"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn params() -> ModelConfig {
        ModelConfig {
            learning_rate: 0.1,
            model_type: ModelType::GBDT {
                max_depth: 3,
                num_boost_round: 20,
                debug: false,
                training_optimization_level: 2,
                loss_type: "LogLikelyhood".to_string(),
            },
        }
    }

    #[test]
    fn test_gbdt_classifier() {
        // Second feature alternates with the label, the others are noise or constant
        let x = Array2::from_shape_vec(
            (10, 3),
            vec![
                0.1, 1.0, 5.0, 0.4, -1.0, 5.0, 0.6, 1.0, 5.0, 0.9, -1.0, 5.0, 1.2, 1.0, 5.0, 1.5,
                -1.0, 5.0, 1.8, 1.0, 5.0, 2.1, -1.0, 5.0, 2.4, 1.0, 5.0, 2.7, -1.0, 5.0,
            ],
        )
        .unwrap();
        let y: Vec<bool> = (0..10).map(|i| i % 2 == 0).collect();

        let mut rng = StdRng::seed_from_u64(0);
        let mut classifier = GBDTClassifier::new(params());
        classifier.fit(&x, &y, &mut rng).unwrap();

        let predictions = classifier.predict_proba(&x).unwrap();
        assert_eq!(predictions.len(), 10);
        for (p, &label) in predictions.iter().zip(&y) {
            assert!((0.0..=1.0).contains(p));
            if label {
                assert!(*p > 0.5);
            } else {
                assert!(*p < 0.5);
            }
        }
    }

    #[test]
    fn extra_prediction_column_is_a_fit_error() {
        let x = Array2::from_shape_fn((10, 3), |(i, j)| match j {
            1 => (i % 2) as f64,
            _ => i as f64,
        });
        let y: Vec<bool> = (0..10).map(|i| i % 2 == 1).collect();
        let mut rng = StdRng::seed_from_u64(0);
        let mut classifier = GBDTClassifier::new(params());
        classifier.fit(&x, &y, &mut rng).unwrap();

        let wider = Array2::<f64>::zeros((2, 4));
        assert!(matches!(
            classifier.predict_proba(&wider),
            Err(SimError::ModelFit(_))
        ));
    }

    #[test]
    fn unsupported_loss_is_rejected() {
        let x = Array2::from_shape_vec((4, 1), vec![0.0, 1.0, 2.0, 3.0]).unwrap();
        let y = [false, false, true, true];
        let mut rng = StdRng::seed_from_u64(0);
        for loss in ["SquaredError", "binary:logistic", "logloss"] {
            let mut config = params();
            if let ModelType::GBDT { loss_type, .. } = &mut config.model_type {
                *loss_type = loss.to_string();
            }
            let mut classifier = GBDTClassifier::new(config);
            match classifier.fit(&x, &y, &mut rng) {
                Err(SimError::InvalidParameter(msg)) => assert!(msg.contains(loss)),
                other => panic!("{} was accepted: {:?}", loss, other),
            }
            assert!(classifier.predict_proba(&x).is_err());
        }
    }

    #[test]
    fn single_class_is_a_fit_error() {
        let x = Array2::from_shape_vec((4, 1), vec![0.0, 1.0, 2.0, 3.0]).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let mut classifier = GBDTClassifier::new(params());
        let err = classifier.fit(&x, &[true; 4], &mut rng);
        assert!(matches!(err, Err(SimError::ModelFit(_))));
    }

    #[test]
    fn predict_before_fit_fails() {
        let classifier = GBDTClassifier::new(params());
        let x = Array2::<f64>::zeros((2, 1));
        assert!(classifier.predict_proba(&x).is_err());
    }

    #[test]
    fn wrong_model_type_is_rejected() {
        let x = Array2::from_shape_vec((2, 1), vec![0.0, 1.0]).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let mut classifier = GBDTClassifier::new(ModelConfig::elastic_net());
        assert!(classifier.fit(&x, &[true, false], &mut rng).is_err());
    }
}
