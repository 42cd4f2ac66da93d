use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Penalty selection rule of the cross-validated elastic net.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LambdaRule {
    /// Penalty with the lowest mean cross-validated error.
    Min,
    /// Largest penalty whose error is within one standard error of the minimum.
    OneStandardError,
}

/// Central configuration for models in the crate.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ModelConfig {
    pub learning_rate: f32,

    #[serde(flatten)]
    pub model_type: ModelType,
}

/// Supported model types and their hyper-parameters.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub enum ModelType {
    GBDT {
        max_depth: u32,
        num_boost_round: u32,
        debug: bool,
        training_optimization_level: u8,
        loss_type: String,
    },
    ElasticNet {
        l1_ratio: f64,
        n_lambda: usize,
        lambda_min_ratio: f64,
        n_folds: usize,
        lambda_rule: LambdaRule,
        max_iterations: u32,
        tolerance: f64,
    },
}

impl Default for ModelType {
    fn default() -> Self {
        ModelType::GBDT {
            max_depth: 4,
            num_boost_round: 50,
            debug: false,
            training_optimization_level: 2,
            loss_type: "LogLikelyhood".to_string(),
        }
    }
}

impl ModelType {
    pub fn elastic_net() -> Self {
        ModelType::ElasticNet {
            l1_ratio: 0.5,
            n_lambda: 30,
            lambda_min_ratio: 1e-3,
            n_folds: 5,
            lambda_rule: LambdaRule::OneStandardError,
            max_iterations: 1000,
            tolerance: 1e-4,
        }
    }
}

impl FromStr for ModelType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gbdt" => Ok(ModelType::default()),
            "elastic_net" | "elasticnet" | "glmnet" => Ok(ModelType::elastic_net()),
            _ => Err(format!(
                "Unknown model type: {}. Valid options are: gbdt, elastic_net",
                s
            )),
        }
    }
}

impl ModelConfig {
    pub fn new(learning_rate: f32, model_type: ModelType) -> Self {
        Self {
            learning_rate,
            model_type,
        }
    }

    pub fn gbdt() -> Self {
        Self::default()
    }

    pub fn elastic_net() -> Self {
        Self::new(0.0, ModelType::elastic_net())
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            model_type: ModelType::default(),
        }
    }
}

/// The two models compared by the harness.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ComparisonConfig {
    pub tree_ensemble: ModelConfig,
    pub linear: ModelConfig,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            tree_ensemble: ModelConfig::gbdt(),
            linear: ModelConfig::elastic_net(),
        }
    }
}

/// Recursive feature elimination settings.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct RfeConfig {
    pub model: ModelConfig,
    pub sizes: Vec<usize>,
    pub n_folds: usize,
    pub n_repeats: usize,
    pub rerank: bool,
    pub tolerance_pct: Option<f64>,
}

impl Default for RfeConfig {
    fn default() -> Self {
        Self {
            model: ModelConfig::new(
                0.1,
                ModelType::GBDT {
                    max_depth: 3,
                    num_boost_round: 30,
                    debug: false,
                    training_optimization_level: 2,
                    loss_type: "LogLikelyhood".to_string(),
                },
            ),
            sizes: vec![1, 2, 3, 4, 6, 8],
            n_folds: 5,
            n_repeats: 3,
            rerank: true,
            tolerance_pct: None,
        }
    }
}

/// Parameters of the end-to-end run: simulation, comparison and the
/// redundancy experiment.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ExperimentConfig {
    pub seed: u64,
    pub train_rows: usize,
    pub test_rows: usize,
    pub num_categorical: usize,
    pub cardinality: usize,
    pub num_numeric: usize,
    pub noise_sd: f64,
    pub quantile: f64,
    pub weight: f64,
    pub interaction: f64,
    /// Label the test table with the cutoff computed on the training table.
    pub share_cutoff: bool,
    /// Copies of the most informative numeric column added before RFE.
    pub duplicates: usize,
    pub comparison: ComparisonConfig,
    pub rfe: RfeConfig,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            train_rows: 1000,
            test_rows: 1000,
            num_categorical: 2,
            cardinality: 2,
            num_numeric: 3,
            noise_sd: 1.0,
            quantile: 0.95,
            weight: 4.0,
            interaction: 10.0,
            share_cutoff: true,
            duplicates: 10,
            comparison: ComparisonConfig::default(),
            rfe: RfeConfig::default(),
        }
    }
}

/// Load an experiment configuration from a JSON file. Missing fields take
/// their defaults.
pub fn load_experiment_config<P: AsRef<Path>>(path: P) -> Result<ExperimentConfig> {
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config: {}", path.as_ref().display()))?;
    let config: ExperimentConfig = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config: {}", path.as_ref().display()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_type_from_str() {
        assert!(matches!("GBDT".parse::<ModelType>(), Ok(ModelType::GBDT { .. })));
        assert!(matches!(
            "elastic_net".parse::<ModelType>(),
            Ok(ModelType::ElasticNet { .. })
        ));
        assert!("svm".parse::<ModelType>().is_err());
    }

    #[test]
    fn partial_experiment_json_uses_defaults() {
        let cfg: ExperimentConfig =
            serde_json::from_str(r#"{ "seed": 7, "duplicates": 3 }"#).unwrap();
        assert_eq!(cfg.seed, 7);
        assert_eq!(cfg.duplicates, 3);
        assert_eq!(cfg.train_rows, 1000);
        assert_eq!(cfg.comparison, ComparisonConfig::default());
    }

    #[test]
    fn model_config_round_trips_through_json() {
        let cfg = ModelConfig::elastic_net();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: ModelConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cfg);
    }
}
