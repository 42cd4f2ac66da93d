use crate::config::{ModelConfig, ModelType};
use crate::models::classifier_trait::ClassifierModel;
use crate::models::elastic_net::CvElasticNet;
use crate::models::gbdt::GBDTClassifier;

/// Build a boxed classifier model from a `ModelConfig`.
pub fn build_model(params: ModelConfig) -> Box<dyn ClassifierModel> {
    match params.model_type {
        ModelType::GBDT { .. } => Box::new(GBDTClassifier::new(params)),
        ModelType::ElasticNet { .. } => Box::new(CvElasticNet::new(params)),
    }
}
