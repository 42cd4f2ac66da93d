//! Model services consumed by the comparison harness and feature selection.
//!
//! Both model families sit behind `ClassifierModel`; `factory::build_model`
//! picks the implementation from a `ModelConfig`.
pub mod classifier_trait;
pub mod elastic_net;
pub mod factory;
pub mod gbdt;

pub use classifier_trait::ClassifierModel;
pub use factory::build_model;
