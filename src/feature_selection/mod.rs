//! Feature selection utilities.
//!
//! `importance` scores predictors of a fitted model by permutation and
//! `rfe` wraps that ranking in a cross-validated recursive elimination.
pub mod importance;
pub mod rfe;

pub use importance::{feature_importance, permutation_importance, rank_features};
pub use rfe::{RecursiveFeatureElimination, RfeResult, RfeStep};
