//! edgesim: simulated tabular data with hand-designed signal structure.
//!
//! This crate generates labelled tables whose outcome mixes an additive linear
//! signal with a categorical equality interaction, encodes them into design
//! matrices, and compares a gradient boosted tree ensemble against a
//! cross-validated elastic net on the same train/test split. Recursive feature
//! elimination and permutation importance are provided to study how each model
//! family reacts to duplicated predictors.
//!
//! Every random draw goes through a caller-supplied generator, so a fixed seed
//! reproduces a run exactly.
pub mod comparison;
pub mod config;
pub mod design;
pub mod error;
pub mod experiment;
pub mod feature_selection;
pub mod models;
pub mod preprocessing;
pub mod report;
pub mod simulate;
pub mod stats;

pub use error::{Result, SimError};
