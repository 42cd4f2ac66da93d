//! HTML report and the plots that go into it.
pub mod plots;
pub mod report;

pub use plots::{plot_importance, plot_rfe_profile, plot_roc_curves};
pub use report::{Report, ReportSection};
