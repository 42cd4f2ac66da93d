//! End-to-end run: simulate a train/test pair, compare the two model
//! families, then duplicate the most informative numeric predictor and watch
//! recursive feature elimination deal with the copies.
use maud::html;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::comparison::{compare_models, Comparison};
use crate::config::ExperimentConfig;
use crate::design::{label_vector, DesignEncoder};
use crate::error::{Result, SimError};
use crate::feature_selection::{feature_importance, RecursiveFeatureElimination, RfeResult};
use crate::report::{plot_importance, plot_rfe_profile, Report, ReportSection};
use crate::simulate::{simulate, EdgedOutcome, LabelThreshold, SimulationParams, LABEL_COLUMN};

/// Everything a run produces.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentReport {
    pub comparison: Comparison,
    /// Permutation importance of the tree ensemble on the training design,
    /// most important first.
    pub importance: Vec<(String, f64)>,
    /// Numeric column that was duplicated before feature elimination.
    pub duplicated: Option<String>,
    pub rfe: RfeResult,
    pub train_cutoff: f64,
    pub test_cutoff: f64,
}

impl ExperimentConfig {
    fn simulation_params(&self, num_rows: usize, threshold: LabelThreshold) -> SimulationParams {
        SimulationParams {
            num_rows,
            num_categorical: self.num_categorical,
            cardinality: self.cardinality,
            num_numeric: self.num_numeric,
            noise_sd: self.noise_sd,
            threshold,
        }
    }
}

pub fn run_experiment(config: &ExperimentConfig) -> Result<ExperimentReport> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let outcome = EdgedOutcome::new(config.weight, config.interaction);

    let train = simulate(
        &config.simulation_params(config.train_rows, LabelThreshold::Quantile(config.quantile)),
        Some(&outcome),
        &mut rng,
    )?;
    let train_cutoff = train
        .cutoff
        .ok_or_else(|| SimError::invalid("training table was simulated without an outcome"))?;

    let test_threshold = if config.share_cutoff {
        LabelThreshold::Fixed(train_cutoff)
    } else {
        LabelThreshold::Quantile(config.quantile)
    };
    let test = simulate(
        &config.simulation_params(config.test_rows, test_threshold),
        Some(&outcome),
        &mut rng,
    )?;
    let test_cutoff = test.cutoff.unwrap_or(train_cutoff);

    log::info!(
        "Simulated {} training and {} test rows (cutoffs {:.4} / {:.4})",
        train.frame.nrows(),
        test.frame.nrows(),
        train_cutoff,
        test_cutoff
    );

    let predictors = train.frame.schema().predictor_names();
    let comparison = compare_models(
        &train.frame,
        &test.frame,
        LABEL_COLUMN,
        &predictors,
        &config.comparison,
        &mut rng,
    )?;

    let y = label_vector(&train.frame, LABEL_COLUMN)?;
    let design = DesignEncoder::fit(&train.frame, &predictors)?.transform(&train.frame)?;
    let importance = feature_importance(
        &config.comparison.tree_ensemble,
        &design,
        &y,
        config.rfe.n_repeats,
        &mut rng,
    )?;

    let numeric = train.frame.schema().numeric_names();
    let duplicated = importance
        .iter()
        .map(|(name, _)| name)
        .find(|name| numeric.contains(*name))
        .cloned();

    let redundant = match (&duplicated, config.duplicates) {
        (_, 0) => train.frame.clone(),
        (Some(name), n) => {
            log::info!("Adding {} copies of '{}' before feature elimination", n, name);
            train.frame.repeat_column(name, n)?
        }
        (None, _) => {
            return Err(SimError::invalid(
                "duplicates requested but the table has no numeric predictor",
            ))
        }
    };

    let rfe_predictors = redundant.schema().predictor_names();
    let rfe_design = DesignEncoder::fit(&redundant, &rfe_predictors)?.transform(&redundant)?;
    let rfe =
        RecursiveFeatureElimination::new(config.rfe.clone()).fit(&rfe_design, &y, &mut rng)?;

    Ok(ExperimentReport {
        comparison,
        importance,
        duplicated: duplicated.filter(|_| config.duplicates > 0),
        rfe,
        train_cutoff,
        test_cutoff,
    })
}

impl ExperimentReport {
    pub fn to_report(&self, config: &ExperimentConfig) -> Result<Report> {
        let mut report = Report::new(
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION"),
            "Tree ensemble vs. elastic net on simulated data",
        );

        let mut overview = ReportSection::new("Overview");
        overview.add_content(html! {
            p {
                "Outcome = " (config.weight) " x linear ramp over " (config.num_numeric)
                " numeric columns + " (config.interaction) " x equality interaction of cat_1 and cat_2,"
                " plus N(0, " (config.noise_sd) ") noise. Label = outcome above the "
                (config.quantile) " quantile of the training outcome."
            }
            table {
                tr { th { "Seed" } td { (config.seed) } }
                tr { th { "Training rows" } td { (config.train_rows) } }
                tr { th { "Test rows" } td { (config.test_rows) } }
                tr { th { "Training cutoff" } td { (format!("{:.4}", self.train_cutoff)) } }
                tr { th { "Test cutoff" } td { (format!("{:.4}", self.test_cutoff)) } }
            }
        });
        report.add_section(overview);

        let mut models = ReportSection::new("Model comparison");
        models.add_content(html! {
            table {
                tr { th { "Model" } th { "Test AUC" } }
                @for score in &self.comparison.scores {
                    tr { td { (score.model) } td { (format!("{:.4}", score.auc)) } }
                }
            }
        });
        models.add_plot(self.comparison.plot());
        report.add_section(models);

        let (names, values): (Vec<String>, Vec<f64>) = self.importance.iter().cloned().unzip();
        let mut importance = ReportSection::new("Permutation importance");
        importance.add_plot(plot_importance(
            &names,
            &values,
            "Tree ensemble permutation importance",
        )?);
        report.add_section(importance);

        let mut rfe = ReportSection::new("Recursive feature elimination");
        if let Some(name) = &self.duplicated {
            rfe.add_content(html! {
                p { (config.duplicates) " exact copies of " code { (name) } " were added before elimination." }
            });
        }
        rfe.add_plot(plot_rfe_profile(&self.rfe, "Held-out AUC by subset size"));
        rfe.add_content(html! {
            p { "Selected " (self.rfe.best_size) " predictors: " (self.rfe.selected.join(", ")) }
            table {
                tr { th { "Predictor" } th { "Selection frequency" } }
                @for (name, freq) in &self.rfe.selection_frequency {
                    tr { td { (name) } td { (format!("{:.2}", freq)) } }
                }
            }
        });
        report.add_section(rfe);

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RfeConfig;

    fn small_config() -> ExperimentConfig {
        ExperimentConfig {
            train_rows: 200,
            test_rows: 150,
            quantile: 0.8,
            duplicates: 2,
            rfe: RfeConfig {
                sizes: vec![1, 2],
                n_folds: 3,
                n_repeats: 1,
                ..RfeConfig::default()
            },
            ..ExperimentConfig::default()
        }
    }

    #[test]
    fn shared_cutoff_and_duplicates() {
        let config = small_config();
        let result = run_experiment(&config).unwrap();
        assert_eq!(result.train_cutoff, result.test_cutoff);
        assert_eq!(result.comparison.scores.len(), 2);

        let duplicated = result.duplicated.clone().unwrap();
        assert!(duplicated.starts_with("num_"));
        // 2 x 2 indicators, 3 numeric columns and 2 copies
        assert_eq!(result.rfe.selection_frequency.len(), 9);

        let html = result.to_report(&config).unwrap().render();
        assert!(html.contains(&duplicated));
    }

    #[test]
    fn per_table_quantile_when_not_shared() {
        let config = ExperimentConfig {
            share_cutoff: false,
            duplicates: 0,
            ..small_config()
        };
        let result = run_experiment(&config).unwrap();
        assert_ne!(result.train_cutoff, result.test_cutoff);
        assert!(result.duplicated.is_none());
        assert_eq!(result.rfe.selection_frequency.len(), 7);
    }
}
