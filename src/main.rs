use anyhow::{Context, Result};
use clap::{Arg, Command, ValueHint};
use log::LevelFilter;
use std::path::PathBuf;

use edgesim::config::{load_experiment_config, ExperimentConfig};
use edgesim::experiment::run_experiment;

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("EDGESIM_LOG", "error,edgesim=info"))
        .init();

    let matches = Command::new("edgesim")
        .version(clap::crate_version!())
        .about("Compare a tree ensemble and a cross-validated elastic net on simulated data")
        .arg(
            Arg::new("seed")
                .short('s')
                .long("seed")
                .help("Seed of the random generator. Overrides the seed in the configuration file.")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("Path to a JSON experiment configuration. Missing fields take their defaults.")
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("Write an HTML report to this path")
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath),
        )
        .get_matches();

    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => {
            log::info!("Using config: {:?}", path);
            load_experiment_config(path)?
        }
        None => ExperimentConfig::default(),
    };
    if let Some(seed) = matches.get_one::<u64>("seed") {
        config.seed = *seed;
    }

    let result = run_experiment(&config).context("Experiment failed")?;

    println!("seed: {}", config.seed);
    println!("training cutoff: {:.4}", result.train_cutoff);
    for score in &result.comparison.scores {
        println!("{} AUC: {:.4}", score.model, score.auc);
    }
    if let Some(name) = &result.duplicated {
        println!("duplicated: {} x{}", name, config.duplicates);
    }
    println!(
        "RFE selected {} predictors: {}",
        result.rfe.best_size,
        result.rfe.selected.join(", ")
    );

    if let Some(path) = matches.get_one::<PathBuf>("output") {
        let report = result.to_report(&config)?;
        report
            .save_to_file(path)
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
    }

    Ok(())
}
