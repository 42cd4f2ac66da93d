use edgesim::config::RfeConfig;
use edgesim::design::{label_vector, DesignEncoder};
use edgesim::feature_selection::RecursiveFeatureElimination;
use edgesim::simulate::{simulate, Frame, LabelThreshold, SimulationParams, LABEL_COLUMN};
use edgesim::SimError;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn num_1_signal(frame: &Frame) -> edgesim::Result<Vec<f64>> {
    Ok(frame.numeric("num_1")?.iter().map(|v| 5.0 * v).collect())
}

fn redundant_design(seed: u64) -> (edgesim::design::DesignMatrix, Vec<bool>) {
    let params = SimulationParams {
        num_rows: 300,
        threshold: LabelThreshold::Quantile(0.7),
        ..SimulationParams::default()
    };
    let mut rng = StdRng::seed_from_u64(seed);
    let sim = simulate(&params, Some(&num_1_signal), &mut rng).unwrap();
    let frame = sim.frame.repeat_column("num_1", 10).unwrap();
    let predictors = frame.schema().predictor_names();
    let design = DesignEncoder::fit(&frame, &predictors)
        .unwrap()
        .transform(&frame)
        .unwrap();
    let y = label_vector(&frame, LABEL_COLUMN).unwrap();
    (design, y)
}

#[test]
fn elimination_keeps_a_single_copy_of_a_duplicated_predictor() {
    let (design, y) = redundant_design(21);
    assert_eq!(design.ncols(), 4 + 3 + 10);

    let rfe = RecursiveFeatureElimination::new(RfeConfig {
        sizes: vec![1, 2, 4],
        n_folds: 3,
        tolerance_pct: Some(2.0),
        ..RfeConfig::default()
    });
    let mut rng = StdRng::seed_from_u64(22);
    let result = rfe.fit(&design, &y, &mut rng).unwrap();

    let copies = result
        .selected
        .iter()
        .filter(|name| name.starts_with("num_1"))
        .count();
    assert_eq!(copies, 1, "selected: {:?}", result.selected);

    let sizes: Vec<usize> = result.profile.iter().map(|s| s.size).collect();
    assert_eq!(sizes, vec![1, 2, 4, 17]);
    assert!(result.profile.iter().all(|s| (0.0..=1.0).contains(&s.mean_auc)));

    assert_eq!(result.ranking.len(), 17);
    assert!(result.ranking[0].0.starts_with("num_1"));
    assert_eq!(result.selection_frequency.len(), 17);
}

#[test]
fn invalid_sizes_are_rejected() {
    let (design, y) = redundant_design(23);
    let mut rng = StdRng::seed_from_u64(24);
    for sizes in [vec![], vec![0, 2]] {
        let rfe = RecursiveFeatureElimination::new(RfeConfig {
            sizes,
            ..RfeConfig::default()
        });
        assert!(matches!(
            rfe.fit(&design, &y, &mut rng),
            Err(SimError::InvalidParameter(_))
        ));
    }
}
