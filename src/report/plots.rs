use plotly::common::{DashType, ErrorData, ErrorType, Line, Mode};
use plotly::layout::{Axis, Layout};
use plotly::{Bar, Plot, Scatter};

use crate::comparison::ModelScore;
use crate::error::{Result, SimError};
use crate::feature_selection::RfeResult;

/// Overlay the ROC curves of several models on shared axes, with the
/// chance diagonal for reference.
pub fn plot_roc_curves(scores: &[ModelScore], title: &str) -> Plot {
    let mut plot = Plot::new();

    for score in scores {
        let legend = format!("{} (AUC = {:.3})", score.model, score.auc);
        let trace = Scatter::new(score.curve.fpr.clone(), score.curve.tpr.clone())
            .mode(Mode::Lines)
            .name(legend.as_str());
        plot.add_trace(trace);
    }

    let reference_line = Scatter::new(vec![0.0, 1.0], vec![0.0, 1.0])
        .mode(Mode::Lines)
        .name("Chance")
        .line(Line::new().color("grey").dash(DashType::Dash));
    plot.add_trace(reference_line);

    plot.set_layout(
        Layout::new()
            .title(title)
            .x_axis(Axis::new().title("False positive rate").range(vec![0.0, 1.0]))
            .y_axis(Axis::new().title("True positive rate").range(vec![0.0, 1.0])),
    );

    plot
}

/// Held-out AUC against subset size, with one standard deviation error bars.
pub fn plot_rfe_profile(result: &RfeResult, title: &str) -> Plot {
    let sizes: Vec<f64> = result.profile.iter().map(|s| s.size as f64).collect();
    let mean: Vec<f64> = result.profile.iter().map(|s| s.mean_auc).collect();
    let sd: Vec<f64> = result.profile.iter().map(|s| s.sd_auc).collect();

    let mut plot = Plot::new();
    plot.add_trace(
        Scatter::new(sizes, mean)
            .mode(Mode::LinesMarkers)
            .name("Mean held-out AUC")
            .error_y(ErrorData::new(ErrorType::Data).array(sd)),
    );
    plot.set_layout(
        Layout::new()
            .title(title)
            .x_axis(Axis::new().title("Number of predictors"))
            .y_axis(Axis::new().title("AUC")),
    );
    plot
}

/// Bar chart of importance values, in the order given.
pub fn plot_importance(names: &[String], importance: &[f64], title: &str) -> Result<Plot> {
    if names.len() != importance.len() {
        return Err(SimError::shape(format!(
            "{} names but {} importance values",
            names.len(),
            importance.len()
        )));
    }

    let mut plot = Plot::new();
    plot.add_trace(Bar::new(names.to_vec(), importance.to_vec()).name("Importance"));
    plot.set_layout(
        Layout::new()
            .title(title)
            .x_axis(Axis::new().title("Predictor"))
            .y_axis(Axis::new().title("Mean Brier score increase")),
    );
    Ok(plot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn importance_lengths_must_match() {
        let names = vec!["num_1".to_string(), "num_2".to_string()];
        assert!(plot_importance(&names, &[0.1], "x").is_err());
        let plot = plot_importance(&names, &[0.1, 0.0], "Importance").unwrap();
        assert!(plot.to_json().contains("num_2"));
    }
}
