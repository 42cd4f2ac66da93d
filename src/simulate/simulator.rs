use rand::distributions::Distribution;
use rand::Rng;
use serde::{Deserialize, Serialize};
use statrs::distribution::Normal;

use crate::error::{Result, SimError};
use crate::simulate::frame::{ColumnData, Frame};
use crate::simulate::outcome::OutcomeFn;
use crate::simulate::schema::{ColumnKind, Schema, ALPHABET};
use crate::stats::quantile;

/// How the boolean label is cut from the continuous outcome.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelThreshold {
    /// Empirical quantile of the table's own outcome at this probability.
    Quantile(f64),
    /// A cutoff computed elsewhere, typically on the training table.
    Fixed(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationParams {
    pub num_rows: usize,
    pub num_categorical: usize,
    pub cardinality: usize,
    pub num_numeric: usize,
    pub noise_sd: f64,
    pub threshold: LabelThreshold,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            num_rows: 1000,
            num_categorical: 2,
            cardinality: 2,
            num_numeric: 3,
            noise_sd: 1.0,
            threshold: LabelThreshold::Quantile(0.95),
        }
    }
}

impl SimulationParams {
    pub fn validate(&self) -> Result<()> {
        if self.num_rows == 0 {
            return Err(SimError::invalid("num_rows must be greater than 0"));
        }
        if self.cardinality == 0 || self.cardinality > ALPHABET.len() {
            return Err(SimError::invalid(format!(
                "cardinality must be between 1 and {}, got {}",
                ALPHABET.len(),
                self.cardinality
            )));
        }
        if !self.noise_sd.is_finite() || self.noise_sd < 0.0 {
            return Err(SimError::invalid(format!(
                "noise_sd must be finite and non-negative, got {}",
                self.noise_sd
            )));
        }
        match self.threshold {
            LabelThreshold::Quantile(p) if !(p > 0.0 && p < 1.0) => Err(SimError::invalid(
                format!("quantile must lie strictly between 0 and 1, got {}", p),
            )),
            LabelThreshold::Fixed(c) if !c.is_finite() => Err(SimError::invalid(format!(
                "fixed cutoff must be finite, got {}",
                c
            ))),
            _ => Ok(()),
        }
    }
}

/// A simulated table and the cutoff its label was derived with.
#[derive(Debug, Clone, PartialEq)]
pub struct Simulation {
    pub frame: Frame,
    pub cutoff: Option<f64>,
}

/// Generate a synthetic table.
///
/// Draws happen in a fixed order: every categorical column (column by
/// column), then every numeric column, then one noise draw per row when an
/// outcome function is given. Re-running with an identically seeded generator
/// yields an identical table.
pub fn simulate<R: Rng + ?Sized>(
    params: &SimulationParams,
    outcome_fn: Option<&dyn OutcomeFn>,
    rng: &mut R,
) -> Result<Simulation> {
    params.validate()?;

    let n = params.num_rows;
    let standard_normal =
        Normal::new(0.0, 1.0).map_err(|e| SimError::invalid(e.to_string()))?;

    let schema = Schema::for_simulation(
        params.num_categorical,
        params.cardinality,
        params.num_numeric,
        false,
    )?;

    let mut columns = Vec::with_capacity(schema.len());
    for spec in schema.columns() {
        let data = match spec.kind {
            ColumnKind::Identifier => ColumnData::Integer((1..=n as u64).collect()),
            ColumnKind::Categorical { cardinality } => ColumnData::Categorical(
                (0..n)
                    .map(|_| ALPHABET[rng.gen_range(0..cardinality)])
                    .collect(),
            ),
            ColumnKind::Numeric => {
                ColumnData::Numeric((0..n).map(|_| standard_normal.sample(rng)).collect())
            }
            ColumnKind::Outcome | ColumnKind::Label => {
                return Err(SimError::shape(format!(
                    "column '{}' cannot be drawn before the outcome",
                    spec.name
                )))
            }
        };
        columns.push(data);
    }
    let frame = Frame::new(schema, columns)?;

    let Some(outcome_fn) = outcome_fn else {
        log::debug!(
            "Simulated {} rows x {} columns without outcome",
            frame.nrows(),
            frame.ncols()
        );
        return Ok(Simulation {
            frame,
            cutoff: None,
        });
    };

    let mut outcome = outcome_fn.evaluate(&frame)?;
    if outcome.len() != n {
        return Err(SimError::shape(format!(
            "outcome function returned {} values for {} rows",
            outcome.len(),
            n
        )));
    }
    for v in outcome.iter_mut() {
        *v += params.noise_sd * standard_normal.sample(rng);
    }

    let cutoff = match params.threshold {
        LabelThreshold::Quantile(p) => quantile(&outcome, p)?,
        LabelThreshold::Fixed(c) => c,
    };
    let label: Vec<bool> = outcome.iter().map(|&v| v > cutoff).collect();

    log::debug!(
        "Simulated {} rows; cutoff {:.4} gives {} positive labels",
        n,
        cutoff,
        label.iter().filter(|&&l| l).count()
    );

    let full = Schema::for_simulation(
        params.num_categorical,
        params.cardinality,
        params.num_numeric,
        true,
    )?;
    let outcome_spec = full.columns()[full.len() - 2].clone();
    let label_spec = full.columns()[full.len() - 1].clone();

    let frame = frame
        .with_column(outcome_spec, ColumnData::Numeric(outcome))?
        .with_column(label_spec, ColumnData::Boolean(label))?;

    Ok(Simulation {
        frame,
        cutoff: Some(cutoff),
    })
}
