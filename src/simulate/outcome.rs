use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::simulate::frame::Frame;
use crate::simulate::schema::categorical_name;

/// Deterministic outcome of a simulated table, evaluated before noise is added.
pub trait OutcomeFn {
    fn evaluate(&self, frame: &Frame) -> Result<Vec<f64>>;
}

impl<F> OutcomeFn for F
where
    F: Fn(&Frame) -> Result<Vec<f64>>,
{
    fn evaluate(&self, frame: &Frame) -> Result<Vec<f64>> {
        self(frame)
    }
}

/// Value added when the two interaction columns agree and subtracted otherwise.
pub const INTERACTION_BONUS: f64 = 1.0;

/// Linear ramp over the numeric columns plus an equality interaction between
/// two categorical columns.
///
/// ```text
/// outcome = weight * sum_j (j / M) * num_j
///         + interaction * (bonus if first == second else -bonus)
/// ```
///
/// The ramp is easy for a linear model and the interaction is only visible to
/// a model that can partition on both categorical columns at once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgedOutcome {
    pub weight: f64,
    pub interaction: f64,
    pub first: String,
    pub second: String,
}

impl EdgedOutcome {
    pub fn new(weight: f64, interaction: f64) -> Self {
        Self {
            weight,
            interaction,
            first: categorical_name(1),
            second: categorical_name(2),
        }
    }

    /// Ramp weight of the `j`-th (1-based) of `m` numeric columns.
    pub fn ramp_weight(&self, j: usize, m: usize) -> f64 {
        self.weight * j as f64 / m as f64
    }
}

impl OutcomeFn for EdgedOutcome {
    fn evaluate(&self, frame: &Frame) -> Result<Vec<f64>> {
        let n = frame.nrows();
        let numeric = frame.schema().numeric_names();
        let m = numeric.len();
        let mut out = vec![0.0f64; n];

        for (j, name) in numeric.iter().enumerate() {
            let w = self.ramp_weight(j + 1, m);
            for (acc, v) in out.iter_mut().zip(frame.numeric(name)?) {
                *acc += w * v;
            }
        }

        let first = frame.categorical(&self.first)?;
        let second = frame.categorical(&self.second)?;
        if self.first == self.second {
            return Err(SimError::invalid(format!(
                "interaction needs two distinct columns, got '{}' twice",
                self.first
            )));
        }
        for (acc, (a, b)) in out.iter_mut().zip(first.iter().zip(second)) {
            let sign = if a == b { 1.0 } else { -1.0 };
            *acc += self.interaction * sign * INTERACTION_BONUS;
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulate::frame::ColumnData;
    use crate::simulate::schema::{ColumnKind, ColumnSpec, Schema};

    fn frame() -> Frame {
        let mut schema = Schema::new();
        for (name, kind) in [
            ("cat_1", ColumnKind::Categorical { cardinality: 2 }),
            ("cat_2", ColumnKind::Categorical { cardinality: 2 }),
            ("num_1", ColumnKind::Numeric),
            ("num_2", ColumnKind::Numeric),
        ] {
            schema.push(ColumnSpec::new(name, kind)).unwrap();
        }
        Frame::new(
            schema,
            vec![
                ColumnData::Categorical(vec!['a', 'a']),
                ColumnData::Categorical(vec!['a', 'b']),
                ColumnData::Numeric(vec![1.0, 0.0]),
                ColumnData::Numeric(vec![2.0, 1.0]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn edged_outcome_values() {
        let outcome = EdgedOutcome::new(4.0, 10.0).evaluate(&frame()).unwrap();
        // row 0: 4 * (0.5 * 1 + 1.0 * 2) + 10
        assert!((outcome[0] - 20.0).abs() < 1e-12);
        // row 1: 4 * (0.5 * 0 + 1.0 * 1) - 10
        assert!((outcome[1] + 6.0).abs() < 1e-12);
    }

    #[test]
    fn missing_interaction_column() {
        let mut edged = EdgedOutcome::new(1.0, 1.0);
        edged.second = "cat_9".to_string();
        assert!(matches!(edged.evaluate(&frame()), Err(SimError::DataShape(_))));
    }
}
