//! Design matrices and the encoder that builds them.
//!
//! The encoder is learned on a training frame and then applied unchanged to
//! any other frame, so train and test matrices always share the same columns
//! in the same order.
use ndarray::Array2;

use crate::error::{Result, SimError};
use crate::simulate::{ColumnData, Frame};

/// Numeric matrix with named columns.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignMatrix {
    pub x: Array2<f64>,
    pub names: Vec<String>,
}

impl DesignMatrix {
    pub fn nrows(&self) -> usize {
        self.x.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.x.ncols()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Keep only the given columns, in the order given.
    pub fn select_columns(&self, indices: &[usize]) -> DesignMatrix {
        DesignMatrix {
            x: self.x.select(ndarray::Axis(1), indices),
            names: indices.iter().map(|&i| self.names[i].clone()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Term {
    /// Numeric, outcome or identifier column copied as-is.
    Value(String),
    /// One 0/1 indicator per categorical level seen at fit time.
    Indicators { column: String, levels: Vec<char> },
    /// Boolean column encoded as 0/1.
    Flag(String),
}

/// Category-to-indicator expansion learned from a training frame.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignEncoder {
    terms: Vec<Term>,
    names: Vec<String>,
}

impl DesignEncoder {
    /// Learn the expansion of `predictors` from `frame`.
    pub fn fit<S: AsRef<str>>(frame: &Frame, predictors: &[S]) -> Result<Self> {
        if predictors.is_empty() {
            return Err(SimError::invalid("predictor list is empty"));
        }

        let mut terms = Vec::with_capacity(predictors.len());
        let mut names = Vec::new();
        for predictor in predictors {
            let predictor = predictor.as_ref();
            let (_, data) = frame.column(predictor)?;
            match data {
                ColumnData::Integer(_) | ColumnData::Numeric(_) => {
                    names.push(predictor.to_string());
                    terms.push(Term::Value(predictor.to_string()));
                }
                ColumnData::Boolean(_) => {
                    names.push(predictor.to_string());
                    terms.push(Term::Flag(predictor.to_string()));
                }
                ColumnData::Categorical(values) => {
                    let mut levels = values.clone();
                    levels.sort_unstable();
                    levels.dedup();
                    for level in &levels {
                        names.push(format!("{}{}", predictor, level));
                    }
                    terms.push(Term::Indicators {
                        column: predictor.to_string(),
                        levels,
                    });
                }
            }
        }

        log::debug!(
            "Design encoder: {} predictors expanded to {} columns",
            predictors.len(),
            names.len()
        );

        Ok(DesignEncoder { terms, names })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn ncols(&self) -> usize {
        self.names.len()
    }

    /// Apply the learned expansion to `frame`.
    pub fn transform(&self, frame: &Frame) -> Result<DesignMatrix> {
        let nrows = frame.nrows();
        let mut x = Array2::<f64>::zeros((nrows, self.names.len()));
        let mut col = 0usize;

        for term in &self.terms {
            match term {
                Term::Value(name) => {
                    match frame.column(name)?.1 {
                        ColumnData::Numeric(v) => {
                            for (r, value) in v.iter().enumerate() {
                                x[(r, col)] = *value;
                            }
                        }
                        ColumnData::Integer(v) => {
                            for (r, value) in v.iter().enumerate() {
                                x[(r, col)] = *value as f64;
                            }
                        }
                        _ => {
                            return Err(SimError::shape(format!(
                                "column '{}' changed kind since the encoder was fitted",
                                name
                            )))
                        }
                    }
                    col += 1;
                }
                Term::Flag(name) => {
                    let v = frame.labels(name)?;
                    for (r, value) in v.iter().enumerate() {
                        x[(r, col)] = if *value { 1.0 } else { 0.0 };
                    }
                    col += 1;
                }
                Term::Indicators { column, levels } => {
                    let v = frame.categorical(column)?;
                    for (r, value) in v.iter().enumerate() {
                        // levels unseen at fit time stay all-zero
                        if let Ok(k) = levels.binary_search(value) {
                            x[(r, col + k)] = 1.0;
                        }
                    }
                    col += levels.len();
                }
            }
        }

        Ok(DesignMatrix {
            x,
            names: self.names.clone(),
        })
    }
}

/// Read a boolean label column.
pub fn label_vector(frame: &Frame, label: &str) -> Result<Vec<bool>> {
    Ok(frame.labels(label)?.to_vec())
}
