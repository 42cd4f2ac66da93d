use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

pub const ID_COLUMN: &str = "id";
pub const OUTCOME_COLUMN: &str = "outcome";
pub const LABEL_COLUMN: &str = "label";

/// Letters categorical values are drawn from.
pub const ALPHABET: [char; 26] = [
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r',
    's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Identifier,
    Categorical { cardinality: usize },
    Numeric,
    Outcome,
    Label,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub kind: ColumnKind,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

pub fn categorical_name(index: usize) -> String {
    format!("cat_{}", index)
}

pub fn numeric_name(index: usize) -> String {
    format!("num_{}", index)
}

/// Ordered list of typed columns. Names are unique.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Schema {
    columns: Vec<ColumnSpec>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schema of a simulated table: `id`, `cat_1..cat_C`, `num_1..num_M` and,
    /// when an outcome function is used, `outcome` and `label`.
    pub fn for_simulation(
        num_categorical: usize,
        cardinality: usize,
        num_numeric: usize,
        with_outcome: bool,
    ) -> Result<Self> {
        let mut schema = Schema::new();
        schema.push(ColumnSpec::new(ID_COLUMN, ColumnKind::Identifier))?;
        for i in 1..=num_categorical {
            schema.push(ColumnSpec::new(
                categorical_name(i),
                ColumnKind::Categorical { cardinality },
            ))?;
        }
        for i in 1..=num_numeric {
            schema.push(ColumnSpec::new(numeric_name(i), ColumnKind::Numeric))?;
        }
        if with_outcome {
            schema.push(ColumnSpec::new(OUTCOME_COLUMN, ColumnKind::Outcome))?;
            schema.push(ColumnSpec::new(LABEL_COLUMN, ColumnKind::Label))?;
        }
        Ok(schema)
    }

    pub fn push(&mut self, spec: ColumnSpec) -> Result<()> {
        if self.position(&spec.name).is_some() {
            return Err(SimError::shape(format!(
                "column '{}' already exists",
                spec.name
            )));
        }
        self.columns.push(spec);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Names of the columns with the given kind predicate, in schema order.
    pub fn names_where<F>(&self, mut pred: F) -> Vec<String>
    where
        F: FnMut(&ColumnKind) -> bool,
    {
        self.columns
            .iter()
            .filter(|c| pred(&c.kind))
            .map(|c| c.name.clone())
            .collect()
    }

    pub fn numeric_names(&self) -> Vec<String> {
        self.names_where(|k| matches!(k, ColumnKind::Numeric))
    }

    pub fn categorical_names(&self) -> Vec<String> {
        self.names_where(|k| matches!(k, ColumnKind::Categorical { .. }))
    }

    /// Categorical and numeric columns, the predictors of a simulated table.
    pub fn predictor_names(&self) -> Vec<String> {
        self.names_where(|k| matches!(k, ColumnKind::Categorical { .. } | ColumnKind::Numeric))
    }
}
