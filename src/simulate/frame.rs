//! Immutable column-oriented table used for simulated datasets.
use std::io::Write;

use crate::error::{Result, SimError};
use crate::simulate::schema::{ColumnKind, ColumnSpec, Schema};

/// Values of one column. The variant must agree with the column's `ColumnKind`.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Integer(Vec<u64>),
    Categorical(Vec<char>),
    Numeric(Vec<f64>),
    Boolean(Vec<bool>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Integer(v) => v.len(),
            ColumnData::Categorical(v) => v.len(),
            ColumnData::Numeric(v) => v.len(),
            ColumnData::Boolean(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn fits(&self, kind: &ColumnKind) -> bool {
        matches!(
            (kind, self),
            (ColumnKind::Identifier, ColumnData::Integer(_))
                | (ColumnKind::Categorical { .. }, ColumnData::Categorical(_))
                | (ColumnKind::Numeric, ColumnData::Numeric(_))
                | (ColumnKind::Outcome, ColumnData::Numeric(_))
                | (ColumnKind::Label, ColumnData::Boolean(_))
        )
    }

    fn render(&self, row: usize) -> String {
        match self {
            ColumnData::Integer(v) => v[row].to_string(),
            ColumnData::Categorical(v) => v[row].to_string(),
            ColumnData::Numeric(v) => v[row].to_string(),
            ColumnData::Boolean(v) => {
                if v[row] {
                    "TRUE".to_string()
                } else {
                    "FALSE".to_string()
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    schema: Schema,
    columns: Vec<ColumnData>,
    nrows: usize,
}

impl Frame {
    /// Build a frame, checking that every column matches its spec and that all
    /// columns have the same length.
    pub fn new(schema: Schema, columns: Vec<ColumnData>) -> Result<Self> {
        if schema.len() != columns.len() {
            return Err(SimError::shape(format!(
                "schema has {} columns but {} were supplied",
                schema.len(),
                columns.len()
            )));
        }
        let nrows = columns.first().map(ColumnData::len).unwrap_or(0);
        for (spec, data) in schema.columns().iter().zip(columns.iter()) {
            if !data.fits(&spec.kind) {
                return Err(SimError::shape(format!(
                    "column '{}' data does not match kind {:?}",
                    spec.name, spec.kind
                )));
            }
            if data.len() != nrows {
                return Err(SimError::shape(format!(
                    "column '{}' has {} rows, expected {}",
                    spec.name,
                    data.len(),
                    nrows
                )));
            }
        }
        Ok(Frame {
            schema,
            columns,
            nrows,
        })
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn column(&self, name: &str) -> Result<(&ColumnSpec, &ColumnData)> {
        let idx = self
            .schema
            .position(name)
            .ok_or_else(|| SimError::shape(format!("column '{}' not found", name)))?;
        Ok((&self.schema.columns()[idx], &self.columns[idx]))
    }

    pub fn numeric(&self, name: &str) -> Result<&[f64]> {
        match self.column(name)? {
            (_, ColumnData::Numeric(v)) => Ok(v),
            (spec, _) => Err(SimError::shape(format!(
                "column '{}' is {:?}, not numeric",
                name, spec.kind
            ))),
        }
    }

    pub fn categorical(&self, name: &str) -> Result<&[char]> {
        match self.column(name)? {
            (_, ColumnData::Categorical(v)) => Ok(v),
            (spec, _) => Err(SimError::shape(format!(
                "column '{}' is {:?}, not categorical",
                name, spec.kind
            ))),
        }
    }

    pub fn labels(&self, name: &str) -> Result<&[bool]> {
        match self.column(name)? {
            (_, ColumnData::Boolean(v)) => Ok(v),
            (spec, _) => Err(SimError::shape(format!(
                "column '{}' is {:?}, not a boolean label",
                name, spec.kind
            ))),
        }
    }

    pub fn identifiers(&self, name: &str) -> Result<&[u64]> {
        match self.column(name)? {
            (_, ColumnData::Integer(v)) => Ok(v),
            (spec, _) => Err(SimError::shape(format!(
                "column '{}' is {:?}, not an identifier",
                name, spec.kind
            ))),
        }
    }

    /// Return a new frame with `data` appended under `spec`.
    pub fn with_column(&self, spec: ColumnSpec, data: ColumnData) -> Result<Frame> {
        let mut schema = self.schema.clone();
        schema.push(spec)?;
        let mut columns = self.columns.clone();
        columns.push(data);
        Frame::new(schema, columns)
    }

    /// Return a new frame with `n` exact copies of `source` appended as
    /// `{source}_dup1 .. {source}_dupN`.
    pub fn repeat_column(&self, source: &str, n: usize) -> Result<Frame> {
        let (spec, data) = self.column(source)?;
        let mut schema = self.schema.clone();
        let mut columns = self.columns.clone();
        for i in 1..=n {
            schema.push(ColumnSpec::new(format!("{}_dup{}", source, i), spec.kind))?;
            columns.push(data.clone());
        }
        log::debug!("Repeated column '{}' {} times", source, n);
        Frame::new(schema, columns)
    }

    /// Write the table as CSV with a header row.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(self.schema.names())?;
        for row in 0..self.nrows {
            wtr.write_record(self.columns.iter().map(|c| c.render(row)))?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn to_csv_string(&self) -> Result<String> {
        let mut buf = Vec::new();
        self.write_csv(&mut buf)?;
        String::from_utf8(buf).map_err(|e| SimError::shape(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulate::schema::ColumnKind;

    fn small_frame() -> Frame {
        let mut schema = Schema::new();
        schema.push(ColumnSpec::new("id", ColumnKind::Identifier)).unwrap();
        schema
            .push(ColumnSpec::new("cat_1", ColumnKind::Categorical { cardinality: 2 }))
            .unwrap();
        schema.push(ColumnSpec::new("num_1", ColumnKind::Numeric)).unwrap();
        schema.push(ColumnSpec::new("label", ColumnKind::Label)).unwrap();
        Frame::new(
            schema,
            vec![
                ColumnData::Integer(vec![1, 2, 3]),
                ColumnData::Categorical(vec!['a', 'b', 'a']),
                ColumnData::Numeric(vec![0.5, -1.25, 2.0]),
                ColumnData::Boolean(vec![true, false, true]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn rejects_ragged_columns() {
        let mut schema = Schema::new();
        schema.push(ColumnSpec::new("a", ColumnKind::Numeric)).unwrap();
        schema.push(ColumnSpec::new("b", ColumnKind::Numeric)).unwrap();
        let frame = Frame::new(
            schema,
            vec![
                ColumnData::Numeric(vec![1.0, 2.0]),
                ColumnData::Numeric(vec![1.0]),
            ],
        );
        assert!(matches!(frame, Err(SimError::DataShape(_))));
    }

    #[test]
    fn rejects_kind_mismatch() {
        let mut schema = Schema::new();
        schema.push(ColumnSpec::new("a", ColumnKind::Label)).unwrap();
        let frame = Frame::new(schema, vec![ColumnData::Numeric(vec![1.0])]);
        assert!(matches!(frame, Err(SimError::DataShape(_))));
    }

    #[test]
    fn typed_accessors() {
        let frame = small_frame();
        assert_eq!(frame.numeric("num_1").unwrap(), &[0.5, -1.25, 2.0]);
        assert_eq!(frame.categorical("cat_1").unwrap(), &['a', 'b', 'a']);
        assert!(frame.numeric("cat_1").is_err());
        assert!(frame.labels("missing").is_err());
    }

    #[test]
    fn repeat_column_leaves_source_untouched() {
        let frame = small_frame();
        let repeated = frame.repeat_column("num_1", 2).unwrap();
        assert_eq!(frame.ncols(), 4);
        assert_eq!(repeated.ncols(), 6);
        assert_eq!(repeated.numeric("num_1_dup2").unwrap(), frame.numeric("num_1").unwrap());
        // a second round would clash on the generated names
        assert!(repeated.repeat_column("num_1", 1).is_err());
    }

    #[test]
    fn csv_rendering() {
        let csv = small_frame().to_csv_string().unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "id,cat_1,num_1,label");
        assert_eq!(lines[1], "1,a,0.5,TRUE");
        assert_eq!(lines[2], "2,b,-1.25,FALSE");
    }
}
