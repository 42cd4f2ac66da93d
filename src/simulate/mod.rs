//! Synthetic table generation.
//!
//! `schema` describes the columns before any data is drawn, `frame` holds the
//! generated values, `outcome` defines the signal the label is cut from and
//! `simulator` ties them together with an explicitly passed generator.
pub mod frame;
pub mod outcome;
pub mod schema;
pub mod simulator;

pub use frame::{ColumnData, Frame};
pub use outcome::{EdgedOutcome, OutcomeFn};
pub use schema::{ColumnKind, ColumnSpec, Schema, ID_COLUMN, LABEL_COLUMN, OUTCOME_COLUMN};
pub use simulator::{simulate, LabelThreshold, Simulation, SimulationParams};
