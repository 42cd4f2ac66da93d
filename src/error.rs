use std::error::Error;
use std::fmt;

/// Error type shared by the simulator, the design encoder, the model wrappers
/// and the comparison harness.
#[derive(Debug)]
pub enum SimError {
    /// A caller-supplied parameter is outside its valid range.
    InvalidParameter(String),
    /// Tables or matrices do not have the expected columns or lengths.
    DataShape(String),
    /// A model could not be fitted or applied.
    ModelFit(String),
    Io(std::io::Error),
    Csv(csv::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;

impl SimError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        SimError::InvalidParameter(msg.into())
    }

    pub fn shape(msg: impl Into<String>) -> Self {
        SimError::DataShape(msg.into())
    }

    pub fn model(msg: impl Into<String>) -> Self {
        SimError::ModelFit(msg.into())
    }
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SimError::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
            SimError::DataShape(msg) => write!(f, "Data shape error: {}", msg),
            SimError::ModelFit(msg) => write!(f, "Model fitting error: {}", msg),
            SimError::Io(err) => write!(f, "I/O error: {}", err),
            SimError::Csv(err) => write!(f, "CSV error: {}", err),
        }
    }
}

impl Error for SimError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SimError::Io(err) => Some(err),
            SimError::Csv(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SimError {
    fn from(err: std::io::Error) -> Self {
        SimError::Io(err)
    }
}

impl From<csv::Error> for SimError {
    fn from(err: csv::Error) -> Self {
        SimError::Csv(err)
    }
}
