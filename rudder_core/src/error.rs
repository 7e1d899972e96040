use thiserror::Error;

/// Faults raised by the calibration solver and by pipeline stages.
///
/// `InvalidCalibration` is a configuration-time error and fails pipeline
/// construction. The remaining variants are per-event: the pipeline skips
/// that propagation cycle and stays alive.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    #[error("invalid calibration: {0}")]
    InvalidCalibration(String),
    #[error("stage '{stage}' produced a non-finite value ({value})")]
    NonFiniteResult { stage: String, value: f64 },
    #[error("stage '{stage}' rejected input {value}: {reason}")]
    InvalidInput {
        stage: String,
        value: f64,
        reason: &'static str,
    },
    #[error("hardware error: {0}")]
    Hardware(String),
    #[error("analog input disconnected")]
    Disconnected,
    #[error("timeout waiting for sensor")]
    Timeout,
}

impl CoreError {
    /// Name of the pipeline stage that raised a per-event fault, if any.
    pub fn stage(&self) -> Option<&str> {
        match self {
            Self::NonFiniteResult { stage, .. } | Self::InvalidInput { stage, .. } => Some(stage),
            _ => None,
        }
    }
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("pipeline has no node {0}")]
    UnknownNode(String),
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
