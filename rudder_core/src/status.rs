//! Outcome of pushing one raw sample through a pipeline.

use crate::error::CoreError;

#[derive(Debug, Clone, PartialEq)]
pub enum PropagationStatus {
    /// Every stage succeeded; carries the final stage's value.
    Delivered(f64),
    /// A stage faulted; downstream stages and sinks saw nothing this cycle.
    Skipped(CoreError),
}

impl PropagationStatus {
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Delivered(v) => Some(*v),
            Self::Skipped(_) => None,
        }
    }

    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered(_))
    }
}
