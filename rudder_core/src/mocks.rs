//! Test and helper mocks for rudder_core

use std::sync::{Arc, Mutex};

/// An input that always errors on read; useful when driving the pipeline
/// with externally supplied values via `push`.
pub struct NoopInput;

impl rudder_traits::AnalogInput for NoopInput {
    fn read(
        &mut self,
        _timeout: std::time::Duration,
    ) -> Result<f64, Box<dyn std::error::Error + Send + Sync>> {
        Err(Box::new(std::io::Error::other("noop input")))
    }
}

/// Publisher that records every `(path, value)` it receives.
#[derive(Debug, Clone, Default)]
pub struct RecordingPublisher {
    published: Arc<Mutex<Vec<(String, f64)>>>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn published(&self) -> Vec<(String, f64)> {
        self.published
            .lock()
            .map(|v| v.clone())
            .unwrap_or_default()
    }
}

impl rudder_traits::Publisher for RecordingPublisher {
    fn publish(
        &mut self,
        path: &str,
        value: f64,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.published
            .lock()
            .map_err(|_| std::io::Error::other("recording publisher poisoned"))?
            .push((path.to_string(), value));
        Ok(())
    }
}
