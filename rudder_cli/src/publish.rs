//! Stdout publisher: one line per delivered value.

use std::io::Write;
use std::time::{SystemTime, UNIX_EPOCH};

use rudder_traits::Publisher;

/// Writes `path value units` lines, or JSON lines when `json` is set.
#[derive(Debug, Clone)]
pub struct StdoutPublisher {
    json: bool,
    units: String,
    source: String,
}

impl StdoutPublisher {
    pub fn new(json: bool, units: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            json,
            units: units.into(),
            source: source.into(),
        }
    }

    fn line(&self, path: &str, value: f64) -> String {
        if self.json {
            let timestamp = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis() as i64)
                .unwrap_or(0);
            serde_json::json!({
                "timestamp": timestamp,
                "source": self.source,
                "path": path,
                "value": value,
                "units": self.units,
            })
            .to_string()
        } else {
            format!("{path} {value:.6} {}", self.units)
        }
    }
}

impl Publisher for StdoutPublisher {
    fn publish(
        &mut self,
        path: &str,
        value: f64,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let line = self.line(path, value);
        let mut out = std::io::stdout().lock();
        writeln!(out, "{line}")?;
        out.flush()?;
        Ok(())
    }
}
