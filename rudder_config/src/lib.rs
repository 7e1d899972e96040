#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema and calibration parsing for the rudder angle sensor.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - The calibration CSV loader enforces headers and reduces a table of
//!   measurements to the two end stops used by the linear fit.
use serde::Deserialize;

/// Calibration CSV schema.
///
/// Expected headers:
/// ohms,degrees
///
/// Example:
/// ohms,degrees
/// 2.113363,-50.0
/// 223.0,50.0
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct CalibrationRow {
    pub ohms: f64,
    pub degrees: f64,
}

/// One calibration stop: sender resistance and the rudder angle it reads at.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct StopPoint {
    pub ohms: f64,
    pub degrees: f64,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct Calibration {
    pub min: StopPoint,
    pub max: StopPoint,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct InputCfg {
    /// ADC GPIO number (informational on the simulator).
    pub pin: u8,
    /// Time between analog reads.
    pub read_interval_ms: u64,
    /// Max wait for a single read.
    pub read_timeout_ms: u64,
}

impl Default for InputCfg {
    fn default() -> Self {
        Self {
            pin: 36,
            read_interval_ms: 500,
            read_timeout_ms: 50,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DividerCfg {
    /// Fixed resistor between supply and the ADC node.
    pub r1_ohms: f64,
    /// Divider supply voltage (the ADC full-scale).
    pub vin_volts: f64,
}

impl Default for DividerCfg {
    fn default() -> Self {
        Self {
            r1_ohms: 47.0,
            vin_volts: 3.3,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct OutputCfg {
    /// Dotted vessel-data path the angle is published under.
    pub path: String,
    pub units: String,
    pub display_name: String,
}

impl Default for OutputCfg {
    fn default() -> Self {
        Self {
            path: "steering.rudderAngle".to_string(),
            units: "rad".to_string(),
            display_name: "Rudder Angle".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct UiCfg {
    pub group: String,
}

impl Default for UiCfg {
    fn default() -> Self {
        Self {
            group: "Rudder Angle Sensor".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AppCfg {
    pub hostname: String,
}

impl Default for AppCfg {
    fn default() -> Self {
        Self {
            hostname: "rudder-angle-sensor".to_string(),
        }
    }
}

/// Simulated sender used when no ADC is attached.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SimulationCfg {
    /// Fixed sender resistance; when absent the simulator sweeps stop to stop.
    pub fixed_ohms: Option<f64>,
    /// Samples per full sweep min → max → min.
    pub sweep_samples: u32,
}

impl Default for SimulationCfg {
    fn default() -> Self {
        Self {
            fixed_ohms: None,
            sweep_samples: 40,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub calibration: Calibration,
    #[serde(default)]
    pub input: InputCfg,
    #[serde(default)]
    pub divider: DividerCfg,
    #[serde(default)]
    pub output: OutputCfg,
    #[serde(default)]
    pub ui: UiCfg,
    #[serde(default)]
    pub logging: Logging,
    #[serde(default)]
    pub app: AppCfg,
    #[serde(default)]
    pub simulation: SimulationCfg,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Calibration {
    /// Reduce measured rows to the two end stops (lowest and highest ohms).
    ///
    /// Rows may appear in any order but every resistance must be distinct
    /// and finite.
    pub fn from_rows(rows: &[CalibrationRow]) -> eyre::Result<Self> {
        if rows.len() < 2 {
            eyre::bail!("calibration requires at least two rows, got {}", rows.len());
        }
        for (i, r) in rows.iter().enumerate() {
            if !(r.ohms.is_finite() && r.degrees.is_finite()) {
                eyre::bail!("calibration row {} is not finite", i + 1);
            }
        }
        let mut sorted: Vec<CalibrationRow> = rows.to_vec();
        sorted.sort_by(|a, b| a.ohms.total_cmp(&b.ohms));
        if let Some(w) = sorted.windows(2).find(|w| w[0].ohms == w[1].ohms) {
            eyre::bail!("calibration rows have duplicate ohms value {}", w[0].ohms);
        }
        let (lo, hi) = match (sorted.first(), sorted.last()) {
            (Some(lo), Some(hi)) => (*lo, *hi),
            _ => eyre::bail!("calibration requires at least two rows"),
        };
        Ok(Self {
            min: StopPoint {
                ohms: lo.ohms,
                degrees: lo.degrees,
            },
            max: StopPoint {
                ohms: hi.ohms,
                degrees: hi.degrees,
            },
        })
    }
}

impl TryFrom<&[CalibrationRow]> for Calibration {
    type Error = eyre::Report;
    fn try_from(rows: &[CalibrationRow]) -> Result<Self, Self::Error> {
        Self::from_rows(rows)
    }
}

pub fn load_calibration_csv(path: &std::path::Path) -> eyre::Result<Calibration> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open calibration CSV {:?}: {}", path, e))?;

    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let expected = ["ohms", "degrees"];
    let actual: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
    if actual != expected {
        eyre::bail!(
            "calibration CSV must have headers 'ohms,degrees', got: {}",
            actual.join(",")
        );
    }

    let mut rows = Vec::new();
    for (idx, rec) in rdr.deserialize::<CalibrationRow>().enumerate() {
        match rec {
            Ok(row) => rows.push(row),
            Err(e) => {
                eyre::bail!("invalid CSV row {}: {}", idx + 2, e);
            }
        }
    }

    Calibration::from_rows(&rows)
}

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];
const ROTATIONS: [&str; 3] = ["never", "daily", "hourly"];

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Calibration
        let c = &self.calibration;
        for (name, v) in [
            ("calibration.min.ohms", c.min.ohms),
            ("calibration.min.degrees", c.min.degrees),
            ("calibration.max.ohms", c.max.ohms),
            ("calibration.max.degrees", c.max.degrees),
        ] {
            if !v.is_finite() {
                eyre::bail!("{name} must be finite");
            }
        }
        if c.min.ohms == c.max.ohms {
            eyre::bail!("calibration.min.ohms and calibration.max.ohms must differ");
        }
        if c.min.ohms < 0.0 || c.max.ohms < 0.0 {
            eyre::bail!("calibration ohms must be >= 0");
        }

        // Input
        if self.input.read_interval_ms == 0 {
            eyre::bail!("input.read_interval_ms must be >= 1");
        }
        if self.input.read_interval_ms > 60 * 60 * 1000 {
            eyre::bail!("input.read_interval_ms is unreasonably large (>1h)");
        }
        if self.input.read_timeout_ms == 0 {
            eyre::bail!("input.read_timeout_ms must be >= 1");
        }

        // Divider
        if !(self.divider.r1_ohms > 0.0 && self.divider.r1_ohms.is_finite()) {
            eyre::bail!("divider.r1_ohms must be > 0");
        }
        if !(self.divider.vin_volts > 0.0 && self.divider.vin_volts.is_finite()) {
            eyre::bail!("divider.vin_volts must be > 0");
        }

        // Output
        if self.output.path.is_empty() || self.output.path.split('.').any(str::is_empty) {
            eyre::bail!("output.path must be a dotted path like 'steering.rudderAngle'");
        }

        // Logging
        if let Some(level) = self.logging.level.as_deref()
            && !LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str())
        {
            eyre::bail!("logging.level must be one of {}", LOG_LEVELS.join("|"));
        }
        if let Some(rot) = self.logging.rotation.as_deref()
            && !ROTATIONS.contains(&rot.to_ascii_lowercase().as_str())
        {
            eyre::bail!("logging.rotation must be one of {}", ROTATIONS.join("|"));
        }

        // Simulation
        if let Some(ohms) = self.simulation.fixed_ohms
            && !(ohms >= 0.0 && ohms.is_finite())
        {
            eyre::bail!("simulation.fixed_ohms must be >= 0");
        }
        if self.simulation.sweep_samples < 2 {
            eyre::bail!("simulation.sweep_samples must be >= 2");
        }

        Ok(())
    }
}
