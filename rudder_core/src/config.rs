//! Runtime configuration for the rudder pipeline.
//!
//! These are the structs the core consumes. The TOML schema lives in
//! `rudder_config`; `conversions` maps one onto the other.

use crate::calibration::CalibrationPoint;

/// Voltage divider feeding the ADC: fixed upper resistor and supply voltage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DividerCfg {
    pub r1_ohms: f64,
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

/// Sender resistance measured at both rudder stops.
///
/// Measured through the ADC, so the values differ slightly from an
/// ohmmeter reading of the sender (0–190 Ω nominal).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationCfg {
    pub min: CalibrationPoint,
    pub max: CalibrationPoint,
}

impl Default for CalibrationCfg {
    fn default() -> Self {
        Self {
            min: CalibrationPoint::new(2.113363, -50.0),
            max: CalibrationPoint::new(223.0, 50.0),
        }
    }
}

/// Where and how the final value is published.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputCfg {
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

#[derive(Debug, Clone, PartialEq)]
pub struct RudderCfg {
    pub divider: DividerCfg,
    pub calibration: CalibrationCfg,
    pub output: OutputCfg,
    /// Group heading for diagnostic status items.
    pub ui_group: String,
}

impl Default for RudderCfg {
    fn default() -> Self {
        Self {
            divider: DividerCfg::default(),
            calibration: CalibrationCfg::default(),
            output: OutputCfg::default(),
            ui_group: "Rudder Angle Sensor".to_string(),
        }
    }
}
