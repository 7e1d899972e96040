//! Conversions from `rudder_config` schema types to core runtime types.

use crate::calibration::CalibrationPoint;
use crate::config::{CalibrationCfg, DividerCfg, OutputCfg, RudderCfg};

impl From<&rudder_config::StopPoint> for CalibrationPoint {
    fn from(p: &rudder_config::StopPoint) -> Self {
        Self::new(p.ohms, p.degrees)
    }
}

impl From<&rudder_config::Calibration> for CalibrationCfg {
    fn from(c: &rudder_config::Calibration) -> Self {
        Self {
            min: (&c.min).into(),
            max: (&c.max).into(),
        }
    }
}

impl From<&rudder_config::DividerCfg> for DividerCfg {
    fn from(c: &rudder_config::DividerCfg) -> Self {
        Self {
            r1_ohms: c.r1_ohms,
            vin_volts: c.vin_volts,
        }
    }
}

impl From<&rudder_config::OutputCfg> for OutputCfg {
    fn from(c: &rudder_config::OutputCfg) -> Self {
        Self {
            path: c.path.clone(),
            units: c.units.clone(),
            display_name: c.display_name.clone(),
        }
    }
}

impl From<&rudder_config::Config> for RudderCfg {
    fn from(c: &rudder_config::Config) -> Self {
        Self {
            divider: (&c.divider).into(),
            calibration: (&c.calibration).into(),
            output: (&c.output).into(),
            ui_group: c.ui.group.clone(),
        }
    }
}
