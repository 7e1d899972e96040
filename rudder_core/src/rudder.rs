//! Rudder angle sensor assembly.
//!
//! Chains the stages that turn an ADC voltage into a published angle:
//!
//! ```text
//! analog input (V) → voltage divider (Ω) → linear (deg) → radians
//! ```
//!
//! and wires the two collaborators: a [`Publisher`] on the final stage and
//! an optional [`StatusBoard`] observing every stage.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use rudder_traits::Publisher;

use crate::calibration::LinearCoefficients;
use crate::config::RudderCfg;
use crate::error::{BuildError, CoreError, Result};
use crate::hw_error::map_hw_error;
use crate::pipeline::{NodeId, Pipeline, Reading};
use crate::status::PropagationStatus;
use crate::transform::{DegreesToRadians, Linear, Transform, VoltageDivider};

pub const SOURCE_NAME: &str = "analog input";
pub const DIVIDER_NAME: &str = "voltage divider";
pub const LINEAR_NAME: &str = "linear conversion to degrees";
pub const RADIANS_NAME: &str = "degrees to radians";

pub const DIVIDER_NODE: NodeId = NodeId::Stage(0);
pub const DEGREES_NODE: NodeId = NodeId::Stage(1);
pub const RADIANS_NODE: NodeId = NodeId::Stage(2);

/// Last value seen by one diagnostic item.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusItem {
    pub group: String,
    pub label: String,
    pub order: u8,
    pub value: Option<f64>,
}

/// Shared table of diagnostic items keyed by display order.
///
/// Cloning yields another handle to the same table; the pipeline writes
/// through one handle while a reporter reads a snapshot through another.
#[derive(Debug, Clone, Default)]
pub struct StatusBoard {
    items: Arc<Mutex<BTreeMap<u8, StatusItem>>>,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an item and return a setter for its value.
    pub fn item(
        &self,
        group: &str,
        label: impl Into<String>,
        order: u8,
    ) -> Box<dyn FnMut(f64) + Send> {
        if let Ok(mut items) = self.items.lock() {
            items.insert(
                order,
                StatusItem {
                    group: group.to_string(),
                    label: label.into(),
                    order,
                    value: None,
                },
            );
        }
        let items = self.items.clone();
        Box::new(move |v| {
            if let Ok(mut items) = items.lock()
                && let Some(item) = items.get_mut(&order)
            {
                item.value = Some(v);
            }
        })
    }

    /// Items in display order.
    pub fn snapshot(&self) -> Vec<StatusItem> {
        self.items
            .lock()
            .map(|items| items.values().cloned().collect())
            .unwrap_or_default()
    }
}

/// The assembled rudder pipeline and the configuration it was built from.
pub struct RudderPipeline {
    pipeline: Pipeline,
    coeffs: LinearCoefficients,
    cfg: RudderCfg,
}

impl core::fmt::Debug for RudderPipeline {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RudderPipeline")
            .field("path", &self.cfg.output.path)
            .field("slope", &self.coeffs.slope)
            .field("intercept", &self.coeffs.intercept)
            .field("pipeline", &self.pipeline)
            .finish()
    }
}

impl RudderPipeline {
    /// Compose the stages. A degenerate calibration fails here, before any
    /// sample is read.
    pub fn build(cfg: RudderCfg) -> Result<Self> {
        if !(cfg.divider.r1_ohms > 0.0 && cfg.divider.r1_ohms.is_finite()) {
            return Err(BuildError::InvalidConfig("divider r1_ohms must be > 0").into());
        }
        if !(cfg.divider.vin_volts > 0.0 && cfg.divider.vin_volts.is_finite()) {
            return Err(BuildError::InvalidConfig("divider vin_volts must be > 0").into());
        }
        let linear = Linear::from_points(LINEAR_NAME, cfg.calibration.min, cfg.calibration.max)?;
        let coeffs = linear.coefficients();
        let stages: Vec<Box<dyn Transform>> = vec![
            Box::new(VoltageDivider::new(
                DIVIDER_NAME,
                cfg.divider.r1_ohms,
                cfg.divider.vin_volts,
            )),
            Box::new(linear),
            Box::new(DegreesToRadians::new(RADIANS_NAME)),
        ];
        let pipeline = Pipeline::compose(SOURCE_NAME, stages);
        tracing::info!(
            r1_ohms = cfg.divider.r1_ohms,
            vin_volts = cfg.divider.vin_volts,
            slope = coeffs.slope,
            intercept = coeffs.intercept,
            path = %cfg.output.path,
            "rudder pipeline built"
        );
        Ok(Self {
            pipeline,
            coeffs,
            cfg,
        })
    }

    /// Connect one status item per stage, numbered in pipeline order.
    pub fn attach_diagnostics(&mut self, board: &StatusBoard) -> Result<()> {
        let group = self.cfg.ui_group.clone();
        let sent_label = format!("Value sent for '{}'", self.cfg.output.path);
        let items = [
            (NodeId::Source, SOURCE_NAME.to_string(), 1u8),
            (
                DIVIDER_NODE,
                "voltage divider conversion to resistance".to_string(),
                2,
            ),
            (DEGREES_NODE, LINEAR_NAME.to_string(), 3),
            (RADIANS_NODE, sent_label, 4),
        ];
        for (node, label, order) in items {
            let mut set = board.item(&group, label, order);
            self.pipeline.connect(node, move |e| set(e.value))?;
        }
        Ok(())
    }

    /// Publish every final value under the configured path.
    ///
    /// Publisher errors are logged and do not affect propagation.
    pub fn attach_publisher(&mut self, mut publisher: impl Publisher + Send + 'static) {
        let path = self.cfg.output.path.clone();
        self.pipeline.connect_output(move |e| {
            if let Err(err) = publisher.publish(&path, e.value) {
                let mapped = map_hw_error(&*err);
                tracing::warn!(error = %mapped, path = %path, "publish failed");
            }
        });
    }

    /// Route per-event faults to `f`.
    pub fn on_fault(&mut self, f: impl FnMut(&CoreError) + Send + 'static) {
        self.pipeline.on_fault(f);
    }

    /// Propagate one ADC reading (volts).
    pub fn push(&mut self, volts: f64) -> PropagationStatus {
        self.pipeline.push(volts)
    }

    /// Per-stage values for one reading, without notifying sinks.
    pub fn evaluate(&self, volts: f64) -> std::result::Result<Vec<Reading>, CoreError> {
        self.pipeline.evaluate(volts)
    }

    pub fn coefficients(&self) -> LinearCoefficients {
        self.coeffs
    }

    pub fn config(&self) -> &RudderCfg {
        &self.cfg
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Escape hatch for attaching extra sinks to named stages.
    pub fn pipeline_mut(&mut self) -> &mut Pipeline {
        &mut self.pipeline
    }

    /// ADC voltage expected for a given sender resistance; inverse of the
    /// divider stage.
    pub fn volts_for_ohms(&self, ohms: f64) -> f64 {
        let d = self.cfg.divider;
        d.vin_volts * ohms / (d.r1_ohms + ohms)
    }
}
