#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Signal-conditioning core for the rudder angle sensor (hardware-agnostic).
//!
//! Raw analog readings flow through a chain of pure stages and fan out to
//! sinks. All hardware access goes through `rudder_traits::AnalogInput`;
//! publishing goes through `rudder_traits::Publisher`.
//!
//! ## Architecture
//!
//! - **Calibration**: two-point solver producing slope/intercept (`calibration`)
//! - **Units**: degrees ↔ radians (`units`)
//! - **Stages**: the `Transform` trait and built-in stages (`transform`)
//! - **Pipeline**: ordered stages, per-node fan-out, skip-on-fault (`pipeline`)
//! - **Assembly**: the rudder chain with diagnostics and publisher (`rudder`)
//! - **Sampling**: background reader and run loop (`sampler`, `runner`)

pub mod calibration;
pub mod config;
pub mod conversions;
pub mod error;
pub mod hw_error;
pub mod mocks;
pub mod pipeline;
pub mod rudder;
pub mod runner;
pub mod sampler;
pub mod status;
pub mod transform;
pub mod units;
pub mod util;

pub use calibration::{CalibrationPoint, LinearCoefficients, apply, solve_linear};
pub use config::{CalibrationCfg, DividerCfg, OutputCfg, RudderCfg};
pub use error::{BuildError, CoreError};
pub use pipeline::{Emission, NodeId, Pipeline, Reading};
pub use rudder::{RudderPipeline, StatusBoard, StatusItem};
pub use status::PropagationStatus;
pub use transform::{
    DegreesToRadians, Gain, Lambda, Linear, RadiansToDegrees, Transform, VoltageDivider,
};
pub use units::{degrees_to_radians, radians_to_degrees};
