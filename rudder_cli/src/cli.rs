//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "rudder", version, about = "Rudder angle sensor CLI")]
pub struct Cli {
    /// Path to config TOML (typed)
    #[arg(long, value_name = "FILE", default_value = "etc/rudder_config.toml")]
    pub config: PathBuf,

    /// Optional calibration CSV (strict header `ohms,degrees`); replaces [calibration]
    #[arg(long, value_name = "FILE")]
    pub calibration: Option<PathBuf>,

    /// Emit JSON lines on stdout and JSON logs on stderr
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sample the simulated sender and publish the rudder angle
    Run {
        /// Stop after this many samples (default: run until Ctrl-C)
        #[arg(long, value_name = "N")]
        samples: Option<u64>,
        /// Override input.read_interval_ms
        #[arg(long, value_name = "MS")]
        interval_ms: Option<u64>,
        /// Sweep the sender stop to stop even when simulation.fixed_ohms is set
        #[arg(long, action = ArgAction::SetTrue)]
        sweep: bool,
    },
    /// Solve the line through two calibration points
    Solve {
        #[arg(long, allow_negative_numbers = true)]
        x1: f64,
        #[arg(long, allow_negative_numbers = true)]
        y1: f64,
        #[arg(long, allow_negative_numbers = true)]
        x2: f64,
        #[arg(long, allow_negative_numbers = true)]
        y2: f64,
    },
    /// Push one ADC voltage through the pipeline and print every stage
    Convert {
        /// ADC reading in volts
        #[arg(long, allow_negative_numbers = true)]
        volts: f64,
    },
    /// Validate config, build the pipeline, and check both calibration stops
    SelfCheck,
}
