//! Command implementations: config mapping, input assembly, and output.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use eyre::WrapErr;
use rudder_config::Config;
use rudder_core::error::Result;
use rudder_core::runner::{RunParams, RunStats};
use rudder_core::{CalibrationPoint, RudderCfg, RudderPipeline, StatusBoard};
use rudder_hardware::{RetryingInput, Scripted, ScriptedInput, SenderMotion, SimulatedSender};
use rudder_traits::AnalogInput;
use rudder_traits::clock::MonotonicClock;
use serde_json::json;

use crate::publish::StdoutPublisher;

/// Comma-separated volts (or `timeout`) replayed instead of the simulator.
pub const SIM_SCRIPT_ENV: &str = "RUDDER_TEST_SIM_SCRIPT";

const READ_RETRIES: u32 = 2;
/// Max difference between a calibration stop and its round trip, in degrees.
const SELF_CHECK_TOLERANCE_DEG: f64 = 1e-6;

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOpts {
    pub samples: Option<u64>,
    pub interval_ms: Option<u64>,
    pub sweep: bool,
}

pub fn solve(x1: f64, y1: f64, x2: f64, y2: f64, json: bool) -> Result<()> {
    let c = rudder_core::solve_linear(CalibrationPoint::new(x1, y1), CalibrationPoint::new(x2, y2))?;
    if json {
        println!(
            "{}",
            json!({ "slope": c.slope, "intercept": c.intercept })
        );
    } else {
        println!("slope = {:.9}", c.slope);
        println!("intercept = {:.9}", c.intercept);
    }
    Ok(())
}

pub fn convert(cfg: &Config, volts: f64, json: bool) -> Result<()> {
    let rudder = RudderPipeline::build(RudderCfg::from(cfg))?;
    let readings = rudder
        .evaluate(volts)
        .wrap_err_with(|| format!("convert {volts} V"))?;
    let out = readings.last().map(|r| r.value);
    if json {
        let stages: Vec<_> = readings
            .iter()
            .map(|r| json!({ "node": r.node.to_string(), "name": r.name, "value": r.value }))
            .collect();
        println!(
            "{}",
            json!({
                "volts": volts,
                "stages": stages,
                "path": cfg.output.path,
                "value": out,
                "units": cfg.output.units,
            })
        );
    } else {
        for r in &readings {
            println!("{:<10} {:<30} {:.6}", r.node.to_string(), r.name, r.value);
        }
        if let Some(v) = out {
            println!("{} = {v:.6} {}", cfg.output.path, cfg.output.units);
        }
    }
    Ok(())
}

/// Build the pipeline and run both calibration stops through it.
pub fn self_check(cfg: &Config, json: bool) -> Result<()> {
    let rudder = RudderPipeline::build(RudderCfg::from(cfg))?;
    let cal = rudder.config().calibration;
    let mut ends = Vec::with_capacity(2);
    for stop in [cal.min, cal.max] {
        let volts = rudder.volts_for_ohms(stop.x);
        let readings = rudder
            .evaluate(volts)
            .wrap_err_with(|| format!("self-check at {} ohms", stop.x))?;
        let degrees = readings
            .iter()
            .find(|r| r.node == rudder_core::rudder::DEGREES_NODE)
            .map_or(f64::NAN, |r| r.value);
        if !((degrees - stop.y).abs() <= SELF_CHECK_TOLERANCE_DEG) {
            eyre::bail!(
                "self-check: {} ohms read {degrees} degrees, expected {}",
                stop.x,
                stop.y
            );
        }
        let radians = readings.last().map_or(f64::NAN, |r| r.value);
        ends.push((stop.x, volts, degrees, radians));
    }
    let c = rudder.coefficients();
    tracing::info!(slope = c.slope, intercept = c.intercept, "self-check passed");
    if json {
        let stops: Vec<_> = ends
            .iter()
            .map(|(ohms, volts, deg, rad)| {
                json!({ "ohms": ohms, "volts": volts, "degrees": deg, "radians": rad })
            })
            .collect();
        println!(
            "{}",
            json!({ "ok": true, "slope": c.slope, "intercept": c.intercept, "stops": stops })
        );
    } else {
        for (ohms, volts, deg, rad) in &ends {
            println!("{ohms:>10.3} ohm  {volts:.4} V  {deg:>8.3} deg  {rad:>8.5} rad");
        }
        println!("self-check ok");
    }
    Ok(())
}

fn parse_script(s: &str) -> Result<ScriptedInput> {
    let mut script = Vec::new();
    for tok in s.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if tok.eq_ignore_ascii_case("timeout") {
            script.push(Scripted::Timeout);
        } else {
            let v: f64 = tok
                .parse()
                .wrap_err_with(|| format!("{SIM_SCRIPT_ENV}: bad value '{tok}'"))?;
            script.push(Scripted::Volts(v));
        }
    }
    Ok(ScriptedInput::new(script))
}

fn make_input(cfg: &Config, sweep: bool) -> Result<Box<dyn AnalogInput + Send>> {
    if let Ok(script) = std::env::var(SIM_SCRIPT_ENV) {
        tracing::info!(script = %script, "using scripted input");
        return Ok(Box::new(parse_script(&script)?));
    }
    let cal = &cfg.calibration;
    let motion = match cfg.simulation.fixed_ohms {
        Some(ohms) if !sweep => SenderMotion::Fixed(ohms),
        _ => SenderMotion::Sweep {
            min_ohms: cal.min.ohms.min(cal.max.ohms),
            max_ohms: cal.min.ohms.max(cal.max.ohms),
            samples: cfg.simulation.sweep_samples,
        },
    };
    tracing::info!(?motion, "using simulated sender");
    Ok(Box::new(SimulatedSender::new(
        cfg.divider.r1_ohms,
        cfg.divider.vin_volts,
        motion,
    )))
}

pub fn run(cfg: &Config, opts: RunOpts, json: bool, shutdown: Arc<AtomicBool>) -> Result<RunStats> {
    let mut rudder = RudderPipeline::build(RudderCfg::from(cfg))?;
    let board = StatusBoard::new();
    rudder.attach_diagnostics(&board)?;
    rudder.attach_publisher(StdoutPublisher::new(
        json,
        cfg.output.units.clone(),
        cfg.app.hostname.clone(),
    ));

    let input = RetryingInput::new(make_input(cfg, opts.sweep)?, READ_RETRIES);
    let params = RunParams {
        interval: Duration::from_millis(opts.interval_ms.unwrap_or(cfg.input.read_interval_ms).max(1)),
        read_timeout: Duration::from_millis(cfg.input.read_timeout_ms),
        max_samples: opts.samples,
    };
    tracing::info!(
        pin = cfg.input.pin,
        rate_hz = rudder_core::util::rate_hz(params.interval.as_millis() as u64),
        display_name = %cfg.output.display_name,
        "rudder angle sensor starting"
    );

    let stats = rudder_core::runner::run(
        input,
        rudder.pipeline_mut(),
        params,
        MonotonicClock::new(),
        shutdown,
    )?;

    for item in board.snapshot() {
        tracing::info!(group = %item.group, label = %item.label, value = ?item.value, "status");
    }

    if json {
        println!(
            "{}",
            json!({
                "samples": stats.samples,
                "delivered": stats.delivered,
                "skipped": stats.skipped,
                "read_errors": stats.read_errors,
                "stalls": stats.stalls,
                "last_value": stats.last_value,
            })
        );
    } else {
        println!(
            "run complete: {} samples, {} delivered, {} skipped, {} read errors",
            stats.samples, stats.delivered, stats.skipped, stats.read_errors
        );
    }
    Ok(stats)
}
