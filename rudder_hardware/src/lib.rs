//! Analog inputs for the rudder sensor.
//!
//! No ADC driver lives here; register access belongs to the board support
//! layer. This crate provides the simulated sender used by the CLI and
//! tests, a scripted input for fault injection, and a retry wrapper.
pub mod error;

use std::collections::VecDeque;
use std::time::Duration;

use rudder_traits::AnalogInput;

use crate::error::HwError;

/// How the simulated sender resistance evolves between reads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SenderMotion {
    /// Constant resistance.
    Fixed(f64),
    /// Triangle sweep from `min_ohms` to `max_ohms` and back in `samples` reads.
    Sweep {
        min_ohms: f64,
        max_ohms: f64,
        samples: u32,
    },
}

/// Resistive rudder sender behind a voltage divider, read with millivolt
/// resolution like an ESP32 `analogReadMilliVolts`.
#[derive(Debug, Clone)]
pub struct SimulatedSender {
    r1_ohms: f64,
    vin_volts: f64,
    motion: SenderMotion,
    step: u64,
}

impl SimulatedSender {
    pub fn new(r1_ohms: f64, vin_volts: f64, motion: SenderMotion) -> Self {
        Self {
            r1_ohms,
            vin_volts,
            motion,
            step: 0,
        }
    }

    /// Sender resistance at the current step.
    pub fn ohms(&self) -> f64 {
        match self.motion {
            SenderMotion::Fixed(ohms) => ohms,
            SenderMotion::Sweep {
                min_ohms,
                max_ohms,
                samples,
            } => {
                let period = u64::from(samples.max(2));
                let half = period as f64 / 2.0;
                let phase = (self.step % period) as f64;
                // 0 → 1 over the first half, 1 → 0 over the second
                let t = if phase <= half {
                    phase / half
                } else {
                    (period as f64 - phase) / half
                };
                min_ohms + (max_ohms - min_ohms) * t
            }
        }
    }

    /// Divider output for the current resistance, rounded to whole millivolts.
    pub fn volts(&self) -> f64 {
        let ohms = self.ohms();
        let v = self.vin_volts * ohms / (self.r1_ohms + ohms);
        (v * 1000.0).round() / 1000.0
    }
}

impl AnalogInput for SimulatedSender {
    fn read(&mut self, _timeout: Duration) -> Result<f64, Box<dyn std::error::Error + Send + Sync>> {
        let v = self.volts();
        self.step = self.step.wrapping_add(1);
        tracing::trace!(ohms = self.ohms(), volts = v, "simulated sender read");
        Ok(v)
    }
}

/// One scripted read outcome.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scripted {
    Volts(f64),
    Timeout,
}

/// Replays a fixed sequence of readings, then reports `Disconnected`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    script: VecDeque<Scripted>,
}

impl ScriptedInput {
    pub fn new(script: impl IntoIterator<Item = Scripted>) -> Self {
        Self {
            script: script.into_iter().collect(),
        }
    }

    pub fn volts(values: impl IntoIterator<Item = f64>) -> Self {
        Self::new(values.into_iter().map(Scripted::Volts))
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl AnalogInput for ScriptedInput {
    fn read(&mut self, _timeout: Duration) -> Result<f64, Box<dyn std::error::Error + Send + Sync>> {
        match self.script.pop_front() {
            Some(Scripted::Volts(v)) => Ok(v),
            Some(Scripted::Timeout) => Err(Box::new(HwError::Timeout)),
            None => Err(Box::new(HwError::Disconnected)),
        }
    }
}

/// Retries reads that fail with `HwError::Timeout`; other errors pass through.
#[derive(Debug, Clone)]
pub struct RetryingInput<A> {
    inner: A,
    max_retries: u32,
}

impl<A> RetryingInput<A> {
    pub fn new(inner: A, max_retries: u32) -> Self {
        Self { inner, max_retries }
    }

    pub fn into_inner(self) -> A {
        self.inner
    }
}

impl<A: AnalogInput> AnalogInput for RetryingInput<A> {
    fn read(&mut self, timeout: Duration) -> Result<f64, Box<dyn std::error::Error + Send + Sync>> {
        let mut attempts = 0;
        loop {
            match self.inner.read(timeout) {
                Ok(v) => return Ok(v),
                Err(e)
                    if attempts < self.max_retries
                        && matches!(e.downcast_ref::<HwError>(), Some(HwError::Timeout)) =>
                {
                    attempts += 1;
                    tracing::warn!(retries = attempts, "analog read timeout, retrying");
                }
                Err(e) => {
                    tracing::error!("analog read error: {}", e);
                    return Err(e);
                }
            }
        }
    }
}
