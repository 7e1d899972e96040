//! Drives a pipeline from a background sampler until a sample budget is
//! used up or shutdown is requested.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use rudder_traits::AnalogInput;
use rudder_traits::clock::Clock;

use crate::error::{CoreError, Result};
use crate::pipeline::Pipeline;
use crate::sampler::Sampler;
use crate::status::PropagationStatus;
use crate::util::stall_threshold_ms;

#[derive(Debug, Clone, Copy)]
pub struct RunParams {
    /// Time between reads.
    pub interval: Duration,
    /// Per-read sensor timeout.
    pub read_timeout: Duration,
    /// Stop after this many samples; `None` runs until shutdown.
    pub max_samples: Option<u64>,
}

impl Default for RunParams {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(500),
            read_timeout: Duration::from_millis(50),
            max_samples: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunStats {
    pub samples: u64,
    pub delivered: u64,
    pub skipped: u64,
    pub read_errors: u64,
    /// Times the stall watchdog fired.
    pub stalls: u64,
    pub last_value: Option<f64>,
}

/// Sample `input` and push every reading through `pipeline`.
///
/// Per-event faults and transient read errors are counted, not returned.
/// The loop fails with `CoreError::Disconnected` once the input is gone for
/// good, and with `CoreError::Hardware` if the sampler thread dies otherwise.
pub fn run<A, C>(
    input: A,
    pipeline: &mut Pipeline,
    params: RunParams,
    clock: C,
    shutdown: Arc<AtomicBool>,
) -> Result<RunStats>
where
    A: AnalogInput + Send + 'static,
    C: Clock + Clone + Send + Sync + 'static,
{
    let sampler = Sampler::spawn(input, params.interval, params.read_timeout, clock.clone());
    let threshold_ms = stall_threshold_ms(
        params.interval.as_millis().try_into().unwrap_or(u64::MAX),
        params.read_timeout.as_millis().try_into().unwrap_or(u64::MAX),
    );
    let wait = params.interval.saturating_add(params.read_timeout);
    let mut stats = RunStats::default();
    let mut stalled = false;

    tracing::info!(
        interval_ms = params.interval.as_millis() as u64,
        max_samples = ?params.max_samples,
        "sampling started"
    );

    while !shutdown.load(Ordering::Relaxed) {
        if params.max_samples.is_some_and(|max| stats.samples >= max) {
            break;
        }
        match sampler.recv_timeout(wait) {
            Some(v) => {
                stalled = false;
                stats.samples += 1;
                match pipeline.push(v) {
                    PropagationStatus::Delivered(out) => {
                        stats.delivered += 1;
                        stats.last_value = Some(out);
                    }
                    PropagationStatus::Skipped(_) => stats.skipped += 1,
                }
            }
            None => {
                if sampler.disconnected() {
                    tracing::error!(samples = stats.samples, "analog input disconnected, stopping run");
                    return Err(CoreError::Disconnected.into());
                }
                if !sampler.is_running() {
                    return Err(CoreError::Hardware("sampler thread exited".into()).into());
                }
                let stalled_ms = sampler.stalled_for(clock.ms_since(sampler.epoch()));
                if !stalled && stalled_ms > threshold_ms {
                    stalled = true;
                    stats.stalls += 1;
                    tracing::warn!(stalled_ms, threshold_ms, "analog input stalled");
                }
            }
        }
    }

    stats.read_errors = sampler.read_errors();
    tracing::info!(
        samples = stats.samples,
        delivered = stats.delivered,
        skipped = stats.skipped,
        read_errors = stats.read_errors,
        "sampling stopped"
    );
    Ok(stats)
}
