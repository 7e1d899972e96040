//! Background analog sampling.
//!
//! Spawns a thread that owns the `AnalogInput`, reads it on a fixed
//! cadence, and hands each reading to the consumer over a bounded channel.
//! The consumer runs pipeline propagation on its own thread, so stages and
//! sinks never execute concurrently.
//!
//! Each `Sampler` owns exactly one thread, stopped and joined on drop. The
//! thread also stops by itself once the input reports a permanent disconnect.
use crossbeam_channel as xch;
use rudder_traits::AnalogInput;
use rudder_traits::clock::Clock;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::hw_error::{is_permanent, map_hw_error};

pub struct Sampler {
    rx: xch::Receiver<f64>,
    last_ok: Arc<AtomicU64>,
    read_errors: Arc<AtomicU64>,
    disconnected: Arc<AtomicBool>,
    epoch: Instant,
    shutdown: Arc<AtomicBool>,
    join_handle: Option<std::thread::JoinHandle<()>>,
}

impl Sampler {
    /// Read `input` every `interval`, waiting at most `timeout` per read.
    ///
    /// The cadence is anchored to the first read, so a read that overruns
    /// part of a tick shortens the following sleep. Ticks missed entirely
    /// (slow read or a consumer that stopped draining) are dropped, never
    /// replayed back-to-back.
    pub fn spawn<A: AnalogInput + Send + 'static, C: Clock + Send + Sync + 'static>(
        mut input: A,
        interval: Duration,
        timeout: Duration,
        clock: C,
    ) -> Self {
        let (tx, rx) = xch::bounded(1);
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();
        let last_ok = Arc::new(AtomicU64::new(0));
        let last_ok_clone = last_ok.clone();
        let read_errors = Arc::new(AtomicU64::new(0));
        let read_errors_clone = read_errors.clone();
        let disconnected = Arc::new(AtomicBool::new(false));
        let disconnected_clone = disconnected.clone();
        let interval = interval.max(Duration::from_millis(1));
        let epoch = clock.now();

        let join_handle = std::thread::spawn(move || {
            let mut next = epoch;
            loop {
                if shutdown_clone.load(Ordering::Relaxed) {
                    tracing::debug!("sampler thread received shutdown signal");
                    break;
                }

                match input.read(timeout) {
                    Ok(v) => {
                        tracing::debug!(volts = v, "analog input sample");
                        if tx.send(v).is_err() {
                            tracing::debug!("sampler consumer disconnected, exiting thread");
                            break;
                        }
                        last_ok_clone.store(clock.ms_since(epoch), Ordering::Relaxed);
                    }
                    Err(e) => {
                        let n = read_errors_clone.fetch_add(1, Ordering::Relaxed) + 1;
                        let mapped = map_hw_error(&*e);
                        if is_permanent(&mapped) {
                            tracing::error!(error = %mapped, read_errors = n, "analog input lost, sampler stopping");
                            disconnected_clone.store(true, Ordering::Relaxed);
                            break;
                        }
                        tracing::warn!(error = %mapped, read_errors = n, "analog read failed");
                    }
                }

                if shutdown_clone.load(Ordering::Relaxed) {
                    break;
                }
                next = next_tick(next, interval, clock.now());
                clock.sleep_until(next);
            }
            tracing::trace!("sampler thread exiting cleanly");
        });

        Self {
            rx,
            last_ok,
            read_errors,
            disconnected,
            epoch,
            shutdown,
            join_handle: Some(join_handle),
        }
    }

    /// Most recent pending reading, discarding older ones.
    pub fn latest(&self) -> Option<f64> {
        self.rx.try_iter().last()
    }

    /// Block for the next reading. `None` on timeout or when the thread ended.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<f64> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// Milliseconds since the last successful read, as of `now_ms` on the
    /// sampler's clock.
    pub fn stalled_for(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.last_ok.load(Ordering::Relaxed))
    }

    /// `stalled_for` measured against the real monotonic clock.
    pub fn stalled_for_now(&self) -> u64 {
        let ms = Instant::now().saturating_duration_since(self.epoch).as_millis();
        self.stalled_for(u64::try_from(ms).unwrap_or(u64::MAX))
    }

    /// Instant the sampler started, on the clock it was spawned with.
    pub fn epoch(&self) -> Instant {
        self.epoch
    }

    pub fn is_running(&self) -> bool {
        self.join_handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub fn read_errors(&self) -> u64 {
        self.read_errors.load(Ordering::Relaxed)
    }

    /// Whether the thread stopped because the input went away.
    pub fn disconnected(&self) -> bool {
        self.disconnected.load(Ordering::Relaxed)
    }
}

/// First tick after `prev` that is still in the future at `now`.
fn next_tick(prev: Instant, interval: Duration, now: Instant) -> Instant {
    let next = prev + interval;
    if next > now {
        return next;
    }
    let behind = now.duration_since(next).as_nanos();
    let missed = behind / interval.as_nanos().max(1) + 1;
    let skip = u32::try_from(missed).unwrap_or(u32::MAX);
    tracing::debug!(missed_ticks = missed, "sampler overran its interval");
    next + interval.saturating_mul(skip)
}

impl Drop for Sampler {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        // Unblock a pending send so the thread can observe the flag.
        while self.rx.try_recv().is_ok() {}

        if let Some(handle) = self.join_handle.take() {
            match handle.join() {
                Ok(()) => tracing::trace!("sampler thread joined"),
                Err(e) => tracing::warn!(?e, "sampler thread panicked during shutdown"),
            }
        }
    }
}
