use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use rudder_core::config::RudderCfg;
use rudder_core::mocks::{NoopInput, RecordingPublisher};
use rudder_core::runner::{RunParams, run};
use rudder_core::RudderPipeline;
use rudder_hardware::{SenderMotion, SimulatedSender, Scripted, ScriptedInput};
use rudder_traits::clock::ManualClock;

fn params(max: u64) -> RunParams {
    RunParams {
        interval: Duration::from_millis(10),
        read_timeout: Duration::from_millis(5),
        max_samples: Some(max),
    }
}

#[test]
fn runs_until_sample_budget() {
    let mut rudder = RudderPipeline::build(RudderCfg::default()).unwrap();
    let publisher = RecordingPublisher::new();
    rudder.attach_publisher(publisher.clone());
    let input = SimulatedSender::new(47.0, 3.3, SenderMotion::Fixed(112.556_681_5));

    let stats = run(
        input,
        rudder.pipeline_mut(),
        params(5),
        ManualClock::new(),
        Arc::new(AtomicBool::new(false)),
    )
    .unwrap();

    assert_eq!(stats.samples, 5);
    assert_eq!(stats.delivered, 5);
    assert_eq!(stats.skipped, 0);
    assert_eq!(publisher.published().len(), 5);
    // mid-scale sender reads close to amidships
    assert!(stats.last_value.unwrap().abs() < 0.01);
}

#[test]
fn faulty_samples_are_counted_not_fatal() {
    let mut rudder = RudderPipeline::build(RudderCfg::default()).unwrap();
    let input = ScriptedInput::new([
        Scripted::Volts(1.0),
        Scripted::Volts(3.3),
        Scripted::Timeout,
        Scripted::Volts(1.2),
    ]);
    let stats = run(
        input,
        rudder.pipeline_mut(),
        params(3),
        ManualClock::new(),
        Arc::new(AtomicBool::new(false)),
    )
    .unwrap();
    assert_eq!(stats.samples, 3);
    assert_eq!(stats.delivered, 2);
    assert_eq!(stats.skipped, 1);
    assert!(stats.read_errors >= 1);
}

#[test]
fn shutdown_flag_stops_the_loop() {
    let mut rudder = RudderPipeline::build(RudderCfg::default()).unwrap();
    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = shutdown.clone();
    std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(50));
        flag.store(true, Ordering::Relaxed);
    });
    let stats = run(
        NoopInput,
        rudder.pipeline_mut(),
        RunParams {
            max_samples: None,
            ..params(0)
        },
        ManualClock::new(),
        shutdown,
    )
    .unwrap();
    assert_eq!(stats.samples, 0);
    assert!(stats.read_errors > 0);
    assert!(stats.stalls <= 1);
}

#[test]
fn input_running_dry_ends_the_run() {
    let mut rudder = RudderPipeline::build(RudderCfg::default()).unwrap();
    let publisher = RecordingPublisher::new();
    rudder.attach_publisher(publisher.clone());
    // two readings, then the scripted input reports Disconnected forever
    let input = ScriptedInput::volts([1.0, 1.2]);

    let err = run(
        input,
        rudder.pipeline_mut(),
        params(10),
        ManualClock::new(),
        Arc::new(AtomicBool::new(false)),
    )
    .unwrap_err();

    assert_eq!(
        err.downcast_ref::<rudder_core::CoreError>(),
        Some(&rudder_core::CoreError::Disconnected)
    );
    // readings taken before the disconnect were still published
    assert_eq!(publisher.published().len(), 2);
}
