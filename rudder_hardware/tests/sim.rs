use std::time::Duration;

use rstest::rstest;
use rudder_hardware::error::HwError;
use rudder_hardware::{RetryingInput, Scripted, ScriptedInput, SenderMotion, SimulatedSender};
use rudder_traits::AnalogInput;

const T: Duration = Duration::from_millis(10);

#[rstest]
#[case(47.0, 1.65)]
#[case(0.0, 0.0)]
#[case(223.0, 2.726)]
fn fixed_sender_reads_divider_voltage(#[case] ohms: f64, #[case] volts: f64) {
    let mut s = SimulatedSender::new(47.0, 3.3, SenderMotion::Fixed(ohms));
    let v = s.read(T).unwrap();
    assert!((v - volts).abs() < 1e-9, "{ohms} Ω read {v} V");
}

#[test]
fn sweep_reaches_both_stops_and_returns() {
    let mut s = SimulatedSender::new(
        47.0,
        3.3,
        SenderMotion::Sweep {
            min_ohms: 0.0,
            max_ohms: 100.0,
            samples: 4,
        },
    );
    let ohms: Vec<f64> = (0..5)
        .map(|_| {
            let o = s.ohms();
            s.read(T).unwrap();
            o
        })
        .collect();
    assert_eq!(ohms, vec![0.0, 50.0, 100.0, 50.0, 0.0]);
}

#[test]
fn scripted_input_replays_then_disconnects() {
    let mut s = ScriptedInput::new([Scripted::Volts(1.0), Scripted::Timeout]);
    assert_eq!(s.read(T).unwrap(), 1.0);
    let e = s.read(T).unwrap_err();
    assert!(matches!(e.downcast_ref::<HwError>(), Some(HwError::Timeout)));
    let e = s.read(T).unwrap_err();
    assert!(matches!(e.downcast_ref::<HwError>(), Some(HwError::Disconnected)));
    assert_eq!(s.remaining(), 0);
}

#[test]
fn retrying_input_skips_timeouts() {
    let inner = ScriptedInput::new([Scripted::Timeout, Scripted::Timeout, Scripted::Volts(2.0)]);
    let mut r = RetryingInput::new(inner, 3);
    assert_eq!(r.read(T).unwrap(), 2.0);
}

#[test]
fn retrying_input_gives_up_after_budget() {
    let inner = ScriptedInput::new([Scripted::Timeout, Scripted::Timeout, Scripted::Volts(2.0)]);
    let mut r = RetryingInput::new(inner, 1);
    let e = r.read(T).unwrap_err();
    assert!(e.to_string().contains("timeout"));
    // the remaining reading is still queued
    assert_eq!(r.into_inner().remaining(), 1);
}

#[test]
fn retrying_input_does_not_retry_disconnects() {
    let mut r = RetryingInput::new(ScriptedInput::default(), 5);
    let e = r.read(T).unwrap_err();
    assert!(e.to_string().contains("disconnected"));
}
