use std::sync::{Arc, Mutex};

use rudder_core::config::{CalibrationCfg, RudderCfg};
use rudder_core::mocks::RecordingPublisher;
use rudder_core::rudder::{DEGREES_NODE, DIVIDER_NODE};
use rudder_core::{CalibrationPoint, CoreError, PropagationStatus, RudderPipeline, StatusBoard};

fn cfg_40() -> RudderCfg {
    RudderCfg {
        calibration: CalibrationCfg {
            min: CalibrationPoint::new(2.113363, -40.0),
            max: CalibrationPoint::new(223.0, 40.0),
        },
        ..RudderCfg::default()
    }
}

#[test]
fn publishes_radians_under_configured_path() {
    let mut rudder = RudderPipeline::build(cfg_40()).unwrap();
    let publisher = RecordingPublisher::new();
    rudder.attach_publisher(publisher.clone());

    let volts = rudder.volts_for_ohms(2.113363);
    let status = rudder.push(volts);
    assert!(status.is_delivered());

    let published = publisher.published();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].0, "steering.rudderAngle");
    assert!((published[0].1 - (-40.0f64).to_radians()).abs() < 1e-6);
}

#[test]
fn diagnostics_track_every_stage() {
    let mut rudder = RudderPipeline::build(cfg_40()).unwrap();
    let board = StatusBoard::new();
    rudder.attach_diagnostics(&board).unwrap();

    let volts = rudder.volts_for_ohms(223.0);
    rudder.push(volts);

    let items = board.snapshot();
    let orders: Vec<u8> = items.iter().map(|i| i.order).collect();
    assert_eq!(orders, [1, 2, 3, 4]);
    assert!(items.iter().all(|i| i.group == "Rudder Angle Sensor"));
    assert_eq!(items[0].value, Some(volts));
    assert!((items[1].value.unwrap() - 223.0).abs() < 1e-9);
    assert!((items[2].value.unwrap() - 40.0).abs() < 1e-9);
    assert!((items[3].value.unwrap() - 40.0f64.to_radians()).abs() < 1e-9);
    assert!(items[3].label.contains("steering.rudderAngle"));
}

#[test]
fn default_calibration_spans_fifty_degrees() {
    let rudder = RudderPipeline::build(RudderCfg::default()).unwrap();
    let c = rudder.coefficients();
    assert!((c.apply(2.113363) + 50.0).abs() < 1e-9);
    assert!((c.apply(223.0) - 50.0).abs() < 1e-9);
}

#[test]
fn degenerate_calibration_fails_build() {
    let cfg = RudderCfg {
        calibration: CalibrationCfg {
            min: CalibrationPoint::new(5.0, 10.0),
            max: CalibrationPoint::new(5.0, 20.0),
        },
        ..RudderCfg::default()
    };
    let err = RudderPipeline::build(cfg).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CoreError>(),
        Some(CoreError::InvalidCalibration(_))
    ));
}

#[test]
fn saturated_adc_is_skipped_and_reported() {
    let mut rudder = RudderPipeline::build(cfg_40()).unwrap();
    let publisher = RecordingPublisher::new();
    rudder.attach_publisher(publisher.clone());
    let faults = Arc::new(Mutex::new(Vec::new()));
    let f = faults.clone();
    rudder.on_fault(move |e| f.lock().unwrap().push(e.clone()));

    // an open sender pulls the ADC node up to the supply
    let status = rudder.push(3.3);
    assert!(matches!(
        status,
        PropagationStatus::Skipped(CoreError::InvalidInput { .. })
    ));
    assert!(publisher.published().is_empty());
    assert_eq!(faults.lock().unwrap()[0].stage(), Some("voltage divider"));

    assert!(rudder.push(1.0).is_delivered());
    assert_eq!(publisher.published().len(), 1);
}

#[test]
fn extra_sinks_attach_through_pipeline_mut() {
    let mut rudder = RudderPipeline::build(cfg_40()).unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let s = seen.clone();
    rudder
        .pipeline_mut()
        .connect(DIVIDER_NODE, move |e| s.lock().unwrap().push(e.value))
        .unwrap();
    let s2 = seen.clone();
    rudder
        .pipeline_mut()
        .connect(DEGREES_NODE, move |e| s2.lock().unwrap().push(e.value))
        .unwrap();
    rudder.push(rudder.volts_for_ohms(47.0));
    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert!((seen[0] - 47.0).abs() < 1e-9);
}
