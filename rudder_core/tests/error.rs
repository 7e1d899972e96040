use rudder_core::error::{BuildError, CoreError};
use rudder_core::hw_error::map_hw_error;
use rudder_hardware::error::HwError;

#[test]
fn per_event_faults_name_their_stage() {
    let e = CoreError::NonFiniteResult {
        stage: "linear".into(),
        value: f64::INFINITY,
    };
    assert_eq!(e.stage(), Some("linear"));
    assert!(e.to_string().contains("non-finite"));
    assert_eq!(CoreError::Timeout.stage(), None);
}

#[test]
fn hardware_errors_map_to_typed_variants() {
    assert_eq!(map_hw_error(&HwError::Timeout), CoreError::Timeout);
    assert_eq!(
        map_hw_error(&HwError::Disconnected),
        CoreError::Disconnected
    );
    assert_eq!(
        CoreError::Disconnected.to_string(),
        "analog input disconnected"
    );
}

#[test]
fn build_errors_render() {
    assert_eq!(
        BuildError::UnknownNode("stage[7]".into()).to_string(),
        "pipeline has no node stage[7]"
    );
}
