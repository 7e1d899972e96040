use std::sync::{Arc, Mutex};

use rudder_core::{
    CalibrationPoint, CoreError, DegreesToRadians, Emission, Lambda, Linear, NodeId, Pipeline,
    PropagationStatus, Transform,
};

type Log = Arc<Mutex<Vec<(String, f64)>>>;

fn recorder(tag: &str) -> (Log, impl FnMut(&Emission<'_>) + Send + 'static) {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let inner = log.clone();
    let tag = tag.to_string();
    (log, move |e: &Emission<'_>| {
        inner.lock().unwrap().push((format!("{tag}:{}", e.name), e.value));
    })
}

fn three_stage() -> Pipeline {
    let linear = Linear::from_points(
        "linear",
        CalibrationPoint::new(2.113363, -40.0),
        CalibrationPoint::new(223.0, 40.0),
    )
    .unwrap();
    Pipeline::compose(
        "raw",
        vec![
            Box::new(linear) as Box<dyn Transform>,
            Box::new(DegreesToRadians::new("radians")),
        ],
    )
}

#[test]
fn raw_to_radians_with_intermediate_tap() {
    let mut p = three_stage();
    let (out_log, out_sink) = recorder("out");
    let (diag_log, diag_sink) = recorder("diag");
    let degrees = p.stage_id("linear").unwrap();
    p.connect(degrees, diag_sink).unwrap();
    p.connect_output(out_sink);

    let status = p.push(2.113363);
    let final_rad = status.value().unwrap();
    assert!((final_rad - (-0.698_131_7)).abs() < 1e-6, "{final_rad}");

    let diag = diag_log.lock().unwrap();
    assert_eq!(diag.len(), 1);
    assert_eq!(diag[0].0, "diag:linear");
    assert!((diag[0].1 - (-40.0)).abs() < 1e-9);

    let out = out_log.lock().unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].1, final_rad);
}

#[test]
fn fan_out_preserves_connection_order() {
    let mut p = three_stage();
    let order: Log = Arc::new(Mutex::new(Vec::new()));
    for tag in ["first", "second", "third"] {
        let order = order.clone();
        p.connect(NodeId::Stage(1), move |e| {
            order.lock().unwrap().push((tag.to_string(), e.value));
        })
        .unwrap();
    }
    p.push(223.0);
    p.push(2.113363);
    let got: Vec<String> = order.lock().unwrap().iter().map(|(t, _)| t.clone()).collect();
    assert_eq!(got, ["first", "second", "third", "first", "second", "third"]);
}

#[test]
fn nodes_emit_source_to_output_within_one_cycle() {
    let mut p = three_stage();
    let shared: Log = Arc::new(Mutex::new(Vec::new()));
    for node in [NodeId::Stage(1), NodeId::Source, NodeId::Stage(0)] {
        let shared = shared.clone();
        p.connect(node, move |e| shared.lock().unwrap().push((e.name.to_string(), e.value)))
            .unwrap();
    }
    p.push(10.0);
    let names: Vec<String> = shared.lock().unwrap().iter().map(|(n, _)| n.clone()).collect();
    assert_eq!(names, ["raw", "linear", "radians"]);
}

#[test]
fn failing_stage_skips_downstream_and_recovers() {
    let mut p = Pipeline::compose(
        "raw",
        vec![
            Box::new(Lambda::new("reciprocal", |x| 1.0 / x)) as Box<dyn Transform>,
            Box::new(Lambda::new("double", |x| x * 2.0)),
        ],
    );
    let (first_log, first) = recorder("a");
    let (last_log, last) = recorder("b");
    let faults: Arc<Mutex<Vec<CoreError>>> = Arc::new(Mutex::new(Vec::new()));
    let f = faults.clone();
    p.connect(NodeId::Stage(0), first).unwrap();
    p.connect_output(last);
    p.on_fault(move |e| f.lock().unwrap().push(e.clone()));

    let status = p.push(0.0);
    match status {
        PropagationStatus::Skipped(CoreError::NonFiniteResult { stage, value }) => {
            assert_eq!(stage, "reciprocal");
            assert!(value.is_infinite());
        }
        other => panic!("unexpected status {other:?}"),
    }
    assert!(first_log.lock().unwrap().is_empty());
    assert!(last_log.lock().unwrap().is_empty());
    assert_eq!(faults.lock().unwrap().len(), 1);

    assert_eq!(p.push(4.0), PropagationStatus::Delivered(0.5));
    assert_eq!(last_log.lock().unwrap().len(), 1);
    assert_eq!(p.emitted(), 1);
    assert_eq!(p.skipped(), 1);
}

#[test]
fn evaluate_reports_every_node_without_side_effects() {
    let mut p = three_stage();
    let (log, sink) = recorder("x");
    p.connect_output(sink);
    let readings = p.evaluate(223.0).unwrap();
    assert_eq!(readings.len(), 3);
    assert_eq!(readings[0].node, NodeId::Source);
    assert!((readings[1].value - 40.0).abs() < 1e-9);
    assert!(log.lock().unwrap().is_empty());
    assert_eq!(p.emitted(), 0);
}

#[test]
fn evaluate_surfaces_stage_errors() {
    let p = Pipeline::compose(
        "raw",
        vec![Box::new(Lambda::new("sqrt", f64::sqrt)) as Box<dyn Transform>],
    );
    let err = p.evaluate(-1.0).unwrap_err();
    assert_eq!(err.stage(), Some("sqrt"));
}

#[test]
fn pipeline_can_move_to_another_thread() {
    let mut p = three_stage();
    let handle = std::thread::spawn(move || p.push(223.0));
    let status = handle.join().unwrap();
    assert!(status.is_delivered());
}
