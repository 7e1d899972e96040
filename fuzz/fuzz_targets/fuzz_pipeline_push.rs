#![no_main]
use libfuzzer_sys::fuzz_target;
use rudder_core::{PropagationStatus, RudderCfg, RudderPipeline};

fuzz_target!(|data: &[u8]| {
    let Ok(mut rudder) = RudderPipeline::build(RudderCfg::default()) else {
        return;
    };
    for chunk in data.chunks_exact(8) {
        let mut b = [0u8; 8];
        b.copy_from_slice(chunk);
        let volts = f64::from_le_bytes(b);
        // Delivered values are always finite; anything else is skipped.
        if let PropagationStatus::Delivered(v) = rudder.push(volts) {
            assert!(v.is_finite());
        }
    }
    assert_eq!(
        rudder.pipeline().emitted() + rudder.pipeline().skipped(),
        (data.len() / 8) as u64
    );
});
