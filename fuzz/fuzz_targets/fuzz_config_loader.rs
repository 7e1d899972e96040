#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parse, validation, and build errors are fine; panics are not.
    if let Ok(cfg) = rudder_config::load_toml(data)
        && cfg.validate().is_ok()
    {
        let core = rudder_core::RudderCfg::from(&cfg);
        let _ = rudder_core::RudderPipeline::build(core);
    }
});
