//! Human-readable error descriptions and structured JSON error formatting.

use rudder_core::error::{BuildError, CoreError};

fn core_error(err: &eyre::Report) -> Option<&CoreError> {
    err.chain().find_map(|e| e.downcast_ref::<CoreError>())
}

fn build_error(err: &eyre::Report) -> Option<&BuildError> {
    err.chain().find_map(|e| e.downcast_ref::<BuildError>())
}

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(be) = build_error(err) {
        return match be {
            BuildError::UnknownNode(node) => format!(
                "What happened: A sink was attached to {node}, which the pipeline does not have.\nLikely causes: Stage index out of range for the assembled pipeline.\nHow to fix: Attach sinks to the source or to a stage returned by stage_id(...)."
            ),
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun. See etc/rudder_config.toml for a sample."
            ),
        };
    }

    if let Some(ce) = core_error(err) {
        return match ce {
            CoreError::InvalidCalibration(why) => format!(
                "What happened: Calibration cannot define a line ({why}).\nLikely causes: Both stops measured at the same resistance, or a non-finite value.\nHow to fix: Re-measure the sender at hard-over port and starboard and update [calibration] or the CSV."
            ),
            CoreError::InvalidInput { stage, value, reason } => format!(
                "What happened: Stage '{stage}' rejected {value} ({reason}).\nLikely causes: ADC reading at or above the divider supply, or a disconnected sender.\nHow to fix: Check sender wiring and divider.vin_volts."
            ),
            CoreError::NonFiniteResult { stage, .. } => format!(
                "What happened: Stage '{stage}' produced a non-finite value.\nLikely causes: Reading outside the range the calibration was measured over.\nHow to fix: Check the sender and re-run calibration."
            ),
            CoreError::Timeout => "What happened: Analog read timed out.\nLikely causes: ADC not wired, no power, or input.read_timeout_ms too low.\nHow to fix: Verify the input pin and raise input.read_timeout_ms.".to_string(),
            CoreError::Disconnected => "What happened: The analog input stopped producing readings.\nLikely causes: Sender wire broken or unplugged, or the ADC was released.\nHow to fix: Check the sender connection and restart the run.".to_string(),
            CoreError::Hardware(msg) => format!(
                "What happened: Hardware error ({msg}).\nLikely causes: Sender disconnected or the sampler stopped.\nHow to fix: Check wiring and re-run with --log-level=debug."
            ),
        };
    }

    // String-based heuristics for errors coming from init or config
    let msg = err
        .chain()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(": ");
    let lower = msg.to_ascii_lowercase();

    // Calibration CSV header special-case
    if lower.contains("calibration csv must have headers") {
        return "Invalid headers in calibration CSV. Expected 'ohms,degrees'.".to_string();
    }

    if lower.contains("read config") {
        return format!(
            "What happened: Could not read the config file.\nLikely causes: Wrong --config path or missing permissions.\nHow to fix: Pass --config pointing at a readable TOML file. Original: {msg}"
        );
    }

    if lower.contains("invalid configuration") || lower.contains("parse config") {
        return format!(
            "What happened: Configuration is invalid or incomplete.\nLikely causes: Missing [calibration] section or out-of-range values.\nHow to fix: Edit the TOML config and try again. Original: {msg}"
        );
    }

    // Generic fallback
    format!(
        "Something went wrong.\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Short stable name for the error class, used in JSON output.
pub fn error_reason_name(err: &eyre::Report) -> &'static str {
    if let Some(be) = build_error(err) {
        return match be {
            BuildError::UnknownNode(_) => "UnknownNode",
            BuildError::InvalidConfig(_) => "InvalidConfig",
        };
    }
    match core_error(err) {
        Some(CoreError::InvalidCalibration(_)) => "InvalidCalibration",
        Some(CoreError::InvalidInput { .. }) => "InvalidInput",
        Some(CoreError::NonFiniteResult { .. }) => "NonFiniteResult",
        Some(CoreError::Timeout) => "Timeout",
        Some(CoreError::Disconnected) => "Disconnected",
        Some(CoreError::Hardware(_)) => "Hardware",
        None => "Error",
    }
}

/// Stable exit codes: 3 for calibration/build errors, 4 for rejected
/// readings, 5 for hardware; everything else returns 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if build_error(err).is_some() {
        return 3;
    }
    match core_error(err) {
        Some(CoreError::InvalidCalibration(_)) => 3,
        Some(CoreError::InvalidInput { .. } | CoreError::NonFiniteResult { .. }) => 4,
        Some(CoreError::Timeout | CoreError::Disconnected | CoreError::Hardware(_)) => 5,
        None => 1,
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    let msg = humanize(err);
    let reason = error_reason_name(err);
    match core_error(err) {
        Some(ce) if ce.stage().is_some() => {
            json!({ "reason": reason, "stage": ce.stage(), "message": msg }).to_string()
        }
        _ => json!({ "reason": reason, "message": msg }).to_string(),
    }
}
