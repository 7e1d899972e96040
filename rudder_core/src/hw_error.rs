//! Typed view of errors crossing the `AnalogInput` and `Publisher` seams.
//!
//! Both traits return `Box<dyn Error>`. The sampler classifies read failures
//! here to decide whether to keep polling, and the rudder assembly uses it to
//! tag publish failures in logs.

use crate::error::CoreError;

/// Classify a boxed input or publisher error.
///
/// `Timeout` is transient: the sampler retries on its next tick.
/// `Disconnected` is permanent: the sampler stops. Anything else is carried
/// as `Hardware` with the source message.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> CoreError {
    #[cfg(feature = "hardware-errors")]
    {
        use rudder_hardware::error::HwError;
        if let Some(hw) = e.downcast_ref::<HwError>() {
            return match hw {
                HwError::Timeout => CoreError::Timeout,
                HwError::Disconnected => CoreError::Disconnected,
            };
        }
    }

    // Inputs outside rudder_hardware: match on the message.
    let msg = e.to_string();
    let lower = msg.to_ascii_lowercase();
    if lower.contains("timeout") || lower.contains("timed out") {
        CoreError::Timeout
    } else if lower.contains("disconnected") {
        CoreError::Disconnected
    } else {
        CoreError::Hardware(msg)
    }
}

/// True when the input will not produce further readings.
pub fn is_permanent(e: &CoreError) -> bool {
    matches!(e, CoreError::Disconnected)
}
