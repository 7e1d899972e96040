pub mod clock;

pub use clock::{Clock, ManualClock, MonotonicClock};

/// A periodically polled analog source (ADC channel, potentiometer, simulator).
///
/// Implementations return the measured value already scaled to volts.
pub trait AnalogInput {
    fn read(
        &mut self,
        timeout: std::time::Duration,
    ) -> Result<f64, Box<dyn std::error::Error + Send + Sync>>;
}

/// Terminal consumer that republishes a value under a hierarchical path
/// (e.g. `steering.rudderAngle`).
pub trait Publisher {
    fn publish(
        &mut self,
        path: &str,
        value: f64,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

impl<T: AnalogInput + ?Sized> AnalogInput for Box<T> {
    fn read(
        &mut self,
        timeout: std::time::Duration,
    ) -> Result<f64, Box<dyn std::error::Error + Send + Sync>> {
        (**self).read(timeout)
    }
}

impl<T: Publisher + ?Sized> Publisher for Box<T> {
    fn publish(
        &mut self,
        path: &str,
        value: f64,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).publish(path, value)
    }
}
