use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("analog read timeout")]
    Timeout,
    #[error("analog input disconnected")]
    Disconnected,
}
