use std::error::Error;

/// Error returned by an alert sink.
pub type AlertError = Box<dyn Error + Send + Sync>;

/// Shared error type for the vitals engine.
#[derive(Debug, thiserror::Error)]
pub enum VitalsError {
    #[error("VitalsChecker requires an alerter")]
    MissingAlerter,
    #[error("Invalid range for {vital}: [{min}, {max}]")]
    InvalidRange { vital: String, min: f64, max: f64 },
    #[error("Input is missing required data")]
    MissingData,
    #[error("Could not parse input: {0}")]
    Parse(String),
    #[error("Alerter failed: {0}")]
    Alerter(#[source] AlertError),
}
