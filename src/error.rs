use thiserror::Error;

/// Custom error types for the prayer-timings crate
#[derive(Error, Debug)]
pub enum AppError {
    /// Error when the request could not complete (DNS, connection, body read)
    #[error("Failed to fetch data: {0}")]
    Network(#[source] reqwest::Error),

    /// Error when the request outlived the configured timeout
    #[error("timeout")]
    Timeout,

    /// Error when the API answers with a non-2xx status
    #[error("HTTP error! status: {0}")]
    HttpStatus(u16),

    /// Error when a time of day is not in `HH:MM` form
    #[error("Malformed time of day: {0:?}")]
    MalformedTime(String),

    /// Error when environment variable is not set
    #[error("Environment variable not set: {0}")]
    EnvVarNotSet(String),

    /// Error when the configuration cannot be used
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::Timeout
        } else {
            AppError::Network(err)
        }
    }
}
