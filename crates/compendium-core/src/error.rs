use thiserror::Error;

/// Failures raised by the catalog client and the layers that parse its output.
///
/// Only the fetch client produces the first three variants; everything above
/// it degrades them into a safe state instead of surfacing them to the user.
#[derive(Debug, Error)]
pub enum Error {
    /// Network failure, a 5xx with attempts left, or a body that could not be parsed.
    #[error("Transient failure fetching {path}: {reason}")]
    Transient { path: String, reason: String },

    /// HTTP 429 on the final attempt.
    #[error("Rate limited fetching {path} after {attempts} attempts")]
    RateLimited { path: String, attempts: u32 },

    /// 4xx other than 429, or a 5xx still failing on the final attempt.
    #[error("Request for {path} rejected with status {status}")]
    Permanent { path: String, status: u16 },

    #[error("Could not decode {what}: {reason}")]
    Decode { what: String, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),
}

impl Error {
    /// Whether another attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Transient { .. } | Error::RateLimited { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
