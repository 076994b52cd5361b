//! Source error types.

use thiserror::Error;

/// Errors that can occur when fetching attendance from the scraping backend.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The backend rejected the request (HTTP 400, e.g. malformed register number).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The portal login failed.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The backend returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// The backend could not scrape the portal.
    #[error("scraping failed (HTTP {status}): {message}")]
    ScrapeFailed { status: u16, message: String },

    /// The backend answered but listed no subjects.
    #[error("no attendance data found")]
    NoData,

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),
}

impl SourceError {
    /// Returns `true` if retrying the same request cannot succeed.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            SourceError::InvalidRequest(_) | SourceError::AuthenticationFailed(_)
        )
    }

    /// Returns the retry-after delay in seconds, if applicable.
    pub fn retry_after_secs(&self) -> Option<u64> {
        match self {
            SourceError::RateLimited { retry_after_secs } => Some(*retry_after_secs),
            _ => None,
        }
    }
}
