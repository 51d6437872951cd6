//! Railway API client error types.

use crate::credentials::CredentialError;

/// Which credential the server refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    Token,
    DeviceKey,
}

/// Errors from the railway HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON deserialization failed
    #[error("JSON parse error: {message}")]
    Json {
        message: String,
        body: Option<String>,
    },

    /// No usable credentials before the request was sent
    #[error("credentials: {0}")]
    Credentials(#[from] CredentialError),

    /// Server refused the token or device key (401/403)
    #[error("unauthorized ({0:?})")]
    Unauthorized(AuthFailure),

    /// Rate limited by the API (429)
    #[error("rate limited by the railway API")]
    RateLimited,

    /// Server-side failure (5xx); the only retryable error
    #[error("server unavailable (status {status})")]
    ServerUnavailable { status: u16 },

    /// Resource not found (404)
    #[error("not found")]
    NotFound,

    /// Request rejected with a validation message (422 and other 4xx)
    #[error("API error {status}: {message}")]
    Rejected { status: u16, message: String },

    /// The caller's cancel token fired
    #[error("request canceled")]
    Canceled,
}

impl ApiError {
    /// Auth-family failures: every later request would fail the same way.
    pub fn is_auth(&self) -> bool {
        matches!(self, ApiError::Credentials(_) | ApiError::Unauthorized(_))
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::ServerUnavailable { .. })
    }
}
