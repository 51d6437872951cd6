//! Error taxonomy for the seat matrix core.
//!
//! Every failure that reaches a caller of [`compute_matrix`] or
//! [`AvailabilityOrchestrator::check`] is one of these. Display output is the
//! human-readable message shown to the user.
//!
//! [`compute_matrix`]: crate::matrix::compute_matrix
//! [`AvailabilityOrchestrator::check`]: crate::availability::AvailabilityOrchestrator::check

use crate::credentials::CredentialError;
use crate::shohoz::{ApiError, AuthFailure};

/// Errors surfaced by the core operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// No bearer token or device key is stored
    #[error("please sign in to continue")]
    CredentialsMissing,

    /// The bearer token is no longer accepted
    #[error("your session has expired, please sign in again")]
    AuthTokenExpired,

    /// The device key is no longer accepted
    #[error("this device's key has expired, please sign in again")]
    DeviceKeyExpired,

    /// The train does not run on the requested weekday
    #[error("{train} does not run on {weekday}")]
    ScheduleNotRunningOnDate { weekday: String, train: String },

    /// Schedule or train not found, or no seats anywhere
    #[error("{0}")]
    NoDataFound(String),

    /// Too many requests
    #[error("too many requests, please wait a moment and try again")]
    RateLimited,

    /// The remote service is failing (5xx), after retries
    #[error("the railway server is unavailable right now (status {status})")]
    ServerUnavailable { status: u16 },

    /// Transport-level failure
    #[error("network error: {0}")]
    NetworkFailure(String),

    /// The remote service rejected the request
    #[error("request rejected: {0}")]
    Rejected(String),

    /// The remote service answered with something we could not read
    #[error("unexpected response from the railway server: {0}")]
    UnexpectedResponse(String),

    /// Every seat layout was withheld by a booking rule
    #[error("{0}")]
    BookingRestricted(String),

    /// Caller-supplied input failed validation
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The operation was canceled by the caller
    #[error("canceled")]
    Canceled,
}

impl CoreError {
    /// Errors the UI answers by sending the user back to credential entry.
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            CoreError::CredentialsMissing | CoreError::AuthTokenExpired | CoreError::DeviceKeyExpired
        )
    }

    pub fn is_canceled(&self) -> bool {
        matches!(self, CoreError::Canceled)
    }

    /// The message to show, or `None` for a cancellation, which is silent.
    pub fn user_message(&self) -> Option<String> {
        if self.is_canceled() {
            None
        } else {
            Some(self.to_string())
        }
    }
}

impl From<CredentialError> for CoreError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::Missing => CoreError::CredentialsMissing,
            CredentialError::TokenExpired => CoreError::AuthTokenExpired,
        }
    }
}

impl From<ApiError> for CoreError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Credentials(e) => e.into(),
            ApiError::Unauthorized(AuthFailure::Token) => CoreError::AuthTokenExpired,
            ApiError::Unauthorized(AuthFailure::DeviceKey) => CoreError::DeviceKeyExpired,
            ApiError::RateLimited => CoreError::RateLimited,
            ApiError::ServerUnavailable { status } => CoreError::ServerUnavailable { status },
            ApiError::NotFound => CoreError::NoDataFound("no data found".to_string()),
            ApiError::Rejected { message, .. } => CoreError::Rejected(message),
            ApiError::Http(e) => CoreError::NetworkFailure(e.to_string()),
            ApiError::Json { message, .. } => CoreError::UnexpectedResponse(message),
            ApiError::Canceled => CoreError::Canceled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_family() {
        assert!(CoreError::CredentialsMissing.is_auth());
        assert!(CoreError::AuthTokenExpired.is_auth());
        assert!(CoreError::DeviceKeyExpired.is_auth());
        assert!(!CoreError::RateLimited.is_auth());
        assert!(!CoreError::Canceled.is_auth());
    }

    #[test]
    fn canceled_is_silent() {
        assert_eq!(CoreError::Canceled.user_message(), None);
        assert_eq!(
            CoreError::NoDataFound("no seats".into()).user_message(),
            Some("no seats".to_string())
        );
    }

    #[test]
    fn not_running_message() {
        let err = CoreError::ScheduleNotRunningOnDate {
            weekday: "Friday".into(),
            train: "SUBORNA EXPRESS (701)".into(),
        };
        assert_eq!(err.to_string(), "SUBORNA EXPRESS (701) does not run on Friday");
    }

    #[test]
    fn api_errors_map_into_taxonomy() {
        assert_eq!(
            CoreError::from(ApiError::Unauthorized(AuthFailure::DeviceKey)),
            CoreError::DeviceKeyExpired
        );
        assert_eq!(
            CoreError::from(ApiError::Credentials(CredentialError::Missing)),
            CoreError::CredentialsMissing
        );
        assert_eq!(
            CoreError::from(ApiError::ServerUnavailable { status: 503 }),
            CoreError::ServerUnavailable { status: 503 }
        );
        assert_eq!(CoreError::from(ApiError::Canceled), CoreError::Canceled);
        assert!(matches!(
            CoreError::from(ApiError::Rejected {
                status: 422,
                message: "bad".into()
            }),
            CoreError::Rejected(m) if m == "bad"
        ));
    }
}
