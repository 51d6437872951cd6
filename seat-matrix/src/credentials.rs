//! Credentials for the authenticated railway API.
//!
//! The bearer token and device key are owned by an external store; the core
//! only reads them. A token is a JWT, so its expiry can be checked locally
//! before any request is made.

use std::path::PathBuf;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Environment variable holding the bearer token.
pub const TOKEN_ENV: &str = "SHOHOZ_TOKEN";

/// Environment variable holding the device key.
pub const DEVICE_KEY_ENV: &str = "SHOHOZ_DEVICE_KEY";

/// Why usable credentials could not be produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    #[error("no stored credentials")]
    Missing,

    #[error("stored token has expired")]
    TokenExpired,
}

/// A bearer token and the device key it was issued with.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    pub token: String,
    pub device_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"<redacted>")
            .field("device_key", &"<redacted>")
            .finish()
    }
}

#[derive(Deserialize)]
struct JwtClaims {
    exp: Option<i64>,
}

impl Credentials {
    pub fn new(token: impl Into<String>, device_key: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            device_key: device_key.into(),
        }
    }

    /// Expiry from the token's `exp` claim, if the token is a readable JWT.
    pub fn token_expiry(&self) -> Option<DateTime<Utc>> {
        let payload = self.token.split('.').nth(1)?;
        let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
        let claims: JwtClaims = serde_json::from_slice(&bytes).ok()?;
        DateTime::from_timestamp(claims.exp?, 0)
    }

    /// Reject blank or locally expired credentials.
    ///
    /// Opaque (non-JWT) tokens pass; the server is the judge for those.
    pub fn check(&self, now: DateTime<Utc>) -> Result<(), CredentialError> {
        if self.token.trim().is_empty() || self.device_key.trim().is_empty() {
            return Err(CredentialError::Missing);
        }
        match self.token_expiry() {
            Some(exp) if exp <= now => Err(CredentialError::TokenExpired),
            _ => Ok(()),
        }
    }
}

/// Supplies the current credentials.
///
/// Implementations are read on every request, so a token refreshed by the
/// owning store is picked up without restarting anything.
pub trait CredentialSource: Send + Sync {
    fn credentials(&self) -> Option<Credentials>;

    /// Current credentials, checked for presence and expiry.
    fn usable(&self) -> Result<Credentials, CredentialError> {
        let creds = self.credentials().ok_or(CredentialError::Missing)?;
        creds.check(Utc::now())?;
        Ok(creds)
    }
}

/// Fixed credentials, or none.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials(Option<Credentials>);

impl StaticCredentials {
    pub fn new(creds: Credentials) -> Self {
        Self(Some(creds))
    }

    pub fn none() -> Self {
        Self(None)
    }
}

impl CredentialSource for StaticCredentials {
    fn credentials(&self) -> Option<Credentials> {
        self.0.clone()
    }
}

/// Credentials from `SHOHOZ_TOKEN` and `SHOHOZ_DEVICE_KEY`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvCredentials;

impl CredentialSource for EnvCredentials {
    fn credentials(&self) -> Option<Credentials> {
        let token = std::env::var(TOKEN_ENV).ok()?;
        let device_key = std::env::var(DEVICE_KEY_ENV).ok()?;
        Some(Credentials::new(token, device_key))
    }
}

/// Credentials from a JSON file `{"token": "...", "device_key": "..."}`,
/// re-read on every call.
#[derive(Debug, Clone)]
pub struct FileCredentials {
    path: PathBuf,
}

impl FileCredentials {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CredentialSource for FileCredentials {
    fn credentials(&self) -> Option<Credentials> {
        let json = match std::fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) => {
                tracing::debug!(path = %self.path.display(), error = %e, "credentials file unreadable");
                return None;
            }
        };
        match serde_json::from_str(&json) {
            Ok(creds) => Some(creds),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "credentials file malformed");
                None
            }
        }
    }
}
