//! Railway booking API HTTP client.
//!
//! Provides async methods for the schedule, trip search and seat layout
//! endpoints. Handles authentication headers, cancellation, status
//! classification, and a bounded retry on server errors.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::credentials::CredentialSource;
use crate::domain::{RawSeat, TrainModel, TravelDate};

use super::error::{ApiError, AuthFailure};
use super::types::{
    Envelope, SearchTripsData, SeatLayoutData, TrainRoutesData, TripDto, extract_message,
};
use super::{SeatService, TripQuery, TripRef};

/// Default base URL for the booking API.
pub const DEFAULT_BASE_URL: &str = "https://railspaapi.shohoz.com";

/// Header carrying the device key alongside the bearer token.
const DEVICE_KEY_HEADER: &str = "x-device-key";

/// Default number of retries after a server error.
const DEFAULT_MAX_RETRIES: u32 = 1;

/// Configuration for the railway API client.
#[derive(Debug, Clone)]
pub struct ShohozConfig {
    /// Base URL for the API (defaults to production)
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Retries after a 5xx response
    pub max_retries: u32,
    /// Pause before each retry, multiplied by the attempt number
    pub retry_delay: Duration,
}

impl ShohozConfig {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: Duration::from_millis(500),
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set retries after a server error. Clamped to 2.
    pub fn with_max_retries(mut self, n: u32) -> Self {
        self.max_retries = n.min(2);
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }
}

impl Default for ShohozConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Railway booking API client.
#[derive(Clone)]
pub struct ShohozClient {
    http: reqwest::Client,
    base_url: String,
    max_retries: u32,
    retry_delay: Duration,
    credentials: Arc<dyn CredentialSource>,
}

impl std::fmt::Debug for ShohozClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShohozClient")
            .field("base_url", &self.base_url)
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}

impl ShohozClient {
    /// Create a new client reading credentials from `credentials`.
    pub fn new(
        config: ShohozConfig,
        credentials: Arc<dyn CredentialSource>,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_retries: config.max_retries,
            retry_delay: config.retry_delay,
            credentials,
        })
    }

    /// GET a `{ "data": T }` endpoint, retrying server errors.
    async fn get_data<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        cancel: &CancellationToken,
    ) -> Result<Option<T>, ApiError> {
        let mut attempt = 0;
        loop {
            match self.get_once::<T>(path, query, cancel).await {
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    warn!(path, attempt, error = %e, "retrying after server error");
                    let delay = self.retry_delay * attempt;
                    if cancel.run_until_cancelled(tokio::time::sleep(delay)).await.is_none() {
                        return Err(ApiError::Canceled);
                    }
                }
                other => return other,
            }
        }
    }

    async fn get_once<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        cancel: &CancellationToken,
    ) -> Result<Option<T>, ApiError> {
        if cancel.is_cancelled() {
            return Err(ApiError::Canceled);
        }
        let creds = self.credentials.usable()?;

        let url = format!("{}{}", self.base_url, path);
        let request = self
            .http
            .get(&url)
            .query(query)
            .bearer_auth(&creds.token)
            .header(DEVICE_KEY_HEADER, &creds.device_key)
            .send();

        let response = cancel
            .run_until_cancelled(request)
            .await
            .ok_or(ApiError::Canceled)??;
        let status = response.status();
        let body = cancel
            .run_until_cancelled(response.text())
            .await
            .ok_or(ApiError::Canceled)??;

        debug!(path, status = status.as_u16(), bytes = body.len(), "railway API response");

        if let Some(err) = classify_status(status, &body) {
            return Err(err);
        }

        let envelope: Envelope<T> = serde_json::from_str(&body).map_err(|e| ApiError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(500).collect()),
        })?;

        Ok(envelope.data)
    }
}

/// Map a non-success status to its error. `None` for success.
fn classify_status(status: reqwest::StatusCode, body: &str) -> Option<ApiError> {
    use reqwest::StatusCode;

    if status.is_success() {
        return None;
    }
    let err = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            if body.to_ascii_lowercase().contains("device") {
                ApiError::Unauthorized(AuthFailure::DeviceKey)
            } else {
                ApiError::Unauthorized(AuthFailure::Token)
            }
        }
        StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimited,
        StatusCode::NOT_FOUND => ApiError::NotFound,
        s if s.is_server_error() => ApiError::ServerUnavailable { status: s.as_u16() },
        s => ApiError::Rejected {
            status: s.as_u16(),
            message: extract_message(body),
        },
    };
    Some(err)
}

impl SeatService for ShohozClient {
    fn check_credentials(&self) -> Result<(), ApiError> {
        self.credentials.usable()?;
        Ok(())
    }

    async fn train_schedule(
        &self,
        model: &TrainModel,
        date: TravelDate,
        cancel: &CancellationToken,
    ) -> Result<TrainRoutesData, ApiError> {
        let query = [
            ("model", model.as_str().to_string()),
            ("departure_date_time", date.iso()),
        ];
        let data = self
            .get_data::<TrainRoutesData>("/v1.0/web/train-routes", &query, cancel)
            .await?;
        Ok(data.unwrap_or_default())
    }

    async fn search_trips(
        &self,
        query: &TripQuery,
        cancel: &CancellationToken,
    ) -> Result<Vec<TripDto>, ApiError> {
        let params = [
            ("from_city", query.from.clone()),
            ("to_city", query.to.clone()),
            ("date_of_journey", query.date.display()),
            ("seat_class", query.seat_class.code().to_string()),
        ];
        let data = self
            .get_data::<SearchTripsData>("/v1.0/web/bookings/search-trips-v2", &params, cancel)
            .await?;
        Ok(data.map(|d| d.trains).unwrap_or_default())
    }

    async fn seat_layout(
        &self,
        trip: &TripRef,
        cancel: &CancellationToken,
    ) -> Result<Vec<RawSeat>, ApiError> {
        let params = [
            ("trip_id", trip.trip_id.clone()),
            ("trip_route_id", trip.trip_route_id.clone()),
        ];
        let data = self
            .get_data::<SeatLayoutData>("/v1.0/web/bookings/seat-layout", &params, cancel)
            .await?;

        let seats = data
            .map(|d| d.seat_layout)
            .unwrap_or_default()
            .into_iter()
            .flat_map(|floor| floor.layout.into_iter().flatten())
            .filter_map(|seat| {
                let number = seat.seat_number?;
                let number = number.trim();
                (!number.is_empty())
                    .then(|| RawSeat::new(number, seat.seat_availability, seat.ticket_type))
            })
            .collect();
        Ok(seats)
    }
}
