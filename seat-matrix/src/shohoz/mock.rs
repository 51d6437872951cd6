//! In-memory [`SeatService`] for tests.
//!
//! Serves canned schedules, trip searches and seat layouts, and records
//! every call so tests can assert on what was asked for.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::credentials::CredentialError;
use crate::domain::{RawSeat, SeatClass, TrainModel, TravelDate};

use super::error::{ApiError, AuthFailure};
use super::types::{RouteStopDto, SeatCountsDto, SeatTypeDto, TrainRoutesData, TripDto};
use super::{SeatService, TripQuery, TripRef};

/// A canned failure. `ApiError` is not `Clone`, so tests describe failures
/// with this and the mock builds a fresh error per call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum MockFailure {
    Missing,
    Token,
    DeviceKey,
    Server,
    RateLimited,
    NotFound,
    Rejected(String),
}

impl MockFailure {
    fn to_error(&self) -> ApiError {
        match self {
            MockFailure::Missing => ApiError::Credentials(CredentialError::Missing),
            MockFailure::Token => ApiError::Unauthorized(AuthFailure::Token),
            MockFailure::DeviceKey => ApiError::Unauthorized(AuthFailure::DeviceKey),
            MockFailure::Server => ApiError::ServerUnavailable { status: 503 },
            MockFailure::RateLimited => ApiError::RateLimited,
            MockFailure::NotFound => ApiError::NotFound,
            MockFailure::Rejected(message) => ApiError::Rejected {
                status: 422,
                message: message.clone(),
            },
        }
    }
}

pub(crate) struct MockService {
    has_credentials: bool,
    schedule: Result<TrainRoutesData, MockFailure>,
    trips: HashMap<(String, String), Result<Vec<TripDto>, MockFailure>>,
    layouts: HashMap<String, Result<Vec<RawSeat>, MockFailure>>,
    latency: Option<Duration>,
    searches: Mutex<Vec<TripQuery>>,
    layout_calls: Mutex<Vec<TripRef>>,
}

impl MockService {
    pub(crate) fn new() -> Self {
        Self {
            has_credentials: true,
            schedule: Ok(TrainRoutesData::default()),
            trips: HashMap::new(),
            layouts: HashMap::new(),
            latency: None,
            searches: Mutex::new(Vec::new()),
            layout_calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn without_credentials(mut self) -> Self {
        self.has_credentials = false;
        self
    }

    pub(crate) fn with_schedule(mut self, data: TrainRoutesData) -> Self {
        self.schedule = Ok(data);
        self
    }

    pub(crate) fn with_schedule_failure(mut self, failure: MockFailure) -> Self {
        self.schedule = Err(failure);
        self
    }

    pub(crate) fn with_trips(mut self, from: &str, to: &str, trips: Vec<TripDto>) -> Self {
        self.trips.insert((from.to_string(), to.to_string()), Ok(trips));
        self
    }

    pub(crate) fn with_trip_failure(mut self, from: &str, to: &str, failure: MockFailure) -> Self {
        self.trips.insert((from.to_string(), to.to_string()), Err(failure));
        self
    }

    pub(crate) fn with_layout(mut self, trip_id: &str, seats: Vec<RawSeat>) -> Self {
        self.layouts.insert(trip_id.to_string(), Ok(seats));
        self
    }

    pub(crate) fn with_layout_failure(mut self, trip_id: &str, failure: MockFailure) -> Self {
        self.layouts.insert(trip_id.to_string(), Err(failure));
        self
    }

    /// Every call waits this long, or until its token is cancelled.
    pub(crate) fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub(crate) fn searches(&self) -> Vec<TripQuery> {
        self.searches.lock().unwrap().clone()
    }

    pub(crate) fn layout_calls(&self) -> Vec<TripRef> {
        self.layout_calls.lock().unwrap().clone()
    }

    async fn wait(&self, cancel: &CancellationToken) -> Result<(), ApiError> {
        if cancel.is_cancelled() {
            return Err(ApiError::Canceled);
        }
        if let Some(latency) = self.latency {
            cancel
                .run_until_cancelled(tokio::time::sleep(latency))
                .await
                .ok_or(ApiError::Canceled)?;
        } else {
            tokio::task::yield_now().await;
        }
        Ok(())
    }
}

impl SeatService for MockService {
    fn check_credentials(&self) -> Result<(), ApiError> {
        if self.has_credentials {
            Ok(())
        } else {
            Err(MockFailure::Missing.to_error())
        }
    }

    async fn train_schedule(
        &self,
        _model: &TrainModel,
        _date: TravelDate,
        cancel: &CancellationToken,
    ) -> Result<TrainRoutesData, ApiError> {
        self.wait(cancel).await?;
        self.schedule.clone().map_err(|f| f.to_error())
    }

    async fn search_trips(
        &self,
        query: &TripQuery,
        cancel: &CancellationToken,
    ) -> Result<Vec<TripDto>, ApiError> {
        self.searches.lock().unwrap().push(query.clone());
        self.wait(cancel).await?;
        match self.trips.get(&(query.from.clone(), query.to.clone())) {
            Some(result) => result.clone().map_err(|f| f.to_error()),
            None => Ok(Vec::new()),
        }
    }

    async fn seat_layout(
        &self,
        trip: &TripRef,
        cancel: &CancellationToken,
    ) -> Result<Vec<RawSeat>, ApiError> {
        self.layout_calls.lock().unwrap().push(trip.clone());
        self.wait(cancel).await?;
        match self.layouts.get(&trip.trip_id) {
            Some(result) => result.clone().map_err(|f| f.to_error()),
            None => Err(ApiError::NotFound),
        }
    }
}

/// `(city, arrival, departure)` stops into a schedule response.
pub(crate) fn routes_data(name: &str, days: &[&str], stops: &[(&str, &str, &str)]) -> TrainRoutesData {
    TrainRoutesData {
        train_name: Some(name.to_string()),
        days: days.iter().map(|d| d.to_string()).collect(),
        total_duration: Some("05:30 h".to_string()),
        routes: Some(
            stops
                .iter()
                .map(|(city, arr, dep)| RouteStopDto {
                    city: city.to_string(),
                    arrival_time: Some(arr.to_string()),
                    departure_time: Some(dep.to_string()),
                    halt: None,
                })
                .collect(),
        ),
    }
}

/// One class on a trip: `(class, online, offline, fare, vat, trip_id)`.
pub(crate) type SeatTypeRow<'a> = (SeatClass, u32, u32, u32, u32, &'a str);

pub(crate) fn trip(number: &str, seat_types: &[SeatTypeRow<'_>]) -> TripDto {
    TripDto {
        trip_number: number.to_string(),
        departure_date_time: Some("15 Oct, 07:00 am".to_string()),
        arrival_date_time: Some("15 Oct, 12:30 pm".to_string()),
        travel_time: Some("05h 30m".to_string()),
        origin_city_name: None,
        destination_city_name: None,
        seat_types: seat_types
            .iter()
            .map(|(class, online, offline, fare, vat, trip_id)| SeatTypeDto {
                seat_type: class.code().to_string(),
                trip_id: trip_id.to_string(),
                trip_route_id: format!("{trip_id}-route"),
                fare: *fare,
                vat_amount: *vat,
                seat_counts: SeatCountsDto {
                    online: *online,
                    offline: *offline,
                },
            })
            .collect(),
    }
}
