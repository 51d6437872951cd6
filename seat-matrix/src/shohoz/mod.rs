//! Railway booking API client.
//!
//! This module provides an HTTP client for the Shohoz railway booking API,
//! which serves Bangladesh Railway schedules, fares and seat layouts.
//!
//! Key characteristics of the API:
//! - Every call needs a bearer token and a device key
//! - Schedule lookups take ISO dates; seat searches take `DD-Mon-YYYY`
//! - A seat search returns every class on every matching train at once
//! - Seat layouts are refused with a 422 while a booking rule applies
//!   (window not open, purchase in progress, order limit reached)

mod client;
mod error;
#[cfg(test)]
pub(crate) mod mock;
mod types;

use tokio_util::sync::CancellationToken;

use crate::domain::{RawSeat, SeatClass, TrainModel, TravelDate};

pub use client::{DEFAULT_BASE_URL, ShohozClient, ShohozConfig};
pub use error::{ApiError, AuthFailure};
pub use types::{
    Envelope, FloorDto, RouteStopDto, SearchTripsData, SeatCountsDto, SeatDto, SeatLayoutData,
    SeatTypeDto, TrainRoutesData, TripDto, extract_message,
};

/// A seat search between two stations on one date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripQuery {
    pub from: String,
    pub to: String,
    pub date: TravelDate,
    /// Required by the endpoint; the response still covers every class.
    pub seat_class: SeatClass,
}

/// Identifies one class on one trip, for seat layout lookups.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TripRef {
    pub trip_id: String,
    pub trip_route_id: String,
}

/// The remote calls the core depends on.
///
/// This abstraction allows the engines to be tested with mock data. Every
/// call takes a cancel token so an in-flight request can be abandoned.
#[allow(async_fn_in_trait)]
pub trait SeatService {
    /// Fail fast if no usable credentials are available.
    fn check_credentials(&self) -> Result<(), ApiError>;

    /// Stop list and running days for a train.
    async fn train_schedule(
        &self,
        model: &TrainModel,
        date: TravelDate,
        cancel: &CancellationToken,
    ) -> Result<TrainRoutesData, ApiError>;

    /// Trains between two stations, with per-class fares and seat counts.
    async fn search_trips(
        &self,
        query: &TripQuery,
        cancel: &CancellationToken,
    ) -> Result<Vec<TripDto>, ApiError>;

    /// Every seat on one class of one trip.
    async fn seat_layout(
        &self,
        trip: &TripRef,
        cancel: &CancellationToken,
    ) -> Result<Vec<RawSeat>, ApiError>;
}
