//! The fare matrix pipeline and route queries over its result.
//!
//! [`compute_matrix`] is the entry point: it fetches the schedule, checks
//! the running day, resolves stop dates, and fills the matrix. The
//! [`RouteComposer`] then answers origin/destination queries against the
//! finished [`MatrixResult`] without touching the network.

mod builder;
mod compose;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::EngineConfig;
use crate::domain::{FareMatrix, SeatClass, TrainModel, TrainSchedule, TravelDate};
use crate::error::CoreError;
use crate::pool::Progress;
use crate::schedule::{
    ScheduleFetcher, StationDateResolver, StationDates, correct_halts, validate_display,
};
use crate::shohoz::SeatService;

pub use builder::{FareMatrixBuilder, cells_for_train};
pub use compose::{RouteComposer, RouteSearch};

/// Everything the caller needs to show a train's seat matrix.
#[derive(Debug, Clone)]
pub struct MatrixResult {
    /// Schedule with halts corrected and dates resolved.
    pub schedule: TrainSchedule,
    pub matrix: FareMatrix,
    /// Station names in stop order.
    pub stations: Vec<String>,
    /// Ticket query date per station.
    pub station_dates: StationDates,
    /// Classes with seats somewhere on the train.
    pub available_classes: Vec<SeatClass>,
    pub travel_date: TravelDate,
}

/// Lightweight description of a [`MatrixResult`], without the cells.
#[derive(Debug, Clone, Serialize)]
pub struct MatrixSummary {
    pub train: String,
    pub model: TrainModel,
    pub travel_date: TravelDate,
    pub stations: Vec<String>,
    pub station_dates: StationDates,
    pub available_classes: Vec<SeatClass>,
    pub total_duration: Option<String>,
}

impl MatrixResult {
    pub fn summary(&self) -> MatrixSummary {
        MatrixSummary {
            train: self.schedule.name.clone(),
            model: self.schedule.model.clone(),
            travel_date: self.travel_date,
            stations: self.stations.clone(),
            station_dates: self.station_dates.clone(),
            available_classes: self.available_classes.clone(),
            total_duration: self.schedule.total_duration.clone(),
        }
    }
}

/// Build the fare matrix for `model` on a date given in both text forms.
///
/// `display_date` (`15-Oct-2026`) is checked against the running days and
/// `iso_date` (`2026-10-15`) is sent with the schedule lookup. They must
/// name the same day. `on_progress` reports the matrix phase.
pub async fn compute_matrix<S: SeatService>(
    service: &S,
    config: &EngineConfig,
    model: &TrainModel,
    display_date: &str,
    iso_date: &str,
    on_progress: impl FnMut(Progress),
    cancel: &CancellationToken,
) -> Result<MatrixResult, CoreError> {
    let travel_date = TravelDate::parse(iso_date)
        .map_err(|e| CoreError::InvalidInput(format!("travel date {iso_date:?}: {e}")))?;

    let mut schedule = ScheduleFetcher::new(service)
        .fetch(model, travel_date, cancel)
        .await?;

    let display = validate_display(&schedule, display_date)?;
    if display != travel_date {
        return Err(CoreError::InvalidInput(format!(
            "{display_date} and {iso_date} are different days"
        )));
    }

    let corrected = correct_halts(&mut schedule.stops, config.halt_limit_mins);
    let station_dates = StationDateResolver::new(config.rollover_threshold_mins)
        .resolve(&mut schedule.stops, travel_date.date());

    if cancel.is_cancelled() {
        return Err(CoreError::Canceled);
    }

    let matrix = FareMatrixBuilder::new(service, config)
        .build(model, &station_dates, cancel, on_progress)
        .await?;

    info!(
        train = %schedule.name,
        date = %travel_date,
        stations = matrix.station_count(),
        halts_corrected = corrected,
        "matrix ready"
    );

    Ok(MatrixResult {
        stations: matrix.stations().to_vec(),
        available_classes: matrix.available_classes(),
        schedule,
        matrix,
        station_dates,
        travel_date,
    })
}
