//! Per-train, per-class seat availability for one origin/destination.

use std::collections::BTreeMap;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::config::EngineConfig;
use crate::domain::{SeatClass, TravelDate};
use crate::error::CoreError;
use crate::pool::{ConcurrencyPool, Outcome, Progress};
use crate::shohoz::{ApiError, SeatService, TripDto, TripQuery, TripRef};

use super::layout::{SeatLayoutResult, aggregate};
use super::restriction::{Restriction, diagnose};

/// One class on one train, with its categorised seats when they could be
/// fetched.
#[derive(Debug, Clone, Serialize)]
pub struct ClassAvailability {
    pub seat_class: SeatClass,
    pub fare: u32,
    pub vat: u32,
    pub online: u32,
    pub offline: u32,
    pub layout: Option<SeatLayoutResult>,
    /// Why `layout` is missing.
    pub error: Option<String>,
}

/// A train on the searched route.
#[derive(Debug, Clone, Serialize)]
pub struct TrainAvailability {
    pub trip_number: String,
    pub departure: Option<String>,
    pub arrival: Option<String>,
    pub travel_time: Option<String>,
    /// In the order the service lists them.
    pub classes: Vec<ClassAvailability>,
}

/// Fetches and categorises the seat layout of every class on every train
/// between two stations.
pub struct AvailabilityOrchestrator<'a, S> {
    service: &'a S,
    config: &'a EngineConfig,
}

impl<'a, S: SeatService> AvailabilityOrchestrator<'a, S> {
    pub fn new(service: &'a S, config: &'a EngineConfig) -> Self {
        Self { service, config }
    }

    /// Availability keyed by trip number.
    ///
    /// When every layout call is refused by a booking rule the whole check
    /// fails with a single [`CoreError::BookingRestricted`] message rather
    /// than an all-empty result.
    pub async fn check(
        &self,
        origin: &str,
        destination: &str,
        date: TravelDate,
        seat_class: SeatClass,
        cancel: &CancellationToken,
        mut on_progress: impl FnMut(Progress),
    ) -> Result<BTreeMap<String, TrainAvailability>, CoreError> {
        self.service.check_credentials()?;

        let query = TripQuery {
            from: origin.to_string(),
            to: destination.to_string(),
            date,
            seat_class,
        };
        let trips = self.service.search_trips(&query, cancel).await?;
        if trips.is_empty() {
            return Err(CoreError::NoDataFound(format!(
                "no trains from {origin} to {destination} on {date}"
            )));
        }

        let slots = layout_slots(&trips);
        info!(
            origin,
            destination,
            %date,
            trains = trips.len(),
            layouts = slots.len(),
            "checking availability"
        );

        let service = self.service;
        let units: Vec<_> = slots
            .iter()
            .map(|slot| {
                move |token: CancellationToken| async move {
                    let seats = service.seat_layout(&slot.trip, &token).await?;
                    Ok::<_, ApiError>(aggregate(&seats))
                }
            })
            .collect();

        let outcomes = ConcurrencyPool::new(self.config.max_concurrent)
            .run_until(
                units,
                cancel,
                |progress| {
                    trace!(done = progress.done, total = progress.total, "availability progress");
                    on_progress(progress);
                },
                ApiError::is_auth,
            )
            .await;

        if cancel.is_cancelled() {
            debug!(origin, destination, "availability check canceled");
            return Err(CoreError::Canceled);
        }

        let mut layouts = Vec::with_capacity(outcomes.len());
        let mut restrictions = Vec::new();
        for (slot, outcome) in slots.iter().zip(outcomes) {
            let entry = match outcome {
                Outcome::Done(layout) => Ok(layout),
                Outcome::Failed(err) if err.is_auth() => return Err(err.into()),
                Outcome::Failed(err) => match Restriction::from_error(&err) {
                    Some(restriction) => {
                        let message = restriction.user_message();
                        restrictions.push(restriction);
                        Err(message)
                    }
                    None => {
                        warn!(
                            trip = %slot.trip_number,
                            class = %slot.seat_class,
                            error = %err,
                            "seat layout failed"
                        );
                        Err(CoreError::from(err).to_string())
                    }
                },
                Outcome::Skipped => Err(CoreError::Canceled.to_string()),
            };
            layouts.push(entry);
        }

        if !slots.is_empty() && restrictions.len() == slots.len() {
            let message = diagnose(&restrictions);
            info!(origin, destination, %message, "every seat layout is restricted");
            return Err(CoreError::BookingRestricted(message));
        }

        let mut result: BTreeMap<String, TrainAvailability> = trips
            .iter()
            .map(|t| {
                (
                    t.trip_number.clone(),
                    TrainAvailability {
                        trip_number: t.trip_number.clone(),
                        departure: t.departure_date_time.clone(),
                        arrival: t.arrival_date_time.clone(),
                        travel_time: t.travel_time.clone(),
                        classes: Vec::new(),
                    },
                )
            })
            .collect();

        for (slot, layout) in slots.into_iter().zip(layouts) {
            let (layout, error) = match layout {
                Ok(l) => (Some(l), None),
                Err(e) => (None, Some(e)),
            };
            if let Some(train) = result.get_mut(&slot.trip_number) {
                train.classes.push(ClassAvailability {
                    seat_class: slot.seat_class,
                    fare: slot.fare,
                    vat: slot.vat,
                    online: slot.online,
                    offline: slot.offline,
                    layout,
                    error,
                });
            }
        }

        Ok(result)
    }
}

/// One seat-layout call: a class on a train.
struct LayoutSlot {
    trip_number: String,
    seat_class: SeatClass,
    trip: TripRef,
    fare: u32,
    vat: u32,
    online: u32,
    offline: u32,
}

fn layout_slots(trips: &[TripDto]) -> Vec<LayoutSlot> {
    trips
        .iter()
        .flat_map(|t| {
            t.seat_types.iter().filter_map(move |st| {
                let Ok(seat_class) = SeatClass::parse(&st.seat_type) else {
                    trace!(code = %st.seat_type, trip = %t.trip_number, "skipping unknown seat class");
                    return None;
                };
                Some(LayoutSlot {
                    trip_number: t.trip_number.clone(),
                    seat_class,
                    trip: TripRef {
                        trip_id: st.trip_id.clone(),
                        trip_route_id: st.trip_route_id.clone(),
                    },
                    fare: st.fare,
                    vat: st.vat_amount,
                    online: st.seat_counts.online,
                    offline: st.seat_counts.offline,
                })
            })
        })
        .collect()
}
