//! Fetching a train's stop schedule.

use std::collections::HashSet;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::domain::{RouteStop, TrainModel, TrainSchedule, TravelDate, parse_weekday};
use crate::error::CoreError;
use crate::shohoz::{SeatService, TrainRoutesData};

/// Retrieves and validates train schedules.
pub struct ScheduleFetcher<'a, S> {
    service: &'a S,
}

impl<'a, S: SeatService> ScheduleFetcher<'a, S> {
    pub fn new(service: &'a S) -> Self {
        Self { service }
    }

    /// Fetch the schedule of `model` for a journey on `date`.
    ///
    /// Server errors are retried by the client; everything else is returned
    /// as is. A response without a name or without stops is `NoDataFound`.
    pub async fn fetch(
        &self,
        model: &TrainModel,
        date: TravelDate,
        cancel: &CancellationToken,
    ) -> Result<TrainSchedule, CoreError> {
        let data = self.service.train_schedule(model, date, cancel).await?;
        let schedule = into_schedule(model, data)?;
        debug!(
            train = %schedule.name,
            stops = schedule.stops.len(),
            days = schedule.running_days.len(),
            "fetched schedule"
        );
        Ok(schedule)
    }
}

/// Convert a schedule response into a [`TrainSchedule`].
pub fn into_schedule(model: &TrainModel, data: TrainRoutesData) -> Result<TrainSchedule, CoreError> {
    let not_found = || CoreError::NoDataFound(format!("no schedule found for train {model}"));

    let name = data
        .train_name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .ok_or_else(not_found)?;

    let routes = data.routes.filter(|r| !r.is_empty()).ok_or_else(not_found)?;

    let mut seen = HashSet::new();
    let mut stops = Vec::with_capacity(routes.len());
    for dto in routes {
        let city = dto.city.trim().to_string();
        if city.is_empty() {
            warn!(train = %name, "skipping stop without a station name");
            continue;
        }
        if !seen.insert(city.clone()) {
            return Err(CoreError::UnexpectedResponse(format!(
                "station {city} appears twice in the schedule of {name}"
            )));
        }
        let mut stop = RouteStop::new(
            city,
            dto.arrival_time.unwrap_or_default(),
            dto.departure_time.unwrap_or_default(),
        );
        stop.halt_minutes = dto.halt;
        stops.push(stop);
    }
    if stops.is_empty() {
        return Err(not_found());
    }

    let running_days = data
        .days
        .iter()
        .filter_map(|d| {
            let day = parse_weekday(d);
            if day.is_none() {
                warn!(train = %name, day = %d, "ignoring unrecognised running day");
            }
            day
        })
        .collect();

    Ok(TrainSchedule {
        model: model.clone(),
        name,
        stops,
        running_days,
        total_duration: data.total_duration,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shohoz::mock::{MockFailure, MockService, routes_data};
    use chrono::Weekday;

    fn model() -> TrainModel {
        TrainModel::parse("701").unwrap()
    }

    fn date() -> TravelDate {
        TravelDate::parse("2026-10-15").unwrap()
    }

    #[tokio::test]
    async fn fetch_converts_response() {
        let service = MockService::new().with_schedule(routes_data(
            "SUBORNA EXPRESS (701)",
            &["Sat", "Sun", "Tue", "Wed", "Thu", "Fri"],
            &[
                ("Chattogram", "", "07:00 am"),
                ("Dhaka Airport", "11:50 am", "11:55 am"),
                ("Dhaka", "12:30 pm", ""),
            ],
        ));
        let schedule = ScheduleFetcher::new(&service)
            .fetch(&model(), date(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(schedule.name, "SUBORNA EXPRESS (701)");
        assert_eq!(schedule.stations(), vec!["Chattogram", "Dhaka Airport", "Dhaka"]);
        assert_eq!(schedule.running_days.len(), 6);
        assert!(!schedule.runs_on(Weekday::Mon));
        assert!(schedule.runs_on(Weekday::Thu));
    }

    #[tokio::test]
    async fn missing_name_or_stops_is_no_data() {
        let mut data = routes_data("X (701)", &[], &[("A", "", "07:00")]);
        data.train_name = None;
        let service = MockService::new().with_schedule(data);
        let err = ScheduleFetcher::new(&service)
            .fetch(&model(), date(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NoDataFound(_)));

        let service = MockService::new().with_schedule(routes_data("X (701)", &[], &[]));
        let err = ScheduleFetcher::new(&service)
            .fetch(&model(), date(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NoDataFound(_)));
    }

    #[tokio::test]
    async fn errors_map_to_core_taxonomy() {
        for (failure, check) in [
            (MockFailure::Token, CoreError::AuthTokenExpired),
            (MockFailure::DeviceKey, CoreError::DeviceKeyExpired),
            (MockFailure::RateLimited, CoreError::RateLimited),
            (MockFailure::Server, CoreError::ServerUnavailable { status: 503 }),
            (MockFailure::Missing, CoreError::CredentialsMissing),
        ] {
            let service = MockService::new().with_schedule_failure(failure);
            let err = ScheduleFetcher::new(&service)
                .fetch(&model(), date(), &CancellationToken::new())
                .await
                .unwrap_err();
            assert_eq!(err, check);
        }
    }

    #[test]
    fn duplicate_station_rejected() {
        let data = routes_data("X (701)", &[], &[("A", "", "07:00"), ("A", "08:00", "")]);
        assert!(matches!(
            into_schedule(&model(), data),
            Err(CoreError::UnexpectedResponse(_))
        ));
    }

    #[test]
    fn halts_and_bad_days_carried_over() {
        let mut data = routes_data("X (701)", &["Fri", "Funday"], &[("A", "", "07:00")]);
        if let Some(routes) = data.routes.as_mut() {
            routes[0].halt = Some(300);
        }
        let schedule = into_schedule(&model(), data).unwrap();
        assert_eq!(schedule.stops[0].halt_minutes, Some(300));
        assert_eq!(schedule.running_days, vec![Weekday::Fri]);
    }
}
