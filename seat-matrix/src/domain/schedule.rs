//! Train schedules: the ordered list of stops a train makes.

use std::fmt;

use chrono::{NaiveDate, Weekday};
use serde::Serialize;

use super::time::ClockTime;

/// Error returned when parsing an invalid train model.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid train model: {0}")]
pub struct InvalidTrainModel(String);

/// The numeric model of a train, e.g. `701` for "SUBORNA EXPRESS (701)".
///
/// # Examples
///
/// ```
/// use seat_matrix::domain::TrainModel;
///
/// assert_eq!(TrainModel::parse("701").unwrap().as_str(), "701");
/// assert_eq!(TrainModel::parse("SUBORNA EXPRESS (701)").unwrap().as_str(), "701");
/// assert!(TrainModel::parse("SUBORNA EXPRESS").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TrainModel(String);

impl TrainModel {
    /// Accepts a bare model number or a display name ending in `(model)`.
    pub fn parse(s: &str) -> Result<Self, InvalidTrainModel> {
        let s = s.trim();
        let candidate = match (s.rfind('('), s.rfind(')')) {
            (Some(open), Some(close)) if open < close => &s[open + 1..close],
            _ => s,
        };
        let candidate = candidate.trim();
        if candidate.is_empty() || !candidate.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InvalidTrainModel(s.to_string()));
        }
        Ok(Self(candidate.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether a trip number such as `"SUBORNA EXPRESS (701)"` is this train.
    pub fn matches_trip_number(&self, trip_number: &str) -> bool {
        trip_number.contains(&format!("({})", self.0))
    }
}

impl fmt::Display for TrainModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Index of a stop within a schedule. Station pairs are only meaningful
/// when the origin index is lower than the destination index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct StationIndex(pub usize);

impl fmt::Display for StationIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stop on a train's route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteStop {
    /// Station name, unique within a schedule.
    pub city: String,
    /// Raw arrival time as supplied (`"10:00 am BST"`, `"---"`).
    pub arrival: String,
    /// Raw departure time as supplied.
    pub departure: String,
    /// Halt at this stop in minutes, if known.
    pub halt_minutes: Option<i64>,
    /// Calendar date the train is at this stop. Set by date resolution.
    pub date: Option<NaiveDate>,
    /// Date to show and to query tickets with, when it differs from `date`.
    /// Only set on the stop just before a midnight rollover.
    pub display_date: Option<NaiveDate>,
}

impl RouteStop {
    pub fn new(city: impl Into<String>, arrival: impl Into<String>, departure: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            arrival: arrival.into(),
            departure: departure.into(),
            halt_minutes: None,
            date: None,
            display_date: None,
        }
    }

    pub fn arrival_time(&self) -> Option<ClockTime> {
        ClockTime::parse_opt(&self.arrival)
    }

    pub fn departure_time(&self) -> Option<ClockTime> {
        ClockTime::parse_opt(&self.departure)
    }

    /// When the train reaches this stop: arrival, or departure at the origin.
    pub fn reached_at(&self) -> Option<ClockTime> {
        self.arrival_time().or_else(|| self.departure_time())
    }

    /// When the train leaves this stop: departure, or arrival at a terminus.
    pub fn leaves_at(&self) -> Option<ClockTime> {
        self.departure_time().or_else(|| self.arrival_time())
    }

    /// The date used for ticket queries from this stop.
    pub fn effective_date(&self) -> Option<NaiveDate> {
        self.display_date.or(self.date)
    }
}

/// A train's schedule for one day of travel.
#[derive(Debug, Clone, Serialize)]
pub struct TrainSchedule {
    pub model: TrainModel,
    /// Display name, e.g. `"SUBORNA EXPRESS (701)"`.
    pub name: String,
    pub stops: Vec<RouteStop>,
    /// Days the train runs. Empty means every day.
    #[serde(serialize_with = "serialize_weekdays")]
    pub running_days: Vec<Weekday>,
    pub total_duration: Option<String>,
}

impl TrainSchedule {
    /// Station names in stop order.
    pub fn stations(&self) -> Vec<String> {
        self.stops.iter().map(|s| s.city.clone()).collect()
    }

    pub fn runs_on(&self, day: Weekday) -> bool {
        self.running_days.is_empty() || self.running_days.contains(&day)
    }
}

fn serialize_weekdays<S: serde::Serializer>(days: &[Weekday], s: S) -> Result<S::Ok, S::Error> {
    use serde::ser::SerializeSeq;
    let mut seq = s.serialize_seq(Some(days.len()))?;
    for day in days {
        seq.serialize_element(&day.to_string())?;
    }
    seq.end()
}
