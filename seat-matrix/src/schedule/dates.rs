//! Calendar dates for each stop of an overnight-capable schedule.
//!
//! Schedules only carry times of day. Walking the stops in order, a time
//! that goes backwards means the train crossed midnight, unless the jump
//! is so large that it is more likely bad data.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::{ClockTime, RouteStop};

/// A backwards step in time-of-day is a midnight rollover only if the
/// wrapped-around gap is shorter than this.
pub const ROLLOVER_THRESHOLD_MINS: i64 = 12 * 60;

/// Declared halts above this many minutes are recomputed from the times.
pub const HALT_CORRECTION_LIMIT_MINS: i64 = 120;

/// Ticket query date for each station, in stop order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StationDates {
    order: Vec<(String, NaiveDate)>,
    #[serde(skip)]
    by_city: HashMap<String, NaiveDate>,
}

impl StationDates {
    pub fn get(&self, city: &str) -> Option<NaiveDate> {
        self.by_city.get(city).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, NaiveDate)> {
        self.order.iter().map(|(c, d)| (c.as_str(), *d))
    }

    /// Dates in stop order.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.order.iter().map(|(_, d)| *d).collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    fn push(&mut self, city: String, date: NaiveDate) {
        self.by_city.insert(city.clone(), date);
        self.order.push((city, date));
    }
}

/// Resolves the real calendar date of every stop.
#[derive(Debug, Clone, Copy)]
pub struct StationDateResolver {
    rollover_threshold_mins: i64,
}

impl Default for StationDateResolver {
    fn default() -> Self {
        Self::new(ROLLOVER_THRESHOLD_MINS)
    }
}

impl StationDateResolver {
    pub fn new(rollover_threshold_mins: i64) -> Self {
        Self {
            rollover_threshold_mins,
        }
    }

    /// Stamp `date` (and `display_date` where needed) on every stop and
    /// return each station's ticket query date.
    ///
    /// On a rollover the stop *before* midnight is labelled with the next
    /// day: its tickets are sold under the date the train arrives on.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use seat_matrix::domain::RouteStop;
    /// use seat_matrix::schedule::StationDateResolver;
    ///
    /// let base = NaiveDate::from_ymd_opt(2026, 10, 15).unwrap();
    /// let next = base.succ_opt().unwrap();
    /// let mut stops = vec![
    ///     RouteStop::new("Dhaka", "", "11:50 pm BST"),
    ///     RouteStop::new("Tangail", "12:10 am BST", "12:12 am BST"),
    /// ];
    /// let dates = StationDateResolver::default().resolve(&mut stops, base);
    ///
    /// assert_eq!(stops[0].date, Some(base));
    /// assert_eq!(stops[0].display_date, Some(next));
    /// assert_eq!(stops[1].date, Some(next));
    /// assert_eq!(dates.get("Dhaka"), Some(next));
    /// ```
    pub fn resolve(&self, stops: &mut [RouteStop], base_date: NaiveDate) -> StationDates {
        let mut current = base_date;
        // Index and leaving time of the last stop with a usable time.
        let mut prev: Option<(usize, ClockTime)> = None;

        for i in 0..stops.len() {
            let reached = stops[i].reached_at();

            if let (Some((prev_idx, left)), Some(reached)) = (prev, reached) {
                if self.crosses_midnight(left, reached, &stops[i].city) {
                    current = next_day(current);
                    stops[prev_idx].display_date = Some(current);
                    debug!(
                        before = %stops[prev_idx].city,
                        after = %stops[i].city,
                        date = %current,
                        "midnight rollover between stops"
                    );
                }
            }
            stops[i].date = Some(current);

            // Arriving before midnight and leaving after it: tickets from here
            // are sold for the day the train leaves.
            if let (Some(arr), Some(dep)) = (stops[i].arrival_time(), stops[i].departure_time()) {
                if self.crosses_midnight(arr, dep, &stops[i].city) {
                    current = next_day(current);
                    stops[i].display_date = Some(current);
                    debug!(city = %stops[i].city, date = %current, "midnight rollover during halt");
                }
            }

            if let Some(left) = stops[i].leaves_at() {
                prev = Some((i, left));
            }
        }

        let mut dates = StationDates::default();
        for stop in stops.iter() {
            dates.push(stop.city.clone(), stop.effective_date().unwrap_or(current));
        }
        dates
    }

    /// A step from `earlier` to `later` that goes backwards in time of day
    /// crossed midnight when the wrapped gap is under the threshold.
    fn crosses_midnight(&self, earlier: ClockTime, later: ClockTime, city: &str) -> bool {
        if later >= earlier {
            return false;
        }
        let gap = earlier.minutes_until(later);
        if gap < self.rollover_threshold_mins {
            return true;
        }
        warn!(
            city,
            previous = %earlier,
            time = %later,
            gap,
            "time goes backwards by more than the rollover threshold; keeping date"
        );
        false
    }
}

// NaiveDate::MAX is not a travel date; stay put rather than fail.
fn next_day(date: NaiveDate) -> NaiveDate {
    date.succ_opt().unwrap_or(date)
}

/// Recompute implausible halts from the stop's own arrival and departure.
///
/// The computed halt is departure minus arrival, wrapping past midnight.
/// It replaces the declared value only when that is negative or above
/// `limit_mins`. Returns the number of stops corrected.
///
/// ```
/// use seat_matrix::domain::RouteStop;
/// use seat_matrix::schedule::correct_halts;
///
/// let mut stop = RouteStop::new("Feni", "10:00", "10:05");
/// stop.halt_minutes = Some(300);
/// let mut stops = vec![stop];
/// assert_eq!(correct_halts(&mut stops, 120), 1);
/// assert_eq!(stops[0].halt_minutes, Some(5));
/// ```
pub fn correct_halts(stops: &mut [RouteStop], limit_mins: i64) -> usize {
    let mut corrected = 0;
    for stop in stops.iter_mut() {
        let Some(declared) = stop.halt_minutes else {
            continue;
        };
        if (0..=limit_mins).contains(&declared) {
            continue;
        }
        let (Some(arr), Some(dep)) = (stop.arrival_time(), stop.departure_time()) else {
            continue;
        };
        let computed = arr.minutes_until(dep);
        debug!(city = %stop.city, declared, computed, "correcting halt");
        stop.halt_minutes = Some(computed);
        corrected += 1;
    }
    corrected
}
