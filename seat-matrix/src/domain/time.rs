//! Clock times and travel dates as the remote service writes them.
//!
//! Schedule times arrive as free-form strings such as `"10:05 pm BST"`,
//! `"22:05"` or `"---"` for a stop without that time. Travel dates are
//! exchanged in two shapes: ISO (`2026-10-15`) for schedule lookups and a
//! display form (`15-Oct-2026`) for seat searches.

use std::fmt;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Minutes in a day.
pub const MINUTES_PER_DAY: i64 = 24 * 60;

/// Error returned when parsing an invalid time or date string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// A time of day with minute resolution.
///
/// # Examples
///
/// ```
/// use seat_matrix::domain::ClockTime;
///
/// assert_eq!(ClockTime::parse("22:05").unwrap().minutes(), 22 * 60 + 5);
/// assert_eq!(ClockTime::parse("10:05 pm BST").unwrap().to_string(), "22:05");
/// assert_eq!(ClockTime::parse("12:10 am").unwrap().to_string(), "00:10");
/// assert!(ClockTime::parse("---").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClockTime(u16);

impl ClockTime {
    /// Create from hours and minutes.
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        if hour > 23 || minute > 59 {
            return None;
        }
        Some(Self((hour * 60 + minute) as u16))
    }

    /// Parse `HH:MM`, `H:MM`, or a 12-hour form with an `am`/`pm` marker.
    /// A trailing time-zone token (`BST`) is ignored.
    pub fn parse(s: &str) -> Result<Self, TimeError> {
        let mut parts = s.split_whitespace();
        let clock = parts.next().ok_or_else(|| TimeError::new("empty time"))?;
        let meridiem = parts.next().map(|m| m.to_ascii_lowercase());

        let (h, m) = clock
            .split_once(':')
            .ok_or_else(|| TimeError::new("expected HH:MM"))?;
        let hour = parse_digits(h).ok_or_else(|| TimeError::new("invalid hour digits"))?;
        let minute = parse_digits(m).ok_or_else(|| TimeError::new("invalid minute digits"))?;
        if m.len() != 2 {
            return Err(TimeError::new("minutes must have two digits"));
        }

        let hour = match meridiem.as_deref() {
            Some("am") | Some("a.m.") => match hour {
                12 => 0,
                1..=11 => hour,
                _ => return Err(TimeError::new("12-hour clock hour must be 1-12")),
            },
            Some("pm") | Some("p.m.") => match hour {
                12 => 12,
                1..=11 => hour + 12,
                _ => return Err(TimeError::new("12-hour clock hour must be 1-12")),
            },
            // No marker, or only a zone token: read as 24-hour.
            _ => hour,
        };

        Self::from_hm(hour, minute).ok_or_else(|| TimeError::new("time out of range"))
    }

    /// Parse a possibly missing time; placeholders like `---` give `None`.
    pub fn parse_opt(s: &str) -> Option<Self> {
        Self::parse(s).ok()
    }

    /// Minutes since midnight.
    pub fn minutes(self) -> i64 {
        i64::from(self.0)
    }

    /// Minutes from `self` forward to `later`, wrapping past midnight.
    ///
    /// ```
    /// use seat_matrix::domain::ClockTime;
    ///
    /// let a = ClockTime::parse("23:50").unwrap();
    /// let b = ClockTime::parse("00:10").unwrap();
    /// assert_eq!(a.minutes_until(b), 20);
    /// assert_eq!(b.minutes_until(a), 23 * 60 + 40);
    /// ```
    pub fn minutes_until(self, later: ClockTime) -> i64 {
        (later.minutes() - self.minutes()).rem_euclid(MINUTES_PER_DAY)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

fn parse_digits(s: &str) -> Option<u32> {
    if s.is_empty() || s.len() > 2 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Format of display dates, e.g. `15-Oct-2026`.
const DISPLAY_FORMAT: &str = "%d-%b-%Y";

/// Format of ISO dates, e.g. `2026-10-15`.
const ISO_FORMAT: &str = "%Y-%m-%d";

/// A calendar date of travel.
///
/// # Examples
///
/// ```
/// use seat_matrix::domain::TravelDate;
///
/// let d = TravelDate::parse("15-Oct-2026").unwrap();
/// assert_eq!(d.iso(), "2026-10-15");
/// assert_eq!(TravelDate::parse("2026-10-15").unwrap(), d);
/// assert_eq!(d.display(), "15-Oct-2026");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TravelDate(NaiveDate);

impl TravelDate {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Parse either the display form or the ISO form.
    pub fn parse(s: &str) -> Result<Self, TimeError> {
        let s = s.trim();
        NaiveDate::parse_from_str(s, DISPLAY_FORMAT)
            .or_else(|_| NaiveDate::parse_from_str(s, ISO_FORMAT))
            .map(Self)
            .map_err(|_| TimeError::new("expected DD-Mon-YYYY or YYYY-MM-DD"))
    }

    pub fn date(self) -> NaiveDate {
        self.0
    }

    /// `2026-10-15`
    pub fn iso(self) -> String {
        self.0.format(ISO_FORMAT).to_string()
    }

    /// `15-Oct-2026`
    pub fn display(self) -> String {
        format_display(self.0)
    }

    pub fn weekday(self) -> Weekday {
        self.0.weekday()
    }
}

impl From<NaiveDate> for TravelDate {
    fn from(value: NaiveDate) -> Self {
        Self(value)
    }
}

impl fmt::Display for TravelDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// Format a date the way the seat search endpoint expects it.
pub fn format_display(date: NaiveDate) -> String {
    date.format(DISPLAY_FORMAT).to_string()
}

/// Parse a three-letter weekday abbreviation (`Sun`, `mon`, ...).
pub fn parse_weekday(s: &str) -> Option<Weekday> {
    s.trim().parse().ok()
}

/// Full English weekday name.
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
