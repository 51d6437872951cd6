//! Train schedules: fetching, running-day validation, and per-stop dates.
//!
//! The pieces run in order before a fare matrix is built:
//!
//! 1. [`ScheduleFetcher`] retrieves the stop list
//! 2. [`validate`] checks the train runs on the requested weekday
//! 3. [`correct_halts`] repairs implausible halt durations
//! 4. [`StationDateResolver`] finds the ticket date for every stop

mod dates;
mod fetch;
mod validate;

pub use dates::{
    HALT_CORRECTION_LIMIT_MINS, ROLLOVER_THRESHOLD_MINS, StationDateResolver, StationDates,
    correct_halts,
};
pub use fetch::{ScheduleFetcher, into_schedule};
pub use validate::{validate, validate_display};
