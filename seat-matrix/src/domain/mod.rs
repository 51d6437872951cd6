//! Domain types for the seat matrix engine.
//!
//! This module contains the core domain model types that represent
//! validated railway data. Types enforce their invariants at construction
//! time, so code that receives them can trust their validity.

mod error;
mod fare;
mod route;
mod schedule;
mod seat;
mod seat_class;
mod time;

pub use error::DomainError;
pub use fare::{ClassGrid, FareCell, FareMatrix};
pub use route::{ComposedRoute, RouteKind, RouteSegment};
pub use schedule::{InvalidTrainModel, RouteStop, StationIndex, TrainModel, TrainSchedule};
pub use seat::{RawSeat, coach_of, seat_number_of};
pub use seat_class::{InvalidSeatClass, SeatClass};
pub use time::{
    ClockTime, MINUTES_PER_DAY, TimeError, TravelDate, format_display, parse_weekday, weekday_name,
};
