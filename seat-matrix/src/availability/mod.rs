//! Point-to-point seat availability.
//!
//! [`AvailabilityOrchestrator`] lists the trains on a route and fetches the
//! seat layout of each of their classes; [`aggregate`] turns each layout
//! into sorted, coach-grouped seat lists.

mod layout;
mod orchestrator;
mod restriction;

pub use layout::{
    AVAILABILITY_FREE, AVAILABILITY_IN_PROGRESS, COACH_ORDER, CoachSeats, SeatGroup,
    SeatLayoutResult, TICKET_BLOCKED, TICKET_COUNTER_ISSUED, TICKET_ONLINE_ISSUED,
    TICKET_RESERVED, aggregate, compare_seats,
};
pub use orchestrator::{AvailabilityOrchestrator, ClassAvailability, TrainAvailability};
pub use restriction::{Restriction, RestrictionKind, classify, diagnose, generic_message};
