//! Categorising a raw seat layout into sorted, coach-grouped seat lists.

use std::cmp::Ordering;

use serde::Serialize;

use crate::domain::{RawSeat, coach_of, seat_number_of};

/// Seat can be bought.
pub const AVAILABILITY_FREE: u8 = 1;
/// Seat is held by someone's purchase in progress.
pub const AVAILABILITY_IN_PROGRESS: u8 = 2;

pub const TICKET_ONLINE_ISSUED: u8 = 1;
pub const TICKET_RESERVED: u8 = 2;
pub const TICKET_COUNTER_ISSUED: u8 = 3;
pub const TICKET_BLOCKED: u8 = 4;

/// Ticket types that count as "booking in progress" on a held seat.
const IN_PROGRESS_TICKET_TYPES: [u8; 3] = [TICKET_ONLINE_ISSUED, TICKET_RESERVED, TICKET_COUNTER_ISSUED];

/// Coach codes in the order they appear on a train, Bengali alphabet order.
pub const COACH_ORDER: [&str; 32] = [
    "KA", "KHA", "GA", "GHA", "UMA", "CHA", "SCHA", "CHHA", "JA", "JHA", "NEO", "TA", "THA", "DA",
    "DHA", "TO", "THO", "DOA", "DHOA", "NA", "PA", "FA", "BA", "BHA", "MA", "ZA", "RA", "LA", "SHA",
    "SSA", "SA", "HA",
];

/// Seats of one coach within a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoachSeats {
    pub coach: String,
    pub seats: Vec<String>,
    pub count: usize,
}

/// A sorted seat list, also grouped by coach.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeatGroup {
    pub seats: Vec<String>,
    pub coaches: Vec<CoachSeats>,
}

impl SeatGroup {
    fn from_ids(mut ids: Vec<String>) -> Self {
        ids.sort_by(|a, b| compare_seats(a, b));

        let mut coaches: Vec<CoachSeats> = Vec::new();
        for id in &ids {
            let coach = coach_of(id);
            match coaches.last_mut() {
                Some(last) if last.coach == coach => {
                    last.seats.push(id.clone());
                    last.count += 1;
                }
                _ => coaches.push(CoachSeats {
                    coach: coach.to_string(),
                    seats: vec![id.clone()],
                    count: 1,
                }),
            }
        }
        Self {
            seats: ids,
            coaches,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }

    pub fn coach(&self, code: &str) -> Option<&CoachSeats> {
        self.coaches.iter().find(|c| c.coach == code)
    }
}

/// Every seat of one class on one trip, categorised.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeatLayoutResult {
    pub available: SeatGroup,
    pub booking_in_progress: SeatGroup,
    pub online_issued: SeatGroup,
    pub reserved: SeatGroup,
    pub counter_issued: SeatGroup,
    pub blocked: SeatGroup,
    /// Online and counter issued together.
    pub issued: SeatGroup,
}

/// Categorise raw seats.
///
/// Ticket-type buckets are filled from every seat carrying that type,
/// whatever its availability code.
pub fn aggregate(seats: &[RawSeat]) -> SeatLayoutResult {
    let mut available = Vec::new();
    let mut in_progress = Vec::new();
    let mut online = Vec::new();
    let mut reserved = Vec::new();
    let mut counter = Vec::new();
    let mut blocked = Vec::new();

    for seat in seats {
        let id = seat.seat_number.clone();
        match seat.availability {
            AVAILABILITY_FREE => available.push(id.clone()),
            AVAILABILITY_IN_PROGRESS if IN_PROGRESS_TICKET_TYPES.contains(&seat.ticket_type) => {
                in_progress.push(id.clone())
            }
            _ => {}
        }
        match seat.ticket_type {
            TICKET_ONLINE_ISSUED => online.push(id),
            TICKET_RESERVED => reserved.push(id),
            TICKET_COUNTER_ISSUED => counter.push(id),
            TICKET_BLOCKED => blocked.push(id),
            _ => {}
        }
    }

    let issued = online.iter().chain(counter.iter()).cloned().collect();

    SeatLayoutResult {
        available: SeatGroup::from_ids(available),
        booking_in_progress: SeatGroup::from_ids(in_progress),
        online_issued: SeatGroup::from_ids(online),
        reserved: SeatGroup::from_ids(reserved),
        counter_issued: SeatGroup::from_ids(counter),
        blocked: SeatGroup::from_ids(blocked),
        issued: SeatGroup::from_ids(issued),
    }
}

/// Position of a coach in [`COACH_ORDER`]; unknown coaches come last.
fn coach_rank(coach: &str) -> usize {
    COACH_ORDER
        .iter()
        .position(|c| *c == coach)
        .unwrap_or(COACH_ORDER.len())
}

/// Coach priority, then unknown coaches alphabetically, then seat number.
pub fn compare_seats(a: &str, b: &str) -> Ordering {
    let (ca, cb) = (coach_of(a), coach_of(b));
    coach_rank(ca)
        .cmp(&coach_rank(cb))
        .then_with(|| ca.cmp(cb))
        .then_with(|| seat_number_of(a).cmp(&seat_number_of(b)))
        .then_with(|| a.cmp(b))
}
