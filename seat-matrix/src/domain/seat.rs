//! Individual seats from a coach layout.

use serde::Serialize;

/// One seat as reported by the seat-layout endpoint.
///
/// Seat numbers look like `KA-12`, `SCHA-5`, or with a sub-letter
/// `UMA-A-7`: coach code first, seat number last.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawSeat {
    pub seat_number: String,
    /// 1 = free, 2 = held by a purchase in progress, anything else = taken.
    pub availability: u8,
    pub ticket_type: u8,
}

impl RawSeat {
    pub fn new(seat_number: impl Into<String>, availability: u8, ticket_type: u8) -> Self {
        Self {
            seat_number: seat_number.into(),
            availability,
            ticket_type,
        }
    }

    /// Coach code: everything before the first `-`.
    ///
    /// ```
    /// use seat_matrix::domain::RawSeat;
    ///
    /// assert_eq!(RawSeat::new("KA-12", 1, 1).coach(), "KA");
    /// assert_eq!(RawSeat::new("UMA-A-7", 1, 1).coach(), "UMA");
    /// ```
    pub fn coach(&self) -> &str {
        coach_of(&self.seat_number)
    }

    /// Trailing number of the seat id, `0` if there is none.
    ///
    /// ```
    /// use seat_matrix::domain::RawSeat;
    ///
    /// assert_eq!(RawSeat::new("KA-12", 1, 1).number(), 12);
    /// assert_eq!(RawSeat::new("UMA-A-7", 1, 1).number(), 7);
    /// assert_eq!(RawSeat::new("GHA", 1, 1).number(), 0);
    /// ```
    pub fn number(&self) -> u32 {
        seat_number_of(&self.seat_number)
    }
}

/// Coach code of a seat id.
pub fn coach_of(seat_id: &str) -> &str {
    seat_id.split('-').next().unwrap_or(seat_id).trim()
}

/// Trailing numeric suffix of a seat id.
pub fn seat_number_of(seat_id: &str) -> u32 {
    let digits_start = seat_id
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i);
    match digits_start {
        Some(i) if seat_id.contains('-') => seat_id[i..].parse().unwrap_or(0),
        _ => 0,
    }
}
