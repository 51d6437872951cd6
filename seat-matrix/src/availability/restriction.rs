//! Booking rules that withhold seat layouts.
//!
//! The seat-layout endpoint answers 422 while a rule applies to the
//! signed-in account or the journey date. The message text is the only
//! clue to which rule it is.

use serde::Serialize;

use crate::shohoz::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RestrictionKind {
    /// The sales window for the date has not opened.
    NotOpenYet,
    /// The account has a purchase in progress.
    OngoingPurchase,
    /// The account holds an unpaid reservation.
    ActiveReservation,
    /// The account reached its ticket limit.
    OrderLimit,
    Other,
}

const NOT_OPEN_HINTS: [&str; 6] = [
    "not open",
    "try again after",
    "not yet",
    "will open",
    "will be available",
    "will be opened",
];
const ONGOING_HINTS: [&str; 3] = ["ongoing purchase", "in progress", "already in process"];
const RESERVATION_HINTS: [&str; 2] = ["reserv", "booked a seat"];
const LIMIT_HINTS: [&str; 3] = ["limit", "maximum", "exceed"];

/// A 422 on a seat-layout call, with the rule it names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Restriction {
    pub kind: RestrictionKind,
    pub message: String,
}

impl Restriction {
    /// `Some` if `err` is a booking-rule rejection.
    pub fn from_error(err: &ApiError) -> Option<Self> {
        match err {
            ApiError::Rejected {
                status: 422,
                message,
            } => Some(Self {
                kind: classify(message),
                message: message.clone(),
            }),
            _ => None,
        }
    }

    /// The message to show the user.
    pub fn user_message(&self) -> String {
        match self.kind {
            RestrictionKind::NotOpenYet if !self.message.trim().is_empty() => {
                format!("Tickets for this journey are not on sale yet. {}", self.message.trim())
            }
            RestrictionKind::NotOpenYet => {
                "Tickets for this journey are not on sale yet.".to_string()
            }
            RestrictionKind::OngoingPurchase => {
                "You have a purchase in progress. Finish or cancel it before checking seats."
                    .to_string()
            }
            RestrictionKind::ActiveReservation => {
                "You already hold a reservation. Pay for or release it before checking seats."
                    .to_string()
            }
            RestrictionKind::OrderLimit => {
                "You have reached the maximum number of tickets you can order.".to_string()
            }
            RestrictionKind::Other => generic_message(),
        }
    }
}

/// Message when no restriction could be diagnosed.
pub fn generic_message() -> String {
    "Seat details are not available for this journey right now. Please try again later."
        .to_string()
}

/// Which rule a rejection message names.
pub fn classify(message: &str) -> RestrictionKind {
    let lower = message.to_ascii_lowercase();
    let any = |hints: &[&str]| hints.iter().any(|h| lower.contains(h));

    if any(&ONGOING_HINTS) {
        RestrictionKind::OngoingPurchase
    } else if any(&RESERVATION_HINTS) {
        RestrictionKind::ActiveReservation
    } else if any(&LIMIT_HINTS) {
        RestrictionKind::OrderLimit
    } else if any(&NOT_OPEN_HINTS) {
        RestrictionKind::NotOpenYet
    } else {
        RestrictionKind::Other
    }
}

/// The user message for a batch in which every unit was restricted:
/// the first diagnosable restriction, else a generic message.
pub fn diagnose<'a>(restrictions: impl IntoIterator<Item = &'a Restriction>) -> String {
    restrictions
        .into_iter()
        .find(|r| r.kind != RestrictionKind::Other)
        .map(Restriction::user_message)
        .unwrap_or_else(generic_message)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected(status: u16, message: &str) -> ApiError {
        ApiError::Rejected {
            status,
            message: message.to_string(),
        }
    }

    #[test]
    fn classifies_server_messages() {
        assert_eq!(
            classify("Ticket purchase for this date will be available from 8:00 AM"),
            RestrictionKind::NotOpenYet
        );
        assert_eq!(
            classify("You have an ongoing purchase, please complete it first"),
            RestrictionKind::OngoingPurchase
        );
        assert_eq!(
            classify("You already have 1 reserved seat(s)"),
            RestrictionKind::ActiveReservation
        );
        assert_eq!(
            classify("Maximum 4 tickets can be purchased in a single order"),
            RestrictionKind::OrderLimit
        );
        assert_eq!(
            classify("Please try again after 8:00 AM"),
            RestrictionKind::NotOpenYet
        );
        assert_eq!(classify("Something odd happened"), RestrictionKind::Other);
    }

    #[test]
    fn only_422_is_a_restriction() {
        assert!(Restriction::from_error(&rejected(422, "not open")).is_some());
        assert!(Restriction::from_error(&rejected(400, "not open")).is_none());
        assert!(Restriction::from_error(&ApiError::NotFound).is_none());
    }

    #[test]
    fn diagnosis_skips_undiagnosable() {
        let restrictions = [
            Restriction::from_error(&rejected(422, "???")).unwrap(),
            Restriction::from_error(&rejected(422, "order limit exceeded")).unwrap(),
            Restriction::from_error(&rejected(422, "not open yet")).unwrap(),
        ];
        assert_eq!(
            diagnose(&restrictions),
            "You have reached the maximum number of tickets you can order."
        );
        assert_eq!(diagnose(&restrictions[..1]), generic_message());
    }

    #[test]
    fn not_open_keeps_server_detail() {
        let r = Restriction::from_error(&rejected(422, "Sales will open at 8:00 AM")).unwrap();
        assert!(r.user_message().ends_with("Sales will open at 8:00 AM"));
    }
}
