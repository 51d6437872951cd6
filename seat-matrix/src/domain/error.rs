//! Domain error types.
//!
//! These errors represent validation failures and data inconsistencies
//! in the domain layer. They are distinct from API/IO errors.

use super::StationIndex;

/// Domain-level errors for validation and data consistency.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// Matrix cells only exist for forward pairs
    #[error("invalid station pair: {from} -> {to}")]
    InvalidPair { from: StationIndex, to: StationIndex },

    /// A station name appears twice in one schedule
    #[error("duplicate station in schedule: {0}")]
    DuplicateStation(String),

    /// Every station needs a query date
    #[error("got {dates} dates for {stations} stations")]
    MismatchedStationDates { stations: usize, dates: usize },

    /// Consecutive route segments must share a station
    #[error("segments do not connect: {0} then {1}")]
    DisconnectedSegments(String, String),

    /// Route has no segments
    #[error("route must have at least one segment")]
    EmptyRoute,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = DomainError::InvalidPair {
            from: StationIndex(3),
            to: StationIndex(1),
        };
        assert_eq!(err.to_string(), "invalid station pair: 3 -> 1");

        let err = DomainError::DuplicateStation("Dhaka".into());
        assert_eq!(err.to_string(), "duplicate station in schedule: Dhaka");

        let err = DomainError::MismatchedStationDates {
            stations: 4,
            dates: 3,
        };
        assert_eq!(err.to_string(), "got 3 dates for 4 stations");

        let err = DomainError::DisconnectedSegments("Dhaka".into(), "Feni".into());
        assert_eq!(err.to_string(), "segments do not connect: Dhaka then Feni");

        assert_eq!(
            DomainError::EmptyRoute.to_string(),
            "route must have at least one segment"
        );
    }
}
