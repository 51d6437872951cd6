//! Purchasable ticket routes composed from fare matrix cells.

use chrono::NaiveDate;
use serde::Serialize;

use super::error::DomainError;
use super::fare::FareCell;
use super::schedule::StationIndex;
use super::seat_class::SeatClass;

/// How a route was composed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteKind {
    /// One ticket covering the whole trip.
    Direct,
    /// Several contiguous tickets, all in one class.
    Segmented,
    /// Several contiguous tickets, classes chosen per hop.
    MixedSegmented,
}

/// A single ticket within a composed route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteSegment {
    pub from: String,
    pub to: String,
    #[serde(skip)]
    pub from_index: StationIndex,
    #[serde(skip)]
    pub to_index: StationIndex,
    pub seat_class: SeatClass,
    pub fare: u32,
    pub vat: u32,
    pub service_charge: u32,
    /// `fare + vat + service_charge`
    pub total: u32,
    /// Online plus offline seats.
    pub seats: u32,
    pub departure_date: NaiveDate,
}

impl RouteSegment {
    /// Price a ticket from a fare cell.
    pub fn from_cell(
        from: (StationIndex, &str),
        to: (StationIndex, &str),
        seat_class: SeatClass,
        cell: &FareCell,
        service_charge: u32,
        departure_date: NaiveDate,
    ) -> Self {
        Self {
            from: from.1.to_string(),
            to: to.1.to_string(),
            from_index: from.0,
            to_index: to.0,
            seat_class,
            fare: cell.fare,
            vat: cell.vat,
            service_charge,
            total: cell.fare + cell.vat + service_charge,
            seats: cell.total_seats(),
            departure_date,
        }
    }
}

/// An ordered chain of tickets from origin to destination.
///
/// Construction enforces that each segment starts where the previous one
/// ended and that station indices strictly increase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComposedRoute {
    kind: RouteKind,
    segments: Vec<RouteSegment>,
    total_fare: u32,
}

impl ComposedRoute {
    pub fn new(kind: RouteKind, segments: Vec<RouteSegment>) -> Result<Self, DomainError> {
        if segments.is_empty() {
            return Err(DomainError::EmptyRoute);
        }
        for seg in &segments {
            if seg.from_index >= seg.to_index {
                return Err(DomainError::InvalidPair {
                    from: seg.from_index,
                    to: seg.to_index,
                });
            }
        }
        for pair in segments.windows(2) {
            if pair[0].to_index != pair[1].from_index {
                return Err(DomainError::DisconnectedSegments(
                    pair[0].to.clone(),
                    pair[1].from.clone(),
                ));
            }
        }
        let total_fare = segments.iter().map(|s| s.total).sum();
        Ok(Self {
            kind,
            segments,
            total_fare,
        })
    }

    pub fn kind(&self) -> RouteKind {
        self.kind
    }

    pub fn segments(&self) -> &[RouteSegment] {
        &self.segments
    }

    pub fn total_fare(&self) -> u32 {
        self.total_fare
    }

    /// Seats available on the tightest segment.
    pub fn seats(&self) -> u32 {
        self.segments.iter().map(|s| s.seats).min().unwrap_or(0)
    }

    pub fn origin(&self) -> &str {
        &self.segments[0].from
    }

    pub fn destination(&self) -> &str {
        &self.segments[self.segments.len() - 1].to
    }
}
