//! Fare/availability matrix over every origin-destination pair of a train.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::Serialize;

use super::error::DomainError;
use super::schedule::StationIndex;
use super::seat_class::SeatClass;

/// Seat counts and fare components for one class between two stations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FareCell {
    /// Seats sellable online.
    pub online: u32,
    /// Seats held for station counters.
    pub offline: u32,
    /// Base fare in taka, including any berth surcharge.
    pub fare: u32,
    /// VAT in taka.
    pub vat: u32,
}

impl FareCell {
    /// A cell with no seats and no fare.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn total_seats(&self) -> u32 {
        self.online + self.offline
    }

    pub fn has_seats(&self) -> bool {
        self.total_seats() > 0
    }

    /// Only online seats can be bought through the booking site.
    pub fn is_bookable(&self) -> bool {
        self.online > 0
    }
}

/// All cells for a single seat class.
#[derive(Debug, Clone, Default)]
pub struct ClassGrid {
    cells: HashMap<(StationIndex, StationIndex), FareCell>,
    has_data: bool,
}

impl ClassGrid {
    pub fn get(&self, from: StationIndex, to: StationIndex) -> Option<&FareCell> {
        self.cells.get(&(from, to))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Whether any cell has a seat, online or offline.
    pub fn has_data(&self) -> bool {
        self.has_data
    }

    fn refresh_has_data(&mut self) {
        self.has_data = self.cells.values().any(FareCell::has_seats);
    }
}

/// Seat class → origin → destination → [`FareCell`].
///
/// Stations are addressed by their position in the schedule. Cells are only
/// ever stored for `from < to`.
#[derive(Debug, Clone)]
pub struct FareMatrix {
    stations: Vec<String>,
    /// Ticket query date for each station, parallel to `stations`.
    dates: Vec<NaiveDate>,
    index: HashMap<String, StationIndex>,
    classes: BTreeMap<SeatClass, ClassGrid>,
}

impl FareMatrix {
    /// Create an empty matrix for the given stations and their query dates.
    pub fn new(stations: Vec<String>, dates: Vec<NaiveDate>) -> Result<Self, DomainError> {
        if stations.len() != dates.len() {
            return Err(DomainError::MismatchedStationDates {
                stations: stations.len(),
                dates: dates.len(),
            });
        }
        let mut index = HashMap::with_capacity(stations.len());
        for (i, name) in stations.iter().enumerate() {
            if index.insert(name.clone(), StationIndex(i)).is_some() {
                return Err(DomainError::DuplicateStation(name.clone()));
            }
        }
        let classes = SeatClass::ALL
            .into_iter()
            .map(|c| (c, ClassGrid::default()))
            .collect();
        Ok(Self {
            stations,
            dates,
            index,
            classes,
        })
    }

    pub fn stations(&self) -> &[String] {
        &self.stations
    }

    pub fn station_count(&self) -> usize {
        self.stations.len()
    }

    pub fn index_of(&self, station: &str) -> Option<StationIndex> {
        self.index.get(station).copied()
    }

    pub fn station(&self, idx: StationIndex) -> Option<&str> {
        self.stations.get(idx.0).map(String::as_str)
    }

    pub fn date_at(&self, idx: StationIndex) -> Option<NaiveDate> {
        self.dates.get(idx.0).copied()
    }

    /// Number of valid origin-destination pairs: N·(N−1)/2.
    pub fn pair_count(&self) -> usize {
        let n = self.stations.len();
        n * n.saturating_sub(1) / 2
    }

    /// Every valid `(from, to)` pair, in row-major order.
    pub fn pairs(&self) -> impl Iterator<Item = (StationIndex, StationIndex)> + '_ {
        let n = self.stations.len();
        (0..n).flat_map(move |i| ((i + 1)..n).map(move |j| (StationIndex(i), StationIndex(j))))
    }

    /// Write a cell. Rejects pairs that do not run forward along the route.
    pub fn insert(
        &mut self,
        class: SeatClass,
        from: StationIndex,
        to: StationIndex,
        cell: FareCell,
    ) -> Result<(), DomainError> {
        if from >= to || to.0 >= self.stations.len() {
            return Err(DomainError::InvalidPair { from, to });
        }
        self.classes
            .entry(class)
            .or_default()
            .cells
            .insert((from, to), cell);
        Ok(())
    }

    pub fn cell(&self, class: SeatClass, from: StationIndex, to: StationIndex) -> Option<&FareCell> {
        self.classes.get(&class)?.get(from, to)
    }

    /// Look a cell up by station names.
    pub fn cell_by_name(&self, class: SeatClass, from: &str, to: &str) -> Option<&FareCell> {
        self.cell(class, self.index_of(from)?, self.index_of(to)?)
    }

    pub fn grid(&self, class: SeatClass) -> Option<&ClassGrid> {
        self.classes.get(&class)
    }

    /// Recompute each class's `has_data` flag. Call after the last insert.
    pub fn finalize(&mut self) {
        for grid in self.classes.values_mut() {
            grid.refresh_has_data();
        }
    }

    /// Classes with at least one seat anywhere, in enumeration order.
    pub fn available_classes(&self) -> Vec<SeatClass> {
        self.classes
            .iter()
            .filter(|(_, g)| g.has_data())
            .map(|(c, _)| *c)
            .collect()
    }

    pub fn has_any_data(&self) -> bool {
        self.classes.values().any(ClassGrid::has_data)
    }

    /// Whether every class holds exactly one cell per valid pair.
    pub fn is_complete(&self) -> bool {
        let expected = self.pair_count();
        self.classes.values().all(|g| g.len() == expected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 15).unwrap()
    }

    fn matrix(names: &[&str]) -> FareMatrix {
        FareMatrix::new(
            names.iter().map(|s| s.to_string()).collect(),
            vec![date(); names.len()],
        )
        .unwrap()
    }

    #[test]
    fn pair_count_is_triangular() {
        assert_eq!(matrix(&[]).pair_count(), 0);
        assert_eq!(matrix(&["A"]).pair_count(), 0);
        assert_eq!(matrix(&["A", "B", "C", "D"]).pair_count(), 6);
        assert_eq!(matrix(&["A", "B", "C", "D"]).pairs().count(), 6);
    }

    #[test]
    fn pairs_are_forward_only() {
        let m = matrix(&["A", "B", "C"]);
        assert!(m.pairs().all(|(f, t)| f < t));
    }

    #[test]
    fn insert_rejects_backwards_and_diagonal() {
        let mut m = matrix(&["A", "B", "C"]);
        let cell = FareCell::empty();
        assert!(m.insert(SeatClass::SChair, StationIndex(1), StationIndex(0), cell).is_err());
        assert!(m.insert(SeatClass::SChair, StationIndex(1), StationIndex(1), cell).is_err());
        assert!(m.insert(SeatClass::SChair, StationIndex(1), StationIndex(3), cell).is_err());
        assert!(m.insert(SeatClass::SChair, StationIndex(0), StationIndex(2), cell).is_ok());
    }

    #[test]
    fn duplicate_station_rejected() {
        let err = FareMatrix::new(vec!["A".into(), "A".into()], vec![date(), date()]).unwrap_err();
        assert!(matches!(err, DomainError::DuplicateStation(_)));
    }

    #[test]
    fn has_data_counts_offline_seats() {
        let mut m = matrix(&["A", "B"]);
        let cell = FareCell {
            online: 0,
            offline: 3,
            fare: 100,
            vat: 0,
        };
        m.insert(SeatClass::Snigdha, StationIndex(0), StationIndex(1), cell).unwrap();
        m.finalize();
        assert_eq!(m.available_classes(), vec![SeatClass::Snigdha]);
        assert!(m.has_any_data());
        assert!(!m.cell_by_name(SeatClass::Snigdha, "A", "B").unwrap().is_bookable());
    }

    #[test]
    fn completeness() {
        let mut m = matrix(&["A", "B", "C"]);
        assert!(!m.is_complete());
        let pairs: Vec<_> = m.pairs().collect();
        for class in SeatClass::ALL {
            for (f, t) in &pairs {
                m.insert(class, *f, *t, FareCell::empty()).unwrap();
            }
        }
        assert!(m.is_complete());
    }
}
