//! Route composition over a completed fare matrix.
//!
//! Three searches, tried in this order by [`RouteComposer::compose`]:
//!
//! - a direct ticket in any available class
//! - a chain of same-class tickets ([`RouteComposer::find_segmented`])
//! - a chain where each hop picks its own class
//!   ([`RouteComposer::find_mixed_segmented`])
//!
//! The chained searches are breadth-first over station indices and return
//! the first path that reaches the destination. That minimises the number
//! of tickets, not the total fare.

use std::collections::VecDeque;

use serde::Serialize;
use tracing::{debug, trace};

use crate::config::SERVICE_CHARGE;
use crate::domain::{ComposedRoute, FareMatrix, RouteKind, RouteSegment, SeatClass, StationIndex};
use crate::error::CoreError;

/// Outcome of [`RouteComposer::compose`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "routes", rename_all = "snake_case")]
pub enum RouteSearch {
    /// One direct route per class that has one.
    Direct(Vec<ComposedRoute>),
    /// One same-class chain per class that has one.
    Segmented(Vec<ComposedRoute>),
    /// A single chain mixing classes.
    MixedSegmented(ComposedRoute),
    NotFound,
}

impl RouteSearch {
    pub fn routes(&self) -> Vec<&ComposedRoute> {
        match self {
            RouteSearch::Direct(r) | RouteSearch::Segmented(r) => r.iter().collect(),
            RouteSearch::MixedSegmented(r) => vec![r],
            RouteSearch::NotFound => Vec::new(),
        }
    }
}

/// Pure route queries over a [`FareMatrix`].
#[derive(Debug, Clone, Copy)]
pub struct RouteComposer {
    service_charge: u32,
}

impl Default for RouteComposer {
    fn default() -> Self {
        Self::new(SERVICE_CHARGE)
    }
}

impl RouteComposer {
    pub fn new(service_charge: u32) -> Self {
        Self { service_charge }
    }

    /// A single ticket from `origin` to `dest` in `class`, if it has online seats.
    pub fn find_direct(
        &self,
        matrix: &FareMatrix,
        origin: &str,
        dest: &str,
        class: SeatClass,
    ) -> Option<ComposedRoute> {
        let (from, to) = forward_pair(matrix, origin, dest)?;
        let segment = self.segment(matrix, from, to, class)?;
        ComposedRoute::new(RouteKind::Direct, vec![segment]).ok()
    }

    /// Fewest same-class tickets that chain from `origin` to `dest`.
    ///
    /// Edges are cells of `class` with online seats, always toward a later
    /// station.
    pub fn find_segmented(
        &self,
        matrix: &FareMatrix,
        origin: &str,
        dest: &str,
        class: SeatClass,
    ) -> Option<ComposedRoute> {
        let (from, to) = forward_pair(matrix, origin, dest)?;
        let hops = bfs(from, to, |u, v| {
            matrix
                .cell(class, u, v)
                .filter(|c| c.is_bookable())
                .map(|_| class)
        })?;
        self.chain(matrix, RouteKind::Segmented, &hops)
    }

    /// Like [`find_segmented`](Self::find_segmented), but each hop takes the
    /// first of `classes` with online seats on it.
    pub fn find_mixed_segmented(
        &self,
        matrix: &FareMatrix,
        origin: &str,
        dest: &str,
        classes: &[SeatClass],
    ) -> Option<ComposedRoute> {
        let (from, to) = forward_pair(matrix, origin, dest)?;
        let hops = bfs(from, to, |u, v| {
            classes
                .iter()
                .copied()
                .find(|c| matrix.cell(*c, u, v).is_some_and(|cell| cell.is_bookable()))
        })?;
        self.chain(matrix, RouteKind::MixedSegmented, &hops)
    }

    /// Run the searches in order: direct for every available class, then
    /// same-class chains per class, then one mixed chain.
    pub fn compose(
        &self,
        matrix: &FareMatrix,
        origin: &str,
        dest: &str,
    ) -> Result<RouteSearch, CoreError> {
        let from = matrix
            .index_of(origin)
            .ok_or_else(|| CoreError::InvalidInput(format!("{origin} is not a stop on this train")))?;
        let to = matrix
            .index_of(dest)
            .ok_or_else(|| CoreError::InvalidInput(format!("{dest} is not a stop on this train")))?;
        if from >= to {
            return Err(CoreError::InvalidInput(format!(
                "{dest} does not come after {origin} on this train"
            )));
        }

        let classes = matrix.available_classes();

        let direct: Vec<_> = classes
            .iter()
            .filter_map(|c| self.find_direct(matrix, origin, dest, *c))
            .collect();
        if !direct.is_empty() {
            debug!(origin, dest, count = direct.len(), "direct routes found");
            return Ok(RouteSearch::Direct(direct));
        }

        let segmented: Vec<_> = classes
            .iter()
            .filter_map(|c| self.find_segmented(matrix, origin, dest, *c))
            .collect();
        if !segmented.is_empty() {
            debug!(origin, dest, count = segmented.len(), "segmented routes found");
            return Ok(RouteSearch::Segmented(segmented));
        }

        match self.find_mixed_segmented(matrix, origin, dest, &classes) {
            Some(route) => {
                debug!(origin, dest, hops = route.segments().len(), "mixed route found");
                Ok(RouteSearch::MixedSegmented(route))
            }
            None => {
                debug!(origin, dest, "no route found");
                Ok(RouteSearch::NotFound)
            }
        }
    }

    fn segment(
        &self,
        matrix: &FareMatrix,
        from: StationIndex,
        to: StationIndex,
        class: SeatClass,
    ) -> Option<RouteSegment> {
        let cell = matrix.cell(class, from, to).filter(|c| c.is_bookable())?;
        Some(RouteSegment::from_cell(
            (from, matrix.station(from)?),
            (to, matrix.station(to)?),
            class,
            cell,
            self.service_charge,
            matrix.date_at(from)?,
        ))
    }

    fn chain(
        &self,
        matrix: &FareMatrix,
        kind: RouteKind,
        hops: &[(StationIndex, StationIndex, SeatClass)],
    ) -> Option<ComposedRoute> {
        let segments = hops
            .iter()
            .map(|(u, v, c)| self.segment(matrix, *u, *v, *c))
            .collect::<Option<Vec<_>>>()?;
        ComposedRoute::new(kind, segments).ok()
    }
}

fn forward_pair(matrix: &FareMatrix, origin: &str, dest: &str) -> Option<(StationIndex, StationIndex)> {
    let from = matrix.index_of(origin)?;
    let to = matrix.index_of(dest)?;
    (from < to).then_some((from, to))
}

/// Breadth-first search from `from` to `to` over forward edges.
///
/// `edge(u, v)` names the class to ride from `u` to `v`, or `None` when
/// there is no usable ticket. Returns the hops of the first path found.
fn bfs(
    from: StationIndex,
    to: StationIndex,
    edge: impl Fn(StationIndex, StationIndex) -> Option<SeatClass>,
) -> Option<Vec<(StationIndex, StationIndex, SeatClass)>> {
    let span = to.0 - from.0 + 1;
    // parent[i] = (previous station, class) for station `from + i`.
    let mut parent: Vec<Option<(StationIndex, SeatClass)>> = vec![None; span];
    let mut visited = vec![false; span];
    visited[0] = true;

    let mut queue = VecDeque::from([from]);
    while let Some(u) = queue.pop_front() {
        for v in (u.0 + 1..=to.0).map(StationIndex) {
            let slot = v.0 - from.0;
            if visited[slot] {
                continue;
            }
            let Some(class) = edge(u, v) else {
                continue;
            };
            trace!(from = %u, to = %v, ?class, "edge");
            visited[slot] = true;
            parent[slot] = Some((u, class));
            if v == to {
                return Some(walk_back(&parent, from, to));
            }
            queue.push_back(v);
        }
    }
    None
}

fn walk_back(
    parent: &[Option<(StationIndex, SeatClass)>],
    from: StationIndex,
    to: StationIndex,
) -> Vec<(StationIndex, StationIndex, SeatClass)> {
    let mut hops = Vec::new();
    let mut at = to;
    while at != from {
        let Some((prev, class)) = parent[at.0 - from.0] else {
            break;
        };
        hops.push((prev, at, class));
        at = prev;
    }
    hops.reverse();
    hops
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FareCell;
    use chrono::NaiveDate;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 15).unwrap()
    }

    /// A matrix over `names` with every cell zero.
    fn empty_matrix(names: &[&str]) -> FareMatrix {
        let mut m = FareMatrix::new(
            names.iter().map(|s| s.to_string()).collect(),
            vec![date(); names.len()],
        )
        .unwrap();
        let pairs: Vec<_> = m.pairs().collect();
        for class in SeatClass::ALL {
            for (f, t) in &pairs {
                m.insert(class, *f, *t, FareCell::empty()).unwrap();
            }
        }
        m
    }

    fn open(m: &mut FareMatrix, class: SeatClass, from: &str, to: &str, online: u32, fare: u32) {
        let (f, t) = (m.index_of(from).unwrap(), m.index_of(to).unwrap());
        m.insert(
            class,
            f,
            t,
            FareCell {
                online,
                offline: 0,
                fare,
                vat: 0,
            },
        )
        .unwrap();
        m.finalize();
    }

    #[test]
    fn direct_total_includes_vat_and_charge() {
        let mut m = empty_matrix(&["A", "B"]);
        m.insert(
            SeatClass::Snigdha,
            StationIndex(0),
            StationIndex(1),
            FareCell {
                online: 5,
                offline: 2,
                fare: 100,
                vat: 10,
            },
        )
        .unwrap();
        m.finalize();

        let route = RouteComposer::default()
            .find_direct(&m, "A", "B", SeatClass::Snigdha)
            .unwrap();
        assert_eq!(route.kind(), RouteKind::Direct);
        assert_eq!(route.total_fare(), 130);
        assert_eq!(route.seats(), 7);
        assert_eq!(route.segments()[0].departure_date, date());
    }

    #[test]
    fn direct_needs_online_seats() {
        let mut m = empty_matrix(&["A", "B"]);
        m.insert(
            SeatClass::Snigdha,
            StationIndex(0),
            StationIndex(1),
            FareCell {
                online: 0,
                offline: 4,
                fare: 100,
                vat: 10,
            },
        )
        .unwrap();
        m.finalize();
        assert!(RouteComposer::default().find_direct(&m, "A", "B", SeatClass::Snigdha).is_none());
    }

    #[test]
    fn backwards_and_unknown_stations_find_nothing() {
        let mut m = empty_matrix(&["A", "B"]);
        open(&mut m, SeatClass::SChair, "A", "B", 3, 50);
        let c = RouteComposer::default();
        assert!(c.find_direct(&m, "B", "A", SeatClass::SChair).is_none());
        assert!(c.find_segmented(&m, "A", "Z", SeatClass::SChair).is_none());
        assert!(c.compose(&m, "B", "A").is_err());
        assert!(matches!(c.compose(&m, "A", "Z"), Err(CoreError::InvalidInput(_))));
    }

    #[test]
    fn segmented_chains_two_hops() {
        let mut m = empty_matrix(&["A", "B", "C"]);
        open(&mut m, SeatClass::SChair, "A", "B", 3, 50);
        open(&mut m, SeatClass::SChair, "B", "C", 1, 70);

        let c = RouteComposer::default();
        assert!(c.find_direct(&m, "A", "C", SeatClass::SChair).is_none());

        let route = c.find_segmented(&m, "A", "C", SeatClass::SChair).unwrap();
        assert_eq!(route.kind(), RouteKind::Segmented);
        assert_eq!(route.segments().len(), 2);
        assert_eq!(route.segments()[0].to, "B");
        assert_eq!(route.total_fare(), 50 + 20 + 70 + 20);
        assert_eq!(route.seats(), 1);

        assert!(c.find_segmented(&m, "A", "C", SeatClass::Snigdha).is_none());
    }

    #[test]
    fn segmented_prefers_fewer_hops_over_cheaper() {
        let mut m = empty_matrix(&["A", "B", "C", "D"]);
        open(&mut m, SeatClass::SChair, "A", "B", 1, 10);
        open(&mut m, SeatClass::SChair, "B", "C", 1, 10);
        open(&mut m, SeatClass::SChair, "C", "D", 1, 10);
        open(&mut m, SeatClass::SChair, "A", "C", 1, 500);

        let route = RouteComposer::default()
            .find_segmented(&m, "A", "D", SeatClass::SChair)
            .unwrap();
        assert_eq!(route.segments().len(), 2);
        assert_eq!(route.segments()[0].to, "C");
    }

    #[test]
    fn mixed_takes_first_class_per_hop() {
        let mut m = empty_matrix(&["A", "B", "C"]);
        open(&mut m, SeatClass::Snigdha, "A", "B", 2, 300);
        open(&mut m, SeatClass::Shovan, "A", "B", 2, 100);
        open(&mut m, SeatClass::AcBerth, "B", "C", 1, 900);

        let c = RouteComposer::default();
        let classes = m.available_classes();
        let route = c.find_mixed_segmented(&m, "A", "C", &classes).unwrap();
        assert_eq!(route.kind(), RouteKind::MixedSegmented);
        assert_eq!(route.segments()[0].seat_class, SeatClass::Shovan);
        assert_eq!(route.segments()[1].seat_class, SeatClass::AcBerth);

        match c.compose(&m, "A", "C").unwrap() {
            RouteSearch::MixedSegmented(r) => assert_eq!(r, route),
            other => panic!("expected mixed route, got {other:?}"),
        }
    }

    #[test]
    fn compose_prefers_direct_then_segmented() {
        let mut m = empty_matrix(&["A", "B", "C"]);
        open(&mut m, SeatClass::SChair, "A", "B", 1, 50);
        open(&mut m, SeatClass::SChair, "B", "C", 1, 50);
        open(&mut m, SeatClass::Shovan, "A", "B", 1, 60);
        open(&mut m, SeatClass::Shovan, "B", "C", 1, 60);

        let c = RouteComposer::default();
        match c.compose(&m, "A", "C").unwrap() {
            RouteSearch::Segmented(routes) => {
                assert_eq!(routes.len(), 2);
                assert_eq!(routes[0].segments()[0].seat_class, SeatClass::SChair);
            }
            other => panic!("expected segmented, got {other:?}"),
        }

        open(&mut m, SeatClass::Snigdha, "A", "C", 1, 400);
        match c.compose(&m, "A", "C").unwrap() {
            RouteSearch::Direct(routes) => assert_eq!(routes.len(), 1),
            other => panic!("expected direct, got {other:?}"),
        }
    }

    #[test]
    fn nothing_bookable_is_not_found() {
        let m = empty_matrix(&["A", "B", "C"]);
        let search = RouteComposer::default().compose(&m, "A", "C").unwrap();
        assert_eq!(search, RouteSearch::NotFound);
        assert!(search.routes().is_empty());
    }
}
