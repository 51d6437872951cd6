//! Filling the all-pairs fare matrix.
//!
//! Every ordered pair of stops (i < j) becomes one seat search, dated with
//! the origin stop's ticket date. A search answers for every class at once,
//! so an N-stop train costs N·(N−1)/2 calls regardless of class count.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::config::EngineConfig;
use crate::domain::{
    FareCell, FareMatrix, SeatClass, StationIndex, TrainModel, TravelDate, format_display,
};
use crate::error::CoreError;
use crate::pool::{ConcurrencyPool, Outcome, Progress};
use crate::schedule::StationDates;
use crate::shohoz::{ApiError, SeatService, TripDto, TripQuery};

/// Class sent with every pair search. The endpoint requires one but
/// answers for all classes on the train.
const QUERY_CLASS: SeatClass = SeatClass::SChair;

/// Drives the seat searches that fill a [`FareMatrix`].
pub struct FareMatrixBuilder<'a, S> {
    service: &'a S,
    config: &'a EngineConfig,
}

impl<'a, S: SeatService> FareMatrixBuilder<'a, S> {
    pub fn new(service: &'a S, config: &'a EngineConfig) -> Self {
        Self { service, config }
    }

    /// Build the matrix for `model` over the stations of `dates`, in order.
    ///
    /// A pair whose search fails gets zero cells for every class so the
    /// matrix is always complete. An auth failure stops the batch and is
    /// returned, since every later call would fail the same way.
    pub async fn build(
        &self,
        model: &TrainModel,
        dates: &StationDates,
        cancel: &CancellationToken,
        mut on_progress: impl FnMut(Progress),
    ) -> Result<FareMatrix, CoreError> {
        self.service.check_credentials()?;

        let stations: Vec<String> = dates.iter().map(|(c, _)| c.to_string()).collect();
        let mut matrix = FareMatrix::new(stations, dates.dates())
            .map_err(|e| CoreError::UnexpectedResponse(e.to_string()))?;

        let mut pairs = Vec::with_capacity(matrix.pair_count());
        for (from, to) in matrix.pairs() {
            let (Some(origin), Some(dest), Some(date)) =
                (matrix.station(from), matrix.station(to), matrix.date_at(from))
            else {
                continue;
            };
            pairs.push(PairQuery {
                from,
                to,
                query: TripQuery {
                    from: origin.to_string(),
                    to: dest.to_string(),
                    date: TravelDate::new(date),
                    seat_class: QUERY_CLASS,
                },
            });
        }

        info!(
            train = %model,
            stations = matrix.station_count(),
            pairs = pairs.len(),
            "building fare matrix"
        );

        let service = self.service;
        let surcharge = self.config.berth_surcharge;
        let units: Vec<_> = pairs
            .iter()
            .map(|pair| {
                move |token: CancellationToken| async move {
                    let trips = service.search_trips(&pair.query, &token).await?;
                    Ok::<_, ApiError>(cells_for_train(model, &trips, surcharge))
                }
            })
            .collect();

        let pool = ConcurrencyPool::new(self.config.max_concurrent);
        let outcomes = pool
            .run_until(
                units,
                cancel,
                |progress| {
                    trace!(done = progress.done, total = progress.total, "matrix progress");
                    on_progress(progress);
                },
                ApiError::is_auth,
            )
            .await;

        if cancel.is_cancelled() {
            debug!(train = %model, "matrix build canceled");
            return Err(CoreError::Canceled);
        }

        let mut failed = 0;
        for (pair, outcome) in pairs.iter().zip(outcomes) {
            let cells = match outcome {
                Outcome::Done(cells) => cells,
                Outcome::Failed(err) if err.is_auth() => {
                    warn!(train = %model, error = %err, "matrix build stopped by auth failure");
                    return Err(err.into());
                }
                Outcome::Failed(err) => {
                    failed += 1;
                    warn!(
                        from = %pair.query.from,
                        to = %pair.query.to,
                        error = %err,
                        "seat search failed; recording zero seats"
                    );
                    Vec::new()
                }
                Outcome::Skipped => Vec::new(),
            };
            for class in SeatClass::ALL {
                let cell = cells
                    .iter()
                    .find(|(c, _)| *c == class)
                    .map(|(_, cell)| *cell)
                    .unwrap_or_default();
                matrix
                    .insert(class, pair.from, pair.to, cell)
                    .map_err(|e| CoreError::UnexpectedResponse(e.to_string()))?;
            }
        }
        matrix.finalize();

        debug!(
            train = %model,
            failed,
            classes = ?matrix.available_classes(),
            "fare matrix complete"
        );

        if !matrix.has_any_data() {
            let date = dates
                .iter()
                .next()
                .map(|(_, d)| format_display(d))
                .unwrap_or_default();
            return Err(CoreError::NoDataFound(format!(
                "no seats found on train {model} for {date}"
            )));
        }
        Ok(matrix)
    }
}

struct PairQuery {
    from: StationIndex,
    to: StationIndex,
    query: TripQuery,
}

/// Per-class cells for `model` out of a seat search response.
///
/// Trips for other trains are ignored, as are unknown class codes. Berth
/// classes get `berth_surcharge` added to the base fare.
pub fn cells_for_train(
    model: &TrainModel,
    trips: &[TripDto],
    berth_surcharge: u32,
) -> Vec<(SeatClass, FareCell)> {
    let Some(trip) = trips.iter().find(|t| model.matches_trip_number(&t.trip_number)) else {
        return Vec::new();
    };
    trip.seat_types
        .iter()
        .filter_map(|st| {
            let class = SeatClass::parse(&st.seat_type)
                .inspect_err(|_| trace!(code = %st.seat_type, "unknown seat class"))
                .ok()?;
            let surcharge = if class.is_berth() { berth_surcharge } else { 0 };
            Some((
                class,
                FareCell {
                    online: st.seat_counts.online,
                    offline: st.seat_counts.offline,
                    fare: st.fare + surcharge,
                    vat: st.vat_amount,
                },
            ))
        })
        .collect()
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::domain::RouteStop;
    use crate::schedule::StationDateResolver;
    use crate::shohoz::mock::{MockService, trip};
    use chrono::NaiveDate;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        /// An N-stop train always yields N·(N−1)/2 cells in every class.
        #[test]
        fn cell_count_is_triangular(n in 2usize..9) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()
                .unwrap();
            let mut stops: Vec<RouteStop> = (0..n)
                .map(|i| RouteStop::new(format!("S{i}"), "", format!("{:02}:00", 6 + i)))
                .collect();
            let dates = StationDateResolver::default()
                .resolve(&mut stops, NaiveDate::from_ymd_opt(2026, 10, 15).unwrap());
            let service = MockService::new()
                .with_trips("S0", "S1", vec![trip("X (701)", &[(SeatClass::SChair, 1, 0, 10, 0, "t")])]);
            let config = EngineConfig::default();
            let model = TrainModel::parse("701").unwrap();

            let matrix = runtime
                .block_on(FareMatrixBuilder::new(&service, &config).build(
                    &model,
                    &dates,
                    &CancellationToken::new(),
                    |_| {},
                ))
                .unwrap();

            for class in SeatClass::ALL {
                prop_assert_eq!(matrix.grid(class).unwrap().len(), n * (n - 1) / 2);
            }
            prop_assert_eq!(service.searches().len(), n * (n - 1) / 2);
        }
    }
}
