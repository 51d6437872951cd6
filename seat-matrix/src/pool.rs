//! Bounded-concurrency fan-out with cancellation.
//!
//! A [`ConcurrencyPool`] runs a batch of async units with at most
//! `max_concurrent` of them in flight. As one settles, the next queued unit
//! starts. Units do not need to be `Send`: everything is driven from the
//! calling task through a [`FuturesUnordered`], so the pool interleaves
//! in-flight requests rather than spawning them.
//!
//! Outcomes are stored in the slot of the unit that produced them, never in
//! completion order.

use std::future::Future;

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// Default cap on in-flight units.
pub const DEFAULT_MAX_CONCURRENT: usize = 10;

/// What happened to one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T, E> {
    /// The unit ran and succeeded.
    Done(T),
    /// The unit ran and failed.
    Failed(E),
    /// Cancellation was observed before the unit was dispatched.
    Skipped,
}

impl<T, E> Outcome<T, E> {
    pub fn is_skipped(&self) -> bool {
        matches!(self, Outcome::Skipped)
    }

    pub fn failure(&self) -> Option<&E> {
        match self {
            Outcome::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Settled units out of the batch total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub done: usize,
    pub total: usize,
}

impl Progress {
    /// Whole-number percentage; an empty batch counts as complete.
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        ((self.done * 100) / self.total).min(100) as u8
    }
}

/// Runs async units with a cap on how many are in flight.
#[derive(Debug, Clone, Copy)]
pub struct ConcurrencyPool {
    max_concurrent: usize,
}

impl Default for ConcurrencyPool {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CONCURRENT)
    }
}

impl ConcurrencyPool {
    /// A pool with at most `max_concurrent` units in flight (minimum 1).
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            max_concurrent: max_concurrent.max(1),
        }
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Run every unit to completion.
    ///
    /// Each unit receives a child of `cancel` to thread into its network
    /// call. A failing unit never stops its siblings. Once `cancel` fires,
    /// no further units are dispatched; they come back as
    /// [`Outcome::Skipped`]. `on_unit_done` is called after each unit
    /// settles.
    pub async fn run<T, E, F, Fut, P>(
        &self,
        units: Vec<F>,
        cancel: &CancellationToken,
        on_unit_done: P,
    ) -> Vec<Outcome<T, E>>
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: FnMut(Progress),
    {
        self.run_until(units, cancel, on_unit_done, |_| false).await
    }

    /// Like [`run`](Self::run), but stops dispatching once a failure
    /// matches `abort_on`.
    ///
    /// Used for errors every later unit would hit too (an expired session).
    /// Units already in flight get their tokens cancelled and settle with
    /// whatever their call returns; queued units are skipped. The caller's
    /// `cancel` token is left untouched.
    pub async fn run_until<T, E, F, Fut, P, A>(
        &self,
        units: Vec<F>,
        cancel: &CancellationToken,
        mut on_unit_done: P,
        abort_on: A,
    ) -> Vec<Outcome<T, E>>
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: FnMut(Progress),
        A: Fn(&E) -> bool,
    {
        let total = units.len();
        let mut outcomes: Vec<Outcome<T, E>> = (0..total).map(|_| Outcome::Skipped).collect();
        let batch = cancel.child_token();

        let mut queue = units.into_iter().enumerate();
        let mut in_flight = FuturesUnordered::new();
        let mut done = 0;

        loop {
            while in_flight.len() < self.max_concurrent && !batch.is_cancelled() {
                let Some((slot, unit)) = queue.next() else {
                    break;
                };
                trace!(slot, in_flight = in_flight.len() + 1, "dispatching unit");
                let fut = unit(batch.child_token());
                in_flight.push(async move { (slot, fut.await) });
            }

            let Some((slot, result)) = in_flight.next().await else {
                break;
            };
            done += 1;
            outcomes[slot] = match result {
                Ok(value) => Outcome::Done(value),
                Err(err) => {
                    if !batch.is_cancelled() && abort_on(&err) {
                        debug!(slot, done, total, "aborting batch after fatal unit failure");
                        batch.cancel();
                    }
                    Outcome::Failed(err)
                }
            };
            on_unit_done(Progress { done, total });
        }

        if done < total {
            debug!(done, total, "batch stopped before dispatching every unit");
        }
        outcomes
    }
}
