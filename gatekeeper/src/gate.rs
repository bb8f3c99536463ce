use std::sync::{Mutex, MutexGuard, PoisonError};

use common::Decision;
use thiserror::Error;

/// the two counters guarded by [`Gatekeeper`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GateState {
    /// highest run number seen. never decreases.
    pub latest_run_number: i64,
    /// every processed call, valid input or not.
    pub total_calls: u64,
}

/// decides whether a caller's run is stale.
///
/// all reads and writes happen under one lock, so concurrent calls are
/// serialized and no update can be lost.
#[derive(Debug, Default)]
pub struct Gatekeeper {
    state: Mutex<GateState>,
}

impl Gatekeeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// compare `run` against the latest run, raise the latest run if `run` is newer,
    /// and count the call.
    pub fn evaluate(&self, run: i64) -> Decision {
        let (decision, previous) = {
            let mut state = self.lock();
            let previous = state.latest_run_number;

            let shutdown = previous > run;
            if previous < run {
                state.latest_run_number = run;
            }
            state.total_calls += 1;

            (
                Decision {
                    shutdown,
                    total_calls: state.total_calls,
                },
                previous,
            )
        };

        if decision.shutdown {
            tracing::debug!("run {run} is stale (latest is {previous}), telling it to shut down");
        } else if previous < run {
            tracing::info!("new run {run} (was {previous})");
        }

        decision
    }

    /// count a call whose run number could not be read. the latest run is left alone.
    pub fn record_invalid(&self) -> u64 {
        let mut state = self.lock();
        state.total_calls += 1;
        state.total_calls
    }

    pub fn snapshot(&self) -> GateState {
        *self.lock()
    }

    // the counters are never left half-updated, so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// why a `run` query parameter was not usable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidRun {
    #[error("missing `run` query parameter")]
    Missing,
    #[error("`run` is not a base 10 integer: {0:?}")]
    NotAnInteger(String),
    /// the query string itself could not be read, e.g. `run` given twice.
    #[error("malformed query string: {0}")]
    Malformed(String),
}

/// read a run number strictly: an optional sign followed by digits, nothing else.
pub fn parse_run_number(raw: Option<&str>) -> Result<i64, InvalidRun> {
    let raw = raw.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return Err(InvalidRun::Missing);
    }

    raw.parse()
        .map_err(|_| InvalidRun::NotAnInteger(raw.to_string()))
}
