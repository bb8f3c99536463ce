//! tells polling workers whether a newer run has replaced theirs.
//!
//! the gate holds the highest run number seen and a call counter. it lives
//! in memory only, so exactly one instance should be running at a time.

pub mod config;
pub mod gate;
pub mod helpers;
mod routes;
pub mod tasks;

use std::{fmt::Debug, sync::Arc, time::Duration};

use axum::{Router, http::StatusCode, middleware, routing::get};
use tower_http::timeout::TimeoutLayer;

pub use config::{Config, InvalidRunPolicy};
pub use gate::{GateState, Gatekeeper};

/// how long a single poll may take before it is answered with 408.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

pub struct AppState {
    pub gatekeeper: Gatekeeper,
    pub invalid_run_policy: InvalidRunPolicy,
}

impl Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("gate", &self.gatekeeper.snapshot())
            .field("invalid_run_policy", &self.invalid_run_policy)
            .finish()
    }
}

impl AppState {
    pub fn new(invalid_run_policy: InvalidRunPolicy) -> Self {
        AppState {
            gatekeeper: Gatekeeper::new(),
            invalid_run_policy,
        }
    }
}

/// the whole http surface: `GET /?run=<n>`.
pub fn app(state: Arc<AppState>) -> Router {
    layered(Router::new().route("/", get(routes::gate)).with_state(state))
}

// trace sits outside the timeout so 408s are logged like any other failure.
fn layered(router: Router) -> Router {
    router
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            REQUEST_TIMEOUT,
        ))
        .layer(middleware::from_fn(helpers::trace))
}
