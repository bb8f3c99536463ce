use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::{Decision, Rejection};
use serde::Deserialize;

use super::AppState;
use crate::{
    config::InvalidRunPolicy,
    gate::{InvalidRun, parse_run_number},
};

#[derive(Debug, Default, Deserialize)]
pub struct RunQuery {
    pub run: Option<String>,
}

/// `GET /?run=<n>`: tell the caller whether its run has been superseded.
///
/// a query string that cannot be read at all goes through the same
/// invalid-run policy as a bad `run` value.
pub async fn gate(
    State(state): AppState,
    query: Result<Query<RunQuery>, QueryRejection>,
) -> Response {
    let run = match query {
        Ok(Query(query)) => parse_run_number(query.run.as_deref()),
        Err(rejection) => Err(InvalidRun::Malformed(rejection.body_text())),
    };

    let run = match run {
        Ok(run) => run,
        Err(err) => {
            let total_calls = state.gatekeeper.record_invalid();
            tracing::warn!("{err}");

            return match state.invalid_run_policy {
                InvalidRunPolicy::Lenient => Json(Decision {
                    shutdown: false,
                    total_calls,
                })
                .into_response(),
                InvalidRunPolicy::Reject => (
                    StatusCode::BAD_REQUEST,
                    Json(Rejection {
                        error: err.to_string(),
                        total_calls,
                    }),
                )
                    .into_response(),
            };
        }
    };

    let decision = state.gatekeeper.evaluate(run);
    tracing::debug!(
        run,
        shutdown = decision.shutdown,
        total_calls = decision.total_calls,
        "decided"
    );

    Json(decision).into_response()
}
