use std::sync::Arc;

use tokio::signal;
use tracing::instrument;

use crate::AppState;

/// resolves on ctrl+c or sigterm, then logs where the gate stood.
#[instrument(skip_all)]
pub async fn shutdown(state: Arc<AppState>) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl+c: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!("failed to install sigterm handler: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    let gate = state.gatekeeper.snapshot();
    tracing::info!(
        latest_run_number = gate.latest_run_number,
        total_calls = gate.total_calls,
        "shutting down.."
    );
}
