use std::{
    env,
    net::{Ipv4Addr, SocketAddrV4},
    sync::Arc,
};

use anyhow::Context;
use gatekeeper::{AppState, Config, app, tasks};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[cfg(target_env = "msvc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = dotenvy::dotenv();

    // RUST_LOG goes last so it can override the defaults.
    let filter = format!(
        "info,hyper_util=off,{}",
        env::var(EnvFilter::DEFAULT_ENV).unwrap_or_default()
    );
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::builder().parse_lossy(filter))
        .compact()
        .init();

    if let Err(err) = dotenv {
        tracing::warn!("could not load .env: {err}");
    }

    let config = Config::from_env().context("invalid configuration")?;
    let app_state = Arc::new(AppState::new(config.invalid_run_policy));

    let ip = SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, config.port);

    tracing::info!("running gatekeeper on :{}", config.port);
    tracing::info!("invalid run numbers are handled as {:?}", config.invalid_run_policy);

    let listener = TcpListener::bind(ip)
        .await
        .with_context(|| format!("could not bind {ip}"))?;
    axum::serve(listener, app(app_state.clone()))
        .with_graceful_shutdown(tasks::shutdown(app_state))
        .await?;

    Ok(())
}
