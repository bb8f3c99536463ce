use std::env;

use anyhow::Context;
use poller::{PollerConfig, poll_delay, run};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = dotenvy::dotenv();

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

    let config = PollerConfig::from_env().context("invalid configuration")?;
    tracing::info!("polling {} for run {}", config.base, config.run_number);

    let client = reqwest::Client::new();
    run(&client, &config, || poll_delay(&mut rand::thread_rng())).await?;

    Ok(())
}
