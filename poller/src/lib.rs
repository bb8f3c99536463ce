//! worker side of the gate: poll until told that a newer run exists.

use std::{env, time::Duration};

use anyhow::{Context, anyhow};
use common::Decision;
use rand::Rng;
use reqwest::{Client, Url};

pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollerConfig {
    /// the run this worker belongs to.
    pub run_number: i64,
    /// gatekeeper root, without the query.
    pub base: Url,
}

impl PollerConfig {
    /// read `RUN_NUMBER`, `GATEKEEPER_HOST` and `GATEKEEPER_PORT`.
    ///
    /// inside kubernetes the host and port fall back to the service vars
    /// injected for a service named `gatekeeper`, then to those of the older
    /// `webserver-service` deployment.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let run_number = var("RUN_NUMBER").context("no RUN_NUMBER env var")?;
        let run_number = run_number
            .trim()
            .parse()
            .with_context(|| format!("RUN_NUMBER {run_number:?} is not an int"))?;

        let host = var("GATEKEEPER_HOST")
            .or_else(|| var("GATEKEEPER_SERVICE_HOST"))
            .or_else(|| var("WEBSERVER_SERVICE_SERVICE_HOST"))
            .context("no GATEKEEPER_HOST env var")?;

        let port = var("GATEKEEPER_PORT")
            .or_else(|| var("GATEKEEPER_SERVICE_PORT"))
            .or_else(|| var("WEBSERVER_SERVICE_SERVICE_PORT"));
        let port = match port {
            Some(port) => port
                .parse()
                .with_context(|| format!("configured port {port:?} is not a port number"))?,
            None => DEFAULT_PORT,
        };

        let base = Url::parse(&format!("http://{host}:{port}/"))
            .with_context(|| format!("{host:?} is not a usable host"))?;

        Ok(Self { run_number, base })
    }

    /// the url to poll: `<base>?run=<run_number>`.
    pub fn url(&self) -> Url {
        let mut url = self.base.clone();
        url.query_pairs_mut()
            .clear()
            .append_pair("run", &self.run_number.to_string());
        url
    }
}

/// ask the gatekeeper once.
pub async fn poll_once(client: &Client, url: &Url) -> anyhow::Result<Decision> {
    let resp = client
        .get(url.clone())
        .send()
        .await
        .with_context(|| format!("could not reach the gatekeeper at {url}"))?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(anyhow!("gatekeeper answered {status}: {body}"));
    }

    resp.json()
        .await
        .context("gatekeeper answer was not a decision")
}

/// a random even number of seconds in `[4, 30)`.
pub fn poll_delay(rng: &mut impl Rng) -> Duration {
    Duration::from_secs(rng.gen_range(2..15) * 2)
}

/// poll until told to shut down, sleeping `delay()` between polls.
///
/// returns how many polls it took. any failed poll ends the loop.
pub async fn run(
    client: &Client,
    config: &PollerConfig,
    mut delay: impl FnMut() -> Duration,
) -> anyhow::Result<u32> {
    let url = config.url();
    let mut polls = 0;

    loop {
        let decision = poll_once(client, &url).await?;
        polls += 1;

        if decision.shutdown {
            tracing::info!(
                "run {} has been superseded after {polls} polls, shutting down",
                config.run_number
            );
            return Ok(polls);
        }

        let wait = delay();
        tracing::debug!(
            total_calls = decision.total_calls,
            "run {} is current, polling again in {wait:?}",
            config.run_number
        );
        tokio::time::sleep(wait).await;
    }
}
