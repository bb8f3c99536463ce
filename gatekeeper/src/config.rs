use std::{env, str::FromStr};

use anyhow::{Context, anyhow};

pub const DEFAULT_PORT: u16 = 8080;

/// what to do with a request whose `run` is missing or not an integer.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum InvalidRunPolicy {
    /// count the call and answer `shutdown: false`, leaving the latest run alone.
    #[default]
    Lenient,
    /// count the call and answer 400.
    Reject,
}

impl FromStr for InvalidRunPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(Self::Lenient),
            "reject" => Ok(Self::Reject),
            other => Err(anyhow!(
                "unknown invalid run policy {other:?}, expected `lenient` or `reject`"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub invalid_run_policy: InvalidRunPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            invalid_run_policy: InvalidRunPolicy::default(),
        }
    }
}

impl Config {
    /// read `GATEKEEPER_PORT` and `INVALID_RUN_POLICY`.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let port = match var("GATEKEEPER_PORT") {
            Some(port) => port
                .parse()
                .with_context(|| format!("configured port {port:?} is not a port number"))?,
            None => DEFAULT_PORT,
        };

        let invalid_run_policy = match var("INVALID_RUN_POLICY") {
            Some(policy) => policy.parse()?,
            None => InvalidRunPolicy::default(),
        };

        Ok(Self {
            port,
            invalid_run_policy,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn from_pairs(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        assert_eq!(from_pairs(&[]).unwrap(), Config::default());
        assert_eq!(Config::default().port, 8080);
        assert_eq!(
            Config::default().invalid_run_policy,
            InvalidRunPolicy::Lenient
        );
    }

    #[test]
    fn reads_vars() {
        let config = from_pairs(&[
            ("GATEKEEPER_PORT", "9000"),
            ("INVALID_RUN_POLICY", "Reject"),
        ])
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.invalid_run_policy, InvalidRunPolicy::Reject);
    }

    #[test]
    fn bad_values_are_errors() {
        assert!(from_pairs(&[("GATEKEEPER_PORT", "eighty")]).is_err());
        assert!(from_pairs(&[("GATEKEEPER_PORT", "70000")]).is_err());
        assert!(from_pairs(&[("INVALID_RUN_POLICY", "ignore")]).is_err());
    }
}
