use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.openai.com";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_SIMULATED_DELAY_MS: u64 = 1000;

/// Process-wide settings, read once at startup and injected into the relay.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub api_base: String,
    pub host: String,
    pub port: u16,
    pub simulated_delay: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup. An empty `OPENAI_API_KEY`
    /// counts as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("OPENAI_API_KEY")
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        let api_base = lookup("OPENAI_API_BASE")
            .filter(|b| !b.trim().is_empty())
            .map(|b| b.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("PORT must be a valid port number, got {:?}", raw))?,
            None => DEFAULT_PORT,
        };

        let delay_ms = match lookup("SIMULATED_DELAY_MS") {
            Some(raw) => raw.parse::<u64>().with_context(|| {
                format!("SIMULATED_DELAY_MS must be a number of milliseconds, got {:?}", raw)
            })?,
            None => DEFAULT_SIMULATED_DELAY_MS,
        };

        Ok(Self {
            api_key,
            api_base,
            host,
            port,
            simulated_delay: Duration::from_millis(delay_ms),
        })
    }
}
