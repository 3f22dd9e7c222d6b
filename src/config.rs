use std::time::Duration;

use crate::error::Error;
use crate::sampler::LatencyThreshold;

/// Collector endpoint used when none is configured.
pub const DEFAULT_STATS_URL: &str = "https://api.deferpanic.com/v1/stats/create";

/// Per-POST timeout for the reporter's HTTP client.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

pub const ENV_TOKEN: &str = "DEFERSTATS_TOKEN";
pub const ENV_URL: &str = "DEFERSTATS_URL";
pub const ENV_THRESHOLD_MS: &str = "DEFERSTATS_THRESHOLD_MS";

/// Everything a `Client` needs. Read-only once the client is built.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Sent as `Authorization: Bearer <token>` on every report
    pub token: String,
    pub stats_url: String,
    pub latency_threshold: LatencyThreshold,
    pub request_timeout: Duration,
}

impl ClientConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            stats_url: DEFAULT_STATS_URL.to_owned(),
            latency_threshold: LatencyThreshold::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn stats_url(mut self, url: impl Into<String>) -> Self {
        self.stats_url = url.into();
        self
    }

    pub fn latency_threshold(mut self, threshold: impl Into<LatencyThreshold>) -> Self {
        self.latency_threshold = threshold.into();
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Loads config from `DEFERSTATS_TOKEN` (required), `DEFERSTATS_URL`
    /// and `DEFERSTATS_THRESHOLD_MS` (signed; negative captures everything).
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let token = lookup(ENV_TOKEN).ok_or(Error::MissingToken)?;
        let mut config = Self::new(token);

        if let Some(url) = lookup(ENV_URL) {
            config.stats_url = url;
        }
        if let Some(raw) = lookup(ENV_THRESHOLD_MS) {
            let ms = raw
                .trim()
                .parse::<i64>()
                .map_err(|source| Error::InvalidThreshold {
                    value: raw.clone(),
                    source,
                })?;
            config.latency_threshold = LatencyThreshold::from_millis(ms);
        }

        config.validate()?;
        Ok(config)
    }

    pub(crate) fn validate(&self) -> Result<(), Error> {
        if self.token.trim().is_empty() {
            return Err(Error::MissingToken);
        }
        Ok(())
    }
}
