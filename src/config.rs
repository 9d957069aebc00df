/// Feed configuration
///
/// Everything a feed, aggregator and manager need at construction time.
/// Invalid values are rejected here so that nothing fails mid-cycle.

use crate::decoder::FeedFormat;
use crate::geo::GeoPoint;
use crate::statistics::DEFAULT_STATISTICS_CACHE_SIZE;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_HOSTNAME: &str = "localhost";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_CALLSIGN_CACHE_SIZE: usize = 250;
pub const DEFAULT_COORDINATE_CACHE_SIZE: usize = 250;
pub const DEFAULT_HISTORY_SIZE: usize = 10;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cache capacity must be positive, got {0}")]
    InvalidCapacity(usize),

    #[error("home coordinates out of range: {0}")]
    InvalidHome(GeoPoint),

    #[error("filter radius must be a non-negative number of km, got {0}")]
    InvalidRadius(f64),

    #[error("fetch timeout must be positive")]
    InvalidTimeout,

    #[error("feed endpoint is empty")]
    EmptyEndpoint,

    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Only `home` is required when deserializing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FeedConfig {
    #[serde(default)]
    pub format: FeedFormat,
    pub home: GeoPoint,
    #[serde(default)]
    pub filter_radius_km: Option<f64>,
    /// Explicit endpoint; takes precedence over hostname/port
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_hostname")]
    pub hostname: String,
    /// Defaults to the format's port
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_callsign_cache_size")]
    pub callsign_cache_size: usize,
    #[serde(default = "default_coordinate_cache_size")]
    pub coordinate_cache_size: usize,
    #[serde(default = "default_statistics_cache_size")]
    pub statistics_cache_size: usize,
    #[serde(default = "default_history_size")]
    pub history_size: usize,
}

fn default_hostname() -> String {
    DEFAULT_HOSTNAME.to_string()
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_callsign_cache_size() -> usize {
    DEFAULT_CALLSIGN_CACHE_SIZE
}

fn default_coordinate_cache_size() -> usize {
    DEFAULT_COORDINATE_CACHE_SIZE
}

fn default_statistics_cache_size() -> usize {
    DEFAULT_STATISTICS_CACHE_SIZE
}

fn default_history_size() -> usize {
    DEFAULT_HISTORY_SIZE
}

impl FeedConfig {
    pub fn new(format: FeedFormat, home: GeoPoint) -> Self {
        FeedConfig {
            format,
            home,
            filter_radius_km: None,
            url: None,
            hostname: default_hostname(),
            port: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            callsign_cache_size: DEFAULT_CALLSIGN_CACHE_SIZE,
            coordinate_cache_size: DEFAULT_COORDINATE_CACHE_SIZE,
            statistics_cache_size: DEFAULT_STATISTICS_CACHE_SIZE,
            history_size: DEFAULT_HISTORY_SIZE,
        }
    }

    pub fn with_filter_radius(mut self, radius_km: f64) -> Self {
        self.filter_radius_km = Some(radius_km);
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_host(mut self, hostname: impl Into<String>, port: u16) -> Self {
        self.hostname = hostname.into();
        self.port = Some(port);
        self
    }

    /// Sub-millisecond precision is dropped; anything below 1 ms is rejected
    /// by `validate()`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_cache_sizes(mut self, callsigns: usize, coordinates: usize, statistics: usize) -> Self {
        self.callsign_cache_size = callsigns;
        self.coordinate_cache_size = coordinates;
        self.statistics_cache_size = statistics;
        self
    }

    pub fn with_history_size(mut self, size: usize) -> Self {
        self.history_size = size;
        self
    }

    /// The URL fetched every cycle
    pub fn endpoint(&self) -> String {
        match &self.url {
            Some(url) => url.clone(),
            None => self
                .format
                .url(&self.hostname, self.port.unwrap_or_else(|| self.format.default_port())),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.home.is_in_range() {
            return Err(ConfigError::InvalidHome(self.home));
        }
        if let Some(radius) = self.filter_radius_km {
            if !radius.is_finite() || radius < 0.0 {
                return Err(ConfigError::InvalidRadius(radius));
            }
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        let url_is_blank = self.url.as_deref().is_some_and(|url| url.trim().is_empty());
        if url_is_blank || (self.url.is_none() && self.hostname.trim().is_empty()) {
            return Err(ConfigError::EmptyEndpoint);
        }
        for size in [
            self.callsign_cache_size,
            self.coordinate_cache_size,
            self.statistics_cache_size,
            self.history_size,
        ] {
            if size == 0 {
                return Err(ConfigError::InvalidCapacity(size));
            }
        }
        Ok(())
    }
}
