use std::{env, time::Duration};

use reqwest::Url;
use tracing::warn;

use crate::error::AppError;

/// AlAdhan API base, served over TLS
pub const DEFAULT_ENDPOINT: &str = "https://api.aladhan.com/v1";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub const ADDRESS_VAR: &str = "PRAYER_TIMINGS_ADDRESS";
pub const ENDPOINT_VAR: &str = "PRAYER_TIMINGS_ENDPOINT";
pub const TIMEOUT_VAR: &str = "PRAYER_TIMINGS_TIMEOUT_SECS";

/// Values given on the command line. Each one, when set, shadows the
/// matching environment variable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub address: Option<String>,
    pub endpoint: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Where and how to fetch timings for one address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// API base URL, without the `/timingsByAddress` path
    pub endpoint: String,
    /// Free-text geocoded address sent upstream
    pub address: String,
    /// Upper bound for the whole request
    pub timeout: Duration,
}

impl Config {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            address: address.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Reads the configuration from the process environment, except for the
    /// values `overrides` already provides.
    pub fn from_env(overrides: &Overrides) -> Result<Self, AppError> {
        Self::resolve(overrides, |key| env::var(key).ok())
    }

    /// Layers `overrides` over `lookup`; a shadowed variable is never read.
    pub fn resolve<F>(overrides: &Overrides, lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::from_lookup(|key| match key {
            ADDRESS_VAR if overrides.address.is_some() => overrides.address.clone(),
            ENDPOINT_VAR if overrides.endpoint.is_some() => overrides.endpoint.clone(),
            TIMEOUT_VAR if overrides.timeout_secs.is_some() => overrides.timeout_secs.map(|secs| secs.to_string()),
            _ => lookup(key),
        })
    }

    /// Builds a configuration from any key lookup, e.g. a map in tests.
    ///
    /// Only parsing happens here; [`Config::validate`] runs when a
    /// `TimingsClient` is built from the result.
    ///
    /// # Errors
    /// * `AppError::EnvVarNotSet` if the address is absent
    /// * `AppError::InvalidConfig` if the timeout is not a whole number
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let address = lookup(ADDRESS_VAR).ok_or_else(|| AppError::EnvVarNotSet(ADDRESS_VAR.to_string()))?;
        let mut config = Config::new(address);

        if let Some(endpoint) = lookup(ENDPOINT_VAR) {
            config = config.with_endpoint(endpoint);
        }

        if let Some(raw) = lookup(TIMEOUT_VAR) {
            let secs: u64 = raw
                .trim()
                .parse()
                .map_err(|_| AppError::InvalidConfig(format!("{} must be a whole number of seconds, got {:?}", TIMEOUT_VAR, raw)))?;
            config = config.with_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }

    /// Checks the endpoint, address and timeout.
    ///
    /// A plaintext endpoint is allowed but logged unless it targets a loopback host.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.address.trim().is_empty() {
            return Err(AppError::InvalidConfig("address must not be empty".to_string()));
        }
        if self.timeout.is_zero() {
            return Err(AppError::InvalidConfig("timeout must be greater than zero".to_string()));
        }

        let url = Url::parse(&self.endpoint)
            .map_err(|e| AppError::InvalidConfig(format!("endpoint {:?}: {}", self.endpoint, e)))?;
        match url.scheme() {
            "https" => {}
            "http" => {
                let loopback = matches!(url.host_str(), Some("localhost" | "127.0.0.1" | "[::1]"));
                if !loopback {
                    warn!("Endpoint {} is not encrypted; prefer https", self.endpoint);
                }
            }
            other => {
                return Err(AppError::InvalidConfig(format!("unsupported endpoint scheme: {}", other)));
            }
        }

        Ok(())
    }
}
