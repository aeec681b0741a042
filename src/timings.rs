// Module containing response data structures for the timings endpoint
mod response;

pub use response::{ApiResponse, PrayerTimings, TimingsData};

use crate::{config::Config, error::AppError};
use tracing::{debug, error, info, warn};

const TIMINGS_BY_ADDRESS_PATH: &str = "timingsByAddress";

/// HTTP client for the AlAdhan `timingsByAddress` endpoint.
#[derive(Debug, Clone)]
pub struct TimingsClient {
    http: reqwest::Client,
    config: Config,
}

impl TimingsClient {
    /// Builds a client whose requests are bounded by `config.timeout`.
    pub fn new(config: Config) -> Result<Self, AppError> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(AppError::Network)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Request URL with the address encoded as a query parameter
    pub fn url(&self) -> String {
        format!(
            "{}/{}?address={}",
            self.config.endpoint.trim_end_matches('/'),
            TIMINGS_BY_ADDRESS_PATH,
            urlencoding::encode(&self.config.address)
        )
    }

    /// Fetches today's timings for the configured address.
    ///
    /// # Returns
    /// * `Some(PrayerTimings)` when the body carries `data.timings`
    /// * `None` when the body is not JSON or lacks `data.timings`
    /// * Error if the request fails, times out or returns a non-2xx status
    pub async fn fetch(&self) -> Result<Option<PrayerTimings>, AppError> {
        info!("Fetching prayer timings for address: {}", self.config.address);

        let response = self.http.get(self.url()).send().await?;

        if !response.status().is_success() {
            error!("Failed to fetch prayer timings: {}", response.status());
            return Err(AppError::HttpStatus(response.status().as_u16()));
        }

        let body = response.text().await?;
        match serde_json::from_str::<ApiResponse>(&body) {
            Ok(api_response) => {
                debug!(
                    "Timings response: code={:?} status={:?}",
                    api_response.code, api_response.status
                );
                let timings = api_response.into_timings();
                match &timings {
                    Some(timings) => debug!("Prayer timings fetched successfully: {:?}", timings),
                    None => warn!("Response carries no data.timings"),
                }
                Ok(timings)
            }
            Err(e) => {
                warn!("Unparsable timings response: {}", e);
                Ok(None)
            }
        }
    }
}
