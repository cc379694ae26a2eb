//! # Admiralty Tide Data Fetching
//!
//! This module handles all network operations for fetching tidal height
//! predictions from the UK Admiralty Tidal API (premium tier).
//!
//! ## Data Source
//!
//! ### Admiralty UK Tidal API
//! - **URL**: https://admiraltyapi.azure-api.net/uktidalapi-premium/api/V2
//! - **Auth**: `Ocp-Apim-Subscription-Key` header
//! - **Endpoints used**:
//!   - `Stations/{id}/TidalHeight?DateTime=...`: height at one instant
//!   - `Stations/{id}/TidalHeights?StartDateTime=...&EndDateTime=...&IntervalInMinutes=60`:
//!     hourly series over a window
//! - **Format**: JSON `{"DateTime": "2024-07-01T12:00:00Z", "Height": 3.41}`,
//!   the series endpoint returns an array of the same objects
//!
//! ## Error Handling
//!
//! The module reports every failure as a [`TideError`]; it never retries on
//! its own beyond the shared [`RetryPolicy`](crate::http::RetryPolicy). The
//! caller decides what a failed station means for the report.

use crate::config::Config;
use crate::http::{build_client, send_with_retry, HttpError, RetryPolicy};
use crate::TideSample;
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur during tide data fetching and decoding.
#[derive(Error, Debug)]
pub enum TideError {
    /// Request failed or the provider answered with an error status
    #[error("tide provider: {0}")]
    Http(#[from] HttpError),

    /// Body was not the expected JSON
    #[error("tide response decode: {0}")]
    Decode(#[source] reqwest::Error),

    /// A `DateTime` field did not parse
    #[error("bad tide timestamp '{0}'")]
    Timestamp(String),

    #[error("could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Something that can answer tide questions for a station.
///
/// The report pipeline only talks to this trait so tests can feed it fixed
/// series.
#[async_trait]
pub trait TideSource: Send + Sync {
    /// Predicted height at `at`.
    async fn current_height(&self, station_id: &str, at: DateTime<Utc>) -> Result<f64, TideError>;

    /// Hourly predictions from `from` to `from + hours`, in provider order.
    async fn hourly_heights(
        &self,
        station_id: &str,
        from: DateTime<Utc>,
        hours: i64,
    ) -> Result<Vec<TideSample>, TideError>;
}

/// Timestamp format the API expects in query strings
const API_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// One `TidalHeight` object as returned by the provider.
#[derive(Debug, Deserialize)]
struct TidalHeight {
    #[serde(rename = "DateTime")]
    date_time: String,
    #[serde(rename = "Height")]
    height: f64,
}

impl TryFrom<TidalHeight> for TideSample {
    type Error = TideError;

    fn try_from(raw: TidalHeight) -> Result<Self, Self::Error> {
        Ok(TideSample {
            time: parse_provider_time(&raw.date_time)?,
            height_m: raw.height,
        })
    }
}

/// Parse a provider timestamp, which is UTC with or without a trailing `Z`.
pub fn parse_provider_time(text: &str) -> Result<DateTime<Utc>, TideError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| TideError::Timestamp(text.to_string()))
}

/// Client for the Admiralty UK Tidal API.
pub struct AdmiraltyClient {
    client: Client,
    base_url: String,
    subscription_key: String,
    retry: RetryPolicy,
}

impl AdmiraltyClient {
    pub fn new(config: &Config) -> Result<Self, TideError> {
        let client = build_client(config.http_timeout()).map_err(TideError::Client)?;
        Ok(Self {
            client,
            base_url: config.tide.base_url.trim_end_matches('/').to_string(),
            subscription_key: config.tide.subscription_key.clone(),
            retry: config.http.retry.clone(),
        })
    }

    fn station_url(&self, station_id: &str, endpoint: &str) -> String {
        format!("{}/Stations/{}/{}", self.base_url, station_id, endpoint)
    }
}

#[async_trait]
impl TideSource for AdmiraltyClient {
    async fn current_height(&self, station_id: &str, at: DateTime<Utc>) -> Result<f64, TideError> {
        let url = self.station_url(station_id, "TidalHeight");
        let when = at.format(API_TIME_FORMAT).to_string();

        let response = send_with_retry(
            || {
                self.client
                    .get(&url)
                    .header("Ocp-Apim-Subscription-Key", &self.subscription_key)
                    .query(&[("DateTime", when.as_str())])
            },
            &self.retry,
            &format!("TidalHeight {station_id}"),
        )
        .await?;

        let reading: TidalHeight = response
            .json()
            .await
            .map_err(|e| TideError::Decode(e.without_url()))?;
        debug!("Station {} height at {}: {:.2} m", station_id, when, reading.height);
        Ok(reading.height)
    }

    async fn hourly_heights(
        &self,
        station_id: &str,
        from: DateTime<Utc>,
        hours: i64,
    ) -> Result<Vec<TideSample>, TideError> {
        let url = self.station_url(station_id, "TidalHeights");
        let start = from.format(API_TIME_FORMAT).to_string();
        let end = (from + Duration::hours(hours))
            .format(API_TIME_FORMAT)
            .to_string();

        let response = send_with_retry(
            || {
                self.client
                    .get(&url)
                    .header("Ocp-Apim-Subscription-Key", &self.subscription_key)
                    .query(&[
                        ("StartDateTime", start.as_str()),
                        ("EndDateTime", end.as_str()),
                        ("IntervalInMinutes", "60"),
                    ])
            },
            &self.retry,
            &format!("TidalHeights {station_id}"),
        )
        .await?;

        let raw: Vec<TidalHeight> = response
            .json()
            .await
            .map_err(|e| TideError::Decode(e.without_url()))?;
        let samples = raw
            .into_iter()
            .map(TideSample::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        info!("Station {}: {} hourly heights", station_id, samples.len());
        Ok(samples)
    }
}
