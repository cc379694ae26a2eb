//! # Wind Outlook Fetching
//!
//! Current and next-day wind from the OpenWeatherMap One Call API. Only four
//! numbers of the (large) response are used:
//!
//! - `current.wind_speed`, `current.wind_deg`: today
//! - `daily[1].wind_speed`, `daily[1].wind_deg`: tomorrow (`daily[0]` is today)
//!
//! With `units=metric` speeds are in metres per second.

use crate::config::Config;
use crate::http::{build_client, send_with_retry, HttpError, RetryPolicy};
use crate::{Coordinate, WindObservation};
use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum WeatherError {
    #[error("weather provider: {0}")]
    Http(#[from] HttpError),

    #[error("weather response decode: {0}")]
    Decode(#[source] reqwest::Error),

    /// `daily` held fewer than two entries
    #[error("weather response has no forecast for tomorrow")]
    MissingTomorrow,

    #[error("could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Today's and tomorrow's wind at one place.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WindOutlook {
    pub today: WindObservation,
    pub tomorrow: WindObservation,
}

#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn wind_outlook(&self, at: Coordinate) -> Result<WindOutlook, WeatherError>;
}

/// One Call response structures and conversion into [`WindOutlook`]
mod onecall {
    use super::{WeatherError, WindOutlook};
    use crate::WindObservation;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct Response {
        pub current: Wind,
        #[serde(default)]
        pub daily: Vec<Wind>,
    }

    /// The wind fields shared by `current` and `daily[]` entries
    #[derive(Debug, Deserialize)]
    pub struct Wind {
        pub wind_speed: f64,
        pub wind_deg: f64,
    }

    impl Wind {
        fn observation(&self) -> WindObservation {
            WindObservation {
                speed_ms: self.wind_speed,
                direction_deg: self.wind_deg,
            }
        }
    }

    impl Response {
        pub fn into_outlook(self) -> Result<WindOutlook, WeatherError> {
            let tomorrow = self.daily.get(1).ok_or(WeatherError::MissingTomorrow)?;
            Ok(WindOutlook {
                today: self.current.observation(),
                tomorrow: tomorrow.observation(),
            })
        }
    }
}

/// Client for the OpenWeatherMap One Call endpoint.
pub struct OpenWeatherClient {
    client: Client,
    base_url: String,
    api_key: String,
    units: String,
    retry: RetryPolicy,
}

impl OpenWeatherClient {
    pub fn new(config: &Config) -> Result<Self, WeatherError> {
        let client = build_client(config.http_timeout()).map_err(WeatherError::Client)?;
        Ok(Self {
            client,
            base_url: config.weather.base_url.clone(),
            api_key: config.weather.api_key.clone(),
            units: config.weather.units.clone(),
            retry: config.http.retry.clone(),
        })
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherClient {
    async fn wind_outlook(&self, at: Coordinate) -> Result<WindOutlook, WeatherError> {
        let lat = at.lat.to_string();
        let lon = at.lon.to_string();

        let response = send_with_retry(
            || {
                self.client.get(&self.base_url).query(&[
                    ("lat", lat.as_str()),
                    ("lon", lon.as_str()),
                    ("units", self.units.as_str()),
                    ("appid", self.api_key.as_str()),
                ])
            },
            &self.retry,
            &format!("One Call {lat},{lon}"),
        )
        .await?;

        let body: onecall::Response = response
            .json()
            .await
            .map_err(|e| WeatherError::Decode(e.without_url()))?;
        let outlook = body.into_outlook()?;
        debug!("Wind at {},{}: {:?}", lat, lon, outlook);
        Ok(outlook)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_today_and_tomorrow() {
        let body = r#"{
            "lat": 50.1552, "lon": -5.0688, "timezone": "Europe/London",
            "current": {"dt": 1719835200, "temp": 17.2, "wind_speed": 6.17, "wind_deg": 250},
            "daily": [
                {"dt": 1719835200, "wind_speed": 7.0, "wind_deg": 240, "wind_gust": 12.1},
                {"dt": 1719921600, "wind_speed": 3.5, "wind_deg": 20.5}
            ]
        }"#;
        let parsed: onecall::Response = serde_json::from_str(body).unwrap();
        let outlook = parsed.into_outlook().unwrap();
        assert_eq!(outlook.today.speed_ms, 6.17);
        assert_eq!(outlook.today.direction_deg, 250.0);
        assert_eq!(outlook.tomorrow.speed_ms, 3.5);
        assert_eq!(outlook.tomorrow.direction_deg, 20.5);
    }

    #[tokio::test]
    async fn undecodable_body_does_not_reveal_api_key() {
        let (url, _) = crate::http::test_server::serve("200 OK", "not json").await;
        let mut config = Config::default();
        config.weather.base_url = url;
        config.weather.api_key = "SECRETKEY123".into();
        let client = OpenWeatherClient::new(&config).unwrap();

        let err = client
            .wind_outlook(Coordinate { lat: 50.0, lon: -5.0 })
            .await
            .unwrap_err();

        assert!(matches!(err, WeatherError::Decode(_)));
        assert!(!err.to_string().contains("SECRETKEY123"));
        assert!(!format!("{err:?}").contains("SECRETKEY123"));
    }

    #[test]
    fn short_daily_list_is_an_error() {
        let body = r#"{"current": {"wind_speed": 1.0, "wind_deg": 0}, "daily": []}"#;
        let parsed: onecall::Response = serde_json::from_str(body).unwrap();
        assert!(matches!(
            parsed.into_outlook(),
            Err(WeatherError::MissingTomorrow)
        ));
    }
}
