//! # Configuration Management
//!
//! This module handles loading and parsing configuration from the tide-report.toml
//! file. The compiled-in defaults carry the full destination table, so the
//! program runs with no file at all; a file only needs the sections it changes.
//!
//! Secrets never need to live in the file. These environment variables take
//! precedence over anything loaded:
//!
//! | Variable              | Field                      |
//! |-----------------------|----------------------------|
//! | `ADMIRALTY_API_KEY`   | `tide.subscription_key`    |
//! | `OPENWEATHER_API_KEY` | `weather.api_key`          |
//! | `SFTP_PASSWORD`       | `publish.password`         |

use crate::http::RetryPolicy;
use crate::{Coordinate, TideBand};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// Default configuration file, resolved against the working directory
pub const DEFAULT_CONFIG_PATH: &str = "tide-report.toml";

/// Problems found while validating or saving a configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("destination '{destination}' refers to unknown station '{station}'")]
    UnknownStation {
        destination: String,
        station: String,
    },

    #[error("destination '{0}' has min height above max height")]
    InvertedBand(String),

    #[error("duplicate destination name '{0}'")]
    DuplicateDestination(String),

    #[error("report.slot_count must be at least 1")]
    NoSlots,

    #[error("could not serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("could not write configuration: {0}")]
    Io(#[from] std::io::Error),
}

/// Application configuration loaded from tide-report.toml
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Admiralty tidal API settings
    pub tide: TideApiConfig,
    /// OpenWeatherMap settings
    pub weather: WeatherApiConfig,
    /// Timeouts and retry policy shared by both providers
    pub http: HttpConfig,
    /// Output file and time grid
    pub report: ReportConfig,
    /// SFTP upload target
    pub publish: PublishConfig,
    /// Tide gauges, by name
    pub stations: Vec<Station>,
    /// Destinations in column order
    pub destinations: Vec<Destination>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct TideApiConfig {
    pub base_url: String,
    /// Sent as `Ocp-Apim-Subscription-Key`
    pub subscription_key: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct WeatherApiConfig {
    pub base_url: String,
    pub api_key: String,
    /// `metric` gives wind speed in m/s
    pub units: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_seconds: u64,
    pub retry: RetryPolicy,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct ReportConfig {
    pub output_path: PathBuf,
    /// Number of hourly rows, starting at "now"
    pub slot_count: usize,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct PublishConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Destination path on the server, relative to the login directory
    pub remote_path: PathBuf,
    /// OpenSSH known_hosts file; when unset the host key is not checked
    pub known_hosts: Option<PathBuf>,
}

/// A tide gauge known to the provider.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Station {
    pub name: String,
    /// Provider identifier, e.g. "0005" or "0004A"
    pub id: String,
}

/// A place the report has a column for.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Destination {
    pub name: String,
    /// Name of the [`Station`] whose predictions apply here
    pub station: String,
    pub band: TideBand,
    pub coordinate: Coordinate,
}

impl Default for TideApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://admiraltyapi.azure-api.net/uktidalapi-premium/api/V2".to_string(),
            subscription_key: String::new(),
        }
    }
}

impl Default for WeatherApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openweathermap.org/data/2.5/onecall".to_string(),
            api_key: String::new(),
            units: "metric".to_string(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 20,
            retry: RetryPolicy::default(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from("tides_table.html"),
            slot_count: crate::time_grid::SLOT_COUNT,
        }
    }
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 22,
            username: String::new(),
            password: String::new(),
            remote_path: PathBuf::from("tides_table.html"),
            known_hosts: None,
        }
    }
}

fn station(name: &str, id: &str) -> Station {
    Station {
        name: name.to_string(),
        id: id.to_string(),
    }
}

fn destination(name: &str, station: &str, band: (f64, f64), at: (f64, f64)) -> Destination {
    Destination {
        name: name.to_string(),
        station: station.to_string(),
        band: TideBand::new(band.0, band.1),
        coordinate: Coordinate {
            lat: at.0,
            lon: at.1,
        },
    }
}

/// Admiralty gauges used by the default destinations (and a few spares).
pub fn default_stations() -> Vec<Station> {
    vec![
        station("Dover", "0089"),
        station("Portland", "0033"),
        station("Dartmouth", "0023"),
        station("Fowey", "0008"),
        station("Falmouth", "0005"),
        station("Helford", "0004A"),
        station("Lizard Point", "0003"),
        station("Penzance", "0002"),
        station("Great Yarmouth", "0142"),
    ]
}

/// Default destination table, in report column order.
///
/// An upper bound of 10 m means "no maximum"; a lower bound of 0 m means
/// "no minimum".
pub fn default_destinations() -> Vec<Destination> {
    vec![
        destination("St Mawes Harbour", "Falmouth", (2.0, 10.0), (50.1552197, -5.0688262)),
        destination("The Pandora", "Falmouth", (3.2, 10.0), (50.1552197, -5.0688262)),
        destination("Helford Restaurants", "Helford", (3.5, 10.0), (50.0931362, -5.1369699)),
        destination("Fowey", "Fowey", (1.5, 10.0), (50.3357786, -4.6365952)),
        destination("Kynance Cove", "Lizard Point", (0.0, 1.5), (49.9687683, -5.2039246)),
        destination("St Michaels Mount", "Penzance", (3.2, 10.0), (50.1194794, -5.5352463)),
        destination("Salcombe", "Dartmouth", (1.5, 10.0), (50.2388158, -3.7726121)),
        destination("Great Yarmouth", "Great Yarmouth", (0.0, 10.0), (52.6071742, 1.7314845)),
    ]
}

impl Default for Config {
    fn default() -> Self {
        Config {
            tide: TideApiConfig::default(),
            weather: WeatherApiConfig::default(),
            http: HttpConfig::default(),
            report: ReportConfig::default(),
            publish: PublishConfig::default(),
            stations: default_stations(),
            destinations: default_destinations(),
        }
    }
}

impl Config {
    /// Load configuration from tide-report.toml
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load() -> Self {
        Self::load_from_path(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from specified path
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<Config>(&contents) {
                Ok(config) => {
                    info!(
                        "Loaded configuration from {} ({} destinations)",
                        path.display(),
                        config.destinations.len()
                    );
                    config
                }
                Err(e) => {
                    warn!("Invalid config file format in {}: {}", path.display(), e);
                    warn!("Using default configuration");
                    Self::default()
                }
            },
            Err(_) => {
                info!(
                    "No config file at {}, using default configuration",
                    path.display()
                );
                Self::default()
            }
        }
    }

    /// Replace secrets with values from the environment where set.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Copy with API keys and the SFTP password cleared, for writing to disk.
    pub fn without_secrets(mut self) -> Self {
        self.tide.subscription_key.clear();
        self.weather.api_key.clear();
        self.publish.password.clear();
        self
    }

    fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("ADMIRALTY_API_KEY") {
            self.tide.subscription_key = key;
        }
        if let Some(key) = lookup("OPENWEATHER_API_KEY") {
            self.weather.api_key = key;
        }
        if let Some(password) = lookup("SFTP_PASSWORD") {
            self.publish.password = password;
        }
        self
    }

    /// Check cross references and bounds that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.report.slot_count == 0 {
            return Err(ConfigError::NoSlots);
        }

        let mut seen = HashSet::new();
        for dest in &self.destinations {
            if !seen.insert(dest.name.as_str()) {
                return Err(ConfigError::DuplicateDestination(dest.name.clone()));
            }
            if dest.band.min_m > dest.band.max_m {
                return Err(ConfigError::InvertedBand(dest.name.clone()));
            }
            if self.station_id(&dest.station).is_none() {
                return Err(ConfigError::UnknownStation {
                    destination: dest.name.clone(),
                    station: dest.station.clone(),
                });
            }
        }
        Ok(())
    }

    /// Provider identifier for the named station.
    pub fn station_id(&self, station_name: &str) -> Option<&str> {
        self.stations
            .iter()
            .find(|s| s.name == station_name)
            .map(|s| s.id.as_str())
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_seconds)
    }

    /// Write the configuration as TOML, e.g. to seed an editable file.
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path.as_ref(), contents)?;
        info!("Configuration saved to {}", path.as_ref().display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.destinations.len(), 8);
        assert_eq!(config.destinations[0].name, "St Mawes Harbour");
        assert_eq!(config.station_id("Helford"), Some("0004A"));
        assert_eq!(config.report.slot_count, 14);
        assert_eq!(config.weather.units, "metric");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.destinations, parsed.destinations);
        assert_eq!(config.stations, parsed.stations);
        assert_eq!(config.http.retry, parsed.http.retry);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let config = Config::load_from_path("/nonexistent/path");
        // Should fallback to default
        assert_eq!(config.destinations.len(), 8);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let file = NamedTempFile::new().unwrap();
        fs::write(
            file.path(),
            r#"
[http]
timeout_seconds = 5

[http.retry]
max_retries = 1
initial_backoff_ms = 10
max_backoff_ms = 20

[[stations]]
name = "Falmouth"
id = "0005"

[[destinations]]
name = "Pendennis Point"
station = "Falmouth"
band = { min_m = 1.0, max_m = 4.0 }
coordinate = { lat = 50.14, lon = -5.04 }
"#,
        )
        .unwrap();

        let config = Config::load_from_path(file.path());
        assert_eq!(config.http.timeout_seconds, 5);
        assert_eq!(config.http.retry.max_retries, 1);
        assert_eq!(config.destinations.len(), 1);
        assert_eq!(config.destinations[0].band, TideBand::new(1.0, 4.0));
        assert_eq!(config.report.slot_count, 14);
        assert!(config.tide.base_url.contains("admiraltyapi"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_file_falls_back() {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), "destinations = 7").unwrap();
        let config = Config::load_from_path(file.path());
        assert_eq!(config.destinations.len(), 8);
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::default().with_overrides_from(|key| match key {
            "ADMIRALTY_API_KEY" => Some("tide-key".into()),
            "SFTP_PASSWORD" => Some("hunter2".into()),
            _ => None,
        });
        assert_eq!(config.tide.subscription_key, "tide-key");
        assert_eq!(config.publish.password, "hunter2");
        assert_eq!(config.weather.api_key, "");
    }

    #[test]
    fn test_validate_rejects_bad_tables() {
        let mut config = Config::default();
        config.destinations[1].station = "Atlantis".into();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnknownStation { .. })
        ));

        let mut config = Config::default();
        config.destinations[0].band = TideBand::new(4.0, 2.0);
        assert!(matches!(config.validate(), Err(ConfigError::InvertedBand(_))));

        let mut config = Config::default();
        let copy = config.destinations[0].clone();
        config.destinations.push(copy);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicateDestination(_))
        ));

        let mut config = Config::default();
        config.report.slot_count = 0;
        assert!(matches!(config.validate(), Err(ConfigError::NoSlots)));
    }

    #[test]
    fn test_save_and_reload() {
        let file = NamedTempFile::new().unwrap();
        let mut config = Config::default();
        config.publish.host = "files.example.net".into();
        config.save_to_path(file.path()).unwrap();

        let reloaded = Config::load_from_path(file.path());
        assert_eq!(reloaded.publish.host, "files.example.net");
        assert_eq!(reloaded.destinations, config.destinations);
    }

    #[test]
    fn test_saved_config_has_no_secrets() {
        let file = NamedTempFile::new().unwrap();
        let config = Config::default().with_overrides_from(|key| match key {
            "ADMIRALTY_API_KEY" => Some("tide-key".into()),
            "OPENWEATHER_API_KEY" => Some("wind-key".into()),
            "SFTP_PASSWORD" => Some("hunter2".into()),
            _ => None,
        });
        config.clone().without_secrets().save_to_path(file.path()).unwrap();

        let written = std::fs::read_to_string(file.path()).unwrap();
        for secret in ["tide-key", "wind-key", "hunter2"] {
            assert!(!written.contains(secret), "{secret} written to disk");
        }

        let reloaded = Config::load_from_path(file.path());
        assert_eq!(reloaded.publish.password, "");
        assert_eq!(reloaded.destinations, config.destinations);
        // The running configuration keeps its secrets
        assert_eq!(config.weather.api_key, "wind-key");
    }
}
