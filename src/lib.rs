//! # Harbour Tides Core Library
//!
//! This library holds the data types and pipeline stages behind the harbour tides
//! report: a single HTML table that tells a skipper, for each destination, when
//! the tide is inside the navigable band and what the wind is doing today and
//! tomorrow.
//!
//! ## Data Flow
//! 1. **Time grid**: 14 hourly slots from "now", labelled in London civil time
//! 2. **Tides**: current height plus an hourly series per station (Admiralty API)
//! 3. **Filter**: keep samples inside the destination's tide band that are not
//!    more than 30 minutes in the past
//! 4. **Wind**: today's and tomorrow's wind per destination (OpenWeatherMap),
//!    classified into force and compass labels
//! 5. **Render**: static HTML table
//! 6. **Publish**: write to disk and upload over SFTP
//!
//! Every stage after the time grid degrades per destination: a failed request
//! leaves that destination's cells blank and the run carries on.
//!
//! ## Core Types
//! - [`TideSample`]: one height reading from the tide provider
//! - [`TideBand`]: the inclusive navigable window for a destination
//! - [`Coordinate`]: where to ask the weather provider about
//! - [`WindObservation`]: raw wind speed and direction before classification

use serde::{Deserialize, Serialize};

use chrono::{DateTime, Utc};

pub mod config;
pub mod http;
pub mod pipeline;
pub mod publish;
pub mod report;
pub mod tide_data;
pub mod tide_filter;
pub mod time_grid;
pub mod weather;
pub mod wind;

/// A single tide height reading at an absolute instant.
///
/// # Example
/// ```
/// use chrono::{TimeZone, Utc};
/// use harbour_tides_lib::TideSample;
///
/// let sample = TideSample {
///     time: Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap(),
///     height_m: 3.4,
/// };
/// assert_eq!(sample.height_m, 3.4);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TideSample {
    /// Instant of the reading (UTC)
    pub time: DateTime<Utc>,
    /// Height above chart datum in metres
    pub height_m: f64,
}

/// Inclusive tide height window in which a destination is navigable.
///
/// A wide upper bound (10 m on UK south-west coasts) effectively means
/// "no maximum"; a lower bound of zero means "no minimum".
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TideBand {
    /// Minimum navigable height in metres
    pub min_m: f64,
    /// Maximum navigable height in metres
    pub max_m: f64,
}

impl TideBand {
    pub fn new(min_m: f64, max_m: f64) -> Self {
        Self { min_m, max_m }
    }

    /// True when `height_m` lies inside the band, bounds included.
    ///
    /// ```
    /// use harbour_tides_lib::TideBand;
    ///
    /// let band = TideBand::new(1.5, 10.0);
    /// assert!(band.contains(1.5));
    /// assert!(band.contains(10.0));
    /// assert!(!band.contains(1.49));
    /// ```
    pub fn contains(&self, height_m: f64) -> bool {
        self.min_m <= height_m && height_m <= self.max_m
    }
}

/// Geographic position in decimal degrees (WGS84).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

/// Raw wind reading as reported by the weather provider.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WindObservation {
    /// Wind speed in metres per second
    pub speed_ms: f64,
    /// Direction the wind blows from, degrees clockwise from north
    pub direction_deg: f64,
}
