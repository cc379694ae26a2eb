//! # Report Assembly
//!
//! Walks the destination table in order and asks the weather and tide
//! sources about each one, strictly one request at a time. A failure only
//! blanks the cells it would have filled:
//!
//! - weather failure: the destination's four wind cells
//! - current height failure: its current height cell
//! - series failure: its hourly cells
//!
//! The run itself never fails here; the worst case is an empty table.

use crate::config::{Config, Destination};
use crate::report::{DestinationReport, Report};
use crate::tide_data::TideSource;
use crate::tide_filter::{align_to_slots, filter_tides};
use crate::time_grid;
use crate::weather::WeatherSource;
use crate::wind::WindSummary;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

/// Build the report for every configured destination.
pub async fn assemble_report<T, W>(
    config: &Config,
    tides: &T,
    weather: &W,
    now: DateTime<Utc>,
) -> Report
where
    T: TideSource,
    W: WeatherSource,
{
    let slot_count = config.report.slot_count;
    let slots = time_grid::build(now, slot_count);

    let mut destinations = Vec::with_capacity(config.destinations.len());
    for dest in &config.destinations {
        let wind = fetch_wind(weather, dest).await;
        let (current_height_m, slot_heights) =
            fetch_tides(config, tides, dest, now, slot_count).await;

        destinations.push(DestinationReport {
            name: dest.name.clone(),
            wind,
            current_height_m,
            slot_heights,
        });
    }

    let navigable = destinations
        .iter()
        .map(|d| d.slot_heights.iter().filter(|h| h.is_some()).count())
        .sum::<usize>();
    info!(
        "Assembled report: {} destinations, {} slots, {} navigable cells",
        destinations.len(),
        slots.len(),
        navigable
    );

    Report {
        generated_at: now,
        slots,
        destinations,
    }
}

async fn fetch_wind<W>(weather: &W, dest: &Destination) -> Option<WindSummary>
where
    W: WeatherSource,
{
    match weather.wind_outlook(dest.coordinate).await {
        Ok(outlook) => Some(WindSummary::classify(outlook.today, outlook.tomorrow)),
        Err(e) => {
            warn!("Error getting wind for {}: {}", dest.name, e);
            None
        }
    }
}

async fn fetch_tides<T>(
    config: &Config,
    tides: &T,
    dest: &Destination,
    now: DateTime<Utc>,
    slot_count: usize,
) -> (Option<f64>, Vec<Option<f64>>)
where
    T: TideSource,
{
    let Some(station_id) = config.station_id(&dest.station) else {
        warn!(
            "No station '{}' configured for {}, leaving tides blank",
            dest.station, dest.name
        );
        return (None, vec![None; slot_count]);
    };

    let current = match tides.current_height(station_id, now).await {
        Ok(height) => Some(height),
        Err(e) => {
            warn!("Error getting current height for {}: {}", dest.name, e);
            None
        }
    };

    let hours = i64::try_from(slot_count).unwrap_or(i64::MAX);
    let slot_heights = match tides.hourly_heights(station_id, now, hours).await {
        Ok(samples) => align_to_slots(&filter_tides(&samples, &dest.band, now), slot_count),
        Err(e) => {
            warn!("Error getting hourly heights for {}: {}", dest.name, e);
            vec![None; slot_count]
        }
    };

    (current, slot_heights)
}
