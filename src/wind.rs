//! # Wind Classification
//!
//! Maps raw wind readings to the labels printed in the report. Both tables
//! are scanned in order and the first band containing the input wins; an
//! input no band contains gets the table's catch-all label.
//!
//! Inputs are integers, as the bands are:
//! - force: wind speed in m/s times 100, truncated (`3.889 m/s` → `388`)
//! - direction: degrees, truncated
//!
//! The compass table deliberately overlaps at 21–23 degrees; first match
//! makes those Northerly.

use crate::WindObservation;
use serde::Serialize;
use std::fmt;

/// Beaufort-style force, 1 to 12.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct ForceLabel(u8);

impl ForceLabel {
    pub fn number(self) -> u8 {
        self.0
    }
}

impl fmt::Display for ForceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Force {}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum CompassLabel {
    Northerly,
    NorthNorthEasterly,
    NorthEasterly,
    EastNorthEasterly,
    Easterly,
    EastSouthEasterly,
    SouthEasterly,
    SouthSouthEasterly,
    Southerly,
    SouthSouthWesterly,
    SouthWesterly,
    WestSouthWesterly,
    Westerly,
    WestNorthWesterly,
    NorthWesterly,
    NorthNorthWesterly,
}

impl CompassLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            CompassLabel::Northerly => "Northerly",
            CompassLabel::NorthNorthEasterly => "North North Easterly",
            CompassLabel::NorthEasterly => "North Easterly",
            CompassLabel::EastNorthEasterly => "East North Easterly",
            CompassLabel::Easterly => "Easterly",
            CompassLabel::EastSouthEasterly => "East South Easterly",
            CompassLabel::SouthEasterly => "South Easterly",
            CompassLabel::SouthSouthEasterly => "South South Easterly",
            CompassLabel::Southerly => "Southerly",
            CompassLabel::SouthSouthWesterly => "South South Westerly",
            CompassLabel::SouthWesterly => "South Westerly",
            CompassLabel::WestSouthWesterly => "West South Westerly",
            CompassLabel::Westerly => "Westerly",
            CompassLabel::WestNorthWesterly => "West North Westerly",
            CompassLabel::NorthWesterly => "North Westerly",
            CompassLabel::NorthNorthWesterly => "North North Westerly",
        }
    }
}

impl fmt::Display for CompassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive `(low, high, force)` bands over speed × 100.
const FORCE_BANDS: [(i64, i64, u8); 11] = [
    (0, 388, 1),
    (389, 777, 2),
    (778, 1360, 3),
    (1361, 2137, 4),
    (2138, 3304, 5),
    (3305, 4276, 6),
    (4277, 5442, 7),
    (5443, 6609, 8),
    (6610, 7969, 9),
    (7970, 9330, 10),
    (9331, 10885, 11),
];

const FORCE_CATCH_ALL: ForceLabel = ForceLabel(12);

/// Inclusive `(low, high, label)` bands over degrees.
const COMPASS_BANDS: [(i64, i64, CompassLabel); 15] = [
    (0, 23, CompassLabel::Northerly),
    (21, 40, CompassLabel::NorthNorthEasterly),
    (41, 60, CompassLabel::NorthEasterly),
    (61, 80, CompassLabel::EastNorthEasterly),
    (81, 110, CompassLabel::Easterly),
    (111, 130, CompassLabel::EastSouthEasterly),
    (131, 150, CompassLabel::SouthEasterly),
    (151, 170, CompassLabel::SouthSouthEasterly),
    (171, 200, CompassLabel::Southerly),
    (201, 220, CompassLabel::SouthSouthWesterly),
    (221, 240, CompassLabel::SouthWesterly),
    (241, 260, CompassLabel::WestSouthWesterly),
    (261, 290, CompassLabel::Westerly),
    (291, 310, CompassLabel::WestNorthWesterly),
    (311, 330, CompassLabel::NorthWesterly),
];

const COMPASS_CATCH_ALL: CompassLabel = CompassLabel::NorthNorthWesterly;

/// Integer input for [`classify_force`].
pub fn force_proxy(speed_ms: f64) -> i64 {
    (speed_ms * 100.0).trunc() as i64
}

/// Integer input for [`classify_direction`].
pub fn direction_proxy(direction_deg: f64) -> i64 {
    direction_deg.trunc() as i64
}

pub fn classify_force(proxy: i64) -> ForceLabel {
    FORCE_BANDS
        .iter()
        .find(|(low, high, _)| (*low..=*high).contains(&proxy))
        .map_or(FORCE_CATCH_ALL, |&(_, _, force)| ForceLabel(force))
}

pub fn classify_direction(degrees: i64) -> CompassLabel {
    COMPASS_BANDS
        .iter()
        .find(|(low, high, _)| (*low..=*high).contains(&degrees))
        .map_or(COMPASS_CATCH_ALL, |&(_, _, label)| label)
}

/// Force and direction labels for one reading.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ClassifiedWind {
    pub force: ForceLabel,
    pub direction: CompassLabel,
}

impl From<WindObservation> for ClassifiedWind {
    fn from(obs: WindObservation) -> Self {
        Self {
            force: classify_force(force_proxy(obs.speed_ms)),
            direction: classify_direction(direction_proxy(obs.direction_deg)),
        }
    }
}

/// What the report prints about wind for one destination.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct WindSummary {
    pub today: ClassifiedWind,
    pub tomorrow: ClassifiedWind,
}

impl WindSummary {
    pub fn classify(today: WindObservation, tomorrow: WindObservation) -> Self {
        Self {
            today: today.into(),
            tomorrow: tomorrow.into(),
        }
    }
}
