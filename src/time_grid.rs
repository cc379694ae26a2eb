//! # Hourly Time Grid
//!
//! Builds the report's row labels: one slot per hour starting at the
//! generation instant, shown in London civil time.
//!
//! Each label reads `HH:MM TAG DAY`, for example `14:05 BST today`,
//! `00:05 BST tomorrow` or `09:05 UTC 2024-11-03`. `TAG` is `BST` while
//! London observes daylight saving and `UTC` otherwise (GMT and UTC agree).
//!
//! The DST decision and the day label both come from the same instant: the
//! offset is read from the `Europe/London` zone at the slot's real UTC
//! instant, and the day is the calendar date of the adjusted time. A slot at
//! 23:30 UTC in July is therefore `00:30 BST tomorrow`.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::{Europe::London, OffsetComponents};
use serde::Serialize;
use std::fmt;

/// Number of hourly slots in a standard report
pub const SLOT_COUNT: usize = 14;

/// Zone abbreviation shown next to the time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ZoneTag {
    Utc,
    Bst,
}

impl fmt::Display for ZoneTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ZoneTag::Utc => "UTC",
            ZoneTag::Bst => "BST",
        })
    }
}

/// Day of an adjusted time relative to the generation date.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DayTag {
    Today,
    Tomorrow,
    Date(NaiveDate),
}

impl fmt::Display for DayTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayTag::Today => f.write_str("today"),
            DayTag::Tomorrow => f.write_str("tomorrow"),
            DayTag::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
        }
    }
}

/// One hourly checkpoint of the report.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TimeSlot {
    /// Real instant of the slot
    pub instant: DateTime<Utc>,
    /// Wall-clock time in London (instant plus any DST offset)
    pub local: NaiveDateTime,
    pub zone: ZoneTag,
    pub day: DayTag,
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.local.format("%H:%M"), self.zone, self.day)
    }
}

/// DST offset in force in London at `instant` and the matching tag.
pub fn london_offset(instant: DateTime<Utc>) -> (Duration, ZoneTag) {
    let dst = instant.with_timezone(&London).offset().dst_offset();
    if dst == Duration::zero() {
        (dst, ZoneTag::Utc)
    } else {
        (dst, ZoneTag::Bst)
    }
}

/// Label a single instant relative to the London date of `now`.
pub fn slot_for(instant: DateTime<Utc>, now: DateTime<Utc>) -> TimeSlot {
    let (offset, zone) = london_offset(instant);
    let local = instant.naive_utc() + offset;

    let today = now.with_timezone(&London).date_naive();
    let tomorrow = today + Duration::days(1);
    let day = match local.date() {
        d if d == today => DayTag::Today,
        d if d == tomorrow => DayTag::Tomorrow,
        d => DayTag::Date(d),
    };

    TimeSlot {
        instant,
        local,
        zone,
        day,
    }
}

/// Build `count` hourly slots at `now + 0h`, `now + 1h`, ...
pub fn build(now: DateTime<Utc>, count: usize) -> Vec<TimeSlot> {
    (0..count as i64)
        .map(|i| slot_for(now + Duration::hours(i), now))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn summer_instant_is_bst_plus_one_hour() {
        let now = utc(2024, 7, 1, 12, 5);
        let slot = slot_for(now, now);
        assert_eq!(slot.zone, ZoneTag::Bst);
        assert_eq!(slot.to_string(), "13:05 BST today");
    }

    #[test]
    fn winter_instant_is_plain_utc() {
        let now = utc(2024, 1, 15, 12, 5);
        let slot = slot_for(now, now);
        assert_eq!(slot.zone, ZoneTag::Utc);
        assert_eq!(slot.local, now.naive_utc());
        assert_eq!(slot.to_string(), "12:05 UTC today");
    }

    #[test]
    fn builds_fourteen_hourly_slots() {
        let now = utc(2024, 1, 15, 8, 0);
        let slots = build(now, SLOT_COUNT);
        assert_eq!(slots.len(), 14);
        for (i, slot) in slots.iter().enumerate() {
            assert_eq!(slot.instant, now + Duration::hours(i as i64));
        }
        assert_eq!(slots[13].to_string(), "21:00 UTC today");
    }

    #[test]
    fn adjusted_time_can_roll_into_tomorrow() {
        let now = utc(2024, 7, 1, 22, 30);
        let slots = build(now, SLOT_COUNT);
        assert_eq!(slots[0].to_string(), "23:30 BST today");
        assert_eq!(slots[1].to_string(), "00:30 BST tomorrow");
        assert_eq!(slots[13].to_string(), "12:30 BST tomorrow");
    }

    #[test]
    fn distant_slots_show_the_date() {
        let now = utc(2024, 7, 1, 12, 0);
        let slots = build(now, 40);
        assert_eq!(slots[36].to_string(), "01:00 BST 2024-07-03");
    }

    #[test]
    fn spring_forward_switches_tag_mid_grid() {
        // London moves to BST at 01:00 UTC on 2024-03-31
        let now = utc(2024, 3, 31, 0, 30);
        let slots = build(now, 3);
        assert_eq!(slots[0].to_string(), "00:30 UTC today");
        assert_eq!(slots[1].to_string(), "02:30 BST today");
        assert_eq!(slots[2].to_string(), "03:30 BST today");
    }

    #[test]
    fn fall_back_returns_to_utc() {
        // London leaves BST at 01:00 UTC on 2024-10-27
        let now = utc(2024, 10, 27, 0, 15);
        let slots = build(now, 2);
        assert_eq!(slots[0].to_string(), "01:15 BST today");
        assert_eq!(slots[1].to_string(), "01:15 UTC today");
    }

    #[test]
    fn today_follows_london_date_of_now() {
        // 23:30 UTC in summer is already the next day in London
        let now = utc(2024, 7, 1, 23, 30);
        let slot = slot_for(now, now);
        assert_eq!(slot.to_string(), "00:30 BST today");
    }
}
