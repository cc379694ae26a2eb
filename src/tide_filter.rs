//! # Navigability Filter
//!
//! Selects the hourly samples during which a destination can be reached and
//! lines them up with the report's time slots.
//!
//! A sample passes when its height lies inside the destination's
//! [`TideBand`] (bounds included) and it is no more than
//! [`RECENT_PAST_GRACE_MINUTES`] old. The grace period keeps the sample for
//! the current hour visible until half past.

use crate::{TideBand, TideSample};
use chrono::{DateTime, Duration, Utc};

/// How far in the past a sample may be and still be shown
pub const RECENT_PAST_GRACE_MINUTES: i64 = 30;

/// `(index, height)` of every passing sample, in input order.
pub fn filter_tides(
    samples: &[TideSample],
    band: &TideBand,
    now: DateTime<Utc>,
) -> Vec<(usize, f64)> {
    let cutoff = now - Duration::minutes(RECENT_PAST_GRACE_MINUTES);
    samples
        .iter()
        .enumerate()
        .filter(|(_, s)| band.contains(s.height_m) && s.time >= cutoff)
        .map(|(i, s)| (i, s.height_m))
        .collect()
}

/// Spread filtered samples over `slot_count` slots.
///
/// Sample index `i` belongs to slot `i`; the provider series starts at the
/// generation instant with one sample per hour, exactly like the grid.
/// Indices past the last slot are dropped.
pub fn align_to_slots(filtered: &[(usize, f64)], slot_count: usize) -> Vec<Option<f64>> {
    let mut slots = vec![None; slot_count];
    for &(index, height) in filtered {
        if let Some(slot) = slots.get_mut(index) {
            *slot = Some(height);
        }
    }
    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn series(start: DateTime<Utc>, heights: &[f64]) -> Vec<TideSample> {
        heights
            .iter()
            .enumerate()
            .map(|(i, &h)| TideSample {
                time: start + Duration::hours(i as i64),
                height_m: h,
            })
            .collect()
    }

    #[test]
    fn keeps_only_heights_inside_band() {
        let now = Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap();
        let samples = series(now, &[1.0, 2.0, 3.5, 4.9, 5.1]);
        let band = TideBand::new(2.0, 5.0);
        assert_eq!(
            filter_tides(&samples, &band, now),
            vec![(1, 2.0), (2, 3.5), (3, 4.9)]
        );
    }

    #[test]
    fn drops_samples_older_than_grace_period() {
        let now = Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap();
        let samples = vec![
            TideSample {
                time: now - Duration::minutes(31),
                height_m: 3.0,
            },
            TideSample {
                time: now - Duration::minutes(30),
                height_m: 3.0,
            },
            TideSample {
                time: now + Duration::minutes(30),
                height_m: 3.0,
            },
        ];
        let band = TideBand::new(0.0, 10.0);
        assert_eq!(filter_tides(&samples, &band, now), vec![(1, 3.0), (2, 3.0)]);
    }

    #[test]
    fn empty_input_gives_empty_output() {
        let now = Utc::now();
        assert!(filter_tides(&[], &TideBand::new(0.0, 1.0), now).is_empty());
    }

    #[test]
    fn alignment_leaves_gaps_blank() {
        let slots = align_to_slots(&[(0, 2.1), (2, 2.6)], 3);
        assert_eq!(slots, vec![Some(2.1), None, Some(2.6)]);
    }

    #[test]
    fn alignment_drops_overflow_index() {
        let slots = align_to_slots(&[(13, 1.0), (14, 1.2)], 14);
        assert_eq!(slots.len(), 14);
        assert_eq!(slots[13], Some(1.0));
    }
}
