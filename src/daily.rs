//! Daily aggregation of activities over a trailing calendar window.
//!
//! One bucket per calendar day, every day present even when empty: the PMC
//! recurrence depends on an unbroken daily series, so the zero-fill is a
//! contract, not a convenience. TSS accumulates only from ride-class
//! activities; duration, distance and heart rate are training-volume
//! bookkeeping and accumulate from every sport type.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::load::LoadCalculator;
use crate::models::ActivityRecord;
use crate::sources::SettingsResolver;

/// Aggregated training volume for one calendar day (athlete-local).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyAggregate {
    pub date: NaiveDate,

    /// Summed TSS of the day's ride-class activities
    pub tss: f64,

    /// Summed moving time across all sport types, seconds
    pub duration_seconds: u32,

    /// Summed distance across all sport types, meters
    pub distance_meters: f64,

    pub activity_count: u32,

    /// Duration-weighted mean heart rate across the day's HR-bearing
    /// activities; `None` when the day has none
    pub weighted_avg_hr: Option<f64>,
}

impl DailyAggregate {
    fn empty(date: NaiveDate) -> Self {
        DailyAggregate {
            date,
            tss: 0.0,
            duration_seconds: 0,
            distance_meters: 0.0,
            activity_count: 0,
            weighted_avg_hr: None,
        }
    }
}

/// Fold activities into zero-filled daily buckets over the trailing window
/// `[today - (window_days - 1), today]`.
///
/// Activity TSS uses the activity-level path of the load calculator (the
/// aggregate consumes totals, never streams). Output is strictly ascending
/// by date, one element per window day.
pub fn aggregate_window<R: SettingsResolver>(
    activities: &[ActivityRecord],
    resolver: &R,
    window_days: u32,
    today: NaiveDate,
) -> Vec<DailyAggregate> {
    if window_days == 0 {
        return Vec::new();
    }

    let window_start = today
        .checked_sub_days(Days::new(u64::from(window_days) - 1))
        .unwrap_or(today);

    let mut buckets: BTreeMap<NaiveDate, DailyAggregate> = BTreeMap::new();
    let mut day = window_start;
    while day <= today {
        buckets.insert(day, DailyAggregate::empty(day));
        day = match day.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }

    // (hr_sum, hr_time) accumulators per day; divided once at the end.
    let mut hr_acc: BTreeMap<NaiveDate, (f64, f64)> = BTreeMap::new();

    for activity in activities {
        let day = activity.local_day();
        let Some(bucket) = buckets.get_mut(&day) else {
            continue;
        };

        if activity.sport_type.is_ride() {
            let settings = resolver.settings_for(activity, None);
            bucket.tss += LoadCalculator::analyze(activity, None, &settings).tss;
        }

        bucket.duration_seconds += activity.moving_time;
        bucket.distance_meters += activity.distance;
        bucket.activity_count += 1;

        if activity.has_heartrate {
            if let Some(hr) = activity.average_heartrate.filter(|h| *h > 0.0) {
                let entry = hr_acc.entry(day).or_insert((0.0, 0.0));
                entry.0 += hr * f64::from(activity.moving_time);
                entry.1 += f64::from(activity.moving_time);
            }
        }
    }

    for (day, (sum, time)) in hr_acc {
        if time > 0.0 {
            if let Some(bucket) = buckets.get_mut(&day) {
                bucket.weighted_avg_hr = Some(sum / time);
            }
        }
    }

    buckets.into_values().collect()
}

/// Ride-class daily TSS over an athlete's complete history, keyed by
/// athlete-local day. No windowing and no zero-fill here: the PMC engine
/// needs the true first data day and fills calendar gaps itself.
pub fn daily_tss_history<R: SettingsResolver>(
    activities: &[ActivityRecord],
    resolver: &R,
) -> BTreeMap<NaiveDate, f64> {
    let mut history: BTreeMap<NaiveDate, f64> = BTreeMap::new();

    for activity in activities {
        if !activity.sport_type.is_ride() {
            continue;
        }
        let settings = resolver.settings_for(activity, None);
        let tss = LoadCalculator::analyze(activity, None, &settings).tss;
        if tss > 0.0 {
            *history.entry(activity.local_day()).or_insert(0.0) += tss;
        }
    }

    history
}
