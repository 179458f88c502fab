use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

/// Activity sport types as reported by the upstream provider.
///
/// Only the ride-class variants are power-capable: they are the ones whose
/// power data contributes to TSS and the PMC. Every other sport type still
/// contributes duration/distance/heart rate to daily volume bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SportType {
    Ride,
    VirtualRide,
    MountainBikeRide,
    GravelRide,
    EBikeRide,
    Velomobile,
    Run,
    TrailRun,
    Walk,
    Hike,
    Swim,
    WeightTraining,
    Workout,
    #[serde(other)]
    Other,
}

impl SportType {
    /// True for ride-class activities, the only sport types whose power
    /// data counts toward cycling load.
    pub fn is_ride(&self) -> bool {
        matches!(
            self,
            SportType::Ride
                | SportType::VirtualRide
                | SportType::MountainBikeRide
                | SportType::GravelRide
                | SportType::EBikeRide
                | SportType::Velomobile
        )
    }
}

/// A single activity as fetched from the provider (summary fields only,
/// no samples). The engine never mutates these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    /// Provider activity id
    pub id: i64,

    /// Provider athlete id
    pub athlete_id: i64,

    /// Activity title
    pub name: String,

    /// Start timestamp in the source timezone; the calendar day for daily
    /// aggregation is taken from this value as-is
    pub start_date: DateTime<FixedOffset>,

    /// Sport type string from the provider
    pub sport_type: SportType,

    /// Moving time in seconds
    pub moving_time: u32,

    /// Distance in meters
    pub distance: f64,

    /// Average power in watts, if the activity carries power
    pub average_watts: Option<f64>,

    /// Provider-computed weighted average power (its NP estimate)
    pub weighted_average_watts: Option<f64>,

    /// True when power came from a physical meter rather than the
    /// provider's estimation model
    pub device_watts: bool,

    /// Whether any heart rate data was recorded
    pub has_heartrate: bool,

    /// Average heart rate in bpm
    pub average_heartrate: Option<f64>,

    /// Provider-native perceived exertion load (Strava "suffer score")
    pub suffer_score: Option<f64>,
}

impl ActivityRecord {
    /// Calendar day of the activity in the athlete's local time.
    pub fn local_day(&self) -> NaiveDate {
        self.start_date.date_naive()
    }
}

/// One cumulative time bucket of a provider-supplied zone distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionBucket {
    /// Lower bound of the bucket (watts or bpm)
    pub min: f64,
    /// Upper bound of the bucket; providers use a sentinel like -1 or a
    /// very large value for the open-ended top bucket
    pub max: f64,
    /// Seconds spent in the bucket
    pub time: u32,
}

/// Which metric a provider zone set describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneKind {
    Power,
    #[serde(rename = "heartrate")]
    HeartRate,
}

/// A provider-supplied zone distribution for one metric. When present, its
/// buckets reflect the provider's own zone boundaries and are authoritative
/// over anything computed locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderZoneSet {
    #[serde(rename = "type")]
    pub kind: ZoneKind,
    pub distribution_buckets: Vec<DistributionBucket>,
}

/// Detailed per-second sample streams for one activity, fetched separately
/// from the activity summary and not always available.
///
/// The arrays are nominally parallel and equal-length; the engine treats
/// the shortest populated length as authoritative when they disagree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StreamSet {
    pub activity_id: i64,

    /// Seconds from activity start, monotonically non-decreasing
    #[serde(default)]
    pub time: Vec<u32>,

    #[serde(default)]
    pub watts: Vec<f64>,

    #[serde(default)]
    pub heartrate: Vec<f64>,

    #[serde(default)]
    pub cadence: Vec<f64>,

    #[serde(default)]
    pub grade: Vec<f64>,

    #[serde(default)]
    pub velocity: Vec<f64>,

    #[serde(default)]
    pub altitude: Vec<f64>,

    /// FTP in effect when this activity was recorded. Takes precedence over
    /// any athlete-level setting: thresholds drift over time, so an
    /// activity is always judged against the values of its own day.
    pub ftp: Option<f64>,

    /// Max heart rate in effect when this activity was recorded
    pub max_heartrate: Option<f64>,

    /// Raw provider zone distributions stored alongside the streams
    #[serde(default)]
    pub provider_zones: Vec<ProviderZoneSet>,
}

impl StreamSet {
    /// Provider zone set of the given kind, if one was stored.
    pub fn provider_zones_of(&self, kind: ZoneKind) -> Option<&ProviderZoneSet> {
        self.provider_zones.iter().find(|z| z.kind == kind)
    }

    fn aligned_len(&self, series_len: usize) -> usize {
        if self.time.is_empty() {
            series_len
        } else {
            series_len.min(self.time.len())
        }
    }

    /// Watt samples truncated to the time axis when the arrays disagree;
    /// the shorter length is authoritative.
    pub fn aligned_watts(&self) -> &[f64] {
        &self.watts[..self.aligned_len(self.watts.len())]
    }

    /// Heart-rate samples truncated to the time axis.
    pub fn aligned_heartrate(&self) -> &[f64] {
        &self.heartrate[..self.aligned_len(self.heartrate.len())]
    }

    /// True when any populated series is longer than the time axis.
    pub fn has_length_mismatch(&self) -> bool {
        if self.time.is_empty() {
            return false;
        }
        let n = self.time.len();
        (!self.watts.is_empty() && self.watts.len() != n)
            || (!self.heartrate.is_empty() && self.heartrate.len() != n)
    }

    /// True when the time axis ever decreases.
    pub fn has_nonmonotonic_time(&self) -> bool {
        self.time.windows(2).any(|w| w[1] < w[0])
    }
}

/// Thresholds resolved for one activity via the fixed precedence chain:
/// activity-level stream override, then athlete default, then unset (0).
///
/// Resolved once per activity and passed explicitly into every calculator;
/// a zero value means "unset" and downgrades dependent metrics to zero
/// rather than erroring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct EffectiveSettings {
    pub ftp: f64,
    pub max_hr: f64,
}

impl EffectiveSettings {
    pub fn resolve(
        streams: Option<&StreamSet>,
        athlete_ftp: Option<f64>,
        athlete_max_hr: Option<f64>,
    ) -> Self {
        let stream_ftp = streams.and_then(|s| s.ftp).filter(|v| *v > 0.0);
        let stream_max_hr = streams.and_then(|s| s.max_heartrate).filter(|v| *v > 0.0);

        EffectiveSettings {
            ftp: stream_ftp
                .or(athlete_ftp.filter(|v| *v > 0.0))
                .unwrap_or(0.0),
            max_hr: stream_max_hr
                .or(athlete_max_hr.filter(|v| *v > 0.0))
                .unwrap_or(0.0),
        }
    }

    pub fn has_ftp(&self) -> bool {
        self.ftp > 0.0
    }

    pub fn has_max_hr(&self) -> bool {
        self.max_hr > 0.0
    }
}
