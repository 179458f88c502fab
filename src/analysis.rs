//! Per-activity analysis: load metrics plus zone distributions.
//!
//! Composition order mirrors the data flow: resolve effective thresholds
//! once, compute the load summary, then build power and heart-rate zone
//! charts, provider buckets first and local bucketing otherwise. Analyses of
//! different activities are independent, so batches fan out across worker
//! threads with rayon.

use chrono::{DateTime, FixedOffset};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::load::{LoadCalculator, TrainingLoadSummary};
use crate::models::{ActivityRecord, EffectiveSettings, StreamSet, ZoneKind};
use crate::sources::{SettingsResolver, StreamSource};
use crate::zones::{self, ZoneSource, ZoneTimeAnalysis};

/// Complete analysis of one activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityAnalysis {
    pub activity_id: i64,
    pub name: String,
    pub date: DateTime<FixedOffset>,
    /// Thresholds the analysis was computed against
    pub settings: EffectiveSettings,
    pub load: TrainingLoadSummary,
    /// Empty when no stream and no provider buckets exist, or FTP is unset
    pub power_zones: Vec<ZoneTimeAnalysis>,
    /// Absent when the activity carries no heart-rate data
    pub hr_zones: Option<Vec<ZoneTimeAnalysis>>,
    /// Whether detailed streams were available when this was computed
    pub streams_available: bool,
}

/// Analyze a single activity against resolved thresholds.
///
/// Never fails: missing streams, FTP, or heart rate degrade the relevant
/// sections to zeroed/empty values. Malformed stream shapes are truncated
/// to the shortest populated series and logged, so one bad activity never
/// poisons a batch.
pub fn analyze_activity(
    activity: &ActivityRecord,
    streams: Option<&StreamSet>,
    settings: &EffectiveSettings,
) -> ActivityAnalysis {
    if let Some(s) = streams {
        if s.has_length_mismatch() {
            warn!(
                activity_id = activity.id,
                time_len = s.time.len(),
                watts_len = s.watts.len(),
                hr_len = s.heartrate.len(),
                "stream arrays disagree in length; truncating to time axis"
            );
        }
        if s.has_nonmonotonic_time() {
            warn!(
                activity_id = activity.id,
                "time stream is not monotonically non-decreasing"
            );
        }
    }

    let load = LoadCalculator::analyze(activity, streams, settings);

    let power_zones = match streams {
        Some(s) => match s.provider_zones_of(ZoneKind::Power) {
            Some(provider) => {
                zones::power_distribution(ZoneSource::Provider(&provider.distribution_buckets))
            }
            None => zones::power_distribution(ZoneSource::Local {
                samples: s.aligned_watts(),
                threshold: settings.ftp,
            }),
        },
        None => Vec::new(),
    };

    let hr_zones = match streams {
        Some(s) => match s.provider_zones_of(ZoneKind::HeartRate) {
            Some(provider) => Some(zones::hr_distribution(ZoneSource::Provider(
                &provider.distribution_buckets,
            ))),
            None => {
                let hr = s.aligned_heartrate();
                if !hr.is_empty() && settings.has_max_hr() {
                    Some(zones::hr_distribution(ZoneSource::Local {
                        samples: hr,
                        threshold: settings.max_hr,
                    }))
                } else {
                    None
                }
            }
        },
        None => None,
    };

    ActivityAnalysis {
        activity_id: activity.id,
        name: activity.name.clone(),
        date: activity.start_date,
        settings: *settings,
        load,
        power_zones,
        hr_zones,
        streams_available: streams.is_some(),
    }
}

/// Analyze a batch of activities in parallel.
///
/// Per-activity analysis depends only on that activity's record, stream,
/// and resolved thresholds, so the fan-out imposes no ordering; results
/// come back in input order regardless.
pub fn analyze_batch<S, R>(
    activities: &[ActivityRecord],
    streams: &S,
    resolver: &R,
) -> Vec<ActivityAnalysis>
where
    S: StreamSource + Sync,
    R: SettingsResolver + Sync,
{
    activities
        .par_iter()
        .map(|activity| {
            let stream_set = if streams.streams_available(activity.id) {
                streams.streams(activity.id)
            } else {
                None
            };
            let settings = resolver.settings_for(activity, stream_set.as_ref());
            analyze_activity(activity, stream_set.as_ref(), &settings)
        })
        .collect()
}
