//! Seams to the external collaborators that feed the engine.
//!
//! The engine performs no network or storage I/O of its own: activities,
//! streams, and athlete thresholds arrive through these traits. Stream
//! ingestion upstream may be eventual, so [`StreamSource`] exposes an
//! availability check; the engine makes no retry or poll decisions and
//! simply computes degraded metrics when streams have not arrived.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::models::{ActivityRecord, EffectiveSettings, StreamSet};

/// Provides an athlete's activity records, optionally restricted to a
/// closed date range (athlete-local calendar days).
pub trait ActivitySource {
    fn activities(
        &self,
        athlete_id: i64,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> Vec<ActivityRecord>;
}

/// Provides detailed sample streams for single activities.
pub trait StreamSource {
    /// Whether detailed streams have arrived for this activity yet.
    fn streams_available(&self, activity_id: i64) -> bool;

    /// The stream set, if available.
    fn streams(&self, activity_id: i64) -> Option<StreamSet>;
}

/// Supplies effective FTP / max HR for an activity when its own stream
/// set does not carry an override.
pub trait SettingsResolver {
    fn settings_for(
        &self,
        activity: &ActivityRecord,
        streams: Option<&StreamSet>,
    ) -> EffectiveSettings;
}

/// Athlete-level default thresholds; the plain resolver used when no
/// richer settings history exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct AthleteDefaults {
    pub ftp: Option<f64>,
    pub max_hr: Option<f64>,
}

impl SettingsResolver for AthleteDefaults {
    fn settings_for(
        &self,
        _activity: &ActivityRecord,
        streams: Option<&StreamSet>,
    ) -> EffectiveSettings {
        EffectiveSettings::resolve(streams, self.ftp, self.max_hr)
    }
}

/// In-memory source over already-fetched data. Backs tests and doubles as
/// the adapter callers use after pulling records from their own store.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    activities: Vec<ActivityRecord>,
    streams: HashMap<i64, StreamSet>,
}

impl InMemorySource {
    pub fn new(activities: Vec<ActivityRecord>, streams: Vec<StreamSet>) -> Self {
        InMemorySource {
            activities,
            streams: streams.into_iter().map(|s| (s.activity_id, s)).collect(),
        }
    }
}

impl ActivitySource for InMemorySource {
    fn activities(
        &self,
        athlete_id: i64,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> Vec<ActivityRecord> {
        self.activities
            .iter()
            .filter(|a| a.athlete_id == athlete_id)
            .filter(|a| match range {
                Some((from, to)) => {
                    let day = a.local_day();
                    day >= from && day <= to
                }
                None => true,
            })
            .cloned()
            .collect()
    }
}

impl StreamSource for InMemorySource {
    fn streams_available(&self, activity_id: i64) -> bool {
        self.streams.contains_key(&activity_id)
    }

    fn streams(&self, activity_id: i64) -> Option<StreamSet> {
        self.streams.get(&activity_id).cloned()
    }
}
