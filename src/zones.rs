//! Zone tables and time-in-zone distribution.
//!
//! Two sources feed a zone chart: local bucketing of a raw sample stream
//! against the fixed %FTP / %max-HR tables, or a provider-supplied
//! distribution whose buckets carry the provider's own boundaries. The
//! provider path is authoritative whenever its buckets exist; the two
//! paths are never mixed for a single chart.

use serde::{Deserialize, Serialize};

use crate::models::DistributionBucket;

/// One row of a static zone table.
///
/// `floor_pct`/`ceiling_pct` are fractions of the threshold (FTP or max
/// HR); the last zone is open-ended. Name and color are presentation
/// metadata carried through to the chart rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneDefinition {
    pub zone: u8,
    pub name: &'static str,
    pub color: &'static str,
    pub floor_pct: f64,
    pub ceiling_pct: Option<f64>,
}

/// Coggan 7-zone power table (fractions of FTP).
pub const POWER_ZONES: [ZoneDefinition; 7] = [
    ZoneDefinition { zone: 1, name: "Active Recovery", color: "#9CA3AF", floor_pct: 0.0, ceiling_pct: Some(0.55) },
    ZoneDefinition { zone: 2, name: "Endurance", color: "#60A5FA", floor_pct: 0.55, ceiling_pct: Some(0.75) },
    ZoneDefinition { zone: 3, name: "Tempo", color: "#34D399", floor_pct: 0.75, ceiling_pct: Some(0.90) },
    ZoneDefinition { zone: 4, name: "Threshold", color: "#FBBF24", floor_pct: 0.90, ceiling_pct: Some(1.05) },
    ZoneDefinition { zone: 5, name: "VO2max", color: "#F97316", floor_pct: 1.05, ceiling_pct: Some(1.20) },
    ZoneDefinition { zone: 6, name: "Anaerobic", color: "#EF4444", floor_pct: 1.20, ceiling_pct: Some(1.50) },
    ZoneDefinition { zone: 7, name: "Neuromuscular", color: "#A855F7", floor_pct: 1.50, ceiling_pct: None },
];

/// 6-zone heart-rate table (fractions of max HR).
pub const HR_ZONES: [ZoneDefinition; 6] = [
    ZoneDefinition { zone: 1, name: "Recovery", color: "#9CA3AF", floor_pct: 0.0, ceiling_pct: Some(0.60) },
    ZoneDefinition { zone: 2, name: "Aerobic", color: "#60A5FA", floor_pct: 0.60, ceiling_pct: Some(0.70) },
    ZoneDefinition { zone: 3, name: "Tempo", color: "#34D399", floor_pct: 0.70, ceiling_pct: Some(0.80) },
    ZoneDefinition { zone: 4, name: "Threshold", color: "#FBBF24", floor_pct: 0.80, ceiling_pct: Some(0.90) },
    ZoneDefinition { zone: 5, name: "Anaerobic", color: "#EF4444", floor_pct: 0.90, ceiling_pct: Some(1.00) },
    ZoneDefinition { zone: 6, name: "Maximal", color: "#A855F7", floor_pct: 1.00, ceiling_pct: None },
];

/// Time-in-zone for one zone of a chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneTimeAnalysis {
    /// 1-based zone index
    pub zone: u8,
    pub name: String,
    /// Presentation color (hex)
    pub color: String,
    /// Seconds accumulated in the zone
    pub time_in_zone: u32,
    /// Share of total sampled time, 0-100
    pub percentage_time: f64,
    /// Mean sample value within the zone; absent for provider buckets,
    /// which carry no samples
    pub avg: Option<f64>,
}

/// Where a zone distribution comes from. Selection is a pure branch:
/// provider buckets, when present, always win.
#[derive(Debug, Clone, Copy)]
pub enum ZoneSource<'a> {
    /// Provider distribution with the provider's own boundaries
    Provider(&'a [DistributionBucket]),
    /// Raw samples bucketed against the local table
    Local {
        samples: &'a [f64],
        /// FTP for power, max HR for heart rate; 0 means unset
        threshold: f64,
    },
}

/// Power time-in-zone from either source.
///
/// Local bucketing with an unset threshold returns an empty list (there is
/// no meaningful %FTP without an FTP).
pub fn power_distribution(source: ZoneSource) -> Vec<ZoneTimeAnalysis> {
    distribute(source, &POWER_ZONES)
}

/// Heart-rate time-in-zone from either source.
pub fn hr_distribution(source: ZoneSource) -> Vec<ZoneTimeAnalysis> {
    distribute(source, &HR_ZONES)
}

fn distribute(source: ZoneSource, table: &[ZoneDefinition]) -> Vec<ZoneTimeAnalysis> {
    match source {
        ZoneSource::Provider(buckets) => from_provider(buckets, table),
        ZoneSource::Local { samples, threshold } => from_samples(samples, threshold, table),
    }
}

/// Zone index for a sample at the given fraction of threshold.
///
/// The first band is upper-exclusive and every later band upper-inclusive,
/// so a sample at exactly 55 % FTP is Zone 2 and one at exactly 75 % is
/// still Zone 2. The bands partition `[0, inf)`: every sample lands in
/// exactly one zone.
fn zone_index(fraction: f64, table: &[ZoneDefinition]) -> usize {
    for (i, def) in table.iter().enumerate() {
        match def.ceiling_pct {
            Some(c) if i == 0 && fraction < c => return 0,
            Some(c) if i > 0 && fraction <= c => return i,
            None => return i,
            _ => {}
        }
    }
    table.len() - 1
}

fn from_samples(samples: &[f64], threshold: f64, table: &[ZoneDefinition]) -> Vec<ZoneTimeAnalysis> {
    if threshold <= 0.0 {
        return Vec::new();
    }

    let mut seconds = vec![0u32; table.len()];
    let mut sums = vec![0.0f64; table.len()];
    for &sample in samples {
        let idx = zone_index(sample / threshold, table);
        seconds[idx] += 1; // one 1 Hz tick per sample
        sums[idx] += sample;
    }

    let total = samples.len() as f64;
    table
        .iter()
        .enumerate()
        .map(|(i, def)| ZoneTimeAnalysis {
            zone: def.zone,
            name: def.name.to_string(),
            color: def.color.to_string(),
            time_in_zone: seconds[i],
            percentage_time: if total > 0.0 {
                f64::from(seconds[i]) / total * 100.0
            } else {
                0.0
            },
            avg: if seconds[i] > 0 {
                Some(sums[i] / f64::from(seconds[i]))
            } else {
                None
            },
        })
        .collect()
}

fn from_provider(buckets: &[DistributionBucket], table: &[ZoneDefinition]) -> Vec<ZoneTimeAnalysis> {
    let total: f64 = buckets.iter().map(|b| f64::from(b.time)).sum();

    buckets
        .iter()
        .enumerate()
        .map(|(i, bucket)| {
            // Colors follow table order when the bucket counts line up;
            // overflow buckets reuse the last color.
            let color = table
                .get(i)
                .or_else(|| table.last())
                .map(|d| d.color)
                .unwrap_or("#9CA3AF");

            let open_ended = bucket.max <= bucket.min || bucket.max < 0.0;
            let name = if open_ended {
                format!("{:.0}+", bucket.min)
            } else {
                format!("{:.0}-{:.0}", bucket.min, bucket.max)
            };

            ZoneTimeAnalysis {
                zone: (i + 1) as u8,
                name,
                color: color.to_string(),
                time_in_zone: bucket.time,
                percentage_time: if total > 0.0 {
                    f64::from(bucket.time) / total * 100.0
                } else {
                    0.0
                },
                avg: None,
            }
        })
        .collect()
}
