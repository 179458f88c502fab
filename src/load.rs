//! Per-activity training load: NP, IF, TSS and VI.
//!
//! Every metric degrades to zero when its inputs are missing (absent FTP,
//! absent streams, absent power); nothing here returns an error for data
//! reasons. Callers detect an incomplete result by checking for a zero FTP
//! or NP, or by inspecting [`LoadBasis`].

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{ActivityRecord, EffectiveSettings, StreamSet};
use crate::power;

/// Which input produced the NP (and therefore TSS) of a summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadBasis {
    /// Provider-supplied weighted average power from a real power meter
    Provider,
    /// NP computed from the activity's watt stream
    Stream,
    /// `average_watts x 1.05` activity-level estimate
    Estimated,
    /// Provider suffer score stood in for TSS
    SufferScore,
    /// No usable input; all metrics are zero
    None,
}

/// Computed load metrics for one activity.
///
/// Immutable value object; all fields are zero rather than absent when the
/// underlying data was missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingLoadSummary {
    /// Normalized power in watts
    pub np: f64,
    /// Average power in watts
    pub avg_power: f64,
    /// Maximum power in watts (stream max, 0 without a stream)
    pub max_power: f64,
    /// Intensity factor, NP / FTP
    pub intensity_factor: f64,
    /// Training stress score
    pub tss: f64,
    /// Variability index, NP / average power
    pub variability_index: f64,
    /// Moving time in seconds
    pub duration_seconds: u32,
    /// Total work in kilojoules, estimated from average power
    pub kilojoules: f64,
    /// Input that produced NP/TSS
    pub basis: LoadBasis,
}

impl TrainingLoadSummary {
    /// Zeroed summary for an activity with no usable power or load data.
    fn empty(duration_seconds: u32) -> Self {
        TrainingLoadSummary {
            np: 0.0,
            avg_power: 0.0,
            max_power: 0.0,
            intensity_factor: 0.0,
            tss: 0.0,
            variability_index: 0.0,
            duration_seconds,
            kilojoules: 0.0,
            basis: LoadBasis::None,
        }
    }
}

/// Core load calculation engine.
pub struct LoadCalculator;

impl LoadCalculator {
    /// Compute the full load summary for one activity.
    ///
    /// NP source precedence: provider `weighted_average_watts` (when from a
    /// real meter), then the stream-derived rolling NP, then the
    /// `average_watts x 1.05` estimate, then zero.
    ///
    /// TSS precedence: the suffer score stands in when the sport type is
    /// not power-capable or FTP is unset; otherwise the power formula
    /// applies when FTP is set; otherwise zero. IF is independent of that
    /// choice and is reported whenever NP and FTP both exist.
    pub fn analyze(
        activity: &ActivityRecord,
        streams: Option<&StreamSet>,
        settings: &EffectiveSettings,
    ) -> TrainingLoadSummary {
        let mut summary = TrainingLoadSummary::empty(activity.moving_time);

        let stream_watts: &[f64] = streams.map(|s| s.aligned_watts()).unwrap_or(&[]);

        summary.avg_power = if !stream_watts.is_empty() {
            power::average_power(stream_watts)
        } else {
            activity.average_watts.unwrap_or(0.0)
        };
        summary.max_power = stream_watts.iter().cloned().fold(0.0, f64::max);

        let (np, basis) = Self::resolve_np(activity, stream_watts, summary.avg_power);
        summary.np = np;
        summary.basis = basis;

        summary.kilojoules = summary.avg_power * f64::from(activity.moving_time) / 1000.0;

        // IF is defined whenever both NP and FTP exist, regardless of
        // which input ends up supplying the TSS.
        if settings.has_ftp() && np > 0.0 {
            summary.intensity_factor = np / settings.ftp;
        }

        let power_capable = activity.sport_type.is_ride();
        let suffer = activity.suffer_score.filter(|s| *s > 0.0);

        if (!power_capable || !settings.has_ftp()) && suffer.is_some() {
            summary.tss = suffer.unwrap_or(0.0);
            summary.basis = LoadBasis::SufferScore;
        } else if settings.has_ftp() && np > 0.0 {
            summary.tss = (f64::from(activity.moving_time) * np * summary.intensity_factor)
                / (settings.ftp * 3600.0)
                * 100.0;
        } else {
            debug!(
                activity_id = activity.id,
                ftp = settings.ftp,
                np,
                "load degraded to zero: missing FTP or power"
            );
        }

        if summary.avg_power > 0.0 {
            summary.variability_index = summary.np / summary.avg_power;
        }

        summary
    }

    /// NP source precedence chain.
    fn resolve_np(
        activity: &ActivityRecord,
        stream_watts: &[f64],
        avg_power: f64,
    ) -> (f64, LoadBasis) {
        // Provider NP is trusted only for meter-recorded power; the
        // provider's estimated watts would otherwise leak into load numbers.
        if activity.device_watts {
            if let Some(w) = activity.weighted_average_watts.filter(|w| *w > 0.0) {
                return (w, LoadBasis::Provider);
            }
        }

        if let Some(np) = power::normalized_power(stream_watts) {
            return (np, LoadBasis::Stream);
        }

        if avg_power > 0.0 {
            return (power::estimate_np(avg_power), LoadBasis::Estimated);
        }

        (0.0, LoadBasis::None)
    }
}
