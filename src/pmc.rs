//! Performance Management Chart: CTL, ATL and TSB over a daily TSS series.
//!
//! Both curves are exponentially-weighted moving averages in recurrence
//! form. The series must start at the athlete's true first data day:
//! seeding the recurrence inside a display window inherits none of the
//! accumulated fitness and understates CTL badly for short windows, so
//! windowing is only ever applied after a full-history pass.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Default CTL time constant, days ("fitness").
pub const DEFAULT_CTL_DAYS: f64 = 42.0;

/// Default ATL time constant, days ("fatigue").
pub const DEFAULT_ATL_DAYS: f64 = 7.0;

#[derive(Debug, Error, PartialEq)]
pub enum PmcError {
    #[error("series end {through} precedes first data day {first}")]
    InvalidDateRange { first: NaiveDate, through: NaiveDate },

    #[error("time constants must be positive: ctl={ctl}, atl={atl}")]
    InvalidTimeConstant { ctl: f64, atl: f64 },
}

/// Time constants for the two load curves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PmcConfig {
    pub ctl_time_constant: f64,
    pub atl_time_constant: f64,
}

impl Default for PmcConfig {
    fn default() -> Self {
        PmcConfig {
            ctl_time_constant: DEFAULT_CTL_DAYS,
            atl_time_constant: DEFAULT_ATL_DAYS,
        }
    }
}

/// One day of the chart. `ctl`, `atl` and `tsb` carry full float precision;
/// rounding happens only in the display accessors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PmcPoint {
    pub date: NaiveDate,
    pub tss: f64,
    pub ctl: f64,
    pub atl: f64,
    pub tsb: f64,
}

impl PmcPoint {
    pub fn ctl_rounded(&self) -> i64 {
        self.ctl.round() as i64
    }

    pub fn atl_rounded(&self) -> i64 {
        self.atl.round() as i64
    }

    pub fn tsb_rounded(&self) -> i64 {
        self.tsb.round() as i64
    }
}

/// PMC recurrence engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct PmcCalculator {
    config: PmcConfig,
}

impl PmcCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: PmcConfig) -> Self {
        PmcCalculator { config }
    }

    /// Run the recurrence from the first day in `history` through `through`
    /// inclusive, zero-filling calendar days with no recorded TSS.
    ///
    /// Day 0 seeds each curve at `TSS / k`; every later day applies
    /// `x += (TSS - x) / k`. A rest day still decays both curves, which is
    /// why gaps must be filled rather than skipped.
    pub fn compute_series(
        &self,
        history: &BTreeMap<NaiveDate, f64>,
        through: NaiveDate,
    ) -> Result<Vec<PmcPoint>, PmcError> {
        let k_ctl = self.config.ctl_time_constant;
        let k_atl = self.config.atl_time_constant;
        if k_ctl <= 0.0 || k_atl <= 0.0 {
            return Err(PmcError::InvalidTimeConstant {
                ctl: k_ctl,
                atl: k_atl,
            });
        }

        let Some((&first, _)) = history.iter().next() else {
            return Ok(Vec::new());
        };
        if through < first {
            return Err(PmcError::InvalidDateRange { first, through });
        }

        let mut series = Vec::new();
        let mut ctl = 0.0;
        let mut atl = 0.0;

        let mut day = first;
        loop {
            let tss = history.get(&day).copied().unwrap_or(0.0);

            if series.is_empty() {
                ctl = tss / k_ctl;
                atl = tss / k_atl;
            } else {
                ctl += (tss - ctl) / k_ctl;
                atl += (tss - atl) / k_atl;
            }

            series.push(PmcPoint {
                date: day,
                tss,
                ctl,
                atl,
                tsb: ctl - atl,
            });

            if day >= through {
                break;
            }
            day = match day.succ_opt() {
                Some(next) => next,
                None => break,
            };
        }

        debug!(
            days = series.len(),
            first = %first,
            through = %through,
            "computed pmc series"
        );
        Ok(series)
    }

    /// Current fitness/fatigue/form snapshot: the last point of a full
    /// pass through `through`. `None` only for an empty history.
    pub fn latest(
        &self,
        history: &BTreeMap<NaiveDate, f64>,
        through: NaiveDate,
    ) -> Result<Option<PmcPoint>, PmcError> {
        Ok(self.compute_series(history, through)?.pop())
    }

    /// Full-history pass, then the trailing `window_days` of it.
    ///
    /// This is the only correct way to show a window: the recurrence must
    /// have consumed the entire history before any filtering.
    pub fn windowed(
        &self,
        history: &BTreeMap<NaiveDate, f64>,
        window_days: u32,
        through: NaiveDate,
    ) -> Result<Vec<PmcPoint>, PmcError> {
        let mut series = self.compute_series(history, through)?;
        let keep = window_days as usize;
        if series.len() > keep {
            series.drain(..series.len() - keep);
        }
        Ok(series)
    }
}
