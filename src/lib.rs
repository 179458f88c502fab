//! Training-load analytics for cycling activities.
//!
//! Two halves: per-activity analysis (normalized power, intensity factor,
//! TSS, variability index, power and heart-rate zone distributions) and a
//! longitudinal performance management chart (CTL/ATL/TSB) over aggregated
//! daily TSS. All I/O is behind the traits in [`sources`]; everything here
//! is pure computation over already-fetched data.

pub mod analysis;
pub mod daily;
pub mod load;
pub mod logging;
pub mod models;
pub mod pmc;
pub mod power;
pub mod sources;
pub mod zones;

// Re-export commonly used types for convenience
pub use analysis::{analyze_activity, analyze_batch, ActivityAnalysis};
pub use daily::{aggregate_window, daily_tss_history, DailyAggregate};
pub use load::{LoadBasis, LoadCalculator, TrainingLoadSummary};
pub use logging::{init_logging, LogConfig, LogFormat, LogLevel};
pub use models::{
    ActivityRecord, DistributionBucket, EffectiveSettings, ProviderZoneSet, SportType, StreamSet,
    ZoneKind,
};
pub use pmc::{PmcCalculator, PmcConfig, PmcError, PmcPoint};
pub use sources::{ActivitySource, AthleteDefaults, InMemorySource, SettingsResolver, StreamSource};
pub use zones::{ZoneDefinition, ZoneSource, ZoneTimeAnalysis, HR_ZONES, POWER_ZONES};
