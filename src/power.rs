//! Normalized Power calculation over raw watt streams.
//!
//! NP weights sustained efforts over coasting: a 30-second trailing moving
//! average is raised to the 4th power, averaged across the ride, and the
//! 4th root taken. For streams shorter than one full window NP is
//! undefined and callers fall back to the activity-level estimate.

/// Trailing window length in samples. Streams are treated as 1 Hz ticks;
/// callers resample to near-uniform spacing before handing data in.
pub const ROLLING_WINDOW: usize = 30;

/// Multiplier for the activity-level NP estimate when no detailed samples
/// exist. A best-effort heuristic, not a substitute for the rolling
/// computation.
pub const NP_ESTIMATE_FACTOR: f64 = 1.05;

/// Normalized Power of a watt stream.
///
/// Returns `None` for streams shorter than [`ROLLING_WINDOW`] samples: no
/// partial windows are emitted into the averaging set, so there is nothing
/// to average. An all-zero stream yields `Some(0.0)`.
pub fn normalized_power(watts: &[f64]) -> Option<f64> {
    if watts.len() < ROLLING_WINDOW {
        return None;
    }

    let window_count = watts.len() - ROLLING_WINDOW + 1;
    let mut sum_fourth = 0.0;

    // Running window sum instead of re-summing 30 samples per index.
    let mut window_sum: f64 = watts[..ROLLING_WINDOW].iter().sum();
    sum_fourth += (window_sum / ROLLING_WINDOW as f64).powi(4);

    for i in ROLLING_WINDOW..watts.len() {
        window_sum += watts[i] - watts[i - ROLLING_WINDOW];
        sum_fourth += (window_sum / ROLLING_WINDOW as f64).powi(4);
    }

    Some((sum_fourth / window_count as f64).sqrt().sqrt())
}

/// Arithmetic mean of a watt stream; 0 for an empty stream.
pub fn average_power(watts: &[f64]) -> f64 {
    if watts.is_empty() {
        return 0.0;
    }
    watts.iter().sum::<f64>() / watts.len() as f64
}

/// Activity-level NP estimate from average power when no stream exists.
pub fn estimate_np(average_watts: f64) -> f64 {
    average_watts * NP_ESTIMATE_FACTOR
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn constant_power_reproduces_itself() {
        // Moving average, 4th power and 4th root of a constant are the
        // constant, so NP of a steady 200 W hour is exactly 200.
        let watts = vec![200.0; 60];
        let np = normalized_power(&watts).unwrap();
        assert!((np - 200.0).abs() < 1e-9, "np = {np}");
    }

    #[test]
    fn short_stream_is_undefined() {
        let watts = vec![250.0; 29];
        assert!(normalized_power(&watts).is_none());
        assert!(normalized_power(&[]).is_none());
    }

    #[test]
    fn exactly_one_window_is_defined() {
        let watts = vec![180.0; ROLLING_WINDOW];
        let np = normalized_power(&watts).unwrap();
        assert!((np - 180.0).abs() < 1e-9);
    }

    #[test]
    fn all_zero_stream_gives_zero() {
        let watts = vec![0.0; 120];
        assert_eq!(normalized_power(&watts), Some(0.0));
    }

    #[test]
    fn variable_effort_exceeds_average() {
        // Alternating hard/easy: the 4th-power weighting pulls NP above
        // the plain mean.
        let watts: Vec<f64> = (0..300)
            .map(|i| if (i / 30) % 2 == 0 { 300.0 } else { 100.0 })
            .collect();
        let np = normalized_power(&watts).unwrap();
        let avg = average_power(&watts);
        assert!(np > avg, "np {np} should exceed avg {avg}");
    }

    #[test]
    fn estimate_matches_documented_factor() {
        assert!((estimate_np(200.0) - 210.0).abs() < 1e-9);
        assert_eq!(estimate_np(0.0), 0.0);
    }

    #[test]
    fn average_power_of_empty_stream_is_zero() {
        assert_eq!(average_power(&[]), 0.0);
    }

    proptest! {
        #[test]
        fn np_bounded_by_sample_range(
            watts in prop::collection::vec(0.0f64..500.0, ROLLING_WINDOW..400)
        ) {
            let np = normalized_power(&watts).unwrap();
            let min = watts.iter().cloned().fold(f64::INFINITY, f64::min);
            let max = watts.iter().cloned().fold(0.0f64, f64::max);
            // The moving average stays within [min, max], and the
            // power-mean of values in that range does too.
            prop_assert!(np >= min - 1e-9);
            prop_assert!(np <= max + 1e-9);
        }

        #[test]
        fn np_at_least_average_for_any_stream(
            watts in prop::collection::vec(0.0f64..500.0, 120..400)
        ) {
            // Power-mean inequality: the 4th-power mean of the smoothed
            // series dominates its arithmetic mean, and for streams much
            // longer than the window the smoothed mean tracks the raw
            // mean closely.
            let np = normalized_power(&watts).unwrap();
            let avg = average_power(&watts);
            prop_assert!(np >= avg * 0.8);
        }
    }
}
