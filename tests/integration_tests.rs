//! End-to-end pipeline tests: provider records through batch analysis,
//! daily aggregation, and the performance management chart.

use std::collections::BTreeMap;

use chrono::{Days, FixedOffset, NaiveDate, TimeZone};
use velostress::{
    aggregate_window, analyze_batch, daily_tss_history, ActivityRecord, AthleteDefaults,
    InMemorySource, LoadBasis, PmcCalculator, SportType, StreamSet,
};

fn ride_on(id: i64, date: NaiveDate, moving_time: u32, np: f64) -> ActivityRecord {
    ActivityRecord {
        id,
        athlete_id: 7,
        name: format!("ride {id}"),
        start_date: FixedOffset::east_opt(0)
            .unwrap()
            .from_local_datetime(&date.and_hms_opt(8, 0, 0).unwrap())
            .unwrap(),
        sport_type: SportType::Ride,
        moving_time,
        distance: 30_000.0,
        average_watts: Some(np),
        weighted_average_watts: Some(np),
        device_watts: true,
        has_heartrate: true,
        average_heartrate: Some(145.0),
        suffer_score: None,
    }
}

fn defaults() -> AthleteDefaults {
    AthleteDefaults {
        ftp: Some(200.0),
        max_hr: Some(190.0),
    }
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn batch_analysis_feeds_daily_aggregation_and_pmc() {
    let start = day(2026, 6, 1);
    // One 1 h ride at threshold per day for two weeks: TSS 100 each.
    let activities: Vec<ActivityRecord> = (0..14)
        .map(|i| ride_on(i + 1, start + Days::new(i as u64), 3600, 200.0))
        .collect();

    let streams: Vec<StreamSet> = activities
        .iter()
        .map(|a| StreamSet {
            activity_id: a.id,
            time: (0..600).collect(),
            watts: vec![200.0; 600],
            heartrate: vec![145.0; 600],
            ..StreamSet::default()
        })
        .collect();

    let source = InMemorySource::new(activities.clone(), streams);
    let resolver = defaults();

    let analyses = analyze_batch(&activities, &source, &resolver);
    assert_eq!(analyses.len(), 14);
    for analysis in &analyses {
        assert_eq!(analysis.load.basis, LoadBasis::Provider);
        assert!((analysis.load.tss - 100.0).abs() < 1e-9);
        assert_eq!(analysis.power_zones.len(), 7);
        assert!(analysis.hr_zones.is_some());
    }

    let today = start + Days::new(13);
    let dailies = aggregate_window(&activities, &resolver, 14, today);
    assert_eq!(dailies.len(), 14);
    for daily in &dailies {
        assert!((daily.tss - 100.0).abs() < 1e-9);
        assert_eq!(daily.activity_count, 1);
        assert!(daily.weighted_avg_hr.is_some());
    }

    let history = daily_tss_history(&activities, &resolver);
    let pmc = PmcCalculator::new()
        .compute_series(&history, today)
        .unwrap();
    assert_eq!(pmc.len(), 14);
    // Two weeks of fresh load: fatigue leads fitness, form is negative.
    let last = pmc.last().unwrap();
    assert!(last.atl > last.ctl);
    assert!(last.tsb < 0.0);
}

#[test]
fn steady_load_drives_pmc_to_the_load() {
    let start = day(2025, 6, 1);
    // 2880 s at threshold is exactly 80 TSS per day.
    let activities: Vec<ActivityRecord> = (0..250)
        .map(|i| ride_on(i + 1, start + Days::new(i as u64), 2880, 200.0))
        .collect();

    let resolver = defaults();
    let history = daily_tss_history(&activities, &resolver);
    let through = start + Days::new(249);

    let pmc = PmcCalculator::new()
        .compute_series(&history, through)
        .unwrap();
    let last = pmc.last().unwrap();

    assert!((last.ctl - 80.0).abs() < 0.5, "ctl = {}", last.ctl);
    assert!((last.atl - 80.0).abs() < 0.5, "atl = {}", last.atl);
    assert!(last.tsb.abs() < 0.5, "tsb = {}", last.tsb);
}

#[test]
fn pmc_replay_from_aggregated_rides() {
    let start = day(2026, 2, 1);
    // Day 0: 100 TSS, day 1: rest, day 2: 50 TSS.
    let activities = vec![
        ride_on(1, start, 3600, 200.0),
        ride_on(2, start + Days::new(2), 1800, 200.0),
    ];

    let resolver = defaults();
    let history = daily_tss_history(&activities, &resolver);
    let pmc = PmcCalculator::new()
        .compute_series(&history, start + Days::new(2))
        .unwrap();

    assert_eq!(pmc.len(), 3);
    assert!((pmc[0].ctl - 2.381).abs() < 1e-3);
    assert!((pmc[0].atl - 14.286).abs() < 1e-3);
    assert!((pmc[1].ctl - 2.324).abs() < 1e-3);
    assert!((pmc[1].atl - 12.245).abs() < 1e-3);
    assert!((pmc[2].ctl - 3.459).abs() < 1e-3);
    assert!((pmc[2].atl - 17.638).abs() < 1e-3);
}

#[test]
fn windowed_pmc_differs_from_a_cold_start_inside_the_window() {
    let start = day(2025, 1, 1);
    let through = start + Days::new(399);

    // 400 days of varied load.
    let mut history: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for i in 0..400u64 {
        let tss = 40.0 + (i % 10) as f64 * 12.0;
        history.insert(start + Days::new(i), tss);
    }

    let calc = PmcCalculator::new();
    let full_then_windowed = calc.windowed(&history, 30, through).unwrap();

    // The wrong way: seed the recurrence from inside the display window.
    let window_start = through - Days::new(29);
    let truncated: BTreeMap<NaiveDate, f64> = history
        .range(window_start..)
        .map(|(d, t)| (*d, *t))
        .collect();
    let cold_start = calc.compute_series(&truncated, through).unwrap();

    assert_eq!(full_then_windowed.len(), 30);
    assert_eq!(cold_start.len(), 30);

    // A window seeded without the preceding year of history has lost all
    // accumulated fitness: its CTL must sit well below the true value.
    let true_last = full_then_windowed.last().unwrap();
    let cold_last = cold_start.last().unwrap();
    assert!(
        (true_last.ctl - cold_last.ctl).abs() > 1.0,
        "full {} vs cold {}",
        true_last.ctl,
        cold_last.ctl
    );
    assert!(cold_last.ctl < true_last.ctl);
}

#[test]
fn mixed_sports_split_between_volume_and_load() {
    let start = day(2026, 5, 1);
    let mut run = ride_on(2, start, 3000, 0.0);
    run.sport_type = SportType::Run;
    run.average_watts = None;
    run.weighted_average_watts = None;
    run.device_watts = false;
    run.suffer_score = Some(45.0);

    let activities = vec![ride_on(1, start, 3600, 200.0), run];
    let resolver = defaults();

    let dailies = aggregate_window(&activities, &resolver, 7, start + Days::new(6));
    let first = &dailies[0];

    // Only the ride contributes TSS; both contribute volume.
    assert!((first.tss - 100.0).abs() < 1e-9);
    assert_eq!(first.activity_count, 2);
    assert_eq!(first.duration_seconds, 6600);

    // The run's suffer score still shows up in per-activity analysis.
    let source = InMemorySource::new(activities.clone(), vec![]);
    let analyses = analyze_batch(&activities, &source, &resolver);
    assert_eq!(analyses[1].load.basis, LoadBasis::SufferScore);
    assert!((analyses[1].load.tss - 45.0).abs() < 1e-9);
}

#[test]
fn athlete_without_ftp_degrades_but_never_fails() {
    let start = day(2026, 5, 1);
    let activities = vec![ride_on(1, start, 3600, 220.0)];
    let resolver = AthleteDefaults {
        ftp: None,
        max_hr: None,
    };

    let source = InMemorySource::new(
        activities.clone(),
        vec![StreamSet {
            activity_id: 1,
            time: (0..300).collect(),
            watts: vec![220.0; 300],
            ..StreamSet::default()
        }],
    );

    let analyses = analyze_batch(&activities, &source, &resolver);
    assert_eq!(analyses[0].load.tss, 0.0);
    assert_eq!(analyses[0].load.intensity_factor, 0.0);
    assert!(analyses[0].power_zones.is_empty());

    let history = daily_tss_history(&activities, &resolver);
    assert!(history.is_empty());
}
