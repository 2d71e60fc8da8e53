//! Behavioural properties of the analytics core

use chrono::{DateTime, Duration, TimeZone, Utc};
use liquidity_monitor::error::AnalyticsError;
use liquidity_monitor::metric::{compute_metric, net_liquidity, ScaledColumn, UnitScale};
use liquidity_monitor::model::{fit, FitSpec};
use liquidity_monitor::series::{reconcile, year_start, Panel, Series, TimePoint};
use liquidity_monitor::toxicity::{compute_toxicity, Bar};
use std::collections::BTreeSet;

fn day(n: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(n)
}

fn no_fill() -> BTreeSet<String> {
    BTreeSet::new()
}

#[test]
fn test_forward_fill_carries_last_observation() {
    let a = Series::from_values("a", [(day(1), 5.0)]).unwrap();
    let b = Series::from_values("b", [(day(1), 1.0), (day(2), 2.0)]).unwrap();

    let panel = reconcile(&[a, b], &no_fill()).unwrap();
    assert_eq!(panel.value_at("a", day(2)), Some(5.0));
}

#[test]
fn test_zero_fill_before_inception_keeps_rows() {
    let late = Series::from_values("late", [(day(5), 3.0), (day(6), 4.0)]).unwrap();
    let daily = Series::from_values("daily", (1..=6).map(|i| (day(i), i as f64))).unwrap();
    let zero_fill: BTreeSet<String> = ["late".to_string()].into();

    let panel = reconcile(&[late, daily], &zero_fill).unwrap();
    assert_eq!(panel.len(), 6);
    for i in 1..=4 {
        assert_eq!(panel.value_at("late", day(i)), Some(0.0));
    }
    assert_eq!(panel.value_at("late", day(6)), Some(4.0));
}

#[test]
fn test_unfilled_leading_rows_are_dropped() {
    let late = Series::from_values("late", [(day(5), 3.0), (day(6), 4.0)]).unwrap();
    let daily = Series::from_values("daily", (1..=6).map(|i| (day(i), i as f64))).unwrap();

    let panel = reconcile(&[late, daily], &no_fill()).unwrap();
    assert_eq!(panel.len(), 2);
    assert_eq!(panel.index()[0], day(5));
}

#[test]
fn test_empty_series_is_insufficient_data() {
    let empty = Series::new("empty", vec![TimePoint::missing(day(1))]).unwrap();
    let daily = Series::from_values("daily", (1..=6).map(|i| (day(i), i as f64))).unwrap();

    let err = reconcile(&[empty, daily], &no_fill()).unwrap_err();
    match err {
        AnalyticsError::InsufficientData { empty_series, .. } => {
            assert_eq!(empty_series, vec!["empty".to_string()]);
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_net_liquidity_unit_scales() {
    let instants = [day(0), day(1)];
    let series = |name: &str, v: f64| {
        Series::from_values(name, instants.iter().map(|t| (*t, v))).unwrap()
    };
    let panel = reconcile(
        &[
            series("assets", 5_000_000.0),
            series("tga", 100_000.0),
            series("rrp", 50.0),
        ],
        &no_fill(),
    )
    .unwrap();

    let metric = net_liquidity(
        &ScaledColumn::new("assets", UnitScale::MILLIONS),
        &ScaledColumn::new("tga", UnitScale::MILLIONS),
        &ScaledColumn::new("rrp", UnitScale::THOUSANDS),
    );
    let result = compute_metric(&panel, &metric).unwrap();
    let (_, value) = result.latest().unwrap();
    assert!((value - 4.85).abs() < 1e-12);
}

fn linear_panel(first_year: i32, years: i32) -> Panel {
    let t0 = year_start(first_year).unwrap();
    let days = 365 * i64::from(years);
    let x = Series::from_values(
        "x",
        (0..days).map(|i| (t0 + Duration::days(i), 1.0 + i as f64 * 0.01)),
    )
    .unwrap();
    let y = Series::from_values(
        "y",
        (0..days).map(|i| (t0 + Duration::days(i), 2.0 * (1.0 + i as f64 * 0.01) + 1.0)),
    )
    .unwrap();
    reconcile(&[x, y], &no_fill()).unwrap()
}

#[test]
fn test_exact_line_is_recovered() {
    let panel = linear_panel(2020, 1);
    let model = fit(&panel, &FitSpec::new("x", "y", year_start(2020).unwrap())).unwrap();

    assert!((model.slope - 2.0).abs() < 1e-6);
    assert!((model.intercept - 1.0).abs() < 1e-6);
    assert!((model.r_squared - 1.0).abs() < 1e-6);

    let again = fit(&panel, &FitSpec::new("x", "y", year_start(2020).unwrap())).unwrap();
    assert_eq!(model, again);
}

#[test]
fn test_projection_reaches_before_training_window() {
    let panel = linear_panel(2015, 8);
    let model = fit(&panel, &FitSpec::new("x", "y", year_start(2020).unwrap())).unwrap();
    let projection = model.project(&panel).unwrap();

    let early = projection.fair_value.at(year_start(2015).unwrap()).unwrap();
    assert!(early.value().is_some());
    assert_eq!(projection.fair_value.len(), panel.len());
}

#[test]
fn test_short_training_window_fails() {
    let t0 = year_start(2024).unwrap();
    let x = Series::from_values("x", (0..10).map(|i| (t0 + Duration::days(i), i as f64))).unwrap();
    let y = Series::from_values("y", (0..10).map(|i| (t0 + Duration::days(i), i as f64))).unwrap();
    let panel = reconcile(&[x, y], &no_fill()).unwrap();

    let err = fit(&panel, &FitSpec::new("x", "y", t0)).unwrap_err();
    assert!(matches!(
        err,
        AnalyticsError::InsufficientTrainingData { rows: 10, .. }
    ));
}

fn rising_bars(n: i64) -> Vec<Bar> {
    let t0 = Utc.with_ymd_and_hms(2024, 6, 3, 13, 30, 0).unwrap();
    (0..n)
        .map(|i| Bar::new(t0 + Duration::minutes(i), 100.0 + i as f64, 100.0))
        .collect()
}

#[test]
fn test_rising_prices_classify_as_buying() {
    let scored = compute_toxicity(&rising_bars(101), 1_000.0, 1).unwrap();
    // Every bar after the first is pure buy volume
    for bucket in &scored[1..] {
        assert!(bucket.bucket.buy_volume / bucket.bucket.volume > 0.999);
        assert!(bucket.bucket.sell_volume < 1e-6);
    }
}

#[test]
fn test_window_leaves_first_buckets_undefined() {
    let scored = compute_toxicity(&rising_bars(1_000), 1_000.0, 50).unwrap();
    assert!(scored.len() > 50);
    assert!(scored[..49].iter().all(|b| !b.toxicity.is_defined()));
    assert!(scored[49..].iter().all(|b| b.toxicity.is_defined()));
}

#[test]
fn test_zero_bucket_volume_is_invalid() {
    let err = compute_toxicity(&rising_bars(10), 0.0, 50).unwrap_err();
    assert!(matches!(err, AnalyticsError::InvalidParameter(_)));
}
