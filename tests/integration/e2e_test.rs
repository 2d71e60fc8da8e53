//! End-to-end integration tests

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use liquidity_monitor::config::Config;
use liquidity_monitor::data::{
    BarProvider, CachedProvider, ParquetSnapshotProvider, SeriesProvider, SnapshotWriter,
};
use liquidity_monitor::monitor::Monitor;
use liquidity_monitor::series::{Series, TimePoint};
use liquidity_monitor::signal::{AlertLevel, FitQuality};
use liquidity_monitor::toxicity::Bar;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn example_config() -> Config {
    Config::load(concat!(env!("CARGO_MANIFEST_DIR"), "/config.toml.example")).unwrap()
}

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2019, 6, 3, 0, 0, 0).unwrap()
}

fn overnight_inception() -> DateTime<Utc> {
    Utc.from_utc_datetime(
        &NaiveDate::from_ymd_opt(2021, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap(),
    )
}

const DAYS: i64 = 1_600;

/// Weekly asset base in millions; forward filled between releases
fn asset_base_on(day: i64) -> f64 {
    7_000_000.0 + 1_000.0 * (day / 7 * 7) as f64
}

fn net_liquidity_on(first: DateTime<Utc>, day: i64) -> f64 {
    let rrp = if first + Duration::days(day) >= overnight_inception() {
        100.0
    } else {
        0.0
    };
    asset_base_on(day) / 1_000_000.0 - 700_000.0 / 1_000_000.0 - rrp / 1_000.0
}

fn write_snapshots(dir: &Path) {
    write_snapshots_from(dir, start());
}

fn write_snapshots_from(dir: &Path, first: DateTime<Utc>) {
    let writer = SnapshotWriter::new(dir.to_path_buf());
    let day = |i: i64| first + Duration::days(i);
    let daily = |name: &str, f: &dyn Fn(i64) -> f64| {
        Series::from_values(name, (0..DAYS).map(|i| (day(i), f(i)))).unwrap()
    };

    let walcl = Series::new(
        "WALCL",
        (0..DAYS)
            .step_by(7)
            .map(|i| TimePoint::new(day(i), asset_base_on(i)))
            .collect(),
    )
    .unwrap();
    writer.write_series("WALCL", &walcl).unwrap();
    writer
        .write_series("WTREGEN", &daily("WTREGEN", &|_| 700_000.0))
        .unwrap();

    let rrp = Series::from_values(
        "RRPONTSYD",
        (0..DAYS)
            .map(|i| (day(i), 100.0))
            .filter(|(t, _)| *t >= overnight_inception()),
    )
    .unwrap();
    writer.write_series("RRPONTSYD", &rrp).unwrap();

    writer
        .write_series(
            "SP500",
            &daily("SP500", &|i| 1_000.0 * net_liquidity_on(first, i) + 500.0),
        )
        .unwrap();
    writer
        .write_series("BAMLH0A3HYC", &daily("BAMLH0A3HYC", &|_| 8.0))
        .unwrap();
    writer
        .write_series("BAMLH0A1HYBB", &daily("BAMLH0A1HYBB", &|_| 3.0))
        .unwrap();

    let session = Utc.with_ymd_and_hms(2024, 6, 3, 13, 30, 0).unwrap();
    let bars: Vec<Bar> = (0..600)
        .map(|i| {
            let drift = if i % 4 == 0 { -0.3 } else { 0.2 };
            Bar::new(
                session + Duration::minutes(i),
                470.0 + drift * (i % 11) as f64,
                1_000.0 + (i % 5) as f64 * 100.0,
            )
        })
        .collect();
    writer.write_bars("SPY-5m", &bars).unwrap();
}

fn snapshot_monitor(config: Config) -> Monitor {
    let snapshots = ParquetSnapshotProvider::new(config.data.snapshot_dir.clone());
    let series: Arc<dyn SeriesProvider> = Arc::new(snapshots.clone());
    let bars: Arc<dyn BarProvider> = Arc::new(snapshots);
    Monitor::new(config, series, Some(bars))
}

/// Config over `dir` that reaches back past the fixed synthetic history
fn full_history_config(dir: &Path) -> Config {
    let mut config = example_config();
    config.data.snapshot_dir = dir.to_path_buf();
    config.data.lookback_days = 20_000;
    config
}

#[test]
fn test_config_example_loads() {
    let config = example_config();
    assert_eq!(config.series.len(), 6);
    assert_eq!(config.data.lookback_days, 730);
    assert_eq!(config.data.cache_capacity, 1_024);
    assert_eq!(config.zero_fill_series().len(), 1);
    assert!(config.model.is_some());
    assert!(config.toxicity.is_some());
}

#[tokio::test]
async fn test_snapshot_pipeline() {
    let temp_dir = TempDir::new().unwrap();
    write_snapshots(temp_dir.path());

    let config = full_history_config(temp_dir.path());
    let report = snapshot_monitor(config).run().await.unwrap();

    // Zero fill keeps pre-inception overnight rows; weekly assets are filled
    assert_eq!(report.rows, DAYS as usize);
    assert_eq!(report.start, Some(start()));

    let stress = report.stress.as_ref().unwrap();
    assert!((stress.latest - 5.0).abs() < 1e-9);
    assert_eq!(stress.level, AlertLevel::Stable);

    let fair_value = report.fair_value.as_ref().unwrap();
    assert!((fair_value.model.slope - 1_000.0).abs() < 1e-6);
    assert!((fair_value.model.intercept - 500.0).abs() < 1e-3);
    assert!(fair_value.model.r_squared > 0.999_999);
    assert_eq!(fair_value.quality, FitQuality::Trustworthy);
    let deviation = fair_value
        .latest_deviation
        .and_then(|p| p.value.value())
        .unwrap();
    assert!(deviation.abs() < 1e-6);

    let display_start = Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap();
    assert!(report.display.index().iter().all(|t| *t >= display_start));
    assert!(fair_value
        .projection
        .fair_value
        .points
        .iter()
        .all(|p| p.instant >= display_start));
    assert_eq!(
        report.correlation.get("net_liquidity", "asset_price").map(|r| r > 0.999),
        Some(true)
    );

    let toxicity = report.toxicity.as_ref().unwrap();
    assert!(toxicity.buckets.len() >= 50);
    assert!(toxicity.buckets[..49].iter().all(|b| !b.toxicity.is_defined()));
    assert!(toxicity.latest().unwrap().toxicity.is_defined());

    let table = report.format_table();
    assert!(table.contains("FAIR VALUE (asset_price ~ net_liquidity)"));
    assert!(serde_json::to_string(&report).is_ok());
}

#[tokio::test]
async fn test_missing_snapshot_aborts_run() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = example_config();
    config.data.snapshot_dir = temp_dir.path().to_path_buf();

    let err = snapshot_monitor(config).run().await.unwrap_err();
    assert!(format!("{:#}", err).contains("Snapshot not found"));
}

#[tokio::test]
async fn test_panel_starts_inside_lookback_window() {
    let temp_dir = TempDir::new().unwrap();
    let today = Utc::now()
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        .and_utc();
    write_snapshots_from(temp_dir.path(), today - Duration::days(DAYS - 1));

    let mut config = example_config();
    config.data.snapshot_dir = temp_dir.path().to_path_buf();
    let window_start = Utc::now() - Duration::days(730);
    let report = snapshot_monitor(config).run().await.unwrap();

    let first = report.start.unwrap();
    assert!(first >= window_start - Duration::days(1));
    assert!(first > today - Duration::days(DAYS - 1));
    assert!(report.rows <= 731);
    assert!(report.rows > 700);
    assert!(report.fair_value.is_some());
}

#[tokio::test]
async fn test_cached_monitor_reuses_series_across_runs() {
    let temp_dir = TempDir::new().unwrap();
    write_snapshots(temp_dir.path());

    let config = full_history_config(temp_dir.path());
    let snapshots = ParquetSnapshotProvider::new(config.data.snapshot_dir.clone());
    let cached = Arc::new(CachedProvider::from_config(snapshots.clone(), &config.data));
    let bars: Arc<dyn BarProvider> = Arc::new(snapshots);
    let monitor = Monitor::new(
        config,
        cached.clone() as Arc<dyn SeriesProvider>,
        Some(bars),
    );

    let first = monitor.run().await.unwrap();
    assert_eq!(cached.entry_count().await, 6);

    // Removing the snapshots proves the second run is served from memory
    for entry in std::fs::read_dir(temp_dir.path()).unwrap() {
        let path = entry.unwrap().path();
        if !path.ends_with("SPY-5m.parquet") {
            std::fs::remove_file(path).unwrap();
        }
    }
    let second = monitor.run().await.unwrap();
    assert_eq!(second.rows, first.rows);
    assert_eq!(cached.entry_count().await, 6);
}
