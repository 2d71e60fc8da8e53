//! Pipeline metrics
//!
//! Recorded through the `metrics` facade; the embedding application decides
//! whether and where to export them.

use std::time::Duration;

/// Pipeline stages with a recorded duration
#[derive(Debug, Clone, Copy)]
pub enum StageMetric {
    /// Fetching series and bar snapshots
    Fetch,
    /// Series reconciliation
    Reconcile,
    /// Derived metric enrichment
    Enrich,
    /// Regression fit and projection
    FairValue,
    /// VPIN bucketing and scoring
    Toxicity,
}

/// Gauge metric types
#[derive(Debug, Clone, Copy)]
pub enum GaugeMetric {
    /// Rows in the reconciled panel
    PanelRows,
    /// Latest stress spread
    StressSpread,
    /// Regression R²
    RSquared,
    /// Latest fair value deviation percentage
    DeviationPct,
    /// Latest toxicity score
    Toxicity,
}

/// Record how long a stage took
pub fn record_stage(stage: StageMetric, duration: Duration) {
    let stage_name = match stage {
        StageMetric::Fetch => "fetch",
        StageMetric::Reconcile => "reconcile",
        StageMetric::Enrich => "enrich",
        StageMetric::FairValue => "fair_value",
        StageMetric::Toxicity => "toxicity",
    };

    metrics::histogram!("liqmon_stage_duration_ms", "stage" => stage_name)
        .record(duration.as_secs_f64() * 1000.0);
    tracing::debug!(
        stage = stage_name,
        value_ms = duration.as_millis(),
        "Recording stage duration"
    );
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: f64) {
    let metric_name = match metric {
        GaugeMetric::PanelRows => "liqmon_panel_rows",
        GaugeMetric::StressSpread => "liqmon_stress_spread",
        GaugeMetric::RSquared => "liqmon_fair_value_r_squared",
        GaugeMetric::DeviationPct => "liqmon_fair_value_deviation_pct",
        GaugeMetric::Toxicity => "liqmon_toxicity",
    };

    metrics::gauge!(metric_name).set(value);
}

/// Count a failed pipeline run by error kind
pub fn record_failure(kind: &'static str) {
    metrics::counter!("liqmon_run_failures_total", "kind" => kind).increment(1);
}
