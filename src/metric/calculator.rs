//! Metric evaluation and smoothing

use super::expr::Metric;
use crate::error::{AnalyticsError, AnalyticsResult};
use crate::series::stats::trailing_mean;
use crate::series::{Panel, Series, TimePoint};
use std::collections::HashMap;

/// Evaluate `metric` at every panel row.
///
/// Rows where the expression is undefined (a zero ratio denominator) are
/// missing in the returned series.
pub fn compute_metric(panel: &Panel, metric: &Metric) -> AnalyticsResult<Series> {
    let mut columns: HashMap<&str, &[f64]> = HashMap::new();
    for name in metric.expr.columns() {
        columns.insert(name, panel.column(name)?);
    }

    let points = panel
        .index()
        .iter()
        .enumerate()
        .map(|(row, instant)| match metric.expr.evaluate(&columns, row) {
            Some(v) => TimePoint::new(*instant, v),
            None => TimePoint::missing(*instant),
        })
        .collect();

    Ok(Series::from_sorted(metric.name.as_str(), points))
}

/// Append each metric as a panel column, returning a new panel
pub fn enrich(panel: &Panel, metrics: &[Metric]) -> AnalyticsResult<Panel> {
    let mut enriched = panel.clone();
    for metric in metrics {
        let series = compute_metric(&enriched, metric)?;
        let values = series
            .points()
            .iter()
            .map(|p| {
                p.value.ok_or_else(|| AnalyticsError::UndefinedMetric {
                    metric: metric.name.clone(),
                    instant: p.instant,
                })
            })
            .collect::<AnalyticsResult<Vec<f64>>>()?;

        tracing::debug!(metric = %metric.name, unit = %metric.unit, "Derived metric column");
        enriched = enriched.with_column(metric.name.as_str(), values)?;
    }
    Ok(enriched)
}

/// Trailing simple moving average of `series`.
///
/// The value at instant t averages the `window` observations ending at t, so
/// no later value leaks in. The first `window - 1` points are missing.
pub fn rolling_mean(series: &Series, window: usize) -> AnalyticsResult<Series> {
    if window == 0 {
        return Err(AnalyticsError::InvalidParameter(
            "smoothing window must be positive".to_string(),
        ));
    }

    let values: Vec<Option<f64>> = series.values().collect();
    let points = series
        .points()
        .iter()
        .zip(trailing_mean(&values, window))
        .map(|(p, v)| TimePoint {
            instant: p.instant,
            value: v,
        })
        .collect();

    Ok(Series::from_sorted(
        format!("{}_sma{}", series.name(), window),
        points,
    ))
}
