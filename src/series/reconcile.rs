//! Multi-frequency series reconciliation
//!
//! Aligns series sampled on different calendars onto the union of their
//! instants. Gaps are forward filled only; series flagged as zero-fill take
//! 0.0 before their first observation; any row still holding a gap is dropped.

use super::panel::Panel;
use super::types::Series;
use crate::error::{AnalyticsError, AnalyticsResult};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};

/// Minimum dense rows for a usable panel
pub const MIN_PANEL_ROWS: usize = 2;

/// Reconcile `series` onto one dense panel.
///
/// Names in `zero_fill_before` must refer to input series.
pub fn reconcile(series: &[Series], zero_fill_before: &BTreeSet<String>) -> AnalyticsResult<Panel> {
    let mut names = BTreeSet::new();
    for s in series {
        if !names.insert(s.name()) {
            return Err(AnalyticsError::InvalidParameter(format!(
                "series {} supplied more than once",
                s.name()
            )));
        }
    }
    if let Some(unknown) = zero_fill_before.iter().find(|n| !names.contains(n.as_str())) {
        return Err(AnalyticsError::UnknownColumn(unknown.clone()));
    }

    let axis: Vec<DateTime<Utc>> = series
        .iter()
        .flat_map(|s| s.points().iter().map(|p| p.instant))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let empty_series = || -> Vec<String> {
        let mut empty: Vec<String> = series
            .iter()
            .filter(|s| s.observed_count() == 0)
            .map(|s| s.name().to_string())
            .collect();
        empty.sort();
        empty
    };

    if axis.is_empty() {
        return Err(AnalyticsError::InsufficientData {
            empty_series: empty_series(),
            dense_rows: 0,
        });
    }

    let filled: BTreeMap<String, Vec<Option<f64>>> = series
        .iter()
        .map(|s| {
            let zero_fill = zero_fill_before.contains(s.name());
            (s.name().to_string(), align(s, &axis, zero_fill))
        })
        .collect();

    let keep: Vec<bool> = (0..axis.len())
        .map(|i| filled.values().all(|col| col[i].is_some()))
        .collect();
    let dense_rows = keep.iter().filter(|k| **k).count();

    tracing::debug!(
        series = series.len(),
        candidate_rows = axis.len(),
        dense_rows,
        "Reconciled series onto common axis"
    );

    if dense_rows < MIN_PANEL_ROWS {
        return Err(AnalyticsError::InsufficientData {
            empty_series: empty_series(),
            dense_rows,
        });
    }

    let index = axis
        .iter()
        .zip(&keep)
        .filter(|(_, k)| **k)
        .map(|(t, _)| *t)
        .collect();

    let columns = filled
        .into_iter()
        .map(|(name, col)| {
            let values = col
                .into_iter()
                .zip(&keep)
                .filter(|(_, k)| **k)
                .filter_map(|(v, _)| v)
                .collect();
            (name, values)
        })
        .collect();

    Ok(Panel::from_parts(index, columns))
}

/// Forward fill `series` onto `axis`
fn align(series: &Series, axis: &[DateTime<Utc>], zero_fill: bool) -> Vec<Option<f64>> {
    let points = series.points();
    let mut cursor = 0;
    let mut last = None;

    axis.iter()
        .map(|instant| {
            while cursor < points.len() && points[cursor].instant <= *instant {
                if let Some(v) = points[cursor].value {
                    last = Some(v);
                }
                cursor += 1;
            }
            match last {
                None if zero_fill => Some(0.0),
                other => other,
            }
        })
        .collect()
}
