//! Dense, co-indexed panel of reconciled columns

use super::stats;
use super::types::{Series, TimePoint};
use crate::error::{AnalyticsError, AnalyticsResult};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Columns sharing one strictly increasing instant axis, with no gaps
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Panel {
    index: Vec<DateTime<Utc>>,
    columns: BTreeMap<String, Vec<f64>>,
}

/// One panel row, columns in name order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelRow<'a> {
    pub instant: DateTime<Utc>,
    pub values: BTreeMap<&'a str, f64>,
}

impl<'a> PanelRow<'a> {
    pub fn get(&self, column: &str) -> Option<f64> {
        self.values.get(column).copied()
    }
}

/// Pairwise Pearson correlations between panel columns
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// `None` where a column has no variance
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        self.values[i][j]
    }
}

impl Panel {
    pub(crate) fn from_parts(index: Vec<DateTime<Utc>>, columns: BTreeMap<String, Vec<f64>>) -> Self {
        debug_assert!(index.windows(2).all(|w| w[0] < w[1]));
        debug_assert!(columns.values().all(|c| c.len() == index.len()));
        Self { index, columns }
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn index(&self) -> &[DateTime<Utc>] {
        &self.index
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn column(&self, name: &str) -> AnalyticsResult<&[f64]> {
        self.columns
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| AnalyticsError::UnknownColumn(name.to_string()))
    }

    /// Copy a column out as a standalone series
    pub fn series(&self, name: &str) -> AnalyticsResult<Series> {
        let values = self.column(name)?;
        let points = self
            .index
            .iter()
            .zip(values)
            .map(|(instant, value)| TimePoint::new(*instant, *value))
            .collect();
        Ok(Series::from_sorted(name, points))
    }

    /// New panel with one more column
    pub fn with_column(&self, name: impl Into<String>, values: Vec<f64>) -> AnalyticsResult<Panel> {
        let name = name.into();
        if values.len() != self.index.len() {
            return Err(AnalyticsError::InvalidParameter(format!(
                "column {name} has {} values for {} panel rows",
                values.len(),
                self.index.len()
            )));
        }
        if self.columns.contains_key(&name) {
            return Err(AnalyticsError::InvalidParameter(format!(
                "column {name} already present"
            )));
        }

        let mut columns = self.columns.clone();
        columns.insert(name, values);
        Ok(Panel::from_parts(self.index.clone(), columns))
    }

    /// Rows at or after `start`, e.g. for a display window
    pub fn slice_from(&self, start: DateTime<Utc>) -> Panel {
        let offset = self.index.partition_point(|t| *t < start);
        let columns = self
            .columns
            .iter()
            .map(|(name, values)| (name.clone(), values[offset..].to_vec()))
            .collect();
        Panel::from_parts(self.index[offset..].to_vec(), columns)
    }

    pub fn row(&self, position: usize) -> Option<PanelRow<'_>> {
        let instant = *self.index.get(position)?;
        let values = self
            .columns
            .iter()
            .map(|(name, col)| (name.as_str(), col[position]))
            .collect();
        Some(PanelRow { instant, values })
    }

    /// Rows in ascending instant order
    pub fn rows(&self) -> impl Iterator<Item = PanelRow<'_>> {
        (0..self.len()).filter_map(move |i| self.row(i))
    }

    pub fn latest(&self) -> Option<PanelRow<'_>> {
        self.len().checked_sub(1).and_then(|i| self.row(i))
    }

    pub fn value_at(&self, column: &str, instant: DateTime<Utc>) -> Option<f64> {
        let position = self.index.binary_search(&instant).ok()?;
        self.columns.get(column).map(|c| c[position])
    }

    pub fn correlation_matrix(&self) -> CorrelationMatrix {
        let columns: Vec<String> = self.columns.keys().cloned().collect();
        let values = self
            .columns
            .values()
            .map(|a| {
                self.columns
                    .values()
                    .map(|b| stats::pearson(a, b))
                    .collect()
            })
            .collect();
        CorrelationMatrix { columns, values }
    }
}
