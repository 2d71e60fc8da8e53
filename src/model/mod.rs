//! Fair value model module
//!
//! Linear regression relating a liquidity measure to an asset price, with an
//! R² diagnostic and a full-panel projection of fair value and deviation.

mod regression;

pub use regression::{fit, project, RegressionFitter, MIN_TRAINING_ROWS};

use crate::error::AnalyticsResult;
use crate::series::{DerivedPoint, DerivedSeries, Panel};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which columns to regress and over which window
#[derive(Debug, Clone, PartialEq)]
pub struct FitSpec {
    /// Regressor column, e.g. net liquidity
    pub independent: String,
    /// Price column being explained
    pub dependent: String,
    /// Only rows at or after this instant are used for fitting
    pub training_start: DateTime<Utc>,
    /// Optional trailing SMA window applied to the regressor
    pub smoothing: Option<usize>,
}

impl FitSpec {
    pub fn new(
        independent: impl Into<String>,
        dependent: impl Into<String>,
        training_start: DateTime<Utc>,
    ) -> Self {
        Self {
            independent: independent.into(),
            dependent: dependent.into(),
            training_start,
            smoothing: None,
        }
    }

    /// Smooth the regressor before fitting and projecting
    pub fn with_smoothing(mut self, window: usize) -> Self {
        self.smoothing = Some(window);
        self
    }
}

/// Frozen result of a fit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FairValueModel {
    pub slope: f64,
    pub intercept: f64,
    pub training_start: DateTime<Utc>,
    /// Squared Pearson correlation over the training rows
    pub r_squared: f64,
    pub training_rows: usize,
    pub independent: String,
    pub dependent: String,
    pub smoothing: Option<usize>,
}

impl FairValueModel {
    /// Fair value for a single regressor value
    pub fn fair_value(&self, independent: f64) -> f64 {
        self.slope * independent + self.intercept
    }

    pub fn project(&self, panel: &Panel) -> AnalyticsResult<Projection> {
        project(self, panel)
    }
}

/// Fair value and percentage deviation at every panel instant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Projection {
    pub fair_value: DerivedSeries,
    pub deviation_pct: DerivedSeries,
}

impl Projection {
    /// Deviation at the last panel instant
    pub fn latest_deviation(&self) -> Option<&DerivedPoint> {
        self.deviation_pct.last()
    }

    /// Restrict both series to instants at or after `start`
    pub fn slice_from(&self, start: DateTime<Utc>) -> Projection {
        let keep = |s: &DerivedSeries| DerivedSeries {
            name: s.name.clone(),
            points: s
                .points
                .iter()
                .filter(|p| p.instant >= start)
                .copied()
                .collect(),
        };
        Projection {
            fair_value: keep(&self.fair_value),
            deviation_pct: keep(&self.deviation_pct),
        }
    }
}
