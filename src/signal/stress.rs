//! Credit stress assessment

use super::types::{AlertLevel, StressThresholds};
use crate::series::Series;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Latest stress spread reading and its recent change
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StressAssessment {
    pub instant: DateTime<Utc>,
    pub latest: f64,
    /// Value the change is measured against
    pub reference: f64,
    pub reference_instant: DateTime<Utc>,
    pub change: f64,
    pub level: AlertLevel,
}

impl StressAssessment {
    /// Assess the latest observation of `spread`.
    ///
    /// The change is measured against the observation `lookback` positions
    /// from the end, or the first observation when history is shorter. A
    /// lookback of zero is treated as one.
    /// Returns `None` for a series without observations.
    pub fn assess(spread: &Series, thresholds: &StressThresholds) -> Option<Self> {
        let observations: Vec<(DateTime<Utc>, f64)> = spread.observations().collect();
        let (instant, latest) = *observations.last()?;

        // A zero lookback would compare against a position past the end
        let lookback = thresholds.lookback.max(1);
        let reference_pos = observations.len().saturating_sub(lookback);
        let (reference_instant, reference) = observations[reference_pos];
        let change = latest - reference;

        let level = if latest > thresholds.critical_level {
            AlertLevel::Critical
        } else if change > thresholds.warning_change {
            AlertLevel::Warning
        } else {
            AlertLevel::Stable
        };

        Some(Self {
            instant,
            latest,
            reference,
            reference_instant,
            change,
            level,
        })
    }
}
