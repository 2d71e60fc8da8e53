//! Series value types

use crate::error::{AnalyticsError, AnalyticsResult};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A single observation; `None` marks a missing value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimePoint {
    pub instant: DateTime<Utc>,
    pub value: Option<f64>,
}

impl TimePoint {
    /// Create an observed point. Non-finite values are stored as missing.
    pub fn new(instant: DateTime<Utc>, value: f64) -> Self {
        Self {
            instant,
            value: Some(value).filter(|v| v.is_finite()),
        }
    }

    /// Create an explicitly missing point
    pub fn missing(instant: DateTime<Utc>) -> Self {
        Self {
            instant,
            value: None,
        }
    }
}

/// Named sequence of observations, strictly ascending by instant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    name: String,
    points: Vec<TimePoint>,
}

impl Series {
    /// Build a series, sorting by instant and rejecting repeated instants
    pub fn new(name: impl Into<String>, mut points: Vec<TimePoint>) -> AnalyticsResult<Self> {
        let name = name.into();
        points.sort_by_key(|p| p.instant);

        if let Some(pair) = points.windows(2).find(|w| w[0].instant == w[1].instant) {
            return Err(AnalyticsError::DuplicateInstant {
                series: name,
                instant: pair[0].instant,
            });
        }

        for point in &mut points {
            point.value = point.value.filter(|v| v.is_finite());
        }

        Ok(Self { name, points })
    }

    /// Build a series from `(instant, value)` pairs
    pub fn from_values(
        name: impl Into<String>,
        values: impl IntoIterator<Item = (DateTime<Utc>, f64)>,
    ) -> AnalyticsResult<Self> {
        let points = values
            .into_iter()
            .map(|(instant, value)| TimePoint::new(instant, value))
            .collect();
        Self::new(name, points)
    }

    /// Points must already be strictly ascending
    pub(crate) fn from_sorted(name: impl Into<String>, points: Vec<TimePoint>) -> Self {
        debug_assert!(points.windows(2).all(|w| w[0].instant < w[1].instant));
        Self {
            name: name.into(),
            points,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Same observations under a different name
    pub fn renamed(self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            points: self.points,
        }
    }

    pub fn points(&self) -> &[TimePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of non-missing observations
    pub fn observed_count(&self) -> usize {
        self.points.iter().filter(|p| p.value.is_some()).count()
    }

    /// Instant of the first non-missing observation
    pub fn first_observation(&self) -> Option<DateTime<Utc>> {
        self.points
            .iter()
            .find(|p| p.value.is_some())
            .map(|p| p.instant)
    }

    /// Most recent non-missing observation
    pub fn latest(&self) -> Option<(DateTime<Utc>, f64)> {
        self.points
            .iter()
            .rev()
            .find_map(|p| p.value.map(|v| (p.instant, v)))
    }

    /// Non-missing observations in instant order
    pub fn observations(&self) -> impl Iterator<Item = (DateTime<Utc>, f64)> + '_ {
        self.points
            .iter()
            .filter_map(|p| p.value.map(|v| (p.instant, v)))
    }

    pub fn values(&self) -> impl Iterator<Item = Option<f64>> + '_ {
        self.points.iter().map(|p| p.value)
    }
}

/// Why a derived value carries no number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UndefinedReason {
    /// Deviation against a zero fair value
    ZeroFairValue,
    /// Trailing window has not filled yet
    InsufficientHistory,
}

/// Output value that may be defined-but-meaningless
///
/// Kept distinct from missing input data so callers can choose to omit or warn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivedValue {
    Defined(f64),
    Undefined(UndefinedReason),
}

impl DerivedValue {
    pub fn value(&self) -> Option<f64> {
        match self {
            DerivedValue::Defined(v) => Some(*v),
            DerivedValue::Undefined(_) => None,
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, DerivedValue::Defined(_))
    }
}

/// A derived output at one instant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedPoint {
    pub instant: DateTime<Utc>,
    pub value: DerivedValue,
}

/// Named output series of derived values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedSeries {
    pub name: String,
    pub points: Vec<DerivedPoint>,
}

impl DerivedSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Value at an instant, if the series covers it
    pub fn at(&self, instant: DateTime<Utc>) -> Option<DerivedValue> {
        self.points
            .binary_search_by_key(&instant, |p| p.instant)
            .ok()
            .map(|i| self.points[i].value)
    }

    /// Last point, defined or not
    pub fn last(&self) -> Option<&DerivedPoint> {
        self.points.last()
    }

    /// Count of points carrying a number
    pub fn defined_count(&self) -> usize {
        self.points.iter().filter(|p| p.value.is_defined()).count()
    }
}

/// Midnight UTC on January 1st of `year`
///
/// Used for the user-selected training and display window bounds.
pub fn year_start(year: i32) -> AnalyticsResult<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(year, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| AnalyticsError::InvalidParameter(format!("invalid window year {year}")))
}
