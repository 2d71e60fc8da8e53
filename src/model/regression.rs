//! Single-variable OLS fair value regression
//!
//! Fits `dependent = slope * independent + intercept` over the rows at or
//! after the training start, then projects the frozen line across the whole
//! panel so the deviation is visible both in and out of sample.

use super::{FairValueModel, FitSpec, Projection};
use crate::error::{AnalyticsError, AnalyticsResult};
use crate::series::stats::{moments, trailing_mean};
use crate::series::{DerivedPoint, DerivedSeries, DerivedValue, Panel, UndefinedReason};

/// Training rows required before a line is fit
pub const MIN_TRAINING_ROWS: usize = 30;

/// OLS fitter with a configurable minimum training size
#[derive(Debug, Clone)]
pub struct RegressionFitter {
    pub min_training_rows: usize,
}

impl RegressionFitter {
    pub fn new(min_training_rows: usize) -> Self {
        Self { min_training_rows }
    }

    /// Fit the model described by `spec` on `panel`
    pub fn fit(&self, panel: &Panel, spec: &FitSpec) -> AnalyticsResult<FairValueModel> {
        let regressor = regressor(panel, &spec.independent, spec.smoothing)?;
        let dependent = panel.column(&spec.dependent)?;

        let (xs, ys): (Vec<f64>, Vec<f64>) = panel
            .index()
            .iter()
            .zip(regressor.iter().zip(dependent))
            .filter(|(instant, _)| **instant >= spec.training_start)
            .filter_map(|(_, (x, y))| x.map(|x| (x, *y)))
            .unzip();

        let required = self.min_training_rows.max(2);
        if xs.len() < required {
            return Err(AnalyticsError::InsufficientTrainingData {
                training_start: spec.training_start,
                rows: xs.len(),
                required,
            });
        }

        let m = moments(&xs, &ys).ok_or_else(|| AnalyticsError::InsufficientTrainingData {
            training_start: spec.training_start,
            rows: xs.len(),
            required,
        })?;
        if m.sxx == 0.0 {
            return Err(AnalyticsError::DegenerateTrainingData {
                column: spec.independent.clone(),
                training_start: spec.training_start,
            });
        }

        let slope = m.sxy / m.sxx;
        let intercept = m.mean_y - slope * m.mean_x;
        let r_squared = if m.syy == 0.0 {
            0.0
        } else {
            ((m.sxy * m.sxy) / (m.sxx * m.syy)).clamp(0.0, 1.0)
        };

        tracing::debug!(
            independent = %spec.independent,
            dependent = %spec.dependent,
            rows = xs.len(),
            slope,
            intercept,
            r_squared,
            "Fitted fair value regression"
        );

        Ok(FairValueModel {
            slope,
            intercept,
            training_start: spec.training_start,
            r_squared,
            training_rows: xs.len(),
            independent: spec.independent.clone(),
            dependent: spec.dependent.clone(),
            smoothing: spec.smoothing,
        })
    }
}

impl Default for RegressionFitter {
    fn default() -> Self {
        Self::new(MIN_TRAINING_ROWS)
    }
}

/// Fit with the default minimum of 30 training rows
pub fn fit(panel: &Panel, spec: &FitSpec) -> AnalyticsResult<FairValueModel> {
    RegressionFitter::default().fit(panel, spec)
}

/// Apply a frozen model to every row of `panel`
pub fn project(model: &FairValueModel, panel: &Panel) -> AnalyticsResult<Projection> {
    let regressor = regressor(panel, &model.independent, model.smoothing)?;
    let dependent = panel.column(&model.dependent)?;

    let mut fair_value = Vec::with_capacity(panel.len());
    let mut deviation_pct = Vec::with_capacity(panel.len());

    for ((instant, x), y) in panel.index().iter().zip(&regressor).zip(dependent) {
        let (fair, deviation) = match x {
            None => {
                let undefined = DerivedValue::Undefined(UndefinedReason::InsufficientHistory);
                (undefined, undefined)
            }
            Some(x) => {
                let fair = model.slope * x + model.intercept;
                let deviation = if fair == 0.0 {
                    DerivedValue::Undefined(UndefinedReason::ZeroFairValue)
                } else {
                    DerivedValue::Defined((y - fair) / fair * 100.0)
                };
                (DerivedValue::Defined(fair), deviation)
            }
        };
        fair_value.push(DerivedPoint {
            instant: *instant,
            value: fair,
        });
        deviation_pct.push(DerivedPoint {
            instant: *instant,
            value: deviation,
        });
    }

    Ok(Projection {
        fair_value: DerivedSeries {
            name: format!("{}_fair_value", model.dependent),
            points: fair_value,
        },
        deviation_pct: DerivedSeries {
            name: format!("{}_deviation_pct", model.dependent),
            points: deviation_pct,
        },
    })
}

/// Regressor column, optionally smoothed with a trailing mean
fn regressor(
    panel: &Panel,
    column: &str,
    smoothing: Option<usize>,
) -> AnalyticsResult<Vec<Option<f64>>> {
    let raw = panel.column(column)?;
    match smoothing {
        None => Ok(raw.iter().copied().map(Some).collect()),
        Some(0) => Err(AnalyticsError::InvalidParameter(
            "smoothing window must be positive".to_string(),
        )),
        Some(window) => {
            let values: Vec<Option<f64>> = raw.iter().copied().map(Some).collect();
            Ok(trailing_mean(&values, window))
        }
    }
}
