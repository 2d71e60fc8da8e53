//! Metric expressions over panel columns

use crate::error::{AnalyticsError, AnalyticsResult};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use std::ops::{Add, Mul, Sub};

/// Divisor that brings a column onto the metric's common unit
///
/// Vendors publish in mixed units (millions, billions, whole units), so every
/// column reference declares its divisor instead of hard-coding one inline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UnitScale(f64);

impl UnitScale {
    pub const IDENTITY: UnitScale = UnitScale(1.0);
    pub const THOUSANDS: UnitScale = UnitScale(1_000.0);
    pub const MILLIONS: UnitScale = UnitScale(1_000_000.0);

    pub fn new(divisor: f64) -> AnalyticsResult<Self> {
        if !divisor.is_finite() || divisor <= 0.0 {
            return Err(AnalyticsError::InvalidParameter(format!(
                "unit scale divisor must be positive, got {divisor}"
            )));
        }
        Ok(Self(divisor))
    }

    pub fn divisor(&self) -> f64 {
        self.0
    }

    pub fn apply(&self, value: f64) -> f64 {
        value / self.0
    }
}

impl Default for UnitScale {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl TryFrom<Decimal> for UnitScale {
    type Error = AnalyticsError;

    fn try_from(divisor: Decimal) -> AnalyticsResult<Self> {
        let divisor: f64 = divisor.try_into().map_err(|_| {
            AnalyticsError::InvalidParameter(format!("unit scale {divisor} not representable"))
        })?;
        Self::new(divisor)
    }
}

/// Row-wise arithmetic over panel columns
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Column { name: String, scale: UnitScale },
    Constant(f64),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    /// Scalar multiplication
    Scale(Box<Expr>, f64),
    /// Column ratio; missing where the denominator is zero
    Ratio(Box<Expr>, Box<Expr>),
}

impl Expr {
    pub fn column(name: impl Into<String>) -> Self {
        Self::scaled_column(name, UnitScale::IDENTITY)
    }

    pub fn scaled_column(name: impl Into<String>, scale: UnitScale) -> Self {
        Expr::Column {
            name: name.into(),
            scale,
        }
    }

    pub fn constant(value: f64) -> Self {
        Expr::Constant(value)
    }

    pub fn ratio(self, denominator: Expr) -> Self {
        Expr::Ratio(Box::new(self), Box::new(denominator))
    }

    /// Columns referenced anywhere in the expression
    pub fn columns(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_columns(&mut out);
        out.sort_unstable();
        out.dedup();
        out
    }

    fn collect_columns<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expr::Column { name, .. } => out.push(name),
            Expr::Constant(_) => {}
            Expr::Scale(inner, _) => inner.collect_columns(out),
            Expr::Add(a, b) | Expr::Sub(a, b) | Expr::Ratio(a, b) => {
                a.collect_columns(out);
                b.collect_columns(out);
            }
        }
    }

    /// Evaluate at one row of pre-resolved columns
    pub(crate) fn evaluate(&self, columns: &HashMap<&str, &[f64]>, row: usize) -> Option<f64> {
        let value = match self {
            Expr::Column { name, scale } => scale.apply(*columns.get(name.as_str())?.get(row)?),
            Expr::Constant(v) => *v,
            Expr::Add(a, b) => a.evaluate(columns, row)? + b.evaluate(columns, row)?,
            Expr::Sub(a, b) => a.evaluate(columns, row)? - b.evaluate(columns, row)?,
            Expr::Scale(inner, k) => inner.evaluate(columns, row)? * k,
            Expr::Ratio(a, b) => {
                let denominator = b.evaluate(columns, row)?;
                if denominator == 0.0 {
                    return None;
                }
                a.evaluate(columns, row)? / denominator
            }
        };
        Some(value).filter(|v| v.is_finite())
    }
}

impl Add for Expr {
    type Output = Expr;

    fn add(self, rhs: Expr) -> Expr {
        Expr::Add(Box::new(self), Box::new(rhs))
    }
}

impl Sub for Expr {
    type Output = Expr;

    fn sub(self, rhs: Expr) -> Expr {
        Expr::Sub(Box::new(self), Box::new(rhs))
    }
}

impl Mul<f64> for Expr {
    type Output = Expr;

    fn mul(self, k: f64) -> Expr {
        Expr::Scale(Box::new(self), k)
    }
}

/// A named composite indicator with a declared unit
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    pub name: String,
    pub unit: String,
    pub expr: Expr,
}

impl Metric {
    pub fn new(name: impl Into<String>, unit: impl Into<String>, expr: Expr) -> Self {
        Self {
            name: name.into(),
            unit: unit.into(),
            expr,
        }
    }
}
