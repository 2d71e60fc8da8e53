//! Signal types and thresholds
//!
//! Interpretation of engine outputs. The analytics engines report raw
//! numbers; these levels are the caller's reading of them.

use crate::series::DerivedValue;
use serde::{Deserialize, Serialize};

/// Credit stress alert level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    /// Spread steady or narrowing
    Stable,
    /// Spread widening quickly
    Warning,
    /// Spread above the critical level
    Critical,
}

/// How much weight the fair value regression deserves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitQuality {
    Weak,
    Moderate,
    Trustworthy,
}

impl FitQuality {
    pub fn classify(r_squared: f64, thresholds: &FitThresholds) -> Self {
        if r_squared > thresholds.trustworthy {
            FitQuality::Trustworthy
        } else if r_squared < thresholds.weak {
            FitQuality::Weak
        } else {
            FitQuality::Moderate
        }
    }
}

/// Whether price trades above or below its liquidity-implied value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Valuation {
    Premium,
    Discount,
    Fair,
}

impl Valuation {
    pub fn classify(deviation: DerivedValue) -> Option<Self> {
        let pct = deviation.value()?;
        Some(if pct > 0.0 {
            Valuation::Premium
        } else if pct < 0.0 {
            Valuation::Discount
        } else {
            Valuation::Fair
        })
    }
}

/// Order-flow toxicity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToxicityLevel {
    /// Window not yet filled
    Unknown,
    Normal,
    Elevated,
    Severe,
}

impl ToxicityLevel {
    pub fn classify(toxicity: DerivedValue, thresholds: &ToxicityThresholds) -> Self {
        match toxicity.value() {
            None => ToxicityLevel::Unknown,
            Some(v) if v > thresholds.severe => ToxicityLevel::Severe,
            Some(v) if v > thresholds.elevated => ToxicityLevel::Elevated,
            Some(_) => ToxicityLevel::Normal,
        }
    }
}

/// Stress spread thresholds, in spread percentage points
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StressThresholds {
    /// Level above which the spread is critical
    #[serde(default = "default_critical_level")]
    pub critical_level: f64,
    /// Widening over the lookback that triggers a warning
    #[serde(default = "default_warning_change")]
    pub warning_change: f64,
    /// Observations between the compared values
    #[serde(default = "default_lookback")]
    pub lookback: usize,
}

fn default_critical_level() -> f64 {
    6.0
}
fn default_warning_change() -> f64 {
    0.5
}
fn default_lookback() -> usize {
    30
}

impl Default for StressThresholds {
    fn default() -> Self {
        Self {
            critical_level: 6.0,
            warning_change: 0.5,
            lookback: 30,
        }
    }
}

/// R² bands
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FitThresholds {
    #[serde(default = "default_weak")]
    pub weak: f64,
    #[serde(default = "default_trustworthy")]
    pub trustworthy: f64,
}

fn default_weak() -> f64 {
    0.3
}
fn default_trustworthy() -> f64 {
    0.7
}

impl Default for FitThresholds {
    fn default() -> Self {
        Self {
            weak: 0.3,
            trustworthy: 0.7,
        }
    }
}

/// VPIN bands
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ToxicityThresholds {
    #[serde(default = "default_elevated")]
    pub elevated: f64,
    #[serde(default = "default_severe")]
    pub severe: f64,
}

fn default_elevated() -> f64 {
    0.6
}
fn default_severe() -> f64 {
    0.8
}

impl Default for ToxicityThresholds {
    fn default() -> Self {
        Self {
            elevated: 0.6,
            severe: 0.8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::UndefinedReason;

    #[test]
    fn test_fit_quality_bands() {
        let t = FitThresholds::default();
        assert_eq!(FitQuality::classify(0.1, &t), FitQuality::Weak);
        assert_eq!(FitQuality::classify(0.5, &t), FitQuality::Moderate);
        assert_eq!(FitQuality::classify(0.85, &t), FitQuality::Trustworthy);
    }

    #[test]
    fn test_toxicity_levels() {
        let t = ToxicityThresholds::default();
        let undefined = DerivedValue::Undefined(UndefinedReason::InsufficientHistory);
        assert_eq!(ToxicityLevel::classify(undefined, &t), ToxicityLevel::Unknown);
        assert_eq!(
            ToxicityLevel::classify(DerivedValue::Defined(0.2), &t),
            ToxicityLevel::Normal
        );
        assert_eq!(
            ToxicityLevel::classify(DerivedValue::Defined(0.7), &t),
            ToxicityLevel::Elevated
        );
        assert_eq!(
            ToxicityLevel::classify(DerivedValue::Defined(1.3), &t),
            ToxicityLevel::Severe
        );
    }

    #[test]
    fn test_valuation() {
        assert_eq!(
            Valuation::classify(DerivedValue::Defined(12.0)),
            Some(Valuation::Premium)
        );
        assert_eq!(
            Valuation::classify(DerivedValue::Defined(-3.0)),
            Some(Valuation::Discount)
        );
        assert_eq!(
            Valuation::classify(DerivedValue::Undefined(UndefinedReason::ZeroFairValue)),
            None
        );
    }

    #[test]
    fn test_thresholds_partial_deserialize() {
        let t: StressThresholds = toml::from_str("critical_level = 5.5").unwrap();
        assert_eq!(t.critical_level, 5.5);
        assert_eq!(t.lookback, 30);
    }
}
