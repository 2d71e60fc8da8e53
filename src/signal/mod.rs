//! Signal module
//!
//! Caller-level readings of the analytics outputs: credit stress alerts,
//! regression fit quality, valuation and toxicity bands

mod stress;
mod types;

pub use stress::StressAssessment;
pub use types::{
    AlertLevel, FitQuality, FitThresholds, StressThresholds, ToxicityLevel, ToxicityThresholds,
    Valuation,
};
