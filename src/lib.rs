//! liquidity-monitor: Liquidity and credit stress analytics
//!
//! This library provides the core components for:
//! - Reconciling time series of different frequencies onto one dense panel
//! - Derived metrics (net liquidity, credit stress spread) from unit-scaled
//!   formulas
//! - A fair value regression of asset price on liquidity, with R² and
//!   percentage deviation
//! - VPIN order-flow toxicity over volume-clock buckets
//! - Alert levels interpreting those outputs
//! - Parquet snapshot providers with an explicit cache
//! - Structured logging and pipeline metrics

pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod metric;
pub mod model;
pub mod monitor;
pub mod series;
pub mod signal;
pub mod telemetry;
pub mod toxicity;
