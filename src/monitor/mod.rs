//! Monitoring pipeline
//!
//! Wires providers, the analytics core and the signal layer into one run:
//! fetch, reconcile, enrich, fit, assess, score.

mod pipeline;
mod report;

pub use pipeline::Monitor;
pub use report::{FairValueSummary, MonitorReport, ToxicitySummary};
