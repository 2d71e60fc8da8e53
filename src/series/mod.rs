//! Time series module
//!
//! Series and panel value types, and the reconciler that aligns
//! heterogeneous-frequency series onto one dense panel.

mod panel;
mod reconcile;
pub(crate) mod stats;
mod types;

pub use panel::{CorrelationMatrix, Panel, PanelRow};
pub use reconcile::{reconcile, MIN_PANEL_ROWS};
pub use types::{
    year_start, DerivedPoint, DerivedSeries, DerivedValue, Series, TimePoint, UndefinedReason,
};
