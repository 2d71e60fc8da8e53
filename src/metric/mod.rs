//! Derived metric module
//!
//! Composite indicators computed row-wise from panel columns

mod calculator;
mod canonical;
mod expr;

pub use calculator::{compute_metric, enrich, rolling_mean};
pub use canonical::{net_liquidity, stress_spread, ScaledColumn, NET_LIQUIDITY, STRESS_SPREAD};
pub use expr::{Expr, Metric, UnitScale};
