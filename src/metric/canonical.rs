//! Canonical liquidity and credit stress metrics

use super::expr::{Expr, Metric, UnitScale};

pub const NET_LIQUIDITY: &str = "net_liquidity";
pub const STRESS_SPREAD: &str = "stress_spread";

/// A panel column and the divisor that brings it to the metric's unit
#[derive(Debug, Clone, PartialEq)]
pub struct ScaledColumn {
    pub name: String,
    pub scale: UnitScale,
}

impl ScaledColumn {
    pub fn new(name: impl Into<String>, scale: UnitScale) -> Self {
        Self {
            name: name.into(),
            scale,
        }
    }

    fn expr(&self) -> Expr {
        Expr::scaled_column(self.name.as_str(), self.scale)
    }
}

/// Central bank assets minus the treasury cash account minus the overnight
/// reverse-repo facility, each normalized by its own divisor
pub fn net_liquidity(
    asset_base: &ScaledColumn,
    drawdown_account: &ScaledColumn,
    overnight_facility: &ScaledColumn,
) -> Metric {
    Metric::new(
        NET_LIQUIDITY,
        "trillions USD",
        asset_base.expr() - drawdown_account.expr() - overnight_facility.expr(),
    )
}

/// High-risk minus medium-risk tranche option-adjusted spread.
/// Widening means credit conditions are deteriorating.
pub fn stress_spread(high_risk: &str, medium_risk: &str) -> Metric {
    Metric::new(
        STRESS_SPREAD,
        "%",
        Expr::column(high_risk) - Expr::column(medium_risk),
    )
}
