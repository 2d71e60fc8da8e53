//! Monitor run report and table rendering

use crate::model::{FairValueModel, Projection};
use crate::series::{CorrelationMatrix, DerivedPoint, Panel};
use crate::signal::{AlertLevel, FitQuality, StressAssessment, ToxicityLevel, Valuation};
use crate::toxicity::ScoredBucket;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write;
use uuid::Uuid;

/// Regression outcome with its interpretation
#[derive(Debug, Clone, Serialize)]
pub struct FairValueSummary {
    pub model: FairValueModel,
    pub quality: FitQuality,
    pub latest_fair_value: Option<DerivedPoint>,
    pub latest_deviation: Option<DerivedPoint>,
    /// `None` when the latest deviation is undefined
    pub valuation: Option<Valuation>,
    /// Projection restricted to the display window
    pub projection: Projection,
}

/// VPIN outcome with its interpretation
#[derive(Debug, Clone, Serialize)]
pub struct ToxicitySummary {
    pub bars_id: String,
    pub bar_count: usize,
    pub bucket_volume: f64,
    pub window: usize,
    pub buckets: Vec<ScoredBucket>,
    pub level: ToxicityLevel,
}

impl ToxicitySummary {
    pub fn latest(&self) -> Option<&ScoredBucket> {
        self.buckets.last()
    }

    pub fn format_table(&self) -> String {
        let latest = self
            .latest()
            .and_then(|b| b.toxicity.value())
            .map(|v| format!("{:.4}", v))
            .unwrap_or_else(|| "n/a".to_string());
        format!(
            r#"
ORDER-FLOW TOXICITY ({})
───────────────────────────────────────────────────────
Bars:             {}
Bucket Volume:    {:.2}
Window:           {} buckets
Buckets:          {}
Latest VPIN:      {}
Level:            {:?}
"#,
            self.bars_id,
            self.bar_count,
            self.bucket_volume,
            self.window,
            self.buckets.len(),
            latest,
            self.level,
        )
    }
}

/// Everything one monitor run produced
#[derive(Debug, Clone, Serialize)]
pub struct MonitorReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    /// Rows in the full reconciled panel
    pub rows: usize,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    /// Last panel row, reconciled and derived columns
    pub latest: BTreeMap<String, f64>,
    pub stress: Option<StressAssessment>,
    pub fair_value: Option<FairValueSummary>,
    pub toxicity: Option<ToxicitySummary>,
    /// Correlations over the display window
    pub correlation: CorrelationMatrix,
    /// Panel restricted to the display window
    pub display: Panel,
}

impl MonitorReport {
    /// Format as table for CLI output
    pub fn format_table(&self) -> String {
        let mut out = String::new();
        let date = |t: Option<DateTime<Utc>>| {
            t.map(|t| t.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "-".to_string())
        };

        let _ = write!(
            out,
            r#"
══════════════════════════════════════════════════════
               LIQUIDITY MONITOR
══════════════════════════════════════════════════════
Run:              {}
Panel:            {} rows ({} .. {})
"#,
            self.run_id,
            self.rows,
            date(self.start),
            date(self.end),
        );

        out.push_str("\nLATEST\n───────────────────────────────────────────────────────\n");
        for (name, value) in &self.latest {
            let _ = writeln!(out, "{:<18}{:.4}", format!("{}:", name), value);
        }

        if let Some(stress) = &self.stress {
            let marker = match stress.level {
                AlertLevel::Critical => "CRITICAL",
                AlertLevel::Warning => "WARNING",
                AlertLevel::Stable => "stable",
            };
            let _ = write!(
                out,
                r#"
CREDIT STRESS
───────────────────────────────────────────────────────
Spread:           {:.2}%
Change:           {:+.2} (since {})
Level:            {}
"#,
                stress.latest,
                stress.change,
                stress.reference_instant.format("%Y-%m-%d"),
                marker,
            );
        }

        if let Some(fv) = &self.fair_value {
            let fmt_point = |p: &Option<DerivedPoint>, suffix: &str| {
                p.and_then(|p| p.value.value())
                    .map(|v| format!("{:.2}{}", v, suffix))
                    .unwrap_or_else(|| "undefined".to_string())
            };
            let _ = write!(
                out,
                r#"
FAIR VALUE ({} ~ {})
───────────────────────────────────────────────────────
Slope:            {:.4}
Intercept:        {:.4}
R²:               {:.3} ({:?})
Training Rows:    {} since {}
Fair Value:       {}
Deviation:        {}
Valuation:        {}
"#,
                fv.model.dependent,
                fv.model.independent,
                fv.model.slope,
                fv.model.intercept,
                fv.model.r_squared,
                fv.quality,
                fv.model.training_rows,
                fv.model.training_start.format("%Y-%m-%d"),
                fmt_point(&fv.latest_fair_value, ""),
                fmt_point(&fv.latest_deviation, "%"),
                fv.valuation
                    .map(|v| format!("{:?}", v))
                    .unwrap_or_else(|| "n/a".to_string()),
            );
        }

        if let Some(toxicity) = &self.toxicity {
            out.push_str(&toxicity.format_table());
        }

        out.push_str("══════════════════════════════════════════════════════\n");
        out
    }
}
