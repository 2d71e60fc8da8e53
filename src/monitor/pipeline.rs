//! Monitor pipeline

use super::report::{FairValueSummary, MonitorReport, ToxicitySummary};
use crate::config::{Config, ModelConfig, ToxicityConfig};
use crate::data::{BarProvider, SeriesProvider, SeriesRequest};
use crate::metric::{enrich, net_liquidity, stress_spread, Metric, ScaledColumn, STRESS_SPREAD};
use crate::model::{FitSpec, RegressionFitter};
use crate::series::{reconcile, year_start, Panel, Series};
use crate::signal::{FitQuality, StressAssessment, ToxicityLevel, Valuation};
use crate::telemetry::{record_failure, record_stage, set_gauge, GaugeMetric, StageMetric};
use crate::toxicity::{BucketSizing, ToxicityEngine};
use anyhow::Context;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use uuid::Uuid;

/// Runs the configured analytics over provider data
pub struct Monitor {
    config: Config,
    series_provider: Arc<dyn SeriesProvider>,
    bar_provider: Option<Arc<dyn BarProvider>>,
}

impl Monitor {
    pub fn new(
        config: Config,
        series_provider: Arc<dyn SeriesProvider>,
        bar_provider: Option<Arc<dyn BarProvider>>,
    ) -> Self {
        Self {
            config,
            series_provider,
            bar_provider,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run every configured stage and assemble the report
    pub async fn run(&self) -> anyhow::Result<MonitorReport> {
        let run_id = Uuid::new_v4();
        tracing::info!(%run_id, series = self.config.series.len(), "Starting monitor run");

        let result = self.run_stages(run_id).await;
        if let Err(e) = &result {
            record_failure("run");
            tracing::error!(%run_id, error = %e, "Monitor run failed");
        }
        result
    }

    async fn run_stages(&self, run_id: Uuid) -> anyhow::Result<MonitorReport> {
        let series = self.fetch_series().await?;

        let started = Instant::now();
        let panel = reconcile(&series, &self.config.zero_fill_series())?;
        record_stage(StageMetric::Reconcile, started.elapsed());
        set_gauge(GaugeMetric::PanelRows, panel.len() as f64);
        tracing::info!(rows = panel.len(), "Reconciled panel");

        let started = Instant::now();
        let panel = enrich(&panel, &self.metrics()?)?;
        record_stage(StageMetric::Enrich, started.elapsed());

        let stress = if panel.has_column(STRESS_SPREAD) {
            let assessment =
                StressAssessment::assess(&panel.series(STRESS_SPREAD)?, &self.config.alerts.stress);
            if let Some(a) = &assessment {
                set_gauge(GaugeMetric::StressSpread, a.latest);
                tracing::info!(
                    spread = a.latest,
                    change = a.change,
                    level = ?a.level,
                    "Assessed credit stress"
                );
            }
            assessment
        } else {
            None
        };

        let display = match self.display_start_year() {
            Some(year) => panel.slice_from(year_start(year)?),
            None => panel.clone(),
        };

        let fair_value = match &self.config.model {
            Some(model) => Some(self.fair_value(&panel, model)?),
            None => None,
        };

        let toxicity = match &self.config.toxicity {
            Some(toxicity) => match &self.bar_provider {
                Some(bars) => Some(self.score_toxicity(bars.as_ref(), toxicity).await?),
                None => {
                    tracing::warn!("Toxicity configured without a bar provider, skipping");
                    None
                }
            },
            None => None,
        };

        let latest: BTreeMap<String, f64> = panel
            .latest()
            .map(|row| {
                row.values
                    .iter()
                    .map(|(name, value)| (name.to_string(), *value))
                    .collect()
            })
            .unwrap_or_default();

        tracing::info!(%run_id, "Monitor run complete");
        Ok(MonitorReport {
            run_id,
            generated_at: Utc::now(),
            rows: panel.len(),
            start: panel.index().first().copied(),
            end: panel.index().last().copied(),
            latest,
            stress,
            fair_value,
            toxicity,
            correlation: display.correlation_matrix(),
            display,
        })
    }

    /// Score only the configured intraday bars
    pub async fn toxicity(&self) -> anyhow::Result<ToxicitySummary> {
        let config = self
            .config
            .toxicity
            .as_ref()
            .context("no [toxicity] section configured")?;
        let bars = self
            .bar_provider
            .as_ref()
            .context("no bar provider available")?;
        self.score_toxicity(bars.as_ref(), config).await
    }

    async fn fetch_series(&self) -> anyhow::Result<Vec<Series>> {
        if self.config.series.is_empty() {
            anyhow::bail!("no series configured");
        }

        let started = Instant::now();
        let observation_start = self.config.data.observation_start(Utc::now());
        let mut tasks = JoinSet::new();
        for series_config in &self.config.series {
            let provider = Arc::clone(&self.series_provider);
            let request = SeriesRequest::between(
                series_config.source_id.as_str(),
                Some(observation_start),
                None,
            );
            let name = series_config.name.clone();
            tasks.spawn(async move {
                let series = provider
                    .fetch_series(&request)
                    .await
                    .with_context(|| format!("fetching series {}", request.series_id))?;
                Ok::<_, anyhow::Error>(series.renamed(name))
            });
        }

        let mut fetched = Vec::with_capacity(self.config.series.len());
        while let Some(joined) = tasks.join_next().await {
            fetched.push(joined??);
        }
        record_stage(StageMetric::Fetch, started.elapsed());
        tracing::info!(count = fetched.len(), since = %observation_start, "Fetched series");
        Ok(fetched)
    }

    /// Canonical metrics whose column roles are configured
    fn metrics(&self) -> anyhow::Result<Vec<Metric>> {
        let scaled = |name: &str| -> anyhow::Result<ScaledColumn> {
            let series = self
                .config
                .series_config(name)
                .with_context(|| format!("series {} is not configured", name))?;
            Ok(ScaledColumn::new(name, series.scale()?))
        };

        let mut metrics = Vec::new();
        if let Some(net) = &self.config.metrics.net_liquidity {
            metrics.push(net_liquidity(
                &scaled(&net.asset_base)?,
                &scaled(&net.drawdown_account)?,
                &scaled(&net.overnight_facility)?,
            ));
        }
        if let Some(stress) = &self.config.metrics.stress_spread {
            metrics.push(stress_spread(&stress.high_risk, &stress.medium_risk));
        }
        Ok(metrics)
    }

    fn display_start_year(&self) -> Option<i32> {
        self.config.model.as_ref().and_then(|m| m.display_start_year)
    }

    fn fair_value(&self, panel: &Panel, model: &ModelConfig) -> anyhow::Result<FairValueSummary> {
        let started = Instant::now();
        let mut spec = FitSpec::new(
            model.independent.as_str(),
            model.dependent.as_str(),
            year_start(model.training_start_year)?,
        );
        if let Some(window) = model.smoothing_window {
            spec = spec.with_smoothing(window);
        }

        let fitted = RegressionFitter::new(model.min_training_rows).fit(panel, &spec)?;
        let mut projection = fitted.project(panel)?;
        let latest_fair_value = projection.fair_value.last().copied();
        let latest_deviation = projection.latest_deviation().copied();
        if let Some(year) = model.display_start_year {
            projection = projection.slice_from(year_start(year)?);
        }
        record_stage(StageMetric::FairValue, started.elapsed());

        set_gauge(GaugeMetric::RSquared, fitted.r_squared);
        if let Some(pct) = latest_deviation.and_then(|p| p.value.value()) {
            set_gauge(GaugeMetric::DeviationPct, pct);
        }

        let quality = FitQuality::classify(fitted.r_squared, &self.config.alerts.fit);
        tracing::info!(
            slope = fitted.slope,
            r_squared = fitted.r_squared,
            quality = ?quality,
            "Fitted fair value model"
        );

        Ok(FairValueSummary {
            valuation: latest_deviation.and_then(|p| Valuation::classify(p.value)),
            quality,
            latest_fair_value,
            latest_deviation,
            projection,
            model: fitted,
        })
    }

    async fn score_toxicity(
        &self,
        provider: &dyn BarProvider,
        config: &ToxicityConfig,
    ) -> anyhow::Result<ToxicitySummary> {
        let bars = provider
            .fetch_bars(&SeriesRequest::full(config.bars_id.as_str()))
            .await
            .with_context(|| format!("fetching bars {}", config.bars_id))?;

        // Nothing to classify or no volume to size buckets from
        let traded: f64 = bars.iter().map(|b| b.volume).sum();
        if bars.len() < 2 || traded <= 0.0 {
            tracing::warn!(
                bars_id = %config.bars_id,
                bars = bars.len(),
                traded,
                "Too little traded volume to score toxicity"
            );
            let bucket_volume = match config.bucket_sizing {
                BucketSizing::Fixed { volume } => volume,
                BucketSizing::TotalFraction { .. } => 0.0,
            };
            return Ok(ToxicitySummary {
                bars_id: config.bars_id.clone(),
                bar_count: bars.len(),
                bucket_volume,
                window: config.window,
                buckets: Vec::new(),
                level: ToxicityLevel::Unknown,
            });
        }

        let started = Instant::now();
        let engine = ToxicityEngine::with_sizing(config.bucket_sizing, &bars, config.window)?;
        let buckets = engine.compute(&bars)?;
        record_stage(StageMetric::Toxicity, started.elapsed());

        let latest = buckets.last().map(|b| b.toxicity);
        if let Some(value) = latest.and_then(|t| t.value()) {
            set_gauge(GaugeMetric::Toxicity, value);
        }
        let level = match latest {
            Some(t) => ToxicityLevel::classify(t, &self.config.alerts.toxicity),
            None => ToxicityLevel::Unknown,
        };
        tracing::info!(
            bars = bars.len(),
            buckets = buckets.len(),
            bucket_volume = engine.bucket_volume(),
            level = ?level,
            "Scored order-flow toxicity"
        );

        Ok(ToxicitySummary {
            bars_id: config.bars_id.clone(),
            bar_count: bars.len(),
            bucket_volume: engine.bucket_volume(),
            window: engine.window(),
            buckets,
            level,
        })
    }
}
