use analysis_client::{AnalysisDispatcher, ClientConfig, HttpAnalysisClient, ToggleOutcome};
use anyhow::{anyhow, bail, Context as _, Result};
use screening_core::datasets;
use screening_core::indicators::{OneDecimal, OneDecimalPct};
use screening_core::{
    AnalysisResult, Catalog, ExplainRequest, ImpactDelta, PolicyFeaturePayload, PolicyRecord,
    SanctionEntity, TypeFilter, GAUGE_THRESHOLDS, RISK_SCORE_THRESHOLDS,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Shared inputs of every command
pub struct Context {
    pub catalog: Arc<Catalog>,
    pub client_config: ClientConfig,
    pub json: bool,
}

impl Context {
    fn entity(&self, name: &str) -> Result<&SanctionEntity> {
        self.catalog
            .find_by_name(name)
            .ok_or_else(|| anyhow!("No catalog entry named {:?}", name))
    }

    fn dispatcher(&self) -> Result<AnalysisDispatcher<HttpAnalysisClient>> {
        let client = Arc::new(HttpAnalysisClient::new(self.client_config.clone())?);
        let metrics = client.metrics().clone();
        Ok(AnalysisDispatcher::with_metrics(
            client,
            self.catalog.clone(),
            metrics,
        ))
    }

    fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce() -> String) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            println!("{}", text());
        }
        Ok(())
    }
}

pub fn search(ctx: &Context, query: &str, type_filter: TypeFilter) -> Result<()> {
    let matches = ctx.catalog.filter(query, type_filter);
    info!("{} of {} entities match", matches.len(), ctx.catalog.len());

    ctx.emit(&matches, || {
        let mut out = String::new();
        for e in &matches {
            out.push_str(&format!(
                "{:<40} {:<13} {:<8} {:<9} {:<14} {}\n",
                e.name,
                e.entity_type.as_str(),
                e.country,
                e.status.as_str(),
                e.list,
                e.id().short()
            ));
        }
        out.push_str(&format!("{} result(s)", matches.len()));
        out
    })
}

pub fn features(ctx: &Context, name: &str) -> Result<()> {
    let payload = PolicyFeaturePayload::from_entity(ctx.entity(name)?);
    // Payload is JSON in both modes
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

pub async fn analyze(ctx: &Context, name: Option<&str>, record: Option<&str>) -> Result<()> {
    let dispatcher = ctx.dispatcher()?;

    let result = match (name, record) {
        (_, Some(record)) => {
            let record: PolicyRecord =
                serde_json::from_str(record).context("Invalid policy record JSON")?;
            dispatcher.analyze_record(&record).await?
        }
        (Some(name), None) => {
            let id = ctx.entity(name)?.id();
            let row = dispatcher
                .with_view(|view| view.row_of(&id))
                .ok_or_else(|| anyhow!("{} is not in the current view", name))?;
            match dispatcher.toggle(row).await? {
                ToggleOutcome::Completed(result) => result,
                ToggleOutcome::Cached(cached) => cached.result,
                other => bail!("Analysis for {} did not complete: {:?}", name, other),
            }
        }
        (None, None) => bail!("Either an entity name or --record is required"),
    };

    debug!(
        "Metrics after analysis:\n{}",
        dispatcher.metrics().render().unwrap_or_default()
    );
    ctx.emit(&result, || render_result(&result))
}

fn render_result(result: &AnalysisResult) -> String {
    let gauge = result.gauge(&GAUGE_THRESHOLDS);
    let mut out = format!("Impact score: {:.0}% ({})\n", gauge.percent, gauge.level);
    if let Some(score) = result.score {
        out.push_str(&format!(
            "Risk bucket:  {}\n",
            RISK_SCORE_THRESHOLDS.classify(score)
        ));
    }

    let points = result.chart_points();
    if !points.is_empty() {
        out.push_str(&format!("{:<6} {:>10} {:>10} {:>10}\n", "", "GDP", "Trade", "FDI"));
        for p in &points {
            out.push_str(&format!(
                "{:<6} {:>10} {:>10} {:>10}\n",
                p.label,
                OneDecimal(p.gdp).to_string(),
                OneDecimal(p.trade).to_string(),
                OneDecimal(p.fdi).to_string()
            ));
        }
    }
    if let Some(explanation) = &result.explanation {
        out.push_str(explanation);
    }
    out.trim_end().to_string()
}

pub fn impact(ctx: &Context, name: &str) -> Result<()> {
    let entity = ctx.entity(name)?;
    let delta = ImpactDelta::from_series(&entity.impact_data);

    ctx.emit(&delta, || match &delta {
        Some(delta) => format!("{}: {}", entity.name, delta),
        None => format!("{}: no impact data recorded", entity.name),
    })
}

pub fn scenario(ctx: &Context, sanction_type: Option<&str>) -> Result<()> {
    let series = match sanction_type {
        Some(name) => vec![datasets::scenario(name)?],
        None => datasets::scenario_series()?,
    };
    let rows: Vec<_> = series
        .iter()
        .map(|s| (s.sanction_type.as_str(), s.stats()))
        .collect();

    ctx.emit(&rows, || {
        rows.iter()
            .map(|(name, stats)| format!("{:<20} {}", name, stats))
            .collect::<Vec<_>>()
            .join("\n")
    })
}

pub fn country(ctx: &Context, name: Option<&str>) -> Result<()> {
    let impacts = match name {
        Some(name) => vec![datasets::country_impact(name)?],
        None => datasets::country_impacts()?,
    };
    let rows: Vec<_> = impacts
        .iter()
        .map(|c| (c.country.as_str(), c.stats()))
        .collect();

    ctx.emit(&rows, || {
        rows.iter()
            .map(|(name, stats)| format!("{:<8} {}", name, stats))
            .collect::<Vec<_>>()
            .join("\n")
    })
}

pub fn risk(ctx: &Context) -> Result<()> {
    let risks = datasets::country_risks()?;

    ctx.emit(&risks, || {
        risks
            .iter()
            .map(|r| {
                format!(
                    "{:<14} {:<9} compliance {:>3}  sanctions {:>4}  {}",
                    r.country, r.risk_level.as_str(), r.compliance_score, r.sanction_count, r.impact_summary
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    })
}

pub async fn explain(ctx: &Context, name: &str, metric: &str, value: f64) -> Result<()> {
    let entity = ctx.entity(name)?;
    let request = ExplainRequest {
        metric: metric.to_string(),
        value,
        context: PolicyFeaturePayload::from_entity(entity),
    };
    let explanation = ctx.dispatcher()?.explain(&request).await?;

    ctx.emit(&explanation, || {
        if explanation.explanation.is_empty() {
            "No explanation returned".to_string()
        } else {
            explanation.explanation.clone()
        }
    })
}

pub async fn macro_risk(ctx: &Context, country_code: &str) -> Result<()> {
    let risk = ctx.dispatcher()?.macro_risk(country_code).await?;
    let level = risk.level(&RISK_SCORE_THRESHOLDS);

    ctx.emit(&risk, || {
        let country = risk.country.as_deref().unwrap_or(country_code);
        match (risk.risk_score, level) {
            (Some(score), Some(level)) => format!(
                "{}: risk {} ({})",
                country,
                OneDecimalPct(Some(score * 100.0)),
                level
            ),
            _ => format!("{}: no risk score returned", country),
        }
    })
}
