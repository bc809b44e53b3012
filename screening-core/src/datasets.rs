//! Bundled reference series: per sanction-type scenarios, per issuing
//! country before/after comparisons and the country risk table.

use crate::error::{Result, ScreeningError};
use crate::indicators::{percent_change, OneDecimalPct, RiskLevel};
use serde::{Deserialize, Serialize};
use std::fmt;

const SCENARIO_SERIES: &str = include_str!("../data/scenario_series.json");
const COUNTRY_IMPACT: &str = include_str!("../data/country_impact.json");
const COUNTRY_RISK: &str = include_str!("../data/country_risk.json");

/// Yearly series for one class of sanctions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScenarioSeries {
    pub sanction_type: String,
    pub years: Vec<String>,
    pub gdp: Vec<f64>,
    pub trade_before: Vec<f64>,
    pub trade_after: Vec<f64>,
    pub fdi: Vec<f64>,
}

/// Before/after series attributed to one issuing country
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CountryImpact {
    pub country: String,
    pub years: Vec<String>,
    pub gdp_before: Vec<f64>,
    pub gdp_after: Vec<f64>,
    pub trade_before: Vec<f64>,
    pub trade_after: Vec<f64>,
    pub fdi_before: Vec<f64>,
    pub fdi_after: Vec<f64>,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CountryRisk {
    pub country: String,
    pub risk_level: RiskLevel,
    pub compliance_score: u8,
    pub sanction_count: u32,
    pub impact_summary: String,
}

/// Headline changes shown above a set of charts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesStats {
    pub gdp_change: Option<f64>,
    pub trade_change_pct: Option<f64>,
    pub fdi_change_pct: Option<f64>,
}

impl fmt::Display for SeriesStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.gdp_change {
            Some(v) => write!(f, "GDP {v:+.1} pp")?,
            None => f.write_str("GDP n/a")?,
        }
        write!(
            f,
            ", trade {}, FDI {}",
            OneDecimalPct(self.trade_change_pct),
            OneDecimalPct(self.fdi_change_pct)
        )
    }
}

impl ScenarioSeries {
    /// GDP first→last difference; trade from first "before" to last "after";
    /// FDI first→last
    pub fn stats(&self) -> SeriesStats {
        SeriesStats {
            gdp_change: edge_diff(self.gdp.first(), self.gdp.last()),
            trade_change_pct: edge_pct(self.trade_before.first(), self.trade_after.last()),
            fdi_change_pct: edge_pct(self.fdi.first(), self.fdi.last()),
        }
    }
}

impl CountryImpact {
    /// Compares the final "after" values against the final "before" values
    pub fn stats(&self) -> SeriesStats {
        SeriesStats {
            gdp_change: edge_diff(self.gdp_before.last(), self.gdp_after.last()),
            trade_change_pct: edge_pct(self.trade_before.last(), self.trade_after.last()),
            fdi_change_pct: edge_pct(self.fdi_before.last(), self.fdi_after.last()),
        }
    }
}

fn edge_diff(from: Option<&f64>, to: Option<&f64>) -> Option<f64> {
    Some(to? - from?)
}

fn edge_pct(from: Option<&f64>, to: Option<&f64>) -> Option<f64> {
    percent_change(*from?, *to?)
}

pub fn scenario_series() -> Result<Vec<ScenarioSeries>> {
    Ok(serde_json::from_str(SCENARIO_SERIES)?)
}

pub fn country_impacts() -> Result<Vec<CountryImpact>> {
    Ok(serde_json::from_str(COUNTRY_IMPACT)?)
}

pub fn country_risks() -> Result<Vec<CountryRisk>> {
    Ok(serde_json::from_str(COUNTRY_RISK)?)
}

/// Case-insensitive lookup by sanction type name (e.g. "Trade Sanctions")
pub fn scenario(sanction_type: &str) -> Result<ScenarioSeries> {
    scenario_series()?
        .into_iter()
        .find(|s| s.sanction_type.eq_ignore_ascii_case(sanction_type.trim()))
        .ok_or_else(|| ScreeningError::InvalidInput(format!("unknown sanction type: {sanction_type}")))
}

pub fn country_impact(country: &str) -> Result<CountryImpact> {
    country_impacts()?
        .into_iter()
        .find(|c| c.country.eq_ignore_ascii_case(country.trim()))
        .ok_or_else(|| ScreeningError::InvalidInput(format!("unknown impact country: {country}")))
}
