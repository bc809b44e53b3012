//! Derived display metrics
//!
//! Percentage deltas over yearly series, four-level risk buckets and gauge
//! readings. Every division is guarded: a zero or non-finite base yields
//! `None` instead of `inf`/`NaN`.

use crate::types::YearlyImpact;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cut points for the four risk buckets. A value must be strictly greater
/// than a cut point to reach that bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdTable {
    pub critical: f64,
    pub high: f64,
    pub medium: f64,
}

/// Normalized risk scores in `[0, 1]`
pub const RISK_SCORE_THRESHOLDS: ThresholdTable = ThresholdTable {
    critical: 0.75,
    high: 0.55,
    medium: 0.35,
};

/// Gauge percentages in `[0, 100]`
pub const GAUGE_THRESHOLDS: ThresholdTable = ThresholdTable {
    critical: 75.0,
    high: 55.0,
    medium: 35.0,
};

impl ThresholdTable {
    pub fn classify(&self, value: f64) -> RiskLevel {
        if value > self.critical {
            RiskLevel::Critical
        } else if value > self.high {
            RiskLevel::High
        } else if value > self.medium {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

impl Default for ThresholdTable {
    fn default() -> Self {
        RISK_SCORE_THRESHOLDS
    }
}

/// Bucket a normalized risk score
pub fn risk_bucket(score: f64) -> RiskLevel {
    RISK_SCORE_THRESHOLDS.classify(score)
}

/// `(after - before) / before * 100`, or `None` when `before` is zero or the
/// result is not finite
pub fn percent_change(before: f64, after: f64) -> Option<f64> {
    if before == 0.0 {
        return None;
    }
    let pct = (after - before) / before * 100.0;
    pct.is_finite().then_some(pct)
}

/// Change across a whole impact series, from the first year's "before" to
/// the last year's "after".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpactDelta {
    /// Absolute change in GDP growth, percentage points
    pub gdp_delta: f64,
    pub trade_delta_pct: Option<f64>,
    pub fdi_delta_pct: Option<f64>,
}

impl ImpactDelta {
    /// `None` for an empty series
    pub fn from_series(series: &[YearlyImpact]) -> Option<Self> {
        let first = series.first()?;
        let last = series.last()?;

        Some(Self {
            gdp_delta: last.gdp_after - first.gdp_before,
            trade_delta_pct: percent_change(first.trade_before, last.trade_after),
            fdi_delta_pct: percent_change(first.fdi_before, last.fdi_after),
        })
    }
}

impl fmt::Display for ImpactDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "GDP {:+.1} pp, trade {}, FDI {}",
            self.gdp_delta,
            OneDecimalPct(self.trade_delta_pct),
            OneDecimalPct(self.fdi_delta_pct)
        )
    }
}

/// Renders an optional percentage with one decimal, `n/a` when undefined
#[derive(Debug, Clone, Copy)]
pub struct OneDecimalPct(pub Option<f64>);

impl fmt::Display for OneDecimalPct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(v) => write!(f, "{v:.1}%"),
            None => f.write_str("n/a"),
        }
    }
}

/// Optional value with one decimal, `-` when missing
#[derive(Debug, Clone, Copy)]
pub struct OneDecimal(pub Option<f64>);

impl fmt::Display for OneDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(v) => write!(f, "{v:.1}"),
            None => f.write_str("-"),
        }
    }
}

/// Gauge reading clamped to `[0, 100]` with its bucket label
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gauge {
    pub percent: f64,
    pub level: RiskLevel,
}

impl Gauge {
    /// Uses `primary` when it is a finite number, otherwise `fallback`,
    /// otherwise zero
    pub fn from_reading(primary: Option<f64>, fallback: Option<f64>, table: &ThresholdTable) -> Self {
        let percent = primary
            .filter(|v| v.is_finite())
            .or_else(|| fallback.filter(|v| v.is_finite()))
            .unwrap_or(0.0)
            .clamp(0.0, 100.0);

        Self {
            percent,
            level: table.classify(percent),
        }
    }
}
