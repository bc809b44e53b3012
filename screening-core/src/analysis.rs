//! Scoring service request/response schema
//!
//! Responses are parsed once at the boundary into typed values with
//! explicit optional fields, so nothing downstream reads raw JSON.

use crate::error::{Result, ScreeningError};
use crate::features::PolicyFeaturePayload;
use crate::indicators::{Gauge, RiskLevel, ThresholdTable};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Parsed `/predict` response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub score: Option<f64>,
    pub severity: Option<f64>,
    /// Per-step values; a null or non-numeric cell stays as `None` so later
    /// steps keep their position
    pub gdp: Vec<Option<f64>>,
    pub trade: Vec<Option<f64>>,
    pub fdi: Vec<Option<f64>>,
    pub explanation: Option<String>,
    #[serde(skip)]
    pub raw: Value,
}

/// One chart row zipped from the result series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    pub gdp: Option<f64>,
    pub trade: Option<f64>,
    pub fdi: Option<f64>,
}

impl AnalysisResult {
    pub fn from_value(raw: Value) -> Result<Self> {
        let fields = service_object(&raw)?;

        let result = Self {
            score: scalar_or_first(fields.get("score")),
            severity: fields.get("severity").and_then(finite),
            gdp: series(fields.get("gdp")),
            trade: series(fields.get("trade")),
            fdi: series(fields.get("fdi")),
            explanation: fields
                .get("explanation")
                .and_then(Value::as_str)
                .map(str::to_string),
            raw: Value::Null,
        };

        if result.score.is_none()
            && result.severity.is_none()
            && result.gdp.is_empty()
            && result.trade.is_empty()
            && result.fdi.is_empty()
            && result.explanation.is_none()
        {
            return Err(ScreeningError::MalformedResponse(
                "none of score, severity, gdp, trade, fdi or explanation present".to_string(),
            ));
        }

        Ok(Self { raw, ..result })
    }

    /// Rows labelled `T0, T1, ...` over the longest of the three series
    pub fn chart_points(&self) -> Vec<ChartPoint> {
        let len = self.gdp.len().max(self.trade.len()).max(self.fdi.len());
        (0..len)
            .map(|idx| ChartPoint {
                label: format!("T{idx}"),
                gdp: self.gdp.get(idx).copied().flatten(),
                trade: self.trade.get(idx).copied().flatten(),
                fdi: self.fdi.get(idx).copied().flatten(),
            })
            .collect()
    }

    /// Gauge driven by `score`, falling back to `severity`; both arrive on a
    /// unit scale
    pub fn gauge(&self, table: &ThresholdTable) -> Gauge {
        Gauge::from_reading(
            self.score.map(|s| s * 100.0),
            self.severity.map(|s| s * 100.0),
            table,
        )
    }
}

/// Body of `POST /explain`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplainRequest {
    pub metric: String,
    pub value: f64,
    pub context: PolicyFeaturePayload,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub explanation: String,
}

impl Explanation {
    /// A missing `explanation` field reads as empty text
    pub fn from_value(raw: Value) -> Result<Self> {
        let fields = service_object(&raw)?;
        Ok(Self {
            explanation: fields
                .get("explanation")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        })
    }
}

/// Body of `POST /macro-risk`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroRiskRequest {
    pub country_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroRisk {
    pub country: Option<String>,
    /// Clamped to `[0, 1]`
    pub risk_score: Option<f64>,
}

impl MacroRisk {
    pub fn from_value(raw: Value) -> Result<Self> {
        let fields = service_object(&raw)?;
        Ok(Self {
            country: fields
                .get("country")
                .and_then(Value::as_str)
                .map(str::to_string),
            risk_score: fields
                .get("risk_score")
                .and_then(finite)
                .map(|s| s.clamp(0.0, 1.0)),
        })
    }

    pub fn level(&self, table: &ThresholdTable) -> Option<RiskLevel> {
        self.risk_score.map(|s| table.classify(s))
    }
}

// Every endpoint answers with a JSON object; a string `error` field means the
// service failed even when the HTTP status was 2xx.
fn service_object(raw: &Value) -> Result<&Map<String, Value>> {
    let fields = raw.as_object().ok_or_else(|| {
        ScreeningError::MalformedResponse(format!("expected a JSON object, got {raw}"))
    })?;

    if let Some(message) = fields.get("error").and_then(Value::as_str) {
        return Err(ScreeningError::ServiceReported(message.to_string()));
    }

    Ok(fields)
}

fn finite(value: &Value) -> Option<f64> {
    value.as_f64().filter(|v| v.is_finite())
}

fn scalar_or_first(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Array(items) => items.iter().find_map(finite),
        other => finite(other),
    }
}

fn series(value: Option<&Value>) -> Vec<Option<f64>> {
    match value {
        Some(Value::Array(items)) => items.iter().map(finite).collect(),
        Some(other) => finite(other).map(Some).into_iter().collect(),
        None => Vec::new(),
    }
}
