//! Scoring service interface

use crate::Result;
use async_trait::async_trait;
use screening_core::{
    AnalysisResult, ExplainRequest, Explanation, MacroRisk, MacroRiskRequest, PolicyFeaturePayload,
};

/// Scoring endpoint
pub const PREDICT_PATH: &str = "/predict";
/// Explanation endpoint
pub const EXPLAIN_PATH: &str = "/explain";
/// Country risk endpoint
pub const MACRO_RISK_PATH: &str = "/macro-risk";

/// Remote impact scoring service
#[async_trait]
pub trait AnalysisService: Send + Sync {
    /// Score one policy feature payload
    async fn predict(&self, payload: &PolicyFeaturePayload) -> Result<AnalysisResult>;

    /// Narrative explanation for one metric value
    async fn explain(&self, request: &ExplainRequest) -> Result<Explanation>;

    /// Country-level macro risk
    async fn macro_risk(&self, request: &MacroRiskRequest) -> Result<MacroRisk>;
}
