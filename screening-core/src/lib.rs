//! Sanction entity screening and impact analysis
//!
//! Catalog search, policy feature mapping, scoring-service result schema,
//! per-entity result caching and the derived display metrics (deltas, risk
//! buckets, gauges) behind the screening view.

pub mod analysis;
pub mod cache;
pub mod catalog;
pub mod datasets;
pub mod error;
pub mod features;
pub mod indicators;
pub mod types;
pub mod view;

pub use analysis::{AnalysisResult, ChartPoint, ExplainRequest, Explanation, MacroRisk, MacroRiskRequest};
pub use cache::{AnalysisCache, CachedAnalysis};
pub use catalog::Catalog;
pub use error::{Result, ScreeningError};
pub use features::{FeatureOverrides, PolicyFeaturePayload, PolicyRecord};
pub use indicators::{
    percent_change, risk_bucket, Gauge, ImpactDelta, RiskLevel, ThresholdTable, GAUGE_THRESHOLDS,
    RISK_SCORE_THRESHOLDS,
};
pub use types::{EntityId, EntityType, ListingStatus, SanctionEntity, TypeFilter, YearlyImpact};
pub use view::{reduce, RequestToken, RowStatus, RowView, ViewAction, ViewEffect, ViewState};
