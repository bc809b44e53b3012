//! HTTP implementation of [`AnalysisService`]

use crate::config::ClientConfig;
use crate::metrics::{ClientMetrics, Outcome};
use crate::service::{AnalysisService, EXPLAIN_PATH, MACRO_RISK_PATH, PREDICT_PATH};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use screening_core::{
    AnalysisResult, ExplainRequest, Explanation, MacroRisk, MacroRiskRequest, PolicyFeaturePayload,
};
use serde::Serialize;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// JSON-over-HTTP scoring service client
#[derive(Debug, Clone)]
pub struct HttpAnalysisClient {
    config: ClientConfig,
    client: Client,
    metrics: ClientMetrics,
}

impl HttpAnalysisClient {
    /// Build a client with its own metrics registry
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::with_metrics(config, ClientMetrics::new()?)
    }

    /// Build a client recording into `metrics`
    pub fn with_metrics(config: ClientConfig, metrics: ClientMetrics) -> Result<Self> {
        let config = config.validated()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        info!(
            "Analysis client ready: base_url={}, timeout={}s",
            config.base_url, config.timeout_secs
        );

        Ok(Self {
            config,
            client,
            metrics,
        })
    }

    /// Validated settings in use
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Request metrics
    pub fn metrics(&self) -> &ClientMetrics {
        &self.metrics
    }

    async fn post_json<B, T>(
        &self,
        path: &str,
        body: &B,
        parse: impl FnOnce(Value) -> screening_core::Result<T> + Send,
    ) -> Result<T>
    where
        B: Serialize + Sync,
    {
        let started = Instant::now();
        let _in_flight = self.metrics.track_in_flight();
        let outcome = match self.send(path, body).await {
            Ok(raw) => parse(raw).map_err(Error::from),
            Err(e) => Err(e),
        };

        let elapsed = started.elapsed().as_secs_f64();
        match &outcome {
            Ok(_) => self.metrics.record(path, Outcome::Success, elapsed),
            Err(e) => {
                error!("Request to {} failed: {}", path, e);
                self.metrics.record(path, Outcome::Failure, elapsed);
            }
        }
        outcome
    }

    async fn send<B: Serialize + Sync>(&self, path: &str, body: &B) -> Result<Value> {
        let url = self.config.endpoint(path);
        debug!("POST {}", url);

        let response = self.client.post(&url).json(body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::Status {
                endpoint: path.to_string(),
                status_code: status.as_u16(),
                message,
            });
        }

        response.json::<Value>().await.map_err(|e| Error::Decode {
            endpoint: path.to_string(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl AnalysisService for HttpAnalysisClient {
    async fn predict(&self, payload: &PolicyFeaturePayload) -> Result<AnalysisResult> {
        let result = self
            .post_json(PREDICT_PATH, payload, AnalysisResult::from_value)
            .await?;
        debug!("Prediction received: score={:?}", result.score);
        Ok(result)
    }

    async fn explain(&self, request: &ExplainRequest) -> Result<Explanation> {
        self.post_json(EXPLAIN_PATH, request, Explanation::from_value)
            .await
    }

    async fn macro_risk(&self, request: &MacroRiskRequest) -> Result<MacroRisk> {
        self.post_json(MACRO_RISK_PATH, request, MacroRisk::from_value)
            .await
    }
}
