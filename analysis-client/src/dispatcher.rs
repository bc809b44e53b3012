//! Per-row analysis dispatcher
//!
//! Drives a [`ViewState`] through [`reduce`] and carries out the effects it
//! returns: `Dispatch` becomes a scoring call raced against a cancellation
//! token, `Cancel` fires that token. The view lock is never held across an
//! await.

use crate::metrics::{ClientMetrics, Outcome};
use crate::service::{AnalysisService, PREDICT_PATH};
use crate::{Error, Result};
use parking_lot::Mutex;
use screening_core::{
    reduce, AnalysisResult, CachedAnalysis, Catalog, EntityId, ExplainRequest, Explanation,
    MacroRisk, MacroRiskRequest, PolicyFeaturePayload, PolicyRecord, RequestToken, ScreeningError,
    TypeFilter, ViewAction, ViewEffect, ViewState,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// What a toggle ended up doing
#[derive(Debug, Clone, PartialEq)]
pub enum ToggleOutcome {
    /// The row was the expanded one and is now collapsed
    Collapsed,
    /// Expanded from the cache without a request
    Cached(CachedAnalysis),
    /// Expanded and a fresh result was stored
    Completed(AnalysisResult),
    /// The response arrived after the request was superseded
    Discarded,
}

/// Analysis dispatcher over a shared view
pub struct AnalysisDispatcher<S> {
    service: Arc<S>,
    view: Mutex<ViewState>,
    in_flight: Mutex<HashMap<RequestToken, CancellationToken>>,
    metrics: ClientMetrics,
}

impl<S: AnalysisService> AnalysisDispatcher<S> {
    /// Dispatcher with its own metrics registry
    pub fn new(service: Arc<S>, catalog: Arc<Catalog>) -> Result<Self> {
        Ok(Self::with_metrics(service, catalog, ClientMetrics::new()?))
    }

    /// Dispatcher recording into shared metrics
    pub fn with_metrics(service: Arc<S>, catalog: Arc<Catalog>, metrics: ClientMetrics) -> Self {
        Self {
            service,
            view: Mutex::new(ViewState::new(catalog)),
            in_flight: Mutex::new(HashMap::new()),
            metrics,
        }
    }

    /// Metrics handle
    pub fn metrics(&self) -> &ClientMetrics {
        &self.metrics
    }

    /// Read the current view
    pub fn with_view<R>(&self, f: impl FnOnce(&ViewState) -> R) -> R {
        f(&self.view.lock())
    }

    /// Owned copy of the current view
    pub fn snapshot(&self) -> ViewState {
        self.view.lock().clone()
    }

    /// Replace the search query; returns the number of visible rows
    pub fn set_query(&self, query: impl Into<String>) -> Result<usize> {
        self.apply(ViewAction::SetQuery(query.into()))
    }

    /// Replace the type filter; returns the number of visible rows
    pub fn set_type_filter(&self, type_filter: TypeFilter) -> Result<usize> {
        self.apply(ViewAction::SetTypeFilter(type_filter))
    }

    fn apply(&self, action: ViewAction) -> Result<usize> {
        let (effects, visible) = {
            let mut view = self.view.lock();
            let effects = reduce(&mut view, action)?;
            (effects, view.visible_len())
        };
        for effect in effects {
            self.cancel(effect);
        }
        Ok(visible)
    }

    fn cancel(&self, effect: ViewEffect) {
        if let ViewEffect::Cancel { token, entity_id } = effect {
            if let Some(cancel) = self.in_flight.lock().remove(&token) {
                debug!("Cancelling request {} for entity {}", token, entity_id.short());
                cancel.cancel();
            }
        }
    }

    /// Expand or collapse the row at `row` of the filtered list
    ///
    /// Expanding an entity without a cached result issues one `/predict`
    /// call and waits for it. Fails with [`Error::AlreadyInFlight`] while an
    /// earlier request for the same entity is running, and with
    /// [`Error::Cancelled`] if the row is filtered out before the answer.
    pub async fn toggle(&self, row: usize) -> Result<ToggleOutcome> {
        // The cancellation token is registered before the view lock is
        // released, so a filter change always finds it
        let (effects, cancel) = {
            let mut view = self.view.lock();
            let effects = reduce(&mut view, ViewAction::Toggle { row })?;
            let cancel = match effects.first() {
                Some(ViewEffect::Dispatch { token, .. }) => {
                    let cancel = CancellationToken::new();
                    self.in_flight.lock().insert(*token, cancel.clone());
                    Some(cancel)
                }
                _ => None,
            };
            (effects, cancel)
        };

        match (effects.into_iter().next(), cancel) {
            (
                Some(ViewEffect::Dispatch {
                    token,
                    entity_id,
                    payload,
                }),
                Some(cancel),
            ) => self.run(token, entity_id, payload, cancel).await,
            (Some(ViewEffect::Rejected { entity_id }), _) => Err(Error::AlreadyInFlight(entity_id)),
            (Some(other), _) => {
                warn!("Unexpected effect from toggle: {:?}", other);
                Ok(ToggleOutcome::Discarded)
            }
            (None, _) => {
                let view = self.view.lock();
                let cached = view
                    .expanded()
                    .filter(|id| view.visible_id(row) == Some(*id))
                    .and_then(|id| view.cache().get(id));
                Ok(match cached {
                    Some(cached) => ToggleOutcome::Cached(cached.clone()),
                    None => ToggleOutcome::Collapsed,
                })
            }
        }
    }

    async fn run(
        &self,
        token: RequestToken,
        entity_id: EntityId,
        payload: PolicyFeaturePayload,
        cancel: CancellationToken,
    ) -> Result<ToggleOutcome> {
        info!("Request {} dispatched for entity {}", token, entity_id.short());

        let response = tokio::select! {
            _ = cancel.cancelled() => None,
            response = self.service.predict(&payload) => Some(response),
        };
        self.in_flight.lock().remove(&token);

        let Some(response) = response else {
            self.metrics.record(PREDICT_PATH, Outcome::Cancelled, 0.0);
            return Err(Error::Cancelled(entity_id));
        };

        let outcome = match &response {
            Ok(result) => Ok(result.clone()),
            Err(e) => Err(e.to_string()),
        };
        let effects = reduce(
            &mut self.view.lock(),
            ViewAction::Resolve {
                token,
                entity_id,
                outcome,
            },
        )?;

        if effects
            .iter()
            .any(|e| matches!(e, ViewEffect::Discarded { .. }))
        {
            return Ok(ToggleOutcome::Discarded);
        }
        response.map(ToggleOutcome::Completed)
    }

    /// Score an ad-hoc record; the result is not cached
    pub async fn analyze_record(&self, record: &PolicyRecord) -> Result<AnalysisResult> {
        let payload = PolicyFeaturePayload::from_record(record)?;
        self.service.predict(&payload).await
    }

    /// Explanation for one metric value of the payload
    pub async fn explain(&self, request: &ExplainRequest) -> Result<Explanation> {
        self.service.explain(request).await
    }

    /// Macro risk for a country code
    pub async fn macro_risk(&self, country_code: &str) -> Result<MacroRisk> {
        let country_code = country_code.trim();
        if country_code.is_empty() {
            return Err(ScreeningError::InvalidInput("country code is empty".to_string()).into());
        }
        self.service
            .macro_risk(&MacroRiskRequest {
                country_code: country_code.to_string(),
            })
            .await
    }
}
