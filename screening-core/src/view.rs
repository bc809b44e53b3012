//! Screening view state and its reducer
//!
//! All state a search view carries (filters, expanded row, in-flight
//! requests, cached results) lives in one [`ViewState`] and changes only
//! through [`reduce`]. The reducer performs no I/O; it returns
//! [`ViewEffect`]s that the caller carries out.
//!
//! ## Request attribution
//!
//! | Concern | Guard |
//! |---|---|
//! | Rows shift when filters change | Results keyed by [`EntityId`], not row index |
//! | Double expand before a response | Second request `Rejected` while one is in flight |
//! | Late response for a superseded request | Stale [`RequestToken`] → `Discarded` |
//! | Row filtered out mid-request | `Cancel` effect, pending entry dropped |

use crate::analysis::AnalysisResult;
use crate::cache::{AnalysisCache, CachedAnalysis};
use crate::catalog::Catalog;
use crate::error::{Result, ScreeningError};
use crate::features::PolicyFeaturePayload;
use crate::types::{EntityId, SanctionEntity, TypeFilter};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Generation number handed out per dispatched request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub enum ViewAction {
    SetQuery(String),
    SetTypeFilter(TypeFilter),
    /// Expand or collapse the row at this position of the filtered list
    Toggle { row: usize },
    /// Completion of a dispatched request
    Resolve {
        token: RequestToken,
        entity_id: EntityId,
        outcome: std::result::Result<AnalysisResult, String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewEffect {
    Dispatch {
        token: RequestToken,
        entity_id: EntityId,
        payload: PolicyFeaturePayload,
    },
    Cancel {
        token: RequestToken,
        entity_id: EntityId,
    },
    Rejected {
        entity_id: EntityId,
    },
    Discarded {
        token: RequestToken,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RowStatus<'a> {
    Idle,
    Loading,
    Ready(&'a CachedAnalysis),
    Failed(&'a str),
}

/// Render snapshot of one visible row
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    pub index: usize,
    pub id: &'a EntityId,
    pub entity: &'a SanctionEntity,
    pub expanded: bool,
    pub status: RowStatus<'a>,
}

#[derive(Debug, Clone)]
pub struct ViewState {
    catalog: Arc<Catalog>,
    query: String,
    type_filter: TypeFilter,
    visible: Vec<EntityId>,
    expanded: Option<EntityId>,
    pending: HashMap<EntityId, RequestToken>,
    failures: HashMap<EntityId, String>,
    cache: AnalysisCache,
    next_token: u64,
}

impl ViewState {
    /// Unfiltered view over `catalog`
    pub fn new(catalog: Arc<Catalog>) -> Self {
        let visible = catalog.entities().iter().map(SanctionEntity::id).collect();
        Self {
            catalog,
            query: String::new(),
            type_filter: TypeFilter::All,
            visible,
            expanded: None,
            pending: HashMap::new(),
            failures: HashMap::new(),
            cache: AnalysisCache::new(),
            next_token: 0,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn type_filter(&self) -> TypeFilter {
        self.type_filter
    }

    pub fn expanded(&self) -> Option<&EntityId> {
        self.expanded.as_ref()
    }

    pub fn cache(&self) -> &AnalysisCache {
        &self.cache
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    pub fn visible_id(&self, row: usize) -> Option<&EntityId> {
        self.visible.get(row)
    }

    /// Position of `id` in the filtered list
    pub fn row_of(&self, id: &EntityId) -> Option<usize> {
        self.visible.iter().position(|v| v == id)
    }

    pub fn is_pending(&self, id: &EntityId) -> bool {
        self.pending.contains_key(id)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn failure(&self, id: &EntityId) -> Option<&str> {
        self.failures.get(id).map(String::as_str)
    }

    pub fn rows(&self) -> Vec<RowView<'_>> {
        self.visible
            .iter()
            .enumerate()
            .filter_map(|(index, id)| {
                let entity = self.catalog.get(id)?;
                Some(RowView {
                    index,
                    id,
                    entity,
                    expanded: self.expanded.as_ref() == Some(id),
                    status: self.status_of(id),
                })
            })
            .collect()
    }

    fn status_of(&self, id: &EntityId) -> RowStatus<'_> {
        if self.pending.contains_key(id) {
            RowStatus::Loading
        } else if let Some(cached) = self.cache.get(id) {
            RowStatus::Ready(cached)
        } else if let Some(message) = self.failures.get(id) {
            RowStatus::Failed(message)
        } else {
            RowStatus::Idle
        }
    }

    fn issue_token(&mut self) -> RequestToken {
        self.next_token += 1;
        RequestToken(self.next_token)
    }

    // Recompute visible rows; pending requests for rows that disappeared
    // are cancelled.
    fn refilter(&mut self) -> Vec<ViewEffect> {
        self.visible = self
            .catalog
            .filter(&self.query, self.type_filter)
            .into_iter()
            .map(SanctionEntity::id)
            .collect();

        if let Some(expanded) = &self.expanded {
            if !self.visible.contains(expanded) {
                debug!("Expanded entity {} filtered out, collapsing", expanded.short());
                self.expanded = None;
            }
        }

        let gone: Vec<EntityId> = self
            .pending
            .keys()
            .filter(|id| !self.visible.contains(id))
            .cloned()
            .collect();

        gone.into_iter()
            .filter_map(|entity_id| {
                let token = self.pending.remove(&entity_id)?;
                info!("Cancelling request {} for filtered-out entity {}", token, entity_id.short());
                Some(ViewEffect::Cancel { token, entity_id })
            })
            .collect()
    }
}

/// Apply one action to the view
pub fn reduce(state: &mut ViewState, action: ViewAction) -> Result<Vec<ViewEffect>> {
    match action {
        ViewAction::SetQuery(query) => {
            state.query = query;
            Ok(state.refilter())
        }

        ViewAction::SetTypeFilter(type_filter) => {
            state.type_filter = type_filter;
            Ok(state.refilter())
        }

        ViewAction::Toggle { row } => {
            let entity_id = state
                .visible
                .get(row)
                .cloned()
                .ok_or(ScreeningError::RowOutOfRange {
                    row,
                    visible: state.visible.len(),
                })?;

            if state.expanded.as_ref() == Some(&entity_id) {
                state.expanded = None;
                return Ok(Vec::new());
            }
            state.expanded = Some(entity_id.clone());

            if state.pending.contains_key(&entity_id) {
                warn!("Request already in flight for entity {}", entity_id.short());
                return Ok(vec![ViewEffect::Rejected { entity_id }]);
            }
            if state.cache.contains(&entity_id) {
                return Ok(Vec::new());
            }

            let entity = state
                .catalog
                .get(&entity_id)
                .ok_or_else(|| ScreeningError::UnknownEntity(entity_id.to_string()))?;
            let payload = PolicyFeaturePayload::from_entity(entity);
            debug!("Dispatching analysis for {}", entity.name);

            let token = state.issue_token();
            state.pending.insert(entity_id.clone(), token);
            state.failures.remove(&entity_id);

            Ok(vec![ViewEffect::Dispatch {
                token,
                entity_id,
                payload,
            }])
        }

        ViewAction::Resolve {
            token,
            entity_id,
            outcome,
        } => {
            if state.pending.get(&entity_id) != Some(&token) {
                debug!("Discarding stale response {} for entity {}", token, entity_id.short());
                return Ok(vec![ViewEffect::Discarded { token }]);
            }
            state.pending.remove(&entity_id);

            match outcome {
                Ok(result) => {
                    state.failures.remove(&entity_id);
                    state.cache.insert(entity_id, result);
                }
                Err(message) => {
                    warn!("Analysis failed for entity {}: {}", entity_id.short(), message);
                    state.failures.insert(entity_id, message);
                }
            }
            Ok(Vec::new())
        }
    }
}
