use crate::analysis::AnalysisResult;
use crate::types::EntityId;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct CachedAnalysis {
    pub result: AnalysisResult,
    pub stored_at: DateTime<Utc>,
}

/// Per-entity analysis results for the lifetime of a view.
///
/// Keyed by [`EntityId`], so entries stay attached to the right entity when
/// filtering reorders or hides rows.
#[derive(Debug, Clone, Default)]
pub struct AnalysisCache {
    entries: HashMap<EntityId, CachedAnalysis>,
}

impl AnalysisCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: EntityId, result: AnalysisResult) {
        debug!("Caching analysis for entity {}", id.short());
        self.entries.insert(
            id,
            CachedAnalysis {
                result,
                stored_at: Utc::now(),
            },
        );
    }

    pub fn get(&self, id: &EntityId) -> Option<&CachedAnalysis> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn remove(&mut self, id: &EntityId) -> Option<CachedAnalysis> {
        self.entries.remove(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn id(name: &str) -> EntityId {
        EntityId::derive(name, "Russia", NaiveDate::from_ymd_opt(2022, 2, 24).unwrap())
    }

    #[test]
    fn test_insert_replaces_previous_entry() {
        let mut cache = AnalysisCache::new();
        let first = AnalysisResult::from_value(json!({"score": 0.1})).unwrap();
        let second = AnalysisResult::from_value(json!({"score": 0.9})).unwrap();

        cache.insert(id("Sberbank"), first);
        cache.insert(id("Sberbank"), second);

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&id("Sberbank")).unwrap().result.score, Some(0.9));
    }

    #[test]
    fn test_entries_are_independent() {
        let mut cache = AnalysisCache::new();
        cache.insert(id("Sberbank"), AnalysisResult::from_value(json!({"score": 0.5})).unwrap());

        assert!(cache.contains(&id("Sberbank")));
        assert!(!cache.contains(&id("Bank Rossiya")));
        assert!(cache.remove(&id("Bank Rossiya")).is_none());
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }
}
