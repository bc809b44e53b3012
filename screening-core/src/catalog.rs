use crate::error::{Result, ScreeningError};
use crate::types::{EntityId, SanctionEntity, TypeFilter};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

const BUNDLED_ENTITIES: &str = include_str!("../data/sanction_entities.json");

/// Immutable, ordered catalog of sanctioned entities.
#[derive(Debug, Clone)]
pub struct Catalog {
    entities: Vec<SanctionEntity>,
    index: HashMap<EntityId, usize>,
}

impl Catalog {
    /// Build a catalog, rejecting two entries that share an identity
    pub fn new(entities: Vec<SanctionEntity>) -> Result<Self> {
        let mut index = HashMap::with_capacity(entities.len());

        for (pos, entity) in entities.iter().enumerate() {
            if index.insert(entity.id(), pos).is_some() {
                return Err(ScreeningError::DuplicateEntity {
                    name: entity.name.clone(),
                    country: entity.country.clone(),
                    added_date: entity.added_date.to_string(),
                });
            }
        }

        Ok(Self { entities, index })
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let entities: Vec<SanctionEntity> = serde_json::from_str(json)?;
        Self::new(entities)
    }

    /// Load a catalog from a JSON array on disk
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let catalog = Self::from_json_str(&raw)?;
        info!("Loaded sanctions catalog from {} with {} entries", path.display(), catalog.len());
        Ok(catalog)
    }

    /// Catalog shipped with the crate
    pub fn bundled() -> Result<Self> {
        Self::from_json_str(BUNDLED_ENTITIES)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn entities(&self) -> &[SanctionEntity] {
        &self.entities
    }

    pub fn get(&self, id: &EntityId) -> Option<&SanctionEntity> {
        self.index.get(id).map(|&pos| &self.entities[pos])
    }

    /// Exact, case-insensitive name lookup
    pub fn find_by_name(&self, name: &str) -> Option<&SanctionEntity> {
        let wanted = name.trim().to_lowercase();
        self.entities.iter().find(|e| e.name.to_lowercase() == wanted)
    }

    /// Entities whose name or country contains `query` (case-insensitive)
    /// and whose type passes `type_filter`, in catalog order.
    pub fn filter(&self, query: &str, type_filter: TypeFilter) -> Vec<&SanctionEntity> {
        let needle = query.to_lowercase();

        let matches: Vec<&SanctionEntity> = self
            .entities
            .iter()
            .filter(|e| {
                let matches_query = needle.is_empty()
                    || e.name.to_lowercase().contains(&needle)
                    || e.country.to_lowercase().contains(&needle);
                matches_query && type_filter.matches(e.entity_type)
            })
            .collect();

        debug!(
            "Catalog filter query={:?} type={} matched {}/{}",
            query,
            type_filter,
            matches.len(),
            self.entities.len()
        );

        matches
    }
}
