use crate::error::{Result, ScreeningError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum EntityType {
    Individual,
    Organisation,
    Vessel,
    Bank,
}

impl EntityType {
    pub const ALL: [EntityType; 4] = [
        EntityType::Individual,
        EntityType::Organisation,
        EntityType::Vessel,
        EntityType::Bank,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Individual => "Individual",
            EntityType::Organisation => "Organisation",
            EntityType::Vessel => "Vessel",
            EntityType::Bank => "Bank",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = ScreeningError;

    fn from_str(s: &str) -> Result<Self> {
        EntityType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ScreeningError::UnknownEntityType(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ListingStatus {
    Active,
    Delisted,
}

impl ListingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingStatus::Active => "Active",
            ListingStatus::Delisted => "Delisted",
        }
    }
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListingStatus {
    type Err = ScreeningError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(ListingStatus::Active),
            "delisted" => Ok(ListingStatus::Delisted),
            _ => Err(ScreeningError::UnknownStatus(s.to_string())),
        }
    }
}

/// Type predicate of the catalog filter: either every type or exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeFilter {
    #[default]
    All,
    Only(EntityType),
}

impl TypeFilter {
    pub fn matches(&self, entity_type: EntityType) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Only(t) => *t == entity_type,
        }
    }
}

impl fmt::Display for TypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeFilter::All => f.write_str("All"),
            TypeFilter::Only(t) => t.fmt(f),
        }
    }
}

impl FromStr for TypeFilter {
    type Err = ScreeningError;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(TypeFilter::All)
        } else {
            s.parse().map(TypeFilter::Only)
        }
    }
}

/// One year of before/after economic indicators attached to a catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct YearlyImpact {
    pub year: String,
    pub gdp_before: f64,
    pub gdp_after: f64,
    pub trade_before: f64,
    pub trade_after: f64,
    pub fdi_before: f64,
    pub fdi_after: f64,
}

/// Stable identity of a catalog entry, independent of its position in any
/// filtered view.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(String);

impl EntityId {
    pub fn derive(name: &str, country: &str, added_date: NaiveDate) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(name.as_bytes());
        hasher.update(&[0x1f]);
        hasher.update(country.as_bytes());
        hasher.update(&[0x1f]);
        hasher.update(added_date.format("%Y-%m-%d").to_string().as_bytes());
        Self(hasher.finalize().to_hex().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 hex characters, enough to tell catalog entries apart on screen.
    pub fn short(&self) -> &str {
        &self.0[..12.min(self.0.len())]
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SanctionEntity {
    pub name: String,
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    pub country: String,
    pub status: ListingStatus,
    #[serde(default)]
    pub reason: String,
    pub list: String,
    pub added_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sanction_year: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail_summary: Option<String>,
    #[serde(default)]
    pub impact_data: Vec<YearlyImpact>,
}

impl SanctionEntity {
    pub fn id(&self) -> EntityId {
        EntityId::derive(&self.name, &self.country, self.added_date)
    }
}
