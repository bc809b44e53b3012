//! Policy feature payload mapping
//!
//! Turns a catalog entry (or a hand-written policy record) into the
//! normalized vector the scoring service consumes. Every feature is derived
//! independently from declared fields; analysis output never feeds back in.

use crate::error::{Result, ScreeningError};
use crate::types::{EntityType, ListingStatus, SanctionEntity};
use serde::{Deserialize, Serialize};

/// Severity assigned to entries that are still listed
pub const ACTIVE_SEVERITY: f64 = 0.9;

/// Severity assigned to delisted entries and records without a status
pub const DELISTED_SEVERITY: f64 = 0.3;

/// Issuer strength used when none is given
pub const DEFAULT_ISSUER_STRENGTH: f64 = 0.7;

const TECHNOLOGY_KEYWORD: &str = "technology";
const ENERGY_KEYWORD: &str = "oil";

/// Normalized feature vector sent to `/predict`.
///
/// Flags travel as integers `0`/`1` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolicyFeaturePayload {
    pub severity: f64,
    #[serde(with = "bit")]
    pub financial: bool,
    #[serde(with = "bit")]
    pub trade: bool,
    #[serde(with = "bit")]
    pub technology: bool,
    #[serde(with = "bit")]
    pub energy: bool,
    pub issuer_strength: f64,
    #[serde(with = "bit")]
    pub binding: bool,
}

/// Explicit feature values that take precedence over derived ones
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureOverrides {
    pub severity: Option<f64>,
    #[serde(with = "opt_bit")]
    pub financial: Option<bool>,
    #[serde(with = "opt_bit")]
    pub trade: Option<bool>,
    #[serde(with = "opt_bit")]
    pub technology: Option<bool>,
    #[serde(with = "opt_bit")]
    pub energy: Option<bool>,
    pub issuer_strength: Option<f64>,
    #[serde(with = "opt_bit")]
    pub binding: Option<bool>,
}

/// Ad-hoc record with the same shape as a catalog entry, every field optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyRecord {
    #[serde(rename = "type")]
    pub entity_type: Option<EntityType>,
    pub status: Option<ListingStatus>,
    pub reason: Option<String>,
    #[serde(flatten)]
    pub overrides: FeatureOverrides,
}

impl From<&SanctionEntity> for PolicyRecord {
    fn from(entity: &SanctionEntity) -> Self {
        Self {
            entity_type: Some(entity.entity_type),
            status: Some(entity.status),
            reason: Some(entity.reason.clone()),
            overrides: FeatureOverrides::default(),
        }
    }
}

impl PolicyFeaturePayload {
    /// Payload for a catalog entry
    pub fn from_entity(entity: &SanctionEntity) -> Self {
        Self::derived(Some(entity.entity_type), Some(entity.status), Some(&entity.reason))
    }

    /// Payload for a hand-written record; explicit values win, but must be
    /// finite and within `[0, 1]`
    pub fn from_record(record: &PolicyRecord) -> Result<Self> {
        let base = Self::derived(record.entity_type, record.status, record.reason.as_deref());
        let o = &record.overrides;

        Ok(Self {
            severity: unit_interval("severity", o.severity)?.unwrap_or(base.severity),
            financial: o.financial.unwrap_or(base.financial),
            trade: o.trade.unwrap_or(base.trade),
            technology: o.technology.unwrap_or(base.technology),
            energy: o.energy.unwrap_or(base.energy),
            issuer_strength: unit_interval("issuer_strength", o.issuer_strength)?
                .unwrap_or(base.issuer_strength),
            binding: o.binding.unwrap_or(base.binding),
        })
    }

    fn derived(
        entity_type: Option<EntityType>,
        status: Option<ListingStatus>,
        reason: Option<&str>,
    ) -> Self {
        let reason = reason.unwrap_or_default().to_lowercase();

        Self {
            severity: match status {
                Some(ListingStatus::Active) => ACTIVE_SEVERITY,
                _ => DELISTED_SEVERITY,
            },
            financial: entity_type == Some(EntityType::Bank),
            trade: entity_type == Some(EntityType::Organisation),
            technology: reason.contains(TECHNOLOGY_KEYWORD),
            energy: reason.contains(ENERGY_KEYWORD),
            issuer_strength: DEFAULT_ISSUER_STRENGTH,
            binding: true,
        }
    }
}

fn unit_interval(field: &str, value: Option<f64>) -> Result<Option<f64>> {
    match value {
        Some(v) if !v.is_finite() || !(0.0..=1.0).contains(&v) => Err(
            ScreeningError::InvalidInput(format!("{field} must be within [0, 1], got {v}")),
        ),
        other => Ok(other),
    }
}

mod bit {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<bool, D::Error> {
        match u8::deserialize(d)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(D::Error::custom(format!("expected 0 or 1, got {other}"))),
        }
    }
}

// Overrides accept the wire form (0/1) as well as plain booleans
mod opt_bit {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bit(u64),
        Bool(bool),
    }

    pub fn serialize<S: Serializer>(
        value: &Option<bool>,
        s: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        match value {
            Some(v) => s.serialize_some(&u8::from(*v)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        d: D,
    ) -> std::result::Result<Option<bool>, D::Error> {
        match Option::<Flag>::deserialize(d)? {
            None => Ok(None),
            Some(Flag::Bool(v)) => Ok(Some(v)),
            Some(Flag::Bit(0)) => Ok(Some(false)),
            Some(Flag::Bit(1)) => Ok(Some(true)),
            Some(Flag::Bit(other)) => Err(D::Error::custom(format!(
                "expected 0, 1 or a boolean, got {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn entity(entity_type: EntityType, status: ListingStatus, reason: &str) -> SanctionEntity {
        SanctionEntity {
            name: "Test Entity".to_string(),
            entity_type,
            country: "Nowhere".to_string(),
            status,
            reason: reason.to_string(),
            list: "OFAC SDN".to_string(),
            added_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            sanction_year: None,
            detail_summary: None,
            impact_data: vec![],
        }
    }

    #[test]
    fn test_active_bank_oil_embargo() {
        let payload = PolicyFeaturePayload::from_entity(&entity(
            EntityType::Bank,
            ListingStatus::Active,
            "oil embargo",
        ));

        assert_eq!(
            payload,
            PolicyFeaturePayload {
                severity: 0.9,
                financial: true,
                trade: false,
                technology: false,
                energy: true,
                issuer_strength: 0.7,
                binding: true,
            }
        );
    }

    #[test]
    fn test_delisted_organisation_technology() {
        let payload = PolicyFeaturePayload::from_entity(&entity(
            EntityType::Organisation,
            ListingStatus::Delisted,
            "Dual-use TECHNOLOGY exports",
        ));
        assert_eq!(payload.severity, 0.3);
        assert!(!payload.financial);
        assert!(payload.trade);
        assert!(payload.technology);
        assert!(!payload.energy);
    }

    #[test]
    fn test_empty_reason_clears_keyword_flags() {
        let payload =
            PolicyFeaturePayload::from_entity(&entity(EntityType::Vessel, ListingStatus::Active, ""));
        assert!(!payload.technology);
        assert!(!payload.energy);
    }

    #[test]
    fn test_wire_format_uses_integer_flags() {
        let payload =
            PolicyFeaturePayload::from_entity(&entity(EntityType::Bank, ListingStatus::Active, "oil"));
        let value = serde_json::to_value(payload).unwrap();
        assert_eq!(
            value,
            json!({
                "severity": 0.9,
                "financial": 1,
                "trade": 0,
                "technology": 0,
                "energy": 1,
                "issuer_strength": 0.7,
                "binding": 1
            })
        );

        let back: PolicyFeaturePayload = serde_json::from_value(value).unwrap();
        assert_eq!(back, payload);
        assert!(serde_json::from_value::<PolicyFeaturePayload>(json!({
            "severity": 0.9, "financial": 2, "trade": 0, "technology": 0,
            "energy": 0, "issuer_strength": 0.7, "binding": 1
        }))
        .is_err());
    }

    #[test]
    fn test_record_overrides_take_precedence() {
        let record = PolicyRecord {
            entity_type: Some(EntityType::Bank),
            status: Some(ListingStatus::Active),
            reason: Some("oil".to_string()),
            overrides: FeatureOverrides {
                severity: Some(0.5),
                financial: Some(false),
                binding: Some(false),
                ..Default::default()
            },
        };

        let payload = PolicyFeaturePayload::from_record(&record).unwrap();
        assert_eq!(payload.severity, 0.5);
        assert!(!payload.financial);
        assert!(!payload.binding);
        assert!(payload.energy);
        assert_eq!(payload.issuer_strength, DEFAULT_ISSUER_STRENGTH);
    }

    #[test]
    fn test_record_flags_accept_bit_form() {
        let record: PolicyRecord =
            serde_json::from_str(r#"{"type":"Vessel","financial":1,"binding":0,"energy":true}"#)
                .unwrap();
        assert_eq!(record.entity_type, Some(EntityType::Vessel));
        assert_eq!(record.overrides.financial, Some(true));
        assert_eq!(record.overrides.binding, Some(false));
        assert_eq!(record.overrides.energy, Some(true));
        assert_eq!(record.overrides.trade, None);

        let payload = PolicyFeaturePayload::from_record(&record).unwrap();
        assert!(payload.financial && payload.energy);
        assert!(!payload.binding && !payload.trade);

        assert!(serde_json::from_str::<PolicyRecord>(r#"{"financial":2}"#).is_err());
    }

    #[test]
    fn test_bare_record_defaults() {
        let payload = PolicyFeaturePayload::from_record(&PolicyRecord::default()).unwrap();
        assert_eq!(payload.severity, DELISTED_SEVERITY);
        assert!(!payload.financial && !payload.trade && !payload.technology && !payload.energy);
        assert!(payload.binding);
    }

    #[test]
    fn test_out_of_range_override_rejected() {
        let record = PolicyRecord {
            overrides: FeatureOverrides {
                issuer_strength: Some(1.5),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            PolicyFeaturePayload::from_record(&record),
            Err(ScreeningError::InvalidInput(_))
        ));

        let record = PolicyRecord {
            overrides: FeatureOverrides {
                severity: Some(f64::NAN),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(PolicyFeaturePayload::from_record(&record).is_err());
    }

    #[test]
    fn test_record_from_entity_matches_entity_mapping() {
        let e = entity(EntityType::Organisation, ListingStatus::Active, "Iran oil sanctions");
        let from_record = PolicyFeaturePayload::from_record(&PolicyRecord::from(&e)).unwrap();
        assert_eq!(from_record, PolicyFeaturePayload::from_entity(&e));
    }
}
