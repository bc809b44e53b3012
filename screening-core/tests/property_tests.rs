//! Property-based tests for screening invariants
//!
//! These tests use proptest to verify:
//! - Determinism: the same entity always maps to the same payload
//! - Filter identity: empty query + `All` returns the whole catalog in order
//! - Filter soundness: every match satisfies both predicates, order preserved
//! - Bucketing: risk levels are monotone in the score
//! - Guarded deltas: percentage changes are never `inf`/`NaN`

use chrono::NaiveDate;
use proptest::prelude::*;
use screening_core::{
    percent_change, risk_bucket, Catalog, EntityType, ImpactDelta, ListingStatus,
    PolicyFeaturePayload, SanctionEntity, TypeFilter, YearlyImpact,
};

/// Strategy for generating entity types
fn entity_type_strategy() -> impl Strategy<Value = EntityType> {
    prop_oneof![
        Just(EntityType::Individual),
        Just(EntityType::Organisation),
        Just(EntityType::Vessel),
        Just(EntityType::Bank),
    ]
}

fn status_strategy() -> impl Strategy<Value = ListingStatus> {
    prop_oneof![Just(ListingStatus::Active), Just(ListingStatus::Delisted)]
}

fn type_filter_strategy() -> impl Strategy<Value = TypeFilter> {
    prop_oneof![
        Just(TypeFilter::All),
        entity_type_strategy().prop_map(TypeFilter::Only),
    ]
}

/// Strategy for generating catalog entries
fn entity_strategy() -> impl Strategy<Value = SanctionEntity> {
    (
        "[A-Za-z ]{1,24}",
        entity_type_strategy(),
        "[A-Za-z]{3,12}",
        status_strategy(),
        "[A-Za-z ]{0,40}",
        0u32..5000,
    )
        .prop_map(|(name, entity_type, country, status, reason, day)| SanctionEntity {
            name,
            entity_type,
            country,
            status,
            reason,
            list: "OFAC SDN".to_string(),
            added_date: NaiveDate::from_ymd_opt(2005, 1, 1).unwrap() + chrono::Days::new(day as u64),
            sanction_year: None,
            detail_summary: None,
            impact_data: vec![],
        })
}

/// Catalog with unique identities (duplicates are dropped before building)
fn catalog_strategy() -> impl Strategy<Value = Catalog> {
    prop::collection::vec(entity_strategy(), 0..30).prop_map(|entities| {
        let mut seen = std::collections::HashSet::new();
        let unique = entities.into_iter().filter(|e| seen.insert(e.id())).collect();
        Catalog::new(unique).unwrap()
    })
}

fn impact_strategy() -> impl Strategy<Value = YearlyImpact> {
    (
        -10.0f64..10.0,
        -10.0f64..10.0,
        prop_oneof![Just(0.0), 0.0f64..2000.0],
        0.0f64..2000.0,
        prop_oneof![Just(0.0), 0.0f64..100.0],
        0.0f64..100.0,
    )
        .prop_map(|(gb, ga, tb, ta, fb, fa)| YearlyImpact {
            year: "2020".to_string(),
            gdp_before: gb,
            gdp_after: ga,
            trade_before: tb,
            trade_after: ta,
            fdi_before: fb,
            fdi_after: fa,
        })
}

proptest! {
    #[test]
    fn prop_payload_is_deterministic(entity in entity_strategy()) {
        let first = PolicyFeaturePayload::from_entity(&entity);
        let second = PolicyFeaturePayload::from_entity(&entity.clone());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_payload_depends_only_on_declared_fields(entity in entity_strategy()) {
        let payload = PolicyFeaturePayload::from_entity(&entity);
        prop_assert_eq!(payload.financial, entity.entity_type == EntityType::Bank);
        prop_assert_eq!(payload.trade, entity.entity_type == EntityType::Organisation);
        prop_assert_eq!(payload.energy, entity.reason.to_lowercase().contains("oil"));
        prop_assert!(payload.severity == 0.9 || payload.severity == 0.3);
        prop_assert!(payload.binding);
    }

    #[test]
    fn prop_empty_query_returns_full_catalog(catalog in catalog_strategy()) {
        let filtered = catalog.filter("", TypeFilter::All);
        prop_assert_eq!(filtered.len(), catalog.len());
        for (a, b) in filtered.iter().zip(catalog.entities()) {
            prop_assert_eq!(*a, b);
        }
    }

    #[test]
    fn prop_filter_is_sound_and_stable(
        catalog in catalog_strategy(),
        query in "[a-zA-Z]{0,3}",
        type_filter in type_filter_strategy(),
    ) {
        let filtered = catalog.filter(&query, type_filter);
        let needle = query.to_lowercase();

        for e in &filtered {
            prop_assert!(
                e.name.to_lowercase().contains(&needle) || e.country.to_lowercase().contains(&needle)
            );
            prop_assert!(type_filter.matches(e.entity_type));
        }

        // Subsequence of the catalog, in catalog order
        let positions: Vec<usize> = filtered
            .iter()
            .map(|e| catalog.entities().iter().position(|c| c == *e).unwrap())
            .collect();
        prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));

        // Nothing that satisfies both predicates is left out
        let expected = catalog
            .entities()
            .iter()
            .filter(|e| {
                (e.name.to_lowercase().contains(&needle) || e.country.to_lowercase().contains(&needle))
                    && type_filter.matches(e.entity_type)
            })
            .count();
        prop_assert_eq!(filtered.len(), expected);
    }

    #[test]
    fn prop_risk_bucket_is_monotone(a in 0.0f64..=1.0, b in 0.0f64..=1.0) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(risk_bucket(lo) <= risk_bucket(hi));
    }

    #[test]
    fn prop_percent_change_is_finite_or_none(before in -1e6f64..1e6, after in -1e6f64..1e6) {
        match percent_change(before, after) {
            Some(v) => prop_assert!(v.is_finite()),
            None => prop_assert_eq!(before, 0.0),
        }
    }

    #[test]
    fn prop_impact_delta_never_produces_nan(series in prop::collection::vec(impact_strategy(), 1..12)) {
        let delta = ImpactDelta::from_series(&series).unwrap();
        prop_assert!(delta.gdp_delta.is_finite());
        if let Some(v) = delta.trade_delta_pct {
            prop_assert!(v.is_finite());
        }
        if let Some(v) = delta.fdi_delta_pct {
            prop_assert!(v.is_finite());
        }
        prop_assert_eq!(delta.trade_delta_pct.is_none(), series[0].trade_before == 0.0);
    }
}

#[test]
fn test_iran_query_on_bundled_catalog() {
    let catalog = Catalog::bundled().unwrap();
    let names: Vec<_> = catalog
        .filter("iran", TypeFilter::All)
        .iter()
        .map(|e| e.name.clone())
        .collect();

    assert!(names.contains(&"National Iranian Oil Company".to_string()));
    assert!(!names.contains(&"Rosoboronexport".to_string()));
}

#[test]
fn test_active_bank_oil_embargo_payload() {
    let entity = SanctionEntity {
        name: "Example Bank".to_string(),
        entity_type: EntityType::Bank,
        country: "Nowhere".to_string(),
        status: ListingStatus::Active,
        reason: "oil embargo".to_string(),
        list: "EU Sanctions".to_string(),
        added_date: NaiveDate::from_ymd_opt(2021, 6, 1).unwrap(),
        sanction_year: Some(2021),
        detail_summary: None,
        impact_data: vec![],
    };

    let payload = serde_json::to_value(PolicyFeaturePayload::from_entity(&entity)).unwrap();
    assert_eq!(
        payload,
        serde_json::json!({
            "severity": 0.9, "financial": 1, "trade": 0, "technology": 0,
            "energy": 1, "issuer_strength": 0.7, "binding": 1
        })
    );
}
