//! Integration test: policy storage and redaction across store variants.

use std::sync::Arc;
use std::time::Duration;

use passgate_core::{DisclosureField, PolicyRecord, PREMIUM_TIER_KEY, NOT_DISCLOSED};
use passgate_disclosure::DisclosureFilter;
use passgate_integration_tests::{temp_dir, FlakyBackend};
use passgate_store::{
    DurablePolicyStore, InMemoryPolicyStore, PolicyStore, RocksDbBackend, StoreError,
};
use passgate_verifier::MockProofVerifier;

fn premium_record() -> PolicyRecord {
    PolicyRecord::default()
        .with_minimum_age(21)
        .with_excluded_countries(["RUS", "IRN"])
        .unwrap()
        .with_ofac(true)
}

fn stores() -> Vec<Arc<dyn PolicyStore>> {
    vec![
        Arc::new(InMemoryPolicyStore::new()),
        Arc::new(DurablePolicyStore::new(FlakyBackend::new())),
    ]
}

// =========================================================================
// Round trips
// =========================================================================

#[tokio::test]
async fn test_premium_record_roundtrip_on_every_variant() {
    for store in stores() {
        assert!(store.set(PREMIUM_TIER_KEY, premium_record()).await.unwrap());
        let back = store.get(PREMIUM_TIER_KEY).await.unwrap();
        assert_eq!(back, premium_record(), "backend {}", store.backend_name());
        assert!(back.disclosure.is_empty());
    }
}

#[tokio::test]
async fn test_absent_fields_stay_absent() {
    for store in stores() {
        let record = PolicyRecord::default().with_disclosure(DisclosureField::ExpiryDate, false);
        store.set("sparse", record.clone()).await.unwrap();
        let back = store.get("sparse").await.unwrap();
        assert_eq!(back.minimum_age, None);
        assert_eq!(back.ofac_check, None);
        assert_eq!(back.disclosure.get(DisclosureField::ExpiryDate), Some(false));
        assert_eq!(back.disclosure.get(DisclosureField::Name), None);
    }
}

#[tokio::test]
async fn test_unwritten_key_defaults_without_write() {
    let store = DurablePolicyStore::new(FlakyBackend::new());
    let record = store.get("never-written").await.unwrap();
    assert_eq!(record.minimum_age, Some(18));
    assert_eq!(record.ofac_check, Some(true));
    assert!(record.excluded_countries.is_empty());
    assert!(DisclosureField::ALL
        .iter()
        .all(|f| !record.disclosure.is_disclosed(*f)));
    assert_eq!(store.backend().put_calls(), 0);
    assert_eq!(store.backend().raw("never-written"), None);
}

// =========================================================================
// Durable failure modes
// =========================================================================

#[tokio::test]
async fn test_backend_io_failure_is_not_a_default() {
    let store = DurablePolicyStore::new(FlakyBackend::new());
    store.backend().set_failing(true);
    assert!(matches!(
        store.get("k").await,
        Err(StoreError::Backend(_))
    ));
}

#[tokio::test]
async fn test_corrupt_document_surfaces() {
    let backend = FlakyBackend::new();
    backend.insert_raw("broken", r#"{"minimumAge": "twenty-one"}"#);
    backend.insert_raw("bad-country", r#"{"excludedCountries": ["XXX"]}"#);
    let store = DurablePolicyStore::new(backend);

    assert!(matches!(
        store.get("broken").await,
        Err(StoreError::Corrupt { .. })
    ));
    assert!(matches!(
        store.get("bad-country").await,
        Err(StoreError::Corrupt { .. })
    ));
}

#[tokio::test]
async fn test_stored_document_is_camel_case() {
    let store = DurablePolicyStore::new(FlakyBackend::new());
    store
        .set(
            "k",
            premium_record().with_disclosure(DisclosureField::PassportNumber, true),
        )
        .await
        .unwrap();
    let raw: serde_json::Value =
        serde_json::from_str(&store.backend().raw("k").unwrap()).unwrap();
    assert_eq!(raw["minimumAge"], 21);
    assert_eq!(raw["excludedCountries"], serde_json::json!(["RUS", "IRN"]));
    assert_eq!(raw["passportNumber"], true);
}

#[tokio::test]
async fn test_invalid_record_rejected_before_backend() {
    let store = DurablePolicyStore::new(FlakyBackend::new());
    let err = store
        .set("k", PolicyRecord::default().with_minimum_age(121))
        .await
        .unwrap_err();
    assert!(err.is_caller_error());
    assert_eq!(store.backend().put_calls(), 0);
}

// =========================================================================
// RocksDB
// =========================================================================

#[tokio::test]
async fn test_rocksdb_roundtrip_and_reopen() {
    let dir = temp_dir("passgate-it-rocks");
    {
        let store = DurablePolicyStore::new(RocksDbBackend::open(&dir, None).unwrap());
        assert!(store.set(PREMIUM_TIER_KEY, premium_record()).await.unwrap());
        assert!(!store.set(PREMIUM_TIER_KEY, premium_record()).await.unwrap());
    }
    let store = DurablePolicyStore::new(RocksDbBackend::open(&dir, None).unwrap());
    assert_eq!(store.get(PREMIUM_TIER_KEY).await.unwrap(), premium_record());
    assert_eq!(
        store.get("missing").await.unwrap(),
        PolicyRecord::default_policy()
    );
    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn test_rocksdb_with_ttl_keeps_fresh_entries() {
    let dir = temp_dir("passgate-it-ttl");
    let store = DurablePolicyStore::new(
        RocksDbBackend::open(&dir, Some(Duration::from_secs(86_400))).unwrap(),
    );
    store.set("fresh", premium_record()).await.unwrap();
    assert_eq!(store.get("fresh").await.unwrap(), premium_record());
    std::fs::remove_dir_all(&dir).ok();
}

// =========================================================================
// Store + filter
// =========================================================================

#[tokio::test]
async fn test_all_false_toggles_hide_everything() {
    let store = InMemoryPolicyStore::new();
    let record = DisclosureField::ALL
        .iter()
        .fold(PolicyRecord::default(), |r, f| r.with_disclosure(*f, false));
    store.set("locked", record).await.unwrap();

    let filter = DisclosureFilter::new();
    let loaded = store.get("locked").await.unwrap();
    let redacted = filter.redact(&MockProofVerifier::sample_subject(), &loaded);
    for field in DisclosureField::ALL {
        assert_eq!(redacted.get(field), NOT_DISCLOSED);
    }
}

#[tokio::test]
async fn test_redaction_is_idempotent_with_stored_policy() {
    let store = DurablePolicyStore::new(FlakyBackend::new());
    store
        .set(
            "k",
            PolicyRecord::default()
                .with_disclosure(DisclosureField::Name, true)
                .with_disclosure(DisclosureField::DateOfBirth, true),
        )
        .await
        .unwrap();
    let record = store.get("k").await.unwrap();

    let filter = DisclosureFilter::new();
    let once = filter.redact(&MockProofVerifier::sample_subject(), &record);
    let twice = filter.redact(&(&once).into(), &record);
    assert_eq!(once, twice);
    assert_eq!(once.name, "ALICE SMITH");
    assert!(once.is_redacted(DisclosureField::Gender));
}
