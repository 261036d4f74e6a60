//! Integration test: verification requests end to end.
//!
//! Drives the orchestrator with the mock verifier against the in-memory
//! and durable stores, checking which collaborators each outcome touches.

use std::sync::Arc;

use serde_json::json;

use passgate_core::{
    DisclosureField, PolicyRecord, NOT_DISCLOSED, PREMIUM_TIER_KEY, STANDARD_TIER_KEY,
};
use passgate_disclosure::{IdentityActionKeyResolver, TieredActionKeyResolver};
use passgate_integration_tests::{verify_request, FlakyBackend};
use passgate_store::{DurablePolicyStore, InMemoryPolicyStore, PolicyStore};
use passgate_verifier::{
    AttestationKind, MockProofVerifier, OrchestratorSettings, ResponseStatus,
    VerificationOrchestrator, VerifierError,
};

fn durable_orchestrator(
    verifier: Arc<MockProofVerifier>,
    store: Arc<DurablePolicyStore<FlakyBackend>>,
) -> VerificationOrchestrator {
    VerificationOrchestrator::new(
        verifier,
        store,
        Arc::new(TieredActionKeyResolver::default()),
        OrchestratorSettings::default(),
    )
}

// =========================================================================
// Failure modes
// =========================================================================

#[tokio::test]
async fn test_missing_context_data_touches_nothing() {
    let verifier = Arc::new(MockProofVerifier::default());
    let store = Arc::new(DurablePolicyStore::new(FlakyBackend::new()));
    let orch = durable_orchestrator(verifier.clone(), store.clone());

    let mut request = verify_request("user-1", "ctx");
    request.user_context_data = None;
    let response = orch.handle(&request).await;

    assert_eq!(response.status, ResponseStatus::Error);
    assert!(!response.result);
    assert_eq!(response.status_code, 400);
    assert!(response.message.unwrap().contains("userContextData"));
    assert_eq!(verifier.calls(), 0);
    assert_eq!(store.backend().get_calls(), 0);
}

#[tokio::test]
async fn test_rejected_proof_skips_policy_lookup() {
    let verifier = Arc::new(MockProofVerifier::rejecting());
    let store = Arc::new(DurablePolicyStore::new(FlakyBackend::new()));
    let orch = durable_orchestrator(verifier.clone(), store.clone());

    let response = orch.handle(&verify_request("user-1", "ctx")).await;
    let body = serde_json::to_value(&response).unwrap();
    assert_eq!(body["status"], "error");
    assert_eq!(body["result"], false);
    assert!(body.get("credentialSubject").is_none());
    assert!(body.get("verificationOptions").is_none());
    assert_eq!(verifier.calls(), 1);
    assert_eq!(store.backend().get_calls(), 0);
}

#[tokio::test]
async fn test_store_io_failure_after_valid_proof() {
    let verifier = Arc::new(MockProofVerifier::default());
    let store = Arc::new(DurablePolicyStore::new(FlakyBackend::new()));
    store.backend().set_failing(true);
    let orch = durable_orchestrator(verifier.clone(), store.clone());

    let failed = orch.handle(&verify_request("user-1", "ctx")).await;
    assert_eq!(verifier.calls(), 1);
    assert_eq!(store.backend().get_calls(), 1);
    assert_eq!(failed.status_code, 500);
    assert_eq!(failed.message.as_deref(), Some("Internal server error"));
    assert!(failed.credential_subject.is_none());

    let rejected = durable_orchestrator(
        Arc::new(MockProofVerifier::rejecting()),
        Arc::new(DurablePolicyStore::new(FlakyBackend::new())),
    )
    .handle(&verify_request("user-1", "ctx"))
    .await;
    assert_eq!(rejected.status_code, 400);
    assert_ne!(failed.message, rejected.message);
}

#[tokio::test]
async fn test_corrupt_policy_is_a_store_fault() {
    let backend = FlakyBackend::new();
    backend.insert_raw(STANDARD_TIER_KEY, r#"{"ofac": "maybe"}"#);
    let store = Arc::new(DurablePolicyStore::new(backend));
    let orch = durable_orchestrator(Arc::new(MockProofVerifier::default()), store);

    let err = orch.verify(&verify_request("user-1", "short")).await.unwrap_err();
    assert!(matches!(err, VerifierError::Store(_)));
    assert_eq!(err.kind().status_code(), 500);
}

#[tokio::test]
async fn test_disallowed_attestation_is_validation_error() {
    let verifier = Arc::new(MockProofVerifier::default());
    let orch = VerificationOrchestrator::new(
        verifier.clone(),
        Arc::new(InMemoryPolicyStore::new()),
        Arc::new(TieredActionKeyResolver::default()),
        OrchestratorSettings {
            allowed_attestations: vec![AttestationKind::Passport],
            ..Default::default()
        },
    );
    let mut request = verify_request("user-1", "ctx");
    request.attestation_id = Some("eucard".into());
    let response = orch.handle(&request).await;
    assert_eq!(response.status_code, 400);
    assert_eq!(verifier.calls(), 0);
}

// =========================================================================
// Successful runs
// =========================================================================

#[tokio::test]
async fn test_tier_flips_between_ten_and_eleven_characters() {
    let store = Arc::new(InMemoryPolicyStore::with_tier_defaults());
    let orch = VerificationOrchestrator::new(
        Arc::new(MockProofVerifier::default()),
        store,
        Arc::new(TieredActionKeyResolver::default()),
        OrchestratorSettings::default(),
    );

    let standard = orch.verify(&verify_request("u", "0123456789")).await.unwrap();
    assert_eq!(standard.action_key, STANDARD_TIER_KEY);
    assert_eq!(standard.summary.minimum_age, Some(18));
    assert!(standard.summary.excluded_countries.is_empty());

    let premium = orch.verify(&verify_request("u", "0123456789a")).await.unwrap();
    assert_eq!(premium.action_key, PREMIUM_TIER_KEY);
    assert_eq!(premium.summary.minimum_age, Some(21));
    assert_eq!(premium.summary.excluded_countries, vec!["RUS", "IRN"]);
}

#[tokio::test]
async fn test_saved_options_drive_disclosure() {
    let store = Arc::new(DurablePolicyStore::new(FlakyBackend::new()));
    let orch = VerificationOrchestrator::new(
        Arc::new(MockProofVerifier::default()),
        store.clone(),
        Arc::new(IdentityActionKeyResolver),
        OrchestratorSettings::default(),
    );

    let created = orch
        .save_policy(
            "user-7",
            json!({
                "minimumAge": 25,
                "excludedCountries": ["PRK"],
                "name": true,
                "date_of_birth": true
            }),
        )
        .await
        .unwrap();
    assert!(created);

    let response = orch.handle(&verify_request("user-7", "anything")).await;
    assert!(response.is_success());
    let body = serde_json::to_value(&response).unwrap();
    assert_eq!(body["credentialSubject"]["name"], "ALICE SMITH");
    assert_eq!(body["credentialSubject"]["dateOfBirth"], "01-01-1990");
    assert_eq!(body["credentialSubject"]["passportNumber"], NOT_DISCLOSED);
    // ofac was not set, so it is absent rather than defaulted
    assert_eq!(
        body["verificationOptions"],
        json!({"minimumAge": 25, "excludedCountries": ["PRK"]})
    );
    assert_eq!(store.backend().put_calls(), 1);
}

#[tokio::test]
async fn test_anonymous_user_default() {
    let store = Arc::new(InMemoryPolicyStore::new());
    store
        .set(
            "anonymous-user",
            PolicyRecord::default().with_disclosure(DisclosureField::Nationality, true),
        )
        .await
        .unwrap();
    let orch = VerificationOrchestrator::new(
        Arc::new(MockProofVerifier::default()),
        store,
        Arc::new(IdentityActionKeyResolver),
        OrchestratorSettings::default(),
    );

    let mut request = verify_request("", "ctx");
    request.user_id = None;
    let outcome = orch.verify(&request).await.unwrap();
    assert_eq!(outcome.action_key, "anonymous-user");
    assert_eq!(outcome.subject.nationality, "UTO");
}

#[tokio::test]
async fn test_concurrent_requests_share_store() {
    let store = Arc::new(InMemoryPolicyStore::with_tier_defaults());
    let verifier = Arc::new(MockProofVerifier::default());
    let orch = Arc::new(VerificationOrchestrator::new(
        verifier.clone(),
        store.clone(),
        Arc::new(TieredActionKeyResolver::default()),
        OrchestratorSettings::default(),
    ));

    let mut tasks = tokio::task::JoinSet::new();
    for i in 0..24 {
        let orch = Arc::clone(&orch);
        let store = Arc::clone(&store);
        tasks.spawn(async move {
            if i % 6 == 0 {
                store
                    .set(
                        PREMIUM_TIER_KEY,
                        PolicyRecord::premium_tier().with_disclosure(DisclosureField::Gender, true),
                    )
                    .await
                    .unwrap();
            }
            let context = if i % 2 == 0 { "short" } else { "a-much-longer-context" };
            orch.handle(&verify_request(&format!("user-{}", i), context))
                .await
        });
    }

    let mut successes = 0;
    while let Some(result) = tasks.join_next().await {
        assert!(result.unwrap().is_success());
        successes += 1;
    }
    assert_eq!(successes, 24);
    assert_eq!(verifier.calls(), 24);
}
