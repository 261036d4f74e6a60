//! Verification pipeline.
//!
//! One [`VerificationOrchestrator::verify`] call runs the stages in order:
//! validate the request, check the proof, resolve the action key, load
//! the policy, redact the subject. The store is only touched after the
//! verifier has returned, so no store lock is ever held across the
//! external call.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::time::Instant;

use passgate_core::{
    PolicyRecord, PolicySummary, RedactedSubject, VerificationEvent, VerificationStage,
    VerificationStageMachine,
};
use passgate_disclosure::{ActionKeyResolver, DisclosureFilter};
use passgate_store::{PolicyDocument, PolicyStore, StoreError};

use crate::error::VerifierError;
use crate::request::{SaveOptionsRequest, VerifyRequest, DEFAULT_USER_ID};
use crate::response::{SaveOptionsResponse, VerifyResponse};
use crate::verifier::{AttestationKind, ProofVerifier, VerificationInput};

/// Per-orchestrator settings.
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    /// Attestation kinds the verifier is asked to accept.
    pub allowed_attestations: Vec<AttestationKind>,
    /// Identity used when the request has none.
    pub default_user_id: String,
    /// Budget for one request, shared by the verifier call and the store
    /// calls that follow it.
    pub timeout: Duration,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            allowed_attestations: AttestationKind::ALL.to_vec(),
            default_user_id: DEFAULT_USER_ID.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// A completed verification.
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationOutcome {
    pub subject: RedactedSubject,
    pub summary: PolicySummary,
    pub action_key: String,
    pub user_identifier: String,
}

/// Tracks one request through the stage machine.
struct StageTracker {
    stage: VerificationStage,
}

impl StageTracker {
    fn new() -> Self {
        Self {
            stage: VerificationStage::Received,
        }
    }

    fn advance(&mut self, event: VerificationEvent) -> Result<(), VerifierError> {
        self.stage = VerificationStageMachine::transition(self.stage, event)?;
        Ok(())
    }

    fn fail(&mut self) {
        if let Ok(next) = VerificationStageMachine::transition(self.stage, VerificationEvent::Fail) {
            self.stage = next;
        }
    }
}

/// Runs verification requests against a proof verifier and a policy store.
pub struct VerificationOrchestrator {
    verifier: Arc<dyn ProofVerifier>,
    store: Arc<dyn PolicyStore>,
    resolver: Arc<dyn ActionKeyResolver>,
    filter: DisclosureFilter,
    settings: OrchestratorSettings,
}

impl VerificationOrchestrator {
    pub fn new(
        verifier: Arc<dyn ProofVerifier>,
        store: Arc<dyn PolicyStore>,
        resolver: Arc<dyn ActionKeyResolver>,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            verifier,
            store,
            resolver,
            filter: DisclosureFilter::new(),
            settings,
        }
    }

    pub fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    /// Run one request through the pipeline within the configured timeout.
    ///
    /// Validation failures return before any collaborator is called. A
    /// rejected proof returns before the store is read.
    pub async fn verify(&self, request: &VerifyRequest) -> Result<VerificationOutcome, VerifierError> {
        self.verify_until(request, Instant::now() + self.settings.timeout)
            .await
    }

    /// Run one request through the pipeline, finishing by `deadline`.
    ///
    /// The store lookup only gets what the verifier left of the budget.
    pub async fn verify_until(
        &self,
        request: &VerifyRequest,
        deadline: Instant,
    ) -> Result<VerificationOutcome, VerifierError> {
        let input = request.normalize(
            &self.settings.allowed_attestations,
            &self.settings.default_user_id,
        )?;

        let mut tracker = StageTracker::new();
        tracing::debug!(
            identity = %input.identity,
            attestation = %input.attestation,
            stage = %tracker.stage,
            "verification request accepted"
        );

        let result = self.run(&input, &mut tracker, deadline).await;
        if result.is_err() {
            tracker.fail();
        }
        tracing::debug!(identity = %input.identity, stage = %tracker.stage, "verification finished");
        result
    }

    async fn run(
        &self,
        input: &VerificationInput,
        tracker: &mut StageTracker,
        deadline: Instant,
    ) -> Result<VerificationOutcome, VerifierError> {
        let output = tokio::time::timeout_at(deadline, self.verifier.verify(input))
            .await
            .map_err(|_| {
                tracing::warn!(verifier = self.verifier.name(), "verifier deadline elapsed");
                VerifierError::Timeout
            })?
            .inspect_err(|e| {
                tracing::warn!(verifier = self.verifier.name(), error = %e, "verifier call failed");
            })?;

        if !output.valid {
            tracing::info!(identity = %input.identity, "proof rejected");
            return Err(VerifierError::ProofInvalid);
        }
        tracker.advance(VerificationEvent::ProofAccepted)?;

        let identity = if output.user_identifier.is_empty() {
            input.identity.as_str()
        } else {
            output.user_identifier.as_str()
        };
        let action_key = self.resolver.resolve(identity, &input.context_data);

        let record = self.load_policy(&action_key, deadline).await?;
        tracker.advance(VerificationEvent::PolicyLoaded)?;

        let subject = self.filter.redact(&output.subject, &record);
        tracker.advance(VerificationEvent::SubjectRedacted)?;

        let summary = self.filter.summarize(&record);
        tracker.advance(VerificationEvent::ResultReturned)?;

        tracing::info!(identity, action_key = %action_key, "verification succeeded");
        Ok(VerificationOutcome {
            subject,
            summary,
            action_key,
            user_identifier: output.user_identifier,
        })
    }

    async fn load_policy(&self, key: &str, deadline: Instant) -> Result<PolicyRecord, VerifierError> {
        let record = tokio::time::timeout_at(deadline, self.store.get(key))
            .await
            .map_err(|_| StoreError::Timeout)
            .and_then(|r| r)
            .inspect_err(|e| {
                tracing::error!(
                    key,
                    backend = self.store.backend_name(),
                    error = %e,
                    "policy lookup failed"
                );
            })?;
        Ok(record)
    }

    /// Run a request and shape the result for the caller.
    pub async fn handle(&self, request: &VerifyRequest) -> VerifyResponse {
        match self.verify(request).await {
            Ok(outcome) => VerifyResponse::success(outcome.subject, outcome.summary),
            Err(e) => VerifyResponse::failure(&e),
        }
    }

    /// Decode a raw options object and store it under `key`.
    ///
    /// Returns whether the key was newly created.
    pub async fn save_policy(&self, key: &str, options: Value) -> Result<bool, VerifierError> {
        if key.trim().is_empty() {
            return Err(VerifierError::Validation("policy key is required".into()));
        }
        let record = PolicyDocument::from_value(options)
            .map_err(|e| VerifierError::Validation(e.to_string()))?;
        self.store_policy(key, record).await
    }

    /// Handle a `{userId, options}` write and shape the result.
    pub async fn handle_save_options(&self, request: SaveOptionsRequest) -> SaveOptionsResponse {
        let result = match request.into_parts() {
            Ok((key, record)) => self.store_policy(&key, record).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(created) => SaveOptionsResponse::saved(created),
            Err(e) => SaveOptionsResponse::failure(&e),
        }
    }

    async fn store_policy(&self, key: &str, record: PolicyRecord) -> Result<bool, VerifierError> {
        let deadline = Instant::now() + self.settings.timeout;
        tokio::time::timeout_at(deadline, self.store.set(key, record))
            .await
            .map_err(|_| StoreError::Timeout)
            .and_then(|r| r)
            .inspect_err(|e| {
                if !e.is_caller_error() {
                    tracing::error!(key, error = %e, "policy write failed");
                }
            })
            .map_err(VerifierError::from)
    }
}
