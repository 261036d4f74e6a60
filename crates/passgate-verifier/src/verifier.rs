//! Seam to the external zero-knowledge proof verifier.
//!
//! The proof check itself lives in a third-party service. This module
//! names the contract the pipeline depends on, plus a deterministic
//! [`MockProofVerifier`] for tests and the CLI.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use passgate_core::CredentialSubject;

use crate::error::VerifierError;

/// Document type the proof attests to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttestationKind {
    Passport,
    #[serde(rename = "eucard")]
    EuCard,
}

impl AttestationKind {
    pub const ALL: [AttestationKind; 2] = [AttestationKind::Passport, AttestationKind::EuCard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passport => "passport",
            Self::EuCard => "eucard",
        }
    }

    /// Map a caller-supplied attestation id. Unrecognised ids yield `None`.
    pub fn from_id(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "passport" | "1" => Some(Self::Passport),
            "eucard" | "eu_card" | "2" => Some(Self::EuCard),
            _ => None,
        }
    }
}

impl fmt::Display for AttestationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated input handed to a [`ProofVerifier`].
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationInput {
    pub identity: String,
    pub attestation: AttestationKind,
    pub allowed_attestations: Vec<AttestationKind>,
    pub proof: Value,
    pub public_signals: Value,
    pub context_data: String,
}

/// What the verifier reports back for a proof.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifierOutput {
    /// Whether the proof checked out.
    pub valid: bool,
    /// Disclosed attributes, unfiltered.
    pub subject: CredentialSubject,
    /// Identifier bound into the proof, empty when the verifier has none.
    pub user_identifier: String,
}

/// External proof verifier.
///
/// Implementations must tolerate being dropped mid-call: the pipeline
/// abandons the future when its deadline passes.
#[async_trait]
pub trait ProofVerifier: Send + Sync {
    async fn verify(&self, input: &VerificationInput) -> Result<VerifierOutput, VerifierError>;

    /// Short name for logs.
    fn name(&self) -> &str;
}

#[derive(Debug, Clone)]
enum MockBehavior {
    Accept(CredentialSubject),
    Reject,
    Fail(String),
}

/// Deterministic verifier with a call counter.
#[derive(Debug)]
pub struct MockProofVerifier {
    behavior: MockBehavior,
    user_identifier: Option<String>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MockProofVerifier {
    fn with_behavior(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            user_identifier: None,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Accept every proof and disclose `subject`.
    pub fn accepting(subject: CredentialSubject) -> Self {
        Self::with_behavior(MockBehavior::Accept(subject))
    }

    /// Report every proof as invalid.
    pub fn rejecting() -> Self {
        Self::with_behavior(MockBehavior::Reject)
    }

    /// Fail every call with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_behavior(MockBehavior::Fail(message.into()))
    }

    /// Report this identifier instead of echoing the request identity.
    pub fn with_user_identifier(mut self, id: impl Into<String>) -> Self {
        self.user_identifier = Some(id.into());
        self
    }

    /// Sleep before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of `verify` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// A fully populated passport subject.
    pub fn sample_subject() -> CredentialSubject {
        CredentialSubject::from_value(json!({
            "issuingState": "UTO",
            "name": "ALICE SMITH",
            "nationality": "UTO",
            "dateOfBirth": "01-01-1990",
            "passportNumber": "L898902C3",
            "gender": "F",
            "expiryDate": "01-01-2030"
        }))
        .unwrap_or_default()
    }
}

impl Default for MockProofVerifier {
    fn default() -> Self {
        Self::accepting(Self::sample_subject())
    }
}

#[async_trait]
impl ProofVerifier for MockProofVerifier {
    async fn verify(&self, input: &VerificationInput) -> Result<VerifierOutput, VerifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let user_identifier = self
            .user_identifier
            .clone()
            .unwrap_or_else(|| input.identity.clone());

        match &self.behavior {
            MockBehavior::Accept(subject) => Ok(VerifierOutput {
                valid: true,
                subject: subject.clone(),
                user_identifier,
            }),
            MockBehavior::Reject => Ok(VerifierOutput {
                valid: false,
                subject: CredentialSubject::new(),
                user_identifier,
            }),
            MockBehavior::Fail(message) => Err(VerifierError::Verification(message.clone())),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
