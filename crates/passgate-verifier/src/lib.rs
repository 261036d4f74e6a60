//! Passgate Verifier: Runs one verification request end to end: input
//! validation, the external proof check, policy lookup and redaction.

pub mod error;
pub mod orchestrator;
pub mod request;
pub mod response;
pub mod verifier;

pub use error::{FailureKind, VerifierError};
pub use orchestrator::{OrchestratorSettings, VerificationOrchestrator, VerificationOutcome};
pub use request::{SaveOptionsRequest, VerifyRequest, DEFAULT_USER_ID};
pub use response::{ResponseStatus, SaveOptionsResponse, VerifyResponse};
pub use verifier::{
    AttestationKind, MockProofVerifier, ProofVerifier, VerificationInput, VerifierOutput,
};
