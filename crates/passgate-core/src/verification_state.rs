use std::fmt;

use crate::error::CoreError;

/// Stages of a single verification request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum VerificationStage {
    /// Request accepted, inputs validated.
    Received,
    /// The external verifier accepted the proof.
    ProofValidated,
    /// The policy for the action key was loaded.
    PolicyResolved,
    /// The credential subject was redacted.
    Filtered,
    /// Result handed back to the caller. Final state.
    Completed,
    /// The request failed at some step. Final state.
    Errored,
}

impl VerificationStage {
    /// Whether this is a final (terminal) stage.
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Completed | Self::Errored)
    }
}

impl fmt::Display for VerificationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Received => write!(f, "Received"),
            Self::ProofValidated => write!(f, "ProofValidated"),
            Self::PolicyResolved => write!(f, "PolicyResolved"),
            Self::Filtered => write!(f, "Filtered"),
            Self::Completed => write!(f, "Completed"),
            Self::Errored => write!(f, "Errored"),
        }
    }
}

/// Events that advance a verification request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationEvent {
    /// Verifier returned validity=true.
    ProofAccepted,
    /// Policy lookup succeeded.
    PolicyLoaded,
    /// Disclosure filter applied.
    SubjectRedacted,
    /// Response produced.
    ResultReturned,
    /// Any step failed.
    Fail,
}

/// Transition table for a verification request.
///
/// Valid transitions:
/// - Received → ProofValidated (ProofAccepted)
/// - ProofValidated → PolicyResolved (PolicyLoaded)
/// - PolicyResolved → Filtered (SubjectRedacted)
/// - Filtered → Completed (ResultReturned)
/// - any non-final stage → Errored (Fail)
pub struct VerificationStageMachine;

impl VerificationStageMachine {
    /// Attempt a transition. Returns the new stage, or an error for
    /// out-of-order events and events on a final stage.
    pub fn transition(
        current: VerificationStage,
        event: VerificationEvent,
    ) -> Result<VerificationStage, CoreError> {
        let next = match (current, event) {
            (VerificationStage::Received, VerificationEvent::ProofAccepted) => {
                VerificationStage::ProofValidated
            }
            (VerificationStage::ProofValidated, VerificationEvent::PolicyLoaded) => {
                VerificationStage::PolicyResolved
            }
            (VerificationStage::PolicyResolved, VerificationEvent::SubjectRedacted) => {
                VerificationStage::Filtered
            }
            (VerificationStage::Filtered, VerificationEvent::ResultReturned) => {
                VerificationStage::Completed
            }
            (stage, VerificationEvent::Fail) if !stage.is_final() => VerificationStage::Errored,

            _ => {
                let target = match event {
                    VerificationEvent::ProofAccepted => VerificationStage::ProofValidated,
                    VerificationEvent::PolicyLoaded => VerificationStage::PolicyResolved,
                    VerificationEvent::SubjectRedacted => VerificationStage::Filtered,
                    VerificationEvent::ResultReturned => VerificationStage::Completed,
                    VerificationEvent::Fail => VerificationStage::Errored,
                };
                return Err(CoreError::InvalidStageTransition {
                    from: current,
                    to: target,
                });
            }
        };

        tracing::debug!(
            from = %current,
            to = %next,
            event = ?event,
            "verification stage transition"
        );

        Ok(next)
    }

    /// Check if a transition is valid without performing it.
    pub fn can_transition(current: VerificationStage, event: VerificationEvent) -> bool {
        Self::transition(current, event).is_ok()
    }
}
