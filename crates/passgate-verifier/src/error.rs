use passgate_core::CoreError;
use passgate_store::StoreError;

/// How a failed request is reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Malformed or missing input; nothing was called.
    Validation,
    /// The verifier errored or rejected the proof.
    ProofInvalid,
    /// Server-side fault after a valid proof (store I/O, corrupt policy).
    Internal,
}

impl FailureKind {
    /// HTTP-equivalent status code.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation | Self::ProofInvalid => 400,
            Self::Internal => 500,
        }
    }
}

/// Verification pipeline errors.
#[derive(Debug, thiserror::Error)]
pub enum VerifierError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("proof rejected by verifier")]
    ProofInvalid,

    #[error("verifier error: {0}")]
    Verification(String),

    #[error("verifier deadline elapsed")]
    Timeout,

    #[error("policy store error: {0}")]
    Store(#[from] StoreError),

    #[error("pipeline error: {0}")]
    Stage(#[from] CoreError),
}

impl VerifierError {
    /// Classify the error for reporting.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Validation(_) => FailureKind::Validation,
            Self::Store(e) if e.is_caller_error() => FailureKind::Validation,
            Self::ProofInvalid | Self::Verification(_) | Self::Timeout => {
                FailureKind::ProofInvalid
            }
            Self::Store(_) | Self::Stage(_) => FailureKind::Internal,
        }
    }

    /// Message safe to show the caller. Internal faults never carry
    /// backend detail.
    pub fn user_message(&self) -> String {
        match self.kind() {
            FailureKind::Validation => match self {
                Self::Validation(msg) => msg.clone(),
                other => other.to_string(),
            },
            FailureKind::ProofInvalid => "Verification failed".into(),
            FailureKind::Internal => "Internal server error".into(),
        }
    }
}
