use crate::verification_state::VerificationStage;

/// Core domain errors.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid stage transition from {from} to {to}")]
    InvalidStageTransition {
        from: VerificationStage,
        to: VerificationStage,
    },

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("invalid country code: {0}")]
    InvalidCountryCode(String),

    #[error("duplicate excluded country: {0}")]
    DuplicateCountry(String),

    #[error("too many excluded countries: {count} exceeds the limit of {limit}")]
    TooManyCountries { count: usize, limit: usize },

    #[error("minimum age {0} is outside 0..=120")]
    MinimumAgeOutOfRange(u32),

    #[error("unknown disclosure field: {0}")]
    UnknownField(String),
}
