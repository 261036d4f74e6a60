use passgate_core::CoreError;

/// Policy store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backend failed to read or write.
    #[error("backend error: {0}")]
    Backend(String),

    /// A stored value could not be decoded into a valid policy.
    #[error("corrupt policy under key '{key}': {reason}")]
    Corrupt { key: String, reason: String },

    /// The record was rejected at write time.
    #[error("invalid policy: {0}")]
    Invalid(#[from] CoreError),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("store operation timed out")]
    Timeout,
}

impl StoreError {
    /// Whether the error is a caller mistake rather than a store fault.
    pub fn is_caller_error(&self) -> bool {
        matches!(self, Self::Invalid(_))
    }
}
