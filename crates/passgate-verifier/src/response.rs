//! Caller-facing result shapes.

use serde::{Deserialize, Serialize};

use passgate_core::{PolicySummary, RedactedSubject};

use crate::error::VerifierError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

/// Result of a verification request.
///
/// Failures never carry credential data or policy options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub status: ResponseStatus,
    pub result: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_subject: Option<RedactedSubject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_options: Option<PolicySummary>,
    /// HTTP-equivalent status code; not part of the body.
    #[serde(skip)]
    pub status_code: u16,
}

impl VerifyResponse {
    pub fn success(subject: RedactedSubject, summary: PolicySummary) -> Self {
        Self {
            status: ResponseStatus::Success,
            result: true,
            message: None,
            credential_subject: Some(subject),
            verification_options: Some(summary),
            status_code: 200,
        }
    }

    pub fn failure(err: &VerifierError) -> Self {
        Self {
            status: ResponseStatus::Error,
            result: false,
            message: Some(err.user_message()),
            credential_subject: None,
            verification_options: None,
            status_code: err.kind().status_code(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ResponseStatus::Success && self.result
    }
}

/// Result of a policy write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveOptionsResponse {
    pub status: ResponseStatus,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<bool>,
    #[serde(skip)]
    pub status_code: u16,
}

impl SaveOptionsResponse {
    pub fn saved(created: bool) -> Self {
        Self {
            status: ResponseStatus::Success,
            message: "Options saved successfully".into(),
            created: Some(created),
            status_code: if created { 201 } else { 200 },
        }
    }

    pub fn failure(err: &VerifierError) -> Self {
        Self {
            status: ResponseStatus::Error,
            message: err.user_message(),
            created: None,
            status_code: err.kind().status_code(),
        }
    }
}
