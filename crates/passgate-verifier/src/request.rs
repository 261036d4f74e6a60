//! Inbound request shapes and their validation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use passgate_store::PolicyDocument;
use passgate_core::PolicyRecord;

use crate::error::VerifierError;
use crate::verifier::{AttestationKind, VerificationInput};

/// Identity used when a request carries no `userId`.
pub const DEFAULT_USER_ID: &str = "anonymous-user";

/// A verification request as received from the caller.
///
/// Every field is optional on the wire so that missing inputs surface as
/// validation errors rather than decode errors. JSON `null` counts as
/// missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attestation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_signals: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_context_data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl VerifyRequest {
    /// Check required inputs and normalize the request for the verifier.
    ///
    /// - `attestationId`, `proof`, `publicSignals` and `userContextData`
    ///   are required; an empty `attestationId` counts as missing.
    /// - Unknown attestation ids fall back to passport.
    /// - A missing or empty `userId` becomes `default_user_id`.
    /// - A string `userContextData` is passed verbatim, anything else as
    ///   compact JSON.
    pub fn normalize(
        &self,
        allowed: &[AttestationKind],
        default_user_id: &str,
    ) -> Result<VerificationInput, VerifierError> {
        let attestation_id = self
            .attestation_id
            .as_deref()
            .filter(|id| !id.trim().is_empty());

        let mut missing = Vec::new();
        if attestation_id.is_none() {
            missing.push("attestationId");
        }
        if self.proof.is_none() {
            missing.push("proof");
        }
        if self.public_signals.is_none() {
            missing.push("publicSignals");
        }
        if self.user_context_data.is_none() {
            missing.push("userContextData");
        }

        let (Some(attestation_id), Some(proof), Some(public_signals), Some(context)) = (
            attestation_id,
            self.proof.as_ref(),
            self.public_signals.as_ref(),
            self.user_context_data.as_ref(),
        ) else {
            return Err(VerifierError::Validation(format!(
                "missing required fields: {}",
                missing.join(", ")
            )));
        };

        let attestation = AttestationKind::from_id(attestation_id).unwrap_or_else(|| {
            tracing::warn!(attestation_id, "unknown attestation id, treating as passport");
            AttestationKind::Passport
        });
        if !allowed.contains(&attestation) {
            return Err(VerifierError::Validation(format!(
                "attestation '{}' is not accepted",
                attestation
            )));
        }

        let identity = self
            .user_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .unwrap_or(default_user_id)
            .to_string();

        let context_data = match context {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };

        Ok(VerificationInput {
            identity,
            attestation,
            allowed_attestations: allowed.to_vec(),
            proof: proof.clone(),
            public_signals: public_signals.clone(),
            context_data,
        })
    }
}

/// Request to store a policy under a user's key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveOptionsRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
}

impl SaveOptionsRequest {
    /// Validate into the key and record to store.
    pub fn into_parts(self) -> Result<(String, PolicyRecord), VerifierError> {
        let user_id = self
            .user_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());
        let (Some(user_id), Some(options)) = (user_id, self.options) else {
            return Err(VerifierError::Validation(
                "userId and options are required".into(),
            ));
        };
        let record = PolicyDocument::from_value(options)
            .map_err(|e| VerifierError::Validation(e.to_string()))?;
        Ok((user_id, record))
    }
}
