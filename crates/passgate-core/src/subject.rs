use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::CoreError;
use crate::policy::DisclosureField;

/// Value substituted for every field the policy does not disclose.
pub const NOT_DISCLOSED: &str = "Not disclosed";

/// Disclosed attributes as returned by the proof verifier.
///
/// Read-only input to redaction. Keys are whatever the verifier emitted;
/// lookups by [`DisclosureField`] also accept the snake_case spelling and
/// `idNumber` for the passport number.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialSubject(BTreeMap<String, Value>);

impl CredentialSubject {
    /// Create an empty subject.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a subject from a JSON object.
    pub fn from_value(value: Value) -> Result<Self, CoreError> {
        match value {
            Value::Object(map) => Ok(Self(map.into_iter().collect())),
            other => Err(CoreError::ValidationError(format!(
                "credential subject must be a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Insert an attribute.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Look up the value for a disclosable field.
    pub fn field(&self, field: DisclosureField) -> Option<&Value> {
        field_aliases(field)
            .iter()
            .find_map(|name| self.0.get(*name))
    }

    /// Look up an arbitrary attribute.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the subject carries no attributes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn field_aliases(field: DisclosureField) -> &'static [&'static str] {
    match field {
        DisclosureField::IssuingState => &["issuingState", "issuing_state"],
        DisclosureField::Name => &["name"],
        DisclosureField::Nationality => &["nationality"],
        DisclosureField::DateOfBirth => &["dateOfBirth", "date_of_birth"],
        DisclosureField::PassportNumber => &["passportNumber", "passport_number", "idNumber"],
        DisclosureField::Gender => &["gender"],
        DisclosureField::ExpiryDate => &["expiryDate", "expiry_date"],
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// The caller-facing view of a credential subject: exactly the seven
/// disclosable fields, each holding either the verifier's value or
/// [`NOT_DISCLOSED`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedactedSubject {
    pub issuing_state: Value,
    pub name: Value,
    pub nationality: Value,
    pub date_of_birth: Value,
    pub passport_number: Value,
    pub gender: Value,
    pub expiry_date: Value,
}

impl RedactedSubject {
    /// A subject with every field redacted.
    pub fn all_redacted() -> Self {
        let hidden = || Value::String(NOT_DISCLOSED.to_string());
        Self {
            issuing_state: hidden(),
            name: hidden(),
            nationality: hidden(),
            date_of_birth: hidden(),
            passport_number: hidden(),
            gender: hidden(),
            expiry_date: hidden(),
        }
    }

    /// The value held for a field.
    pub fn get(&self, field: DisclosureField) -> &Value {
        match field {
            DisclosureField::IssuingState => &self.issuing_state,
            DisclosureField::Name => &self.name,
            DisclosureField::Nationality => &self.nationality,
            DisclosureField::DateOfBirth => &self.date_of_birth,
            DisclosureField::PassportNumber => &self.passport_number,
            DisclosureField::Gender => &self.gender,
            DisclosureField::ExpiryDate => &self.expiry_date,
        }
    }

    /// Mutable access to the value held for a field.
    pub fn get_mut(&mut self, field: DisclosureField) -> &mut Value {
        match field {
            DisclosureField::IssuingState => &mut self.issuing_state,
            DisclosureField::Name => &mut self.name,
            DisclosureField::Nationality => &mut self.nationality,
            DisclosureField::DateOfBirth => &mut self.date_of_birth,
            DisclosureField::PassportNumber => &mut self.passport_number,
            DisclosureField::Gender => &mut self.gender,
            DisclosureField::ExpiryDate => &mut self.expiry_date,
        }
    }

    /// Whether the field holds the redaction sentinel.
    pub fn is_redacted(&self, field: DisclosureField) -> bool {
        self.get(field).as_str() == Some(NOT_DISCLOSED)
    }
}

impl From<&RedactedSubject> for CredentialSubject {
    fn from(redacted: &RedactedSubject) -> Self {
        DisclosureField::ALL
            .iter()
            .fold(CredentialSubject::new(), |subject, field| {
                subject.with(field.as_str(), redacted.get(*field).clone())
            })
    }
}

/// Policy requirements echoed back to the caller alongside the redacted
/// subject. Carries only these three fields; the stored record's
/// disclosure toggles are never exposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicySummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ofac: Option<bool>,
    pub excluded_countries: Vec<String>,
}
