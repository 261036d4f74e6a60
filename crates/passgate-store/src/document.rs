//! Wire format for stored policies.
//!
//! One flat JSON object per key. Optional fields that are absent stay
//! absent across a write/read cycle; unknown fields are ignored on read.

use passgate_core::{CoreError, CountryCode, DisclosureField, PolicyRecord};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// JSON shape of a stored policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ofac: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excluded_countries: Option<Vec<String>>,
    #[serde(default, alias = "issuing_state", skip_serializing_if = "Option::is_none")]
    pub issuing_state: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nationality: Option<bool>,
    #[serde(default, alias = "date_of_birth", skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<bool>,
    #[serde(default, alias = "passport_number", skip_serializing_if = "Option::is_none")]
    pub passport_number: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<bool>,
    #[serde(default, alias = "expiry_date", skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<bool>,
}

impl PolicyDocument {
    fn toggle(&self, field: DisclosureField) -> Option<bool> {
        match field {
            DisclosureField::IssuingState => self.issuing_state,
            DisclosureField::Name => self.name,
            DisclosureField::Nationality => self.nationality,
            DisclosureField::DateOfBirth => self.date_of_birth,
            DisclosureField::PassportNumber => self.passport_number,
            DisclosureField::Gender => self.gender,
            DisclosureField::ExpiryDate => self.expiry_date,
        }
    }

    fn toggle_mut(&mut self, field: DisclosureField) -> &mut Option<bool> {
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

    /// Convert into a validated record.
    pub fn into_record(self) -> Result<PolicyRecord, CoreError> {
        let excluded_countries = self
            .excluded_countries
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|c| CountryCode::parse(c))
            .collect::<Result<Vec<_>, _>>()?;

        let disclosure = DisclosureField::ALL
            .iter()
            .filter_map(|f| self.toggle(*f).map(|d| (*f, d)))
            .collect();

        let record = PolicyRecord {
            minimum_age: self.minimum_age,
            ofac_check: self.ofac,
            excluded_countries,
            disclosure,
        };
        record.validate()?;
        Ok(record)
    }

    /// Serialize to the stored JSON string.
    pub fn encode(&self) -> Result<String, StoreError> {
        serde_json::to_string(self).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Decode a stored JSON string into a validated record.
    pub fn decode(json: &str) -> Result<PolicyRecord, CoreError> {
        let doc: PolicyDocument = serde_json::from_str(json)
            .map_err(|e| CoreError::ValidationError(format!("malformed policy JSON: {}", e)))?;
        doc.into_record()
    }

    /// Decode a caller-supplied options object into a validated record.
    pub fn from_value(value: serde_json::Value) -> Result<PolicyRecord, CoreError> {
        if !value.is_object() {
            return Err(CoreError::ValidationError(
                "policy options must be a JSON object".into(),
            ));
        }
        let doc: PolicyDocument = serde_json::from_value(value)
            .map_err(|e| CoreError::ValidationError(format!("malformed policy options: {}", e)))?;
        doc.into_record()
    }
}

impl From<&PolicyRecord> for PolicyDocument {
    fn from(record: &PolicyRecord) -> Self {
        let mut doc = PolicyDocument {
            minimum_age: record.minimum_age,
            ofac: record.ofac_check,
            excluded_countries: if record.excluded_countries.is_empty() {
                None
            } else {
                Some(
                    record
                        .excluded_countries
                        .iter()
                        .map(|c| c.to_string())
                        .collect(),
                )
            },
            ..Default::default()
        };
        for (field, disclose) in record.disclosure.iter() {
            *doc.toggle_mut(field) = Some(disclose);
        }
        doc
    }
}
