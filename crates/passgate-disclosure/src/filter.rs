use serde_json::Value;

use passgate_core::{
    CredentialSubject, DisclosureField, PolicyRecord, PolicySummary, RedactedSubject,
};

/// Stateless selective-disclosure filter.
///
/// Every disclosable field is controlled by exactly one toggle: a `true`
/// toggle copies the verifier's value, anything else yields
/// [`passgate_core::NOT_DISCLOSED`]. The input subject is never modified.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisclosureFilter;

impl DisclosureFilter {
    pub fn new() -> Self {
        Self
    }

    /// Produce the redacted view of `subject` under `record`.
    ///
    /// A disclosed field the verifier did not supply is returned as `null`.
    pub fn redact(&self, subject: &CredentialSubject, record: &PolicyRecord) -> RedactedSubject {
        let mut redacted = RedactedSubject::all_redacted();
        let mut disclosed = 0usize;

        for field in DisclosureField::ALL {
            if record.disclosure.is_disclosed(field) {
                *redacted.get_mut(field) = subject.field(field).cloned().unwrap_or(Value::Null);
                disclosed += 1;
            }
        }

        tracing::debug!(
            disclosed,
            redacted = DisclosureField::ALL.len() - disclosed,
            "credential subject filtered"
        );
        redacted
    }

    /// Project the caller-facing policy requirements out of `record`.
    pub fn summarize(&self, record: &PolicyRecord) -> PolicySummary {
        PolicySummary {
            minimum_age: record.minimum_age,
            ofac: record.ofac_check,
            excluded_countries: record
                .excluded_countries
                .iter()
                .map(|c| c.to_string())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn passport_subject() -> CredentialSubject {
        CredentialSubject::new()
            .with("issuingState", "FRA")
            .with("name", json!(["DUPONT", "MARIE"]))
            .with("nationality", "FRA")
            .with("dateOfBirth", "1990-04-12")
            .with("passportNumber", "18FR12345")
            .with("gender", "F")
            .with("expiryDate", "2031-06-30")
            .with("nullifier", "0x1234")
    }

    #[test]
    fn test_all_toggles_false_hides_everything() {
        let mut record = PolicyRecord::default();
        for field in DisclosureField::ALL {
            record.disclosure.set(field, false);
        }
        let redacted = DisclosureFilter::new().redact(&passport_subject(), &record);
        assert_eq!(redacted, RedactedSubject::all_redacted());
    }

    #[test]
    fn test_missing_toggles_hide_everything() {
        let redacted =
            DisclosureFilter::new().redact(&passport_subject(), &PolicyRecord::default_policy());
        for field in DisclosureField::ALL {
            assert!(redacted.is_redacted(field), "{} should be hidden", field);
        }
    }

    #[test]
    fn test_partial_disclosure() {
        let record = PolicyRecord::default()
            .with_disclosure(DisclosureField::Nationality, true)
            .with_disclosure(DisclosureField::Name, true)
            .with_disclosure(DisclosureField::Gender, false);
        let redacted = DisclosureFilter::new().redact(&passport_subject(), &record);

        assert_eq!(redacted.nationality, json!("FRA"));
        assert_eq!(redacted.name, json!(["DUPONT", "MARIE"]));
        assert!(redacted.is_redacted(DisclosureField::Gender));
        assert!(redacted.is_redacted(DisclosureField::PassportNumber));
        assert!(redacted.is_redacted(DisclosureField::DateOfBirth));
    }

    #[test]
    fn test_input_subject_untouched() {
        let subject = passport_subject();
        let before = subject.clone();
        DisclosureFilter::new().redact(&subject, &PolicyRecord::default());
        assert_eq!(subject, before);
    }

    #[test]
    fn test_redaction_idempotent() {
        let filter = DisclosureFilter::new();
        let record = PolicyRecord::default()
            .with_disclosure(DisclosureField::IssuingState, true)
            .with_disclosure(DisclosureField::ExpiryDate, true);
        let once = filter.redact(&passport_subject(), &record);
        let twice = filter.redact(&CredentialSubject::from(&once), &record);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_disclosed_but_absent_is_null() {
        let record = PolicyRecord::default().with_disclosure(DisclosureField::Gender, true);
        let redacted = DisclosureFilter::new().redact(&CredentialSubject::new(), &record);
        assert_eq!(redacted.gender, Value::Null);
    }

    #[test]
    fn test_id_number_feeds_passport_number() {
        let subject = CredentialSubject::new().with("idNumber", "TEST123");
        let record = PolicyRecord::default().with_disclosure(DisclosureField::PassportNumber, true);
        let redacted = DisclosureFilter::new().redact(&subject, &record);
        assert_eq!(redacted.passport_number, json!("TEST123"));
    }

    #[test]
    fn test_summary_passes_through() {
        let summary = DisclosureFilter::new().summarize(&PolicyRecord::premium_tier());
        assert_eq!(summary.minimum_age, Some(21));
        assert_eq!(summary.ofac, Some(true));
        assert_eq!(summary.excluded_countries, vec!["RUS", "IRN"]);
    }

    #[test]
    fn test_summary_empty_exclusions_is_list() {
        let summary = DisclosureFilter::new().summarize(&PolicyRecord::default());
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json, json!({"excludedCountries": []}));
    }

    #[test]
    fn test_summary_does_not_leak_toggles() {
        let record = PolicyRecord::default_policy().with_disclosure(DisclosureField::Name, true);
        let json = serde_json::to_value(DisclosureFilter::new().summarize(&record)).unwrap();
        let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 3);
        assert!(json.get("name").is_none());
    }
}
