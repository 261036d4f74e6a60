use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use crate::country::CountryCode;
use crate::error::CoreError;

/// Minimum age applied when no policy has been written for a key.
pub const DEFAULT_MINIMUM_AGE: u32 = 18;

/// Upper bound for `minimum_age`.
pub const MAX_MINIMUM_AGE: u32 = 120;

/// Upper bound for the exclusion list.
pub const MAX_EXCLUDED_COUNTRIES: usize = 40;

/// Key of the standard tier policy.
pub const STANDARD_TIER_KEY: &str = "standard-user-config";

/// Key of the premium tier policy.
pub const PREMIUM_TIER_KEY: &str = "premium-user-config";

/// A credential field whose disclosure is controlled by a policy toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DisclosureField {
    IssuingState,
    Name,
    Nationality,
    DateOfBirth,
    PassportNumber,
    Gender,
    ExpiryDate,
}

impl DisclosureField {
    /// Every disclosable field, in response order.
    pub const ALL: [DisclosureField; 7] = [
        Self::IssuingState,
        Self::Name,
        Self::Nationality,
        Self::DateOfBirth,
        Self::PassportNumber,
        Self::Gender,
        Self::ExpiryDate,
    ];

    /// The camelCase name used in subjects and stored policies.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IssuingState => "issuingState",
            Self::Name => "name",
            Self::Nationality => "nationality",
            Self::DateOfBirth => "dateOfBirth",
            Self::PassportNumber => "passportNumber",
            Self::Gender => "gender",
            Self::ExpiryDate => "expiryDate",
        }
    }
}

impl fmt::Display for DisclosureField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DisclosureField {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "issuingState" | "issuing_state" => Ok(Self::IssuingState),
            "name" => Ok(Self::Name),
            "nationality" => Ok(Self::Nationality),
            "dateOfBirth" | "date_of_birth" => Ok(Self::DateOfBirth),
            "passportNumber" | "passport_number" => Ok(Self::PassportNumber),
            "gender" => Ok(Self::Gender),
            "expiryDate" | "expiry_date" => Ok(Self::ExpiryDate),
            other => Err(CoreError::UnknownField(other.to_string())),
        }
    }
}

/// Per-field disclosure switches. Fields without an entry are not disclosed.
///
/// Absent and explicit `false` entries are kept distinct so that a stored
/// policy reads back exactly as it was written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisclosureToggles(BTreeMap<DisclosureField, bool>);

impl DisclosureToggles {
    /// Create an empty toggle set (nothing disclosed).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the toggle for a field.
    pub fn set(&mut self, field: DisclosureField, disclose: bool) {
        self.0.insert(field, disclose);
    }

    /// The explicit toggle value, if one was written.
    pub fn get(&self, field: DisclosureField) -> Option<bool> {
        self.0.get(&field).copied()
    }

    /// Whether the field is revealed.
    pub fn is_disclosed(&self, field: DisclosureField) -> bool {
        self.get(field).unwrap_or(false)
    }

    /// Explicit entries in field order.
    pub fn iter(&self) -> impl Iterator<Item = (DisclosureField, bool)> + '_ {
        self.0.iter().map(|(f, d)| (*f, *d))
    }

    /// Number of explicit entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no entry was written.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(DisclosureField, bool)> for DisclosureToggles {
    fn from_iter<I: IntoIterator<Item = (DisclosureField, bool)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Verification requirements and disclosure toggles stored under an action key.
///
/// Stores hand out owned copies; a record a caller holds is never mutated
/// by a later write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyRecord {
    /// Minimum holder age; `None` means no age requirement.
    pub minimum_age: Option<u32>,
    /// OFAC sanctions screening; `None` means disabled.
    pub ofac_check: Option<bool>,
    /// Countries whose documents are rejected, in write order.
    pub excluded_countries: Vec<CountryCode>,
    /// Which credential fields are revealed to the caller.
    pub disclosure: DisclosureToggles,
}

impl PolicyRecord {
    /// The policy returned for keys that were never written.
    pub fn default_policy() -> Self {
        Self {
            minimum_age: Some(DEFAULT_MINIMUM_AGE),
            ofac_check: Some(true),
            ..Default::default()
        }
    }

    /// Policy seeded under [`STANDARD_TIER_KEY`].
    pub fn standard_tier() -> Self {
        Self::default_policy()
    }

    /// Policy seeded under [`PREMIUM_TIER_KEY`].
    pub fn premium_tier() -> Self {
        Self {
            minimum_age: Some(21),
            ofac_check: Some(true),
            excluded_countries: vec![
                CountryCode::from_table(*b"RUS"),
                CountryCode::from_table(*b"IRN"),
            ],
            disclosure: DisclosureToggles::new(),
        }
    }

    /// Set the minimum age.
    pub fn with_minimum_age(mut self, age: u32) -> Self {
        self.minimum_age = Some(age);
        self
    }

    /// Set the OFAC flag.
    pub fn with_ofac(mut self, enabled: bool) -> Self {
        self.ofac_check = Some(enabled);
        self
    }

    /// Replace the exclusion list, parsing each code.
    pub fn with_excluded_countries<I, S>(mut self, codes: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.excluded_countries = codes
            .into_iter()
            .map(|c| CountryCode::parse(c.as_ref()))
            .collect::<Result<_, _>>()?;
        Ok(self)
    }

    /// Set a disclosure toggle.
    pub fn with_disclosure(mut self, field: DisclosureField, disclose: bool) -> Self {
        self.disclosure.set(field, disclose);
        self
    }

    /// Check the write-time invariants: age range, no duplicate countries,
    /// at most [`MAX_EXCLUDED_COUNTRIES`] exclusions.
    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(age) = self.minimum_age {
            if age > MAX_MINIMUM_AGE {
                return Err(CoreError::MinimumAgeOutOfRange(age));
            }
        }

        if self.excluded_countries.len() > MAX_EXCLUDED_COUNTRIES {
            return Err(CoreError::TooManyCountries {
                count: self.excluded_countries.len(),
                limit: MAX_EXCLUDED_COUNTRIES,
            });
        }

        let mut seen = HashSet::with_capacity(self.excluded_countries.len());
        for code in &self.excluded_countries {
            if !seen.insert(*code) {
                return Err(CoreError::DuplicateCountry(code.to_string()));
            }
        }

        Ok(())
    }
}
