//! Passgate Core: Policy records, credential subjects, country codes and
//! the verification stage machine shared by every Passgate crate.

pub mod country;
pub mod error;
pub mod policy;
pub mod subject;
pub mod verification_state;

pub use country::CountryCode;
pub use error::CoreError;
pub use policy::{
    DisclosureField, DisclosureToggles, PolicyRecord, DEFAULT_MINIMUM_AGE,
    MAX_EXCLUDED_COUNTRIES, MAX_MINIMUM_AGE, PREMIUM_TIER_KEY, STANDARD_TIER_KEY,
};
pub use subject::{CredentialSubject, PolicySummary, RedactedSubject, NOT_DISCLOSED};
pub use verification_state::{VerificationEvent, VerificationStage, VerificationStageMachine};
