use passgate_core::{CoreError, PREMIUM_TIER_KEY, STANDARD_TIER_KEY};

/// Context data longer than this many characters routes to the premium tier.
pub const DEFAULT_TIER_THRESHOLD: usize = 10;

/// Derives the key a policy is stored under.
///
/// Implementations are pure: the same inputs always produce the same key.
pub trait ActionKeyResolver: Send + Sync {
    /// Resolve the action key for `identity` and caller `context_data`.
    fn resolve(&self, identity: &str, context_data: &str) -> String;
}

/// Two-tier classifier on the length of the caller's context data.
///
/// Context data of at most `threshold` characters maps to the standard
/// key, anything longer to the premium key.
#[derive(Debug, Clone)]
pub struct TieredActionKeyResolver {
    threshold: usize,
    standard_key: String,
    premium_key: String,
}

impl TieredActionKeyResolver {
    /// Create a resolver with custom keys. The two keys must differ.
    pub fn new(
        threshold: usize,
        standard_key: impl Into<String>,
        premium_key: impl Into<String>,
    ) -> Result<Self, CoreError> {
        let standard_key = standard_key.into();
        let premium_key = premium_key.into();
        if standard_key.is_empty() || premium_key.is_empty() {
            return Err(CoreError::ValidationError(
                "tier keys must not be empty".into(),
            ));
        }
        if standard_key == premium_key {
            return Err(CoreError::ValidationError(format!(
                "standard and premium tier keys must differ, both are '{}'",
                standard_key
            )));
        }
        Ok(Self {
            threshold,
            standard_key,
            premium_key,
        })
    }
}

impl Default for TieredActionKeyResolver {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_TIER_THRESHOLD,
            standard_key: STANDARD_TIER_KEY.to_string(),
            premium_key: PREMIUM_TIER_KEY.to_string(),
        }
    }
}

impl ActionKeyResolver for TieredActionKeyResolver {
    fn resolve(&self, _identity: &str, context_data: &str) -> String {
        if context_data.chars().count() > self.threshold {
            self.premium_key.clone()
        } else {
            self.standard_key.clone()
        }
    }
}

/// Stores one policy per identity: the key is the identity itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityActionKeyResolver;

impl ActionKeyResolver for IdentityActionKeyResolver {
    fn resolve(&self, identity: &str, _context_data: &str) -> String {
        identity.to_string()
    }
}
