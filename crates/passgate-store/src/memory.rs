use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use passgate_core::{PolicyRecord, PREMIUM_TIER_KEY, STANDARD_TIER_KEY};

use crate::error::StoreError;
use crate::traits::PolicyStore;

/// Process-local policy store.
///
/// One map behind a reader/writer lock: `get` takes the shared side,
/// `set` the exclusive side. The lock only ever guards a map access.
pub struct InMemoryPolicyStore {
    policies: RwLock<HashMap<String, PolicyRecord>>,
}

impl InMemoryPolicyStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            policies: RwLock::new(HashMap::new()),
        }
    }

    /// Create a store holding the standard and premium tier policies.
    pub fn with_tier_defaults() -> Self {
        let mut policies = HashMap::new();
        policies.insert(STANDARD_TIER_KEY.to_string(), PolicyRecord::standard_tier());
        policies.insert(PREMIUM_TIER_KEY.to_string(), PolicyRecord::premium_tier());
        tracing::debug!(count = policies.len(), "seeded tier policies");
        Self {
            policies: RwLock::new(policies),
        }
    }

    /// Number of stored policies.
    pub async fn len(&self) -> usize {
        self.policies.read().await.len()
    }

    /// Whether no policy has been written.
    pub async fn is_empty(&self) -> bool {
        self.policies.read().await.is_empty()
    }

    /// Whether a policy is stored under `key`.
    pub async fn contains(&self, key: &str) -> bool {
        self.policies.read().await.contains_key(key)
    }
}

impl Default for InMemoryPolicyStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PolicyStore for InMemoryPolicyStore {
    async fn get(&self, key: &str) -> Result<PolicyRecord, StoreError> {
        let policies = self.policies.read().await;
        match policies.get(key) {
            Some(record) => Ok(record.clone()),
            None => {
                tracing::debug!(key, "no stored policy, using default");
                Ok(PolicyRecord::default_policy())
            }
        }
    }

    async fn set(&self, key: &str, record: PolicyRecord) -> Result<bool, StoreError> {
        record.validate()?;
        let created = self
            .policies
            .write()
            .await
            .insert(key.to_string(), record)
            .is_none();
        tracing::info!(key, created, backend = "memory", "policy stored");
        Ok(created)
    }

    fn backend_name(&self) -> &str {
        "memory"
    }
}
