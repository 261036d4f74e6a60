use async_trait::async_trait;

use passgate_core::PolicyRecord;

use crate::document::PolicyDocument;
use crate::error::StoreError;
use crate::traits::PolicyStore;

/// String key/value service backing a [`DurablePolicyStore`].
#[async_trait]
pub trait KvBackend: Send + Sync {
    /// Read the value under `key`; `Ok(None)` when the key does not exist.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write `value` under `key`. Returns whether the key existed before.
    async fn put(&self, key: &str, value: String) -> Result<bool, StoreError>;

    /// Short backend name for logs.
    fn name(&self) -> &str;
}

/// Policy store persisted through a [`KvBackend`], one JSON document per key.
pub struct DurablePolicyStore<B> {
    backend: B,
}

impl<B: KvBackend> DurablePolicyStore<B> {
    /// Wrap an already connected backend.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Access the underlying backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }
}

#[async_trait]
impl<B: KvBackend> PolicyStore for DurablePolicyStore<B> {
    async fn get(&self, key: &str) -> Result<PolicyRecord, StoreError> {
        let Some(json) = self.backend.get(key).await? else {
            tracing::debug!(key, backend = self.backend.name(), "no stored policy, using default");
            return Ok(PolicyRecord::default_policy());
        };

        PolicyDocument::decode(&json).map_err(|e| {
            tracing::error!(key, error = %e, "stored policy failed to decode");
            StoreError::Corrupt {
                key: key.to_string(),
                reason: e.to_string(),
            }
        })
    }

    async fn set(&self, key: &str, record: PolicyRecord) -> Result<bool, StoreError> {
        record.validate()?;
        let json = PolicyDocument::from(&record).encode()?;
        let existed = self.backend.put(key, json).await?;
        tracing::info!(
            key,
            created = !existed,
            backend = self.backend.name(),
            "policy stored"
        );
        Ok(!existed)
    }

    fn backend_name(&self) -> &str {
        self.backend.name()
    }
}
