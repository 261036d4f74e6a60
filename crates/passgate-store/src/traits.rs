use async_trait::async_trait;
use passgate_core::PolicyRecord;

use crate::error::StoreError;

/// Storage interface for policy records.
///
/// Implementations must be safe to call concurrently for the same or
/// different keys, and must return owned records so that a caller's copy
/// is unaffected by later writes.
#[async_trait]
pub trait PolicyStore: Send + Sync {
    /// Read the policy stored under `key`.
    ///
    /// A missing key yields [`PolicyRecord::default_policy`] without
    /// writing anything; only backend failures are errors.
    async fn get(&self, key: &str) -> Result<PolicyRecord, StoreError>;

    /// Replace the policy stored under `key`.
    ///
    /// Returns `true` if the key was absent before the write.
    async fn set(&self, key: &str, record: PolicyRecord) -> Result<bool, StoreError>;

    /// Short backend name for logs (e.g. "memory", "rocksdb").
    fn backend_name(&self) -> &str;
}
