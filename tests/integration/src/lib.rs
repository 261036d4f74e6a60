//! Test doubles and fixtures shared by the cross-crate scenarios.

use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use passgate_store::{KvBackend, StoreError};
use passgate_verifier::VerifyRequest;

/// Key/value backend held in a map, with call counters and a failure switch.
#[derive(Default)]
pub struct FlakyBackend {
    values: Mutex<HashMap<String, String>>,
    failing: AtomicBool,
    pub gets: AtomicUsize,
    pub puts: AtomicUsize,
}

impl FlakyBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with an I/O error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Store a raw value, bypassing validation.
    pub fn insert_raw(&self, key: &str, value: &str) {
        if let Ok(mut values) = self.values.lock() {
            values.insert(key.to_string(), value.to_string());
        }
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.values.lock().ok()?.get(key).cloned()
    }

    pub fn get_calls(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn put_calls(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("i/o error: connection reset by peer".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl KvBackend for FlakyBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let values = self
            .values
            .lock()
            .map_err(|_| StoreError::Backend("poisoned".into()))?;
        Ok(values.get(key).cloned())
    }

    async fn put(&self, key: &str, value: String) -> Result<bool, StoreError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let mut values = self
            .values
            .lock()
            .map_err(|_| StoreError::Backend("poisoned".into()))?;
        Ok(values.insert(key.to_string(), value).is_some())
    }

    fn name(&self) -> &str {
        "flaky"
    }
}

/// A well-formed verification request.
pub fn verify_request(user_id: &str, context_data: &str) -> VerifyRequest {
    VerifyRequest {
        attestation_id: Some("passport".into()),
        proof: Some(json!({
            "a": ["0x01", "0x02"],
            "b": [["0x03", "0x04"], ["0x05", "0x06"]],
            "c": ["0x07", "0x08"]
        })),
        public_signals: Some(json!(["0", "1", "2"])),
        user_context_data: Some(json!(context_data)),
        user_id: Some(user_id.to_string()),
    }
}

/// A fresh directory under the system temp dir.
pub fn temp_dir(prefix: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("{}-{}", prefix, rand::random::<u64>()));
    if let Err(e) = std::fs::create_dir_all(&dir) {
        tracing::warn!(dir = %dir.display(), error = %e, "cannot create temp dir");
    }
    dir
}
