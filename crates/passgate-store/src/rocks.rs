//! RocksDB backend for the durable policy store.

use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, Options, DB};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::durable::KvBackend;
use crate::error::StoreError;

/// Column family holding policy documents.
const CF_POLICIES: &str = "policies";

/// File next to the database recording how it was opened.
const MODE_FILE: &str = "PASSGATE_STORAGE_MODE";

/// How values are laid out on disk. TTL databases append a timestamp to
/// every value, so a database must always be reopened in the mode it was
/// created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StorageMode {
    Plain,
    Ttl,
}

impl StorageMode {
    fn for_ttl(ttl: Option<Duration>) -> Self {
        if ttl.is_some() {
            Self::Ttl
        } else {
            Self::Plain
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Ttl => "ttl",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "plain" => Some(Self::Plain),
            "ttl" => Some(Self::Ttl),
            _ => None,
        }
    }
}

/// RocksDB-backed key/value storage for policy documents.
///
/// Calls run on the blocking thread pool. Writes are serialized so that
/// the existed-before flag returned by `put` is exact.
#[derive(Clone)]
pub struct RocksDbBackend {
    db: Arc<DB>,
    write_lock: Arc<Mutex<()>>,
}

fn backend_err(e: rocksdb::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

/// Check the recorded storage mode against the requested one.
///
/// Returns whether the marker still has to be written. An existing
/// database without a marker is refused: its mode cannot be known.
fn check_mode(path: &Path, requested: StorageMode) -> Result<bool, StoreError> {
    let marker = path.join(MODE_FILE);
    match std::fs::read_to_string(&marker) {
        Ok(raw) => {
            let recorded = StorageMode::parse(&raw).ok_or_else(|| {
                StoreError::Backend(format!(
                    "unrecognised storage mode '{}' in {}",
                    raw.trim(),
                    marker.display()
                ))
            })?;
            if recorded != requested {
                return Err(StoreError::Backend(format!(
                    "database at {} was created in {} mode, config requests {} mode",
                    path.display(),
                    recorded.as_str(),
                    requested.as_str()
                )));
            }
            Ok(false)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            if path.join("CURRENT").exists() {
                return Err(StoreError::Backend(format!(
                    "database at {} has no storage mode marker",
                    path.display()
                )));
            }
            Ok(true)
        }
        Err(e) => Err(StoreError::Backend(format!(
            "cannot read {}: {}",
            marker.display(),
            e
        ))),
    }
}

impl RocksDbBackend {
    /// Open or create a database at `path`.
    ///
    /// With a `ttl`, entries older than the TTL are dropped during
    /// compaction. A database keeps the mode (TTL or plain) it was created
    /// with; reopening it in the other mode is an error. Only the TTL
    /// duration may change between runs. Failure to open is returned to the
    /// caller; there is no retry.
    pub fn open(path: &Path, ttl: Option<Duration>) -> Result<Self, StoreError> {
        std::fs::create_dir_all(path).map_err(|e| {
            StoreError::Backend(format!("cannot create {}: {}", path.display(), e))
        })?;

        let mode = StorageMode::for_ttl(ttl);
        let write_marker = check_mode(path, mode)?;

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors = vec![ColumnFamilyDescriptor::new(
            CF_POLICIES,
            Options::default(),
        )];

        let db = match ttl {
            Some(ttl) => DB::open_cf_descriptors_with_ttl(&opts, path, cf_descriptors, ttl),
            None => DB::open_cf_descriptors(&opts, path, cf_descriptors),
        }
        .map_err(backend_err)?;

        if write_marker {
            std::fs::write(path.join(MODE_FILE), mode.as_str()).map_err(|e| {
                StoreError::Backend(format!("cannot record storage mode: {}", e))
            })?;
        }

        tracing::info!(
            path = %path.display(),
            mode = mode.as_str(),
            ttl_secs = ttl.map(|t| t.as_secs()),
            "policy database opened"
        );

        Ok(Self {
            db: Arc::new(db),
            write_lock: Arc::new(Mutex::new(())),
        })
    }
}

#[async_trait]
impl KvBackend for RocksDbBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let db = Arc::clone(&self.db);
        let key = key.to_string();

        tokio::task::spawn_blocking(move || {
            let cf = db
                .cf_handle(CF_POLICIES)
                .ok_or_else(|| StoreError::Backend(format!("column family '{}' not found", CF_POLICIES)))?;
            let Some(bytes) = db.get_cf(&cf, key.as_bytes()).map_err(backend_err)? else {
                return Ok(None);
            };
            String::from_utf8(bytes)
                .map(Some)
                .map_err(|e| StoreError::Corrupt {
                    key,
                    reason: e.to_string(),
                })
        })
        .await
        .map_err(|e| StoreError::Backend(format!("storage task failed: {}", e)))?
    }

    async fn put(&self, key: &str, value: String) -> Result<bool, StoreError> {
        let db = Arc::clone(&self.db);
        let write_lock = Arc::clone(&self.write_lock);
        let key = key.to_string();

        tokio::task::spawn_blocking(move || {
            let _guard = write_lock
                .lock()
                .map_err(|_| StoreError::Backend("write lock poisoned".into()))?;
            let cf = db
                .cf_handle(CF_POLICIES)
                .ok_or_else(|| StoreError::Backend(format!("column family '{}' not found", CF_POLICIES)))?;
            let existed = db
                .get_pinned_cf(&cf, key.as_bytes())
                .map_err(backend_err)?
                .is_some();
            db.put_cf(&cf, key.as_bytes(), value.as_bytes())
                .map_err(backend_err)?;
            Ok(existed)
        })
        .await
        .map_err(|e| StoreError::Backend(format!("storage task failed: {}", e)))?
    }

    fn name(&self) -> &str {
        "rocksdb"
    }
}
