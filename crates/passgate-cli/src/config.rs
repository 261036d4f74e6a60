//! CLI configuration loading and management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use passgate_core::{PREMIUM_TIER_KEY, STANDARD_TIER_KEY};
use passgate_disclosure::DEFAULT_TIER_THRESHOLD;
use passgate_verifier::{AttestationKind, OrchestratorSettings, DEFAULT_USER_ID};

/// Full configuration for the `passgate` binary.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PassgateConfig {
    /// Policy store settings.
    #[serde(default)]
    pub store: StoreConfig,

    /// Action key derivation.
    #[serde(default)]
    pub keys: KeysConfig,

    /// Proof verifier settings.
    #[serde(default)]
    pub verifier: VerifierConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    Rocksdb,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Which store variant to use.
    #[serde(default = "default_backend")]
    pub backend: StoreBackend,
    /// Path to the data directory (rocksdb only).
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Drop stored policies older than this many seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl_secs: Option<u64>,
    /// Write the standard and premium tier policies when they are missing.
    #[serde(default = "default_true")]
    pub seed_tiers: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolverKind {
    Tiered,
    Identity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeysConfig {
    #[serde(default = "default_resolver")]
    pub resolver: ResolverKind,
    /// Context data longer than this routes to the premium key.
    #[serde(default = "default_threshold")]
    pub threshold: usize,
    #[serde(default = "default_standard_key")]
    pub standard_key: String,
    #[serde(default = "default_premium_key")]
    pub premium_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifierConfig {
    #[serde(default = "default_attestations")]
    pub allowed_attestations: Vec<AttestationKind>,
    /// Deadline for the verifier call and each store call.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_user_id")]
    pub default_user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_backend() -> StoreBackend {
    StoreBackend::Memory
}
fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}
fn default_true() -> bool {
    true
}
fn default_resolver() -> ResolverKind {
    ResolverKind::Tiered
}
fn default_threshold() -> usize {
    DEFAULT_TIER_THRESHOLD
}
fn default_standard_key() -> String {
    STANDARD_TIER_KEY.into()
}
fn default_premium_key() -> String {
    PREMIUM_TIER_KEY.into()
}
fn default_attestations() -> Vec<AttestationKind> {
    AttestationKind::ALL.to_vec()
}
fn default_timeout_ms() -> u64 {
    10_000
}
fn default_user_id() -> String {
    DEFAULT_USER_ID.into()
}
fn default_log_level() -> String {
    "info".into()
}
fn default_log_format() -> String {
    "text".into()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            data_dir: default_data_dir(),
            ttl_secs: None,
            seed_tiers: true,
        }
    }
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            resolver: default_resolver(),
            threshold: default_threshold(),
            standard_key: default_standard_key(),
            premium_key: default_premium_key(),
        }
    }
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            allowed_attestations: default_attestations(),
            timeout_ms: default_timeout_ms(),
            default_user_id: default_user_id(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl StoreConfig {
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_secs.map(Duration::from_secs)
    }
}

impl PassgateConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: PassgateConfig = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save the current config to a TOML file.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Settings handed to the verification orchestrator.
    pub fn orchestrator_settings(&self) -> OrchestratorSettings {
        OrchestratorSettings {
            allowed_attestations: self.verifier.allowed_attestations.clone(),
            default_user_id: self.verifier.default_user_id.clone(),
            timeout: Duration::from_millis(self.verifier.timeout_ms),
        }
    }
}
