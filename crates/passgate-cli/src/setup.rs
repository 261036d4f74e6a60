//! Builds the store, resolver and orchestrator described by the config.

use anyhow::Context;
use std::sync::Arc;

use passgate_core::{PolicyRecord, PREMIUM_TIER_KEY, STANDARD_TIER_KEY};
use passgate_disclosure::{ActionKeyResolver, IdentityActionKeyResolver, TieredActionKeyResolver};
use passgate_store::{
    DurablePolicyStore, InMemoryPolicyStore, KvBackend, PolicyStore, RocksDbBackend,
};
use passgate_verifier::{ProofVerifier, VerificationOrchestrator};

use crate::config::{KeysConfig, PassgateConfig, ResolverKind, StoreBackend, StoreConfig};

/// Open the configured policy store.
///
/// With `seed_tiers`, the two tier policies are written only where no
/// record exists yet, so administrator edits survive restarts.
pub async fn open_store(config: &StoreConfig) -> anyhow::Result<Arc<dyn PolicyStore>> {
    match config.backend {
        StoreBackend::Memory => {
            let store = if config.seed_tiers {
                InMemoryPolicyStore::with_tier_defaults()
            } else {
                InMemoryPolicyStore::new()
            };
            tracing::debug!(seeded = config.seed_tiers, "using in-memory policy store");
            Ok(Arc::new(store))
        }
        StoreBackend::Rocksdb => {
            let path = config.data_dir.join("policies");
            let backend = RocksDbBackend::open(&path, config.ttl())
                .with_context(|| format!("failed to open policy store at {}", path.display()))?;
            let store = DurablePolicyStore::new(backend);
            if config.seed_tiers {
                seed_missing_tiers(&store).await?;
            }
            Ok(Arc::new(store))
        }
    }
}

async fn seed_missing_tiers<B: KvBackend>(store: &DurablePolicyStore<B>) -> anyhow::Result<()> {
    let tiers = [
        (STANDARD_TIER_KEY, PolicyRecord::standard_tier()),
        (PREMIUM_TIER_KEY, PolicyRecord::premium_tier()),
    ];
    for (key, record) in tiers {
        if store.backend().get(key).await?.is_none() {
            store.set(key, record).await?;
            tracing::info!(key, "seeded tier policy");
        }
    }
    Ok(())
}

/// Build the configured action key resolver.
pub fn build_resolver(config: &KeysConfig) -> anyhow::Result<Arc<dyn ActionKeyResolver>> {
    match config.resolver {
        ResolverKind::Tiered => {
            let resolver = TieredActionKeyResolver::new(
                config.threshold,
                &config.standard_key,
                &config.premium_key,
            )?;
            Ok(Arc::new(resolver))
        }
        ResolverKind::Identity => Ok(Arc::new(IdentityActionKeyResolver)),
    }
}

/// Wire an orchestrator around `verifier`.
pub async fn build_orchestrator(
    config: &PassgateConfig,
    verifier: Arc<dyn ProofVerifier>,
) -> anyhow::Result<VerificationOrchestrator> {
    let store = open_store(&config.store).await?;
    let resolver = build_resolver(&config.keys)?;
    tracing::debug!(
        store = store.backend_name(),
        verifier = verifier.name(),
        "orchestrator ready"
    );
    Ok(VerificationOrchestrator::new(
        verifier,
        store,
        resolver,
        config.orchestrator_settings(),
    ))
}
