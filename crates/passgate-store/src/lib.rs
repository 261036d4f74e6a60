//! Passgate Store: Per-key policy storage.
//!
//! [`PolicyStore`] is the only shared mutable resource in a Passgate
//! process. Two variants implement it: [`InMemoryPolicyStore`] for
//! single-process deployments and [`DurablePolicyStore`] over any
//! [`KvBackend`], with [`RocksDbBackend`] as the on-disk backend.

pub mod document;
pub mod durable;
pub mod error;
pub mod memory;
pub mod rocks;
pub mod traits;

pub use document::PolicyDocument;
pub use durable::{DurablePolicyStore, KvBackend};
pub use error::StoreError;
pub use memory::InMemoryPolicyStore;
pub use rocks::RocksDbBackend;
pub use traits::PolicyStore;
