//! Passgate Disclosure: Applies a policy's field toggles to a verified
//! credential subject and derives the key a policy is stored under.

pub mod action_key;
pub mod filter;

pub use action_key::{
    ActionKeyResolver, IdentityActionKeyResolver, TieredActionKeyResolver,
    DEFAULT_TIER_THRESHOLD,
};
pub use filter::DisclosureFilter;
