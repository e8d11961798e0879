//! Vault module — the ephemeral message store.
//!
//! This module provides:
//! - `Record`, `RecordState` and `CreateOptions` (`record`)
//! - The TTL policy (`ttl`)
//! - Reference generation (`reference`)
//! - The redemption state machine (`redemption`)
//! - The concurrent `VaultStore` (`store`)

pub mod record;
pub mod redemption;
pub mod reference;
pub mod store;
pub mod ttl;

// Re-export the most commonly used items.
pub use record::{CreateOptions, Record, RecordState};
pub use redemption::Delivery;
pub use store::{PeekStatus, Receipt, VaultStore};
pub use ttl::Liveness;
