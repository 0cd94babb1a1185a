//! Vault module: encrypted credential storage.
//!
//! This module provides:
//! - Entry, group and secret-string types (`model`)
//! - The id-keyed credential tree and its invariants (`tree`)
//! - The JSON payload the cipher protects (`payload`)
//! - The binary container layout and atomic file writes (`format`)
//! - KDF cost parameters (`config`)
//! - The cross-process advisory lock (`lock`)
//! - Filters over entry snapshots (`search`)
//! - The high-level `Vault` handle (`store`)

pub mod config;
pub mod format;
pub mod lock;
pub mod model;
pub mod payload;
pub mod search;
pub mod store;
pub mod tree;

// Re-export the most commonly used items.
pub use config::VaultConfig;
pub use model::{CustomField, Entry, Group, SecretString, ROOT_GROUP_ID};
pub use store::{create_vault, open_vault, Vault, VaultState};
pub use tree::Removed;
