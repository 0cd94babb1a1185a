//! KeedaVault: an embeddable encrypted credential vault.
//!
//! A vault is a single file holding a tree of groups and credential
//! entries, encrypted under a key derived from a master password with
//! Argon2id and sealed with AES-256-GCM.
//!
//! ```no_run
//! use keedavault::{create_vault, Entry, VaultConfig, ROOT_GROUP_ID};
//!
//! # fn main() -> keedavault::Result<()> {
//! let vault = create_vault("personal.vault", "correct horse", VaultConfig::default())?;
//! let mut entry = Entry::new("GitHub", ROOT_GROUP_ID);
//! entry.username = "octocat".into();
//! entry.password = "hunter2".into();
//! vault.add_entry(entry)?;
//! vault.save()?;
//! vault.close()?;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod logging;
pub mod totp;
pub mod vault;

pub use errors::{Result, VaultError};
pub use vault::{
    create_vault, open_vault, CustomField, Entry, Group, Removed, SecretString, Vault,
    VaultConfig, VaultState, ROOT_GROUP_ID,
};
