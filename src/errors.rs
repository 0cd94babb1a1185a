use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in KeedaVault.
#[derive(Debug, Error)]
pub enum VaultError {
    // --- Container errors ---
    #[error("Vault already exists at {0}")]
    AlreadyExists(PathBuf),

    #[error("Vault not found at {0}")]
    NotFound(PathBuf),

    #[error("Corrupt vault: {0}")]
    CorruptVault(String),

    #[error("Wrong password or tampered vault")]
    WrongPassword,

    #[error("Unsupported vault format version {0}")]
    UnsupportedVersion(u16),

    #[error("Vault at {0} is busy (open in another handle or process)")]
    VaultBusy(PathBuf),

    #[error("Vault is closed")]
    VaultClosed,

    // --- Tree errors ---
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Group '{0}' is not empty (use cascade to delete its contents)")]
    NotEmpty(String),

    #[error("Entry '{0}' not found")]
    EntryNotFound(String),

    #[error("Group '{0}' not found")]
    GroupNotFound(String),

    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Key derivation could not allocate resources: {0}")]
    Resource(String),

    #[error("One-time code error: {0}")]
    Totp(String),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    Serialization(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    Config(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),
}

/// Convenience type alias for KeedaVault results.
pub type Result<T> = std::result::Result<T, VaultError>;
