use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{Result, VaultError};
use crate::vault::VaultConfig;

/// Project-level configuration, loaded from `.keeda.toml`.
///
/// Every field has a sensible default so keeda works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Vault file, relative to the project directory unless absolute.
    #[serde(default = "default_vault_path")]
    pub vault_path: String,

    /// Argon2 pass count used when creating or re-keying a vault.
    #[serde(default = "default_kdf_iterations")]
    pub kdf_iterations: u32,

    /// Argon2 memory cost in KiB (default: 64 MB).
    #[serde(default = "default_memory_cost_kb")]
    pub memory_cost_kb: u32,

    /// Argon2 lanes.
    #[serde(default = "default_parallelism")]
    pub parallelism: u8,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_vault_path() -> String {
    "keeda.vault".to_string()
}

fn default_kdf_iterations() -> u32 {
    VaultConfig::default().kdf_iterations
}

fn default_memory_cost_kb() -> u32 {
    VaultConfig::default().memory_cost_kb
}

fn default_parallelism() -> u8 {
    VaultConfig::default().parallelism
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            vault_path: default_vault_path(),
            kdf_iterations: default_kdf_iterations(),
            memory_cost_kb: default_memory_cost_kb(),
            parallelism: default_parallelism(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the project root.
    pub const FILE_NAME: &'static str = ".keeda.toml";

    /// Load settings from `<project_dir>/.keeda.toml`.
    ///
    /// If the file does not exist, defaults are returned.
    /// If the file exists but cannot be parsed, a `Config` error is returned.
    pub fn load(project_dir: &Path) -> Result<Self> {
        let config_path = project_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            VaultError::Config(format!("failed to parse {}: {e}", config_path.display()))
        })?;

        Ok(settings)
    }

    /// Resolve the vault file against `project_dir`.
    pub fn vault_path(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.vault_path)
    }

    /// KDF parameters for new vaults, validated.
    pub fn vault_config(&self) -> Result<VaultConfig> {
        let config = VaultConfig {
            kdf_iterations: self.kdf_iterations,
            memory_cost_kb: self.memory_cost_kb,
            parallelism: self.parallelism,
        };
        config
            .validate()
            .map_err(|e| VaultError::Config(format!("{}: {e}", Self::FILE_NAME)))?;
        Ok(config)
    }
}

// ── Tests ────────────────────────────────────────────────────────────
