//! KDF cost parameters chosen at vault creation.

use serde::{Deserialize, Serialize};

use crate::errors::{Result, VaultError};

/// Argon2id cost parameters stored in the vault header.
///
/// Immutable for the lifetime of a vault file: reopening always reuses
/// the stored values.  Changing them means a full rekey through
/// `Vault::change_password`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Number of Argon2 passes (default: 3).
    pub kdf_iterations: u32,
    /// Memory cost in KiB (default: 65 536 = 64 MB).
    pub memory_cost_kb: u32,
    /// Parallelism lanes (default: 4).
    pub parallelism: u8,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            kdf_iterations: 3,
            memory_cost_kb: 65_536,
            parallelism: 4,
        }
    }
}

impl VaultConfig {
    /// Minimal-cost parameters for tests and demos.
    ///
    /// **Unsafe for real secrets**: a 1 MB single-pass Argon2 offers
    /// almost no resistance to offline guessing.
    pub fn insecure_for_tests() -> Self {
        Self {
            kdf_iterations: 1,
            memory_cost_kb: 1024,
            parallelism: 1,
        }
    }

    /// Check that every cost parameter is positive and that the memory
    /// cost covers Argon2's floor of 8 KiB per lane.
    pub fn validate(&self) -> Result<()> {
        if self.kdf_iterations == 0 {
            return Err(VaultError::Validation(
                "kdf_iterations must be at least 1".into(),
            ));
        }
        if self.parallelism == 0 {
            return Err(VaultError::Validation(
                "parallelism must be at least 1".into(),
            ));
        }
        let floor = 8 * u32::from(self.parallelism);
        if self.memory_cost_kb < floor {
            return Err(VaultError::Validation(format!(
                "memory_cost_kb must be at least {floor} for parallelism {} (got {})",
                self.parallelism, self.memory_cost_kb
            )));
        }
        Ok(())
    }
}
