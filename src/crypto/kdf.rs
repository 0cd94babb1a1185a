//! Password-based key derivation using Argon2id.
//!
//! Argon2id is a memory-hard KDF that protects against brute-force and
//! GPU-based attacks.  The cost parameters travel in the vault header so
//! the same key is reproduced on every reopen.

use argon2::{Algorithm, Argon2, Block, Params, Version};
use rand::RngCore;
use tracing::debug;

use super::keys::{VaultKey, KEY_LEN};
use crate::errors::{Result, VaultError};

/// Length of the salt generated for new vaults (256 bits).
pub const SALT_LEN: usize = 32;

/// Shortest salt accepted when reading a vault header.
pub const MIN_SALT_LEN: usize = 16;

/// Largest Argon2 memory cost this engine will attempt (4 GiB).
pub const MAX_MEMORY_COST_KB: u32 = 4 * 1024 * 1024;

/// Derive a 32-byte vault key from a password and salt using Argon2id.
///
/// The same password + salt + params always produce the same key.
/// The Argon2 working memory is reserved fallibly up front: if the
/// requested cost cannot be allocated this returns `VaultError::Resource`
/// instead of aborting or quietly lowering the cost.
pub fn derive_key(
    password: &[u8],
    salt: &[u8],
    iterations: u32,
    memory_cost_kb: u32,
    parallelism: u8,
) -> Result<VaultKey> {
    if salt.len() < MIN_SALT_LEN {
        return Err(VaultError::Validation(format!(
            "salt must be at least {MIN_SALT_LEN} bytes (got {})",
            salt.len()
        )));
    }

    if memory_cost_kb > MAX_MEMORY_COST_KB {
        return Err(VaultError::Resource(format!(
            "memory cost {memory_cost_kb} KiB exceeds the {MAX_MEMORY_COST_KB} KiB ceiling"
        )));
    }

    let params = Params::new(
        memory_cost_kb,
        iterations,
        u32::from(parallelism),
        Some(KEY_LEN),
    )
    .map_err(|e| VaultError::Validation(format!("invalid Argon2 params: {e}")))?;

    // Reserve the working memory ourselves so an oversized request fails
    // with an error rather than an allocation abort inside argon2.
    let block_count = params.block_count();
    let mut memory: Vec<Block> = Vec::new();
    memory.try_reserve_exact(block_count).map_err(|_| {
        VaultError::Resource(format!(
            "cannot allocate {memory_cost_kb} KiB for Argon2 (parallelism {parallelism})"
        ))
    })?;
    memory.resize(block_count, Block::default());

    debug!(
        iterations,
        memory_cost_kb, parallelism, "deriving vault key with Argon2id"
    );

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = VaultKey::new([0u8; KEY_LEN]);
    argon2
        .hash_password_into_with_memory(password, salt, key.as_mut_bytes(), &mut memory)
        .map_err(|e| VaultError::Validation(format!("Argon2id hashing failed: {e}")))?;

    // Scrub the working memory; it holds password-dependent state.
    memory.fill(Block::default());

    Ok(key)
}

/// Generate a cryptographically random 32-byte salt.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    salt
}
