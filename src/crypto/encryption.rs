//! AES-256-GCM authenticated encryption.
//!
//! Unlike a self-describing blob, the container keeps the nonce in its
//! header, so both directions take the nonce explicitly.  The associated
//! data is the encoded header: flipping any header byte makes `decrypt`
//! fail just like a wrong key would.
//!
//! Layout of the returned byte buffer:
//!   [ ciphertext | 16-byte auth tag ]

use aes_gcm::aead::{Aead, KeyInit, OsRng, Payload};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};
use zeroize::Zeroizing;

use crate::errors::{Result, VaultError};

/// Size of the AES-256-GCM nonce in bytes.
pub const NONCE_LEN: usize = 12;

/// Size of the AES-256-GCM authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// Draw a fresh random 12-byte nonce.
pub fn generate_nonce() -> [u8; NONCE_LEN] {
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
    let mut out = [0u8; NONCE_LEN];
    out.copy_from_slice(&nonce);
    out
}

/// Encrypt `plaintext` with a 32-byte `key` under `nonce`, binding `aad`.
///
/// Returns the ciphertext with the tag appended (ciphertext || tag).
pub fn encrypt(key: &[u8], nonce: &[u8], plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
    if nonce.len() != NONCE_LEN {
        return Err(VaultError::EncryptionFailed(format!(
            "nonce must be {NONCE_LEN} bytes (got {})",
            nonce.len()
        )));
    }

    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| VaultError::EncryptionFailed(format!("invalid key length: {e}")))?;

    cipher
        .encrypt(
            Nonce::from_slice(nonce),
            Payload {
                msg: plaintext,
                aad,
            },
        )
        .map_err(|e| VaultError::EncryptionFailed(format!("encryption error: {e}")))
}

/// Decrypt data that was produced by `encrypt`.
///
/// Any authentication failure (wrong key, flipped ciphertext bit, altered
/// associated data) is reported as `VaultError::WrongPassword`.  The
/// plaintext is returned in a buffer that is wiped on drop.
pub fn decrypt(
    key: &[u8],
    nonce: &[u8],
    ciphertext_with_tag: &[u8],
    aad: &[u8],
) -> Result<Zeroizing<Vec<u8>>> {
    if nonce.len() != NONCE_LEN || ciphertext_with_tag.len() < TAG_LEN {
        return Err(VaultError::WrongPassword);
    }

    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| VaultError::WrongPassword)?;

    let plaintext = cipher
        .decrypt(
            Nonce::from_slice(nonce),
            Payload {
                msg: ciphertext_with_tag,
                aad,
            },
        )
        .map_err(|_| VaultError::WrongPassword)?;

    Ok(Zeroizing::new(plaintext))
}
