//! Binary container format and atomic file I/O.
//!
//! A `.vault` file has this layout (all integers little-endian):
//!
//! ```text
//! [KDVT: 4][version: u16][kdf_id: u8][iterations: u32][memory_cost_kb: u32]
//! [parallelism: u8][salt_len: u8][salt][nonce_len: u8][nonce]
//! [ciphertext_len: u32][ciphertext || 16-byte GCM tag]
//! ```
//!
//! Everything before `ciphertext_len` is the *header*.  Its encoded bytes
//! are passed to the cipher as associated data, so a modified header
//! fails authentication exactly like a wrong password.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::config::VaultConfig;
use crate::crypto::kdf::MIN_SALT_LEN;
use crate::crypto::{NONCE_LEN, TAG_LEN};
use crate::errors::{Result, VaultError};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic bytes at the start of every vault file.
pub const MAGIC: &[u8; 4] = b"KDVT";

/// Current binary format version.
pub const CURRENT_VERSION: u16 = 1;

/// KDF identifier for Argon2id v0x13.
pub const KDF_ARGON2ID: u8 = 1;

/// Fixed-size prefix: 4 (magic) + 2 (version).
const PREFIX_LEN: usize = 6;

// ---------------------------------------------------------------------------
// ContainerHeader
// ---------------------------------------------------------------------------

/// Unencrypted metadata at the front of a vault file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerHeader {
    pub version: u16,
    pub kdf_id: u8,
    pub iterations: u32,
    pub memory_cost_kb: u32,
    pub parallelism: u8,
    pub salt: Vec<u8>,
    pub nonce: Vec<u8>,
}

impl ContainerHeader {
    /// Build a current-version header for the given KDF parameters.
    pub fn new(config: &VaultConfig, salt: &[u8], nonce: &[u8]) -> Self {
        Self {
            version: CURRENT_VERSION,
            kdf_id: KDF_ARGON2ID,
            iterations: config.kdf_iterations,
            memory_cost_kb: config.memory_cost_kb,
            parallelism: config.parallelism,
            salt: salt.to_vec(),
            nonce: nonce.to_vec(),
        }
    }

    /// The KDF parameters recorded in this header.
    pub fn config(&self) -> VaultConfig {
        VaultConfig {
            kdf_iterations: self.iterations,
            memory_cost_kb: self.memory_cost_kb,
            parallelism: self.parallelism,
        }
    }

    /// A copy of this header carrying a different nonce.
    pub fn with_nonce(&self, nonce: &[u8]) -> Self {
        Self {
            nonce: nonce.to_vec(),
            ..self.clone()
        }
    }

    /// Encode the header fields.  These bytes double as the AEAD
    /// associated data.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let salt_len = u8::try_from(self.salt.len()).map_err(|_| {
            VaultError::Validation(format!("salt length {} exceeds 255", self.salt.len()))
        })?;
        let nonce_len = u8::try_from(self.nonce.len()).map_err(|_| {
            VaultError::Validation(format!("nonce length {} exceeds 255", self.nonce.len()))
        })?;

        let mut buf = Vec::with_capacity(PREFIX_LEN + 12 + self.salt.len() + self.nonce.len());
        buf.extend_from_slice(MAGIC); // 4 bytes
        buf.extend_from_slice(&self.version.to_le_bytes()); // 2 bytes
        buf.push(self.kdf_id); // 1 byte
        buf.extend_from_slice(&self.iterations.to_le_bytes()); // 4 bytes
        buf.extend_from_slice(&self.memory_cost_kb.to_le_bytes()); // 4 bytes
        buf.push(self.parallelism); // 1 byte
        buf.push(salt_len);
        buf.extend_from_slice(&self.salt);
        buf.push(nonce_len);
        buf.extend_from_slice(&self.nonce);
        Ok(buf)
    }
}

/// A decoded vault file: header plus the still-encrypted payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    pub header: ContainerHeader,
    /// Ciphertext with the GCM tag appended.
    pub ciphertext: Vec<u8>,
}

impl Container {
    /// Encode the full file image.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let ct_len = u32::try_from(self.ciphertext.len()).map_err(|_| {
            VaultError::Validation(format!(
                "ciphertext length {} exceeds u32::MAX",
                self.ciphertext.len()
            ))
        })?;

        let mut buf = self.header.encode()?;
        buf.reserve(4 + self.ciphertext.len());
        buf.extend_from_slice(&ct_len.to_le_bytes()); // 4 bytes LE
        buf.extend_from_slice(&self.ciphertext);
        Ok(buf)
    }

    /// Decode a full file image.
    ///
    /// Unknown magic, truncated or overrunning fields, trailing bytes and
    /// nonsensical parameters are `CorruptVault`; a known magic with a
    /// version other than `CURRENT_VERSION` is `UnsupportedVersion`.
    pub fn decode(data: &[u8]) -> Result<Self> {
        let mut r = Reader::new(data);

        if r.take(MAGIC.len())? != MAGIC {
            return Err(VaultError::CorruptVault("missing KDVT magic bytes".into()));
        }

        let version = r.u16()?;
        if version != CURRENT_VERSION {
            return Err(VaultError::UnsupportedVersion(version));
        }

        let kdf_id = r.u8()?;
        if kdf_id != KDF_ARGON2ID {
            return Err(VaultError::CorruptVault(format!("unknown KDF id {kdf_id}")));
        }

        let iterations = r.u32()?;
        let memory_cost_kb = r.u32()?;
        let parallelism = r.u8()?;

        let salt_len = usize::from(r.u8()?);
        let salt = r.take(salt_len)?.to_vec();
        let nonce_len = usize::from(r.u8()?);
        let nonce = r.take(nonce_len)?.to_vec();

        let ct_len_u32 = r.u32()?;
        let ct_len = usize::try_from(ct_len_u32).map_err(|_| {
            VaultError::CorruptVault(format!(
                "ciphertext length {ct_len_u32} exceeds platform address space"
            ))
        })?;
        let ciphertext = r.take(ct_len)?.to_vec();

        if !r.is_empty() {
            return Err(VaultError::CorruptVault(format!(
                "{} trailing bytes after ciphertext",
                r.remaining()
            )));
        }

        let header = ContainerHeader {
            version,
            kdf_id,
            iterations,
            memory_cost_kb,
            parallelism,
            salt,
            nonce,
        };

        header
            .config()
            .validate()
            .map_err(|e| VaultError::CorruptVault(format!("header KDF parameters: {e}")))?;
        if header.salt.len() < MIN_SALT_LEN {
            return Err(VaultError::CorruptVault(format!(
                "salt is {} bytes, need at least {MIN_SALT_LEN}",
                header.salt.len()
            )));
        }
        if header.nonce.len() != NONCE_LEN {
            return Err(VaultError::CorruptVault(format!(
                "nonce is {} bytes, expected {NONCE_LEN}",
                header.nonce.len()
            )));
        }
        if ciphertext.len() < TAG_LEN {
            return Err(VaultError::CorruptVault(
                "ciphertext shorter than the authentication tag".into(),
            ));
        }

        Ok(Self { header, ciphertext })
    }
}

/// Bounds-checked little-endian cursor over the file image.
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| {
                VaultError::CorruptVault(format!(
                    "field of {n} bytes at offset {} overruns {}-byte file",
                    self.pos,
                    self.data.len()
                ))
            })?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn is_empty(&self) -> bool {
        self.remaining() == 0
    }
}

// ---------------------------------------------------------------------------
// File I/O
// ---------------------------------------------------------------------------

/// Read a vault file's bytes, mapping a missing file to `NotFound`.
pub fn read_file(path: &Path) -> Result<Vec<u8>> {
    match fs::read(path) {
        Ok(data) => Ok(data),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(VaultError::NotFound(path.to_path_buf()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Temp path used while writing `path`: `.<name>.tmp` in the same directory.
pub fn temp_path(path: &Path) -> PathBuf {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    parent.join(format!(
        ".{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ))
}

/// Write `bytes` to `path` **atomically**.
///
/// 1. Write to a temp file in the same directory and fsync it.
/// 2. Rename the temp file over the target path.
///
/// The rename ensures readers never see a half-written file.  If any
/// step fails the temp file is removed and `path` is left as it was.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp_path = temp_path(path);

    if let Err(e) = write_synced(&tmp_path, bytes) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }

    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }

    sync_parent_dir(path);
    debug!(path = %path.display(), bytes = bytes.len(), "vault file written");
    Ok(())
}

fn write_synced(tmp_path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);

    // Owner-only permissions on Unix.
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(tmp_path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

/// Persist the rename itself.  Best effort: by this point the new file is
/// already in place.
fn sync_parent_dir(path: &Path) {
    #[cfg(unix)]
    {
        let parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        if let Err(e) = fs::File::open(parent).and_then(|dir| dir.sync_all()) {
            debug!(error = %e, "could not fsync vault directory");
        }
    }
    #[cfg(not(unix))]
    let _ = path;
}
