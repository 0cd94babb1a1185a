//! Cross-process advisory lock for an open vault.
//!
//! The lock lives on a sidecar file (`<vault>.lock`) rather than on the
//! vault file itself: every save renames a new inode over the vault path,
//! which would silently drop a lock held on the old one.  The sidecar is
//! never renamed, so an exclusive lock on it covers the vault for as
//! long as a handle is open.
//!
//! `fs2` maps this to `flock` on Unix and `LockFileEx` on Windows.  Both
//! lock per open file, so two handles in the same process also exclude
//! each other.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::debug;

use crate::errors::{Result, VaultError};

/// Path of the sidecar lock file for a vault at `vault_path`.
pub fn lock_path(vault_path: &Path) -> PathBuf {
    let mut name = vault_path.as_os_str().to_owned();
    name.push(".lock");
    PathBuf::from(name)
}

/// An exclusive advisory lock, released when dropped.
#[derive(Debug)]
pub struct VaultLock {
    file: File,
    path: PathBuf,
}

impl VaultLock {
    /// Try to take the lock for the vault at `vault_path` without waiting.
    ///
    /// Fails with `VaultBusy` if another handle or process holds it.
    pub fn acquire(vault_path: &Path) -> Result<Self> {
        let path = lock_path(vault_path);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        if !try_acquire(&file)? {
            return Err(VaultError::VaultBusy(vault_path.to_path_buf()));
        }

        debug!(lock = %path.display(), "advisory lock acquired");
        Ok(Self { file, path })
    }
}

impl Drop for VaultLock {
    fn drop(&mut self) {
        // Closing the file releases the lock anyway; this makes it immediate.
        let _ = FileExt::unlock(&self.file);
        debug!(lock = %self.path.display(), "advisory lock released");
    }
}

fn try_acquire(file: &File) -> std::io::Result<bool> {
    match FileExt::try_lock_exclusive(file) {
        Ok(()) => Ok(true),
        Err(e) if is_contended(&e) => Ok(false),
        Err(e) => Err(e),
    }
}

fn is_contended(err: &std::io::Error) -> bool {
    err.kind() == std::io::ErrorKind::WouldBlock
        || err.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}
