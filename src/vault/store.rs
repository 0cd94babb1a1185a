//! High-level vault handle.
//!
//! `Vault` ties the container codec, the crypto layer and the credential
//! tree together so callers work with simple method calls like
//! `vault.add_entry(entry)` and `vault.save()`.
//!
//! A handle is `Send + Sync`.  Its state sits behind a reader/writer
//! lock: mutations, `save`, `change_password` and `close` hold the write
//! guard for their whole duration, snapshots hold the read guard.  While
//! open, the handle also owns an advisory lock on the vault file so a
//! second handle or process gets `VaultBusy` instead of racing writes.
//!
//! The path is resolved once, when the handle is made, so a vault reached
//! through a symlink is locked and rewritten at its real location.

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::crypto::{decrypt, derive_key, encrypt, generate_nonce, generate_salt, VaultKey};
use crate::errors::{Result, VaultError};

use super::config::VaultConfig;
use super::format::{self, Container, ContainerHeader};
use super::lock::VaultLock;
use super::model::{now_timestamp, Entry, Group};
use super::payload;
use super::search;
use super::tree::{CredentialTree, Removed};

/// Lifecycle state of a `Vault` handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VaultState {
    /// Closed: key wiped, every call fails with `VaultClosed`.
    Closed,
    /// Open with nothing unsaved.
    Open,
    /// Open with in-memory changes not yet written.
    Dirty,
}

/// Everything that exists only while the vault is open.
///
/// Dropping this wipes the key (`VaultKey` zeroizes on drop) and every
/// secret field in the tree (`SecretString` zeroizes on drop), and
/// releases the advisory lock.
struct OpenVault {
    header: ContainerHeader,
    key: VaultKey,
    tree: CredentialTree,
    dirty: bool,
    _lock: VaultLock,
}

/// An encrypted credential vault backed by one file.
pub struct Vault {
    path: PathBuf,
    inner: RwLock<Option<OpenVault>>,
}

/// Create a new vault file.  See [`Vault::create`].
pub fn create_vault(path: impl AsRef<Path>, password: &str, config: VaultConfig) -> Result<Vault> {
    Vault::create(path.as_ref(), password, config)
}

/// Open an existing vault file.  See [`Vault::open`].
pub fn open_vault(path: impl AsRef<Path>, password: &str) -> Result<Vault> {
    Vault::open(path.as_ref(), password)
}

impl Vault {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Create a brand-new vault file at `path`.
    ///
    /// Generates a random salt and nonce, derives the key from the
    /// password with the given cost parameters, and writes a vault that
    /// holds only the root group.  Fails with `AlreadyExists` if
    /// anything is already at `path`.
    pub fn create(path: &Path, password: &str, config: VaultConfig) -> Result<Self> {
        config.validate()?;
        if occupied(path) {
            return Err(VaultError::AlreadyExists(path.to_path_buf()));
        }
        let path = resolve_new(path)?;
        let path = path.as_path();

        let lock = VaultLock::acquire(path)?;
        // Re-check under the lock: another process may have won the race.
        if occupied(path) {
            return Err(VaultError::AlreadyExists(path.to_path_buf()));
        }

        let salt = generate_salt();
        let header = ContainerHeader::new(&config, &salt, &generate_nonce());
        let key = derive_key(
            password.as_bytes(),
            &salt,
            config.kdf_iterations,
            config.memory_cost_kb,
            config.parallelism,
        )?;

        let tree = CredentialTree::new();
        let bytes = seal(&header, &key, &tree)?;
        format::write_atomic(path, &bytes)?;

        info!(path = %path.display(), "vault created");

        Ok(Self {
            path: path.to_path_buf(),
            inner: RwLock::new(Some(OpenVault {
                header,
                key,
                tree,
                dirty: false,
                _lock: lock,
            })),
        })
    }

    /// Open an existing vault file.
    ///
    /// Reads and decodes the container, derives the key with the stored
    /// parameters, authenticates and decrypts the payload, and rebuilds
    /// the tree.  A wrong password and a tampered file both surface as
    /// `WrongPassword`.
    pub fn open(path: &Path, password: &str) -> Result<Self> {
        if !path.exists() {
            return Err(VaultError::NotFound(path.to_path_buf()));
        }
        let path = fs::canonicalize(path)?;
        let path = path.as_path();

        let lock = VaultLock::acquire(path)?;
        let data = format::read_file(path)?;
        let Container { header, ciphertext } = Container::decode(&data)?;

        let key = derive_key(
            password.as_bytes(),
            &header.salt,
            header.iterations,
            header.memory_cost_kb,
            header.parallelism,
        )
        .map_err(|e| match e {
            VaultError::Validation(reason) => VaultError::CorruptVault(reason),
            other => other,
        })?;

        let aad = header.encode()?;
        let plaintext = decrypt(key.as_bytes(), &header.nonce, &ciphertext, &aad)?;
        let tree = payload::deserialize(&plaintext)?;

        info!(
            path = %path.display(),
            groups = tree.group_count(),
            entries = tree.entry_count(),
            "vault opened"
        );

        Ok(Self {
            path: path.to_path_buf(),
            inner: RwLock::new(Some(OpenVault {
                header,
                key,
                tree,
                dirty: false,
                _lock: lock,
            })),
        })
    }

    // ------------------------------------------------------------------
    // Entry operations
    // ------------------------------------------------------------------

    /// Add an entry and return its id.
    ///
    /// The group must exist and a supplied id must be unused; an empty id
    /// gets a fresh UUID.  Missing timestamps are set to now.
    pub fn add_entry(&self, entry: Entry) -> Result<String> {
        let id = self.mutate(|tree, now| tree.insert_entry(entry, now))?;
        debug!(entry = %id, "entry added");
        Ok(id)
    }

    /// Replace the entry with the same id.
    pub fn update_entry(&self, entry: Entry) -> Result<()> {
        let id = entry.id.clone();
        self.mutate(|tree, now| tree.update_entry(entry, now))?;
        debug!(entry = %id, "entry updated");
        Ok(())
    }

    /// Remove an entry.
    pub fn delete_entry(&self, id: &str) -> Result<()> {
        self.mutate(|tree, _| tree.remove_entry(id))?;
        debug!(entry = %id, "entry deleted");
        Ok(())
    }

    /// Explicitly access an entry: bumps `accessed_at` and returns it.
    ///
    /// This is the only call that changes `accessed_at`; listing does not.
    pub fn touch_entry(&self, id: &str) -> Result<Entry> {
        self.mutate(|tree, now| tree.touch_entry(id, now))
    }

    /// Snapshot of one entry.
    pub fn get_entry(&self, id: &str) -> Result<Entry> {
        self.read(|tree| {
            tree.entry(id)
                .cloned()
                .ok_or_else(|| VaultError::EntryNotFound(id.to_string()))
        })?
    }

    /// Snapshot of every entry, ordered by title then id.
    pub fn get_entries(&self) -> Result<Vec<Entry>> {
        self.read(|tree| {
            let mut entries: Vec<Entry> = tree.entries().cloned().collect();
            entries.sort_by(|a, b| {
                a.title
                    .to_lowercase()
                    .cmp(&b.title.to_lowercase())
                    .then_with(|| a.id.cmp(&b.id))
            });
            entries
        })
    }

    /// Entries matching `query` in title, username, url, notes or tags.
    pub fn search_entries(&self, query: &str) -> Result<Vec<Entry>> {
        Ok(search::search_entries(&self.get_entries()?, query))
    }

    /// Entries tagged with `tag`.
    pub fn filter_by_tag(&self, tag: &str) -> Result<Vec<Entry>> {
        Ok(search::filter_by_tag(&self.get_entries()?, tag))
    }

    /// Entries marked as favorites.
    pub fn favorites(&self) -> Result<Vec<Entry>> {
        Ok(search::favorites(&self.get_entries()?))
    }

    /// Entries whose `expires_at` lies before `now`.
    pub fn expired_entries(&self, now: i64) -> Result<Vec<Entry>> {
        Ok(search::expired(&self.get_entries()?, now))
    }

    // ------------------------------------------------------------------
    // Group operations
    // ------------------------------------------------------------------

    /// Add a group and return its id.  No parent means "under the root".
    pub fn add_group(&self, group: Group) -> Result<String> {
        let id = self.mutate(|tree, _| tree.insert_group(group))?;
        debug!(group = %id, "group added");
        Ok(id)
    }

    /// Rename or move a group.
    pub fn update_group(&self, group: Group) -> Result<()> {
        let id = group.id.clone();
        self.mutate(|tree, _| tree.update_group(group))?;
        debug!(group = %id, "group updated");
        Ok(())
    }

    /// Delete a group.
    ///
    /// Cascade is opt-in: without it a group that still holds entries or
    /// sub-groups fails with `NotEmpty`.
    pub fn delete_group(&self, id: &str, cascade: bool) -> Result<Removed> {
        let removed = self.mutate(|tree, _| tree.remove_group(id, cascade))?;
        debug!(
            group = %id,
            groups = removed.groups,
            entries = removed.entries,
            "group deleted"
        );
        Ok(removed)
    }

    // ------------------------------------------------------------------
    // Recycle bin
    // ------------------------------------------------------------------

    /// Move an entry into the recycle bin instead of deleting it.
    pub fn trash_entry(&self, id: &str) -> Result<()> {
        self.mutate(|tree, now| tree.trash_entry(id, now))?;
        debug!(entry = %id, "entry moved to recycle bin");
        Ok(())
    }

    /// Move a group, with everything in it, into the recycle bin.
    pub fn trash_group(&self, id: &str) -> Result<()> {
        self.mutate(|tree, _| tree.trash_group(id))?;
        debug!(group = %id, "group moved to recycle bin");
        Ok(())
    }

    /// Permanently delete whatever the recycle bin holds.
    pub fn empty_recycle_bin(&self) -> Result<Removed> {
        let removed = self.mutate(|tree, _| tree.empty_recycle_bin())?;
        debug!(
            groups = removed.groups,
            entries = removed.entries,
            "recycle bin emptied"
        );
        Ok(removed)
    }

    /// Snapshot of the recycle bin group, if one exists.
    pub fn recycle_bin(&self) -> Result<Option<Group>> {
        self.read(|tree| tree.recycle_bin().cloned())
    }

    /// Snapshot of every group, root first, then by name.
    pub fn get_groups(&self) -> Result<Vec<Group>> {
        self.read(|tree| {
            let mut groups: Vec<Group> = tree.groups().cloned().collect();
            groups.sort_by(|a, b| {
                b.is_root()
                    .cmp(&a.is_root())
                    .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
                    .then_with(|| a.id.cmp(&b.id))
            });
            groups
        })
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Serialize the tree and write it to disk atomically.
    ///
    /// Every save draws a fresh nonce and reuses the existing key and KDF
    /// parameters.  On failure the previous file is untouched and the
    /// vault stays dirty.
    pub fn save(&self) -> Result<()> {
        self.with_open_mut(|open| {
            let header = open.header.with_nonce(&generate_nonce());
            let bytes = seal(&header, &open.key, &open.tree)?;
            format::write_atomic(&self.path, &bytes)?;

            open.header = header;
            open.dirty = false;
            info!(path = %self.path.display(), entries = open.tree.entry_count(), "vault saved");
            Ok(())
        })
    }

    /// Re-key the vault under a new password and optionally new KDF cost
    /// parameters, rewriting the file atomically.
    ///
    /// A new salt is generated.  Pending changes are written as part of
    /// the rewrite.  The in-memory key is swapped only once the new file
    /// is safely in place.
    pub fn change_password(&self, new_password: &str, config: Option<VaultConfig>) -> Result<()> {
        self.with_open_mut(|open| {
            let config = config.unwrap_or_else(|| open.header.config());
            config.validate()?;

            let salt = generate_salt();
            let header = ContainerHeader::new(&config, &salt, &generate_nonce());
            let key = derive_key(
                new_password.as_bytes(),
                &salt,
                config.kdf_iterations,
                config.memory_cost_kb,
                config.parallelism,
            )?;

            let bytes = seal(&header, &key, &open.tree)?;
            format::write_atomic(&self.path, &bytes)?;

            open.header = header;
            open.key = key;
            open.dirty = false;
            info!(path = %self.path.display(), "vault re-keyed");
            Ok(())
        })
    }

    /// Close the vault: wipe the key and all secrets, release the lock,
    /// and discard the tree.  Unsaved changes are lost.
    pub fn close(&self) -> Result<()> {
        let open = self.inner.write().take().ok_or(VaultError::VaultClosed)?;
        if open.dirty {
            warn!(path = %self.path.display(), "closing vault with unsaved changes");
        }
        drop(open);
        info!(path = %self.path.display(), "vault closed");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Returns the path to the vault file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current lifecycle state.
    pub fn state(&self) -> VaultState {
        match self.inner.read().as_ref() {
            None => VaultState::Closed,
            Some(open) if open.dirty => VaultState::Dirty,
            Some(_) => VaultState::Open,
        }
    }

    /// Returns `true` if there are unsaved changes.
    pub fn is_dirty(&self) -> bool {
        self.state() == VaultState::Dirty
    }

    /// The KDF parameters stored in the header.
    pub fn config(&self) -> Result<VaultConfig> {
        let guard = self.inner.read();
        let open = guard.as_ref().ok_or(VaultError::VaultClosed)?;
        Ok(open.header.config())
    }

    // ------------------------------------------------------------------
    // Lock helpers
    // ------------------------------------------------------------------

    fn read<R>(&self, f: impl FnOnce(&CredentialTree) -> R) -> Result<R> {
        let guard = self.inner.read();
        let open = guard.as_ref().ok_or(VaultError::VaultClosed)?;
        Ok(f(&open.tree))
    }

    fn with_open_mut<R>(&self, f: impl FnOnce(&mut OpenVault) -> Result<R>) -> Result<R> {
        let mut guard = self.inner.write();
        let open = guard.as_mut().ok_or(VaultError::VaultClosed)?;
        f(open)
    }

    /// Apply a tree mutation; the vault turns dirty only if it succeeds.
    fn mutate<R>(&self, f: impl FnOnce(&mut CredentialTree, i64) -> Result<R>) -> Result<R> {
        self.with_open_mut(|open| {
            let out = f(&mut open.tree, now_timestamp())?;
            open.dirty = true;
            Ok(out)
        })
    }
}

/// Whether anything, including a dangling symlink, sits at `path`.
fn occupied(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Absolute path for a file about to be created: the real parent
/// directory joined with the file name.
fn resolve_new(path: &Path) -> Result<PathBuf> {
    let name = path
        .file_name()
        .ok_or_else(|| VaultError::Validation(format!("'{}' is not a file path", path.display())))?;
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    Ok(fs::canonicalize(parent)?.join(name))
}

/// Serialize, encrypt and encode the tree under `header` and `key`.
fn seal(header: &ContainerHeader, key: &VaultKey, tree: &CredentialTree) -> Result<Vec<u8>> {
    let plaintext = payload::serialize(tree)?;
    let aad = header.encode()?;
    let ciphertext = encrypt(key.as_bytes(), &header.nonce, &plaintext, &aad)?;
    Container {
        header: header.clone(),
        ciphertext,
    }
    .encode()
}
