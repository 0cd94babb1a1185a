//! CLI module: Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveTime};
use clap::Parser;
use zeroize::Zeroizing;

use crate::config::Settings;
use crate::errors::{Result, VaultError};
use crate::vault::{open_vault, Entry, Group, Vault};

/// Minimum length for newly chosen master passwords.
const MIN_PASSWORD_LEN: usize = 8;

/// Environment variable holding the current master password.
pub const PASSWORD_ENV: &str = "KEEDA_PASSWORD";

/// Environment variable holding the new master password for `passwd`.
pub const NEW_PASSWORD_ENV: &str = "KEEDA_NEW_PASSWORD";

/// Shortest id prefix accepted in place of a full id.
const MIN_ID_PREFIX: usize = 4;

/// keeda: encrypted credential vault.
#[derive(Parser)]
#[command(name = "keeda", about = "Encrypted credential vault", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Vault file (default: `vault_path` from .keeda.toml, else keeda.vault)
    #[arg(long, env = "KEEDA_VAULT", global = true)]
    pub vault: Option<PathBuf>,

    /// Log debug output to stderr (overridden by KEEDA_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Create a new, empty vault
    Init {
        #[command(flatten)]
        kdf: KdfArgs,
    },

    /// Add a credential entry
    Add(AddArgs),

    /// List entries
    List {
        /// Only entries in this group (name or id)
        #[arg(short, long)]
        group: Option<String>,
        /// Case-insensitive search over title, username, url, notes and tags
        #[arg(short, long)]
        search: Option<String>,
        /// Only entries carrying this tag
        #[arg(short, long)]
        tag: Option<String>,
        /// Only favorites
        #[arg(long)]
        favorites: bool,
        /// Only entries past their expiry date
        #[arg(long)]
        expired: bool,
    },

    /// Show one entry
    Show {
        /// Entry id (or a unique prefix of it)
        id: String,
        /// Print the password and protected fields
        #[arg(long)]
        reveal: bool,
    },

    /// Change fields of an entry
    Edit(EditArgs),

    /// Delete an entry
    Delete {
        /// Entry id (or a unique prefix of it)
        id: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
        /// Move to the recycle bin instead of deleting
        #[arg(long)]
        trash: bool,
    },

    /// Permanently delete everything in the recycle bin
    EmptyTrash {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Manage groups
    Group {
        #[command(subcommand)]
        action: GroupAction,
    },

    /// Print the current one-time code of an entry
    Totp {
        /// Entry id (or a unique prefix of it)
        id: String,
    },

    /// Change the master password (and optionally the KDF cost)
    Passwd {
        #[command(flatten)]
        kdf: KdfArgs,
    },
}

/// Argon2 cost overrides.
#[derive(clap::Args, Default)]
pub struct KdfArgs {
    /// Argon2 passes
    #[arg(long)]
    pub iterations: Option<u32>,
    /// Argon2 memory in KiB
    #[arg(long)]
    pub memory_kb: Option<u32>,
    /// Argon2 lanes
    #[arg(long)]
    pub parallelism: Option<u8>,
}

impl KdfArgs {
    pub fn is_empty(&self) -> bool {
        self.iterations.is_none() && self.memory_kb.is_none() && self.parallelism.is_none()
    }
}

#[derive(clap::Args)]
pub struct AddArgs {
    /// Entry title
    #[arg(long)]
    pub title: String,
    #[arg(short, long, default_value = "")]
    pub username: String,
    /// Password (omit for interactive prompt)
    #[arg(short, long)]
    pub password: Option<String>,
    #[arg(long, default_value = "")]
    pub url: String,
    #[arg(long, default_value = "")]
    pub notes: String,
    /// Group name or id (default: root)
    #[arg(short, long)]
    pub group: Option<String>,
    /// Tag (repeatable)
    #[arg(short, long = "tag")]
    pub tags: Vec<String>,
    /// Base32 TOTP secret or otpauth:// URI
    #[arg(long)]
    pub totp: Option<String>,
    /// Expiry date (YYYY-MM-DD)
    #[arg(long)]
    pub expires: Option<String>,
    #[arg(long)]
    pub favorite: bool,
}

#[derive(clap::Args)]
pub struct EditArgs {
    /// Entry id (or a unique prefix of it)
    pub id: String,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(short, long)]
    pub username: Option<String>,
    #[arg(short, long)]
    pub password: Option<String>,
    #[arg(long)]
    pub url: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
    /// Move to this group (name or id)
    #[arg(short, long)]
    pub group: Option<String>,
    /// Replace all tags (repeatable)
    #[arg(short, long = "tag")]
    pub tags: Vec<String>,
    /// Remove all tags
    #[arg(long, conflicts_with = "tags")]
    pub clear_tags: bool,
    /// Base32 TOTP secret or otpauth:// URI
    #[arg(long)]
    pub totp: Option<String>,
    /// Remove the TOTP secret
    #[arg(long, conflicts_with = "totp")]
    pub clear_totp: bool,
    /// Expiry date (YYYY-MM-DD)
    #[arg(long)]
    pub expires: Option<String>,
    /// Remove the expiry date
    #[arg(long, conflicts_with = "expires")]
    pub clear_expires: bool,
    /// Mark or unmark as favorite
    #[arg(long)]
    pub favorite: Option<bool>,
}

/// Group subcommands.
#[derive(clap::Subcommand)]
pub enum GroupAction {
    /// Create a group
    Add {
        name: String,
        /// Parent group name or id (default: root)
        #[arg(short, long)]
        parent: Option<String>,
        #[arg(long, default_value = "")]
        notes: String,
    },

    /// List all groups
    List,

    /// Rename a group, optionally moving it under a new parent
    Rename {
        /// Group name or id
        group: String,
        /// New name
        name: String,
        /// New parent group name or id
        #[arg(short, long)]
        parent: Option<String>,
    },

    /// Delete a group
    Delete {
        /// Group name or id
        group: String,
        /// Also delete every entry and sub-group inside it
        #[arg(long)]
        cascade: bool,
        /// Move to the recycle bin instead of deleting
        #[arg(long, conflicts_with = "cascade")]
        trash: bool,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Get the master password from `KEEDA_PASSWORD` or an interactive prompt.
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn prompt_password() -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        if !pw.is_empty() {
            return Ok(Zeroizing::new(pw));
        }
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Enter vault password")
        .interact()
        .map_err(|e| VaultError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a new password with confirmation.
///
/// `env_var` is consulted first for scripted use.  Enforces a minimum
/// password length either way.
pub fn prompt_new_password(env_var: &str) -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var(env_var) {
        if !pw.is_empty() {
            if pw.chars().count() < MIN_PASSWORD_LEN {
                return Err(VaultError::Validation(format!(
                    "password must be at least {MIN_PASSWORD_LEN} characters"
                )));
            }
            return Ok(Zeroizing::new(pw));
        }
    }

    loop {
        let password = Zeroizing::new(
            dialoguer::Password::new()
                .with_prompt("Choose vault password")
                .with_confirmation(
                    "Confirm vault password",
                    "Passwords do not match, try again",
                )
                .interact()
                .map_err(|e| VaultError::CommandFailed(format!("password prompt: {e}")))?,
        );

        if password.chars().count() < MIN_PASSWORD_LEN {
            output::warning(&format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters. Try again."
            ));
            continue;
        }

        return Ok(password);
    }
}

/// Prompt for an entry password (may be empty, no confirmation).
pub fn prompt_entry_password() -> Result<Zeroizing<String>> {
    let pw = dialoguer::Password::new()
        .with_prompt("Entry password")
        .allow_empty_password(true)
        .interact()
        .map_err(|e| VaultError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// The vault file: `--vault` if given, else from `.keeda.toml`.
pub fn vault_path(cli: &Cli) -> Result<PathBuf> {
    if let Some(path) = &cli.vault {
        return Ok(path.clone());
    }
    let cwd = std::env::current_dir()?;
    Ok(Settings::load(&cwd)?.vault_path(&cwd))
}

/// Resolve the vault path, ask for the password and open it.
pub fn open(cli: &Cli) -> Result<Vault> {
    let path = vault_path(cli)?;
    if !path.exists() {
        output::tip("Run `keeda init` to create a vault first.");
        return Err(VaultError::NotFound(path));
    }
    let password = prompt_password()?;
    open_vault(&path, &password)
}

/// Find an entry by full id or unique id prefix.
pub fn resolve_entry(vault: &Vault, id: &str) -> Result<Entry> {
    if let Ok(entry) = vault.get_entry(id) {
        return Ok(entry);
    }
    if id.len() < MIN_ID_PREFIX {
        return Err(VaultError::EntryNotFound(id.to_string()));
    }

    let mut matches: Vec<Entry> = vault
        .get_entries()?
        .into_iter()
        .filter(|e| e.id.starts_with(id))
        .collect();
    match matches.len() {
        0 => Err(VaultError::EntryNotFound(id.to_string())),
        1 => Ok(matches.remove(0)),
        n => Err(VaultError::Validation(format!(
            "id prefix '{id}' matches {n} entries"
        ))),
    }
}

/// Find a group by id, then by case-insensitive name.
pub fn resolve_group(vault: &Vault, name_or_id: &str) -> Result<Group> {
    let groups = vault.get_groups()?;
    if let Some(group) = groups.iter().find(|g| g.id == name_or_id) {
        return Ok(group.clone());
    }

    let mut matches: Vec<Group> = groups
        .into_iter()
        .filter(|g| g.name.eq_ignore_ascii_case(name_or_id))
        .collect();
    match matches.len() {
        0 => Err(VaultError::GroupNotFound(name_or_id.to_string())),
        1 => Ok(matches.remove(0)),
        n => Err(VaultError::Validation(format!(
            "{n} groups are named '{name_or_id}', use the group id"
        ))),
    }
}

/// Parse a `YYYY-MM-DD` date into a Unix timestamp at UTC midnight.
pub fn parse_date(date: &str) -> Result<i64> {
    let day = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|e| VaultError::Validation(format!("invalid date '{date}': {e}")))?;
    Ok(day.and_time(NaiveTime::MIN).and_utc().timestamp())
}
