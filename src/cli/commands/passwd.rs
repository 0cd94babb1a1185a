//! `keeda passwd`: change the master password.
//!
//! Re-keys the vault under a new password and a fresh salt, optionally
//! with new Argon2 cost parameters, and rewrites the file atomically.

use crate::cli::commands::init::kdf_config;
use crate::cli::output;
use crate::cli::{open, prompt_new_password, Cli, KdfArgs, NEW_PASSWORD_ENV};
use crate::errors::Result;

/// Execute the `passwd` command.
pub fn execute(cli: &Cli, kdf: &KdfArgs) -> Result<()> {
    // 1. Open the vault with the current password.
    output::info("Enter your current vault password.");
    let vault = open(cli)?;

    // 2. Keep the stored cost unless overridden.
    let config = if kdf.is_empty() {
        None
    } else {
        Some(kdf_config(&vault.config()?, kdf))
    };

    // 3. Prompt for the new password and re-key.
    output::info("Choose your new vault password.");
    let new_password = prompt_new_password(NEW_PASSWORD_ENV)?;
    vault.change_password(&new_password, config)?;
    vault.close()?;

    output::success("Master password changed");
    Ok(())
}
