//! `keeda init`: create a new, empty vault.

use crate::cli::output;
use crate::cli::{prompt_new_password, vault_path, Cli, KdfArgs, PASSWORD_ENV};
use crate::config::Settings;
use crate::errors::{Result, VaultError};
use crate::vault::{create_vault, VaultConfig};

/// Execute the `init` command.
pub fn execute(cli: &Cli, kdf: &KdfArgs) -> Result<()> {
    let path = vault_path(cli)?;

    // 1. Refuse to overwrite anything.
    if path.exists() {
        output::tip("Use `keeda add` to add entries to the existing vault.");
        return Err(VaultError::AlreadyExists(path));
    }

    // 2. Create the parent directory if needed.
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
            output::info(&format!("Created directory: {}", parent.display()));
        }
    }

    // 3. KDF cost: settings file, then command-line overrides.
    let cwd = std::env::current_dir()?;
    let config = kdf_config(&Settings::load(&cwd)?.vault_config()?, kdf);

    // 4. Prompt for a new password (with confirmation) and create the file.
    let password = prompt_new_password(PASSWORD_ENV)?;
    let vault = create_vault(&path, &password, config)?;
    vault.close()?;

    output::success(&format!("Vault created at {}", path.display()));
    output::tip("Run `keeda add --title <TITLE>` to add an entry.");
    output::tip("Run `keeda list` to see all entries.");

    Ok(())
}

/// Apply `--iterations`/`--memory-kb`/`--parallelism` on top of `base`.
pub(crate) fn kdf_config(base: &VaultConfig, kdf: &KdfArgs) -> VaultConfig {
    VaultConfig {
        kdf_iterations: kdf.iterations.unwrap_or(base.kdf_iterations),
        memory_cost_kb: kdf.memory_kb.unwrap_or(base.memory_cost_kb),
        parallelism: kdf.parallelism.unwrap_or(base.parallelism),
    }
}
