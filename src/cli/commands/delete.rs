//! `keeda delete`: remove an entry from the vault, or move it to the
//! recycle bin with `--trash`.

use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::{open, resolve_entry, Cli};
use crate::errors::{Result, VaultError};

/// Execute the `delete` command.
pub fn execute(cli: &Cli, id: &str, force: bool, trash: bool) -> Result<()> {
    let vault = open(cli)?;
    let entry = resolve_entry(&vault, id)?;

    if trash {
        vault.trash_entry(&entry.id)?;
        vault.save()?;
        vault.close()?;
        output::success(&format!("Moved entry '{}' to the recycle bin", entry.title));
        return Ok(());
    }

    // Unless --force is set, ask for confirmation before deleting.
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete entry '{}'?", entry.title))
            .default(false)
            .interact()
            .map_err(|e| VaultError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            vault.close()?;
            output::info("Cancelled.");
            return Ok(());
        }
    }

    vault.delete_entry(&entry.id)?;
    vault.save()?;
    vault.close()?;

    output::success(&format!("Deleted entry '{}'", entry.title));
    Ok(())
}
