//! `keeda empty-trash`: permanently delete the recycle bin's contents.

use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::{open, Cli};
use crate::errors::{Result, VaultError};

/// Execute the `empty-trash` command.
pub fn execute(cli: &Cli, force: bool) -> Result<()> {
    let vault = open(cli)?;

    if vault.recycle_bin()?.is_none() {
        vault.close()?;
        output::info("The recycle bin is empty.");
        return Ok(());
    }

    if !force {
        let confirmed = Confirm::new()
            .with_prompt("Permanently delete everything in the recycle bin?")
            .default(false)
            .interact()
            .map_err(|e| VaultError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            vault.close()?;
            output::info("Cancelled.");
            return Ok(());
        }
    }

    let removed = vault.empty_recycle_bin()?;
    vault.save()?;
    vault.close()?;

    output::success(&format!(
        "Removed {} group(s) and {} entr{} from the recycle bin",
        removed.groups,
        removed.entries,
        if removed.entries == 1 { "y" } else { "ies" }
    ));
    Ok(())
}
