//! `keeda show`: print one entry.
//!
//! Secrets stay masked unless `--reveal` is passed.  Revealing counts
//! as an access: it updates `accessed_at` and saves.

use crate::cli::output;
use crate::cli::{open, resolve_entry, Cli};
use crate::errors::Result;

/// Execute the `show` command.
pub fn execute(cli: &Cli, id: &str, reveal: bool) -> Result<()> {
    let vault = open(cli)?;
    let mut entry = resolve_entry(&vault, id)?;

    if reveal {
        entry = vault.touch_entry(&entry.id)?;
        vault.save()?;
    }

    let group_name = vault
        .get_groups()?
        .into_iter()
        .find(|g| g.id == entry.group_id)
        .map(|g| g.name)
        .unwrap_or_default();
    vault.close()?;

    output::print_entry(&entry, &group_name, reveal);
    Ok(())
}
