//! `keeda group`: create, list, rename and delete groups.

use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::{open, resolve_group, Cli, GroupAction};
use crate::errors::{Result, VaultError};
use crate::vault::Group;

/// Execute a `group` subcommand.
pub fn execute(cli: &Cli, action: &GroupAction) -> Result<()> {
    let vault = open(cli)?;

    match action {
        GroupAction::Add {
            name,
            parent,
            notes,
        } => {
            let parent_id = match parent {
                Some(p) => Some(resolve_group(&vault, p)?.id),
                None => None,
            };
            let mut group = Group::new(name.clone(), parent_id);
            group.notes = notes.clone();

            let id = vault.add_group(group)?;
            vault.save()?;
            output::success(&format!("Added group '{name}' ({id})"));
        }

        GroupAction::List => {
            let groups = vault.get_groups()?;
            let entries = vault.get_entries()?;
            output::print_groups_table(&groups, &entries);
        }

        GroupAction::Rename {
            group,
            name,
            parent,
        } => {
            let mut target = resolve_group(&vault, group)?;
            let old = std::mem::replace(&mut target.name, name.clone());
            let new_parent = match parent {
                Some(p) => Some(resolve_group(&vault, p)?),
                None => None,
            };
            if let Some(p) = &new_parent {
                target.parent_id = Some(p.id.clone());
            }
            vault.update_group(target)?;
            vault.save()?;
            match new_parent {
                Some(p) => output::success(&format!(
                    "Renamed group '{old}' to '{name}' under '{}'",
                    p.name
                )),
                None => output::success(&format!("Renamed group '{old}' to '{name}'")),
            }
        }

        GroupAction::Delete {
            group,
            cascade,
            trash,
            force,
        } => {
            let target = resolve_group(&vault, group)?;

            if *trash {
                vault.trash_group(&target.id)?;
                vault.save()?;
                vault.close()?;
                output::success(&format!(
                    "Moved group '{}' to the recycle bin",
                    target.name
                ));
                return Ok(());
            }

            if *cascade && !force {
                let confirmed = Confirm::new()
                    .with_prompt(format!(
                        "Delete group '{}' and everything inside it?",
                        target.name
                    ))
                    .default(false)
                    .interact()
                    .map_err(|e| VaultError::CommandFailed(format!("confirm prompt: {e}")))?;

                if !confirmed {
                    vault.close()?;
                    output::info("Cancelled.");
                    return Ok(());
                }
            }

            let removed = vault.delete_group(&target.id, *cascade)?;
            vault.save()?;
            output::success(&format!(
                "Deleted {} group(s) and {} entr{}",
                removed.groups,
                removed.entries,
                if removed.entries == 1 { "y" } else { "ies" }
            ));
        }
    }

    vault.close()
}
