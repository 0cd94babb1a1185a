//! `keeda edit`: change fields of an existing entry.

use crate::cli::output;
use crate::cli::{open, parse_date, resolve_entry, resolve_group, Cli, EditArgs};
use crate::errors::Result;
use crate::totp::TotpParams;

/// Execute the `edit` command.
pub fn execute(cli: &Cli, args: &EditArgs) -> Result<()> {
    let vault = open(cli)?;
    let mut entry = resolve_entry(&vault, &args.id)?;
    let mut changed = 0usize;

    // Each provided flag overwrites one field.
    if let Some(title) = &args.title {
        entry.title = title.clone();
        changed += 1;
    }
    if let Some(username) = &args.username {
        entry.username = username.clone();
        changed += 1;
    }
    if let Some(password) = &args.password {
        entry.password = password.as_str().into();
        changed += 1;
    }
    if let Some(url) = &args.url {
        entry.url = url.clone();
        changed += 1;
    }
    if let Some(notes) = &args.notes {
        entry.notes = notes.clone();
        changed += 1;
    }
    if let Some(group) = &args.group {
        entry.group_id = resolve_group(&vault, group)?.id;
        changed += 1;
    }
    if !args.tags.is_empty() || args.clear_tags {
        entry.tags = args.tags.iter().cloned().collect();
        changed += 1;
    }
    if let Some(totp) = &args.totp {
        TotpParams::parse(totp)?;
        entry.totp_secret = Some(totp.as_str().into());
        changed += 1;
    }
    if args.clear_totp {
        entry.totp_secret = None;
        changed += 1;
    }
    if let Some(date) = &args.expires {
        entry.expires_at = Some(parse_date(date)?);
        changed += 1;
    }
    if args.clear_expires {
        entry.expires_at = None;
        changed += 1;
    }
    if let Some(favorite) = args.favorite {
        entry.is_favorite = favorite;
        changed += 1;
    }

    if changed == 0 {
        vault.close()?;
        output::info("No changes requested.");
        return Ok(());
    }

    let id = entry.id.clone();
    vault.update_entry(entry)?;
    vault.save()?;
    vault.close()?;

    output::success(&format!("Updated {changed} field(s) of entry {id}"));
    Ok(())
}
