//! `keeda add`: add a credential entry.

use crate::cli::output;
use crate::cli::{open, parse_date, prompt_entry_password, resolve_group, AddArgs, Cli};
use crate::errors::Result;
use crate::totp::TotpParams;
use crate::vault::{Entry, ROOT_GROUP_ID};

/// Execute the `add` command.
pub fn execute(cli: &Cli, args: &AddArgs) -> Result<()> {
    let vault = open(cli)?;

    let group_id = match &args.group {
        Some(group) => resolve_group(&vault, group)?.id,
        None => ROOT_GROUP_ID.to_string(),
    };

    let mut entry = Entry::new(args.title.clone(), group_id);
    entry.username = args.username.clone();
    entry.url = args.url.clone();
    entry.notes = args.notes.clone();
    entry.tags = args.tags.iter().cloned().collect();
    entry.is_favorite = args.favorite;

    if let Some(totp) = &args.totp {
        // Reject secrets we could never generate a code from.
        TotpParams::parse(totp)?;
        entry.totp_secret = Some(totp.as_str().into());
    }
    if let Some(date) = &args.expires {
        entry.expires_at = Some(parse_date(date)?);
    }

    entry.password = match &args.password {
        Some(pw) => pw.as_str().into(),
        None => prompt_entry_password()?.as_str().into(),
    };

    let id = vault.add_entry(entry)?;
    vault.save()?;
    vault.close()?;

    output::success(&format!("Added entry '{}' ({id})", args.title));
    Ok(())
}
