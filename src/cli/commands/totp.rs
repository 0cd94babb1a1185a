//! `keeda totp`: print the current one-time code of an entry.

use crate::cli::output;
use crate::cli::{open, resolve_entry, Cli};
use crate::errors::{Result, VaultError};
use crate::totp::TotpParams;
use crate::vault::model::now_timestamp;

/// Execute the `totp` command.
pub fn execute(cli: &Cli, id: &str) -> Result<()> {
    let vault = open(cli)?;
    let entry = resolve_entry(&vault, id)?;
    vault.close()?;

    let secret = entry.totp_secret.as_ref().ok_or_else(|| {
        VaultError::Validation(format!("entry '{}' has no TOTP secret", entry.title))
    })?;

    let params = TotpParams::parse(secret.expose())?;
    let now = u64::try_from(now_timestamp())
        .map_err(|_| VaultError::Totp("system clock is before the Unix epoch".into()))?;

    println!("{}", params.code_at(now));
    output::tip(&format!("valid for {}s", params.remaining_seconds(now)));
    Ok(())
}
