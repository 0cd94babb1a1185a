//! `keeda list`: display entries in a table.

use crate::cli::output;
use crate::cli::{open, resolve_group, Cli};
use crate::errors::Result;
use crate::vault::{model::now_timestamp, search};

/// Filters for `keeda list`; all given filters must match.
#[derive(Debug, Default)]
pub struct ListFilter<'a> {
    pub group: Option<&'a str>,
    pub search: Option<&'a str>,
    pub tag: Option<&'a str>,
    pub favorites: bool,
    pub expired: bool,
}

/// Execute the `list` command.
pub fn execute(cli: &Cli, filter: &ListFilter<'_>) -> Result<()> {
    let vault = open(cli)?;

    let groups = vault.get_groups()?;
    let mut entries = match filter.search {
        Some(query) => vault.search_entries(query)?,
        None => vault.get_entries()?,
    };

    if let Some(group) = filter.group {
        let group_id = resolve_group(&vault, group)?.id;
        entries.retain(|e| e.group_id == group_id);
    }
    if let Some(tag) = filter.tag {
        entries = search::filter_by_tag(&entries, tag);
    }
    if filter.favorites {
        entries = search::favorites(&entries);
    }
    if filter.expired {
        entries = search::expired(&entries, now_timestamp());
    }

    vault.close()?;

    let noun = if entries.len() == 1 { "entry" } else { "entries" };
    output::info(&format!("{} {noun}", entries.len()));
    output::print_entries_table(&entries, &groups);

    Ok(())
}
