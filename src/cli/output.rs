//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::vault::{Entry, Group};

/// Characters of an id shown in tables.
const SHORT_ID_LEN: usize = 8;

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Format a Unix timestamp for display.
pub fn format_timestamp(ts: Option<i64>) -> String {
    ts.and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn short_id(id: &str) -> &str {
    id.get(..SHORT_ID_LEN).unwrap_or(id)
}

/// Print a table of entries (ID, Title, Username, Group, Tags, Fav).
///
/// Passwords are never shown here.
pub fn print_entries_table(entries: &[Entry], groups: &[Group]) {
    if entries.is_empty() {
        info("No matching entries.");
        tip("Run `keeda add --title <TITLE>` to add an entry.");
        return;
    }

    let names: HashMap<&str, &str> = groups
        .iter()
        .map(|g| (g.id.as_str(), g.name.as_str()))
        .collect();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["ID", "Title", "Username", "Group", "Tags", "Fav"]);

    for e in entries {
        table.add_row(vec![
            short_id(&e.id).to_string(),
            e.title.clone(),
            e.username.clone(),
            names.get(e.group_id.as_str()).copied().unwrap_or("?").to_string(),
            e.tags.iter().cloned().collect::<Vec<_>>().join(", "),
            if e.is_favorite { "\u{2605}" } else { "" }.to_string(),
        ]);
    }

    println!("{table}");
}

/// Print a table of groups with their entry counts.
pub fn print_groups_table(groups: &[Group], entries: &[Entry]) {
    let names: HashMap<&str, &str> = groups
        .iter()
        .map(|g| (g.id.as_str(), g.name.as_str()))
        .collect();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["ID", "Name", "Parent", "Entries"]);

    for g in groups {
        let count = entries.iter().filter(|e| e.group_id == g.id).count();
        let parent = g
            .parent_id
            .as_deref()
            .and_then(|p| names.get(p).copied())
            .unwrap_or("-");
        table.add_row(vec![
            g.id.clone(),
            g.name.clone(),
            parent.to_string(),
            count.to_string(),
        ]);
    }

    println!("{table}");
}

/// Print every field of one entry.  Secrets are masked unless `reveal`.
pub fn print_entry(entry: &Entry, group_name: &str, reveal: bool) {
    let mask = |value: &str| {
        if reveal || value.is_empty() {
            value.to_string()
        } else {
            "********".to_string()
        }
    };

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.add_row(vec!["ID".to_string(), entry.id.clone()]);
    table.add_row(vec!["Title".to_string(), entry.title.clone()]);
    table.add_row(vec!["Group".to_string(), group_name.to_string()]);
    table.add_row(vec!["Username".to_string(), entry.username.clone()]);
    table.add_row(vec!["Password".to_string(), mask(entry.password.expose())]);
    table.add_row(vec!["URL".to_string(), entry.url.clone()]);
    table.add_row(vec!["Notes".to_string(), entry.notes.clone()]);
    table.add_row(vec![
        "Tags".to_string(),
        entry.tags.iter().cloned().collect::<Vec<_>>().join(", "),
    ]);
    table.add_row(vec![
        "TOTP".to_string(),
        match &entry.totp_secret {
            Some(secret) => mask(secret.expose()),
            None => "-".to_string(),
        },
    ]);
    for field in &entry.custom_fields {
        let value = if field.protected {
            mask(field.value.expose())
        } else {
            field.value.expose().to_string()
        };
        table.add_row(vec![field.name.clone(), value]);
    }
    table.add_row(vec!["Favorite".to_string(), entry.is_favorite.to_string()]);
    table.add_row(vec!["Created".to_string(), format_timestamp(entry.created_at)]);
    table.add_row(vec!["Modified".to_string(), format_timestamp(entry.modified_at)]);
    table.add_row(vec!["Accessed".to_string(), format_timestamp(entry.accessed_at)]);
    table.add_row(vec!["Expires".to_string(), format_timestamp(entry.expires_at)]);

    println!("{table}");
}
