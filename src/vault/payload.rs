//! Credential tree <-> plaintext payload.
//!
//! The payload is the JSON document the cipher protects:
//!
//! ```text
//! { "schema": 1, "groups": [Group, ...], "entries": [Entry, ...] }
//! ```
//!
//! Groups and entries are written in id order, so serializing the same
//! tree twice yields identical bytes.  Every decode failure, whether bad
//! JSON, a missing field or a broken tree, is reported as
//! `VaultError::CorruptVault`.

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::model::{Entry, Group};
use super::tree::CredentialTree;
use crate::errors::{Result, VaultError};

/// Current payload schema.
pub const PAYLOAD_SCHEMA: u32 = 1;

#[derive(Serialize)]
struct PayloadOut<'a> {
    schema: u32,
    groups: Vec<&'a Group>,
    entries: Vec<&'a Entry>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct PayloadIn {
    schema: u32,
    groups: Vec<Group>,
    entries: Vec<Entry>,
}

/// Serialize the tree into a zeroize-on-drop byte buffer.
pub fn serialize(tree: &CredentialTree) -> Result<Zeroizing<Vec<u8>>> {
    let payload = PayloadOut {
        schema: PAYLOAD_SCHEMA,
        groups: tree.groups().collect(),
        entries: tree.entries().collect(),
    };
    // Sized so the writer never reallocates: a grown Vec frees its old
    // buffer without wiping it.
    let mut bytes = Zeroizing::new(Vec::with_capacity(size_bound(tree)));
    serde_json::to_writer(&mut *bytes, &payload)
        .map_err(|e| VaultError::Serialization(format!("payload: {e}")))?;
    Ok(bytes)
}

/// Upper bound on the serialized size of `tree`.
///
/// JSON escaping turns one byte into at most six (`\u001f`), and each
/// record carries a fixed amount of keys, punctuation and numbers.
fn size_bound(tree: &CredentialTree) -> usize {
    const ESCAPE: usize = 6;
    const GROUP_OVERHEAD: usize = 192;
    const ENTRY_OVERHEAD: usize = 512;
    const ITEM_OVERHEAD: usize = 64;

    let groups: usize = tree
        .groups()
        .map(|g| {
            let text = g.id.len()
                + g.parent_id.as_ref().map_or(0, String::len)
                + g.name.len()
                + g.notes.len();
            GROUP_OVERHEAD + ESCAPE * text
        })
        .sum();

    let entries: usize = tree
        .entries()
        .map(|e| {
            let text = e.id.len()
                + e.group_id.len()
                + e.title.len()
                + e.username.len()
                + e.password.len()
                + e.url.len()
                + e.notes.len()
                + e.totp_secret.as_ref().map_or(0, |t| t.len());
            let tags: usize = e.tags.iter().map(|t| ITEM_OVERHEAD + ESCAPE * t.len()).sum();
            let fields: usize = e
                .custom_fields
                .iter()
                .map(|f| ITEM_OVERHEAD + ESCAPE * (f.name.len() + f.value.len()))
                .sum();
            ENTRY_OVERHEAD + ESCAPE * text + tags + fields
        })
        .sum();

    ITEM_OVERHEAD + groups + entries
}

/// Parse a decrypted payload back into a validated tree.
pub fn deserialize(bytes: &[u8]) -> Result<CredentialTree> {
    let payload: PayloadIn = serde_json::from_slice(bytes)
        .map_err(|e| VaultError::CorruptVault(format!("payload: {e}")))?;

    if payload.schema != PAYLOAD_SCHEMA {
        return Err(VaultError::CorruptVault(format!(
            "unknown payload schema {}",
            payload.schema
        )));
    }

    CredentialTree::from_parts(payload.groups, payload.entries).map_err(|e| match e {
        VaultError::Validation(reason) => VaultError::CorruptVault(reason),
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::model::{CustomField, ROOT_GROUP_ID};

    fn populated_tree() -> CredentialTree {
        let mut tree = CredentialTree::new();
        let work = tree.insert_group(Group::new("Work", None)).unwrap();

        let mut e = Entry::new("GitHub", work.as_str());
        e.username = "octo".into();
        e.password = "s3cret!".into();
        e.url = "https://github.com".into();
        e.notes = "line one\nline two".into();
        e.tags.insert("dev".into());
        e.tags.insert("code".into());
        e.totp_secret = Some("JBSWY3DPEHPK3PXP".into());
        e.custom_fields.push(CustomField::new("zeta", "1", false));
        e.custom_fields.push(CustomField::new("alpha", "2", true));
        e.expires_at = Some(4_102_444_800);
        e.is_favorite = true;
        tree.insert_entry(e, 1_700_000_000).unwrap();

        tree.insert_entry(Entry::new("Bank", ROOT_GROUP_ID), 1_700_000_123).unwrap();
        tree
    }

    #[test]
    fn serialize_then_deserialize_is_identity() {
        let tree = populated_tree();
        let bytes = serialize(&tree).unwrap();
        let back = deserialize(&bytes).unwrap();
        assert_eq!(back, tree);

        // Custom field order is preserved, not sorted.
        let github = back.entries().find(|e| e.title == "GitHub").unwrap();
        let names: Vec<&str> = github
            .custom_fields
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(names, ["zeta", "alpha"]);
    }

    #[test]
    fn serialization_is_deterministic() {
        let tree = populated_tree();
        assert_eq!(*serialize(&tree).unwrap(), *serialize(&tree).unwrap());
    }

    #[test]
    fn buffer_is_never_regrown() {
        let mut tree = populated_tree();
        let mut noisy = Entry::new("quote\"and\\slash", ROOT_GROUP_ID);
        noisy.password = "\u{1}\u{2}\u{1f}\"\n\t".into();
        noisy.notes = "\u{0}".repeat(200);
        tree.insert_entry(noisy, 0).unwrap();

        let bound = size_bound(&tree);
        let bytes = serialize(&tree).unwrap();
        assert!(bytes.len() <= bound);
        assert_eq!(bytes.capacity(), bound);
    }

    #[test]
    fn garbage_is_corrupt() {
        assert!(matches!(
            deserialize(b"not json"),
            Err(VaultError::CorruptVault(_))
        ));
    }

    #[test]
    fn missing_field_is_corrupt() {
        let json = br#"{"schema":1,"groups":[{"id":"root","parent_id":null,"name":"Root"}],"entries":[]}"#;
        assert!(matches!(
            deserialize(json),
            Err(VaultError::CorruptVault(_))
        ));
    }

    #[test]
    fn unknown_schema_is_corrupt() {
        let json = br#"{"schema":9,"groups":[],"entries":[]}"#;
        assert!(matches!(
            deserialize(json),
            Err(VaultError::CorruptVault(_))
        ));
    }

    #[test]
    fn broken_tree_is_corrupt() {
        // Well-formed JSON, but no root group.
        let json = br#"{"schema":1,"groups":[],"entries":[]}"#;
        assert!(matches!(
            deserialize(json),
            Err(VaultError::CorruptVault(_))
        ));
    }
}
