//! Group, entry and secret types that make up the credential tree.
//!
//! Entries point at their group by id and groups point at their parent
//! by id; nothing in here holds a reference to anything else.  Secret
//! fields use `SecretString`, which wipes its buffer on drop and never
//! shows up in `Debug` output.

use std::collections::BTreeSet;
use std::fmt;
use std::ops::Deref;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

/// Id of the reserved root group every vault starts with.
pub const ROOT_GROUP_ID: &str = "root";

/// Display name of the root group.
pub const ROOT_GROUP_NAME: &str = "Root";

/// Display name of the recycle bin group.
pub const RECYCLE_BIN_NAME: &str = "Recycle Bin";

/// Default folder icon (KeePass icon index).
const DEFAULT_GROUP_ICON: u32 = 48;

/// Trash can icon.
const RECYCLE_BIN_ICON: u32 = 43;

/// Current time as whole seconds since the Unix epoch.
pub fn now_timestamp() -> i64 {
    Utc::now().timestamp()
}

// ---------------------------------------------------------------------------
// SecretString
// ---------------------------------------------------------------------------

/// Owned secret text that is zeroized on drop and redacted in `Debug`.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SecretString(Zeroizing<String>);

impl SecretString {
    pub fn new(value: String) -> Self {
        Self(Zeroizing::new(value))
    }

    /// Borrow the plaintext.  Callers must not log it.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl From<String> for SecretString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for SecretString {
    fn from(value: &str) -> Self {
        Self::new(value.to_owned())
    }
}

impl Deref for SecretString {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretString(<redacted>)")
    }
}

impl Serialize for SecretString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SecretString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(Self::new(value))
    }
}

// ---------------------------------------------------------------------------
// Group
// ---------------------------------------------------------------------------

/// A folder in the credential tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Unique identifier.  Left empty, the vault assigns a UUID.
    pub id: String,

    /// Parent group id.  `None` only for the root group; a new group
    /// submitted without a parent is placed under the root.
    pub parent_id: Option<String>,

    pub name: String,

    pub notes: String,

    pub icon_id: u32,

    /// Set only on the vault's recycle bin.  Preserved across updates.
    #[serde(default)]
    pub is_recycle_bin: bool,
}

impl Group {
    /// Create a group with an empty id (assigned by the vault on insert).
    pub fn new(name: impl Into<String>, parent_id: Option<String>) -> Self {
        Self {
            id: String::new(),
            parent_id,
            name: name.into(),
            notes: String::new(),
            icon_id: DEFAULT_GROUP_ICON,
            is_recycle_bin: false,
        }
    }

    /// The reserved root group.
    pub fn root() -> Self {
        Self {
            id: ROOT_GROUP_ID.to_string(),
            parent_id: None,
            name: ROOT_GROUP_NAME.to_string(),
            notes: String::new(),
            icon_id: DEFAULT_GROUP_ICON,
            is_recycle_bin: false,
        }
    }

    /// A recycle bin under the root, id not yet assigned.
    pub fn recycle_bin() -> Self {
        Self {
            id: String::new(),
            parent_id: Some(ROOT_GROUP_ID.to_string()),
            name: RECYCLE_BIN_NAME.to_string(),
            notes: String::new(),
            icon_id: RECYCLE_BIN_ICON,
            is_recycle_bin: true,
        }
    }

    pub fn is_root(&self) -> bool {
        self.id == ROOT_GROUP_ID
    }
}

// ---------------------------------------------------------------------------
// Entry
// ---------------------------------------------------------------------------

/// A named extra field on an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomField {
    pub name: String,
    pub value: SecretString,
    /// Whether front-ends should mask this value.
    pub protected: bool,
}

impl CustomField {
    pub fn new(name: impl Into<String>, value: impl Into<SecretString>, protected: bool) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            protected,
        }
    }
}

/// A single credential.
///
/// Timestamps are whole seconds since the Unix epoch.  `created_at`,
/// `modified_at` and `accessed_at` are optional on input; once an entry
/// is inside a vault all three are populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: String,
    pub group_id: String,
    pub title: String,
    pub username: String,
    pub password: SecretString,
    pub url: String,
    pub notes: String,
    pub tags: BTreeSet<String>,
    pub totp_secret: Option<SecretString>,
    pub custom_fields: Vec<CustomField>,
    pub created_at: Option<i64>,
    pub modified_at: Option<i64>,
    pub accessed_at: Option<i64>,
    pub expires_at: Option<i64>,
    pub is_favorite: bool,
}

impl Entry {
    /// Create an empty entry in `group_id` with no id or timestamps yet.
    pub fn new(title: impl Into<String>, group_id: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            group_id: group_id.into(),
            title: title.into(),
            username: String::new(),
            password: SecretString::default(),
            url: String::new(),
            notes: String::new(),
            tags: BTreeSet::new(),
            totp_secret: None,
            custom_fields: Vec::new(),
            created_at: None,
            modified_at: None,
            accessed_at: None,
            expires_at: None,
            is_favorite: false,
        }
    }

    /// Whether `expires_at` lies strictly before `now`.
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at.is_some_and(|at| at < now)
    }
}
