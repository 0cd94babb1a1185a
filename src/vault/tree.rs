//! In-memory credential tree.
//!
//! Groups and entries live in two flat maps keyed by id.  The parent
//! relation and entry membership are plain id references, so every
//! structural rule (unique ids, resolvable references, acyclic parents)
//! is checked here before a mutation is applied.  Group and entry ids
//! share one namespace.  Nothing in this module touches the clock or the
//! file system: callers pass `now`.
//!
//! The recycle bin is an ordinary group under the root with
//! `is_recycle_bin` set.  It is created by the first `trash_*` call;
//! `remove_entry` and `remove_group` never go through it.

use std::collections::{BTreeMap, HashMap, HashSet};

use uuid::Uuid;

use super::model::{Entry, Group, ROOT_GROUP_ID};
use crate::errors::{Result, VaultError};

/// The group/entry tree owned by an open vault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialTree {
    groups: BTreeMap<String, Group>,
    entries: BTreeMap<String, Entry>,
}

/// What a group deletion removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Removed {
    pub groups: usize,
    pub entries: usize,
}

impl Default for CredentialTree {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialTree {
    /// A tree holding only the root group.
    pub fn new() -> Self {
        let mut groups = BTreeMap::new();
        groups.insert(ROOT_GROUP_ID.to_string(), Group::root());
        Self {
            groups,
            entries: BTreeMap::new(),
        }
    }

    /// Rebuild a tree from loose parts, checking every structural rule.
    pub fn from_parts(groups: Vec<Group>, entries: Vec<Entry>) -> Result<Self> {
        let mut group_map = BTreeMap::new();
        for group in groups {
            let id = group.id.clone();
            if group_map.insert(id.clone(), group).is_some() {
                return Err(VaultError::Validation(format!("duplicate group id '{id}'")));
            }
        }

        let mut entry_map = BTreeMap::new();
        for entry in entries {
            let id = entry.id.clone();
            if group_map.contains_key(&id) {
                return Err(VaultError::Validation(format!(
                    "id '{id}' is used by both a group and an entry"
                )));
            }
            if entry_map.insert(id.clone(), entry).is_some() {
                return Err(VaultError::Validation(format!("duplicate entry id '{id}'")));
            }
        }

        let tree = Self {
            groups: group_map,
            entries: entry_map,
        };
        tree.check_integrity()?;
        Ok(tree)
    }

    /// Verify the root, parent links, acyclicity and entry membership.
    pub fn check_integrity(&self) -> Result<()> {
        match self.groups.get(ROOT_GROUP_ID) {
            Some(root) if root.parent_id.is_none() => {}
            Some(_) => {
                return Err(VaultError::Validation("root group has a parent".into()));
            }
            None => return Err(VaultError::Validation("root group is missing".into())),
        }

        for (id, group) in &self.groups {
            if id.is_empty() {
                return Err(VaultError::Validation("group with empty id".into()));
            }
            if id == ROOT_GROUP_ID {
                continue;
            }
            let parent = group
                .parent_id
                .as_deref()
                .ok_or_else(|| VaultError::Validation(format!("group '{id}' has no parent")))?;
            if !self.groups.contains_key(parent) {
                return Err(VaultError::Validation(format!(
                    "group '{id}' references missing parent '{parent}'"
                )));
            }
        }

        let bins: Vec<&Group> = self.groups.values().filter(|g| g.is_recycle_bin).collect();
        if bins.len() > 1 {
            return Err(VaultError::Validation("more than one recycle bin".into()));
        }
        if let Some(bin) = bins.first() {
            if bin.parent_id.as_deref() != Some(ROOT_GROUP_ID) {
                return Err(VaultError::Validation(
                    "the recycle bin must sit under the root group".into(),
                ));
            }
        }

        // Every group must reach the root within `groups.len()` steps,
        // otherwise the parent chain loops.
        for id in self.groups.keys() {
            let mut current = id.as_str();
            let mut steps = 0;
            while current != ROOT_GROUP_ID {
                steps += 1;
                if steps > self.groups.len() {
                    return Err(VaultError::Validation(format!(
                        "group '{id}' is part of a parent cycle"
                    )));
                }
                current = self
                    .groups
                    .get(current)
                    .and_then(|g| g.parent_id.as_deref())
                    .unwrap_or(ROOT_GROUP_ID);
            }
        }

        for (id, entry) in &self.entries {
            if id.is_empty() {
                return Err(VaultError::Validation("entry with empty id".into()));
            }
            if !self.groups.contains_key(&entry.group_id) {
                return Err(VaultError::Validation(format!(
                    "entry '{id}' references missing group '{}'",
                    entry.group_id
                )));
            }
        }

        Ok(())
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.values()
    }

    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.entries.values()
    }

    pub fn group(&self, id: &str) -> Option<&Group> {
        self.groups.get(id)
    }

    pub fn entry(&self, id: &str) -> Option<&Entry> {
        self.entries.get(id)
    }

    /// The recycle bin, if one has been created.
    pub fn recycle_bin(&self) -> Option<&Group> {
        self.groups.values().find(|g| g.is_recycle_bin)
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    // ------------------------------------------------------------------
    // Entry mutations
    // ------------------------------------------------------------------

    /// Insert a new entry and return its id.
    ///
    /// An empty id is replaced with a fresh UUID.  Missing `created_at`
    /// and `modified_at` become `now`; a missing `accessed_at` becomes the
    /// creation time.
    pub fn insert_entry(&mut self, mut entry: Entry, now: i64) -> Result<String> {
        if entry.id.is_empty() {
            entry.id = self.fresh_id();
        } else {
            self.require_unused_id(&entry.id)?;
        }
        self.require_group(&entry.group_id)?;

        let created = entry.created_at.unwrap_or(now);
        entry.created_at = Some(created);
        entry.modified_at = Some(entry.modified_at.unwrap_or(now));
        entry.accessed_at = Some(entry.accessed_at.unwrap_or(created));

        let id = entry.id.clone();
        self.entries.insert(id.clone(), entry);
        Ok(id)
    }

    /// Replace an existing entry's content.
    ///
    /// The stored `created_at` and `accessed_at` are kept; `modified_at`
    /// moves to `now` and never goes backwards.
    pub fn update_entry(&mut self, mut entry: Entry, now: i64) -> Result<()> {
        self.require_group(&entry.group_id)?;
        let existing = self
            .entries
            .get_mut(&entry.id)
            .ok_or_else(|| VaultError::EntryNotFound(entry.id.clone()))?;

        entry.created_at = existing.created_at;
        entry.accessed_at = existing.accessed_at;
        entry.modified_at = Some(existing.modified_at.map_or(now, |m| m.max(now)));

        *existing = entry;
        Ok(())
    }

    /// Remove an entry and hand it back.
    pub fn remove_entry(&mut self, id: &str) -> Result<Entry> {
        self.entries
            .remove(id)
            .ok_or_else(|| VaultError::EntryNotFound(id.to_string()))
    }

    /// Record an explicit access and return the updated entry.
    pub fn touch_entry(&mut self, id: &str, now: i64) -> Result<Entry> {
        let entry = self
            .entries
            .get_mut(id)
            .ok_or_else(|| VaultError::EntryNotFound(id.to_string()))?;
        entry.accessed_at = Some(entry.accessed_at.map_or(now, |a| a.max(now)));
        Ok(entry.clone())
    }

    // ------------------------------------------------------------------
    // Group mutations
    // ------------------------------------------------------------------

    /// Insert a new group and return its id.  A group without a parent is
    /// placed under the root.
    pub fn insert_group(&mut self, mut group: Group) -> Result<String> {
        if group.is_recycle_bin {
            return Err(VaultError::Validation(
                "the recycle bin is created by the vault".into(),
            ));
        }
        if group.id.is_empty() {
            group.id = self.fresh_id();
        } else {
            self.require_unused_id(&group.id)?;
        }
        let parent = group
            .parent_id
            .get_or_insert_with(|| ROOT_GROUP_ID.to_string());
        self.require_group(parent)?;

        let id = group.id.clone();
        self.groups.insert(id.clone(), group);
        Ok(id)
    }

    /// Rename or move a group.  The root and the recycle bin can be renamed
    /// but not moved, and no group can move beneath itself.
    pub fn update_group(&mut self, mut group: Group) -> Result<()> {
        let existing = self
            .groups
            .get(&group.id)
            .ok_or_else(|| VaultError::GroupNotFound(group.id.clone()))?;
        group.is_recycle_bin = existing.is_recycle_bin;
        if group.is_recycle_bin && group.parent_id.as_deref() != Some(ROOT_GROUP_ID) {
            return Err(VaultError::Validation(
                "the recycle bin cannot be moved".into(),
            ));
        }

        if group.is_root() {
            if group.parent_id.is_some() {
                return Err(VaultError::Validation(
                    "the root group cannot be moved".into(),
                ));
            }
        } else {
            let parent = group
                .parent_id
                .get_or_insert_with(|| ROOT_GROUP_ID.to_string())
                .clone();
            self.require_group(&parent)?;
            if self.subtree(&group.id).contains(&parent) {
                return Err(VaultError::Validation(format!(
                    "cannot move group '{}' beneath itself",
                    group.id
                )));
            }
        }

        self.groups.insert(group.id.clone(), group);
        Ok(())
    }

    /// Delete a group.
    ///
    /// Without `cascade` the group must have no child groups and no
    /// entries (`NotEmpty` otherwise).  With `cascade` the whole subtree
    /// and every entry in it goes in one step.
    pub fn remove_group(&mut self, id: &str, cascade: bool) -> Result<Removed> {
        if id == ROOT_GROUP_ID {
            return Err(VaultError::Validation(
                "the root group cannot be deleted".into(),
            ));
        }
        if !self.groups.contains_key(id) {
            return Err(VaultError::GroupNotFound(id.to_string()));
        }

        let doomed = self.subtree(id);
        let doomed_entries: Vec<String> = self
            .entries
            .values()
            .filter(|e| doomed.contains(&e.group_id))
            .map(|e| e.id.clone())
            .collect();

        if !cascade && (doomed.len() > 1 || !doomed_entries.is_empty()) {
            return Err(VaultError::NotEmpty(id.to_string()));
        }

        for entry_id in &doomed_entries {
            self.entries.remove(entry_id);
        }
        for group_id in &doomed {
            self.groups.remove(group_id);
        }

        Ok(Removed {
            groups: doomed.len(),
            entries: doomed_entries.len(),
        })
    }

    // ------------------------------------------------------------------
    // Recycle bin
    // ------------------------------------------------------------------

    /// Move an entry into the recycle bin, creating the bin if needed.
    pub fn trash_entry(&mut self, id: &str, now: i64) -> Result<()> {
        let group_id = self
            .entries
            .get(id)
            .map(|e| e.group_id.clone())
            .ok_or_else(|| VaultError::EntryNotFound(id.to_string()))?;
        if self.in_recycle_bin(&group_id) {
            return Err(VaultError::Validation(format!(
                "entry '{id}' is already in the recycle bin"
            )));
        }

        let bin = self.ensure_recycle_bin();
        if let Some(entry) = self.entries.get_mut(id) {
            entry.group_id = bin;
            entry.modified_at = Some(entry.modified_at.map_or(now, |m| m.max(now)));
        }
        Ok(())
    }

    /// Move a group and everything below it into the recycle bin.
    pub fn trash_group(&mut self, id: &str) -> Result<()> {
        if id == ROOT_GROUP_ID {
            return Err(VaultError::Validation(
                "the root group cannot be deleted".into(),
            ));
        }
        let group = self
            .groups
            .get(id)
            .ok_or_else(|| VaultError::GroupNotFound(id.to_string()))?;
        if group.is_recycle_bin {
            return Err(VaultError::Validation(
                "the recycle bin cannot be moved into itself".into(),
            ));
        }
        if self.in_recycle_bin(id) {
            return Err(VaultError::Validation(format!(
                "group '{id}' is already in the recycle bin"
            )));
        }

        let bin = self.ensure_recycle_bin();
        if let Some(group) = self.groups.get_mut(id) {
            group.parent_id = Some(bin);
        }
        Ok(())
    }

    /// Permanently delete everything inside the recycle bin.  The bin
    /// itself stays.  Without a bin nothing happens.
    pub fn empty_recycle_bin(&mut self) -> Result<Removed> {
        let Some(bin) = self.recycle_bin().map(|g| g.id.clone()) else {
            return Ok(Removed {
                groups: 0,
                entries: 0,
            });
        };

        let mut doomed = self.subtree(&bin);
        doomed.remove(&bin);
        let before = self.entries.len();
        self.entries
            .retain(|_, e| e.group_id != bin && !doomed.contains(&e.group_id));
        self.groups.retain(|id, _| !doomed.contains(id));

        Ok(Removed {
            groups: doomed.len(),
            entries: before - self.entries.len(),
        })
    }

    /// Whether `group_id` is the recycle bin or lies below it.
    fn in_recycle_bin(&self, group_id: &str) -> bool {
        let mut current = Some(group_id);
        let mut steps = 0;
        while let Some(id) = current {
            let Some(group) = self.groups.get(id) else {
                return false;
            };
            if group.is_recycle_bin {
                return true;
            }
            steps += 1;
            if steps > self.groups.len() {
                return false;
            }
            current = group.parent_id.as_deref();
        }
        false
    }

    fn ensure_recycle_bin(&mut self) -> String {
        if let Some(bin) = self.recycle_bin() {
            return bin.id.clone();
        }
        let mut bin = Group::recycle_bin();
        bin.id = self.fresh_id();
        let id = bin.id.clone();
        self.groups.insert(id.clone(), bin);
        id
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn require_unused_id(&self, id: &str) -> Result<()> {
        if self.groups.contains_key(id) || self.entries.contains_key(id) {
            Err(VaultError::Validation(format!("id '{id}' already exists")))
        } else {
            Ok(())
        }
    }

    fn require_group(&self, id: &str) -> Result<()> {
        if self.groups.contains_key(id) {
            Ok(())
        } else {
            Err(VaultError::Validation(format!("group '{id}' does not exist")))
        }
    }

    /// `id` plus every group below it.
    fn subtree(&self, id: &str) -> HashSet<String> {
        let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
        for group in self.groups.values() {
            if let Some(parent) = group.parent_id.as_deref() {
                children.entry(parent).or_default().push(group.id.as_str());
            }
        }

        let mut found = HashSet::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if found.insert(current.to_string()) {
                if let Some(kids) = children.get(current) {
                    stack.extend(kids.iter().copied());
                }
            }
        }
        found
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = Uuid::new_v4().to_string();
            if !self.groups.contains_key(&id) && !self.entries.contains_key(&id) {
                return id;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_with_work_group() -> (CredentialTree, String) {
        let mut tree = CredentialTree::new();
        let work = tree.insert_group(Group::new("Work", None)).unwrap();
        (tree, work)
    }

    #[test]
    fn new_tree_is_root_only() {
        let tree = CredentialTree::new();
        assert_eq!(tree.group_count(), 1);
        assert_eq!(tree.entry_count(), 0);
        assert!(tree.group(ROOT_GROUP_ID).unwrap().is_root());
        assert!(tree.check_integrity().is_ok());
    }

    #[test]
    fn insert_entry_assigns_id_and_timestamps() {
        let mut tree = CredentialTree::new();
        let id = tree
            .insert_entry(Entry::new("Mail", ROOT_GROUP_ID), 1_000)
            .unwrap();
        let stored = tree.entry(&id).unwrap();
        assert!(!id.is_empty());
        assert_eq!(stored.created_at, Some(1_000));
        assert_eq!(stored.modified_at, Some(1_000));
        assert_eq!(stored.accessed_at, Some(1_000));
    }

    #[test]
    fn insert_entry_keeps_supplied_timestamps() {
        let mut tree = CredentialTree::new();
        let mut e = Entry::new("Old", ROOT_GROUP_ID);
        e.created_at = Some(10);
        e.modified_at = Some(20);
        let id = tree.insert_entry(e, 1_000).unwrap();
        let stored = tree.entry(&id).unwrap();
        assert_eq!(stored.created_at, Some(10));
        assert_eq!(stored.modified_at, Some(20));
        assert_eq!(stored.accessed_at, Some(10));
    }

    #[test]
    fn insert_entry_rejects_unknown_group_and_duplicate_id() {
        let mut tree = CredentialTree::new();
        let err = tree.insert_entry(Entry::new("x", "nope"), 0).unwrap_err();
        assert!(matches!(err, VaultError::Validation(_)));

        let mut e = Entry::new("x", ROOT_GROUP_ID);
        e.id = "fixed".into();
        tree.insert_entry(e.clone(), 0).unwrap();
        let err = tree.insert_entry(e, 0).unwrap_err();
        assert!(matches!(err, VaultError::Validation(_)));
        assert_eq!(tree.entry_count(), 1);
    }

    #[test]
    fn update_entry_preserves_created_and_moves_modified_forward() {
        let mut tree = CredentialTree::new();
        let id = tree
            .insert_entry(Entry::new("Mail", ROOT_GROUP_ID), 500)
            .unwrap();

        let mut changed = tree.entry(&id).unwrap().clone();
        changed.title = "Mail (work)".into();
        changed.created_at = Some(1);
        tree.update_entry(changed, 400).unwrap();

        let stored = tree.entry(&id).unwrap();
        assert_eq!(stored.title, "Mail (work)");
        assert_eq!(stored.created_at, Some(500));
        assert_eq!(stored.modified_at, Some(500));
    }

    #[test]
    fn update_missing_entry_fails() {
        let mut tree = CredentialTree::new();
        let mut e = Entry::new("ghost", ROOT_GROUP_ID);
        e.id = "missing".into();
        assert!(matches!(
            tree.update_entry(e, 0),
            Err(VaultError::EntryNotFound(_))
        ));
    }

    #[test]
    fn touch_updates_only_accessed_at() {
        let mut tree = CredentialTree::new();
        let id = tree
            .insert_entry(Entry::new("Mail", ROOT_GROUP_ID), 100)
            .unwrap();
        let touched = tree.touch_entry(&id, 250).unwrap();
        assert_eq!(touched.accessed_at, Some(250));
        assert_eq!(touched.modified_at, Some(100));
    }

    #[test]
    fn group_without_parent_lands_under_root() {
        let (tree, work) = tree_with_work_group();
        assert_eq!(
            tree.group(&work).unwrap().parent_id.as_deref(),
            Some(ROOT_GROUP_ID)
        );
    }

    #[test]
    fn insert_group_rejects_missing_parent() {
        let mut tree = CredentialTree::new();
        let err = tree
            .insert_group(Group::new("Orphan", Some("nowhere".into())))
            .unwrap_err();
        assert!(matches!(err, VaultError::Validation(_)));
    }

    #[test]
    fn cannot_move_group_beneath_itself() {
        let (mut tree, work) = tree_with_work_group();
        let child = tree
            .insert_group(Group::new("Child", Some(work.clone())))
            .unwrap();

        let mut moved = tree.group(&work).unwrap().clone();
        moved.parent_id = Some(child);
        assert!(matches!(
            tree.update_group(moved),
            Err(VaultError::Validation(_))
        ));

        let mut self_parent = tree.group(&work).unwrap().clone();
        self_parent.parent_id = Some(work.clone());
        assert!(tree.update_group(self_parent).is_err());
    }

    #[test]
    fn root_can_be_renamed_but_not_moved() {
        let (mut tree, work) = tree_with_work_group();
        let mut root = tree.group(ROOT_GROUP_ID).unwrap().clone();
        root.name = "Everything".into();
        tree.update_group(root.clone()).unwrap();
        assert_eq!(tree.group(ROOT_GROUP_ID).unwrap().name, "Everything");

        root.parent_id = Some(work);
        assert!(tree.update_group(root).is_err());
    }

    #[test]
    fn non_empty_group_needs_cascade() {
        let (mut tree, work) = tree_with_work_group();
        let sub = tree
            .insert_group(Group::new("Sub", Some(work.clone())))
            .unwrap();
        tree.insert_entry(Entry::new("a", work.as_str()), 0).unwrap();
        tree.insert_entry(Entry::new("b", sub.as_str()), 0).unwrap();
        tree.insert_entry(Entry::new("keep", ROOT_GROUP_ID), 0).unwrap();

        assert!(matches!(
            tree.remove_group(&work, false),
            Err(VaultError::NotEmpty(_))
        ));
        assert_eq!(tree.entry_count(), 3);

        let removed = tree.remove_group(&work, true).unwrap();
        assert_eq!(
            removed,
            Removed {
                groups: 2,
                entries: 2
            }
        );
        assert!(tree.group(&work).is_none());
        assert!(tree.group(&sub).is_none());
        assert_eq!(tree.entry_count(), 1);
        assert!(tree.check_integrity().is_ok());
    }

    #[test]
    fn empty_group_deletes_without_cascade() {
        let (mut tree, work) = tree_with_work_group();
        tree.remove_group(&work, false).unwrap();
        assert_eq!(tree.group_count(), 1);
    }

    #[test]
    fn root_cannot_be_deleted() {
        let mut tree = CredentialTree::new();
        assert!(matches!(
            tree.remove_group(ROOT_GROUP_ID, true),
            Err(VaultError::Validation(_))
        ));
    }

    #[test]
    fn from_parts_detects_cycles_and_dangling_refs() {
        let mut a = Group::new("a", Some("b".into()));
        a.id = "a".into();
        let mut b = Group::new("b", Some("a".into()));
        b.id = "b".into();
        assert!(CredentialTree::from_parts(vec![Group::root(), a, b], vec![]).is_err());

        let mut e = Entry::new("x", "missing");
        e.id = "e1".into();
        assert!(CredentialTree::from_parts(vec![Group::root()], vec![e]).is_err());

        assert!(CredentialTree::from_parts(vec![], vec![]).is_err());
    }

    #[test]
    fn from_parts_rejects_duplicate_ids() {
        assert!(CredentialTree::from_parts(vec![Group::root(), Group::root()], vec![]).is_err());

        let mut e = Entry::new("x", ROOT_GROUP_ID);
        e.id = ROOT_GROUP_ID.into();
        assert!(CredentialTree::from_parts(vec![Group::root()], vec![e]).is_err());
    }

    #[test]
    fn groups_and_entries_share_one_id_space() {
        let (mut tree, work) = tree_with_work_group();

        let mut e = Entry::new("clash", ROOT_GROUP_ID);
        e.id = work.clone();
        assert!(matches!(
            tree.insert_entry(e, 0),
            Err(VaultError::Validation(_))
        ));

        let mut e = Entry::new("fixed", ROOT_GROUP_ID);
        e.id = "fixed".into();
        tree.insert_entry(e, 0).unwrap();
        let mut g = Group::new("clash", None);
        g.id = "fixed".into();
        assert!(matches!(
            tree.insert_group(g),
            Err(VaultError::Validation(_))
        ));
        assert_eq!(tree.group_count(), 2);
    }

    #[test]
    fn trash_entry_creates_bin_once() {
        let mut tree = CredentialTree::new();
        assert!(tree.recycle_bin().is_none());
        let a = tree.insert_entry(Entry::new("a", ROOT_GROUP_ID), 10).unwrap();
        let b = tree.insert_entry(Entry::new("b", ROOT_GROUP_ID), 10).unwrap();

        tree.trash_entry(&a, 20).unwrap();
        tree.trash_entry(&b, 30).unwrap();

        let bin = tree.recycle_bin().unwrap().clone();
        assert!(bin.is_recycle_bin);
        assert_eq!(bin.parent_id.as_deref(), Some(ROOT_GROUP_ID));
        assert_eq!(tree.group_count(), 2);
        assert_eq!(tree.entry(&a).unwrap().group_id, bin.id);
        assert_eq!(tree.entry(&b).unwrap().modified_at, Some(30));
        assert!(tree.check_integrity().is_ok());

        assert!(matches!(
            tree.trash_entry(&a, 40),
            Err(VaultError::Validation(_))
        ));
        assert!(matches!(
            tree.trash_entry("missing", 40),
            Err(VaultError::EntryNotFound(_))
        ));
    }

    #[test]
    fn trash_group_moves_subtree() {
        let (mut tree, work) = tree_with_work_group();
        let sub = tree
            .insert_group(Group::new("Sub", Some(work.clone())))
            .unwrap();
        let e = tree.insert_entry(Entry::new("a", sub.as_str()), 0).unwrap();

        tree.trash_group(&work).unwrap();
        let bin = tree.recycle_bin().unwrap().id.clone();
        assert_eq!(tree.group(&work).unwrap().parent_id.as_deref(), Some(bin.as_str()));
        assert_eq!(tree.entry(&e).unwrap().group_id, sub);

        assert!(tree.trash_group(&sub).is_err());
        assert!(tree.trash_group(&bin).is_err());
        assert!(tree.trash_group(ROOT_GROUP_ID).is_err());
        assert!(tree.check_integrity().is_ok());
    }

    #[test]
    fn empty_recycle_bin_keeps_the_bin_and_everything_else() {
        let (mut tree, work) = tree_with_work_group();
        tree.insert_group(Group::new("Sub", Some(work.clone())))
            .unwrap();
        let inside = tree.insert_entry(Entry::new("a", work.as_str()), 0).unwrap();
        let loose = tree.insert_entry(Entry::new("b", ROOT_GROUP_ID), 0).unwrap();
        let keep = tree.insert_entry(Entry::new("c", ROOT_GROUP_ID), 0).unwrap();

        assert_eq!(
            tree.empty_recycle_bin().unwrap(),
            Removed {
                groups: 0,
                entries: 0
            }
        );

        tree.trash_group(&work).unwrap();
        tree.trash_entry(&loose, 0).unwrap();
        let removed = tree.empty_recycle_bin().unwrap();
        assert_eq!(
            removed,
            Removed {
                groups: 2,
                entries: 2
            }
        );

        assert!(tree.entry(&inside).is_none());
        assert!(tree.entry(&loose).is_none());
        assert!(tree.entry(&keep).is_some());
        assert!(tree.recycle_bin().is_some());
        assert_eq!(tree.group_count(), 2);
        assert!(tree.check_integrity().is_ok());
    }

    #[test]
    fn recycle_bin_flag_cannot_be_forged_or_moved() {
        let (mut tree, work) = tree_with_work_group();
        let mut forged = Group::new("Fake bin", None);
        forged.is_recycle_bin = true;
        assert!(tree.insert_group(forged).is_err());

        let e = tree.insert_entry(Entry::new("a", ROOT_GROUP_ID), 0).unwrap();
        tree.trash_entry(&e, 0).unwrap();
        let mut bin = tree.recycle_bin().unwrap().clone();

        bin.name = "Trash".into();
        tree.update_group(bin.clone()).unwrap();
        assert_eq!(tree.recycle_bin().unwrap().name, "Trash");

        bin.parent_id = Some(work.clone());
        assert!(tree.update_group(bin).is_err());

        let mut plain = tree.group(&work).unwrap().clone();
        plain.is_recycle_bin = true;
        tree.update_group(plain).unwrap();
        assert!(!tree.group(&work).unwrap().is_recycle_bin);
    }

    #[test]
    fn integrity_rejects_two_bins() {
        let mut first = Group::recycle_bin();
        first.id = "bin1".into();
        let mut second = Group::recycle_bin();
        second.id = "bin2".into();
        assert!(CredentialTree::from_parts(vec![Group::root(), first, second], vec![]).is_err());
    }
}
