//! Item collection - the mutator behind rename, delete, copy, move and new folder

use crate::{numbered_name, validate_name, FsError, Item, ItemId, ItemKind, Result, VirtualPath};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;

/// How pasted items land in the target folder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasteMode {
    Copy,
    Move,
}

/// Storage summary shown in the sidebar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StorageInfo {
    pub used: u64,
    pub total: u64,
    pub file_count: usize,
}

/// The whole set of files and folders
#[derive(Debug, Clone, Default)]
pub struct ItemCollection {
    items: Vec<Item>,
    next_id: u64,
}

impl ItemCollection {
    pub fn new(items: Vec<Item>) -> Self {
        let next_id = items.iter().map(|i| i.id.0).max().map_or(1, |max| max + 1);
        Self { items, next_id }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn into_items(self) -> Vec<Item> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Direct children of `folder`
    pub fn children_of(&self, folder: &VirtualPath) -> Vec<&Item> {
        self.items.iter().filter(|i| i.is_in(folder)).collect()
    }

    /// Names present directly in `folder`
    pub fn names_in(&self, folder: &VirtualPath) -> HashSet<String> {
        self.children_of(folder).into_iter().map(|i| i.name.clone()).collect()
    }

    /// Does a folder exist at `path`? The root always exists.
    pub fn folder_exists(&self, path: &VirtualPath) -> bool {
        path.is_root()
            || self
                .items
                .iter()
                .any(|i| i.is_folder() && i.full_path() == *path)
    }

    pub fn storage_info(&self, total: u64) -> StorageInfo {
        StorageInfo {
            used: self.items.iter().map(|i| i.size).sum(),
            total,
            file_count: self.items.len(),
        }
    }

    fn allocate_id(&mut self) -> ItemId {
        let id = ItemId(self.next_id);
        self.next_id += 1;
        id
    }

    fn index_of(&self, id: ItemId) -> Result<usize> {
        self.items
            .iter()
            .position(|i| i.id == id)
            .ok_or(FsError::ItemNotFound(id))
    }

    fn require_folder(&self, path: &VirtualPath) -> Result<()> {
        if self.folder_exists(path) {
            Ok(())
        } else {
            Err(FsError::NotFound(path.display()))
        }
    }

    /// Create a folder inside `parent`
    pub fn create_folder(&mut self, parent: &str, name: &str, now: DateTime<Utc>) -> Result<ItemId> {
        let parent = VirtualPath::new(parent);
        self.require_folder(&parent)?;
        let name = validate_name(name)?;

        if self.names_in(&parent).contains(&name) {
            return Err(FsError::AlreadyExists(parent.join(&name).display()));
        }

        let id = self.allocate_id();
        self.items.push(Item::folder(id.0, &name, &parent.display(), now));
        tracing::debug!("Created folder {} in {}", name, parent);
        Ok(id)
    }

    /// Add a file record (e.g. a completed upload); returns its fresh id
    pub fn add_file(&mut self, name: &str, size: u64, parent: &str, now: DateTime<Utc>) -> Result<ItemId> {
        let parent = VirtualPath::new(parent);
        self.require_folder(&parent)?;
        let name = validate_name(name)?;

        let id = self.allocate_id();
        let mut item = Item::file(id.0, &name, size, &parent.display(), now);
        item.created_at = Some(now);
        self.items.retain(|i| !(i.is_in(&parent) && i.name == name && !i.is_folder()));
        self.items.push(item);
        Ok(id)
    }

    /// Rename an item. Renaming a folder rewrites the paths of everything below it.
    pub fn rename(&mut self, id: ItemId, new_name: &str, now: DateTime<Utc>) -> Result<()> {
        let idx = self.index_of(id)?;
        let new_name = validate_name(new_name)?;
        let item = &self.items[idx];

        if item.name == new_name {
            return Ok(());
        }

        let parent = item.parent_path();
        if self.names_in(&parent).contains(&new_name) {
            return Err(FsError::AlreadyExists(parent.join(&new_name).display()));
        }

        let old_path = item.full_path();
        let new_path = parent.join(&new_name);
        if item.is_folder() {
            self.rebase_descendants(&old_path, &new_path);
        }

        let item = &mut self.items[idx];
        tracing::debug!("Renamed {} -> {}", item.name, new_name);
        item.name = new_name;
        item.modified_at = now;
        Ok(())
    }

    /// Delete items; folders take their descendants with them. Returns the removed records.
    pub fn delete(&mut self, ids: &[ItemId]) -> Vec<Item> {
        let doomed_folders: Vec<VirtualPath> = self
            .items
            .iter()
            .filter(|i| ids.contains(&i.id) && i.is_folder())
            .map(Item::full_path)
            .collect();

        let (removed, kept): (Vec<Item>, Vec<Item>) = std::mem::take(&mut self.items)
            .into_iter()
            .partition(|i| {
                ids.contains(&i.id)
                    || doomed_folders.iter().any(|f| i.parent_path().starts_with(f))
            });

        self.items = kept;
        tracing::info!("Deleted {} items", removed.len());
        removed
    }

    /// Move items into `target`. Name clashes get a numbered name.
    pub fn move_to(&mut self, ids: &[ItemId], target: &str) -> Result<usize> {
        let target = VirtualPath::new(target);
        self.require_folder(&target)?;

        let mut moved = 0;
        for &id in ids {
            let idx = self.index_of(id)?;
            let item = &self.items[idx];
            if item.is_in(&target) {
                continue;
            }

            let old_path = item.full_path();
            if item.is_folder() && target.starts_with(&old_path) {
                return Err(FsError::InvalidOperation(format!(
                    "cannot move {} into itself",
                    old_path
                )));
            }

            let taken = self.names_in(&target);
            let name = if taken.contains(&item.name) {
                numbered_name(&item.name, |n| taken.contains(n))
            } else {
                item.name.clone()
            };
            let new_path = target.join(&name);

            if item.is_folder() {
                self.rebase_descendants(&old_path, &new_path);
            }

            let item = &mut self.items[idx];
            item.name = name;
            item.path = target.display();
            moved += 1;
        }

        Ok(moved)
    }

    /// Copy items into `target` with fresh ids. Folders are copied with their contents.
    pub fn copy_to(&mut self, ids: &[ItemId], target: &str, now: DateTime<Utc>) -> Result<Vec<ItemId>> {
        let target = VirtualPath::new(target);
        self.require_folder(&target)?;

        let mut created = Vec::new();
        for &id in ids {
            let source = self.items[self.index_of(id)?].clone();
            let source_path = source.full_path();
            if source.is_folder() && target.starts_with(&source_path) {
                return Err(FsError::InvalidOperation(format!(
                    "cannot copy {} into itself",
                    source_path
                )));
            }

            let taken = self.names_in(&target);
            let name = if taken.contains(&source.name) {
                numbered_name(&source.name, |n| taken.contains(n))
            } else {
                source.name.clone()
            };
            let dest_path = target.join(&name);

            let descendants: Vec<Item> = if source.kind == ItemKind::Folder {
                self.items
                    .iter()
                    .filter(|i| i.parent_path().starts_with(&source_path))
                    .cloned()
                    .collect()
            } else {
                Vec::new()
            };

            let copy_id = self.allocate_id();
            self.items.push(Item {
                id: copy_id,
                name,
                path: target.display(),
                modified_at: now,
                created_at: Some(now),
                ..source
            });
            created.push(copy_id);

            for child in descendants {
                let path = child
                    .parent_path()
                    .rebase(&source_path, &dest_path)
                    .unwrap_or_else(|| dest_path.clone());
                let child_id = self.allocate_id();
                self.items.push(Item {
                    id: child_id,
                    path: path.display(),
                    created_at: Some(now),
                    ..child
                });
            }
        }

        Ok(created)
    }

    /// Paste clipboard items into `target`
    pub fn paste(&mut self, ids: &[ItemId], mode: PasteMode, target: &str, now: DateTime<Utc>) -> Result<usize> {
        let present: Vec<ItemId> = ids.iter().copied().filter(|id| self.get(*id).is_some()).collect();
        if present.len() < ids.len() {
            tracing::warn!("{} clipboard items no longer exist", ids.len() - present.len());
        }

        match mode {
            PasteMode::Copy => self.copy_to(&present, target, now).map(|v| v.len()),
            PasteMode::Move => self.move_to(&present, target),
        }
    }

    fn rebase_descendants(&mut self, from: &VirtualPath, to: &VirtualPath) {
        for item in self.items.iter_mut() {
            if let Some(path) = item.parent_path().rebase(from, to) {
                item.path = path.display();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 12, 20, 12, 0, 0).unwrap()
    }

    fn sample() -> ItemCollection {
        let t = Utc.with_ymd_and_hms(2024, 12, 1, 0, 0, 0).unwrap();
        ItemCollection::new(vec![
            Item::folder(1, "documents", "", t),
            Item::folder(2, "work", "documents", t),
            Item::file(3, "report.pdf", 100, "documents/work", t),
            Item::file(4, "notes.txt", 50, "", t),
            Item::folder(5, "archive", "", t),
        ])
    }

    #[test]
    fn test_create_folder() {
        let mut c = sample();
        let id = c.create_folder("documents", " personal ", now()).unwrap();
        assert_eq!(id, ItemId(6));
        assert_eq!(c.get(id).unwrap().name, "personal");
        assert!(matches!(
            c.create_folder("documents", "work", now()),
            Err(FsError::AlreadyExists(_))
        ));
        assert!(matches!(c.create_folder("nowhere", "x", now()), Err(FsError::NotFound(_))));
        assert!(matches!(c.create_folder("", "a|b", now()), Err(FsError::InvalidName(_))));
    }

    #[test]
    fn test_rename_folder_rewrites_children() {
        let mut c = sample();
        c.rename(ItemId(1), "docs", now()).unwrap();
        assert_eq!(c.get(ItemId(2)).unwrap().path, "docs");
        assert_eq!(c.get(ItemId(3)).unwrap().path, "docs/work");
        assert_eq!(c.get(ItemId(1)).unwrap().modified_at, now());
    }

    #[test]
    fn test_rename_conflict() {
        let mut c = sample();
        assert!(matches!(
            c.rename(ItemId(4), "archive", now()),
            Err(FsError::AlreadyExists(_))
        ));
        // same name is a no-op
        c.rename(ItemId(4), "notes.txt", now()).unwrap();
    }

    #[test]
    fn test_delete_folder_cascades() {
        let mut c = sample();
        let removed = c.delete(&[ItemId(1)]);
        assert_eq!(removed.len(), 3);
        assert_eq!(c.len(), 2);
    }

    #[test]
    fn test_move() {
        let mut c = sample();
        assert_eq!(c.move_to(&[ItemId(2)], "archive").unwrap(), 1);
        assert_eq!(c.get(ItemId(2)).unwrap().path, "archive");
        assert_eq!(c.get(ItemId(3)).unwrap().path, "archive/work");

        assert!(matches!(
            c.move_to(&[ItemId(5)], "archive/work"),
            Err(FsError::InvalidOperation(_))
        ));
    }

    #[test]
    fn test_copy_folder_with_contents() {
        let mut c = sample();
        let created = c.copy_to(&[ItemId(1)], "archive", now()).unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(c.len(), 8);
        assert!(c.folder_exists(&VirtualPath::new("archive/documents/work")));
        assert_eq!(c.children_of(&VirtualPath::new("archive/documents/work")).len(), 1);
    }

    #[test]
    fn test_copy_name_clash() {
        let mut c = sample();
        let created = c.copy_to(&[ItemId(4)], "", now()).unwrap();
        assert_eq!(c.get(created[0]).unwrap().name, "notes (1).txt");
    }

    #[test]
    fn test_paste_skips_missing() {
        let mut c = sample();
        let n = c.paste(&[ItemId(4), ItemId(99)], PasteMode::Move, "archive", now()).unwrap();
        assert_eq!(n, 1);
        assert_eq!(c.get(ItemId(4)).unwrap().path, "archive");
    }

    #[test]
    fn test_storage_info() {
        let info = sample().storage_info(1000);
        assert_eq!(info.used, 150);
        assert_eq!(info.file_count, 5);
    }
}
