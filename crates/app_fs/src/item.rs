//! File and folder records

use crate::virtual_path::extension_of;
use crate::VirtualPath;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Identifier shared by files and folders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u64);

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    #[serde(rename = "file")]
    File,
    #[serde(rename = "folder")]
    Folder,
}

/// A file or folder in the collection
///
/// `path` is the path of the containing folder. A folder's children carry
/// `path == folder.path + "/" + folder.name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub path: String,
    pub modified_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accessed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub attributes: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
}

impl Item {
    pub fn file(id: u64, name: &str, size: u64, path: &str, modified_at: DateTime<Utc>) -> Self {
        Self {
            id: ItemId(id),
            name: name.to_string(),
            kind: ItemKind::File,
            size,
            path: VirtualPath::new(path).display(),
            modified_at,
            created_at: None,
            accessed_at: None,
            attributes: BTreeSet::new(),
            tags: BTreeSet::new(),
        }
    }

    pub fn folder(id: u64, name: &str, path: &str, modified_at: DateTime<Utc>) -> Self {
        Self {
            kind: ItemKind::Folder,
            ..Self::file(id, name, 0, path, modified_at)
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_folder(&self) -> bool {
        self.kind == ItemKind::Folder
    }

    /// Lower-cased trailing dot-suffix of the name
    pub fn extension(&self) -> Option<String> {
        extension_of(&self.name)
    }

    /// Size in megabytes (bytes / 1_048_576)
    pub fn size_mb(&self) -> f64 {
        self.size as f64 / 1_048_576.0
    }

    /// Containing folder as a VirtualPath
    pub fn parent_path(&self) -> VirtualPath {
        VirtualPath::new(&self.path)
    }

    /// Full path of this item
    pub fn full_path(&self) -> VirtualPath {
        self.parent_path().join(&self.name)
    }

    /// Does this item live directly in `folder`? ("" and "/" both mean root)
    pub fn is_in(&self, folder: &VirtualPath) -> bool {
        self.parent_path() == *folder
    }
}
