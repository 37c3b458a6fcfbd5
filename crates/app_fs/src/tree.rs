//! Folder tree and path resolution

use crate::{collate_names, FsError, Item, Result, VirtualPath};
use serde::Serialize;

/// A folder in the tree. `path` is the folder's own full path ("" for root).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FolderNode {
    pub id: u64,
    pub name: String,
    pub path: String,
    pub item_count: usize,
    pub children: Vec<FolderNode>,
}

impl FolderNode {
    /// Build the tree rooted at "" from the folder records of a collection
    pub fn build(items: &[Item]) -> Self {
        Self::build_at(items, VirtualPath::root(), String::new())
    }

    fn build_at(items: &[Item], path: VirtualPath, name: String) -> Self {
        let item_count = items.iter().filter(|i| i.is_in(&path)).count();

        let mut folders: Vec<&Item> = items
            .iter()
            .filter(|i| i.is_folder() && i.is_in(&path))
            .collect();
        folders.sort_by(|a, b| collate_names(&a.name, &b.name));

        let children = folders
            .into_iter()
            .map(|f| Self::build_at(items, path.join(&f.name), f.name.clone()))
            .collect();

        Self {
            id: path.id(),
            name,
            path: path.display(),
            item_count,
            children,
        }
    }

    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }

    pub fn child(&self, name: &str) -> Option<&FolderNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Depth-first search by node id
    pub fn find(&self, id: u64) -> Option<&FolderNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }

    /// Number of folders below this node
    pub fn descendant_count(&self) -> usize {
        self.children.iter().map(|c| 1 + c.descendant_count()).sum()
    }
}

/// Walk from `root` matching each non-empty segment of `path` against child names.
///
/// Matching is exact and case-sensitive. An empty path resolves to `root`.
pub fn resolve<'a>(root: &'a FolderNode, path: &str) -> Result<&'a FolderNode> {
    let mut node = root;
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        node = node
            .child(segment)
            .ok_or_else(|| FsError::NotFound(path.to_string()))?;
    }
    Ok(node)
}

/// `path` with its last segment removed; root stays root
pub fn parent_of(path: &str) -> String {
    VirtualPath::new(path).parent().display()
}

/// One crumb of a breadcrumb trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Breadcrumb {
    pub label: String,
    pub path: String,
}

/// Breadcrumbs for `path`, starting with the root crumb
pub fn breadcrumbs(path: &str, root_label: &str) -> Vec<Breadcrumb> {
    let vpath = VirtualPath::new(path);
    let mut crumbs = vec![Breadcrumb {
        label: root_label.to_string(),
        path: String::new(),
    }];

    let mut current = VirtualPath::root();
    for segment in vpath.segments() {
        current = current.join(segment);
        crumbs.push(Breadcrumb {
            label: segment.clone(),
            path: current.display(),
        });
    }

    crumbs
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn sample() -> Vec<Item> {
        let t = Utc.with_ymd_and_hms(2024, 12, 1, 0, 0, 0).unwrap();
        vec![
            Item::folder(1, "documents", "", t),
            Item::folder(2, "images", "", t),
            Item::folder(3, "work", "documents", t),
            Item::folder(4, "Personal", "/documents/", t),
            Item::file(5, "report.pdf", 100, "documents/work", t),
            Item::file(6, "notes.txt", 100, "documents", t),
            Item::file(7, "readme.txt", 100, "", t),
        ]
    }

    #[test]
    fn test_build() {
        let root = FolderNode::build(&sample());
        assert!(root.is_root());
        assert_eq!(root.item_count, 3);
        let names: Vec<_> = root.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["documents", "images"]);

        let docs = root.child("documents").unwrap();
        assert_eq!(docs.item_count, 3);
        assert_eq!(docs.children[0].name, "Personal");
        assert_eq!(root.descendant_count(), 4);
    }

    #[test]
    fn test_resolve() {
        let root = FolderNode::build(&sample());
        assert_eq!(resolve(&root, "").unwrap().path, "");
        assert_eq!(resolve(&root, "/documents/work").unwrap().path, "documents/work");
        assert_eq!(resolve(&root, "documents//work/").unwrap().item_count, 1);
    }

    #[test]
    fn test_resolve_not_found_is_case_sensitive() {
        let root = FolderNode::build(&sample());
        assert_eq!(
            resolve(&root, "Documents"),
            Err(FsError::NotFound("Documents".to_string()))
        );
        assert!(resolve(&root, "documents/missing").is_err());
    }

    #[test]
    fn test_find_by_id() {
        let root = FolderNode::build(&sample());
        let id = VirtualPath::new("documents/work").id();
        assert_eq!(root.find(id).unwrap().name, "work");
    }

    #[test]
    fn test_parent_of() {
        assert_eq!(parent_of("/a/b/c"), "a/b");
        assert_eq!(parent_of("a"), "");
        assert_eq!(parent_of("/"), "");
    }

    #[test]
    fn test_breadcrumbs() {
        let crumbs = breadcrumbs("/documents/work", "Home");
        assert_eq!(crumbs.len(), 3);
        assert_eq!(crumbs[0].path, "");
        assert_eq!(crumbs[2].label, "work");
        assert_eq!(crumbs[2].path, "documents/work");
    }
}
