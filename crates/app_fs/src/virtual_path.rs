//! VirtualPath - slash-delimited paths inside the virtual file system

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64;

/// A normalized path in the virtual tree
///
/// Features:
/// - Leading, trailing and repeated slashes are ignored ("/a//b/" == "a/b")
/// - The root is the empty segment list and displays as ""
/// - Hash-based ID derived from the display string
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct VirtualPath {
    segments: Vec<String>,
}

impl VirtualPath {
    /// Parse any slash-delimited string
    pub fn new(path: &str) -> Self {
        let segments = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        Self { segments }
    }

    /// The root path
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Display string without leading slash ("documents/work")
    pub fn display(&self) -> String {
        self.segments.join("/")
    }

    /// Hash ID for fast lookups
    pub fn id(&self) -> u64 {
        xxh3_64(self.display().as_bytes())
    }

    /// Parent path; the root is its own parent
    pub fn parent(&self) -> Self {
        let mut segments = self.segments.clone();
        segments.pop();
        Self { segments }
    }

    /// Last segment
    pub fn file_name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Lower-cased trailing dot-suffix of the last segment
    pub fn extension(&self) -> Option<String> {
        self.file_name().and_then(extension_of)
    }

    /// Join with a relative component (which may itself contain slashes)
    pub fn join(&self, child: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(child.split('/').filter(|s| !s.is_empty()).map(str::to_string));
        Self { segments }
    }

    /// Is `self` equal to or below `ancestor`?
    pub fn starts_with(&self, ancestor: &VirtualPath) -> bool {
        self.segments.len() >= ancestor.segments.len()
            && self.segments[..ancestor.segments.len()] == ancestor.segments[..]
    }

    /// Replace the `from` prefix with `to`. Returns None if `from` is not a prefix.
    pub fn rebase(&self, from: &VirtualPath, to: &VirtualPath) -> Option<Self> {
        if !self.starts_with(from) {
            return None;
        }
        let mut segments = to.segments.clone();
        segments.extend_from_slice(&self.segments[from.segments.len()..]);
        Some(Self { segments })
    }
}

/// Lower-cased extension of a file name ("Report.PDF" -> "pdf")
pub fn extension_of(name: &str) -> Option<String> {
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_lowercase())
}

impl From<&str> for VirtualPath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for VirtualPath {
    fn from(path: String) -> Self {
        Self::new(&path)
    }
}

impl From<VirtualPath> for String {
    fn from(path: VirtualPath) -> Self {
        path.display()
    }
}

impl std::fmt::Display for VirtualPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "/{}", self.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization() {
        assert_eq!(VirtualPath::new("/Documenti/Lavoro/"), VirtualPath::new("Documenti//Lavoro"));
        assert!(VirtualPath::new("/").is_root());
        assert!(VirtualPath::new("").is_root());
    }

    #[test]
    fn test_hash_consistency() {
        let a = VirtualPath::new("/documents/work");
        let b = VirtualPath::new("documents/work");
        assert_eq!(a.id(), b.id());
        assert_ne!(a.id(), VirtualPath::new("documents").id());
    }

    #[test]
    fn test_parent_and_join() {
        let p = VirtualPath::new("a/b/c");
        assert_eq!(p.parent().display(), "a/b");
        assert_eq!(VirtualPath::root().parent(), VirtualPath::root());
        assert_eq!(VirtualPath::new("a").join("b/c"), p);
    }

    #[test]
    fn test_extension() {
        assert_eq!(VirtualPath::new("x/Report.PDF").extension().as_deref(), Some("pdf"));
        assert_eq!(VirtualPath::new("x/archive.tar.gz").extension().as_deref(), Some("gz"));
        assert_eq!(VirtualPath::new("x/README").extension(), None);
        assert_eq!(VirtualPath::new("x/.bashrc").extension(), None);
    }

    #[test]
    fn test_rebase() {
        let p = VirtualPath::new("a/b/c");
        let moved = p.rebase(&VirtualPath::new("a/b"), &VirtualPath::new("z")).unwrap();
        assert_eq!(moved.display(), "z/c");
        assert!(p.rebase(&VirtualPath::new("q"), &VirtualPath::root()).is_none());
    }
}
