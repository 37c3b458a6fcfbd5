//! Name validation for new folders, renames and upload conflicts

use crate::{FsError, Result};

/// Longest accepted item name
pub const MAX_NAME_LEN: usize = 255;

/// Characters rejected in item names
const FORBIDDEN_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Validate a user-entered name and return it trimmed
pub fn validate_name(name: &str) -> Result<String> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(FsError::InvalidName("name must not be empty".to_string()));
    }

    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(FsError::InvalidName(format!(
            "name longer than {} characters",
            MAX_NAME_LEN
        )));
    }

    if let Some(c) = trimmed
        .chars()
        .find(|c| FORBIDDEN_CHARS.contains(c) || c.is_control())
    {
        return Err(FsError::InvalidName(format!("invalid character {:?}", c)));
    }

    if trimmed == "." || trimmed == ".." {
        return Err(FsError::InvalidName(trimmed.to_string()));
    }

    Ok(trimmed.to_string())
}

/// Check if a name is acceptable
pub fn is_valid_name(name: &str) -> bool {
    validate_name(name).is_ok()
}

/// "report.pdf" -> "report_copy.pdf"
pub fn copy_name(name: &str) -> String {
    match split_name(name) {
        (stem, Some(ext)) => format!("{}_copy.{}", stem, ext),
        (stem, None) => format!("{}_copy", stem),
    }
}

/// First "stem (n).ext" (n >= 1) for which `taken` returns false
pub fn numbered_name(name: &str, taken: impl Fn(&str) -> bool) -> String {
    let (stem, ext) = split_name(name);
    (1..)
        .map(|n| match ext {
            Some(ext) => format!("{} ({}).{}", stem, n, ext),
            None => format!("{} ({})", stem, n),
        })
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| name.to_string())
}

fn split_name(name: &str) -> (&str, Option<&str>) {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => (stem, Some(ext)),
        _ => (name, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        assert_eq!(validate_name("  Reports  ").unwrap(), "Reports");
        assert!(validate_name("   ").is_err());
        assert!(validate_name("a:b").is_err());
        assert!(validate_name("a/b").is_err());
        assert!(validate_name("..").is_err());
        assert!(validate_name(&"x".repeat(256)).is_err());
        assert!(is_valid_name(&"x".repeat(255)));
    }

    #[test]
    fn test_copy_name() {
        assert_eq!(copy_name("report.pdf"), "report_copy.pdf");
        assert_eq!(copy_name("archive.tar.gz"), "archive.tar_copy.gz");
        assert_eq!(copy_name("README"), "README_copy");
    }

    #[test]
    fn test_numbered_name() {
        let taken = ["image.jpg", "image (1).jpg"];
        let name = numbered_name("image.jpg", |n| taken.contains(&n));
        assert_eq!(name, "image (2).jpg");
    }
}
