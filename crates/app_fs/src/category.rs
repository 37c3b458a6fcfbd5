//! File categories used by the type facet and previews

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    Document,
    Image,
    Video,
    Audio,
    Archive,
    Executable,
}

impl FileCategory {
    pub const ALL: [FileCategory; 6] = [
        FileCategory::Document,
        FileCategory::Image,
        FileCategory::Video,
        FileCategory::Audio,
        FileCategory::Archive,
        FileCategory::Executable,
    ];

    /// Extensions (lower-case, no dot) belonging to this category
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            FileCategory::Document => &["pdf", "doc", "docx", "txt", "pptx"],
            FileCategory::Image => &["jpg", "jpeg", "png", "gif", "svg"],
            FileCategory::Video => &["mp4", "avi", "mov", "mkv"],
            FileCategory::Audio => &["mp3", "wav", "flac", "aac"],
            FileCategory::Archive => &["zip", "rar", "7z", "tar"],
            FileCategory::Executable => &["exe", "msi", "app", "deb"],
        }
    }

    pub fn contains(self, extension: &str) -> bool {
        self.extensions().contains(&extension)
    }

    /// First category claiming this extension
    pub fn of_extension(extension: &str) -> Option<Self> {
        let ext = extension.to_lowercase();
        Self::ALL.into_iter().find(|c| c.contains(&ext))
    }

    pub fn id(self) -> &'static str {
        match self {
            FileCategory::Document => "document",
            FileCategory::Image => "image",
            FileCategory::Video => "video",
            FileCategory::Audio => "audio",
            FileCategory::Archive => "archive",
            FileCategory::Executable => "executable",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert_eq!(FileCategory::of_extension("PDF"), Some(FileCategory::Document));
        assert_eq!(FileCategory::of_extension("7z"), Some(FileCategory::Archive));
        assert_eq!(FileCategory::of_extension("xlsx"), None);
    }

    #[test]
    fn test_serde_ids() {
        let json = serde_json::to_string(&FileCategory::Executable).unwrap();
        assert_eq!(json, "\"executable\"");
        assert_eq!(FileCategory::Executable.id(), "executable");
    }
}
