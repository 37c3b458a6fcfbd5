//! Cut/copy clipboard, persisted between sessions

use app_fs::{Item, ItemId, PasteMode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClipboardOp {
    #[serde(rename = "copy")]
    Copy,
    #[serde(rename = "move")]
    Move,
}

impl From<ClipboardOp> for PasteMode {
    fn from(op: ClipboardOp) -> Self {
        match op {
            ClipboardOp::Copy => PasteMode::Copy,
            ClipboardOp::Move => PasteMode::Move,
        }
    }
}

/// Items waiting to be pasted, stored as full records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clipboard {
    pub operation: ClipboardOp,
    pub files: Vec<Item>,
}

impl Clipboard {
    pub fn new(operation: ClipboardOp, files: Vec<Item>) -> Self {
        Self { operation, files }
    }

    pub fn ids(&self) -> Vec<ItemId> {
        self.files.iter().map(|f| f.id).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn mode(&self) -> PasteMode {
        self.operation.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_stored_layout() {
        let clip = Clipboard::new(ClipboardOp::Move, vec![Item::file(4, "a.txt", 1, "", Utc::now())]);
        let json = serde_json::to_value(&clip).unwrap();
        assert_eq!(json["operation"], "move");
        assert_eq!(json["files"][0]["name"], "a.txt");
        assert_eq!(clip.mode(), PasteMode::Move);
        assert_eq!(clip.ids(), vec![ItemId(4)]);
    }
}
