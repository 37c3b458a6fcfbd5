//! Context-menu and toolbar actions
//!
//! [`dispatch`] checks an action's selection requirements and turns it into
//! an [`Intent`] for the caller to carry out. The UI greys out actions for
//! which [`is_enabled`] is false, so [`Rejected`] mostly reaches scripted
//! callers.

use crate::clipboard::Clipboard;
use crate::selection::SelectionModel;
use app_fs::{ItemId, PasteMode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContextAction {
    Open,
    Rename,
    Properties,
    Cut,
    Copy,
    Paste,
    Delete,
    NewFolder,
}

/// What an action needs before it can run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    ExactlyOne,
    AtLeastOne,
    Clipboard,
    Nothing,
}

impl ContextAction {
    pub const ALL: [ContextAction; 8] = [
        ContextAction::Open,
        ContextAction::Rename,
        ContextAction::Properties,
        ContextAction::Cut,
        ContextAction::Copy,
        ContextAction::Paste,
        ContextAction::Delete,
        ContextAction::NewFolder,
    ];

    // Command ids, as used by key bindings
    pub const FILE_OPEN: &'static str = "file.open";
    pub const FILE_RENAME: &'static str = "file.rename";
    pub const FILE_PROPERTIES: &'static str = "file.properties";
    pub const FILE_CUT: &'static str = "file.cut";
    pub const FILE_COPY: &'static str = "file.copy";
    pub const FILE_PASTE: &'static str = "file.paste";
    pub const FILE_DELETE: &'static str = "file.delete";
    pub const FILE_NEW_FOLDER: &'static str = "file.new_folder";

    pub fn id(self) -> &'static str {
        match self {
            ContextAction::Open => Self::FILE_OPEN,
            ContextAction::Rename => Self::FILE_RENAME,
            ContextAction::Properties => Self::FILE_PROPERTIES,
            ContextAction::Cut => Self::FILE_CUT,
            ContextAction::Copy => Self::FILE_COPY,
            ContextAction::Paste => Self::FILE_PASTE,
            ContextAction::Delete => Self::FILE_DELETE,
            ContextAction::NewFolder => Self::FILE_NEW_FOLDER,
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.id() == id)
    }

    pub fn requirement(self) -> Requirement {
        match self {
            ContextAction::Open | ContextAction::Rename | ContextAction::Properties => Requirement::ExactlyOne,
            ContextAction::Cut | ContextAction::Copy | ContextAction::Delete => Requirement::AtLeastOne,
            ContextAction::Paste => Requirement::Clipboard,
            ContextAction::NewFolder => Requirement::Nothing,
        }
    }
}

/// A dispatched action, ready to be carried out
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Open(ItemId),
    /// Ask for a new name for this item
    Rename(ItemId),
    ShowProperties(ItemId),
    Cut(Vec<ItemId>),
    Copy(Vec<ItemId>),
    Paste { mode: PasteMode, ids: Vec<ItemId> },
    /// Confirm, then delete
    Delete(Vec<ItemId>),
    /// Ask for a folder name
    NewFolder,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejected {
    #[error("{action} needs exactly one selected item ({selected} selected)")]
    NeedsSingle { action: &'static str, selected: usize },

    #[error("{action} needs a selection")]
    NeedsSelection { action: &'static str },

    #[error("Clipboard is empty")]
    EmptyClipboard,
}

/// Check preconditions and build the intent
pub fn dispatch(
    action: ContextAction,
    selection: &SelectionModel,
    clipboard: Option<&Clipboard>,
) -> Result<Intent, Rejected> {
    let result = match action.requirement() {
        Requirement::ExactlyOne => {
            let id = selection.single().ok_or(Rejected::NeedsSingle {
                action: action.id(),
                selected: selection.len(),
            })?;
            match action {
                ContextAction::Open => Intent::Open(id),
                ContextAction::Rename => Intent::Rename(id),
                _ => Intent::ShowProperties(id),
            }
        }
        Requirement::AtLeastOne => {
            if selection.is_empty() {
                return Err(Rejected::NeedsSelection { action: action.id() });
            }
            let ids = selection.ids();
            match action {
                ContextAction::Cut => Intent::Cut(ids),
                ContextAction::Copy => Intent::Copy(ids),
                _ => Intent::Delete(ids),
            }
        }
        Requirement::Clipboard => match clipboard {
            Some(clip) if !clip.is_empty() => Intent::Paste {
                mode: clip.mode(),
                ids: clip.ids(),
            },
            _ => return Err(Rejected::EmptyClipboard),
        },
        Requirement::Nothing => Intent::NewFolder,
    };

    tracing::debug!("Dispatched {}", action.id());
    Ok(result)
}

/// Would `dispatch` accept this action right now?
pub fn is_enabled(action: ContextAction, selection: &SelectionModel, clipboard: Option<&Clipboard>) -> bool {
    match action.requirement() {
        Requirement::ExactlyOne => selection.len() == 1,
        Requirement::AtLeastOne => !selection.is_empty(),
        Requirement::Clipboard => clipboard.is_some_and(|c| !c.is_empty()),
        Requirement::Nothing => true,
    }
}
