//! FileDeck Virtual File System Layer
//!
//! Provides the in-memory model the view layer works on:
//! - Item: file/folder records keyed by `ItemId`
//! - VirtualPath: slash-delimited path handling
//! - FolderNode tree and path resolution
//! - File categories (extension sets)
//! - Name validation and collation
//! - ItemCollection: the mutator that applies rename/move/copy/delete

mod virtual_path;
mod item;
mod category;
mod tree;
mod sanitize;
mod collate;
mod collection;

pub use virtual_path::{VirtualPath, extension_of};
pub use item::{Item, ItemId, ItemKind};
pub use category::FileCategory;
pub use tree::{FolderNode, Breadcrumb, resolve, parent_of, breadcrumbs};
pub use sanitize::{validate_name, is_valid_name, copy_name, numbered_name, MAX_NAME_LEN};
pub use collate::{natural_cmp, collate_names};
pub use collection::{ItemCollection, PasteMode, StorageInfo};

use thiserror::Error;

/// Virtual file system errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FsError {
    #[error("Path not found: {0}")]
    NotFound(String),

    #[error("Item not found: {0}")]
    ItemNotFound(ItemId),

    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("Name already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

pub type Result<T> = std::result::Result<T, FsError>;
