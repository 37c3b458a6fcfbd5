//! Application error types

use thiserror::Error;

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    // ===== Recoverable Errors (notify user, continue) =====
    #[error("Path not found: {0}")]
    PathNotFound(String),

    #[error("Item not found: {0}")]
    ItemNotFound(String),

    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Upload entry not found: {0}")]
    UploadNotFound(String),

    #[error("Invalid route: {0}")]
    InvalidRoute(String),

    // ===== Fatal Errors (application termination) =====
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Initialization failed: {0}")]
    Init(String),
}

impl AppError {
    /// Is this error recoverable?
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            AppError::Storage(_) | AppError::Config(_) | AppError::Init(_)
        )
    }

    /// Is this a fatal error?
    pub fn is_fatal(&self) -> bool {
        !self.is_recoverable()
    }

    /// Get a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            AppError::PathNotFound(path) => format!("Folder not found: /{}", path.trim_start_matches('/')),
            AppError::InvalidName(msg) => format!("Invalid name: {}", msg),
            AppError::AlreadyExists(path) => format!("An item named {} already exists", path),
            AppError::Storage(_) => "Could not save your changes".to_string(),
            _ => self.to_string(),
        }
    }
}

impl From<app_fs::FsError> for AppError {
    fn from(e: app_fs::FsError) -> Self {
        match e {
            app_fs::FsError::NotFound(p) => AppError::PathNotFound(p),
            app_fs::FsError::ItemNotFound(id) => AppError::ItemNotFound(id.to_string()),
            app_fs::FsError::InvalidName(msg) => AppError::InvalidName(msg),
            app_fs::FsError::AlreadyExists(p) => AppError::AlreadyExists(p),
            app_fs::FsError::InvalidOperation(msg) => AppError::InvalidOperation(msg),
        }
    }
}

impl From<app_db::DbError> for AppError {
    fn from(e: app_db::DbError) -> Self {
        AppError::Storage(e.to_string())
    }
}
