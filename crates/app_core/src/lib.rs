//! FileDeck Core Domain Logic
//!
//! This crate contains:
//! - Application state (`AppState`) tying the pieces together
//! - Selection, search/filter/sort, context actions
//! - Upload queue with pluggable transport
//! - Saved searches, recent queries, clipboard
//! - Routes and navigation history
//! - Configuration and error types

pub mod actions;
pub mod clipboard;
pub mod config;
pub mod error;
pub mod filter;
pub mod navigation;
pub mod saved_search;
pub mod selection;
pub mod state;
pub mod upload;

pub use actions::{dispatch, is_enabled, ContextAction, Intent, Rejected};
pub use clipboard::{Clipboard, ClipboardOp};
pub use config::{
    AppConfig, BrowserConfig, GeneralConfig, ImageQuality, SearchConfig, SimulationConfig,
    StorageConfig, UploadSettings, ViewMode,
};
pub use error::AppError;
pub use filter::{DateBucket, FilterChip, FilterState, Scope, SearchResults, SizeBucket, SortKey, Suggestion};
pub use navigation::{NavigationOutcome, NavigationState, Route};
pub use saved_search::{RecentQueries, SavedSearch, SavedSearchStore};
pub use selection::{ClickModifiers, SelectionModel};
pub use state::{AppState, Followup};
pub use upload::{
    FileHandle, RetryMode, SimulatedTransport, SubmitReport, UploadEntry, UploadManager,
    UploadStatus, UploadTransport, ValidationError, ValidationKind,
};
