//! Routes and navigation history

use crate::AppError;
use app_fs::{ItemId, VirtualPath};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::fmt;

/// A screen of the application, with its query parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Folder browser (`?folder=` or `?path=`)
    Dashboard { folder: VirtualPath },
    FolderManagement { path: VirtualPath },
    Upload { folder: VirtualPath },
    Search { query: String },
    Properties { item: Option<ItemId> },
    Preview { item: Option<ItemId> },
}

impl Route {
    pub const DASHBOARD: &'static str = "/file-manager-dashboard";
    pub const FOLDER_MANAGEMENT: &'static str = "/folder-management-interface";
    pub const UPLOAD: &'static str = "/file-upload-interface";
    pub const SEARCH: &'static str = "/search-and-filter-interface";
    pub const PROPERTIES: &'static str = "/file-properties-dialog";
    pub const PREVIEW: &'static str = "/file-preview-modal";

    pub fn dashboard(folder: &str) -> Self {
        Route::Dashboard {
            folder: VirtualPath::new(folder),
        }
    }

    /// Parse "/path?key=value&..." as produced by links and the address bar
    pub fn parse(url: &str) -> Result<Self, AppError> {
        let (path, query) = url.split_once('?').unwrap_or((url, ""));
        let params: Vec<(String, String)> = query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
                (decode(k), decode(v))
            })
            .collect();
        let param = |key: &str| {
            params
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };
        let item = || param("fileId").and_then(|v| v.parse().ok()).map(ItemId);

        let route = match path.trim_end_matches('/') {
            "" | Self::DASHBOARD => Route::Dashboard {
                folder: VirtualPath::new(param("folder").or(param("path")).unwrap_or("")),
            },
            Self::FOLDER_MANAGEMENT => Route::FolderManagement {
                path: VirtualPath::new(param("path").unwrap_or("")),
            },
            Self::UPLOAD => Route::Upload {
                folder: VirtualPath::new(param("folder").unwrap_or("")),
            },
            Self::SEARCH => Route::Search {
                query: param("q").unwrap_or("").to_string(),
            },
            Self::PROPERTIES => Route::Properties { item: item() },
            Self::PREVIEW => Route::Preview { item: item() },
            other => return Err(AppError::InvalidRoute(other.to_string())),
        };
        Ok(route)
    }

    /// Folder this route is scoped to, if any
    pub fn folder(&self) -> Option<&VirtualPath> {
        match self {
            Route::Dashboard { folder } | Route::Upload { folder } => Some(folder),
            Route::FolderManagement { path } => Some(path),
            _ => None,
        }
    }

    /// Same route pointed at another folder
    pub fn with_folder(&self, folder: VirtualPath) -> Self {
        match self {
            Route::Upload { .. } => Route::Upload { folder },
            Route::FolderManagement { .. } => Route::FolderManagement { path: folder },
            _ => Route::Dashboard { folder },
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn with_param(f: &mut fmt::Formatter<'_>, base: &str, key: &str, value: &str) -> fmt::Result {
            if value.is_empty() {
                write!(f, "{}", base)
            } else {
                write!(f, "{}?{}={}", base, key, encode(value))
            }
        }

        match self {
            Route::Dashboard { folder } => with_param(f, Self::DASHBOARD, "folder", &folder.display()),
            Route::FolderManagement { path } => with_param(f, Self::FOLDER_MANAGEMENT, "path", &path.display()),
            Route::Upload { folder } => with_param(f, Self::UPLOAD, "folder", &folder.display()),
            Route::Search { query } => with_param(f, Self::SEARCH, "q", query),
            Route::Properties { item } => {
                with_param(f, Self::PROPERTIES, "fileId", &item.map(|i| i.0.to_string()).unwrap_or_default())
            }
            Route::Preview { item } => {
                with_param(f, Self::PREVIEW, "fileId", &item.map(|i| i.0.to_string()).unwrap_or_default())
            }
        }
    }
}

/// Everything except unreserved characters and '/'
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'/');

/// Decode `%XX` escapes and `+`. Malformed escapes are kept as-is.
fn decode(raw: &str) -> String {
    percent_decode_str(&raw.replace('+', " "))
        .decode_utf8_lossy()
        .into_owned()
}

fn encode(value: &str) -> String {
    utf8_percent_encode(value, QUERY_VALUE).to_string()
}

/// Result of navigating to a folder route
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    Arrived,
    /// The folder did not exist; the root is shown instead
    FellBackToRoot { requested: String },
}

/// Current route plus back/forward history
#[derive(Debug, Clone)]
pub struct NavigationState {
    current: Route,

    /// Navigation history stack
    history: Vec<Route>,

    /// Forward stack (for redo)
    forward: Vec<Route>,
}

impl NavigationState {
    pub fn new() -> Self {
        Self {
            current: Route::dashboard(""),
            history: Vec::new(),
            forward: Vec::new(),
        }
    }

    pub fn current(&self) -> &Route {
        &self.current
    }

    /// Folder shown by the current route (root for non-folder routes)
    pub fn current_folder(&self) -> VirtualPath {
        self.current.folder().cloned().unwrap_or_default()
    }

    /// Navigate to a new route. Re-entering the current route is a no-op.
    pub fn navigate_to(&mut self, route: Route) {
        if route == self.current {
            return;
        }

        // Save current to history
        let old = std::mem::replace(&mut self.current, route);
        self.history.push(old);

        // Clear forward stack
        self.forward.clear();
    }

    /// Go back in history
    pub fn go_back(&mut self) -> bool {
        if let Some(prev) = self.history.pop() {
            let current = std::mem::replace(&mut self.current, prev);
            self.forward.push(current);
            true
        } else {
            false
        }
    }

    /// Go forward in history
    pub fn go_forward(&mut self) -> bool {
        if let Some(next) = self.forward.pop() {
            let current = std::mem::replace(&mut self.current, next);
            self.history.push(current);
            true
        } else {
            false
        }
    }

    pub fn can_go_back(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn can_go_forward(&self) -> bool {
        !self.forward.is_empty()
    }
}

impl Default for NavigationState {
    fn default() -> Self {
        Self::new()
    }
}
