//! Application state management

use crate::actions::{self, ContextAction, Intent, Rejected};
use crate::clipboard::{Clipboard, ClipboardOp};
use crate::filter::{self, FilterChip, FilterState, Scope, SearchResults, SortKey, Suggestion};
use crate::navigation::{NavigationOutcome, NavigationState, Route};
use crate::saved_search::{RecentQueries, SavedSearch, SavedSearchStore};
use crate::selection::{ClickModifiers, SelectionModel};
use crate::upload::{FileHandle, SubmitReport, UploadManager};
use crate::{AppConfig, AppError};
use app_db::{keys, JsonSlot, KeyValueStore, MemoryStore};
use app_fs::{numbered_name, resolve, FolderNode, Item, ItemCollection, ItemId, StorageInfo, VirtualPath};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// What the caller should do after [`AppState::perform`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Followup {
    Done,
    Navigated(NavigationOutcome),
    /// Open a dialog or modal
    Show(Route),
    /// Prompt for a name, then call `rename` or `create_folder`
    AskName { intent: Intent, current: Option<String> },
}

/// Main application state
pub struct AppState {
    config: AppConfig,
    files: JsonSlot<Vec<Item>>,
    clipboard_slot: JsonSlot<Clipboard>,

    collection: ItemCollection,
    tree: FolderNode,

    navigation: NavigationState,
    selection: SelectionModel,
    query: String,
    filters: FilterState,
    /// Sort used while browsing folders
    browse_sort: SortKey,
    /// Sort used on the search route
    search_sort: SortKey,

    saved: SavedSearchStore,
    recent: RecentQueries,
    clipboard: Option<Clipboard>,
    uploads: UploadManager,
}

impl AppState {
    /// Create a new application state over `store`
    pub fn new(config: AppConfig, store: Arc<dyn KeyValueStore>) -> Self {
        let files = JsonSlot::new(store.clone(), keys::FILES);
        let clipboard_slot = JsonSlot::new(store.clone(), keys::CLIPBOARD);

        let collection = ItemCollection::new(files.load_or_default());
        let tree = FolderNode::build(collection.items());
        let clipboard = load_clipboard(&clipboard_slot);

        let saved = SavedSearchStore::load(store.clone());
        let recent = RecentQueries::load(store, config.search.recent_limit);
        let uploads = UploadManager::simulated(config.upload.clone(), config.simulation.clone());

        tracing::info!(
            "State loaded: {} items, {} saved searches",
            collection.len(),
            saved.list().len()
        );

        Self {
            browse_sort: config.browser.sort_by,
            search_sort: config.search.sort_by,
            config,
            files,
            clipboard_slot,
            collection,
            tree,
            navigation: NavigationState::new(),
            selection: SelectionModel::new(),
            query: String::new(),
            filters: FilterState::new(),
            saved,
            recent,
            clipboard,
            uploads,
        }
    }

    /// Open the store named by the configuration
    pub fn open(config: AppConfig) -> Result<Self, AppError> {
        let store: Arc<dyn KeyValueStore> = if config.storage.in_memory {
            Arc::new(MemoryStore::new())
        } else {
            let sqlite = app_db::open(config.storage.database_path.clone())
                .map_err(|e| AppError::Init(e.to_string()))?;
            Arc::new(sqlite)
        };
        Ok(Self::new(config, store))
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn collection(&self) -> &ItemCollection {
        &self.collection
    }

    pub fn tree(&self) -> &FolderNode {
        &self.tree
    }

    pub fn navigation(&self) -> &NavigationState {
        &self.navigation
    }

    pub fn selection(&self) -> &SelectionModel {
        &self.selection
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Sort of the current view; search results and folders keep separate keys
    pub fn sort_key(&self) -> SortKey {
        if self.in_search() {
            self.search_sort
        } else {
            self.browse_sort
        }
    }

    fn in_search(&self) -> bool {
        matches!(self.navigation.current(), Route::Search { .. })
    }

    pub fn saved_searches(&self) -> &[SavedSearch] {
        self.saved.list()
    }

    pub fn recent_queries(&self) -> &[String] {
        self.recent.list()
    }

    pub fn clipboard(&self) -> Option<&Clipboard> {
        self.clipboard.as_ref()
    }

    pub fn uploads(&self) -> &UploadManager {
        &self.uploads
    }

    pub fn current_folder(&self) -> VirtualPath {
        self.navigation.current_folder()
    }

    pub fn storage_info(&self) -> StorageInfo {
        self.collection.storage_info(self.config.browser.storage_capacity)
    }

    // ===== Navigation =====

    /// Go to `route`. A folder that does not exist falls back to the root.
    pub fn navigate(&mut self, route: Route) -> NavigationOutcome {
        let missing = route
            .folder()
            .filter(|folder| resolve(&self.tree, &folder.display()).is_err())
            .map(VirtualPath::display);

        let (route, outcome) = match missing {
            Some(requested) => {
                tracing::warn!("Folder /{} not found, showing root", requested);
                (
                    route.with_folder(VirtualPath::root()),
                    NavigationOutcome::FellBackToRoot { requested },
                )
            }
            None => (route, NavigationOutcome::Arrived),
        };

        self.navigation.navigate_to(route);
        self.enter_current_route();
        outcome
    }

    pub fn open_folder(&mut self, path: &str) -> NavigationOutcome {
        let route = self.navigation.current().with_folder(VirtualPath::new(path));
        self.navigate(route)
    }

    pub fn go_back(&mut self) -> bool {
        let moved = self.navigation.go_back();
        if moved {
            self.enter_current_route();
        }
        moved
    }

    pub fn go_forward(&mut self) -> bool {
        let moved = self.navigation.go_forward();
        if moved {
            self.enter_current_route();
        }
        moved
    }

    /// The search box follows the route: its `q` on search, empty elsewhere
    fn enter_current_route(&mut self) {
        self.query = match self.navigation.current() {
            Route::Search { query } => query.clone(),
            _ => String::new(),
        };
        self.selection.clear();
    }

    // ===== Search & filters =====

    fn scope(&self) -> Scope {
        match self.navigation.current() {
            Route::Search { .. } => Scope::Everywhere,
            _ => Scope::Folder(self.current_folder()),
        }
    }

    /// Items shown right now
    pub fn visible(&self) -> SearchResults {
        self.visible_at(&Utc::now())
    }

    pub fn visible_at(&self, now: &DateTime<Utc>) -> SearchResults {
        filter::apply(
            self.collection.items(),
            &self.scope(),
            &self.query,
            &self.filters,
            self.sort_key(),
            now,
        )
    }

    fn prune_selection(&mut self) {
        let ids = self.visible().ids();
        self.selection.retain_visible(&ids);
    }

    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
        self.prune_selection();
    }

    /// Run a search from the search box: remembers the query and switches to search mode
    pub fn submit_search(&mut self, query: &str) -> Result<(), AppError> {
        self.recent.push(query)?;
        self.navigate(Route::Search {
            query: query.trim().to_string(),
        });
        Ok(())
    }

    pub fn suggestions(&self) -> Vec<Suggestion> {
        filter::suggestions(self.collection.items(), &self.query, self.config.search.suggestion_limit)
    }

    /// Change the sort of the current view
    pub fn set_sort(&mut self, key: SortKey) {
        if self.in_search() {
            self.search_sort = key;
        } else {
            self.browse_sort = key;
        }
    }

    pub fn toggle_filter(&mut self, chip: FilterChip) {
        self.filters.toggle(chip);
        self.prune_selection();
    }

    pub fn remove_filter(&mut self, chip: &FilterChip) {
        self.filters.remove(chip);
        self.prune_selection();
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
        self.prune_selection();
    }

    pub fn save_search(&mut self, name: &str) -> Result<SavedSearch, AppError> {
        self.saved.save(name, &self.query, &self.filters, Utc::now())
    }

    /// Restore the query and filters of a saved search
    pub fn load_search(&mut self, id: &str) -> Result<(), AppError> {
        let search = self
            .saved
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::InvalidOperation(format!("no saved search {}", id)))?;
        self.filters = search.filters;
        self.navigate(Route::Search { query: search.query });
        Ok(())
    }

    pub fn delete_search(&mut self, id: &str) -> Result<bool, AppError> {
        self.saved.delete(id)
    }

    // ===== Selection =====

    pub fn click(&mut self, id: ItemId, modifiers: ClickModifiers) {
        let ordered = self.visible().ids();
        self.selection.click(id, modifiers, &ordered);
    }

    pub fn select_all(&mut self) {
        let ordered = self.visible().ids();
        self.selection.select_all(&ordered);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    // ===== Actions =====

    pub fn is_enabled(&self, action: ContextAction) -> bool {
        actions::is_enabled(action, &self.selection, self.clipboard.as_ref())
    }

    pub fn dispatch(&self, action: ContextAction) -> Result<Intent, Rejected> {
        actions::dispatch(action, &self.selection, self.clipboard.as_ref())
    }

    /// Carry out a dispatched intent. Delete is assumed confirmed.
    pub fn perform(&mut self, intent: Intent, now: DateTime<Utc>) -> Result<Followup, AppError> {
        match intent {
            Intent::Open(id) => {
                let item = self.item(id)?;
                if item.is_folder() {
                    let path = item.full_path().display();
                    Ok(Followup::Navigated(self.open_folder(&path)))
                } else {
                    Ok(Followup::Show(Route::Preview { item: Some(id) }))
                }
            }
            Intent::ShowProperties(id) => {
                self.item(id)?;
                Ok(Followup::Show(Route::Properties { item: Some(id) }))
            }
            Intent::Rename(id) => {
                let current = Some(self.item(id)?.name.clone());
                Ok(Followup::AskName { intent, current })
            }
            Intent::NewFolder => Ok(Followup::AskName { intent, current: None }),
            Intent::Cut(ids) => {
                self.set_clipboard(ClipboardOp::Move, &ids)?;
                Ok(Followup::Done)
            }
            Intent::Copy(ids) => {
                self.set_clipboard(ClipboardOp::Copy, &ids)?;
                Ok(Followup::Done)
            }
            Intent::Paste { mode, ids } => {
                let target = self.current_folder().display();
                let pasted = self.collection.paste(&ids, mode, &target, now)?;
                if mode == app_fs::PasteMode::Move {
                    self.clipboard = None;
                    self.clipboard_slot.clear()?;
                }
                tracing::info!("Pasted {} items into /{}", pasted, target);
                self.commit()?;
                Ok(Followup::Done)
            }
            Intent::Delete(ids) => {
                self.delete(&ids)?;
                Ok(Followup::Done)
            }
        }
    }

    fn item(&self, id: ItemId) -> Result<&Item, AppError> {
        self.collection
            .get(id)
            .ok_or_else(|| AppError::ItemNotFound(id.to_string()))
    }

    fn set_clipboard(&mut self, operation: ClipboardOp, ids: &[ItemId]) -> Result<(), AppError> {
        let files: Vec<Item> = ids
            .iter()
            .filter_map(|id| self.collection.get(*id).cloned())
            .collect();
        let clipboard = Clipboard::new(operation, files);
        self.clipboard_slot.save(&clipboard)?;
        tracing::debug!("Clipboard: {:?} x{}", operation, clipboard.files.len());
        self.clipboard = Some(clipboard);
        Ok(())
    }

    pub fn rename(&mut self, id: ItemId, new_name: &str, now: DateTime<Utc>) -> Result<(), AppError> {
        self.collection.rename(id, new_name, now)?;
        self.commit()
    }

    /// Create a folder in the current folder
    pub fn create_folder(&mut self, name: &str, now: DateTime<Utc>) -> Result<ItemId, AppError> {
        let parent = self.current_folder().display();
        let id = self.collection.create_folder(&parent, name, now)?;
        self.commit()?;
        Ok(id)
    }

    pub fn delete(&mut self, ids: &[ItemId]) -> Result<usize, AppError> {
        let removed = self.collection.delete(ids);
        self.selection.clear();
        self.commit()?;
        Ok(removed.len())
    }

    // ===== Uploads =====

    /// Queue files for the configured target folder. Needs a tokio runtime.
    pub fn upload(&self, files: Vec<FileHandle>) -> Result<SubmitReport, AppError> {
        let target = VirtualPath::new(&self.uploads.settings().target_path());
        if !self.collection.folder_exists(&target) {
            return Err(AppError::PathNotFound(target.display()));
        }
        let existing = self.collection.names_in(&target);
        Ok(self.uploads.submit(files, &existing))
    }

    /// Add finished uploads to the collection; returns how many were added.
    ///
    /// An upload that cannot be added stays pending and is tried again on
    /// the next call.
    pub fn commit_uploads(&mut self, now: DateTime<Utc>) -> Result<usize, AppError> {
        let completed = self.uploads.uncommitted();
        if completed.is_empty() {
            return Ok(0);
        }

        let overwrite = self.uploads.settings().overwrite_existing;
        let mut added = 0;
        for entry in &completed {
            let target = VirtualPath::new(&entry.target);
            let clash = self
                .collection
                .children_of(&target)
                .into_iter()
                .find(|i| i.name == entry.name)
                .map(|i| !(overwrite && !i.is_folder()));
            let name = match clash {
                Some(true) => {
                    let taken = self.collection.names_in(&target);
                    numbered_name(&entry.name, |n| taken.contains(n))
                }
                _ => entry.name.clone(),
            };

            match self.collection.add_file(&name, entry.size, &entry.target, now) {
                Ok(_) => {
                    if name != entry.name {
                        tracing::info!("Upload {} stored as {}", entry.name, name);
                    }
                    self.uploads.mark_committed(entry);
                    added += 1;
                }
                Err(e) => tracing::warn!("Could not add upload {} yet: {}", entry.name, e),
            }
        }

        if added > 0 {
            self.commit()?;
        }
        Ok(added)
    }

    /// Rebuild the folder tree and write the collection back
    fn commit(&mut self) -> Result<(), AppError> {
        self.tree = FolderNode::build(self.collection.items());
        self.files.save(&self.collection.items().to_vec())?;
        Ok(())
    }
}

fn load_clipboard(slot: &JsonSlot<Clipboard>) -> Option<Clipboard> {
    match slot.load() {
        Ok(clipboard) => clipboard.filter(|c| !c.is_empty()),
        Err(e) => {
            tracing::warn!("Discarding unreadable clipboard: {}", e);
            None
        }
    }
}
