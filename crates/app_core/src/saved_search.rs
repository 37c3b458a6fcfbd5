//! Saved searches and the recent-query list

use crate::filter::FilterState;
use crate::AppError;
use app_db::{keys, JsonSlot, KeyValueStore};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedSearch {
    /// Millisecond timestamp of creation, as a string
    pub id: String,
    pub name: String,
    pub query: String,
    #[serde(default)]
    pub filters: FilterState,
    pub created_at: DateTime<Utc>,
}

/// Saved searches, written back in full after every change
pub struct SavedSearchStore {
    slot: JsonSlot<Vec<SavedSearch>>,
    searches: Vec<SavedSearch>,
}

impl SavedSearchStore {
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let slot: JsonSlot<Vec<SavedSearch>> = JsonSlot::new(store, keys::SAVED_SEARCHES);
        let searches = slot.load_or_default();
        tracing::debug!("Loaded {} saved searches", searches.len());
        Self { slot, searches }
    }

    /// Oldest first
    pub fn list(&self) -> &[SavedSearch] {
        &self.searches
    }

    pub fn get(&self, id: &str) -> Option<&SavedSearch> {
        self.searches.iter().find(|s| s.id == id)
    }

    pub fn save(
        &mut self,
        name: &str,
        query: &str,
        filters: &FilterState,
        now: DateTime<Utc>,
    ) -> Result<SavedSearch, AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::InvalidName("a saved search needs a name".to_string()));
        }
        if query.trim().is_empty() && filters.is_empty() {
            return Err(AppError::InvalidOperation("nothing to save: no query or filters".to_string()));
        }

        let search = SavedSearch {
            id: self.next_id(now).to_string(),
            name: name.to_string(),
            query: query.trim().to_string(),
            filters: filters.clone(),
            created_at: now,
        };

        self.searches.push(search.clone());
        self.slot.save(&self.searches)?;
        tracing::info!("Saved search {:?} ({})", search.name, search.id);
        Ok(search)
    }

    /// Returns false if no search had this id
    pub fn delete(&mut self, id: &str) -> Result<bool, AppError> {
        let before = self.searches.len();
        self.searches.retain(|s| s.id != id);
        if self.searches.len() == before {
            return Ok(false);
        }
        self.slot.save(&self.searches)?;
        Ok(true)
    }

    // Clock milliseconds, bumped past the newest existing id on collision
    fn next_id(&self, now: DateTime<Utc>) -> u64 {
        let clock = u64::try_from(now.timestamp_millis()).unwrap_or(0);
        let newest = self
            .searches
            .iter()
            .filter_map(|s| s.id.parse::<u64>().ok())
            .max();
        match newest {
            Some(last) if last >= clock => last + 1,
            _ => clock,
        }
    }
}

/// Most recent queries first, without duplicates
pub struct RecentQueries {
    slot: JsonSlot<Vec<String>>,
    queries: Vec<String>,
    limit: usize,
}

impl RecentQueries {
    pub fn load(store: Arc<dyn KeyValueStore>, limit: usize) -> Self {
        let slot = JsonSlot::new(store, keys::RECENT_QUERIES);
        let mut queries: Vec<String> = slot.load_or_default();
        queries.truncate(limit);
        Self { slot, queries, limit }
    }

    pub fn list(&self) -> &[String] {
        &self.queries
    }

    /// Move `query` to the front; blank queries are ignored
    pub fn push(&mut self, query: &str) -> Result<(), AppError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(());
        }

        self.queries.retain(|q| q != query);
        self.queries.insert(0, query.to_string());
        self.queries.truncate(self.limit);
        self.slot.save(&self.queries)?;
        Ok(())
    }

    pub fn clear(&mut self) -> Result<(), AppError> {
        self.queries.clear();
        self.slot.save(&self.queries)?;
        Ok(())
    }
}
