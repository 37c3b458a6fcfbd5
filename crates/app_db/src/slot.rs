//! Typed repository over one key

use crate::{KeyValueStore, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use std::sync::Arc;

/// Loads and saves one JSON-encoded value of type `T` under a fixed key
pub struct JsonSlot<T> {
    store: Arc<dyn KeyValueStore>,
    key: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for JsonSlot<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            key: self.key,
            _marker: PhantomData,
        }
    }
}

impl<T: Serialize + DeserializeOwned> JsonSlot<T> {
    pub fn new(store: Arc<dyn KeyValueStore>, key: &'static str) -> Self {
        Self {
            store,
            key,
            _marker: PhantomData,
        }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Load the stored value, `None` if the key was never written
    pub fn load(&self) -> Result<Option<T>> {
        match self.store.get(self.key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Load, falling back to `T::default()` when absent or unreadable
    pub fn load_or_default(&self) -> T
    where
        T: Default,
    {
        match self.load() {
            Ok(Some(value)) => value,
            Ok(None) => T::default(),
            Err(e) => {
                tracing::warn!("Discarding unreadable {}: {}", self.key, e);
                T::default()
            }
        }
    }

    /// Overwrite the stored value
    pub fn save(&self, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.store.put(self.key, &raw)
    }

    pub fn clear(&self) -> Result<bool> {
        self.store.remove(self.key)
    }
}
