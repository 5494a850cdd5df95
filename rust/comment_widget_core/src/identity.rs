//! Locally remembered identity for anonymous commenters.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::StorageError;

/// Storage key the identity record lives under.
pub const IDENTITY_KEY: &str = "halo-comment-custom-account";

/// Minimal string key/value storage, e.g. the browser's `localStorage`.
pub trait KeyValueStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-process storage, used natively and in tests.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self { Self::default() }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AnonymousIdentity {
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

impl AnonymousIdentity {
    fn normalized(mut self) -> Self {
        if self.website.as_deref().is_some_and(|w| w.trim().is_empty()) {
            self.website = None;
        }
        self
    }
}

/// Reads and writes the [`AnonymousIdentity`] record. Never fails: unreadable
/// records come back empty and failed writes are logged and dropped.
pub struct IdentityStore {
    storage: Rc<dyn KeyValueStorage>,
    cache: RefCell<Option<AnonymousIdentity>>,
}

impl fmt::Debug for IdentityStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityStore").field("cache", &self.cache).finish_non_exhaustive()
    }
}

impl IdentityStore {
    pub fn new(storage: Rc<dyn KeyValueStorage>) -> Self {
        Self { storage, cache: RefCell::new(None) }
    }

    pub fn in_memory() -> Self { Self::new(Rc::new(MemoryStorage::new())) }

    pub fn get(&self) -> AnonymousIdentity {
        if let Some(cached) = self.cache.borrow().as_ref() {
            return cached.clone();
        }
        let loaded = self.load();
        *self.cache.borrow_mut() = Some(loaded.clone());
        loaded
    }

    pub fn set(&self, identity: AnonymousIdentity) {
        let identity = identity.normalized();
        match serde_json::to_string(&identity) {
            Ok(json) => {
                if let Err(err) = self.storage.set_item(IDENTITY_KEY, &json) {
                    tracing::warn!(error = %err, "could not persist anonymous identity");
                }
            }
            Err(err) => tracing::warn!(error = %err, "could not encode anonymous identity"),
        }
        *self.cache.borrow_mut() = Some(identity);
    }

    fn load(&self) -> AnonymousIdentity {
        let raw = match self.storage.get_item(IDENTITY_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return AnonymousIdentity::default(),
            Err(err) => {
                tracing::debug!(error = %err, "identity storage unavailable");
                return AnonymousIdentity::default();
            }
        };
        serde_json::from_str::<AnonymousIdentity>(&raw)
            .map(AnonymousIdentity::normalized)
            .unwrap_or_else(|err| {
                tracing::debug!(error = %err, "ignoring unreadable identity record");
                AnonymousIdentity::default()
            })
    }
}
