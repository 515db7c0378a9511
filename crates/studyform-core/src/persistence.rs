//! Persistence port for session state.
//!
//! The core never touches storage directly: it reads and writes opaque bytes
//! under two well-known keys through a [`StateStore`].

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use anyhow::{Context, Result};
use uuid::Uuid;

use crate::session::SessionState;

/// Key holding the in-progress session.
pub const ACTIVE_STATE_KEY: &str = "activeState";
/// Key holding the saved-session collection.
pub const SAVED_STATES_KEY: &str = "savedStates";

/// Key-value storage for serialized state.
pub trait StateStore: Send + Sync {
    /// Read the bytes stored under `key`, if any.
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Replace the bytes stored under `key`.
    fn save(&self, key: &str, bytes: &[u8]) -> Result<()>;

    /// Delete `key`; missing keys are not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

/// Load the in-progress session, if one was stored.
pub fn load_active(store: &dyn StateStore) -> Result<Option<SessionState>> {
    match store.load(ACTIVE_STATE_KEY)? {
        Some(bytes) => {
            let state: SessionState =
                serde_json::from_slice(&bytes).context("failed to parse active state")?;
            Ok(Some(SessionState::restore(state)))
        }
        None => Ok(None),
    }
}

pub fn save_active(store: &dyn StateStore, state: &SessionState) -> Result<()> {
    let bytes = serde_json::to_vec(state).context("failed to serialize active state")?;
    store.save(ACTIVE_STATE_KEY, &bytes)?;
    tracing::debug!(session = %state.id, "saved active state");
    Ok(())
}

pub fn clear_active(store: &dyn StateStore) -> Result<()> {
    store.remove(ACTIVE_STATE_KEY)
}

/// The saved-session collection, unique by session id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SavedStates {
    states: Vec<SessionState>,
}

impl SavedStates {
    /// Read the whole collection; a missing key is an empty collection.
    pub fn load(store: &dyn StateStore) -> Result<Self> {
        let states = match store.load(SAVED_STATES_KEY)? {
            Some(bytes) => {
                serde_json::from_slice(&bytes).context("failed to parse saved states")?
            }
            None => Vec::new(),
        };
        Ok(Self { states })
    }

    /// Write the whole collection back.
    pub fn commit(&self, store: &dyn StateStore) -> Result<()> {
        let bytes =
            serde_json::to_vec_pretty(&self.states).context("failed to serialize saved states")?;
        store.save(SAVED_STATES_KEY, &bytes)
    }

    /// Read-modify-write the collection in one step.
    pub fn update<T>(store: &dyn StateStore, f: impl FnOnce(&mut SavedStates) -> T) -> Result<T> {
        let mut saved = Self::load(store)?;
        let out = f(&mut saved);
        saved.commit(store)?;
        Ok(out)
    }

    pub fn list(&self) -> &[SessionState] {
        &self.states
    }

    pub fn get(&self, id: Uuid) -> Option<&SessionState> {
        self.states.iter().find(|s| s.id == id)
    }

    /// Replace the entry with the same session id, or append a new one.
    /// Returns `true` when an existing entry was replaced.
    pub fn upsert(&mut self, state: SessionState) -> bool {
        match self.states.iter_mut().find(|s| s.id == state.id) {
            Some(existing) => {
                *existing = state;
                true
            }
            None => {
                self.states.push(state);
                false
            }
        }
    }

    /// Remove the entry with `id`. Returns `false` if there was none.
    pub fn delete(&mut self, id: Uuid) -> bool {
        let before = self.states.len();
        self.states.retain(|s| s.id != id);
        before != self.states.len()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

/// In-memory store for tests and embedding.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
    save_count: AtomicU32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `save` calls made so far.
    pub fn save_count(&self) -> u32 {
        self.save_count.load(Ordering::Relaxed)
    }

    fn entries(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>>> {
        self.entries
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))
    }
}

impl StateStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn save(&self, key: &str, bytes: &[u8]) -> Result<()> {
        self.save_count.fetch_add(1, Ordering::Relaxed);
        self.entries()?.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries()?.remove(key);
        Ok(())
    }
}
