//! Keyed registries for jobs and models
//!
//! Both registries live for the process lifetime and are not persisted.
//! Handlers depend on the [`Store`] trait so that a durable backend can be
//! dropped in without touching feature code.

use async_trait::async_trait;
use std::collections::{hash_map::Entry, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-place modification applied by [`Store::update`]
pub type Change<V> = Box<dyn FnOnce(&mut V) + Send>;

/// Concurrent key-value registry
///
/// Implementations must allow many concurrent readers and serialize writers.
#[async_trait]
pub trait Store<V>: Send + Sync
where
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &str) -> Option<V>;

    /// Insert or replace. Returns the previous value, if any.
    async fn put(&self, key: String, value: V) -> Option<V>;

    /// Insert only if `key` is vacant. Returns `false` when it was taken.
    async fn insert_new(&self, key: String, value: V) -> bool;

    /// Modify the value under `key` in place, as one write. Returns the
    /// modified value, or `None` when the key is absent.
    async fn update(&self, key: &str, change: Change<V>) -> Option<V>;

    /// Remove a key. Returns the removed value, if any.
    async fn delete(&self, key: &str) -> Option<V>;

    /// Snapshot of every value, ordered by key.
    async fn list(&self) -> Vec<V>;

    async fn contains(&self, key: &str) -> bool {
        self.get(key).await.is_some()
    }
}

/// In-memory [`Store`] guarded by a reader/writer lock
pub struct MemoryStore<V> {
    entries: RwLock<HashMap<String, V>>,
}

impl<V> MemoryStore<V> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Convenience constructor for wiring into shared state.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl<V> Default for MemoryStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<V> Store<V> for MemoryStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &str) -> Option<V> {
        self.entries.read().await.get(key).cloned()
    }

    async fn put(&self, key: String, value: V) -> Option<V> {
        self.entries.write().await.insert(key, value)
    }

    async fn insert_new(&self, key: String, value: V) -> bool {
        match self.entries.write().await.entry(key) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(value);
                true
            },
        }
    }

    async fn update(&self, key: &str, change: Change<V>) -> Option<V> {
        let mut entries = self.entries.write().await;
        let value = entries.get_mut(key)?;
        change(value);
        Some(value.clone())
    }

    async fn delete(&self, key: &str) -> Option<V> {
        self.entries.write().await.remove(key)
    }

    async fn list(&self) -> Vec<V> {
        let entries = self.entries.read().await;
        let mut keys: Vec<&String> = entries.keys().collect();
        keys.sort();
        keys.into_iter().filter_map(|k| entries.get(k).cloned()).collect()
    }

    async fn contains(&self, key: &str) -> bool {
        self.entries.read().await.contains_key(key)
    }
}
