//! In-memory recipe cache.
//!
//! One materialization of the user's recipe collection exists per service
//! instance: a list slot plus per-id entry slots, both derived, invalidatable
//! copies of the remote store. Only the mutation service writes here — the
//! cache itself has no opinions about consistency beyond what its entry
//! points express (read, write, snapshot/restore, invalidate).

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use vault_core::Recipe;

#[derive(Debug, Clone, Default)]
struct CacheState {
    list: Option<Vec<Recipe>>,
    entries: HashMap<Uuid, Recipe>,
}

/// An opaque copy of the full cache state, for snapshot/restore around
/// optimistic mutations.
#[derive(Debug, Clone)]
pub struct CacheSnapshot {
    state: CacheState,
}

/// Cache counters for monitoring and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub invalidations: u64,
}

struct CacheInner {
    state: RwLock<CacheState>,
    hits: AtomicU64,
    misses: AtomicU64,
    invalidations: AtomicU64,
}

/// Shared recipe cache service.
#[derive(Clone)]
pub struct RecipeCache {
    inner: Arc<CacheInner>,
}

impl RecipeCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(CacheInner {
                state: RwLock::new(CacheState::default()),
                hits: AtomicU64::new(0),
                misses: AtomicU64::new(0),
                invalidations: AtomicU64::new(0),
            }),
        }
    }

    /// Read the cached list, recording a hit or miss.
    pub async fn read_list(&self) -> Option<Vec<Recipe>> {
        let state = self.inner.state.read().await;
        match &state.list {
            Some(list) => {
                self.inner.hits.fetch_add(1, Ordering::Relaxed);
                Some(list.clone())
            }
            None => {
                self.inner.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Read the cached list without touching the counters.
    pub async fn peek_list(&self) -> Option<Vec<Recipe>> {
        self.inner.state.read().await.list.clone()
    }

    /// Replace the cached list.
    pub async fn write_list(&self, list: Vec<Recipe>) {
        self.inner.state.write().await.list = Some(list);
    }

    /// Mutate the cached list in place, if one is materialized.
    pub async fn update_list(&self, f: impl FnOnce(&mut Vec<Recipe>)) {
        if let Some(list) = self.inner.state.write().await.list.as_mut() {
            f(list);
        }
    }

    /// Read an entry slot, recording a hit or miss.
    pub async fn read_entry(&self, id: Uuid) -> Option<Recipe> {
        let state = self.inner.state.read().await;
        match state.entries.get(&id) {
            Some(recipe) => {
                self.inner.hits.fetch_add(1, Ordering::Relaxed);
                Some(recipe.clone())
            }
            None => {
                self.inner.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Fill an entry slot.
    pub async fn write_entry(&self, recipe: Recipe) {
        self.inner
            .state
            .write()
            .await
            .entries
            .insert(recipe.id, recipe);
    }

    /// Drop an entry slot.
    pub async fn remove_entry(&self, id: Uuid) {
        self.inner.state.write().await.entries.remove(&id);
    }

    /// Apply a speculative mutation to both slots under one lock.
    pub(crate) async fn speculate(
        &self,
        f: impl FnOnce(&mut Option<Vec<Recipe>>, &mut HashMap<Uuid, Recipe>),
    ) {
        let mut state = self.inner.state.write().await;
        let CacheState { list, entries } = &mut *state;
        f(list, entries);
    }

    /// Copy the full cache state.
    pub async fn snapshot(&self) -> CacheSnapshot {
        CacheSnapshot {
            state: self.inner.state.read().await.clone(),
        }
    }

    /// Restore a previously taken snapshot.
    pub async fn restore(&self, snapshot: CacheSnapshot) {
        *self.inner.state.write().await = snapshot.state;
    }

    /// Drop everything, forcing the next read to refetch.
    pub async fn invalidate(&self) {
        let mut state = self.inner.state.write().await;
        state.list = None;
        state.entries.clear();
        self.inner.invalidations.fetch_add(1, Ordering::Relaxed);
        debug!(subsystem = "client", component = "cache", "cache invalidated");
    }

    /// Counter snapshot.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.inner.hits.load(Ordering::Relaxed),
            misses: self.inner.misses.load(Ordering::Relaxed),
            invalidations: self.inner.invalidations.load(Ordering::Relaxed),
        }
    }
}

impl Default for RecipeCache {
    fn default() -> Self {
        Self::new()
    }
}
