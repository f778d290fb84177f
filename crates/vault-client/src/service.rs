//! Recipe mutation service.
//!
//! Sits between the UI and the remote repository, keeping the single cached
//! collection consistent while the user edits. The rules, per operation:
//!
//! - reads go through the cache and fetch on miss;
//! - create/update/delete touch the cache only after the remote store
//!   confirms, so a failure leaves the cache exactly as it was;
//! - favourite toggling and reordering are optimistic: the cache changes
//!   immediately, and a remote failure restores the pre-mutation snapshot;
//! - a reorder always ends with an invalidation — the optimistic list is a
//!   latency-hiding best effort, and the next read refetches the truth.
//!
//! All optimistic paths share one helper ([`RecipeService::apply_optimistic`]):
//! snapshot, speculative apply, remote call, restore on failure.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use vault_core::{
    filter_recipes, CreateRecipeRequest, EditableRecipe, Recipe, RecipeDraft, RecipeFilters,
    RecipeOrderUpdate, RecipeRepository, Result, UpdateRecipeRequest,
};

use crate::cache::{CacheStats, RecipeCache};

/// Cached, optimistic front-end to a [`RecipeRepository`].
pub struct RecipeService {
    repo: Arc<dyn RecipeRepository>,
    cache: RecipeCache,
}

impl RecipeService {
    /// Create a service with a fresh cache.
    pub fn new(repo: Arc<dyn RecipeRepository>) -> Self {
        Self {
            repo,
            cache: RecipeCache::new(),
        }
    }

    /// Cache counters, for monitoring and tests.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// The user's recipes, ordered by `order_index` ascending. Served from
    /// the cache when materialized.
    pub async fn list_recipes(&self) -> Result<Vec<Recipe>> {
        if let Some(list) = self.cache.read_list().await {
            debug!(result_count = list.len(), "recipe list served from cache");
            return Ok(list);
        }

        let list = self.repo.list().await?;
        self.cache.write_list(list.clone()).await;
        Ok(list)
    }

    /// Drop the cache and refetch.
    pub async fn refresh(&self) -> Result<Vec<Recipe>> {
        self.cache.invalidate().await;
        self.list_recipes().await
    }

    /// A single recipe: entry slot, then the cached list, then the remote
    /// store. A missing row surfaces as
    /// [`Error::RecipeNotFound`](vault_core::Error::RecipeNotFound).
    pub async fn get_recipe(&self, id: Uuid) -> Result<Recipe> {
        if let Some(recipe) = self.cache.read_entry(id).await {
            return Ok(recipe);
        }
        if let Some(list) = self.cache.peek_list().await {
            if let Some(recipe) = list.into_iter().find(|r| r.id == id) {
                self.cache.write_entry(recipe.clone()).await;
                return Ok(recipe);
            }
        }

        let recipe = self.repo.fetch(id).await?;
        self.cache.write_entry(recipe.clone()).await;
        Ok(recipe)
    }

    /// Persist a new recipe. Not optimistic — creation needs the
    /// server-assigned id, so callers show a pending state until this
    /// returns. The created row (with the store's id and `order_index`) is
    /// appended to the cached list.
    pub async fn create_recipe(
        &self,
        draft: RecipeDraft,
        order_index: Option<i64>,
    ) -> Result<Recipe> {
        let mut req = CreateRecipeRequest::from(draft);
        req.order_index = order_index;

        let created = self.repo.create(req).await?;

        let for_list = created.clone();
        self.cache.update_list(move |list| list.push(for_list)).await;
        self.cache.write_entry(created.clone()).await;
        Ok(created)
    }

    /// Apply a partial update. Not optimistic: the cache changes only after
    /// the remote store confirms, and is left untouched on error.
    pub async fn update_recipe(&self, id: Uuid, req: UpdateRecipeRequest) -> Result<Recipe> {
        let updated = self.repo.update(id, req).await?;
        self.reconcile(updated.clone()).await;
        Ok(updated)
    }

    /// Save whatever the editor holds: a draft becomes a create, a persisted
    /// recipe becomes a full-field update. The branch is decided by the
    /// [`EditableRecipe`] variant, so an unsaved recipe can never reach the
    /// update path.
    pub async fn save_recipe(&self, editable: EditableRecipe) -> Result<Recipe> {
        match editable {
            EditableRecipe::Draft(draft) => self.create_recipe(draft, None).await,
            EditableRecipe::Saved(recipe) => {
                let update = UpdateRecipeRequest {
                    name: Some(recipe.name),
                    servings: Some(recipe.servings),
                    notes: Some(recipe.notes),
                    ingredients: Some(recipe.ingredients),
                    tags: Some(recipe.tags),
                    ..UpdateRecipeRequest::default()
                };
                self.update_recipe(recipe.id, update).await
            }
        }
    }

    /// Delete a recipe. Not optimistic — no removal until the remote store
    /// confirms, avoiding a flicker-then-reappear on failure.
    pub async fn delete_recipe(&self, id: Uuid) -> Result<()> {
        self.repo.delete(id).await?;

        self.cache.update_list(|list| list.retain(|r| r.id != id)).await;
        self.cache.remove_entry(id).await;
        Ok(())
    }

    /// Flip the favourite flag, optimistically.
    ///
    /// The cached state flips before the remote call goes out; a failure
    /// restores the prior value. On success the server row replaces the
    /// speculative one.
    pub async fn toggle_favourite(&self, id: Uuid) -> Result<Recipe> {
        let current = self.get_recipe(id).await?;
        let target = !current.is_favourite;

        let row = self
            .apply_optimistic(
                |list, entries| {
                    if let Some(list) = list.as_mut() {
                        if let Some(r) = list.iter_mut().find(|r| r.id == id) {
                            r.is_favourite = target;
                        }
                    }
                    if let Some(r) = entries.get_mut(&id) {
                        r.is_favourite = target;
                    }
                },
                self.repo.set_favourite(id, target),
            )
            .await?;

        self.reconcile(row.clone()).await;
        Ok(row)
    }

    /// Persist a new display order for a batch of recipes, optimistically.
    ///
    /// The cached list takes the new indices and re-sorts immediately; the
    /// per-row remote updates go out concurrently-in-flight. Any member
    /// failure restores the pre-mutation snapshot. Success or failure, the
    /// cache is invalidated afterwards so a fresh fetch reconciles whatever
    /// actually landed.
    pub async fn reorder(&self, updates: Vec<RecipeOrderUpdate>) -> Result<()> {
        let result = self
            .apply_optimistic(
                |list, _entries| {
                    if let Some(list) = list.as_mut() {
                        for update in &updates {
                            if let Some(r) = list.iter_mut().find(|r| r.id == update.id) {
                                r.order_index = update.order_index;
                            }
                        }
                        list.sort_by_key(|r| r.order_index);
                    }
                },
                self.repo.update_order(&updates),
            )
            .await;

        self.cache.invalidate().await;
        result
    }

    /// Server-assisted search: favourite and tag predicates run remotely,
    /// then the full filter pipeline (including the text stage the store
    /// cannot push down) re-runs over the returned superset, so this path
    /// and plain client-side filtering behave identically.
    pub async fn search(&self, filters: &RecipeFilters) -> Result<Vec<Recipe>> {
        let superset = self.repo.search(filters).await?;
        Ok(filter_recipes(&superset, filters))
    }

    /// Distinct tags across the user's recipes.
    pub async fn list_tags(&self) -> Result<Vec<String>> {
        self.repo.list_tags().await
    }

    /// Replace the cached copies of a recipe with the remote-confirmed row.
    async fn reconcile(&self, recipe: Recipe) {
        let for_list = recipe.clone();
        self.cache
            .update_list(move |list| {
                if let Some(slot) = list.iter_mut().find(|r| r.id == for_list.id) {
                    *slot = for_list;
                }
            })
            .await;
        self.cache.write_entry(recipe).await;
    }

    /// The reusable optimistic-mutation shape: snapshot the cache, apply the
    /// speculative change, run the remote call, and restore the snapshot if
    /// the call fails.
    async fn apply_optimistic<T, Fut, F>(&self, speculate: F, call: Fut) -> Result<T>
    where
        Fut: Future<Output = Result<T>>,
        F: FnOnce(&mut Option<Vec<Recipe>>, &mut HashMap<Uuid, Recipe>),
    {
        let snapshot = self.cache.snapshot().await;
        self.cache.speculate(speculate).await;

        let result = call.await;
        if let Err(ref e) = result {
            warn!(
                error = %e,
                rolled_back = true,
                "optimistic mutation failed; cache restored"
            );
            self.cache.restore(snapshot).await;
        }
        result
    }
}
