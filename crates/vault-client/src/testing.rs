//! In-memory repository and legacy-store implementations.
//!
//! Behaviourally faithful stand-ins for the remote store and the on-disk
//! legacy slot: order assignment, bulk defaulting, tag aggregation and
//! push-down search all match the real implementations. Tests drive them
//! through per-operation call counters and injectable failures; the example
//! binary uses them to run the full stack without a network.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use vault_core::{
    CreateRecipeRequest, Error, LegacyRecipe, LegacyStore, Recipe, RecipeFilters,
    RecipeOrderUpdate, RecipeRepository, Result, UpdateRecipeRequest,
};

// =============================================================================
// MEMORY RECIPE REPOSITORY
// =============================================================================

struct MemoryState {
    rows: Vec<Recipe>,
    calls: HashMap<&'static str, usize>,
    failing: HashSet<&'static str>,
}

/// In-memory [`RecipeRepository`] scoped to a single user.
pub struct MemoryRecipeRepository {
    user_id: Uuid,
    state: Mutex<MemoryState>,
}

impl MemoryRecipeRepository {
    /// An empty repository owned by `user_id`.
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            state: Mutex::new(MemoryState {
                rows: Vec::new(),
                calls: HashMap::new(),
                failing: HashSet::new(),
            }),
        }
    }

    /// A repository pre-seeded with rows.
    pub fn with_rows(user_id: Uuid, rows: Vec<Recipe>) -> Self {
        let repo = Self::new(user_id);
        repo.state.lock().unwrap().rows = rows;
        repo
    }

    /// Make every subsequent call to `op` fail with a transport error, until
    /// [`Self::clear_failures`].
    pub fn fail_on(&self, op: &'static str) {
        self.state.lock().unwrap().failing.insert(op);
    }

    /// Stop injecting failures.
    pub fn clear_failures(&self) {
        self.state.lock().unwrap().failing.clear();
    }

    /// How many times `op` has been invoked.
    pub fn call_count(&self, op: &str) -> usize {
        *self.state.lock().unwrap().calls.get(op).unwrap_or(&0)
    }

    /// Snapshot of the stored rows, in insertion order.
    pub fn rows(&self) -> Vec<Recipe> {
        self.state.lock().unwrap().rows.clone()
    }

    /// Record the call and fail if a failure is injected for `op`. Injected
    /// failures fire before any state change, like a request that never
    /// reached the store.
    fn enter(&self, op: &'static str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        *state.calls.entry(op).or_insert(0) += 1;
        if state.failing.contains(op) {
            return Err(Error::Request(format!("injected failure: {}", op)));
        }
        Ok(())
    }

    fn materialize(&self, req: CreateRecipeRequest, order_index: i64) -> Recipe {
        let now = Utc::now();
        Recipe {
            id: Uuid::new_v4(),
            user_id: self.user_id,
            name: req.name,
            servings: req.servings,
            notes: req.notes,
            ingredients: req.ingredients,
            tags: req.tags,
            is_favourite: false,
            created_at: now,
            updated_at: now,
            order_index,
        }
    }
}

fn next_order_index(rows: &[Recipe]) -> i64 {
    rows.iter().map(|r| r.order_index + 1).max().unwrap_or(0)
}

#[async_trait]
impl RecipeRepository for MemoryRecipeRepository {
    async fn list(&self) -> Result<Vec<Recipe>> {
        self.enter("list")?;
        let mut rows = self.state.lock().unwrap().rows.clone();
        rows.sort_by_key(|r| r.order_index);
        Ok(rows)
    }

    async fn fetch(&self, id: Uuid) -> Result<Recipe> {
        self.enter("fetch")?;
        self.state
            .lock()
            .unwrap()
            .rows
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or(Error::RecipeNotFound(id))
    }

    async fn create(&self, req: CreateRecipeRequest) -> Result<Recipe> {
        self.enter("create")?;
        let mut state = self.state.lock().unwrap();
        let order_index = req
            .order_index
            .unwrap_or_else(|| next_order_index(&state.rows));
        let recipe = self.materialize(req, order_index);
        state.rows.push(recipe.clone());
        Ok(recipe)
    }

    async fn create_bulk(&self, reqs: Vec<CreateRecipeRequest>) -> Result<Vec<Recipe>> {
        self.enter("create_bulk")?;
        let mut state = self.state.lock().unwrap();
        let created: Vec<Recipe> = reqs
            .into_iter()
            .enumerate()
            .map(|(position, req)| {
                let order_index = req.order_index.unwrap_or(position as i64);
                self.materialize(req, order_index)
            })
            .collect();
        state.rows.extend(created.clone());
        Ok(created)
    }

    async fn update(&self, id: Uuid, req: UpdateRecipeRequest) -> Result<Recipe> {
        self.enter("update")?;
        let mut state = self.state.lock().unwrap();
        let row = state
            .rows
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(Error::RecipeNotFound(id))?;

        if let Some(name) = req.name {
            row.name = name;
        }
        if let Some(servings) = req.servings {
            row.servings = servings;
        }
        if let Some(notes) = req.notes {
            row.notes = notes;
        }
        if let Some(ingredients) = req.ingredients {
            row.ingredients = ingredients;
        }
        if let Some(tags) = req.tags {
            row.tags = tags;
        }
        if let Some(is_favourite) = req.is_favourite {
            row.is_favourite = is_favourite;
        }
        if let Some(order_index) = req.order_index {
            row.order_index = order_index;
        }
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.enter("delete")?;
        self.state.lock().unwrap().rows.retain(|r| r.id != id);
        Ok(())
    }

    async fn update_order(&self, updates: &[RecipeOrderUpdate]) -> Result<()> {
        self.enter("update_order")?;
        let mut state = self.state.lock().unwrap();
        for update in updates {
            if let Some(row) = state.rows.iter_mut().find(|r| r.id == update.id) {
                row.order_index = update.order_index;
                row.updated_at = Utc::now();
            }
        }
        Ok(())
    }

    async fn set_favourite(&self, id: Uuid, favourite: bool) -> Result<Recipe> {
        self.enter("set_favourite")?;
        let mut state = self.state.lock().unwrap();
        let row = state
            .rows
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(Error::RecipeNotFound(id))?;
        row.is_favourite = favourite;
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn list_tags(&self) -> Result<Vec<String>> {
        self.enter("list_tags")?;
        let state = self.state.lock().unwrap();
        let mut tags: Vec<String> = state
            .rows
            .iter()
            .flat_map(|r| r.tags.iter().map(str::to_string))
            .collect();
        tags.sort();
        tags.dedup();
        Ok(tags)
    }

    async fn search(&self, filters: &RecipeFilters) -> Result<Vec<Recipe>> {
        self.enter("search")?;
        // Push-down parity with the remote store: favourite and tag
        // predicates only. The text stage is the caller's job.
        let mut rows: Vec<Recipe> = self
            .state
            .lock()
            .unwrap()
            .rows
            .iter()
            .filter(|r| !filters.favourites_only || r.is_favourite)
            .filter(|r| {
                filters.selected_tags.is_empty()
                    || filters.selected_tags.iter().any(|t| r.tags.contains(t))
            })
            .cloned()
            .collect();
        rows.sort_by_key(|r| r.order_index);
        Ok(rows)
    }
}

// =============================================================================
// MEMORY LEGACY STORE
// =============================================================================

/// In-memory [`LegacyStore`].
pub struct MemoryLegacyStore {
    recipes: Mutex<Vec<LegacyRecipe>>,
    completed: AtomicBool,
    fail_load: AtomicBool,
}

impl MemoryLegacyStore {
    /// An empty store with the migration flag unset.
    pub fn new() -> Self {
        Self {
            recipes: Mutex::new(Vec::new()),
            completed: AtomicBool::new(false),
            fail_load: AtomicBool::new(false),
        }
    }

    /// A store pre-seeded with legacy recipes.
    pub fn with_recipes(recipes: Vec<LegacyRecipe>) -> Self {
        let store = Self::new();
        *store.recipes.lock().unwrap() = recipes;
        store
    }

    /// Make [`LegacyStore::load`] fail, simulating a malformed slot.
    pub fn fail_load(&self, fail: bool) {
        self.fail_load.store(fail, Ordering::Relaxed);
    }
}

impl Default for MemoryLegacyStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LegacyStore for MemoryLegacyStore {
    fn load(&self) -> Result<Vec<LegacyRecipe>> {
        if self.fail_load.load(Ordering::Relaxed) {
            return Err(Error::Serialization(
                "injected failure: malformed legacy slot".to_string(),
            ));
        }
        Ok(self.recipes.lock().unwrap().clone())
    }

    fn migration_completed(&self) -> bool {
        self.completed.load(Ordering::Relaxed)
    }

    fn mark_migration_completed(&self) -> Result<()> {
        self.completed.store(true, Ordering::Relaxed);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.recipes.lock().unwrap().clear();
        Ok(())
    }
}
