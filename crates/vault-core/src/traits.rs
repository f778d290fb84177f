//! Core traits for FlavourVault abstractions.
//!
//! These traits define the interfaces that concrete implementations must
//! satisfy, enabling pluggable backends and testability.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::filter::RecipeFilters;
use crate::models::{Ingredient, LegacyRecipe, Recipe, RecipeDraft, TagSet};

// =============================================================================
// RECIPE REPOSITORY
// =============================================================================

/// Request for creating a new recipe.
///
/// The owner is never part of the request — implementations inject the
/// current authenticated user, and the remote store rejects rows for anyone
/// else.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateRecipeRequest {
    pub name: String,
    pub servings: i32,
    pub notes: String,
    pub ingredients: Vec<Ingredient>,
    pub tags: TagSet,
    /// Explicit position; `None` means "append after the current maximum".
    pub order_index: Option<i64>,
}

impl From<RecipeDraft> for CreateRecipeRequest {
    fn from(draft: RecipeDraft) -> Self {
        Self {
            name: draft.name,
            servings: draft.servings,
            notes: draft.notes,
            ingredients: draft.ingredients,
            tags: draft.tags,
            order_index: None,
        }
    }
}

/// Partial update for an existing recipe. `None` fields are left untouched;
/// implementations always refresh `updated_at`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateRecipeRequest {
    pub name: Option<String>,
    pub servings: Option<i32>,
    pub notes: Option<String>,
    pub ingredients: Option<Vec<Ingredient>>,
    pub tags: Option<TagSet>,
    pub is_favourite: Option<bool>,
    pub order_index: Option<i64>,
}

/// One entry of a reorder batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecipeOrderUpdate {
    pub id: Uuid,
    pub order_index: i64,
}

/// Repository for recipe CRUD, scoped to the current authenticated user's
/// own rows.
///
/// Every method returns a typed [`Result`] — implementations catch their own
/// transport/serialization failures and never panic past this boundary.
#[async_trait]
pub trait RecipeRepository: Send + Sync {
    /// Fetch all recipes, ordered by `order_index` ascending.
    async fn list(&self) -> Result<Vec<Recipe>>;

    /// Fetch a single recipe by id. A missing row is
    /// [`Error::RecipeNotFound`](crate::Error::RecipeNotFound), distinct from
    /// a transport error.
    async fn fetch(&self, id: Uuid) -> Result<Recipe>;

    /// Create one recipe. The store assigns id and timestamps; when
    /// `order_index` is absent, the new row lands after the current maximum.
    async fn create(&self, req: CreateRecipeRequest) -> Result<Recipe>;

    /// Create many recipes in one request (used by migration). Rows without
    /// an explicit `order_index` default to their position in the input.
    async fn create_bulk(&self, reqs: Vec<CreateRecipeRequest>) -> Result<Vec<Recipe>>;

    /// Apply a partial update and return the refreshed row.
    async fn update(&self, id: Uuid, req: UpdateRecipeRequest) -> Result<Recipe>;

    /// Delete a recipe by id. Deleting a missing id is not an error.
    async fn delete(&self, id: Uuid) -> Result<()>;

    /// Persist new order indices for a batch of recipes. The batch is
    /// all-or-nothing from the caller's perspective: any member failure
    /// fails the call.
    async fn update_order(&self, updates: &[RecipeOrderUpdate]) -> Result<()>;

    /// Set the favourite flag — an update restricted to that one field,
    /// exposed separately for clarity of intent.
    async fn set_favourite(&self, id: Uuid, favourite: bool) -> Result<Recipe>;

    /// Distinct tags across the user's recipes (server-side aggregation).
    async fn list_tags(&self) -> Result<Vec<String>>;

    /// Server-assisted search: favourite and tag predicates are pushed down
    /// to the store; the text stage is NOT — callers re-apply
    /// [`filter_recipes`](crate::filter_recipes) over the returned superset.
    async fn search(&self, filters: &RecipeFilters) -> Result<Vec<Recipe>>;
}

// =============================================================================
// LEGACY STORE
// =============================================================================

/// The pre-authentication local-only persistence slot, consumed once by the
/// migration engine.
///
/// Reads and writes are synchronous — the store is a local flat file, not a
/// suspension point.
pub trait LegacyStore: Send + Sync {
    /// Read the full legacy collection. A missing slot is an empty list, not
    /// an error.
    fn load(&self) -> Result<Vec<LegacyRecipe>>;

    /// Whether the one-time migration has already run to completion.
    fn migration_completed(&self) -> bool;

    /// Persist the migration completion flag.
    fn mark_migration_completed(&self) -> Result<()>;

    /// Drop the legacy recipe data. Never called automatically.
    fn clear(&self) -> Result<()>;
}
