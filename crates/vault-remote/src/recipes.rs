//! Recipe repository implementation over the remote query API.
//!
//! Operations map onto the `recipes` table resource: select/insert/patch/
//! delete verbs with an equality filter on the row id. Row-level isolation
//! to the authenticated user's own rows is enforced by the remote store; the
//! client only injects the owner on insert.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, instrument};
use uuid::Uuid;

use vault_core::{
    CreateRecipeRequest, Error, Ingredient, Recipe, RecipeFilters, RecipeOrderUpdate,
    RecipeRepository, Result, TagSet, UpdateRecipeRequest,
};

use crate::client::RemoteClient;

/// Ask the store to echo affected rows back in the response body.
const PREFER_REPRESENTATION: (&str, &str) = ("Prefer", "return=representation");

/// Remote implementation of [`RecipeRepository`].
pub struct RemoteRecipeRepository {
    client: RemoteClient,
}

impl RemoteRecipeRepository {
    /// Create a new repository over the given client.
    pub fn new(client: RemoteClient) -> Self {
        Self { client }
    }

    /// The next free `order_index` for the current user: current max + 1,
    /// or 0 for the first recipe.
    async fn next_order_index(&self) -> Result<i64> {
        let response = self
            .client
            .request(Method::GET, self.client.rest_url("recipes"))
            .await
            .query(&[
                ("select", "order_index"),
                ("order", "order_index.desc"),
                ("limit", "1"),
            ])
            .send()
            .await?;
        let response = RemoteClient::check(response).await?;
        let rows: Vec<OrderIndexRow> = RemoteClient::read_json(response).await?;

        Ok(rows.first().map(|r| r.order_index + 1).unwrap_or(0))
    }

    /// Apply one member of a reorder batch.
    async fn apply_order(&self, update: RecipeOrderUpdate) -> Result<()> {
        let response = self
            .client
            .request(Method::PATCH, self.client.rest_url("recipes"))
            .await
            .query(&[("id", format!("eq.{}", update.id))])
            .json(&OrderPatch {
                order_index: update.order_index,
                updated_at: Utc::now(),
            })
            .send()
            .await?;
        RemoteClient::check(response).await?;
        Ok(())
    }
}

#[async_trait]
impl RecipeRepository for RemoteRecipeRepository {
    #[instrument(skip(self), fields(subsystem = "remote", component = "recipes", op = "list"))]
    async fn list(&self) -> Result<Vec<Recipe>> {
        let start = Instant::now();

        let response = self
            .client
            .request(Method::GET, self.client.rest_url("recipes"))
            .await
            .query(&[("select", "*"), ("order", "order_index.asc")])
            .send()
            .await?;
        let response = RemoteClient::check(response).await?;
        let recipes: Vec<Recipe> = RemoteClient::read_json(response).await?;

        debug!(
            result_count = recipes.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "fetched recipe list"
        );
        Ok(recipes)
    }

    #[instrument(skip(self), fields(subsystem = "remote", component = "recipes", op = "fetch", recipe_id = %id))]
    async fn fetch(&self, id: Uuid) -> Result<Recipe> {
        let response = self
            .client
            .request(Method::GET, self.client.rest_url("recipes"))
            .await
            .query(&[
                ("select", "*".to_string()),
                ("id", format!("eq.{}", id)),
                ("limit", "1".to_string()),
            ])
            .send()
            .await?;
        let response = RemoteClient::check(response).await?;
        let mut rows: Vec<Recipe> = RemoteClient::read_json(response).await?;

        rows.pop().ok_or(Error::RecipeNotFound(id))
    }

    #[instrument(skip(self, req), fields(subsystem = "remote", component = "recipes", op = "create"))]
    async fn create(&self, req: CreateRecipeRequest) -> Result<Recipe> {
        let user = self.client.require_user().await?;

        let order_index = match req.order_index {
            Some(index) => index,
            None => self.next_order_index().await?,
        };
        let row = InsertRecipeRow::from_request(req, user.id, order_index);

        let response = self
            .client
            .request(Method::POST, self.client.rest_url("recipes"))
            .await
            .header(PREFER_REPRESENTATION.0, PREFER_REPRESENTATION.1)
            .json(&[row])
            .send()
            .await?;
        let response = RemoteClient::check(response).await?;
        let mut rows: Vec<Recipe> = RemoteClient::read_json(response).await?;

        rows.pop()
            .ok_or_else(|| Error::Internal("create returned no row".to_string()))
    }

    #[instrument(skip(self, reqs), fields(subsystem = "remote", component = "recipes", op = "create_bulk", batch_size = reqs.len()))]
    async fn create_bulk(&self, reqs: Vec<CreateRecipeRequest>) -> Result<Vec<Recipe>> {
        let user = self.client.require_user().await?;

        let rows: Vec<InsertRecipeRow> = reqs
            .into_iter()
            .enumerate()
            .map(|(position, req)| {
                let order_index = req.order_index.unwrap_or(position as i64);
                InsertRecipeRow::from_request(req, user.id, order_index)
            })
            .collect();

        let response = self
            .client
            .request(Method::POST, self.client.rest_url("recipes"))
            .await
            .header(PREFER_REPRESENTATION.0, PREFER_REPRESENTATION.1)
            .json(&rows)
            .send()
            .await?;
        let response = RemoteClient::check(response).await?;
        RemoteClient::read_json(response).await
    }

    #[instrument(skip(self, req), fields(subsystem = "remote", component = "recipes", op = "update", recipe_id = %id))]
    async fn update(&self, id: Uuid, req: UpdateRecipeRequest) -> Result<Recipe> {
        let response = self
            .client
            .request(Method::PATCH, self.client.rest_url("recipes"))
            .await
            .query(&[("id", format!("eq.{}", id))])
            .header(PREFER_REPRESENTATION.0, PREFER_REPRESENTATION.1)
            .json(&UpdateRecipeRow::from(req))
            .send()
            .await?;
        let response = RemoteClient::check(response).await?;
        let mut rows: Vec<Recipe> = RemoteClient::read_json(response).await?;

        rows.pop().ok_or(Error::RecipeNotFound(id))
    }

    #[instrument(skip(self), fields(subsystem = "remote", component = "recipes", op = "delete", recipe_id = %id))]
    async fn delete(&self, id: Uuid) -> Result<()> {
        let response = self
            .client
            .request(Method::DELETE, self.client.rest_url("recipes"))
            .await
            .query(&[("id", format!("eq.{}", id))])
            .send()
            .await?;
        RemoteClient::check(response).await?;
        Ok(())
    }

    #[instrument(skip(self, updates), fields(subsystem = "remote", component = "recipes", op = "update_order", batch_size = updates.len()))]
    async fn update_order(&self, updates: &[RecipeOrderUpdate]) -> Result<()> {
        // Members go out concurrently-in-flight; the batch settles only when
        // every member has resolved, and any member failure fails the batch.
        let results =
            future::join_all(updates.iter().map(|update| self.apply_order(*update))).await;

        for result in results {
            result?;
        }
        Ok(())
    }

    #[instrument(skip(self), fields(subsystem = "remote", component = "recipes", op = "set_favourite", recipe_id = %id))]
    async fn set_favourite(&self, id: Uuid, favourite: bool) -> Result<Recipe> {
        let response = self
            .client
            .request(Method::PATCH, self.client.rest_url("recipes"))
            .await
            .query(&[("id", format!("eq.{}", id))])
            .header(PREFER_REPRESENTATION.0, PREFER_REPRESENTATION.1)
            .json(&FavouritePatch {
                is_favourite: favourite,
                updated_at: Utc::now(),
            })
            .send()
            .await?;
        let response = RemoteClient::check(response).await?;
        let mut rows: Vec<Recipe> = RemoteClient::read_json(response).await?;

        rows.pop().ok_or(Error::RecipeNotFound(id))
    }

    #[instrument(skip(self), fields(subsystem = "remote", component = "recipes", op = "list_tags"))]
    async fn list_tags(&self) -> Result<Vec<String>> {
        let response = self
            .client
            .request(Method::POST, self.client.rest_url("rpc/list_user_tags"))
            .await
            .json(&serde_json::json!({}))
            .send()
            .await?;
        let response = RemoteClient::check(response).await?;
        RemoteClient::read_json(response).await
    }

    #[instrument(skip(self, filters), fields(subsystem = "remote", component = "recipes", op = "search"))]
    async fn search(&self, filters: &RecipeFilters) -> Result<Vec<Recipe>> {
        // Favourite and tag predicates are pushed down; the store has no
        // substring search, so the text stage stays client-side and callers
        // re-filter the returned superset.
        let mut query: Vec<(&str, String)> = vec![
            ("select", "*".to_string()),
            ("order", "order_index.asc".to_string()),
        ];
        if filters.favourites_only {
            query.push(("is_favourite", "eq.true".to_string()));
        }
        if !filters.selected_tags.is_empty() {
            query.push(("tags", format!("ov.{{{}}}", filters.selected_tags.join(","))));
        }

        let response = self
            .client
            .request(Method::GET, self.client.rest_url("recipes"))
            .await
            .query(&query)
            .send()
            .await?;
        let response = RemoteClient::check(response).await?;
        RemoteClient::read_json(response).await
    }
}

// =============================================================================
// WIRE SHAPES
// =============================================================================

#[derive(Deserialize)]
struct OrderIndexRow {
    order_index: i64,
}

/// Insert payload: the store assigns `id`, `created_at` and `updated_at`.
#[derive(Serialize)]
struct InsertRecipeRow {
    user_id: Uuid,
    name: String,
    servings: i32,
    notes: String,
    ingredients: Vec<Ingredient>,
    tags: TagSet,
    order_index: i64,
}

impl InsertRecipeRow {
    fn from_request(req: CreateRecipeRequest, user_id: Uuid, order_index: i64) -> Self {
        Self {
            user_id,
            name: req.name,
            servings: req.servings,
            notes: req.notes,
            ingredients: req.ingredients,
            tags: req.tags,
            order_index,
        }
    }
}

/// Patch payload for partial updates; absent fields are left untouched by
/// the store, `updated_at` is always refreshed.
#[derive(Serialize)]
struct UpdateRecipeRow {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    servings: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ingredients: Option<Vec<Ingredient>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tags: Option<TagSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_favourite: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    order_index: Option<i64>,
    updated_at: DateTime<Utc>,
}

impl From<UpdateRecipeRequest> for UpdateRecipeRow {
    fn from(req: UpdateRecipeRequest) -> Self {
        Self {
            name: req.name,
            servings: req.servings,
            notes: req.notes,
            ingredients: req.ingredients,
            tags: req.tags,
            is_favourite: req.is_favourite,
            order_index: req.order_index,
            updated_at: Utc::now(),
        }
    }
}

#[derive(Serialize)]
struct FavouritePatch {
    is_favourite: bool,
    updated_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct OrderPatch {
    order_index: i64,
    updated_at: DateTime<Utc>,
}
