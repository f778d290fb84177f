//! One-time legacy-store migration.
//!
//! Transfers the pre-authentication local recipes into the remote repository
//! exactly once, guarded by a persisted completion flag. The engine is a
//! two-state machine — pending, completed — and is safe to invoke on every
//! qualifying app load: once completed it returns immediately without
//! touching the network.
//!
//! Callers are responsible for gating invocation on an authenticated
//! session; migrated rows need an owner, and the repository will refuse the
//! bulk create without one.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use vault_core::{
    CreateRecipeRequest, Error, Ingredient, LegacyRecipe, LegacyStore, RecipeRepository, Result,
    TagSet,
};

/// Outcome of a migration attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    /// Rows the remote store actually created — not the count submitted.
    pub migrated_count: usize,
    /// True when the flag was already set and nothing was attempted.
    pub already_completed: bool,
}

/// The one-time migration engine.
pub struct MigrationEngine {
    legacy: Arc<dyn LegacyStore>,
    repo: Arc<dyn RecipeRepository>,
}

impl MigrationEngine {
    pub fn new(legacy: Arc<dyn LegacyStore>, repo: Arc<dyn RecipeRepository>) -> Self {
        Self { legacy, repo }
    }

    /// Run the migration if it has not completed yet.
    ///
    /// On bulk-create failure the completion flag is left unset, so the next
    /// qualifying load retries; no partial-success bookkeeping is attempted.
    #[instrument(skip(self), fields(subsystem = "migration", component = "engine", op = "migrate"))]
    pub async fn migrate(&self) -> Result<MigrationReport> {
        if self.legacy.migration_completed() {
            debug!("migration already completed; nothing to do");
            return Ok(MigrationReport {
                migrated_count: 0,
                already_completed: true,
            });
        }

        let legacy_recipes = self.legacy.load()?;
        if legacy_recipes.is_empty() {
            // No data is not an error; mark done so we never look again.
            self.legacy.mark_migration_completed()?;
            info!(migrated_count = 0, "no legacy recipes to migrate");
            return Ok(MigrationReport {
                migrated_count: 0,
                already_completed: false,
            });
        }

        let batch_size = legacy_recipes.len();
        let requests: Vec<CreateRecipeRequest> =
            legacy_recipes.into_iter().map(transform_legacy).collect();

        let created = self.repo.create_bulk(requests).await.map_err(|e| {
            warn!(
                batch_size,
                error = %e,
                "migration bulk create failed; will retry on next load"
            );
            Error::Migration(e.user_message())
        })?;

        self.legacy.mark_migration_completed()?;
        info!(migrated_count = created.len(), "legacy recipes migrated");

        Ok(MigrationReport {
            migrated_count: created.len(),
            already_completed: false,
        })
    }
}

/// Field-for-field transform of a legacy record into a creation request.
///
/// The legacy display `order` becomes the new `order_index`; legacy
/// ingredient ids were free-form strings and are regenerated. Owner
/// injection happens in the repository.
fn transform_legacy(legacy: LegacyRecipe) -> CreateRecipeRequest {
    CreateRecipeRequest {
        name: legacy.name,
        servings: legacy.servings,
        notes: legacy.notes,
        ingredients: legacy
            .ingredients
            .into_iter()
            .map(|i| Ingredient::new(i.name, i.amount, i.unit))
            .collect(),
        tags: TagSet::new(),
        order_index: Some(legacy.order),
    }
}
