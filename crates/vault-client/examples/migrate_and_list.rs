//! End-to-end wiring demo: seed a legacy slot, migrate it, then drive the
//! recipe service against the in-memory repository.
//!
//! Run with `cargo run -p vault-client --example migrate_and_list`.
//! Set `RUST_LOG=debug` to watch the cache and migration decisions.

use std::sync::Arc;

use uuid::Uuid;

use vault_client::testing::MemoryRecipeRepository;
use vault_client::{FileLegacyStore, MigrationEngine, RecipeService};
use vault_core::defaults::{LEGACY_RECIPES_KEY, MIGRATION_FLAG_KEY};
use vault_core::{RecipeDraft, RecipeFilters, RecipeOrderUpdate};

#[tokio::main]
async fn main() -> vault_core::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // A throwaway legacy slot with two pre-authentication recipes. The flag
    // is reset so the demo migrates on every run.
    let dir = std::env::temp_dir().join("flavourvault-demo");
    let legacy = FileLegacyStore::new(&dir);
    legacy.remove(MIGRATION_FLAG_KEY)?;
    legacy.set(
        LEGACY_RECIPES_KEY,
        r#"[
            {"id": "recipe-1", "name": "Porridge", "servings": 1, "notes": "",
             "ingredients": [{"id": "ing-1", "name": "oats", "amount": 50, "unit": "g"}],
             "createdAt": 1700000000000, "order": 0},
            {"id": "recipe-2", "name": "Omelette", "servings": 2, "notes": "3 eggs each",
             "ingredients": [{"id": "ing-2", "name": "eggs", "amount": 6, "unit": ""}],
             "createdAt": 1700000100000, "order": 1}
        ]"#,
    )?;

    let repo = Arc::new(MemoryRecipeRepository::new(Uuid::new_v4()));

    let report = MigrationEngine::new(Arc::new(legacy), repo.clone())
        .migrate()
        .await?;
    println!(
        "migration: {} recipes moved (already completed: {})",
        report.migrated_count, report.already_completed
    );

    let service = RecipeService::new(repo);

    let created = service
        .create_recipe(
            RecipeDraft {
                name: "Shakshuka".to_string(),
                servings: 2,
                notes: "simmer gently".to_string(),
                ..RecipeDraft::default()
            },
            None,
        )
        .await?;
    service.toggle_favourite(created.id).await?;

    let recipes = service.list_recipes().await?;
    println!("\nrecipes, display order:");
    for recipe in &recipes {
        println!(
            "  [{}] {}{}",
            recipe.order_index,
            recipe.name,
            if recipe.is_favourite { " *" } else { "" }
        );
    }

    // Move the newest recipe to the top.
    let mut updates: Vec<RecipeOrderUpdate> = Vec::new();
    updates.push(RecipeOrderUpdate {
        id: created.id,
        order_index: 0,
    });
    for (position, recipe) in recipes.iter().filter(|r| r.id != created.id).enumerate() {
        updates.push(RecipeOrderUpdate {
            id: recipe.id,
            order_index: position as i64 + 1,
        });
    }
    service.reorder(updates).await?;

    let filters = RecipeFilters::with_term("shak");
    let found = service.search(&filters).await?;
    println!("\nsearch \"shak\" matched: {:?}", found.iter().map(|r| &r.name).collect::<Vec<_>>());

    println!("\ncache stats: {:?}", service.cache_stats());
    Ok(())
}
