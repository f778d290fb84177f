//! Migration engine integration tests: idempotence, empty-store handling,
//! and failure/retry semantics against the in-memory backends.

use std::sync::Arc;

use uuid::Uuid;

use vault_client::testing::{MemoryLegacyStore, MemoryRecipeRepository};
use vault_client::MigrationEngine;
use vault_core::{Error, LegacyIngredient, LegacyRecipe, LegacyStore};

fn legacy(name: &str, order: i64) -> LegacyRecipe {
    LegacyRecipe {
        id: format!("recipe-{}", order),
        name: name.to_string(),
        servings: 2,
        notes: String::new(),
        ingredients: vec![LegacyIngredient {
            id: format!("ing-{}", order),
            name: "flour".to_string(),
            amount: 100.0,
            unit: "g".to_string(),
        }],
        created_at: 1_700_000_000_000,
        order,
    }
}

fn engine(
    store: MemoryLegacyStore,
    repo: MemoryRecipeRepository,
) -> (
    Arc<MemoryLegacyStore>,
    Arc<MemoryRecipeRepository>,
    MigrationEngine,
) {
    let store = Arc::new(store);
    let repo = Arc::new(repo);
    let engine = MigrationEngine::new(store.clone(), repo.clone());
    (store, repo, engine)
}

#[tokio::test]
async fn empty_legacy_store_completes_with_zero() {
    let (store, repo, engine) = engine(
        MemoryLegacyStore::new(),
        MemoryRecipeRepository::new(Uuid::new_v4()),
    );

    let report = engine.migrate().await.unwrap();
    assert_eq!(report.migrated_count, 0);
    assert!(!report.already_completed);

    // No data is not an error: the flag flips so we never look again.
    assert!(store.migration_completed());
    assert_eq!(repo.call_count("create_bulk"), 0);
}

#[tokio::test]
async fn migrates_all_rows_preserving_order() {
    let (store, repo, engine) = engine(
        MemoryLegacyStore::with_recipes(vec![legacy("Toast", 3), legacy("Soup", 0)]),
        MemoryRecipeRepository::new(Uuid::new_v4()),
    );

    let report = engine.migrate().await.unwrap();
    assert_eq!(report.migrated_count, 2);
    assert!(store.migration_completed());

    let rows = repo.rows();
    assert_eq!(rows.len(), 2);
    // Legacy `order` becomes the new `order_index`, field for field.
    assert_eq!(rows[0].name, "Toast");
    assert_eq!(rows[0].order_index, 3);
    assert_eq!(rows[0].ingredients[0].name, "flour");
    assert_eq!(rows[1].name, "Soup");
    assert_eq!(rows[1].order_index, 0);
}

#[tokio::test]
async fn second_call_is_a_remote_noop() {
    let (_store, repo, engine) = engine(
        MemoryLegacyStore::with_recipes(vec![legacy("Toast", 0)]),
        MemoryRecipeRepository::new(Uuid::new_v4()),
    );

    let first = engine.migrate().await.unwrap();
    assert_eq!(first.migrated_count, 1);
    assert_eq!(repo.call_count("create_bulk"), 1);

    let second = engine.migrate().await.unwrap();
    assert_eq!(second.migrated_count, 0);
    assert!(second.already_completed);
    // At-most-once: the second invocation never reaches the repository.
    assert_eq!(repo.call_count("create_bulk"), 1);
}

#[tokio::test]
async fn bulk_create_failure_leaves_flag_pending() {
    let (store, repo, engine) = engine(
        MemoryLegacyStore::with_recipes(vec![legacy("Toast", 0)]),
        MemoryRecipeRepository::new(Uuid::new_v4()),
    );
    repo.fail_on("create_bulk");

    let err = engine.migrate().await.unwrap_err();
    assert!(matches!(err, Error::Migration(_)));
    assert!(!store.migration_completed());

    // A later qualifying load retries and succeeds.
    repo.clear_failures();
    let report = engine.migrate().await.unwrap();
    assert_eq!(report.migrated_count, 1);
    assert!(store.migration_completed());
}

#[tokio::test]
async fn malformed_legacy_slot_leaves_flag_pending() {
    let (store, repo, engine) = engine(
        MemoryLegacyStore::with_recipes(vec![legacy("Toast", 0)]),
        MemoryRecipeRepository::new(Uuid::new_v4()),
    );
    store.fail_load(true);

    assert!(engine.migrate().await.is_err());
    assert!(!store.migration_completed());
    assert_eq!(repo.call_count("create_bulk"), 0);
}

#[tokio::test]
async fn migrated_count_comes_from_created_rows() {
    // The count reflects what the store actually created, not what was
    // submitted — the in-memory repository creates everything, so they
    // coincide here.
    let (_store, repo, engine) = engine(
        MemoryLegacyStore::with_recipes(vec![
            legacy("A", 0),
            legacy("B", 1),
            legacy("C", 2),
        ]),
        MemoryRecipeRepository::new(Uuid::new_v4()),
    );

    let report = engine.migrate().await.unwrap();
    assert_eq!(report.migrated_count, repo.rows().len());
}
