//! # vault-client
//!
//! The client core of FlavourVault: everything between the UI and the remote
//! store.
//!
//! This crate provides:
//! - [`RecipeService`] — cached reads and mutations with per-operation
//!   optimistic/confirmed semantics
//! - [`RecipeCache`] — the single derived materialization of the user's
//!   collection
//! - [`MigrationEngine`] — the one-time, idempotent legacy-store migration
//! - [`FileLegacyStore`] — the flat-file legacy persistence slot
//! - [`testing`] — in-memory repository and legacy-store implementations
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use vault_client::{MigrationEngine, RecipeService, FileLegacyStore};
//!
//! # async fn wire(repo: Arc<dyn vault_core::RecipeRepository>) -> vault_core::Result<()> {
//! let legacy = Arc::new(FileLegacyStore::from_env()?);
//! let report = MigrationEngine::new(legacy, repo.clone()).migrate().await?;
//! println!("migrated {} recipes", report.migrated_count);
//!
//! let service = RecipeService::new(repo);
//! let recipes = service.list_recipes().await?;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod legacy;
pub mod migration;
pub mod service;
pub mod testing;

pub use cache::{CacheSnapshot, CacheStats, RecipeCache};
pub use legacy::FileLegacyStore;
pub use migration::{MigrationEngine, MigrationReport};
pub use service::RecipeService;
