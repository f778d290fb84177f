//! # vault-core
//!
//! Core types, traits, and abstractions for FlavourVault.
//!
//! This crate provides the foundational data structures, the pure recipe
//! filter engine, and the trait definitions that the other FlavourVault
//! crates depend on. It performs no I/O of its own.

pub mod defaults;
pub mod error;
pub mod filter;
pub mod logging;
pub mod models;
pub mod session;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use filter::{filter_recipes, RecipeFilters};
pub use models::{
    AuthUser, EditableRecipe, Ingredient, LegacyIngredient, LegacyRecipe, Recipe, RecipeDraft,
    TagSet,
};
pub use session::{SessionBus, SessionEvent, SessionProvider, StaticSession};
pub use traits::{
    CreateRecipeRequest, LegacyStore, RecipeOrderUpdate, RecipeRepository, UpdateRecipeRequest,
};
