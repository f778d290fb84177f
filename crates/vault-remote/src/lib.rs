//! # vault-remote
//!
//! Client for the hosted relational backend that is FlavourVault's source of
//! truth once migration completes.
//!
//! This crate provides:
//! - [`RemoteClient`]/[`RemoteConfig`] — the shared HTTP plumbing for the
//!   store's query API, including the single status→error mapping
//! - [`RemoteRecipeRepository`] — the [`vault_core::RecipeRepository`]
//!   implementation over the `recipes` table resource
//! - [`RemoteAuth`] — the auth API client and
//!   [`vault_core::SessionProvider`] implementation
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use vault_remote::{RemoteAuth, RemoteClient, RemoteConfig, RemoteRecipeRepository};
//!
//! #[tokio::main]
//! async fn main() -> vault_core::Result<()> {
//!     let config = RemoteConfig::from_env()?;
//!     let auth = Arc::new(RemoteAuth::new(config.clone())?);
//!     auth.sign_in("cook@example.com", "hunter2").await?;
//!
//!     let client = RemoteClient::new(config, auth.clone())?;
//!     let repo = RemoteRecipeRepository::new(client);
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod recipes;

pub use auth::{map_auth_error, RemoteAuth};
pub use client::{RemoteClient, RemoteConfig};
pub use recipes::RemoteRecipeRepository;
