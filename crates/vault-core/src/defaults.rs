//! Default values and well-known keys shared across FlavourVault crates.

/// Maximum number of tags a recipe may carry. Inserting beyond the cap is a
/// silent no-op, not an error.
pub const MAX_RECIPE_TAGS: usize = 5;

/// Minimum serving count for a recipe.
pub const MIN_SERVINGS: i32 = 1;

/// Default timeout for remote store requests (seconds).
pub const REMOTE_TIMEOUT_SECS: u64 = 30;

/// Buffer capacity for the session event broadcast channel.
pub const SESSION_BUS_CAPACITY: usize = 16;

/// Environment variable: remote store base URL.
pub const ENV_REMOTE_URL: &str = "VAULT_REMOTE_URL";

/// Environment variable: remote store API key.
pub const ENV_REMOTE_API_KEY: &str = "VAULT_REMOTE_API_KEY";

/// Environment variable: remote request timeout override (seconds).
pub const ENV_REMOTE_TIMEOUT_SECS: &str = "VAULT_REMOTE_TIMEOUT_SECS";

/// Environment variable: directory holding the legacy local store slots.
pub const ENV_LEGACY_DIR: &str = "VAULT_LEGACY_DIR";

/// Legacy slot key holding the JSON-serialized recipe array.
pub const LEGACY_RECIPES_KEY: &str = "flavourvault_recipes";

/// Legacy slot key holding the migration completion flag ("true"/absent).
pub const MIGRATION_FLAG_KEY: &str = "flavourvault_migration_completed";
