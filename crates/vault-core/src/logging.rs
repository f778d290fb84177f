//! Structured logging schema and field name constants for FlavourVault.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log tooling can query by standardized field names across every
//! subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires attention |
//! | WARN  | Recoverable issue, fallback or rollback applied |
//! | INFO  | Lifecycle events (sign-in, migration), operation completions |
//! | DEBUG | Decision points, cache hits/misses, config choices |
//! | TRACE | Per-item iteration (filter stages, batch members) |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "remote", "client", "auth", "migration"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "recipes", "cache", "legacy_store", "session"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "list", "create", "reorder", "migrate"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Authenticated user UUID.
pub const USER_ID: &str = "user_id";

/// Recipe UUID being operated on.
pub const RECIPE_ID: &str = "recipe_id";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of results returned by a fetch or search.
pub const RESULT_COUNT: &str = "result_count";

/// Number of rows in a batch (reorder, bulk create).
pub const BATCH_SIZE: &str = "batch_size";

/// Number of legacy rows migrated.
pub const MIGRATED_COUNT: &str = "migrated_count";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";

/// Whether an optimistic mutation was rolled back.
pub const ROLLED_BACK: &str = "rolled_back";
