//! File-backed legacy store adapter.
//!
//! The pre-authentication app persisted everything in a single string-keyed
//! local slot: one key holding a JSON array of legacy recipes, one holding
//! the migration completion flag. This adapter reproduces that storage as a
//! directory of flat slot files with get/set/remove primitives. There is no
//! transactional guarantee across keys.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use vault_core::defaults::{ENV_LEGACY_DIR, LEGACY_RECIPES_KEY, MIGRATION_FLAG_KEY};
use vault_core::{Error, LegacyRecipe, LegacyStore, Result};

/// Legacy store over a directory of string-keyed slot files.
pub struct FileLegacyStore {
    dir: PathBuf,
}

impl FileLegacyStore {
    /// Create a store rooted at `dir`. The directory is created lazily on
    /// first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Create from the `VAULT_LEGACY_DIR` environment variable.
    pub fn from_env() -> Result<Self> {
        let dir = std::env::var(ENV_LEGACY_DIR)
            .map_err(|_| Error::Config(format!("{} is not set", ENV_LEGACY_DIR)))?;
        Ok(Self::new(dir))
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    /// Read a slot. A missing slot is `None`, not an error.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.slot_path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Write a slot, creating the store directory if needed.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.slot_path(key), value)?;
        Ok(())
    }

    /// Remove a slot. Removing a missing slot is not an error.
    pub fn remove(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.slot_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// The directory backing this store.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl LegacyStore for FileLegacyStore {
    fn load(&self) -> Result<Vec<LegacyRecipe>> {
        match self.get(LEGACY_RECIPES_KEY)? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }

    fn migration_completed(&self) -> bool {
        matches!(self.get(MIGRATION_FLAG_KEY), Ok(Some(v)) if v == "true")
    }

    fn mark_migration_completed(&self) -> Result<()> {
        self.set(MIGRATION_FLAG_KEY, "true")
    }

    fn clear(&self) -> Result<()> {
        self.remove(LEGACY_RECIPES_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, FileLegacyStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileLegacyStore::new(dir.path());
        (dir, store)
    }

    #[test]
    fn test_missing_slot_is_none() {
        let (_dir, store) = store();
        assert_eq!(store.get("nothing").unwrap(), None);
    }

    #[test]
    fn test_set_get_remove_round_trip() {
        let (_dir, store) = store();
        store.set("slot", "value").unwrap();
        assert_eq!(store.get("slot").unwrap().as_deref(), Some("value"));

        store.remove("slot").unwrap();
        assert_eq!(store.get("slot").unwrap(), None);
        // Removing again is a no-op.
        store.remove("slot").unwrap();
    }

    #[test]
    fn test_load_missing_slot_is_empty_list() {
        let (_dir, store) = store();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_load_parses_legacy_json() {
        let (_dir, store) = store();
        store
            .set(
                LEGACY_RECIPES_KEY,
                r#"[{
                    "id": "recipe-1",
                    "name": "Toast",
                    "servings": 1,
                    "notes": "",
                    "ingredients": [],
                    "createdAt": 1700000000000,
                    "order": 3
                }]"#,
            )
            .unwrap();

        let recipes = store.load().unwrap();
        assert_eq!(recipes.len(), 1);
        assert_eq!(recipes[0].name, "Toast");
        assert_eq!(recipes[0].order, 3);
    }

    #[test]
    fn test_load_malformed_json_is_error() {
        let (_dir, store) = store();
        store.set(LEGACY_RECIPES_KEY, "{not json").unwrap();
        assert!(matches!(
            store.load(),
            Err(vault_core::Error::Serialization(_))
        ));
    }

    #[test]
    fn test_migration_flag_lifecycle() {
        let (_dir, store) = store();
        assert!(!store.migration_completed());

        store.mark_migration_completed().unwrap();
        assert!(store.migration_completed());
    }

    #[test]
    fn test_flag_other_value_is_not_completed() {
        let (_dir, store) = store();
        store.set(MIGRATION_FLAG_KEY, "false").unwrap();
        assert!(!store.migration_completed());
    }

    #[test]
    fn test_clear_drops_recipes_only() {
        let (_dir, store) = store();
        store.set(LEGACY_RECIPES_KEY, "[]").unwrap();
        store.mark_migration_completed().unwrap();

        store.clear().unwrap();
        assert_eq!(store.get(LEGACY_RECIPES_KEY).unwrap(), None);
        assert!(store.migration_completed());
    }
}
