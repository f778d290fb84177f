//! Domain models for FlavourVault.
//!
//! Wire shapes match the remote `recipes` table columns; the legacy shapes
//! match the JSON the pre-authentication local store wrote to disk.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::defaults::{MAX_RECIPE_TAGS, MIN_SERVINGS};

// =============================================================================
// INGREDIENT
// =============================================================================

/// A single ingredient line within a recipe.
///
/// Owned exclusively by its parent recipe; ingredients have no independent
/// lifecycle and their order within the recipe is meaningful.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    /// Unique within the parent recipe.
    pub id: Uuid,
    pub name: String,
    /// Quantity, non-negative. Unitless values use an empty `unit`.
    pub amount: f64,
    pub unit: String,
}

impl Ingredient {
    /// Create a new ingredient with a fresh id.
    pub fn new(name: impl Into<String>, amount: f64, unit: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            amount: amount.max(0.0),
            unit: unit.into(),
        }
    }
}

// =============================================================================
// TAG SET
// =============================================================================

/// Insertion-ordered, duplicate-free tag collection, capped at
/// [`MAX_RECIPE_TAGS`] entries.
///
/// Inserting beyond the cap, inserting a duplicate, or inserting an empty
/// string is a no-op returning `false` — never an error. Serialises as a
/// plain JSON array so it maps directly onto the remote `text[]` column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSet {
    tags: Vec<String>,
}

impl TagSet {
    /// Create an empty tag set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a tag (trimmed). Returns `true` if the tag was added.
    pub fn insert(&mut self, tag: impl Into<String>) -> bool {
        let tag = tag.into().trim().to_string();
        if tag.is_empty()
            || self.tags.len() >= MAX_RECIPE_TAGS
            || self.tags.iter().any(|t| t == &tag)
        {
            return false;
        }
        self.tags.push(tag);
        true
    }

    /// Remove a tag. Returns `true` if the tag was present.
    pub fn remove(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t != tag);
        self.tags.len() != before
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.tags
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl FromIterator<String> for TagSet {
    /// Collect tags, applying the same trim/duplicate/cap rules as
    /// [`TagSet::insert`]. Excess entries are dropped silently.
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut set = TagSet::new();
        for tag in iter {
            set.insert(tag);
        }
        set
    }
}

// =============================================================================
// RECIPE
// =============================================================================

/// A persisted recipe, as stored in the remote `recipes` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    /// Globally unique, server-assigned.
    pub id: Uuid,
    /// Owning user; every remote operation is row-scoped to this user.
    pub user_id: Uuid,
    pub name: String,
    pub servings: i32,
    pub notes: String,
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub tags: TagSet,
    #[serde(default)]
    pub is_favourite: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Position in the user's display order. Unique per user at rest, not
    /// necessarily contiguous.
    pub order_index: i64,
}

impl Recipe {
    /// Ingredient list scaled to a different serving count.
    ///
    /// Returns amount-scaled copies preserving order; the recipe itself is
    /// unchanged. A target below the minimum is clamped.
    pub fn scaled_ingredients(&self, target_servings: i32) -> Vec<Ingredient> {
        let target = target_servings.max(MIN_SERVINGS);
        let base = self.servings.max(MIN_SERVINGS);
        let factor = f64::from(target) / f64::from(base);
        self.ingredients
            .iter()
            .map(|i| Ingredient {
                id: i.id,
                name: i.name.clone(),
                amount: i.amount * factor,
                unit: i.unit.clone(),
            })
            .collect()
    }
}

// =============================================================================
// DRAFT / EDITABLE RECIPE
// =============================================================================

/// The fields of a recipe that has not been persisted yet.
///
/// Drafts have no id, owner, or timestamps — all of those are assigned by the
/// remote store on create.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeDraft {
    pub name: String,
    pub servings: i32,
    pub notes: String,
    pub ingredients: Vec<Ingredient>,
    pub tags: TagSet,
}

impl Default for RecipeDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            servings: MIN_SERVINGS,
            notes: String::new(),
            ingredients: Vec::new(),
            tags: TagSet::new(),
        }
    }
}

/// A recipe as held by an editor: either a not-yet-persisted draft or a
/// persisted row.
///
/// The split makes the create/update branch a type-level distinction: only a
/// `Draft` can reach the create path, only `Saved` can reach update/delete.
#[derive(Debug, Clone, PartialEq)]
pub enum EditableRecipe {
    Draft(RecipeDraft),
    Saved(Recipe),
}

impl EditableRecipe {
    /// Start editing a brand-new recipe.
    pub fn draft() -> Self {
        EditableRecipe::Draft(RecipeDraft::default())
    }

    pub fn is_draft(&self) -> bool {
        matches!(self, EditableRecipe::Draft(_))
    }

    pub fn name(&self) -> &str {
        match self {
            EditableRecipe::Draft(d) => &d.name,
            EditableRecipe::Saved(r) => &r.name,
        }
    }

    /// The persisted recipe, if this is one.
    pub fn as_saved(&self) -> Option<&Recipe> {
        match self {
            EditableRecipe::Draft(_) => None,
            EditableRecipe::Saved(r) => Some(r),
        }
    }
}

// =============================================================================
// AUTH USER
// =============================================================================

/// The authenticated user, as reported by the session provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// LEGACY SHAPES
// =============================================================================

/// Ingredient shape in the legacy local store. Legacy ids were free-form
/// strings; they are regenerated as UUIDs during migration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyIngredient {
    pub id: String,
    pub name: String,
    pub amount: f64,
    pub unit: String,
}

/// Recipe shape in the legacy local store: no owner, tags, favourite flag or
/// server timestamps; a numeric display `order` and an epoch-millis creation
/// stamp instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyRecipe {
    pub id: String,
    pub name: String,
    pub servings: i32,
    pub notes: String,
    pub ingredients: Vec<LegacyIngredient>,
    #[serde(rename = "createdAt")]
    pub created_at: i64,
    pub order: i64,
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe_with_servings(servings: i32) -> Recipe {
        Recipe {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Pancakes".to_string(),
            servings,
            notes: String::new(),
            ingredients: vec![
                Ingredient::new("flour", 200.0, "g"),
                Ingredient::new("milk", 300.0, "ml"),
            ],
            tags: TagSet::new(),
            is_favourite: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            order_index: 0,
        }
    }

    #[test]
    fn test_tag_set_insert_and_order() {
        let mut tags = TagSet::new();
        assert!(tags.insert("dessert"));
        assert!(tags.insert("quick"));
        assert_eq!(tags.as_slice(), ["dessert", "quick"]);
    }

    #[test]
    fn test_tag_set_rejects_duplicates() {
        let mut tags = TagSet::new();
        assert!(tags.insert("dessert"));
        assert!(!tags.insert("dessert"));
        assert_eq!(tags.len(), 1);
    }

    #[test]
    fn test_tag_set_trims_and_rejects_empty() {
        let mut tags = TagSet::new();
        assert!(tags.insert("  spicy  "));
        assert!(tags.contains("spicy"));
        assert!(!tags.insert("   "));
        assert_eq!(tags.len(), 1);
    }

    #[test]
    fn test_tag_set_cap_is_silent_noop() {
        let mut tags = TagSet::new();
        for i in 0..MAX_RECIPE_TAGS {
            assert!(tags.insert(format!("tag{}", i)));
        }
        assert!(!tags.insert("one-too-many"));
        assert_eq!(tags.len(), MAX_RECIPE_TAGS);
        assert!(!tags.contains("one-too-many"));
    }

    #[test]
    fn test_tag_set_remove() {
        let mut tags = TagSet::new();
        tags.insert("a");
        tags.insert("b");
        assert!(tags.remove("a"));
        assert!(!tags.remove("a"));
        assert_eq!(tags.as_slice(), ["b"]);
    }

    #[test]
    fn test_tag_set_serde_is_plain_array() {
        let tags: TagSet = ["dinner".to_string(), "easy".to_string()]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&tags).unwrap();
        assert_eq!(json, r#"["dinner","easy"]"#);

        let back: TagSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tags);
    }

    #[test]
    fn test_scaled_ingredients_doubles_amounts() {
        let recipe = recipe_with_servings(2);
        let scaled = recipe.scaled_ingredients(4);
        assert_eq!(scaled[0].amount, 400.0);
        assert_eq!(scaled[1].amount, 600.0);
        // Order and identity preserved, source untouched.
        assert_eq!(scaled[0].id, recipe.ingredients[0].id);
        assert_eq!(recipe.ingredients[0].amount, 200.0);
    }

    #[test]
    fn test_scaled_ingredients_clamps_target() {
        let recipe = recipe_with_servings(2);
        let scaled = recipe.scaled_ingredients(0);
        assert_eq!(scaled[0].amount, 100.0); // clamped to 1 serving
    }

    #[test]
    fn test_editable_recipe_type_split() {
        let editable = EditableRecipe::draft();
        assert!(editable.is_draft());
        assert!(editable.as_saved().is_none());

        let saved = EditableRecipe::Saved(recipe_with_servings(2));
        assert!(!saved.is_draft());
        assert_eq!(saved.name(), "Pancakes");
    }

    #[test]
    fn test_legacy_recipe_deserializes_camel_case_stamp() {
        let json = r#"{
            "id": "recipe-1699999999999",
            "name": "Toast",
            "servings": 1,
            "notes": "",
            "ingredients": [
                {"id": "ing-1", "name": "bread", "amount": 2, "unit": "slices"}
            ],
            "createdAt": 1699999999999,
            "order": 0
        }"#;
        let legacy: LegacyRecipe = serde_json::from_str(json).unwrap();
        assert_eq!(legacy.created_at, 1_699_999_999_999);
        assert_eq!(legacy.ingredients[0].id, "ing-1");
        assert_eq!(legacy.order, 0);
    }

    #[test]
    fn test_recipe_row_round_trip() {
        let recipe = recipe_with_servings(3);
        let json = serde_json::to_string(&recipe).unwrap();
        let back: Recipe = serde_json::from_str(&json).unwrap();
        assert_eq!(back, recipe);
    }

    #[test]
    fn test_recipe_row_defaults_missing_tags_and_favourite() {
        // Rows created before the tags/favourite columns existed.
        let json = format!(
            r#"{{
                "id": "{}",
                "user_id": "{}",
                "name": "Old Row",
                "servings": 2,
                "notes": "",
                "ingredients": [],
                "created_at": "2024-01-01T00:00:00Z",
                "updated_at": "2024-01-01T00:00:00Z",
                "order_index": 7
            }}"#,
            Uuid::nil(),
            Uuid::nil()
        );
        let recipe: Recipe = serde_json::from_str(&json).unwrap();
        assert!(recipe.tags.is_empty());
        assert!(!recipe.is_favourite);
    }
}
