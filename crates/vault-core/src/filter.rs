//! Recipe filter/search engine.
//!
//! [`filter_recipes`] is a pure function from a recipe collection and a
//! [`RecipeFilters`] value to the visible subset. The same function backs
//! both the fully client-side path (filtering an already-fetched list) and
//! the server-assisted path (re-applied over the superset a push-down query
//! returns), which keeps the two paths observably identical.

use serde::{Deserialize, Serialize};

use crate::models::Recipe;

/// Filter criteria for the recipe list.
///
/// A plain criteria value — never persisted, lifecycle is UI-session-scoped.
/// The default value selects everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecipeFilters {
    /// Free-text search term. Matched against recipe names as a
    /// case-insensitive substring and, when [`Self::search_in_ingredients`]
    /// is set, against ingredient names as a case-insensitive exact match.
    #[serde(default)]
    pub search_term: String,

    /// Tags to filter by. A recipe matches when it shares at least one tag
    /// with this list (OR semantics).
    #[serde(default)]
    pub selected_tags: Vec<String>,

    /// Keep only favourited recipes.
    #[serde(default)]
    pub favourites_only: bool,

    /// Extend the text stage to ingredient names.
    #[serde(default)]
    pub search_in_ingredients: bool,
}

impl RecipeFilters {
    /// Create the all-empty criteria (selects everything).
    pub fn new() -> Self {
        Self::default()
    }

    /// Criteria with only a search term set.
    pub fn with_term(term: impl Into<String>) -> Self {
        Self {
            search_term: term.into(),
            ..Self::default()
        }
    }

    /// True when any non-text criterion is active.
    pub fn is_active(&self) -> bool {
        !self.selected_tags.is_empty() || self.favourites_only || self.search_in_ingredients
    }

    /// True when no stage would narrow the input at all.
    pub fn is_empty(&self) -> bool {
        self.search_term.trim().is_empty() && !self.is_active()
    }
}

/// Compute the visible subset of `recipes` under `filters`.
///
/// Stages apply in a fixed order, each narrowing the previous stage's
/// output: text match, favourites, tags, then a stable case-insensitive
/// sort by name. Name matching is substring; ingredient matching is exact
/// (the full term must equal the ingredient name, ignoring case) — that
/// asymmetry is deliberate, so searching "flour" does not drag in every
/// recipe containing "bread flour".
pub fn filter_recipes(recipes: &[Recipe], filters: &RecipeFilters) -> Vec<Recipe> {
    let term = filters.search_term.trim().to_lowercase();

    let mut matched: Vec<Recipe> = recipes
        .iter()
        .filter(|recipe| {
            if term.is_empty() {
                return true;
            }
            if recipe.name.to_lowercase().contains(&term) {
                return true;
            }
            filters.search_in_ingredients
                && recipe
                    .ingredients
                    .iter()
                    .any(|i| i.name.to_lowercase() == term)
        })
        .filter(|recipe| !filters.favourites_only || recipe.is_favourite)
        .filter(|recipe| {
            filters.selected_tags.is_empty()
                || filters.selected_tags.iter().any(|t| recipe.tags.contains(t))
        })
        .cloned()
        .collect();

    matched.sort_by_key(|r| r.name.to_lowercase());
    matched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Ingredient, TagSet};
    use chrono::Utc;
    use uuid::Uuid;

    fn recipe(name: &str) -> Recipe {
        Recipe {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            name: name.to_string(),
            servings: 2,
            notes: String::new(),
            ingredients: Vec::new(),
            tags: TagSet::new(),
            is_favourite: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            order_index: 0,
        }
    }

    fn with_tags(mut r: Recipe, tags: &[&str]) -> Recipe {
        r.tags = tags.iter().map(|t| t.to_string()).collect();
        r
    }

    fn with_ingredient(mut r: Recipe, name: &str) -> Recipe {
        r.ingredients.push(Ingredient::new(name, 1.0, ""));
        r
    }

    fn favourited(mut r: Recipe) -> Recipe {
        r.is_favourite = true;
        r
    }

    fn names(recipes: &[Recipe]) -> Vec<&str> {
        recipes.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_empty_input_empty_output() {
        let result = filter_recipes(&[], &RecipeFilters::with_term("cake"));
        assert!(result.is_empty());
    }

    #[test]
    fn test_default_filters_return_all_sorted() {
        let all = vec![recipe("Zest Cake"), recipe("apple pie"), recipe("Bread")];
        let result = filter_recipes(&all, &RecipeFilters::new());
        assert_eq!(result.len(), all.len());
        assert_eq!(names(&result), ["apple pie", "Bread", "Zest Cake"]);
    }

    #[test]
    fn test_name_match_is_substring_case_insensitive() {
        let all = vec![recipe("Chocolate Cake"), recipe("Pancakes"), recipe("Soup")];
        let result = filter_recipes(&all, &RecipeFilters::with_term("CAKE"));
        assert_eq!(names(&result), ["Chocolate Cake", "Pancakes"]);
    }

    #[test]
    fn test_search_term_is_trimmed() {
        let all = vec![recipe("Soup")];
        let result = filter_recipes(&all, &RecipeFilters::with_term("  soup  "));
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_ingredient_match_requires_flag() {
        let all = vec![with_ingredient(recipe("Bread"), "flour")];
        let without = filter_recipes(&all, &RecipeFilters::with_term("flour"));
        assert!(without.is_empty());

        let mut filters = RecipeFilters::with_term("flour");
        filters.search_in_ingredients = true;
        let with = filter_recipes(&all, &filters);
        assert_eq!(with.len(), 1);
    }

    #[test]
    fn test_ingredient_match_is_exact_not_substring() {
        // "Flour" matches the term exactly (case-insensitive); "bread flour"
        // does not, despite containing it.
        let exact = with_ingredient(recipe("Scones"), "Flour");
        let substring = with_ingredient(recipe("Baguette"), "bread flour");
        let all = vec![exact, substring];

        let mut filters = RecipeFilters::with_term("flour");
        filters.search_in_ingredients = true;
        let result = filter_recipes(&all, &filters);
        assert_eq!(names(&result), ["Scones"]);
    }

    #[test]
    fn test_favourites_only() {
        let all = vec![
            recipe("Zest Cake"),
            favourited(with_tags(recipe("apple pie"), &["dessert"])),
        ];
        let filters = RecipeFilters {
            favourites_only: true,
            ..RecipeFilters::default()
        };
        let result = filter_recipes(&all, &filters);
        assert_eq!(names(&result), ["apple pie"]);
    }

    #[test]
    fn test_tag_filter_is_any_overlap() {
        let all = vec![
            with_tags(recipe("Curry"), &["dinner", "spicy"]),
            with_tags(recipe("Salad"), &["lunch"]),
            recipe("Untagged"),
        ];
        let filters = RecipeFilters {
            selected_tags: vec!["spicy".to_string(), "breakfast".to_string()],
            ..RecipeFilters::default()
        };
        let result = filter_recipes(&all, &filters);
        assert_eq!(names(&result), ["Curry"]);
    }

    #[test]
    fn test_stages_compose() {
        let all = vec![
            favourited(with_tags(recipe("Apple Cake"), &["dessert"])),
            favourited(with_tags(recipe("Carrot Cake"), &["veg"])),
            with_tags(recipe("Cheese Cake"), &["dessert"]),
            favourited(with_tags(recipe("Stew"), &["dessert"])),
        ];
        let filters = RecipeFilters {
            search_term: "cake".to_string(),
            selected_tags: vec!["dessert".to_string()],
            favourites_only: true,
            search_in_ingredients: false,
        };
        let result = filter_recipes(&all, &filters);
        assert_eq!(names(&result), ["Apple Cake"]);
    }

    #[test]
    fn test_no_match_is_empty_not_error() {
        let all = vec![recipe("Soup")];
        let result = filter_recipes(&all, &RecipeFilters::with_term("cake"));
        assert!(result.is_empty());
    }

    #[test]
    fn test_result_is_subset_and_idempotent() {
        let all = vec![
            favourited(with_tags(recipe("Apple Cake"), &["dessert"])),
            recipe("Bread"),
            favourited(recipe("zucchini soup")),
        ];
        let filters = RecipeFilters {
            favourites_only: true,
            ..RecipeFilters::default()
        };

        let once = filter_recipes(&all, &filters);
        assert!(once.iter().all(|r| all.iter().any(|a| a.id == r.id)));

        let twice = filter_recipes(&once, &filters);
        assert_eq!(twice, once);
    }

    #[test]
    fn test_sort_is_case_insensitive() {
        let all = vec![recipe("banana bread"), recipe("Apricot Jam")];
        let result = filter_recipes(&all, &RecipeFilters::new());
        assert_eq!(names(&result), ["Apricot Jam", "banana bread"]);
    }

    #[test]
    fn test_is_active_ignores_search_term() {
        let mut filters = RecipeFilters::with_term("cake");
        assert!(!filters.is_active());
        assert!(!filters.is_empty());

        filters.favourites_only = true;
        assert!(filters.is_active());
    }
}
