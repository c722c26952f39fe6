use serde::{Deserialize, Serialize};
use std::fmt;

/// Recipe category. Anything a source page reports outside this set
/// normalizes to [`Category::Entree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Entree,
    Side,
    Dessert,
    Appetizer,
    Breakfast,
    Soup,
    Salad,
    Beverage,
}

impl Category {
    /// Normalize a free-form category string. Unknown or missing → Entree.
    pub fn normalize(raw: Option<&str>) -> Category {
        match raw.map(|s| s.trim().to_lowercase()).as_deref() {
            Some("entree") => Category::Entree,
            Some("side") => Category::Side,
            Some("dessert") => Category::Dessert,
            Some("appetizer") => Category::Appetizer,
            Some("breakfast") => Category::Breakfast,
            Some("soup") => Category::Soup,
            Some("salad") => Category::Salad,
            Some("beverage") => Category::Beverage,
            _ => Category::Entree,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Entree => "entree",
            Category::Side => "side",
            Category::Dessert => "dessert",
            Category::Appetizer => "appetizer",
            Category::Breakfast => "breakfast",
            Category::Soup => "soup",
            Category::Salad => "salad",
            Category::Beverage => "beverage",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ingredient as extracted from a source page, before reconciliation.
///
/// `quantity` is `None` whenever the source text was not parseable as a
/// number, fraction, or mixed number; extraction never fails on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedIngredient {
    pub name: String,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub notes: Option<String>,
    pub sort_order: usize,
}

/// A recipe as extracted from a source page. Produced once per import run
/// and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedRecipe {
    pub name: String,
    pub description: String,
    pub category: Category,
    pub cuisine: String,
    pub ingredients: Vec<ExtractedIngredient>,
}

/// A household's canonical ingredient record, referenced by many recipes.
/// Unique per (household, case-insensitive name).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogIngredient {
    pub id: i64,
    pub household_id: i64,
    pub name: String,
}

/// A persisted recipe row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeRecord {
    pub id: i64,
    pub household_id: i64,
    pub name: String,
    pub description: String,
    pub category: Category,
    pub cuisine: String,
    pub source_url: Option<String>,
}

/// Join row between a recipe and a catalog ingredient. At most one row per
/// (recipe_id, ingredient_id); the reconciliation engine enforces this even
/// when two extracted names resolve to the same catalog id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeIngredientLink {
    pub recipe_id: i64,
    pub ingredient_id: i64,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub notes: Option<String>,
    pub sort_order: usize,
}

/// Which extraction path produced the recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMethod {
    Structured,
    Ai,
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionMethod::Structured => f.write_str("structured"),
            ExtractionMethod::Ai => f.write_str("ai"),
        }
    }
}

/// Result of one import run.
#[derive(Debug, Clone, Serialize)]
pub struct ImportOutcome {
    pub recipe_id: i64,
    pub extraction_method: ExtractionMethod,
    pub ingredients_created: usize,
    pub ingredients_skipped: usize,
    pub ingredients: Vec<ExtractedIngredient>,
    pub recipe: ExtractedRecipe,
}
