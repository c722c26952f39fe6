//! Household-scoped persistence seam.
//!
//! The pipeline only ever talks to [`RecipeStore`]; the backing technology
//! is the caller's concern. [`MemoryStore`] is a complete in-process
//! implementation used by the CLI and the test suites.

use crate::error::StoreError;
use crate::model::{CatalogIngredient, ExtractedRecipe, RecipeIngredientLink, RecipeRecord};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

#[async_trait]
pub trait RecipeStore: Send + Sync {
    /// Case-insensitive recipe lookup by name within a household.
    async fn find_recipe_by_name(
        &self,
        household_id: i64,
        name: &str,
    ) -> Result<Option<RecipeRecord>, StoreError>;

    async fn get_recipe(
        &self,
        household_id: i64,
        recipe_id: i64,
    ) -> Result<Option<RecipeRecord>, StoreError>;

    async fn create_recipe(
        &self,
        household_id: i64,
        recipe: &ExtractedRecipe,
        source_url: Option<&str>,
    ) -> Result<RecipeRecord, StoreError>;

    async fn delete_recipe(&self, household_id: i64, recipe_id: i64) -> Result<(), StoreError>;

    async fn list_ingredients(
        &self,
        household_id: i64,
    ) -> Result<Vec<CatalogIngredient>, StoreError>;

    /// Case-insensitive ingredient lookup by name within a household.
    async fn find_ingredient_by_name(
        &self,
        household_id: i64,
        name: &str,
    ) -> Result<Option<CatalogIngredient>, StoreError>;

    /// Create a catalog ingredient. Returns [`StoreError::UniqueViolation`]
    /// if the household already has one with the same name, in any case.
    async fn create_ingredient(
        &self,
        household_id: i64,
        name: &str,
    ) -> Result<CatalogIngredient, StoreError>;

    /// Replace a recipe's entire link set: delete all existing rows, then
    /// insert the given ones.
    async fn replace_links(
        &self,
        recipe_id: i64,
        links: &[RecipeIngredientLink],
    ) -> Result<(), StoreError>;

    async fn list_links(&self, recipe_id: i64) -> Result<Vec<RecipeIngredientLink>, StoreError>;
}

#[derive(Default)]
struct MemoryInner {
    next_id: i64,
    recipes: HashMap<i64, RecipeRecord>,
    ingredients: HashMap<i64, CatalogIngredient>,
    links: Vec<RecipeIngredientLink>,
}

impl MemoryInner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-process store backed by plain maps.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MemoryInner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Unavailable("store mutex poisoned".to_string()))
    }
}

#[async_trait]
impl RecipeStore for MemoryStore {
    async fn find_recipe_by_name(
        &self,
        household_id: i64,
        name: &str,
    ) -> Result<Option<RecipeRecord>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .recipes
            .values()
            .find(|r| r.household_id == household_id && r.name.eq_ignore_ascii_case(name))
            .cloned())
    }

    async fn get_recipe(
        &self,
        household_id: i64,
        recipe_id: i64,
    ) -> Result<Option<RecipeRecord>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .recipes
            .get(&recipe_id)
            .filter(|r| r.household_id == household_id)
            .cloned())
    }

    async fn create_recipe(
        &self,
        household_id: i64,
        recipe: &ExtractedRecipe,
        source_url: Option<&str>,
    ) -> Result<RecipeRecord, StoreError> {
        let mut inner = self.lock()?;
        let id = inner.next_id();
        let record = RecipeRecord {
            id,
            household_id,
            name: recipe.name.clone(),
            description: recipe.description.clone(),
            category: recipe.category,
            cuisine: recipe.cuisine.clone(),
            source_url: source_url.map(str::to_string),
        };
        inner.recipes.insert(id, record.clone());
        Ok(record)
    }

    async fn delete_recipe(&self, household_id: i64, recipe_id: i64) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        let owned = inner
            .recipes
            .get(&recipe_id)
            .is_some_and(|r| r.household_id == household_id);
        if owned {
            inner.recipes.remove(&recipe_id);
            inner.links.retain(|l| l.recipe_id != recipe_id);
        }
        Ok(())
    }

    async fn list_ingredients(
        &self,
        household_id: i64,
    ) -> Result<Vec<CatalogIngredient>, StoreError> {
        let inner = self.lock()?;
        let mut ingredients: Vec<CatalogIngredient> = inner
            .ingredients
            .values()
            .filter(|i| i.household_id == household_id)
            .cloned()
            .collect();
        ingredients.sort_by_key(|i| i.id);
        Ok(ingredients)
    }

    async fn find_ingredient_by_name(
        &self,
        household_id: i64,
        name: &str,
    ) -> Result<Option<CatalogIngredient>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .ingredients
            .values()
            .find(|i| i.household_id == household_id && i.name.eq_ignore_ascii_case(name))
            .cloned())
    }

    async fn create_ingredient(
        &self,
        household_id: i64,
        name: &str,
    ) -> Result<CatalogIngredient, StoreError> {
        let mut inner = self.lock()?;
        let duplicate = inner
            .ingredients
            .values()
            .any(|i| i.household_id == household_id && i.name.eq_ignore_ascii_case(name));
        if duplicate {
            return Err(StoreError::UniqueViolation(format!(
                "ingredient '{name}' already exists in household {household_id}"
            )));
        }
        let id = inner.next_id();
        let ingredient = CatalogIngredient {
            id,
            household_id,
            name: name.to_string(),
        };
        inner.ingredients.insert(id, ingredient.clone());
        Ok(ingredient)
    }

    async fn replace_links(
        &self,
        recipe_id: i64,
        links: &[RecipeIngredientLink],
    ) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        inner.links.retain(|l| l.recipe_id != recipe_id);
        inner.links.extend_from_slice(links);
        Ok(())
    }

    async fn list_links(&self, recipe_id: i64) -> Result<Vec<RecipeIngredientLink>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .links
            .iter()
            .filter(|l| l.recipe_id == recipe_id)
            .cloned()
            .collect())
    }
}
