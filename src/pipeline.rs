//! The import pipeline: fetch → extract (structured, else LLM) → dedup →
//! fuzzy match → reconcile → persist links.

use crate::cleaner::clean_html;
use crate::completion::CompletionProvider;
use crate::config::ImporterConfig;
use crate::dedup::dedup_ingredients;
use crate::error::ImportError;
use crate::extractors::{extract_structured, LlmExtractor};
use crate::fetcher::Fetcher;
use crate::matcher::FuzzyMatcher;
use crate::model::{ExtractedIngredient, ExtractedRecipe, ExtractionMethod, ImportOutcome};
use crate::reconcile::reconcile;
use crate::store::RecipeStore;
use log::{info, warn};
use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::Mutex as AsyncMutex;

pub struct ImportPipeline<S: RecipeStore> {
    store: Arc<S>,
    provider: Arc<dyn CompletionProvider>,
    fetcher: Fetcher,
    config: ImporterConfig,
    // serializes the delete-then-insert link write per recipe; without this,
    // two concurrent re-imports of one recipe can interleave and leave a
    // partial link set
    recipe_locks: StdMutex<HashMap<i64, Arc<AsyncMutex<()>>>>,
}

impl<S: RecipeStore> ImportPipeline<S> {
    pub fn new(
        store: Arc<S>,
        provider: Arc<dyn CompletionProvider>,
        config: ImporterConfig,
    ) -> Result<Self, ImportError> {
        let fetcher = Fetcher::new(&config)?;
        Ok(Self {
            store,
            provider,
            fetcher,
            config,
            recipe_locks: StdMutex::new(HashMap::new()),
        })
    }

    /// Import a recipe from a URL into the household, creating the recipe
    /// row and its ingredient links. Fails with `Conflict` if the household
    /// already has a recipe with the extracted name.
    pub async fn import_url(
        &self,
        household_id: i64,
        url: &str,
    ) -> Result<ImportOutcome, ImportError> {
        let page = self.fetcher.fetch(url).await?;
        let (recipe, method) = self.extract(&page, url).await?;
        info!(
            "extracted '{}' via {} ({} ingredients)",
            recipe.name,
            method,
            recipe.ingredients.len()
        );

        if self
            .store
            .find_recipe_by_name(household_id, &recipe.name)
            .await?
            .is_some()
        {
            return Err(ImportError::Conflict(format!(
                "recipe '{}' already exists",
                recipe.name
            )));
        }

        let record = self
            .store
            .create_recipe(household_id, &recipe, Some(url))
            .await?;

        let lock = self.recipe_lock(record.id);
        let guard = lock.lock().await;
        let linked = self.link_ingredients(household_id, record.id, &recipe).await;
        drop(guard);
        self.release_recipe_lock(record.id, lock);

        // the recipe row is already committed; if linking fails, remove it
        // rather than leave a recipe with zero ingredients behind
        match linked {
            Ok((ingredients, created, skipped)) => Ok(ImportOutcome {
                recipe_id: record.id,
                extraction_method: method,
                ingredients_created: created,
                ingredients_skipped: skipped,
                ingredients,
                recipe,
            }),
            Err(e) => {
                if let Err(delete_err) = self.store.delete_recipe(household_id, record.id).await {
                    // keep the linking error as the cause; the orphaned row
                    // is a cleanup problem, not the failure itself
                    warn!(
                        "failed to remove recipe {} after linking error: {delete_err}",
                        record.id
                    );
                }
                Err(e)
            }
        }
    }

    /// Re-run the pipeline for an existing recipe, replacing its entire
    /// link set from a fresh extraction of its source URL.
    pub async fn reimport(
        &self,
        household_id: i64,
        recipe_id: i64,
    ) -> Result<ImportOutcome, ImportError> {
        let record = self
            .store
            .get_recipe(household_id, recipe_id)
            .await?
            .ok_or_else(|| ImportError::NotFound(format!("recipe {recipe_id}")))?;

        let url = record.source_url.clone().ok_or_else(|| {
            ImportError::BadRequest(format!("recipe '{}' has no source URL", record.name))
        })?;

        let page = self.fetcher.fetch(&url).await?;
        let (recipe, method) = self.extract(&page, &url).await?;

        let lock = self.recipe_lock(record.id);
        let guard = lock.lock().await;
        let linked = self.link_ingredients(household_id, record.id, &recipe).await;
        drop(guard);
        self.release_recipe_lock(record.id, lock);
        let (ingredients, created, skipped) = linked?;

        Ok(ImportOutcome {
            recipe_id: record.id,
            extraction_method: method,
            ingredients_created: created,
            ingredients_skipped: skipped,
            ingredients,
            recipe,
        })
    }

    /// Structured markup first; the LLM path only runs when no structured
    /// block yields at least one ingredient.
    async fn extract(
        &self,
        page: &str,
        url: &str,
    ) -> Result<(ExtractedRecipe, ExtractionMethod), ImportError> {
        if let Some(recipe) = extract_structured(page) {
            if !recipe.ingredients.is_empty() {
                return Ok((recipe, ExtractionMethod::Structured));
            }
        }

        let cleaned = clean_html(page, self.config.max_text_chars);
        let recipe = LlmExtractor::new(self.provider.as_ref())
            .extract(&cleaned, url)
            .await?;
        Ok((recipe, ExtractionMethod::Ai))
    }

    /// Dedup → fuzzy match → reconcile → replace the link set. Returns the
    /// deduplicated ingredients and the created/skipped counts.
    async fn link_ingredients(
        &self,
        household_id: i64,
        recipe_id: i64,
        recipe: &ExtractedRecipe,
    ) -> Result<(Vec<ExtractedIngredient>, usize, usize), ImportError> {
        let catalog = self.store.list_ingredients(household_id).await?;
        let deduped = dedup_ingredients(recipe.ingredients.clone());

        let fuzzy = FuzzyMatcher::new(self.provider.as_ref())
            .match_names(&catalog, &deduped)
            .await;

        let outcome = reconcile(
            self.store.as_ref(),
            household_id,
            recipe_id,
            &deduped,
            &catalog,
            &fuzzy,
        )
        .await?;

        self.store.replace_links(recipe_id, &outcome.links).await?;
        info!(
            "linked {} ingredients ({} created, {} skipped)",
            outcome.links.len(),
            outcome.created,
            outcome.skipped
        );

        Ok((deduped, outcome.created, outcome.skipped))
    }

    fn recipe_lock(&self, recipe_id: i64) -> Arc<AsyncMutex<()>> {
        let mut locks = self
            .recipe_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        locks
            .entry(recipe_id)
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    /// Return a lock handle obtained from [`Self::recipe_lock`]. Drops the
    /// map entry when no other task holds a handle, so the map does not
    /// accumulate an entry per recipe ever imported.
    fn release_recipe_lock(&self, recipe_id: i64, lock: Arc<AsyncMutex<()>>) {
        let mut locks = self
            .recipe_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        drop(lock);
        if locks
            .get(&recipe_id)
            .is_some_and(|entry| Arc::strong_count(entry) == 1)
        {
            locks.remove(&recipe_id);
        }
    }
}
