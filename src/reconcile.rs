//! Resolves each deduplicated ingredient to a catalog id, creating catalog
//! entries on first sighting, and stages the recipe's link rows.
//!
//! Two hazards are handled here: a concurrent import creating the same new
//! ingredient name (optimistic insert, recover by re-reading), and two
//! different extracted names resolving to the same catalog id (the second
//! is skipped so the one-link-per-ingredient invariant holds).

use crate::error::{ImportError, StoreError};
use crate::model::{CatalogIngredient, ExtractedIngredient, RecipeIngredientLink};
use crate::store::RecipeStore;
use log::{debug, info};
use std::collections::{HashMap, HashSet};

/// Staged links plus counters for the import outcome.
#[derive(Debug)]
pub struct ReconcileOutcome {
    pub links: Vec<RecipeIngredientLink>,
    pub created: usize,
    pub skipped: usize,
}

pub async fn reconcile(
    store: &dyn RecipeStore,
    household_id: i64,
    recipe_id: i64,
    deduped: &[ExtractedIngredient],
    catalog: &[CatalogIngredient],
    fuzzy_matches: &HashMap<String, i64>,
) -> Result<ReconcileOutcome, ImportError> {
    // request-scoped exact index, rebuilt per run
    let exact: HashMap<String, i64> = catalog
        .iter()
        .map(|ing| (ing.name.trim().to_lowercase(), ing.id))
        .collect();

    let mut consumed: HashSet<i64> = HashSet::new();
    let mut outcome = ReconcileOutcome {
        links: Vec::with_capacity(deduped.len()),
        created: 0,
        skipped: 0,
    };

    for ingredient in deduped {
        let key = ingredient.name.trim().to_lowercase();
        let candidate = fuzzy_matches.get(&key).or_else(|| exact.get(&key)).copied();

        let ingredient_id = match candidate {
            Some(id) => id,
            None => {
                match store.create_ingredient(household_id, ingredient.name.trim()).await {
                    Ok(created) => {
                        debug!("created catalog ingredient '{}'", created.name);
                        outcome.created += 1;
                        created.id
                    }
                    Err(StoreError::UniqueViolation(_)) => {
                        // another import won the race; use its row
                        store
                            .find_ingredient_by_name(household_id, ingredient.name.trim())
                            .await?
                            .ok_or_else(|| {
                                StoreError::Unavailable(format!(
                                    "ingredient '{}' conflicted but cannot be found",
                                    ingredient.name
                                ))
                            })?
                            .id
                    }
                    Err(other) => return Err(other.into()),
                }
            }
        };

        if !consumed.insert(ingredient_id) {
            info!(
                "skipping '{}': catalog ingredient {} already linked in this run",
                ingredient.name, ingredient_id
            );
            outcome.skipped += 1;
            continue;
        }

        outcome.links.push(RecipeIngredientLink {
            recipe_id,
            ingredient_id,
            quantity: ingredient.quantity,
            unit: ingredient.unit.clone(),
            notes: ingredient.notes.clone(),
            sort_order: ingredient.sort_order,
        });
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn ing(name: &str, sort_order: usize) -> ExtractedIngredient {
        ExtractedIngredient {
            name: name.to_string(),
            quantity: Some(1.0),
            unit: None,
            notes: None,
            sort_order,
        }
    }

    #[tokio::test]
    async fn test_creates_missing_ingredients() {
        let store = MemoryStore::new();
        let deduped = vec![ing("flour", 0), ing("sugar", 1)];

        let outcome = reconcile(&store, 1, 10, &deduped, &[], &HashMap::new())
            .await
            .unwrap();

        assert_eq!(outcome.created, 2);
        assert_eq!(outcome.skipped, 0);
        assert_eq!(outcome.links.len(), 2);
        assert_eq!(store.list_ingredients(1).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_exact_match_reuses_catalog_entry() {
        let store = MemoryStore::new();
        let existing = store.create_ingredient(1, "Flour").await.unwrap();
        let catalog = store.list_ingredients(1).await.unwrap();

        let outcome = reconcile(&store, 1, 10, &[ing("flour", 0)], &catalog, &HashMap::new())
            .await
            .unwrap();

        assert_eq!(outcome.created, 0);
        assert_eq!(outcome.links[0].ingredient_id, existing.id);
    }

    #[tokio::test]
    async fn test_fuzzy_match_takes_precedence_over_create() {
        let store = MemoryStore::new();
        let existing = store.create_ingredient(1, "Tomato").await.unwrap();
        let catalog = store.list_ingredients(1).await.unwrap();

        let mut fuzzy = HashMap::new();
        fuzzy.insert("tomatoes".to_string(), existing.id);

        let outcome = reconcile(&store, 1, 10, &[ing("tomatoes", 0)], &catalog, &fuzzy)
            .await
            .unwrap();

        assert_eq!(outcome.created, 0);
        assert_eq!(outcome.links[0].ingredient_id, existing.id);
    }

    #[tokio::test]
    async fn test_collision_produces_one_link_and_one_skip() {
        let store = MemoryStore::new();
        let existing = store.create_ingredient(1, "Tomato").await.unwrap();
        let catalog = store.list_ingredients(1).await.unwrap();

        // both extracted names fuzzy-match the same catalog id
        let mut fuzzy = HashMap::new();
        fuzzy.insert("tomatoes".to_string(), existing.id);
        fuzzy.insert("roma tomatoes".to_string(), existing.id);

        let deduped = vec![ing("tomatoes", 0), ing("roma tomatoes", 1)];
        let outcome = reconcile(&store, 1, 10, &deduped, &catalog, &fuzzy)
            .await
            .unwrap();

        assert_eq!(outcome.links.len(), 1);
        assert_eq!(outcome.links[0].ingredient_id, existing.id);
        assert_eq!(outcome.skipped, 1);
    }

    #[tokio::test]
    async fn test_unique_conflict_recovers_by_read() {
        let store = MemoryStore::new();
        // simulate the race: the name exists but was absent from the catalog
        // snapshot this run is working from
        let existing = store.create_ingredient(1, "Basil").await.unwrap();

        let outcome = reconcile(&store, 1, 10, &[ing("basil", 0)], &[], &HashMap::new())
            .await
            .unwrap();

        assert_eq!(outcome.created, 0);
        assert_eq!(outcome.links[0].ingredient_id, existing.id);
        // no duplicate row appeared
        assert_eq!(store.list_ingredients(1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_link_carries_parsed_fields() {
        let store = MemoryStore::new();
        let deduped = vec![ExtractedIngredient {
            name: "flour".to_string(),
            quantity: Some(2.0),
            unit: Some("cups".to_string()),
            notes: Some("sifted".to_string()),
            sort_order: 3,
        }];

        let outcome = reconcile(&store, 1, 10, &deduped, &[], &HashMap::new())
            .await
            .unwrap();

        let link = &outcome.links[0];
        assert_eq!(link.recipe_id, 10);
        assert_eq!(link.quantity, Some(2.0));
        assert_eq!(link.unit.as_deref(), Some("cups"));
        assert_eq!(link.notes.as_deref(), Some("sifted"));
        assert_eq!(link.sort_order, 3);
    }
}
