//! Fuzzy alignment of extracted ingredient names to the household catalog.
//!
//! The model is asked to return, per extracted name, the exact text of a
//! matching catalog name or null. Every non-null answer is re-checked
//! against the real catalog before use; a name the model invented is
//! discarded. A failed call degrades to "no fuzzy matches" and the
//! pipeline continues with exact-name matching only.

use crate::completion::{CompletionProvider, FUZZY_MATCH_PROMPT};
use crate::model::{CatalogIngredient, ExtractedIngredient};
use log::{debug, warn};
use serde_json::Value;
use std::collections::HashMap;

pub struct FuzzyMatcher<'a> {
    provider: &'a dyn CompletionProvider,
}

impl<'a> FuzzyMatcher<'a> {
    pub fn new(provider: &'a dyn CompletionProvider) -> Self {
        Self { provider }
    }

    /// Map lowercased extracted names to catalog ids. Always succeeds; any
    /// provider or parse failure yields an empty map.
    pub async fn match_names(
        &self,
        catalog: &[CatalogIngredient],
        extracted: &[ExtractedIngredient],
    ) -> HashMap<String, i64> {
        if catalog.is_empty() || extracted.is_empty() {
            // nothing to align; skip the completion call entirely
            return HashMap::new();
        }

        let prompt = build_prompt(catalog, extracted);
        let response = match self.provider.complete(&prompt, "").await {
            Ok(text) => text,
            Err(e) => {
                warn!("fuzzy match call failed, continuing with exact matches only: {e}");
                return HashMap::new();
            }
        };

        match parse_response(&response, catalog) {
            Some(matches) => matches,
            None => {
                warn!("fuzzy match response was not valid JSON, continuing with exact matches only");
                HashMap::new()
            }
        }
    }
}

fn build_prompt(catalog: &[CatalogIngredient], extracted: &[ExtractedIngredient]) -> String {
    let catalog_list = catalog
        .iter()
        .enumerate()
        .map(|(i, ing)| format!("{}. {}", i + 1, ing.name))
        .collect::<Vec<String>>()
        .join("\n");
    let extracted_list = extracted
        .iter()
        .enumerate()
        .map(|(i, ing)| format!("{}. {}", i + 1, ing.name))
        .collect::<Vec<String>>()
        .join("\n");

    FUZZY_MATCH_PROMPT
        .replace("{catalog}", &catalog_list)
        .replace("{extracted}", &extracted_list)
}

/// Parse the model's name→name map and validate every answer against the
/// actual catalog. Unverified answers become null.
fn parse_response(response: &str, catalog: &[CatalogIngredient]) -> Option<HashMap<String, i64>> {
    let text = response
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();
    let json: Value = serde_json::from_str(text).ok()?;
    let object = json.as_object()?;

    let mut matches = HashMap::new();
    for (extracted_name, answer) in object {
        let Some(claimed) = answer.as_str() else {
            continue; // null or unexpected type: no match
        };
        match catalog
            .iter()
            .find(|ing| ing.name.eq_ignore_ascii_case(claimed))
        {
            Some(ing) => {
                debug!("fuzzy match: '{extracted_name}' -> '{}'", ing.name);
                matches.insert(extracted_name.trim().to_lowercase(), ing.id);
            }
            None => {
                warn!("discarding fuzzy match to unknown catalog name '{claimed}'");
            }
        }
    }
    Some(matches)
}
