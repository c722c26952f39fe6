//! LLM fallback extraction: cleaned page text in, recipe JSON out.
//!
//! The completion service offers no schema guarantee, so every field of the
//! response is coerced to its expected type with an explicit default. An
//! unparseable response is fatal to the run: there is nothing to fall back
//! to after this stage.

use crate::completion::{CompletionProvider, EXTRACTION_PROMPT};
use crate::error::ImportError;
use crate::model::{Category, ExtractedIngredient, ExtractedRecipe};
use crate::parser::parse_fraction;
use log::{debug, info};
use serde_json::Value;

pub struct LlmExtractor<'a> {
    provider: &'a dyn CompletionProvider,
}

impl<'a> LlmExtractor<'a> {
    pub fn new(provider: &'a dyn CompletionProvider) -> Self {
        Self { provider }
    }

    /// Extract a recipe from cleaned page text via the completion service.
    pub async fn extract(
        &self,
        cleaned_text: &str,
        source_url: &str,
    ) -> Result<ExtractedRecipe, ImportError> {
        info!("falling back to LLM extraction for {source_url}");

        let system = EXTRACTION_PROMPT.replace("{url}", source_url);
        let response = self.provider.complete(&system, cleaned_text).await?;
        debug!("raw extraction response: {response}");

        let stripped = strip_code_fences(&response);
        let json: Value = serde_json::from_str(stripped).map_err(|e| {
            ImportError::Extraction(format!("completion response is not valid JSON: {e}"))
        })?;

        Ok(coerce_recipe(&json))
    }
}

/// Remove leading/trailing markdown code-fence markers that models wrap
/// around JSON output.
fn strip_code_fences(response: &str) -> &str {
    let mut text = response.trim();
    if let Some(rest) = text.strip_prefix("```") {
        // the opening fence may carry a language tag ("```json")
        text = rest.split_once('\n').map_or(rest, |(_, body)| body);
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

/// Coerce an untyped model response into an [`ExtractedRecipe`], never
/// trusting any field's type.
fn coerce_recipe(json: &Value) -> ExtractedRecipe {
    let ingredients = json
        .get("ingredients")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .enumerate()
                .filter_map(|(i, item)| coerce_ingredient(item, i))
                .collect()
        })
        .unwrap_or_default();

    ExtractedRecipe {
        name: non_empty_str(json.get("name")).unwrap_or_else(|| "Untitled Recipe".to_string()),
        description: non_empty_str(json.get("description")).unwrap_or_default(),
        category: Category::normalize(json.get("category").and_then(Value::as_str)),
        cuisine: non_empty_str(json.get("cuisine")).unwrap_or_else(|| "Other".to_string()),
        ingredients,
    }
}

fn coerce_ingredient(item: &Value, sort_order: usize) -> Option<ExtractedIngredient> {
    let name = non_empty_str(item.get("name"))?;

    // quantity may arrive as a number or as a numeric/fraction string
    let quantity = match item.get("quantity") {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => parse_fraction(s),
        _ => None,
    };

    Some(ExtractedIngredient {
        name,
        quantity,
        unit: non_empty_str(item.get("unit")),
        notes: non_empty_str(item.get("notes")),
        sort_order,
    })
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
