//! Structured-markup extraction: JSON-LD recipe blocks embedded per the
//! schema.org Recipe vocabulary.

use crate::model::{Category, ExtractedIngredient, ExtractedRecipe};
use crate::parser::parse_ingredient_line;
use html_escape::decode_html_entities;
use log::debug;
use scraper::{Html, Selector};
use serde_json::Value;

fn decode_html_symbols(text: &str) -> String {
    // some sites double-encode entities; decoding twice is safe for the rest
    decode_html_entities(&decode_html_entities(text)).into_owned()
}

/// Scan raw page markup for a Recipe-typed JSON-LD block and map it into an
/// [`ExtractedRecipe`]. Returns `None` when no such block exists, which
/// triggers the LLM fallback path.
pub fn extract_structured(html: &str) -> Option<ExtractedRecipe> {
    let document = Html::parse_document(html);
    let selector =
        Selector::parse("script[type='application/ld+json']").expect("valid ld+json selector");

    for script in document.select(&selector) {
        let json: Value = match serde_json::from_str(script.inner_html().trim()) {
            Ok(v) => v,
            // malformed blocks are common; try the next script tag
            Err(_) => continue,
        };

        if let Some(recipe) = find_recipe_item(&json).map(map_recipe) {
            debug!("found JSON-LD recipe '{}'", recipe.name);
            return Some(recipe);
        }
    }

    None
}

/// Locate the first Recipe-typed item: the value itself, an element of a
/// top-level array, or an element of an `@graph` list.
fn find_recipe_item(json: &Value) -> Option<&Value> {
    let items: Vec<&Value> = if let Some(arr) = json.as_array() {
        arr.iter().collect()
    } else if let Some(graph) = json.get("@graph").and_then(Value::as_array) {
        graph.iter().collect()
    } else {
        vec![json]
    };

    items.into_iter().find(|item| is_recipe_type(item))
}

fn is_recipe_type(item: &Value) -> bool {
    match item.get("@type") {
        Some(Value::String(t)) => t.eq_ignore_ascii_case("recipe"),
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .any(|t| t.eq_ignore_ascii_case("recipe")),
        _ => false,
    }
}

/// String-typed field, or a default when missing or differently typed.
fn string_field(item: &Value, key: &str, default: &str) -> String {
    match item.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => decode_html_symbols(s.trim()),
        _ => default.to_string(),
    }
}

/// Field that may be a string or an array of strings; the first element
/// wins for arrays.
fn string_or_first(item: &Value, key: &str) -> Option<String> {
    match item.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Array(arr)) => arr
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .find(|s| !s.is_empty())
            .map(str::to_string),
        _ => None,
    }
}

fn map_recipe(item: &Value) -> ExtractedRecipe {
    let ingredients: Vec<ExtractedIngredient> = item
        .get("recipeIngredient")
        .and_then(Value::as_array)
        .map(|lines| {
            lines
                .iter()
                .filter_map(Value::as_str)
                .enumerate()
                .map(|(i, line)| {
                    let parsed = parse_ingredient_line(&decode_html_symbols(line));
                    ExtractedIngredient {
                        name: parsed.name,
                        quantity: parsed.quantity,
                        unit: parsed.unit,
                        notes: parsed.notes,
                        sort_order: i,
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    ExtractedRecipe {
        name: string_field(item, "name", "Untitled Recipe"),
        description: string_field(item, "description", ""),
        category: Category::normalize(string_or_first(item, "recipeCategory").as_deref()),
        cuisine: string_or_first(item, "recipeCuisine")
            .map(|s| decode_html_symbols(&s))
            .unwrap_or_else(|| "Other".to_string()),
        ingredients,
    }
}
