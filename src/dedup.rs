//! Collapses repeated ingredient names before reconciliation.
//!
//! Ingredient lists repeat names surprisingly often ("2 cups flour" in the
//! dough, "1 cup flour" for dusting). The first occurrence wins; repeats
//! fold their quantity/unit/notes into the first occurrence's notes.

use crate::model::ExtractedIngredient;
use std::collections::HashMap;

/// Deduplicate by lowercased trimmed name, preserving first-seen order and
/// the first occurrence's quantity and sort_order.
pub fn dedup_ingredients(ingredients: Vec<ExtractedIngredient>) -> Vec<ExtractedIngredient> {
    let mut kept: Vec<ExtractedIngredient> = Vec::with_capacity(ingredients.len());
    let mut index_by_key: HashMap<String, usize> = HashMap::new();

    for ingredient in ingredients {
        let key = ingredient.name.trim().to_lowercase();
        match index_by_key.get(&key) {
            None => {
                index_by_key.insert(key, kept.len());
                kept.push(ingredient);
            }
            Some(&i) => {
                if let Some(summary) = repeat_summary(&ingredient) {
                    let first = &mut kept[i];
                    first.notes = Some(match first.notes.take() {
                        Some(existing) => format!("{existing}; {summary}"),
                        None => summary,
                    });
                }
            }
        }
    }

    kept
}

/// Deterministic summary of a repeated line: "also:" followed by whichever
/// of quantity, unit, and notes are present.
fn repeat_summary(repeat: &ExtractedIngredient) -> Option<String> {
    let mut parts: Vec<String> = Vec::new();
    if let Some(quantity) = repeat.quantity {
        parts.push(format_quantity(quantity));
    }
    if let Some(unit) = &repeat.unit {
        parts.push(unit.clone());
    }
    if let Some(notes) = &repeat.notes {
        parts.push(notes.clone());
    }
    if parts.is_empty() {
        return None;
    }
    Some(format!("also: {}", parts.join(" ")))
}

fn format_quantity(quantity: f64) -> String {
    if quantity.fract() == 0.0 {
        format!("{}", quantity as i64)
    } else {
        format!("{quantity}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ing(name: &str, quantity: Option<f64>, unit: Option<&str>, notes: Option<&str>) -> ExtractedIngredient {
        ExtractedIngredient {
            name: name.to_string(),
            quantity,
            unit: unit.map(str::to_string),
            notes: notes.map(str::to_string),
            sort_order: 0,
        }
    }

    #[test]
    fn test_case_insensitive_trimmed_key() {
        let result = dedup_ingredients(vec![
            ing("Tomato", Some(2.0), None, None),
            ing("tomato ", Some(1.0), Some("can"), None),
        ]);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "Tomato");
        assert_eq!(result[0].quantity, Some(2.0));
        assert_eq!(result[0].notes.as_deref(), Some("also: 1 can"));
    }

    #[test]
    fn test_merged_notes_join() {
        let result = dedup_ingredients(vec![
            ing("flour", Some(2.0), Some("cups"), Some("sifted")),
            ing("flour", Some(1.0), Some("cup"), Some("for dusting")),
        ]);

        assert_eq!(result.len(), 1);
        assert_eq!(
            result[0].notes.as_deref(),
            Some("sifted; also: 1 cup for dusting")
        );
    }

    #[test]
    fn test_repeat_with_nothing_to_report_appends_nothing() {
        let result = dedup_ingredients(vec![
            ing("salt", None, None, Some("to taste")),
            ing("salt", None, None, None),
        ]);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].notes.as_deref(), Some("to taste"));
    }

    #[test]
    fn test_preserves_order_and_sort_order() {
        let mut first = ing("flour", Some(2.0), None, None);
        first.sort_order = 0;
        let mut second = ing("sugar", Some(1.0), None, None);
        second.sort_order = 1;
        let mut repeat = ing("FLOUR", Some(3.0), None, None);
        repeat.sort_order = 2;

        let result = dedup_ingredients(vec![first, second, repeat]);
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].name, "flour");
        assert_eq!(result[0].sort_order, 0);
        assert_eq!(result[1].name, "sugar");
    }

    #[test]
    fn test_fractional_quantity_in_summary() {
        let result = dedup_ingredients(vec![
            ing("butter", Some(1.0), None, None),
            ing("butter", Some(0.5), Some("cup"), None),
        ]);

        assert_eq!(result[0].notes.as_deref(), Some("also: 0.5 cup"));
    }
}
