//! Free-text ingredient line grammar.
//!
//! Turns lines like "2 cups all-purpose flour, sifted" into structured
//! {quantity, unit, name, notes} parts. Parsing is best-effort and never
//! fails: anything unrecognized ends up in the name.

use serde::{Deserialize, Serialize};

/// Parsed parts of one ingredient line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedLine {
    pub name: String,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub notes: Option<String>,
}

/// Controlled unit vocabulary, matched case-insensitively. No match means
/// the token belongs to the ingredient name.
const UNITS: &[&str] = &[
    "cup", "cups", "tablespoon", "tablespoons", "tbsp", "teaspoon", "teaspoons", "tsp", "oz",
    "ounce", "ounces", "lb", "lbs", "pound", "pounds", "g", "gram", "grams", "kg", "ml", "liter",
    "liters", "quart", "quarts", "pint", "pints", "gallon", "gallons", "clove", "cloves", "piece",
    "pieces", "slice", "slices", "can", "cans", "package", "packages", "bunch", "bunches", "head",
    "heads", "stalk", "stalks", "sprig", "sprigs", "pinch", "pinches", "dash", "dashes", "large",
    "medium", "small",
];

/// Replace unicode vulgar fractions with their ASCII equivalents so the
/// token grammar below only has to deal with "a/b".
fn normalize_vulgar_fractions(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        let ascii = match ch {
            '½' => Some("1/2"),
            '⅓' => Some("1/3"),
            '⅔' => Some("2/3"),
            '¼' => Some("1/4"),
            '¾' => Some("3/4"),
            _ => None,
        };
        match ascii {
            Some(frac) => {
                // "1½" reads as a mixed number
                if out.ends_with(|c: char| c.is_ascii_digit()) {
                    out.push(' ');
                }
                out.push_str(frac);
            }
            None => out.push(ch),
        }
    }
    out
}

/// Value of a single numeric token: a plain number, a fraction "a/b", or a
/// hyphenated range "a-b" (the lower bound is used).
fn token_value(token: &str) -> Option<f64> {
    if let Some((low, high)) = token.split_once('-') {
        if !low.is_empty() && !high.is_empty() {
            return token_value(low);
        }
        return None;
    }
    if let Some((num, den)) = token.split_once('/') {
        let num: f64 = num.trim().parse().ok()?;
        let den: f64 = den.trim().parse().ok()?;
        if den == 0.0 {
            return None;
        }
        return Some(num / den);
    }
    token.parse().ok()
}

/// Parse a quantity string: a number, a fraction, or a mixed number
/// ("1 1/2"). Space-separated numeric tokens are summed. Returns `None`
/// if any token is not numeric.
pub fn parse_fraction(text: &str) -> Option<f64> {
    let text = normalize_vulgar_fractions(text);
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.is_empty() {
        return None;
    }
    let mut total = 0.0;
    for token in tokens {
        total += token_value(token)?;
    }
    Some(total)
}

/// Parse one free-text ingredient line into quantity/unit/name/notes.
/// Never errors; always returns a best-effort result.
pub fn parse_ingredient_line(line: &str) -> ParsedLine {
    let original = line.trim();
    let normalized = normalize_vulgar_fractions(original);
    let mut tokens = normalized.split_whitespace().peekable();

    // 1. Quantity: consume the leading run of numeric tokens and sum them
    // (mixed numbers like "1 1/2" arrive as two tokens).
    let mut quantity: Option<f64> = None;
    while let Some(&token) = tokens.peek() {
        match token_value(token) {
            Some(value) => {
                quantity = Some(quantity.unwrap_or(0.0) + value);
                tokens.next();
            }
            None => break,
        }
    }

    // 2. Unit: one token from the controlled vocabulary, stored lowercased.
    let mut unit: Option<String> = None;
    if let Some(&token) = tokens.peek() {
        let lowered = token.to_lowercase();
        if UNITS.contains(&lowered.as_str()) {
            unit = Some(lowered);
            tokens.next();
        }
    }

    let mut rest: String = tokens.collect::<Vec<&str>>().join(" ");

    // 3. Notes: first parenthetical group, then anything after the first
    // remaining comma.
    let mut notes: Vec<String> = Vec::new();
    if let (Some(open), Some(close)) = (rest.find('('), rest.find(')')) {
        if open < close {
            let inner = rest[open + 1..close].trim().to_string();
            if !inner.is_empty() {
                notes.push(inner);
            }
            rest = format!("{}{}", &rest[..open], &rest[close + 1..]);
        }
    }
    if let Some(comma) = rest.find(',') {
        let after = rest[comma + 1..].trim().to_string();
        if !after.is_empty() {
            notes.push(after);
        }
        rest.truncate(comma);
    }

    // 4. Name: whatever is left; fall back to the full line if empty.
    let name = rest.split_whitespace().collect::<Vec<&str>>().join(" ");
    let name = if name.is_empty() {
        original.to_string()
    } else {
        name
    };

    ParsedLine {
        name,
        quantity,
        unit,
        notes: if notes.is_empty() {
            None
        } else {
            Some(notes.join(", "))
        },
    }
}
