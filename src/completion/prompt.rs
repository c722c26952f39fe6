/// System prompt for extracting a recipe from cleaned page text. The
/// `{url}` placeholder is filled by the LLM extractor; the cleaned text is
/// sent as the user message.
pub const EXTRACTION_PROMPT: &str = r#"You are an expert at finding recipes in messy web page text.
The user message is text scraped from {url}.

Extract the recipe and output ONLY this JSON object, with no other characters:

{
  "name": "<recipe name>",
  "description": "<short description>",
  "category": "<one of: entree, side, dessert, appetizer, breakfast, soup, salad, beverage>",
  "cuisine": "<cuisine, e.g. Italian, Mexican, Other>",
  "ingredients": [
    {"name": "<ingredient name>", "quantity": <number or null>, "unit": "<unit or null>", "notes": "<notes or null>"}
  ]
}"#;

/// Prompt for aligning extracted ingredient names to a household's existing
/// catalog. The placeholders `{catalog}` and `{extracted}` are filled by the
/// fuzzy matcher with numbered lists.
pub const FUZZY_MATCH_PROMPT: &str = r#"You match new ingredient names against an existing pantry catalog.

Existing catalog ingredients:
{catalog}

New ingredient names:
{extracted}

For each new name, decide whether it refers to the same ingredient as one in the catalog:
- Plural/singular variants and non-distinguishing modifiers ARE matches (e.g. "tomatoes" matches "tomato", "fresh basil" matches "basil").
- Different cuts, varieties, or states are NOT matches (e.g. "olive oil" does not match "vegetable oil", "chicken breast" does not match "chicken thighs").
- When in doubt, return null.

Output ONLY a JSON object mapping each new name to the EXACT text of the matching catalog name, or null if there is no match:

{"<new name>": "<exact catalog name>" | null, ...}"#;
