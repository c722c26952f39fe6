//! Import recipes from web pages and reconcile their ingredients against a
//! household's ingredient catalog.
//!
//! The pipeline tries structured JSON-LD recipe markup first and falls back
//! to LLM extraction over cleaned page text. Extracted ingredients are
//! deduplicated, fuzzy-matched against the household catalog (with every
//! model answer re-verified), and reconciled into recipe↔ingredient links
//! without ever creating duplicate catalog entries or duplicate links.
//!
//! ```no_run
//! use pantry_import::{ImportPipeline, ImporterConfig, MemoryStore, OpenAiProvider};
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), pantry_import::ImportError> {
//! let config = ImporterConfig::load()?;
//! let provider = Arc::new(OpenAiProvider::from_config(&config)?);
//! let store = Arc::new(MemoryStore::new());
//!
//! let pipeline = ImportPipeline::new(store, provider, config)?;
//! let outcome = pipeline.import_url(1, "https://example.com/recipe").await?;
//! println!("created {} ingredients", outcome.ingredients_created);
//! # Ok(())
//! # }
//! ```

pub mod cleaner;
pub mod completion;
pub mod config;
pub mod dedup;
pub mod error;
pub mod extractors;
pub mod fetcher;
pub mod matcher;
pub mod model;
pub mod parser;
pub mod pipeline;
pub mod reconcile;
pub mod store;

pub use completion::{CompletionProvider, OpenAiProvider};
pub use config::ImporterConfig;
pub use error::{ImportError, StoreError};
pub use model::{
    CatalogIngredient, Category, ExtractedIngredient, ExtractedRecipe, ExtractionMethod,
    ImportOutcome, RecipeIngredientLink, RecipeRecord,
};
pub use pipeline::ImportPipeline;
pub use store::{MemoryStore, RecipeStore};
