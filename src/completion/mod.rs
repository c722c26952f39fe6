mod open_ai;
mod prompt;

pub use open_ai::OpenAiProvider;
pub use prompt::{EXTRACTION_PROMPT, FUZZY_MATCH_PROMPT};

use crate::error::ImportError;
use async_trait::async_trait;

/// Prompt-in/text-out seam over the external text-completion service.
/// Responses carry no schema guarantee; callers parse defensively.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> Result<String, ImportError>;
}
