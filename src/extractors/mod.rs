mod llm;
mod structured;

pub use llm::LlmExtractor;
pub use structured::extract_structured;
