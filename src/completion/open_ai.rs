use crate::completion::CompletionProvider;
use crate::config::ImporterConfig;
use crate::error::ImportError;
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

/// Client for an OpenAI-compatible chat-completions endpoint.
pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl OpenAiProvider {
    /// Build a provider from importer configuration. Fails if no API key is
    /// present in config or the environment.
    pub fn from_config(config: &ImporterConfig) -> Result<Self, ImportError> {
        let api_key = config.resolve_api_key().ok_or_else(|| {
            ImportError::BadRequest("OPENAI_API_KEY not found in config or environment".to_string())
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(OpenAiProvider {
            client,
            api_key,
            base_url: config.provider.base_url.clone(),
            model: config.provider.model.clone(),
            max_tokens: config.provider.max_tokens,
        })
    }

    #[doc(hidden)]
    pub fn with_base_url(api_key: String, base_url: String, model: String) -> Self {
        OpenAiProvider {
            client: Client::new(),
            api_key,
            base_url,
            model,
            max_tokens: 2000,
        }
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    async fn complete(&self, system: &str, user: &str) -> Result<String, ImportError> {
        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&json!({
                "model": self.model,
                "messages": [
                    {"role": "system", "content": system},
                    {"role": "user", "content": user}
                ],
                "temperature": 0,
                "max_tokens": self.max_tokens
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ImportError::Fetch(format!(
                "completion request failed with status {}",
                response.status()
            )));
        }

        let body: Value = response.json().await?;
        debug!("completion response: {:?}", body);

        body["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| {
                ImportError::Extraction("no content in completion response".to_string())
            })
    }
}
