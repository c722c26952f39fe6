use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Importer configuration.
///
/// Loaded with the following priority (highest to lowest):
/// 1. Environment variables with PANTRY__ prefix
/// 2. config.toml file in the current directory
/// 3. Default values
///
/// Environment variable format: PANTRY__PROVIDER__API_KEY
#[derive(Debug, Deserialize, Clone)]
pub struct ImporterConfig {
    /// HTTP timeout in seconds for page fetches and completion calls
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User agent sent with page fetches
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Character budget for cleaned text handed to the completion service
    #[serde(default = "default_max_text_chars")]
    pub max_text_chars: usize,

    /// Permit fetching loopback/private hosts. Only for local development
    /// and tests; leave off in production.
    #[serde(default)]
    pub allow_private_hosts: bool,

    /// Completion provider settings
    #[serde(default)]
    pub provider: ProviderConfig,
}

/// Completion service settings.
#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// API key; falls back to the OPENAI_API_KEY environment variable
    pub api_key: Option<String>,

    /// Base URL for the API endpoint (custom or proxy endpoints)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_key: None,
            base_url: default_base_url(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl Default for ImporterConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            max_text_chars: default_max_text_chars(),
            allow_private_hosts: false,
            provider: ProviderConfig::default(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (compatible; PantryImportBot/1.0)".to_string()
}

fn default_max_text_chars() -> usize {
    15_000
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com".to_string()
}

fn default_max_tokens() -> u32 {
    2000
}

impl ImporterConfig {
    /// Load configuration from file and environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            // Optional config file (can be missing)
            .add_source(File::with_name("config").required(false))
            // Use double underscore for nested: PANTRY__PROVIDER__MODEL
            .add_source(
                Environment::with_prefix("PANTRY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Resolve the provider API key from config or the environment.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.provider
            .api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = ImporterConfig::default();
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.max_text_chars, 15_000);
        assert_eq!(config.provider.model, "gpt-4o-mini");
        assert_eq!(config.provider.base_url, "https://api.openai.com");
        assert!(config.provider.api_key.is_none());
        assert!(!config.allow_private_hosts);
    }

    #[test]
    fn test_provider_config_default() {
        let provider = ProviderConfig::default();
        assert_eq!(provider.max_tokens, 2000);
        assert!(provider.api_key.is_none());
    }

    #[test]
    fn test_load_rejects_malformed_env_value() {
        std::env::set_var("PANTRY__TIMEOUT_SECS", "not-a-number");
        let result = ImporterConfig::load();
        std::env::remove_var("PANTRY__TIMEOUT_SECS");

        // a bad value must surface, not silently fall back to defaults
        assert!(result.is_err());
    }
}
