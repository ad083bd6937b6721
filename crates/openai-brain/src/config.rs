//! Configuration for OpenAiBrain.

use brain_core::BrainError;
use std::env;
use std::path::Path;
use std::time::Duration;

/// Default system prompt file name.
pub const DEFAULT_PROMPT_FILE: &str = "SYSTEM_PROMPT.md";

/// Configuration for OpenAiBrain.
#[derive(Debug, Clone)]
pub struct OpenAiBrainConfig {
    /// Base URL of the provider, without the `/v1` suffix.
    pub api_url: String,

    /// API key for authentication.
    pub api_key: String,

    /// Model name to use.
    pub model: String,

    /// Optional system prompt.
    pub system_prompt: Option<String>,

    /// Maximum tokens for response.
    pub max_tokens: Option<u32>,

    /// Request timeout.
    pub timeout: Duration,
}

impl Default for OpenAiBrainConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.openai.com".to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            system_prompt: None,
            max_tokens: Some(1024),
            timeout: Duration::from_secs(60),
        }
    }
}

impl OpenAiBrainConfig {
    /// Create configuration from environment variables.
    ///
    /// Required environment variables:
    /// - `LLM_API_KEY` - API key for authentication
    ///
    /// Optional environment variables:
    /// - `LLM_API_URL` - API URL (default: https://api.openai.com)
    /// - `LLM_MODEL` - Model name (default: gpt-4o-mini)
    /// - `LLM_SYSTEM_PROMPT` - System prompt (overrides prompt file)
    /// - `LLM_PROMPT_FILE` - Path to system prompt file (default: SYSTEM_PROMPT.md)
    /// - `LLM_MAX_TOKENS` - Max tokens (default: 1024)
    /// - `LLM_TIMEOUT_SECS` - Request timeout (default: 60)
    ///
    /// System prompt priority:
    /// 1. `LLM_SYSTEM_PROMPT` env var (if set)
    /// 2. Contents of prompt file (if exists)
    /// 3. None
    pub fn from_env() -> Result<Self, BrainError> {
        let api_key = env::var("LLM_API_KEY")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| BrainError::Configuration("LLM_API_KEY not set".to_string()))?;

        let api_url =
            env::var("LLM_API_URL").unwrap_or_else(|_| "https://api.openai.com".to_string());

        let model = env::var("LLM_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());

        let system_prompt = if let Ok(prompt) = env::var("LLM_SYSTEM_PROMPT") {
            Some(prompt)
        } else {
            let prompt_file =
                env::var("LLM_PROMPT_FILE").unwrap_or_else(|_| DEFAULT_PROMPT_FILE.to_string());
            load_prompt_file(&prompt_file)
        };

        let max_tokens = env::var("LLM_MAX_TOKENS")
            .ok()
            .and_then(|v| v.parse().ok())
            .or(Some(1024));

        let timeout = env::var("LLM_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(60));

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key,
            model,
            system_prompt,
            max_tokens,
            timeout,
        })
    }

    /// Create a new config builder.
    pub fn builder() -> OpenAiBrainConfigBuilder {
        OpenAiBrainConfigBuilder::default()
    }

    /// Full URL of the chat completions endpoint.
    pub fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.api_url.trim_end_matches('/'))
    }
}

/// Builder for OpenAiBrainConfig.
#[derive(Debug, Default)]
pub struct OpenAiBrainConfigBuilder {
    config: OpenAiBrainConfig,
}

impl OpenAiBrainConfigBuilder {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = key.into();
        self
    }

    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.config.max_tokens = Some(tokens);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> OpenAiBrainConfig {
        self.config
    }

    /// Load system prompt from a file.
    ///
    /// If the file exists and is non-empty, sets the system prompt.
    pub fn load_prompt_file(mut self, path: impl AsRef<Path>) -> Self {
        if let Some(prompt) = load_prompt_file(path) {
            self.config.system_prompt = Some(prompt);
        }
        self
    }
}

/// Load a prompt file, returning None if not found or empty.
fn load_prompt_file(path: impl AsRef<Path>) -> Option<String> {
    let content = std::fs::read_to_string(path.as_ref()).ok()?;
    let trimmed = content.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OpenAiBrainConfig::default();

        assert_eq!(config.api_url, "https://api.openai.com");
        assert!(config.api_key.is_empty());
        assert_eq!(config.model, "gpt-4o-mini");
        assert!(config.system_prompt.is_none());
        assert_eq!(config.max_tokens, Some(1024));
        assert_eq!(config.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_builder_all_options() {
        let config = OpenAiBrainConfig::builder()
            .api_key("my-key")
            .api_url("https://llm.internal/")
            .model("gpt-4o")
            .system_prompt("You run the house")
            .max_tokens(512)
            .timeout(Duration::from_secs(5))
            .build();

        assert_eq!(config.api_key, "my-key");
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.system_prompt.as_deref(), Some("You run the house"));
        assert_eq!(config.max_tokens, Some(512));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(
            config.completions_url(),
            "https://llm.internal/v1/chat/completions"
        );
    }

    #[test]
    fn test_builder_missing_prompt_file_keeps_none() {
        let config = OpenAiBrainConfig::builder()
            .load_prompt_file("/definitely/not/here.md")
            .build();
        assert!(config.system_prompt.is_none());
    }

    // Environment-based tests are combined into a single test to avoid
    // race conditions when tests run in parallel (env vars are process-global).
    #[test]
    fn test_from_env_scenarios() {
        use std::sync::Mutex;
        static ENV_LOCK: Mutex<()> = Mutex::new(());
        let _guard = ENV_LOCK.lock().unwrap();

        fn clear_all_llm_vars() {
            for var in [
                "LLM_API_KEY",
                "LLM_API_URL",
                "LLM_MODEL",
                "LLM_SYSTEM_PROMPT",
                "LLM_PROMPT_FILE",
                "LLM_MAX_TOKENS",
                "LLM_TIMEOUT_SECS",
            ] {
                std::env::remove_var(var);
            }
        }

        // Missing API key is fatal
        clear_all_llm_vars();
        match OpenAiBrainConfig::from_env() {
            Err(BrainError::Configuration(msg)) => assert!(msg.contains("LLM_API_KEY")),
            other => panic!("Expected Configuration error, got {:?}", other),
        }

        // Only API key set, defaults used
        clear_all_llm_vars();
        std::env::set_var("LLM_API_KEY", "test-env-key");
        std::env::set_var("LLM_PROMPT_FILE", "/definitely/not/here.md");
        let config = OpenAiBrainConfig::from_env().unwrap();
        assert_eq!(config.api_key, "test-env-key");
        assert_eq!(config.api_url, "https://api.openai.com");
        assert_eq!(config.model, "gpt-4o-mini");
        assert!(config.system_prompt.is_none());
        assert_eq!(config.max_tokens, Some(1024));

        // All vars set
        clear_all_llm_vars();
        std::env::set_var("LLM_API_KEY", "full-key");
        std::env::set_var("LLM_API_URL", "http://localhost:11434/");
        std::env::set_var("LLM_MODEL", "llama3");
        std::env::set_var("LLM_SYSTEM_PROMPT", "Test prompt");
        std::env::set_var("LLM_MAX_TOKENS", "2048");
        std::env::set_var("LLM_TIMEOUT_SECS", "15");
        let config = OpenAiBrainConfig::from_env().unwrap();
        assert_eq!(config.api_url, "http://localhost:11434");
        assert_eq!(config.model, "llama3");
        assert_eq!(config.system_prompt.as_deref(), Some("Test prompt"));
        assert_eq!(config.max_tokens, Some(2048));
        assert_eq!(config.timeout, Duration::from_secs(15));

        clear_all_llm_vars();
    }
}
