//! LLM configuration loaded from environment variables.

use std::env;
use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::LlmError;

/// Default local chat model.
pub const DEFAULT_LOCAL_MODEL: &str = "qwen2.5:32b";
/// Default Azure OpenAI deployment.
pub const DEFAULT_AZURE_DEPLOYMENT: &str = "gpt-4o";
pub const DEFAULT_AZURE_API_VERSION: &str = "2024-08-01-preview";
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";

/// Which backend serves chat completions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LlmProvider {
    #[default]
    Ollama,
    Azure,
    OpenAI,
}

impl FromStr for LlmProvider {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ollama" | "local" => Ok(Self::Ollama),
            "azure" => Ok(Self::Azure),
            "openai" => Ok(Self::OpenAI),
            other => Err(LlmError::Config(format!(
                "LLM_PROVIDER must be one of ollama, azure, openai; got {:?}",
                other
            ))),
        }
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ollama => "ollama",
            Self::Azure => "azure",
            Self::OpenAI => "openai",
        })
    }
}

/// LLM config loaded from environment variables.
#[derive(Debug, Clone)]
pub struct EnvLlmConfig {
    pub provider: LlmProvider,
    /// Ollama model name (`LLM_MODEL`); OpenAI uses it too.
    pub llm_model: String,
    pub ollama_base_url: String,
    /// Sent as `X-Api-Key` to Ollama (`API_KEY`).
    pub api_key: Option<String>,
    pub azure_api_key: Option<String>,
    pub azure_endpoint: Option<String>,
    pub azure_deployment: String,
    pub azure_api_version: String,
    pub openai_api_key: Option<String>,
    pub openai_base_url: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for EnvLlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::Ollama,
            llm_model: DEFAULT_LOCAL_MODEL.to_string(),
            ollama_base_url: DEFAULT_OLLAMA_BASE_URL.to_string(),
            api_key: None,
            azure_api_key: None,
            azure_endpoint: None,
            azure_deployment: DEFAULT_AZURE_DEPLOYMENT.to_string(),
            azure_api_version: DEFAULT_AZURE_API_VERSION.to_string(),
            openai_api_key: None,
            openai_base_url: None,
            temperature: 0.0,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

fn non_empty(name: &str) -> Option<String> {
    env::var(name).ok().filter(|s| !s.trim().is_empty())
}

impl EnvLlmConfig {
    /// Load from environment variables.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let provider = match non_empty("LLM_PROVIDER") {
            Some(s) => s.parse()?,
            None => defaults.provider,
        };
        let temperature = match non_empty("LLM_TEMPERATURE") {
            Some(s) => s
                .trim()
                .parse::<f32>()
                .with_context(|| format!("LLM_TEMPERATURE must be a number, got {:?}", s))?,
            None => defaults.temperature,
        };
        let max_tokens = match non_empty("LLM_MAX_TOKENS") {
            Some(s) => s
                .trim()
                .parse::<u32>()
                .with_context(|| format!("LLM_MAX_TOKENS must be a positive integer, got {:?}", s))?,
            None => defaults.max_tokens,
        };

        Ok(Self {
            provider,
            llm_model: non_empty("LLM_MODEL").unwrap_or(defaults.llm_model),
            ollama_base_url: non_empty("OLLAMA_BASE_URL").unwrap_or(defaults.ollama_base_url),
            api_key: non_empty("API_KEY"),
            azure_api_key: non_empty("AZURE_OPENAI_API_KEY"),
            azure_endpoint: non_empty("AZURE_OPENAI_ENDPOINT"),
            azure_deployment: non_empty("AZURE_OPENAI_DEPLOYMENT").unwrap_or(defaults.azure_deployment),
            azure_api_version: non_empty("AZURE_OPENAI_API_VERSION")
                .unwrap_or(defaults.azure_api_version),
            openai_api_key: non_empty("OPENAI_API_KEY"),
            openai_base_url: non_empty("OPENAI_BASE_URL"),
            temperature,
            max_tokens,
        })
    }

    /// Checks that the selected provider has what it needs.
    pub fn validate(&self) -> Result<(), LlmError> {
        match self.provider {
            LlmProvider::Ollama => {
                if !self.ollama_base_url.starts_with("http://")
                    && !self.ollama_base_url.starts_with("https://")
                {
                    return Err(LlmError::Config(format!(
                        "OLLAMA_BASE_URL must start with http:// or https://, got {:?}",
                        self.ollama_base_url
                    )));
                }
            }
            LlmProvider::Azure => {
                if self.azure_api_key.is_none() {
                    return Err(LlmError::Config("AZURE_OPENAI_API_KEY not set".to_string()));
                }
                if self.azure_endpoint.is_none() {
                    return Err(LlmError::Config("AZURE_OPENAI_ENDPOINT not set".to_string()));
                }
            }
            LlmProvider::OpenAI => {
                if self.openai_api_key.is_none() {
                    return Err(LlmError::Config("OPENAI_API_KEY not set".to_string()));
                }
            }
        }
        if self.max_tokens == 0 {
            return Err(LlmError::Config("LLM_MAX_TOKENS must be greater than zero".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_parse() {
        assert_eq!("Ollama".parse::<LlmProvider>().unwrap(), LlmProvider::Ollama);
        assert_eq!("azure".parse::<LlmProvider>().unwrap(), LlmProvider::Azure);
        assert_eq!(" openai ".parse::<LlmProvider>().unwrap(), LlmProvider::OpenAI);
        assert!("anthropic".parse::<LlmProvider>().is_err());
    }

    #[test]
    fn test_defaults() {
        let config = EnvLlmConfig::default();
        assert_eq!(config.llm_model, "qwen2.5:32b");
        assert_eq!(config.azure_deployment, "gpt-4o");
        assert_eq!(config.azure_api_version, "2024-08-01-preview");
        assert_eq!(config.max_tokens, 4096);
        assert_eq!(config.temperature, 0.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_azure_requires_key_and_endpoint() {
        let mut config = EnvLlmConfig {
            provider: LlmProvider::Azure,
            ..EnvLlmConfig::default()
        };
        assert!(config.validate().is_err());
        config.azure_api_key = Some("key".to_string());
        assert!(config.validate().is_err());
        config.azure_endpoint = Some("https://example.openai.azure.com".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_openai_requires_key() {
        let config = EnvLlmConfig {
            provider: LlmProvider::OpenAI,
            ..EnvLlmConfig::default()
        };
        assert!(matches!(config.validate(), Err(LlmError::Config(_))));
    }
}
