use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable that points at an alternative config file
pub const CONFIG_PATH_ENV: &str = "PDF2QA_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_provider")]
    pub default_provider: String,
    pub default_model: Option<String>,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_context_window")]
    pub context_window: u32,
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_preview_pairs")]
    pub preview_pairs: usize,
    #[serde(default)]
    pub providers: ProvidersConfig,
}

fn default_provider() -> String {
    "groq".to_string()
}

fn default_chunk_size() -> usize {
    1000
}

fn default_context_window() -> u32 {
    2048
}

fn default_concurrency() -> usize {
    1
}

fn default_request_timeout_secs() -> u64 {
    120
}

fn default_preview_pairs() -> usize {
    3
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    pub groq: Option<ProviderConfig>,
    pub openai: Option<ProviderConfig>,
    pub anthropic: Option<ProviderConfig>,
    pub ollama: Option<ProviderConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub api_key: String,
    pub base_url: Option<String>,
    pub model: Option<String>,
}

impl ProviderConfig {
    fn with_key_var(var: &str, model: &str) -> Self {
        Self {
            api_key: format!("${{{}}}", var),
            base_url: None,
            model: Some(model.to_string()),
        }
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            groq: Some(ProviderConfig::with_key_var(
                "GROQ_API_KEY",
                "llama-3.3-70b-versatile",
            )),
            openai: Some(ProviderConfig::with_key_var("OPENAI_API_KEY", "gpt-4o")),
            anthropic: Some(ProviderConfig::with_key_var(
                "ANTHROPIC_API_KEY",
                "claude-sonnet-4-20250514",
            )),
            ollama: Some(ProviderConfig {
                api_key: String::new(),
                base_url: Some("http://localhost:11434".to_string()),
                model: Some("mistral".to_string()),
            }),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_provider: default_provider(),
            default_model: None,
            chunk_size: default_chunk_size(),
            context_window: default_context_window(),
            concurrency: default_concurrency(),
            request_timeout_secs: default_request_timeout_secs(),
            preview_pairs: default_preview_pairs(),
            providers: ProvidersConfig::default(),
        }
    }
}

impl Config {
    /// Get the configuration directory path
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("pdf2qa");
        Ok(config_dir)
    }

    /// Get the configuration file path, honoring `PDF2QA_CONFIG`
    pub fn config_path() -> Result<PathBuf> {
        match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) if !path.is_empty() => Ok(PathBuf::from(path)),
            _ => Ok(Self::config_dir()?.join("config.toml")),
        }
    }

    /// Load configuration from file, falling back to defaults when no file
    /// exists yet
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `config_path`, expanding `${VAR}` API keys
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let mut config = if config_path.exists() {
            let content = fs::read_to_string(config_path).with_context(|| {
                format!("Failed to read config file at {}", config_path.display())
            })?;
            toml::from_str::<Config>(&content).with_context(|| {
                format!("Failed to parse config file at {}", config_path.display())
            })?
        } else {
            tracing::debug!(
                "No config file at {}, using defaults",
                config_path.display()
            );
            Config::default()
        };

        // Expand environment variables in API keys
        config.expand_env_vars();

        Ok(config)
    }

    /// Expand environment variables in configuration values
    fn expand_env_vars(&mut self) {
        let providers = [
            &mut self.providers.groq,
            &mut self.providers.openai,
            &mut self.providers.anthropic,
            &mut self.providers.ollama,
        ];
        for provider in providers.into_iter().flatten() {
            provider.api_key = expand_env_var(&provider.api_key);
        }
    }

    /// Get provider configuration by name
    pub fn get_provider(&self, name: &str) -> Option<&ProviderConfig> {
        match name.to_lowercase().as_str() {
            "groq" => self.providers.groq.as_ref(),
            "openai" => self.providers.openai.as_ref(),
            "anthropic" => self.providers.anthropic.as_ref(),
            "ollama" => self.providers.ollama.as_ref(),
            _ => None,
        }
    }
}

/// Expand environment variable references like ${VAR_NAME}
fn expand_env_var(value: &str) -> String {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).unwrap_or_default()
    } else if let Some(var_name) = value.strip_prefix('$') {
        std::env::var(var_name).unwrap_or_default()
    } else {
        value.to_string()
    }
}
