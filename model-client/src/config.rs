use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{ModelError, Result};

pub const DEFAULT_CLASSIFIER_MODEL: &str = "rememberme4ever/emotion-classifier-frankenstein";
pub const DEFAULT_SYNTHESIZER_MODEL: &str = "suno/bark";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Emotion classifier to load at startup
    #[serde(default = "default_classifier")]
    pub classifier: ModelPreset,

    /// Speech synthesis engine to load at startup
    #[serde(default = "default_synthesizer")]
    pub synthesizer: ModelPreset,

    /// Provider-specific configuration
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

fn default_classifier() -> ModelPreset {
    ModelPreset {
        provider: "huggingface".to_string(),
        model: DEFAULT_CLASSIFIER_MODEL.to_string(),
    }
}

fn default_synthesizer() -> ModelPreset {
    ModelPreset {
        provider: "speech-server".to_string(),
        model: DEFAULT_SYNTHESIZER_MODEL.to_string(),
    }
}

/// A provider plus the model it should serve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelPreset {
    /// Provider identifier (huggingface, speech-server, mock)
    pub provider: String,

    /// Model name/identifier for the provider
    pub model: String,
}

/// Provider-specific configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API key (optional, can use env var instead)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Custom base URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// HTTP request timeout in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`, falling back to defaults if it is absent
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let home =
            std::env::var("HOME").map_err(|_| ModelError::ConfigError("HOME not set".into()))?;
        Ok(PathBuf::from(home).join(".config/audiobook-director/models.toml"))
    }

    /// Get provider config by provider name
    pub fn get_provider_config(&self, provider: &str) -> Option<&ProviderConfig> {
        self.providers.get(provider)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            classifier: default_classifier(),
            synthesizer: default_synthesizer(),
            providers: HashMap::new(),
        }
    }
}
