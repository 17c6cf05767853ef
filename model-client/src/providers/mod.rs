//! Model provider implementations

mod huggingface;
pub mod mock;
mod speech_server;

pub use huggingface::HuggingFaceClassifier;
pub use mock::{MockClassifier, MockSynthesizer};
pub use speech_server::SpeechServerSynthesizer;

use crate::config::{ModelPreset, ProviderConfig};
use crate::error::{ModelError, Result};
use crate::provider::{Emotion, EmotionClassifier, SpeechSynthesizer};

/// Supported provider types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    HuggingFace,
    SpeechServer,
    Mock,
}

impl ProviderKind {
    /// Parse provider kind from string
    pub fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "huggingface" | "hugging-face" | "hf" => Ok(Self::HuggingFace),
            "speech-server" | "speech_server" => Ok(Self::SpeechServer),
            "mock" => Ok(Self::Mock),
            _ => Err(ModelError::ConfigError(format!("Unknown provider: {}", s))),
        }
    }
}

/// Create the emotion classifier described by a preset
pub fn get_classifier(
    preset: &ModelPreset,
    provider_config: Option<&ProviderConfig>,
) -> Result<Box<dyn EmotionClassifier>> {
    let kind = ProviderKind::from_str(&preset.provider)?;

    match kind {
        ProviderKind::HuggingFace => {
            let api_key = get_api_key(provider_config, "HF_API_TOKEN", "Hugging Face")?;
            Ok(Box::new(HuggingFaceClassifier::new(
                &preset.model,
                api_key,
                provider_config.and_then(|c| c.base_url.as_deref()),
                provider_config.and_then(|c| c.timeout_secs),
            )?))
        }
        ProviderKind::Mock => {
            let emotion = Emotion::from_label(&preset.model).unwrap_or(Emotion::Joy);
            Ok(Box::new(MockClassifier::always(emotion, 1.0)))
        }
        ProviderKind::SpeechServer => Err(ModelError::ConfigError(format!(
            "Provider '{}' cannot classify emotions",
            preset.provider
        ))),
    }
}

/// Create the speech synthesizer described by a preset
pub fn get_synthesizer(
    preset: &ModelPreset,
    provider_config: Option<&ProviderConfig>,
) -> Result<Box<dyn SpeechSynthesizer>> {
    let kind = ProviderKind::from_str(&preset.provider)?;

    match kind {
        ProviderKind::SpeechServer => {
            // The speech server may run unauthenticated on a local GPU box
            let api_key = get_api_key(provider_config, "SPEECH_SERVER_API_KEY", "speech server").ok();
            Ok(Box::new(SpeechServerSynthesizer::new(
                &preset.model,
                provider_config.and_then(|c| c.base_url.as_deref()),
                api_key,
                provider_config.and_then(|c| c.timeout_secs),
            )?))
        }
        ProviderKind::Mock => Ok(Box::new(MockSynthesizer::always_succeeds())),
        ProviderKind::HuggingFace => Err(ModelError::ConfigError(format!(
            "Provider '{}' cannot synthesize speech",
            preset.provider
        ))),
    }
}

/// Get API key from config or environment variable
fn get_api_key(
    config: Option<&ProviderConfig>,
    env_var: &str,
    provider_name: &str,
) -> Result<String> {
    // Check config first
    if let Some(key) = config.and_then(|c| c.api_key.clone()) {
        return Ok(key);
    }

    // Fall back to environment variable
    std::env::var(env_var).map_err(|_| ModelError::MissingApiKey {
        provider: provider_name.to_string(),
        env_var: env_var.to_string(),
    })
}
