//! Model clients for audiobook-director
//!
//! Capability interfaces for the two external models the narrator drives:
//! - Emotion classification (Hugging Face inference, mock)
//! - Speech synthesis (HTTP speech server, mock)

pub mod config;
pub mod error;
pub mod provider;
pub mod providers;
pub mod waveform;

pub use config::{Config, ModelPreset, ProviderConfig};
pub use error::{ModelError, Result};
pub use provider::{
    Emotion, EmotionClassifier, EmotionPrediction, SpeechRequest, SpeechSynthesizer,
    VoiceSelector,
};
pub use providers::{MockClassifier, MockSynthesizer, ProviderKind, get_classifier, get_synthesizer};
pub use waveform::Waveform;
