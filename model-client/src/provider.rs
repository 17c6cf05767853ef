use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::error::{ModelError, Result};
use crate::waveform::Waveform;

/// Closed label set produced by the emotion classifier.
///
/// Variant order matches the classifier's training label ids, so `LABEL_3`
/// is `Anger`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Sadness,
    Joy,
    Love,
    Anger,
    Fear,
    Surprise,
}

impl Emotion {
    /// All labels in label-id order.
    pub const ALL: [Emotion; 6] = [
        Emotion::Sadness,
        Emotion::Joy,
        Emotion::Love,
        Emotion::Anger,
        Emotion::Fear,
        Emotion::Surprise,
    ];

    /// Lowercase label name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sadness => "sadness",
            Self::Joy => "joy",
            Self::Love => "love",
            Self::Anger => "anger",
            Self::Fear => "fear",
            Self::Surprise => "surprise",
        }
    }

    /// Parse a classifier label: either a name (`"joy"`) or a positional id
    /// (`"LABEL_1"`).
    pub fn from_label(label: &str) -> Result<Self> {
        let label = label.trim();

        if let Some(id) = label
            .strip_prefix("LABEL_")
            .or_else(|| label.strip_prefix("label_"))
        {
            return id
                .parse::<usize>()
                .ok()
                .and_then(|i| Self::ALL.get(i).copied())
                .ok_or_else(|| ModelError::UnknownLabel(label.to_string()));
        }

        Self::ALL
            .iter()
            .copied()
            .find(|e| e.as_str().eq_ignore_ascii_case(label))
            .ok_or_else(|| ModelError::UnknownLabel(label.to_string()))
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One classifier verdict, order-aligned with the input batch
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmotionPrediction {
    pub emotion: Emotion,
    /// Confidence in [0, 1]
    pub score: f32,
}

/// How the synthesis engine should voice a chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoiceSelector {
    /// Built-in speaker preset id (e.g. `v2/en_speaker_6`)
    Preset(String),
    /// Reference audio sample for voice cloning
    Reference(PathBuf),
    /// Short style prompt prepended to the text
    Prompt(String),
}

/// Request to synthesize one chunk of text
#[derive(Debug, Clone)]
pub struct SpeechRequest {
    pub text: String,
    pub voice: VoiceSelector,
    pub emotion: Option<Emotion>,
}

impl SpeechRequest {
    pub fn new(text: impl Into<String>, voice: VoiceSelector) -> Self {
        Self {
            text: text.into(),
            voice,
            emotion: None,
        }
    }

    pub fn with_emotion(mut self, emotion: Option<Emotion>) -> Self {
        self.emotion = emotion;
        self
    }

    /// Text as the engine should read it; prompt voices are prepended.
    pub fn rendered_text(&self) -> String {
        match &self.voice {
            VoiceSelector::Prompt(prompt) if !prompt.trim().is_empty() => {
                format!("{} {}", prompt.trim(), self.text)
            }
            _ => self.text.clone(),
        }
    }
}

/// Trait for emotion classification models
#[async_trait]
pub trait EmotionClassifier: Send + Sync {
    /// Classify a batch of sentences. The output has the same length and
    /// order as the input.
    async fn classify(&self, sentences: &[String]) -> Result<Vec<EmotionPrediction>>;

    /// Get the provider name for display
    fn name(&self) -> &'static str;

    /// Check if the provider is available (API key set, endpoint configured, etc.)
    fn is_available(&self) -> Result<()>;
}

/// Trait for speech synthesis engines
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize one chunk into a mono waveform
    async fn synthesize(&self, request: &SpeechRequest) -> Result<Waveform>;

    /// Get the provider name for display
    fn name(&self) -> &'static str;

    /// Check if the provider is available
    fn is_available(&self) -> Result<()>;
}
