//! Text processing: normalization, sentence segmentation, tagging and
//! splitting into synthesis-sized chunks.

mod normalizer;
mod segmenter;
pub mod splitter;
mod tagger;

use model_client::Emotion;
use serde::{Deserialize, Serialize};

pub use normalizer::normalize;
pub use segmenter::Segmenter;
pub use splitter::{DEFAULT_MAX_CHARS, split_text};
pub use tagger::tag_sentence;

/// Whether a sentence is spoken by the narrator or by a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UtteranceKind {
    Narration,
    Dialogue,
}

impl UtteranceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Narration => "narration",
            Self::Dialogue => "dialogue",
        }
    }
}

impl std::fmt::Display for UtteranceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tagged sentence in reading order.
///
/// Emotion fields stay `None` until a classifier has annotated the utterance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Utterance {
    pub index: usize,
    pub kind: UtteranceKind,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emotion: Option<Emotion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

impl Utterance {
    pub fn new(index: usize, kind: UtteranceKind, text: impl Into<String>) -> Self {
        Self {
            index,
            kind,
            text: text.into(),
            emotion: None,
            score: None,
        }
    }
}

/// A length-bounded piece of one utterance, ready for the synthesizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisChunk {
    pub utterance_index: usize,
    pub chunk_index: usize,
    pub kind: UtteranceKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emotion: Option<Emotion>,
    pub text: String,
}

impl SynthesisChunk {
    /// Split an utterance into chunks of at most `max_chars` characters.
    pub fn plan(utterance: &Utterance, max_chars: usize) -> Vec<Self> {
        split_text(&utterance.text, max_chars)
            .into_iter()
            .enumerate()
            .map(|(chunk_index, text)| Self {
                utterance_index: utterance.index,
                chunk_index,
                kind: utterance.kind,
                emotion: utterance.emotion,
                text,
            })
            .collect()
    }

    /// True for the first chunk of its utterance.
    pub fn starts_utterance(&self) -> bool {
        self.chunk_index == 0
    }
}
