//! Pipeline configuration: ~/.config/audiobook-director/narrator.toml

use anyhow::{Context, Result};
use model_client::VoiceSelector;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::structure::ContentFilter;
use crate::text::{DEFAULT_MAX_CHARS, UtteranceKind};

const DEFAULT_SILENCE_GAP_MS: u64 = 800;
const DEFAULT_UNIT_TIMEOUT_SECS: u64 = 120;
const DEFAULT_CLASSIFY_BATCH_SIZE: usize = 16;

const DEFAULT_NARRATION_PRESET: &str = "v2/en_speaker_6";
const DEFAULT_DIALOGUE_PRESET: &str = "v2/en_speaker_3";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarratorConfig {
    /// Maximum synthesis chunk length in characters
    #[serde(default = "default_max_chunk_chars")]
    pub max_chunk_chars: usize,

    /// Silence inserted between utterances in the assembled audio
    #[serde(default = "default_silence_gap_ms")]
    pub silence_gap_ms: u64,

    /// Per-chunk synthesis timeout
    #[serde(default = "default_unit_timeout_secs")]
    pub unit_timeout_secs: u64,

    /// Sentences sent to the emotion classifier per request
    #[serde(default = "default_classify_batch_size")]
    pub classify_batch_size: usize,

    #[serde(default)]
    pub voices: VoiceCast,

    #[serde(default)]
    pub boundary: BoundaryConfig,

    #[serde(default)]
    pub pdf: PdfConfig,
}

/// Which voice reads which kind of utterance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceCast {
    pub narration: VoiceSelector,
    pub dialogue: VoiceSelector,
}

impl VoiceCast {
    pub fn voice_for(&self, kind: UtteranceKind) -> &VoiceSelector {
        match kind {
            UtteranceKind::Narration => &self.narration,
            UtteranceKind::Dialogue => &self.dialogue,
        }
    }
}

impl Default for VoiceCast {
    fn default() -> Self {
        Self {
            narration: VoiceSelector::Preset(DEFAULT_NARRATION_PRESET.to_string()),
            dialogue: VoiceSelector::Preset(DEFAULT_DIALOGUE_PRESET.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoundaryConfig {
    /// Extra regexes tried after the built-in start markers
    #[serde(default)]
    pub extra_patterns: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdfConfig {
    /// Drop headers, footers and other non-body blocks
    #[serde(default = "default_true")]
    pub content_filter: bool,

    #[serde(default = "default_min_words")]
    pub min_words: usize,

    #[serde(default = "default_min_alnum_ratio")]
    pub min_alnum_ratio: f64,
}

impl PdfConfig {
    /// The configured block filter, or `None` when filtering is disabled.
    pub fn filter(&self) -> Option<ContentFilter> {
        self.content_filter
            .then(|| ContentFilter::new(self.min_words, self.min_alnum_ratio))
    }
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            content_filter: true,
            min_words: default_min_words(),
            min_alnum_ratio: default_min_alnum_ratio(),
        }
    }
}

fn default_max_chunk_chars() -> usize {
    DEFAULT_MAX_CHARS
}

fn default_silence_gap_ms() -> u64 {
    DEFAULT_SILENCE_GAP_MS
}

fn default_unit_timeout_secs() -> u64 {
    DEFAULT_UNIT_TIMEOUT_SECS
}

fn default_classify_batch_size() -> usize {
    DEFAULT_CLASSIFY_BATCH_SIZE
}

fn default_true() -> bool {
    true
}

fn default_min_words() -> usize {
    ContentFilter::DEFAULT_MIN_WORDS
}

fn default_min_alnum_ratio() -> f64 {
    ContentFilter::DEFAULT_MIN_ALNUM_RATIO
}

impl Default for NarratorConfig {
    fn default() -> Self {
        Self {
            max_chunk_chars: default_max_chunk_chars(),
            silence_gap_ms: default_silence_gap_ms(),
            unit_timeout_secs: default_unit_timeout_secs(),
            classify_batch_size: default_classify_batch_size(),
            voices: VoiceCast::default(),
            boundary: BoundaryConfig::default(),
            pdf: PdfConfig::default(),
        }
    }
}

impl NarratorConfig {
    /// Get the config file path: ~/.config/audiobook-director/narrator.toml
    pub fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("audiobook-director")
            .join("narrator.toml"))
    }

    /// Load config from the default location, returning defaults if absent
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load config from an explicit path, returning defaults if absent
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: NarratorConfig = toml::from_str(&content)
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;
        Ok(config)
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}
