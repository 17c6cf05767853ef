//! Mock providers for testing
//!
//! Configurable stand-ins for the classifier and the synthesis engine that
//! can simulate per-call failures.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{ModelError, Result};
use crate::provider::{
    Emotion, EmotionClassifier, EmotionPrediction, SpeechRequest, SpeechSynthesizer,
};
use crate::waveform::Waveform;

/// Sample rate used by the mock synthesizer
pub const MOCK_SAMPLE_RATE: u32 = 24000;

/// A classifier that labels every sentence the same way, or fails
pub struct MockClassifier {
    emotion: Emotion,
    score: f32,
    fail: bool,
    call_count: AtomicUsize,
}

impl MockClassifier {
    /// Create a classifier that always answers `emotion` with `score`
    pub fn always(emotion: Emotion, score: f32) -> Self {
        Self {
            emotion,
            score,
            fail: false,
            call_count: AtomicUsize::new(0),
        }
    }

    /// Create a classifier whose every call fails
    pub fn always_fails() -> Self {
        Self {
            emotion: Emotion::Joy,
            score: 0.0,
            fail: true,
            call_count: AtomicUsize::new(0),
        }
    }

    /// Get the number of times classify() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmotionClassifier for MockClassifier {
    async fn classify(&self, sentences: &[String]) -> Result<Vec<EmotionPrediction>> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        if self.fail {
            return Err(ModelError::ModelLoading {
                message: "mock classifier unavailable".to_string(),
            });
        }

        Ok(sentences
            .iter()
            .map(|_| EmotionPrediction {
                emotion: self.emotion,
                score: self.score,
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "mock"
    }

    fn is_available(&self) -> Result<()> {
        Ok(())
    }
}

/// A synthesizer that returns silence sized to the text, failing on
/// selected calls
pub struct MockSynthesizer {
    /// Zero-based call numbers that should fail
    failing_calls: HashSet<usize>,
    /// Samples produced per input character
    samples_per_char: usize,
    call_count: AtomicUsize,
    /// Rendered text of every request, in call order
    requests: Mutex<Vec<String>>,
}

impl MockSynthesizer {
    /// Create a synthesizer that always succeeds
    pub fn always_succeeds() -> Self {
        Self::failing_on(&[])
    }

    /// Create a synthesizer that fails on the given zero-based calls
    pub fn failing_on(calls: &[usize]) -> Self {
        Self {
            failing_calls: calls.iter().copied().collect(),
            samples_per_char: 10,
            call_count: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Get the number of times synthesize() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Texts received so far
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl SpeechSynthesizer for MockSynthesizer {
    async fn synthesize(&self, request: &SpeechRequest) -> Result<Waveform> {
        let call_num = self.call_count.fetch_add(1, Ordering::SeqCst);
        let text = request.rendered_text();

        if let Ok(mut requests) = self.requests.lock() {
            requests.push(text.clone());
        }

        if self.failing_calls.contains(&call_num) {
            return Err(ModelError::ApiError {
                message: format!("mock failure on call {}", call_num),
                status_code: Some(500),
            });
        }

        let len = text.chars().count().max(1) * self.samples_per_char;
        Ok(Waveform::new(MOCK_SAMPLE_RATE, vec![0.0; len]))
    }

    fn name(&self) -> &'static str {
        "mock"
    }

    fn is_available(&self) -> Result<()> {
        Ok(())
    }
}
