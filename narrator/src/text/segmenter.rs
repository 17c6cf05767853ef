//! Sentence splitting using the seams library (dialog-aware).

use seams::sentence_detector::dialog_detector::SentenceDetectorDialog;

use crate::error::{PipelineError, Result};

/// Abbreviation- and dialog-aware sentence segmenter.
pub struct Segmenter {
    detector: SentenceDetectorDialog,
}

impl Segmenter {
    pub fn new() -> Result<Self> {
        let detector =
            SentenceDetectorDialog::new().map_err(|e| PipelineError::Segmentation(e.to_string()))?;
        Ok(Self { detector })
    }

    /// Split normalized text into trimmed, non-empty sentences in reading order.
    pub fn sentences(&self, text: &str) -> Result<Vec<String>> {
        let detected = self
            .detector
            .detect_sentences_borrowed(text)
            .map_err(|e| PipelineError::Segmentation(e.to_string()))?;

        Ok(detected
            .iter()
            .map(|s| s.normalize().trim().to_string())
            .filter(|s| !s.is_empty())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_simple_sentences() {
        let segmenter = Segmenter::new().unwrap();
        let sentences = segmenter.sentences("He ran. She walked!").unwrap();
        assert_eq!(sentences, vec!["He ran.", "She walked!"]);
    }

    #[test]
    fn test_empty_input() {
        let segmenter = Segmenter::new().unwrap();
        assert!(segmenter.sentences("").unwrap().is_empty());
        assert!(segmenter.sentences("   ").unwrap().is_empty());
    }

    #[test]
    fn test_no_empty_or_untrimmed_sentences() {
        let segmenter = Segmenter::new().unwrap();
        let sentences = segmenter
            .sentences("First sentence. Second sentence? Third one.")
            .unwrap();
        assert_eq!(sentences.len(), 3);
        for s in &sentences {
            assert!(!s.is_empty());
            assert_eq!(s.trim(), s);
        }
        assert!(sentences[0].contains("First"));
        assert!(sentences[2].contains("Third"));
    }

    #[test]
    fn test_rejoining_reproduces_sentences() {
        let segmenter = Segmenter::new().unwrap();
        let text = "The door opened. \"Who is there?\" she asked. Nobody answered.";
        let first = segmenter.sentences(text).unwrap();
        let second = segmenter.sentences(&first.join(" ")).unwrap();
        assert_eq!(first, second);
    }
}
