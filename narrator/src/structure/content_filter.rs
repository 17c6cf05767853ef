//! Body-text heuristics for PDF blocks.
//!
//! PDF extraction cannot tell running heads, page numbers and copyright lines
//! apart from prose, so each block is checked against a short list of rules
//! before it reaches boundary detection.

use crate::ingest::RawChunk;

/// Rejection reason for a block that is not body text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterRule {
    MinWordCount(usize),
    AlnumRatio(f64),
    StartsUppercase,
    EndsWithTerminal,
}

impl FilterRule {
    pub fn name(&self) -> &'static str {
        match self {
            Self::MinWordCount(_) => "min-word-count",
            Self::AlnumRatio(_) => "alnum-ratio",
            Self::StartsUppercase => "starts-uppercase",
            Self::EndsWithTerminal => "ends-with-terminal",
        }
    }

    fn accepts(&self, text: &str) -> bool {
        match *self {
            Self::MinWordCount(min) => text.split_whitespace().count() >= min,
            Self::AlnumRatio(min) => {
                let total = text.chars().count();
                let alnum = text.chars().filter(|c| c.is_alphanumeric()).count();
                total > 0 && alnum as f64 / total as f64 >= min
            }
            Self::StartsUppercase => text.chars().next().is_some_and(char::is_uppercase),
            Self::EndsWithTerminal => text
                .trim_end()
                .chars()
                .last()
                .is_some_and(|c| matches!(c, '.' | '?' | '!')),
        }
    }
}

/// Outcome of running a block through the filter
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Verdict {
    MainContent,
    Rejected(FilterRule),
}

impl Verdict {
    pub fn is_main_content(&self) -> bool {
        matches!(self, Self::MainContent)
    }
}

#[derive(Debug, Clone)]
pub struct ContentFilter {
    rules: Vec<FilterRule>,
}

impl ContentFilter {
    pub const DEFAULT_MIN_WORDS: usize = 10;
    pub const DEFAULT_MIN_ALNUM_RATIO: f64 = 0.6;

    pub fn new(min_words: usize, min_alnum_ratio: f64) -> Self {
        Self {
            rules: vec![
                FilterRule::MinWordCount(min_words),
                FilterRule::AlnumRatio(min_alnum_ratio),
                FilterRule::StartsUppercase,
                FilterRule::EndsWithTerminal,
            ],
        }
    }

    /// Evaluate rules in order, stopping at the first one that fails.
    pub fn verdict(&self, text: &str) -> Verdict {
        self.rules
            .iter()
            .find(|rule| !rule.accepts(text))
            .map_or(Verdict::MainContent, |rule| Verdict::Rejected(*rule))
    }

    /// Keep main-content blocks, preserving order and original indices.
    pub fn filter(&self, chunks: Vec<RawChunk>) -> Vec<RawChunk> {
        let before = chunks.len();
        let kept: Vec<RawChunk> = chunks
            .into_iter()
            .filter(|chunk| {
                let verdict = self.verdict(&chunk.text);
                if let Verdict::Rejected(rule) = verdict {
                    log::debug!("Dropped block {} ({}): {:.40}", chunk.index, rule.name(), chunk.text);
                }
                verdict.is_main_content()
            })
            .collect();

        log::info!("Content filter kept {} of {} blocks", kept.len(), before);
        kept
    }
}

impl Default for ContentFilter {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MIN_WORDS, Self::DEFAULT_MIN_ALNUM_RATIO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARAGRAPH: &str = "The carriage rolled on through the rain for most of the night, \
        and by the time it reached the inn the horses were spent and the driver had long since \
        stopped talking to anyone, even himself, about the road ahead of them and the long \
        journey still to come.";

    #[test]
    fn test_paragraph_passes() {
        assert!(PARAGRAPH.split_whitespace().count() >= 40);
        assert_eq!(ContentFilter::default().verdict(PARAGRAPH), Verdict::MainContent);
    }

    #[test]
    fn test_short_header_rejected() {
        let verdict = ContentFilter::default().verdict("THE HOUSE OF USHER VOLUME");
        assert_eq!(verdict, Verdict::Rejected(FilterRule::MinWordCount(10)));
        assert!(!verdict.is_main_content());
    }

    #[test]
    fn test_symbol_heavy_block_rejected() {
        let text = "A . . . . . . . . . . . . . . . . . . . . . . . . . . . . . 12 . . .";
        assert_eq!(
            ContentFilter::default().verdict(text),
            Verdict::Rejected(FilterRule::AlnumRatio(0.6))
        );
    }

    #[test]
    fn test_lowercase_start_rejected() {
        let text = "continued from the previous page where the story left off before the break.";
        assert_eq!(
            ContentFilter::default().verdict(text),
            Verdict::Rejected(FilterRule::StartsUppercase)
        );
    }

    #[test]
    fn test_missing_terminal_rejected() {
        let text = "Chapter headings and running titles rarely end with a full stop at all";
        assert_eq!(
            ContentFilter::default().verdict(text),
            Verdict::Rejected(FilterRule::EndsWithTerminal)
        );

        let question = "Was it really the only road that ran through the valley that winter? ";
        assert_eq!(ContentFilter::default().verdict(question), Verdict::MainContent);
    }

    #[test]
    fn test_filter_preserves_order_and_indices() {
        let chunks = vec![
            RawChunk::new(0, "Page 12"),
            RawChunk::new(1, PARAGRAPH),
            RawChunk::new(2, "Copyright 2020"),
            RawChunk::new(3, PARAGRAPH),
        ];
        let kept = ContentFilter::default().filter(chunks);
        let indices: Vec<usize> = kept.iter().map(|c| c.index).collect();
        assert_eq!(indices, vec![1, 3]);
    }

    #[test]
    fn test_configurable_thresholds() {
        let lenient = ContentFilter::new(2, 0.5);
        assert!(lenient.verdict("He left.").is_main_content());
        assert!(!ContentFilter::default().verdict("He left.").is_main_content());
    }
}
