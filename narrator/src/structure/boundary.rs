//! Narrative boundary detection: skip front matter before the story starts.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

use crate::error::{PipelineError, Result};
use crate::ingest::RawChunk;

/// Only this many leading characters of each chunk are examined.
pub const WINDOW_CHARS: usize = 50;

/// Well-formed roman numeral from I to CCCXCIX, never empty. Each arm starts
/// with a non-empty digit group so words like "civil" or "mix" never match.
const ROMAN: &str = r"(?:c{1,3}(?:xc|xl|l?x{0,3})(?:ix|iv|v?i{0,3})|(?:xc|xl|lx{0,3}|x{1,3})(?:ix|iv|v?i{0,3})|(?:ix|iv|vi{0,3}|i{1,3}))";

static STRUCTURAL_START: Lazy<String> = Lazy::new(|| {
    format!(
        r"^(chapter|prologue|epilogue|book|part|section|letter|introduction)\s+([1-9][0-9]*|{ROMAN}|one|two|three|four|five|six|seven|eight|nine|ten)\b"
    )
});
static STANDALONE_NUMBERING: Lazy<String> =
    Lazy::new(|| format!(r"(?m)^\s*({ROMAN}|[1-9][0-9]*)\s*$"));

/// A predicate deciding whether a chunk's leading window opens the story.
pub trait BoundaryRule: Send + Sync {
    fn name(&self) -> &str;

    fn matches(&self, window: &str) -> bool;
}

/// Case-insensitive regex rule
#[derive(Debug, Clone)]
pub struct PatternRule {
    name: String,
    regex: Regex,
}

impl PatternRule {
    pub fn new(name: impl Into<String>, pattern: &str) -> Result<Self> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| PipelineError::InvalidPattern {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            name: name.into(),
            regex,
        })
    }
}

impl BoundaryRule for PatternRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn matches(&self, window: &str) -> bool {
        self.regex.is_match(window)
    }
}

/// Where the narrative starts and which rule said so
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryMatch {
    pub index: usize,
    pub rule: String,
}

/// Ordered rule set; the lowest-index chunk matching any rule wins.
pub struct NarrativeBoundary {
    rules: Vec<Box<dyn BoundaryRule>>,
}

impl NarrativeBoundary {
    /// No rules; nothing will ever be trimmed.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Structural keywords followed by a number, then bare numbering lines.
    pub fn standard() -> Self {
        Self::empty()
            .with_rule(
                PatternRule::new("structural-start", &STRUCTURAL_START)
                    .expect("built-in structural pattern compiles"),
            )
            .with_rule(
                PatternRule::new("standalone-numbering", &STANDALONE_NUMBERING)
                    .expect("built-in numbering pattern compiles"),
            )
    }

    /// Append a rule, tried after every existing one.
    pub fn with_rule(mut self, rule: impl BoundaryRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Append user-supplied regex patterns as extra rules.
    pub fn with_patterns(mut self, patterns: &[String]) -> Result<Self> {
        for (i, pattern) in patterns.iter().enumerate() {
            self = self.with_rule(PatternRule::new(format!("extra-{}", i + 1), pattern)?);
        }
        Ok(self)
    }

    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Find the first chunk that looks like the start of the story.
    pub fn find_start(&self, chunks: &[RawChunk]) -> Option<BoundaryMatch> {
        chunks.iter().enumerate().find_map(|(index, chunk)| {
            let window: String = chunk.text.trim().chars().take(WINDOW_CHARS).collect();
            self.rules
                .iter()
                .find(|rule| rule.matches(&window))
                .map(|rule| BoundaryMatch {
                    index,
                    rule: rule.name().to_string(),
                })
        })
    }

    /// Drop every chunk before the narrative start.
    ///
    /// Fails open: with no match the input is returned unchanged and a
    /// warning is logged.
    pub fn trim(&self, mut chunks: Vec<RawChunk>) -> Vec<RawChunk> {
        match self.find_start(&chunks) {
            Some(found) => {
                log::info!(
                    "Found narrative start in chunk {} of {} using rule '{}'",
                    found.index + 1,
                    chunks.len(),
                    found.rule
                );
                chunks.split_off(found.index)
            }
            None => {
                log::warn!(
                    "No standard start marker found in {} chunks; output may contain boilerplate",
                    chunks.len()
                );
                chunks
            }
        }
    }
}

impl Default for NarrativeBoundary {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunks(texts: &[&str]) -> Vec<RawChunk> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| RawChunk::new(i, *t))
            .collect()
    }

    #[test]
    fn test_skips_front_matter() {
        let input = chunks(&[
            "Copyright 2020",
            "Table of Contents",
            "Chapter 1 It was a dark night...",
        ]);
        let trimmed = NarrativeBoundary::standard().trim(input);

        assert_eq!(trimmed.len(), 1);
        assert_eq!(trimmed[0].index, 2);
        assert_eq!(trimmed[0].text, "Chapter 1 It was a dark night...");
    }

    #[test]
    fn test_no_match_fails_open() {
        let input = chunks(&["Copyright 2020", "All rights reserved.", "Once upon a time."]);
        let detector = NarrativeBoundary::standard();

        assert!(detector.find_start(&input).is_none());
        assert_eq!(detector.trim(input.clone()), input);
    }

    #[test]
    fn test_keyword_variants() {
        let detector = NarrativeBoundary::standard();
        for text in [
            "CHAPTER ONE The Beginning",
            "Prologue 1",
            "part IV: Winter",
            "Letter ten",
            "Book 12",
            "  introduction 3 whatever",
            "Epilogue xii",
        ] {
            let found = detector.find_start(&chunks(&[text]));
            assert_eq!(
                found.map(|m| m.rule),
                Some("structural-start".to_string()),
                "{text}"
            );
        }
    }

    #[test]
    fn test_keyword_without_number_does_not_match() {
        let detector = NarrativeBoundary::standard();
        for text in [
            "Chapter",
            "Book dealers everywhere agree.",
            "Part of this work may not be reproduced.",
            "Contents Chapter 1",
            "Chapter eleven",
        ] {
            assert!(detector.find_start(&chunks(&[text])).is_none(), "{text}");
        }
    }

    #[test]
    fn test_standalone_numbering() {
        let detector = NarrativeBoundary::standard();

        let found = detector.find_start(&chunks(&["Dedication", "  IV  ", "Chapter 2"]));
        assert_eq!(
            found,
            Some(BoundaryMatch {
                index: 1,
                rule: "standalone-numbering".to_string()
            })
        );

        let found = detector.find_start(&chunks(&["17\nThe rain fell."]));
        assert_eq!(found.map(|m| m.index), Some(0));

        assert!(detector.find_start(&chunks(&["Copyright 2020"])).is_none());
    }

    #[test]
    fn test_only_leading_window_is_examined() {
        let late_marker = format!("{} Chapter 1", "a".repeat(WINDOW_CHARS));
        let detector = NarrativeBoundary::standard();
        assert!(detector.find_start(&chunks(&[&late_marker])).is_none());
    }

    #[test]
    fn test_numeral_letter_words_are_not_numbers() {
        let detector = NarrativeBoundary::standard();
        let input = chunks(&[
            "Copyright page",
            "Section civil rights were debated at length.",
            "Mix",
            "Did",
            "Chapter 1 It began.",
        ]);

        assert_eq!(
            detector.find_start(&input),
            Some(BoundaryMatch {
                index: 4,
                rule: "structural-start".to_string()
            })
        );
    }

    #[test]
    fn test_well_formed_roman_numerals() {
        let detector = NarrativeBoundary::standard();
        for text in ["Chapter XLII", "Part ix", "Book CCC", "Section viii"] {
            assert!(detector.find_start(&chunks(&[text])).is_some(), "{text}");
        }
        for text in ["XIV", "  lx ", "i"] {
            assert!(detector.find_start(&chunks(&[text])).is_some(), "{text}");
        }
        for text in ["IIII", "VX", "Chapter IC"] {
            assert!(detector.find_start(&chunks(&[text])).is_none(), "{text}");
        }
    }

    #[test]
    fn test_rules_tried_in_declared_order() {
        let detector = NarrativeBoundary::standard();
        assert_eq!(
            detector.rule_names(),
            vec!["structural-start", "standalone-numbering"]
        );

        // Both rules match the first line; the structural rule is declared first
        let found = detector.find_start(&chunks(&["Chapter 3\n3"])).unwrap();
        assert_eq!(found.rule, "structural-start");
    }

    #[test]
    fn test_extra_patterns() {
        let detector = NarrativeBoundary::standard()
            .with_patterns(&[r"^\*\*\*\s*start of the story".to_string()])
            .unwrap();
        let found = detector
            .find_start(&chunks(&["Preface", "*** START OF THE STORY ***"]))
            .unwrap();

        assert_eq!(found.index, 1);
        assert_eq!(found.rule, "extra-1");
    }

    #[test]
    fn test_invalid_extra_pattern() {
        let result = NarrativeBoundary::standard().with_patterns(&["(unclosed".to_string()]);
        assert!(matches!(result, Err(PipelineError::InvalidPattern { .. })));
    }

    #[test]
    fn test_custom_rule() {
        struct StartsWithOnce;
        impl BoundaryRule for StartsWithOnce {
            fn name(&self) -> &str {
                "once"
            }
            fn matches(&self, window: &str) -> bool {
                window.starts_with("Once")
            }
        }

        let detector = NarrativeBoundary::empty().with_rule(StartsWithOnce);
        let trimmed = detector.trim(chunks(&["Foreword", "Once upon a time."]));
        assert_eq!(trimmed.len(), 1);
        assert_eq!(trimmed[0].index, 1);
    }
}
