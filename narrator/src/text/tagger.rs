use super::UtteranceKind;

/// Classify a sentence as narration or dialogue.
///
/// A sentence wrapped in straight double quotes is dialogue and comes back
/// with exactly one quote removed from each end. Anything else is narration
/// and is returned trimmed but otherwise unchanged.
///
/// Only whole-sentence quotes count, so `"Run," he said.` is narration and a
/// quote spanning several sentences tags only its first and last pieces
/// inconsistently. Both are accepted limitations.
pub fn tag_sentence(sentence: &str) -> (UtteranceKind, String) {
    let trimmed = sentence.trim();

    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        (
            UtteranceKind::Dialogue,
            trimmed[1..trimmed.len() - 1].to_string(),
        )
    } else {
        (UtteranceKind::Narration, trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoted_sentence_is_dialogue() {
        assert_eq!(
            tag_sentence("\"Hello there.\""),
            (UtteranceKind::Dialogue, "Hello there.".to_string())
        );
    }

    #[test]
    fn test_plain_sentence_is_narration() {
        assert_eq!(
            tag_sentence("He left."),
            (UtteranceKind::Narration, "He left.".to_string())
        );
    }

    #[test]
    fn test_attributed_quote_is_narration() {
        let (kind, text) = tag_sentence("\"Run,\" he said.");
        assert_eq!(kind, UtteranceKind::Narration);
        assert_eq!(text, "\"Run,\" he said.");
    }

    #[test]
    fn test_strips_only_one_quote_each_side() {
        assert_eq!(
            tag_sentence("\"\"Nested\"\""),
            (UtteranceKind::Dialogue, "\"Nested\"".to_string())
        );
        assert_eq!(tag_sentence("\"\""), (UtteranceKind::Dialogue, String::new()));
    }

    #[test]
    fn test_lone_quote_is_narration() {
        assert_eq!(
            tag_sentence(" \" "),
            (UtteranceKind::Narration, "\"".to_string())
        );
    }
}
