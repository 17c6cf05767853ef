//! Split utterances into synthesis-sized chunks at punctuation.

/// Default maximum chunk length in characters.
pub const DEFAULT_MAX_CHARS: usize = 150;

/// Characters that end a fragment.
const DELIMITERS: &[char] = &[',', ';', '.', '!', '?', '\u{2014}'];

/// Split text into chunks of at most `max_chars` characters.
///
/// The text is cut after every delimiter and the resulting fragments are
/// packed greedily: a chunk is closed as soon as the next fragment would push
/// it over the limit. A fragment that alone exceeds the limit is split on
/// word boundaries, and a single word that does is split by characters.
/// Chunks are trimmed; empty chunks are dropped.
pub fn split_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut buffer = String::new();

    for fragment in fragments(text) {
        if char_len(fragment.trim()) > max_chars {
            flush(&mut chunks, &mut buffer);
            chunks.extend(split_on_words(fragment, max_chars));
            continue;
        }

        if char_len(format!("{}{}", buffer, fragment).trim()) > max_chars {
            flush(&mut chunks, &mut buffer);
        }
        buffer.push_str(fragment);
    }

    flush(&mut chunks, &mut buffer);
    chunks
}

/// Cut text after each delimiter; the tail after the last one is a fragment too.
fn fragments(text: &str) -> Vec<&str> {
    let mut fragments = Vec::new();
    let mut start = 0;

    for (i, c) in text.char_indices() {
        if DELIMITERS.contains(&c) {
            let end = i + c.len_utf8();
            fragments.push(&text[start..end]);
            start = end;
        }
    }
    if start < text.len() {
        fragments.push(&text[start..]);
    }

    fragments
}

fn flush(chunks: &mut Vec<String>, buffer: &mut String) {
    let trimmed = buffer.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
    buffer.clear();
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Pack whole words into chunks; words longer than the limit are hard split.
fn split_on_words(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if char_len(word) > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            chunks.extend(hard_split(word, max_chars));
        } else if current.is_empty() {
            current = word.to_string();
        } else if char_len(&current) + char_len(word) + 1 <= max_chars {
            current.push(' ');
            current.push_str(word);
        } else {
            chunks.push(std::mem::replace(&mut current, word.to_string()));
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// Hard split text at exact character positions (last resort).
fn hard_split(text: &str, max_chars: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(max_chars)
        .map(|piece| piece.iter().collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn squash(s: &str) -> String {
        s.chars().filter(|c| !c.is_whitespace()).collect()
    }

    #[test]
    fn test_short_text_is_single_chunk() {
        assert_eq!(
            split_text("Hello world. How are you?", 150),
            vec!["Hello world. How are you?"]
        );
    }

    #[test]
    fn test_empty_text() {
        assert!(split_text("", 150).is_empty());
        assert!(split_text("   ", 150).is_empty());
    }

    #[test]
    fn test_greedy_packing() {
        let text = "one, two, three, four.";
        assert_eq!(split_text(text, 10), vec!["one, two,", "three,", "four."]);
    }

    #[test]
    fn test_tail_without_delimiter_is_kept() {
        assert_eq!(split_text("first part, second part", 12), vec!["first part,", "second part"]);
    }

    #[test]
    fn test_long_sentence_respects_limit() {
        let clause = "the lantern swung in the wind above the gate, ";
        let sentence = clause.repeat(7);
        let sentence = sentence.trim_end_matches([',', ' ']).to_string() + ".";
        assert!(sentence.chars().count() >= 300);

        let chunks = split_text(&sentence, 150);

        assert!(chunks.len() >= 2);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 150, "too long: {chunk}");
        }
        assert_eq!(squash(&chunks.concat()), squash(&sentence));
    }

    #[test]
    fn test_fragment_without_punctuation_splits_on_words() {
        let text = "one two three four five";
        assert_eq!(split_text(text, 10), vec!["one two", "three four", "five"]);
    }

    #[test]
    fn test_overlong_word_is_hard_split() {
        assert_eq!(split_text("abcdefghij", 3), vec!["abc", "def", "ghi", "j"]);
    }

    #[test]
    fn test_em_dash_is_a_delimiter() {
        assert_eq!(
            split_text("wait\u{2014}listen to me", 8),
            vec!["wait\u{2014}", "listen", "to me"]
        );
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        let text = "\u{e9}\u{e9}\u{e9}\u{e9}\u{e9}, \u{e9}\u{e9}\u{e9}\u{e9}\u{e9}.";
        assert_eq!(split_text(text, 13), vec![text]);
    }

    proptest! {
        #[test]
        fn prop_chunks_bounded_and_lossless(
            text in "[a-zA-Z ,;.!?]{0,400}",
            max in 5usize..200,
        ) {
            let chunks = split_text(&text, max);
            for chunk in &chunks {
                prop_assert!(!chunk.is_empty());
                prop_assert!(chunk.chars().count() <= max);
                prop_assert_eq!(chunk.trim(), chunk.as_str());
            }
            prop_assert_eq!(squash(&chunks.concat()), squash(&text));
        }
    }
}
