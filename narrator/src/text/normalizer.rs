//! Repair extraction artifacts before sentence segmentation.

use once_cell::sync::Lazy;
use regex::Regex;

/// Typographic characters that confuse later heuristics, and their replacements.
const TYPOGRAPHIC_CHARS: &[(char, &str)] = &[
    ('\u{2018}', "'"),   // Left single quote
    ('\u{2019}', "'"),   // Right single quote
    ('\u{201c}', "\""),  // Left double quote
    ('\u{201d}', "\""),  // Right double quote
    ('\u{00ab}', "\""),  // Left-pointing double angle quote
    ('\u{00bb}', "\""),  // Right-pointing double angle quote
    ('\u{2032}', "'"),   // Prime
    ('\u{2033}', "\""),  // Double prime
    ('\u{2026}', "..."), // Ellipsis
    ('\u{00a0}', " "),   // Non-breaking space
    ('\u{2011}', "-"),   // Non-breaking hyphen
    ('\u{200b}', ""),    // Zero-width space
    ('\u{200c}', ""),    // Zero-width non-joiner
    ('\u{200d}', ""),    // Zero-width joiner
    ('\u{feff}', ""),    // BOM
];

/// A word broken across a line: letter, hyphen, whitespace, letter.
static HYPHEN_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\p{L})-\s+(\p{L})").unwrap());

/// Em dash, en dash, figure dash, horizontal bar or a run of hyphens, with
/// any surrounding whitespace. Adjacent dashes collapse into one pause.
static DASH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*(?:(?:[\u{2012}\u{2013}\u{2014}\u{2015}]|-{2,})\s*)+").unwrap());

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Normalize extracted narrative text.
///
/// Steps, in order:
/// - fold curly quotes and invisible characters, drop control characters
/// - join words hyphenated across line breaks (`won- derful` → `wonderful`)
/// - replace dashes with a comma pause (`a—b` → `a, b`)
/// - collapse whitespace runs to a single space and trim
///
/// Applying it twice gives the same result as applying it once.
pub fn normalize(text: &str) -> String {
    let folded = fold_typography(text);
    let joined = join_hyphenated(&folded);
    let paused = DASH.replace_all(&joined, ", ");
    WHITESPACE.replace_all(&paused, " ").trim().to_string()
}

fn fold_typography(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for c in text.chars() {
        if let Some((_, r)) = TYPOGRAPHIC_CHARS.iter().find(|(ch, _)| *ch == c) {
            result.push_str(r);
        } else if !c.is_control() || c.is_whitespace() {
            result.push(c);
        }
    }

    result
}

fn join_hyphenated(text: &str) -> String {
    let mut text = text.to_string();
    // Non-overlapping matches leave chains like "a- b- c" half joined
    while HYPHEN_BREAK.is_match(&text) {
        text = HYPHEN_BREAK.replace_all(&text, "$1$2").into_owned();
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_joins_hyphen_breaks() {
        assert_eq!(normalize("won- derful"), "wonderful");
        assert_eq!(normalize("some-\n   thing else"), "something else");
        assert_eq!(normalize("a- b- c"), "abc");
    }

    #[test]
    fn test_keeps_real_hyphens() {
        assert_eq!(normalize("a well-known fact"), "a well-known fact");
        assert_eq!(normalize("pages 10- 12"), "pages 10- 12");
    }

    #[test]
    fn test_dashes_become_pauses() {
        assert_eq!(normalize("a\u{2014}b"), "a, b");
        assert_eq!(normalize("a \u{2013} b"), "a, b");
        assert_eq!(normalize("wait -- what"), "wait, what");
        assert_eq!(normalize("so\u{2014}\u{2014}then"), "so, then");
    }

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(normalize("x   y"), "x y");
        assert_eq!(normalize("  line one\n\n\tline two  "), "line one line two");
    }

    #[test]
    fn test_folds_typography() {
        let text = "\u{201c}Hello,\u{201d} said John. \u{2018}It\u{2019}s nice.\u{2019}";
        assert_eq!(normalize(text), "\"Hello,\" said John. 'It's nice.'");
        assert_eq!(normalize("Hello\u{200b}World\u{feff}"), "HelloWorld");
        assert_eq!(normalize("Hello\x00World\x07Test"), "HelloWorldTest");
        assert_eq!(normalize("ten\u{a0}miles"), "ten miles");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" \n\t "), "");
    }

    proptest! {
        #[test]
        fn prop_idempotent(text in "\\PC{0,200}") {
            let once = normalize(&text);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn prop_no_whitespace_runs(text in "[a-z \\n\\t\u{2014}-]{0,120}") {
            let out = normalize(&text);
            prop_assert!(!out.contains("  "));
            prop_assert!(!out.contains('\n'));
            prop_assert_eq!(out.trim(), out.as_str());
        }
    }
}
