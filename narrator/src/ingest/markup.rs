//! Markup helpers shared by the EPUB and MOBI extractors.

use once_cell::sync::Lazy;
use regex::Regex;

static SCRIPT_OR_STYLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<(script|style)\b[^>]*>.*?</(script|style)\s*>").unwrap());
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());
static NUMERIC_ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&#(?:[xX]([0-9a-fA-F]+)|([0-9]+));").unwrap());

/// Named entities that survive markup stripping in real books.
const NAMED_ENTITIES: &[(&str, &str)] = &[
    ("&nbsp;", " "),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&apos;", "'"),
    ("&mdash;", "—"),
    ("&ndash;", "–"),
    ("&hellip;", "..."),
    ("&rsquo;", "'"),
    ("&lsquo;", "'"),
    ("&rdquo;", "\""),
    ("&ldquo;", "\""),
    // Must stay last so "&amp;lt;" decodes to "&lt;" rather than "<"
    ("&amp;", "&"),
];

/// Remove every tag (and script/style bodies), leaving a space where each
/// tag was so adjacent block text does not fuse.
pub fn strip_tags(html: &str) -> String {
    let without_code = SCRIPT_OR_STYLE.replace_all(html, " ");
    TAG.replace_all(&without_code, " ").into_owned()
}

/// Decode numeric and common named HTML entities.
pub fn decode_entities(text: &str) -> String {
    let decoded = NUMERIC_ENTITY.replace_all(text, |caps: &regex::Captures| {
        let code = match (caps.get(1), caps.get(2)) {
            (Some(hex), _) => u32::from_str_radix(hex.as_str(), 16).ok(),
            (_, Some(dec)) => dec.as_str().parse::<u32>().ok(),
            _ => None,
        };
        code.and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_default()
    });

    NAMED_ENTITIES
        .iter()
        .fold(decoded.into_owned(), |acc, (entity, replacement)| {
            acc.replace(entity, replacement)
        })
}

/// Slice out the contents of `<body>`, or the whole document if it has none.
pub fn body_content(html: &str) -> &str {
    // ASCII lowercasing keeps byte offsets aligned with the original
    let lower = html.to_ascii_lowercase();

    let start = lower
        .find("<body")
        .and_then(|open| lower[open..].find('>').map(|end| open + end + 1));
    let Some(start) = start else {
        return html;
    };

    let end = lower[start..]
        .find("</body")
        .map(|end| start + end)
        .unwrap_or(html.len());

    &html[start..end]
}

/// Join all whitespace-separated words with single spaces.
pub fn join_words(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
