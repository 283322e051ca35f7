//! Bilingual text reduction.
//!
//! Field titles and list items are often authored with both languages of a
//! bilingual site in one string, either as `<span lang="xx">...</span>`
//! multi-language markup or as the plain-text convention
//! `"<native-script run> <latin-script run>"`. Reduction selects exactly
//! one language's text for the current viewer.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

static LANG_SPAN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<span[^>]*\blang\s*=\s*["']([a-zA-Z0-9-]+)["'][^>]*>(.*?)</span>"#)
        .expect("lang span pattern")
});

// Leading portion must end in a genuinely non-ASCII character; trailing
// portion is a printable-ASCII run.
static PLAIN_SPLIT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^(.*[^\x00-\x7F])[ \t]+([\x20-\x7E]+)$").expect("plain split pattern")
});

// Language codes whose display strings are written outside the low-ASCII
// range. Everything not listed is treated as Latin-script.
static NON_ASCII_LANGS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "am", "ar", "be", "bg", "bn", "el", "fa", "he", "hi", "hy", "ja", "ka", "kk", "km", "kn",
        "ko", "ky", "lo", "mk", "ml", "mn", "mr", "my", "ne", "pa", "ps", "ru", "si", "sr", "ta",
        "te", "th", "uk", "ur", "yi", "zh",
    ]
    .into_iter()
    .collect()
});

/// Whether the given language renders in the low-ASCII (Latin-script)
/// range. Pure function of the language code; region suffixes
/// (`pt-br`, `zh_cn`) are ignored.
pub fn language_is_low_ascii(lang: &str) -> bool {
    let code = lang
        .split(['-', '_'])
        .next()
        .unwrap_or(lang)
        .to_ascii_lowercase();
    !NON_ASCII_LANGS.contains(code.as_str())
}

/// Reduces possibly-bilingual `text` to the single language appropriate
/// for `lang`, the current display language.
///
/// With `<span lang="xx">` markup: the exact language wins, then a span
/// sharing the 2-letter prefix, then `en`, then the first span. Without
/// markup, the plain-text `"<native> <latin>"` convention applies: the
/// trailing ASCII run for low-ASCII viewers, the leading portion
/// otherwise. Text matching neither shape comes back unchanged.
pub fn reduce_bilingual(text: &str, lang: &str) -> String {
    let spans: Vec<(&str, &str)> = LANG_SPAN_RE
        .captures_iter(text)
        .map(|caps| {
            (
                caps.get(1).expect("lang").as_str(),
                caps.get(2).expect("body").as_str(),
            )
        })
        .collect();

    if !spans.is_empty() {
        return pick_span(&spans, lang).trim().to_string();
    }

    if let Some(caps) = PLAIN_SPLIT_RE.captures(text.trim()) {
        let group = if language_is_low_ascii(lang) { 2 } else { 1 };
        return caps.get(group).expect("split group").as_str().trim().to_string();
    }

    text.to_string()
}

fn pick_span<'a>(spans: &[(&'a str, &'a str)], lang: &str) -> &'a str {
    let want = lang.to_ascii_lowercase();
    if let Some((_, body)) = spans
        .iter()
        .find(|(code, _)| code.to_ascii_lowercase() == want)
    {
        return body;
    }

    let prefix = two_letter(&want);
    if let Some((_, body)) = spans
        .iter()
        .find(|(code, _)| two_letter(&code.to_ascii_lowercase()) == prefix)
    {
        return body;
    }

    if let Some((_, body)) = spans
        .iter()
        .find(|(code, _)| two_letter(&code.to_ascii_lowercase()) == "en")
    {
        return body;
    }

    spans[0].1
}

fn two_letter(code: &str) -> &str {
    let bare = code.split(['-', '_']).next().unwrap_or(code);
    if bare.len() >= 2 {
        &bare[..2]
    } else {
        bare
    }
}
