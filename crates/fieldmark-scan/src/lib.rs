//! Bracket-token scanner for fieldmark record templates.
//!
//! Templates embed two kinds of `[[...]]` tokens in arbitrary host text:
//! control tokens (`[[IF cond]]`, `[[ELIF cond]]`, `[[ELSE]]`, `[[ENDIF]]`)
//! that delimit conditional blocks, and substitution tokens
//! (`[[fieldname]]`, `[[UPPERCASE fieldname]]`) that stand in for a field's
//! value. This crate finds both with byte spans; everything that does not
//! match the bracket grammar is host text and passes through untouched.
//!
//! # Span rules
//!
//! A token's span is the range deleted when the token is consumed, and it
//! covers more than the brackets themselves:
//!
//! - A control token absorbs immediately-adjacent spaces and tabs before
//!   `[[` and one line terminator (`\r\n`, `\r` or `\n`) after `]]`, so an
//!   indented control line vanishes without leaving a blank line behind.
//! - A substitution token absorbs one trailing line terminator only.
//!   Leading whitespace stays with the host text, so inline placeholders
//!   (`Hello [[firstname]]`) keep their separating space.
//!
//! # Example
//!
//! ```rust
//! use fieldmark_scan::{control_tokens, substitution_tokens, Keyword};
//!
//! let template = "[[IF genre]]\nstyle: [[UPPERCASE genre]]\n[[ENDIF]]\n";
//!
//! let controls = control_tokens(template);
//! assert_eq!(controls.len(), 2);
//! assert_eq!(controls[0].keyword, Keyword::If);
//! assert_eq!(controls[0].tail, "genre");
//!
//! let substs = substitution_tokens(template);
//! let value = substs.iter().find(|t| t.function == Some("UPPERCASE")).unwrap();
//! assert_eq!(value.name, "genre");
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

/// Control keyword of a block token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    If,
    Elif,
    Else,
    Endif,
}

impl Keyword {
    fn parse(word: &str) -> Option<Self> {
        match word {
            "IF" => Some(Keyword::If),
            "ELIF" => Some(Keyword::Elif),
            "ELSE" => Some(Keyword::Else),
            "ENDIF" => Some(Keyword::Endif),
            _ => None,
        }
    }

    /// Returns the surface spelling of this keyword.
    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::If => "IF",
            Keyword::Elif => "ELIF",
            Keyword::Else => "ELSE",
            Keyword::Endif => "ENDIF",
        }
    }
}

impl std::fmt::Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One block-control token with its absorbed surroundings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlToken<'a> {
    pub keyword: Keyword,
    /// Condition tail after the keyword, trimmed. Empty for `ELSE`/`ENDIF`
    /// (and for a bare `[[IF]]`, which downstream evaluates leniently).
    pub tail: &'a str,
    /// Byte offset where the deletable span starts (absorbed leading
    /// spaces/tabs included).
    pub start: usize,
    /// Byte offset one past the deletable span (absorbed trailing line
    /// terminator included).
    pub end: usize,
}

/// One substitution token: `[[name]]` or `[[FUNCTION name]]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstToken<'a> {
    /// Leading all-caps function word, when one is present. The scanner
    /// does not validate it against any function set; callers decide what
    /// an unknown word means.
    pub function: Option<&'a str>,
    /// Field identifier. May contain internal spaces when no function word
    /// is recognized.
    pub name: &'a str,
    pub start: usize,
    pub end: usize,
}

static CONTROL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[ \t]*\[\[(IF|ELIF|ELSE|ENDIF)\b([^\[\]]*)\]\](?:\r\n|\r|\n)?")
        .expect("control token pattern")
});

static SUBST_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[([^\[\]]+)\]\](?:\r\n|\r|\n)?").expect("substitution pattern"));

/// Scans `input` for block-control tokens in document order.
///
/// Only the four keywords match; `[[IFFY]]` or `[[ifx]]` fall through to
/// the substitution grammar. Malformed brackets match nothing at all.
pub fn control_tokens(input: &str) -> Vec<ControlToken<'_>> {
    CONTROL_RE
        .captures_iter(input)
        .map(|caps| {
            let whole = caps.get(0).expect("match");
            let word = caps.get(1).expect("keyword").as_str();
            let keyword = Keyword::parse(word).expect("keyword alternation");
            let tail = caps.get(2).expect("tail").as_str().trim();
            ControlToken {
                keyword,
                tail,
                start: whole.start(),
                end: whole.end(),
            }
        })
        .collect()
}

/// Scans `input` for substitution tokens in document order.
///
/// Meant to run on text the block reducer has already pruned; leftover
/// control tokens in unreduced text will scan as substitutions with the
/// keyword in the `function` slot.
pub fn substitution_tokens(input: &str) -> Vec<SubstToken<'_>> {
    SUBST_RE
        .captures_iter(input)
        .filter_map(|caps| {
            let whole = caps.get(0).expect("match");
            let inner = caps.get(1).expect("inner").as_str().trim();
            if inner.is_empty() {
                return None;
            }
            let (function, name) = split_function(inner);
            Some(SubstToken {
                function,
                name,
                start: whole.start(),
                end: whole.end(),
            })
        })
        .collect()
}

/// Splits a leading all-caps function word off a token body.
///
/// `UPPERCASE genre` -> `(Some("UPPERCASE"), "genre")`; a body whose first
/// word is not all-caps (or that has no second word) is a bare identifier.
fn split_function(inner: &str) -> (Option<&str>, &str) {
    if let Some((head, rest)) = inner.split_once(' ') {
        let rest = rest.trim_start();
        if !rest.is_empty() && is_function_word(head) {
            return (Some(head), rest);
        }
    }
    (None, inner)
}

fn is_function_word(word: &str) -> bool {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) if first.is_ascii_uppercase() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}
