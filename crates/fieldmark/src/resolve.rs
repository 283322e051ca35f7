//! Field resolution and the substitution pass.
//!
//! `resolve_field` maps a bare identifier to text. The resolution order
//! is load-bearing and must not be rearranged: pseudo-fields first, then
//! the user's attribute set, then the self-reference guard, then the data
//! source's declared fields. A name that matches nothing resolves to an
//! empty string, never an error.
//!
//! `replace_fieldnames` is the second pass over a reduced template: it
//! scans substitution tokens, resolves each identifier and applies the
//! optional format function, rebuilding the output in one forward splice.

use fieldmark_scan::{substitution_tokens, SubstToken};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::bilingual::reduce_bilingual;
use crate::context::RenderContext;

/// Why a field value is being resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purpose {
    /// Substitution into display output: declared fields render fully.
    Display,
    /// Condition operand: declared fields use their cheaper raw value.
    Condition,
}

/// User attributes templates may read directly.
const PUBLIC_USER_ATTRS: [&str; 24] = [
    "firstname",
    "lastname",
    "email",
    "icq",
    "skype",
    "yahoo",
    "aim",
    "msn",
    "phone1",
    "phone2",
    "institution",
    "department",
    "address",
    "city",
    "country",
    "picture",
    "imagealt",
    "url",
    "description",
    "descriptionformat",
    "lastnamephonetic",
    "firstnamephonetic",
    "middlename",
    "alternatename",
];

/// Mask for present-but-private user attributes: redaction, not omission,
/// so the template author can tell the name exists.
const ATTR_MASK: &str = "************";

/// Capability suffixes the `can_*` pseudo-fields may query. Suffixes
/// outside this list never reach the permission checker.
const CAPABILITY_SUFFIXES: [&str; 10] = [
    "view",
    "addentry",
    "editentry",
    "deleteentry",
    "comment",
    "rate",
    "viewrating",
    "approve",
    "export",
    "manage",
];

/// Resolves one identifier to its textual value.
///
/// First match wins: built-in pseudo-fields, then the user's exposed
/// attribute set (allow-listed values pass, any other present attribute
/// masks), then the owning field's own name (empty, breaking direct
/// recursion), then declared fields from the data source. Collaborator
/// errors and unknown names all resolve to the empty string.
pub fn resolve_field(name: &str, ctx: &RenderContext, purpose: Purpose) -> String {
    if let Some(value) = resolve_pseudo(name, ctx) {
        return value;
    }

    if let Some(value) = ctx.user.get(name) {
        if PUBLIC_USER_ATTRS.contains(&name) {
            return value.to_string();
        }
        return ATTR_MASK.to_string();
    }

    if name == ctx.field_name {
        return String::new();
    }

    let Some(field) = ctx.data.field_by_name(name) else {
        return String::new();
    };
    let rendered = match purpose {
        Purpose::Display => field.render_for_record(ctx.record.id, &ctx.template_tag),
        Purpose::Condition => field.raw_condition_value(ctx.record.id, &ctx.template_tag),
    };
    rendered.unwrap_or_default()
}

fn resolve_pseudo(name: &str, ctx: &RenderContext) -> Option<String> {
    match name {
        "courseid" => Some(ctx.course.id.to_string()),
        "courseurl" => Some(ctx.course.url.clone()),
        "dataid" => Some(ctx.activity.id.to_string()),
        "dataname" => Some(ctx.activity.name.clone()),
        "dataintro" => Some(ctx.activity.intro.clone()),
        "dataurl" => Some(ctx.activity.url.clone()),
        "recordid" => Some(ctx.record.id.to_string()),
        "recordurl" => Some(ctx.record.url.clone()),
        "recordrating" => Some(
            ctx.ratings
                .map(|r| r.aggregate_for_record(ctx.record.id))
                .unwrap_or_default(),
        ),
        "ratingtype" | "ratingmax" | "ratingvalues" => {
            let info = ctx.ratings.and_then(|r| r.info(ctx.record.id));
            Some(match info {
                None => String::new(),
                Some(info) => match name {
                    "ratingtype" => info.kind,
                    "ratingmax" => info.max.to_string(),
                    _ => info
                        .values
                        .iter()
                        .map(|v| v.to_string())
                        .collect::<Vec<_>>()
                        .join(", "),
                },
            })
        }
        "currentlang" | "currentlanguage" => Some(ctx.locale.current_language()),
        _ => {
            if let Some(suffix) = name.strip_prefix("can_") {
                if CAPABILITY_SUFFIXES.contains(&suffix) {
                    return Some(flag(ctx.perms.has_capability(suffix)));
                }
                return None;
            }
            if let Some(group) = name.strip_prefix("group_") {
                return Some(flag(ctx.perms.in_group(group)));
            }
            if let Some(cohort) = name.strip_prefix("cohort_") {
                return Some(flag(ctx.perms.in_cohort(cohort)));
            }
            if let Some(role) = name.strip_prefix("role_") {
                return Some(flag(ctx.perms.has_role(role)));
            }
            None
        }
    }
}

fn flag(on: bool) -> String {
    if on {
        "1".to_string()
    } else {
        String::new()
    }
}

/// Substitutes every `[[name]]` / `[[FUNCTION name]]` token in `text`.
///
/// Runs after block reduction, so surviving tokens are all substitutions.
/// Output is rebuilt by one forward splice over the collected spans; each
/// token's absorbed trailing newline disappears with it.
pub fn replace_fieldnames(text: &str, ctx: &RenderContext) -> String {
    let tokens = substitution_tokens(text);
    if tokens.is_empty() {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut pos = 0;
    for token in &tokens {
        out.push_str(&text[pos..token.start]);
        out.push_str(&substitute(token, ctx));
        pos = token.end;
    }
    out.push_str(&text[pos..]);
    out
}

fn substitute(token: &SubstToken<'_>, ctx: &RenderContext) -> String {
    match token.function.and_then(FormatFunction::parse) {
        Some(function) => function.apply(token.name, ctx),
        // No function, or a word outside the closed set: substitute the
        // resolved value unprocessed.
        None => resolve_field(token.name, ctx, Purpose::Display),
    }
}

/// Post-processing applied to a substituted value, selected by the
/// all-caps word before the identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatFunction {
    Uppercase,
    Lowercase,
    Titlecase,
    Trim,
    TrimStart,
    TrimEnd,
    CharCount,
    WordCount,
    BulletList,
    OrderedList,
    CommaList,
    IndentList,
    Title,
    TitleValue,
    Raw,
}

impl FormatFunction {
    /// Parses a surface function word. Case-sensitive: templates write
    /// functions in upper case, and a lower-case word is a field name.
    pub fn parse(word: &str) -> Option<Self> {
        Some(match word {
            "UPPERCASE" => FormatFunction::Uppercase,
            "LOWERCASE" => FormatFunction::Lowercase,
            "TITLECASE" | "PROPERCASE" => FormatFunction::Titlecase,
            "TRIM" => FormatFunction::Trim,
            "LTRIM" => FormatFunction::TrimStart,
            "RTRIM" => FormatFunction::TrimEnd,
            "CHARCOUNT" => FormatFunction::CharCount,
            "WORDCOUNT" => FormatFunction::WordCount,
            "LIST" | "UL" => FormatFunction::BulletList,
            "NUMLIST" | "OL" => FormatFunction::OrderedList,
            "COMMALIST" => FormatFunction::CommaList,
            "INDENTLIST" => FormatFunction::IndentList,
            "TITLE" => FormatFunction::Title,
            "TITLEVALUE" => FormatFunction::TitleValue,
            "RAW" => FormatFunction::Raw,
            _ => return None,
        })
    }

    fn apply(self, name: &str, ctx: &RenderContext) -> String {
        let lang = ctx.locale.current_language();
        let value = || resolve_field(name, ctx, Purpose::Display);
        match self {
            FormatFunction::Uppercase => value().to_uppercase(),
            FormatFunction::Lowercase => value().to_lowercase(),
            FormatFunction::Titlecase => titlecase(&value()),
            FormatFunction::Trim => value().trim().to_string(),
            FormatFunction::TrimStart => value().trim_start().to_string(),
            FormatFunction::TrimEnd => value().trim_end().to_string(),
            FormatFunction::CharCount => value().chars().count().to_string(),
            FormatFunction::WordCount => value().split_whitespace().count().to_string(),
            FormatFunction::BulletList => tag_list(&value(), &lang, "ul"),
            FormatFunction::OrderedList => tag_list(&value(), &lang, "ol"),
            FormatFunction::CommaList => list_items(&value(), &lang).join(", "),
            FormatFunction::IndentList => {
                let items = list_items(&value(), &lang);
                items
                    .iter()
                    .map(|item| format!("    {}", item))
                    .collect::<Vec<_>>()
                    .join("\n")
            }
            FormatFunction::Title => title_of(name, ctx)
                .map(|title| reduce_bilingual(&title, &lang))
                .unwrap_or_default(),
            FormatFunction::TitleValue => {
                let title = title_of(name, ctx)
                    .map(|title| reduce_bilingual(&title, &lang))
                    .unwrap_or_default();
                if title.is_empty() {
                    value()
                } else {
                    format!("{}: {}", title, value())
                }
            }
            FormatFunction::Raw => resolve_field(name, ctx, Purpose::Condition),
        }
    }
}

/// The label used by the `TITLE` functions: the owning field's own title,
/// or the named declared field's.
fn title_of(name: &str, ctx: &RenderContext) -> Option<String> {
    if name == ctx.field_name {
        return Some(ctx.field_title.clone());
    }
    ctx.data.field_by_name(name).map(|f| f.title().to_string())
}

static ITEM_SPLIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\r\n|\r|\n|<br\s*/?>").expect("item split pattern"));

/// Splits newline- or `<br>`-delimited text into trimmed, non-empty,
/// bilingual-reduced items.
fn list_items(content: &str, lang: &str) -> Vec<String> {
    ITEM_SPLIT_RE
        .split(content)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| reduce_bilingual(item, lang))
        .collect()
}

fn tag_list(content: &str, lang: &str, tag: &str) -> String {
    let items = list_items(content, lang);
    if items.is_empty() {
        return String::new();
    }
    format!("<{tag}><li>{}</li></{tag}>", items.join("</li><li>"))
}

fn titlecase(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut word_start = true;
    for c in content.chars() {
        if c.is_whitespace() {
            word_start = true;
            out.push(c);
        } else if word_start {
            out.extend(c.to_uppercase());
            word_start = false;
        } else {
            out.push(c);
        }
    }
    out
}
