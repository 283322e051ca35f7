//! Collaborator seams and the per-render context.
//!
//! The engine never touches storage, permissions, locales or rich-text
//! sanitizing directly. Hosts implement the traits here and thread one
//! [`RenderContext`] through every call; the engine depends on these
//! narrow interfaces, never on concrete host types.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Identifier of one record in the data source.
pub type RecordId = i64;

/// Identifier of one user account.
pub type UserId = i64;

/// One declared field of the data source.
///
/// The engine only ever asks a field to render one value for one record;
/// this is the seam that replaces dynamic dispatch over concrete
/// field-type classes.
pub trait Field {
    /// The field's declared name, as templates reference it.
    fn name(&self) -> &str;

    /// Human-readable label. May carry bilingual markup, which the
    /// `TITLE` family of format functions reduces for display.
    fn title(&self) -> &str;

    /// Renders this field's value for the given record, in the mode named
    /// by the opaque `tag`.
    fn render_for_record(&self, record_id: RecordId, tag: &str) -> Result<String>;

    /// A cheaper value for condition checks. Defaults to the full render;
    /// fields with expensive display output override this.
    fn raw_condition_value(&self, record_id: RecordId, tag: &str) -> Result<String> {
        self.render_for_record(record_id, tag)
    }
}

/// The record store behind one activity.
pub trait DataSource {
    /// Looks up a declared field by name. `None` for unknown names; the
    /// resolver turns that into an empty substitution.
    fn field_by_name(&self, name: &str) -> Option<&dyn Field>;

    /// The user who owns (created) the given record.
    fn record_owner(&self, record_id: RecordId) -> Result<UserId>;

    /// Loads a user's attribute set.
    fn user(&self, id: UserId) -> Result<UserProfile>;
}

/// Access-control checks for the acting user.
///
/// The membership predicates default to `false`; hosts with group, cohort
/// or role data override them to light up the `group_*`/`cohort_*`/
/// `role_*` pseudo-fields.
pub trait PermissionChecker {
    /// Whether the acting user holds the named capability.
    fn has_capability(&self, capability: &str) -> bool;

    /// Whether the acting user belongs to the named group.
    fn in_group(&self, name: &str) -> bool {
        let _ = name;
        false
    }

    /// Whether the acting user belongs to the named cohort.
    fn in_cohort(&self, name: &str) -> bool {
        let _ = name;
        false
    }

    /// Whether the acting user holds the named role.
    fn has_role(&self, name: &str) -> bool {
        let _ = name;
        false
    }
}

/// Locale facts the evaluator needs.
pub trait LocaleProvider {
    /// Current display language code, e.g. `en` or `pt-br`.
    fn current_language(&self) -> String;

    /// Looks up a translated string. Field implementations use this to
    /// localize their rendered output; the default echoes the key.
    fn translate(&self, key: &str, component: &str) -> String {
        let _ = component;
        key.to_string()
    }

    /// Decimal-point character of the active locale.
    fn decimal_point(&self) -> char {
        '.'
    }

    /// Thousands-separator character of the active locale.
    fn thousands_separator(&self) -> char {
        ','
    }
}

/// Rich-text formatting applied once at the end of a render.
pub trait TextFormatter {
    /// Sanitizes/renders `text` according to its declared format.
    fn format(&self, text: &str, format: TextFormat, options: &FormatOptions) -> String;
}

/// Aggregated rating data for records, when the host enables ratings.
pub trait RatingAggregator {
    /// Human-readable aggregate for one record (e.g. `Average: 4.2`), or
    /// an empty string when the record has no ratings.
    fn aggregate_for_record(&self, record_id: RecordId) -> String;

    /// Raw rating facts backing the `rating*` pseudo-fields.
    fn info(&self, record_id: RecordId) -> Option<RatingInfo>;
}

/// Raw rating facts for one record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RatingInfo {
    /// Aggregation kind, e.g. `average` or `count`.
    pub kind: String,
    /// Top of the rating scale.
    pub max: i64,
    /// Every submitted rating value for the record.
    pub values: Vec<i64>,
}

/// Declared rich-text format of a field's stored content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextFormat {
    /// Auto-formatted text: paragraphs and links inferred.
    #[default]
    Auto,
    /// Plain text, escaped verbatim.
    Plain,
    /// Trusted HTML, sanitized by the formatter.
    Html,
    /// Markdown source.
    Markdown,
}

/// Options forwarded to the [`TextFormatter`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatOptions {
    /// Run content filters over the output.
    pub filter: bool,
    /// Wrap bare text in paragraph markup.
    pub para: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        FormatOptions {
            filter: false,
            para: false,
        }
    }
}

/// A user's attribute set, keyed by attribute name.
///
/// Templates may reference any attribute by name; the resolver returns the
/// value only for allow-listed public attributes and a fixed mask for
/// anything else that is present (see `resolve`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserProfile {
    attrs: HashMap<String, String>,
}

impl UserProfile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets one attribute, replacing any previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attrs.insert(name.into(), value.into());
    }

    /// Returns the attribute's value when the profile carries it.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }
}

impl FromIterator<(String, String)> for UserProfile {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        UserProfile {
            attrs: iter.into_iter().collect(),
        }
    }
}

/// The enclosing course.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CourseInfo {
    pub id: i64,
    pub url: String,
}

/// The activity instance the records belong to.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivityInfo {
    pub id: i64,
    pub name: String,
    pub intro: String,
    pub url: String,
}

/// The record being displayed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordInfo {
    pub id: RecordId,
    pub url: String,
}

/// Everything one render call needs, threaded explicitly.
///
/// Constructed fresh per render; the engine reads from it and never
/// mutates it, so a context can be shared across sequential renders of
/// the same record.
#[derive(Clone)]
pub struct RenderContext<'a> {
    pub data: &'a dyn DataSource,
    pub perms: &'a dyn PermissionChecker,
    pub locale: &'a dyn LocaleProvider,
    pub formatter: &'a dyn TextFormatter,
    pub ratings: Option<&'a dyn RatingAggregator>,
    /// The user whose attributes templates may reference.
    pub user: UserProfile,
    pub course: CourseInfo,
    pub activity: ActivityInfo,
    pub record: RecordInfo,
    /// Opaque caller-supplied mode tag, passed through to nested field
    /// lookups unchanged.
    pub template_tag: String,
    /// Name of the field whose template is being rendered. Drives the
    /// self-reference guard.
    pub field_name: String,
    /// Title of that field, for the `TITLE` format functions.
    pub field_title: String,
}

/// Loads the record owner's profile.
///
/// The original display pipeline exposes the record creator's attributes
/// to templates; hosts wanting acting-user semantics pass that profile
/// instead. Lookup failures produce an empty profile, so every attribute
/// reference degrades to an empty substitution.
pub fn record_owner_profile(data: &dyn DataSource, record_id: RecordId) -> UserProfile {
    data.record_owner(record_id)
        .and_then(|id| data.user(id))
        .unwrap_or_default()
}
