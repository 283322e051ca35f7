//! Fieldmark - a record-display template engine.
//!
//! Templates are authored per data field and interpreted per displayed
//! record. A template mixes arbitrary host text with three kinds of
//! `[[...]]` tokens:
//!
//! - **Placeholders**: `[[genre]]` substitutes the named field's value
//!   for the current record. Built-in pseudo-fields expose course,
//!   activity, record, rating, capability and locale facts, and the
//!   user's public profile attributes.
//! - **Format functions**: `[[UPPERCASE genre]]`, `[[LIST tags]]`,
//!   `[[TITLEVALUE genre]]` post-process the substituted value.
//! - **Conditional blocks**: `[[IF cond]] ... [[ELIF cond]] ... [[ELSE]]
//!   ... [[ENDIF]]` keep exactly one branch. Conditions are
//!   `fieldname [operator [value]]` with a rich operator alias table
//!   (`=`, `EQ`, `IS_EQUAL_TO`, `NUM_MORE_THAN`, `CONTAINS`, ...).
//!
//! Rendering is lenient end to end: text outside the bracket grammar
//! passes through verbatim, unknown names substitute as empty, unknown
//! operators evaluate to `false`, and a field referencing itself resolves
//! to empty instead of recursing. A broken template degrades; it never
//! breaks the page.
//!
//! The engine owns no storage, permissions or sanitizing. Hosts implement
//! the collaborator traits ([`DataSource`], [`PermissionChecker`],
//! [`LocaleProvider`], [`TextFormatter`], [`RatingAggregator`]) and
//! thread a [`RenderContext`] through each render.
//!
//! # Quick start
//!
//! ```rust
//! use fieldmark::{
//!     ActivityInfo, CourseInfo, DataSource, Field, FormatOptions, LocaleProvider,
//!     PermissionChecker, RecordId, RecordInfo, RenderContext, TemplateField, TextFormat,
//!     TextFormatter, UserId, UserProfile,
//! };
//!
//! struct Plain;
//!
//! impl TextFormatter for Plain {
//!     fn format(&self, text: &str, _format: TextFormat, _options: &FormatOptions) -> String {
//!         text.to_string()
//!     }
//! }
//!
//! struct English;
//!
//! impl LocaleProvider for English {
//!     fn current_language(&self) -> String {
//!         "en".to_string()
//!     }
//! }
//!
//! struct NoPerms;
//!
//! impl PermissionChecker for NoPerms {
//!     fn has_capability(&self, _capability: &str) -> bool {
//!         false
//!     }
//! }
//!
//! struct Genre;
//!
//! impl Field for Genre {
//!     fn name(&self) -> &str {
//!         "genre"
//!     }
//!
//!     fn title(&self) -> &str {
//!         "Genre"
//!     }
//!
//!     fn render_for_record(&self, _record: RecordId, _tag: &str) -> fieldmark::Result<String> {
//!         Ok("jazz".to_string())
//!     }
//! }
//!
//! struct Library {
//!     genre: Genre,
//! }
//!
//! impl DataSource for Library {
//!     fn field_by_name(&self, name: &str) -> Option<&dyn Field> {
//!         (name == "genre").then_some(&self.genre as &dyn Field)
//!     }
//!
//!     fn record_owner(&self, _record: RecordId) -> fieldmark::Result<UserId> {
//!         Ok(1)
//!     }
//!
//!     fn user(&self, _id: UserId) -> fieldmark::Result<UserProfile> {
//!         Ok(UserProfile::default())
//!     }
//! }
//!
//! let data = Library { genre: Genre };
//! let mut card = TemplateField::new(
//!     "card",
//!     "[[IF genre EQUAL jazz]]Genre: [[UPPERCASE genre]][[ELSE]]Something else[[ENDIF]]",
//! );
//! card.format = TextFormat::Plain;
//!
//! let ctx = RenderContext {
//!     data: &data,
//!     perms: &NoPerms,
//!     locale: &English,
//!     formatter: &Plain,
//!     ratings: None,
//!     user: UserProfile::default(),
//!     course: CourseInfo::default(),
//!     activity: ActivityInfo::default(),
//!     record: RecordInfo { id: 7, url: String::new() },
//!     template_tag: "list".to_string(),
//!     field_name: String::new(),
//!     field_title: String::new(),
//! };
//!
//! assert_eq!(card.render(&ctx), "Genre: JAZZ");
//! ```

mod bilingual;
mod blocks;
mod condition;
mod context;
mod error;
mod field;
mod op;
mod resolve;

#[cfg(test)]
mod testutil;

pub use bilingual::{language_is_low_ascii, reduce_bilingual};
pub use blocks::reduce_blocks;
pub use condition::check_condition;
pub use context::{
    record_owner_profile, ActivityInfo, CourseInfo, DataSource, Field, FormatOptions,
    LocaleProvider, PermissionChecker, RatingAggregator, RatingInfo, RecordId, RecordInfo,
    RenderContext, TextFormat, TextFormatter, UserId, UserProfile,
};
pub use error::{DataError, Result};
pub use field::{DisplayCondition, TemplateField};
pub use op::OperatorKind;
pub use resolve::{replace_fieldnames, resolve_field, FormatFunction, Purpose};
