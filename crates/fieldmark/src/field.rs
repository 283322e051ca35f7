//! The template field and its render pipeline.
//!
//! A [`TemplateField`] is a declared field whose stored content is a
//! template: conditional blocks are pruned first, placeholders are
//! substituted second, and the result goes through the host's rich-text
//! formatter once at the end. The pipeline is pure given consistent
//! collaborators; rendering the same record twice produces identical
//! output.

use serde::{Deserialize, Serialize};

use crate::blocks::reduce_blocks;
use crate::condition::{check_condition, evaluate_operator};
use crate::context::{FormatOptions, RenderContext, TextFormat};
use crate::op::OperatorKind;
use crate::resolve::replace_fieldnames;

/// Field-level display gate.
///
/// When present, the whole template renders only if the named field's
/// raw value passes the comparison; otherwise the field displays as
/// empty. This is the per-field visibility condition of the original
/// system, distinct from the `[[IF ...]]` blocks inside the template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayCondition {
    /// Name of the field whose value gates the display.
    pub field: String,
    pub operator: OperatorKind,
    pub value: String,
}

/// A declared field whose stored content is a template.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateField {
    /// Declared name; templates referencing this name from inside this
    /// field's own template resolve to empty (self-reference guard).
    pub name: String,
    /// Human-readable label, possibly bilingual.
    pub title: String,
    /// The raw template text.
    pub content: String,
    /// Declared rich-text format of `content`.
    pub format: TextFormat,
    /// Optional field-level display gate.
    pub condition: Option<DisplayCondition>,
}

impl TemplateField {
    /// Creates a field with the given name and template content. Title,
    /// format and display condition start at their defaults.
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        TemplateField {
            name: name.into(),
            content: content.into(),
            ..TemplateField::default()
        }
    }

    /// Renders this field's template for the record in `ctx`.
    ///
    /// Never fails: a failed display gate, empty content, unknown names
    /// and collaborator errors all degrade to empty output. The context's
    /// owning-field name and title are aligned to this field for the
    /// duration of the render, so the self-reference guard and the
    /// `TITLE` functions see the right field regardless of how the
    /// caller populated them.
    pub fn render(&self, ctx: &RenderContext) -> String {
        let ctx = RenderContext {
            field_name: self.name.clone(),
            field_title: self.title.clone(),
            ..ctx.clone()
        };

        if !self.display_allowed(&ctx) {
            return String::new();
        }
        if self.content.is_empty() {
            return String::new();
        }

        let reduced = reduce_blocks(&self.content, |tail| check_condition(tail, &ctx));
        let substituted = replace_fieldnames(&reduced, &ctx);
        ctx.formatter
            .format(&substituted, self.format, &FormatOptions::default())
    }

    fn display_allowed(&self, ctx: &RenderContext) -> bool {
        let Some(gate) = &self.condition else {
            return true;
        };
        let content = ctx
            .data
            .field_by_name(&gate.field)
            .and_then(|f| {
                f.raw_condition_value(ctx.record.id, &ctx.template_tag)
                    .ok()
            })
            .unwrap_or_default();
        evaluate_operator(gate.operator, content.trim(), gate.value.trim(), ctx.locale)
    }
}
