//! Condition evaluation.
//!
//! A condition tail is `fieldname [operator [value]]`: at most three
//! parts split on single spaces. A missing operator defaults to
//! `NOT_EMPTY`, a missing value to the empty string, so `[[IF genre]]`
//! reads "genre has content".
//!
//! Evaluation is deliberately loose, reproducing the semantics existing
//! templates rely on: `EQUAL`/`NOT_EQUAL`/`MORE_THAN`/`LESS_THAN` compare
//! numerically when both operands parse fully as numbers and as strings
//! otherwise. The `NUM_*` operators instead coerce both operands through
//! locale-aware number extraction, tolerating thousands separators.
//! Anything unrecognized - unknown operator, unknown field - evaluates to
//! `false` rather than erroring.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::context::{LocaleProvider, RenderContext};
use crate::op::OperatorKind;
use crate::resolve::{resolve_field, Purpose};

// Digits plus the separator characters seen across supported locales; the
// active locale decides which are thousands noise and which is the
// decimal point.
static NUMERIC_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new("^[+-]?[0-9.,' \u{00A0}]*").expect("numeric prefix pattern"));

/// Evaluates one condition tail against the render context.
///
/// The owning field's own name is rejected outright (self-reference
/// guard); other declared fields resolve through their cheaper
/// raw-condition path. Runs no more than one field resolution per call.
pub fn check_condition(tail: &str, ctx: &RenderContext) -> bool {
    let mut parts = tail.trim().splitn(3, ' ');
    let field = match parts.next() {
        Some(name) if !name.is_empty() => name,
        _ => return false,
    };
    let operator = parts.next();
    let value = parts.next().unwrap_or("");

    if field == ctx.field_name {
        return false;
    }

    let content = resolve_field(field, ctx, Purpose::Condition);

    let operator = match operator {
        None => Some(OperatorKind::NotEmpty),
        Some(raw) => OperatorKind::parse(raw),
    };
    let Some(operator) = operator else {
        return false;
    };
    let value = unquote(value.trim());

    evaluate_operator(operator, &content, value, ctx.locale)
}

/// Applies one operator to cleaned operands.
///
/// Shared between template conditions and field-level display gates.
pub(crate) fn evaluate_operator(
    operator: OperatorKind,
    content: &str,
    value: &str,
    locale: &dyn LocaleProvider,
) -> bool {
    use std::cmp::Ordering;

    match operator {
        OperatorKind::Empty => content.is_empty(),
        OperatorKind::NotEmpty => !content.is_empty(),
        OperatorKind::Equal => loose_cmp(content, value) == Ordering::Equal,
        OperatorKind::NotEqual => loose_cmp(content, value) != Ordering::Equal,
        OperatorKind::MoreThan => loose_cmp(content, value) == Ordering::Greater,
        OperatorKind::LessThan => loose_cmp(content, value) == Ordering::Less,
        OperatorKind::NumEqual
        | OperatorKind::NumNotEqual
        | OperatorKind::NumMoreThan
        | OperatorKind::NumLessThan => {
            let left = numeric_operand(content, locale);
            let right = numeric_operand(value, locale);
            match operator {
                OperatorKind::NumEqual => left == right,
                OperatorKind::NumNotEqual => left != right,
                OperatorKind::NumMoreThan => left > right,
                OperatorKind::NumLessThan => left < right,
                _ => unreachable!(),
            }
        }
        OperatorKind::Contain => content.contains(value),
        OperatorKind::NotContain => !content.contains(value),
        OperatorKind::StartWith => content.starts_with(value),
        OperatorKind::EndWith => content.ends_with(value),
    }
}

/// Loose ordering: numeric when both operands parse fully as numbers,
/// byte-wise string comparison otherwise.
fn loose_cmp(a: &str, b: &str) -> std::cmp::Ordering {
    if let (Ok(x), Ok(y)) = (a.trim().parse::<f64>(), b.trim().parse::<f64>()) {
        if let Some(ordering) = x.partial_cmp(&y) {
            return ordering;
        }
    }
    a.cmp(b)
}

/// Extracts the leading numeric run of `text` and parses it with the
/// locale's separators applied. Unparseable input is `0.0`.
pub(crate) fn numeric_operand(text: &str, locale: &dyn LocaleProvider) -> f64 {
    let decimal = locale.decimal_point();
    let thousands = locale.thousands_separator();
    let prefix = NUMERIC_PREFIX_RE
        .find(text.trim_start())
        .map(|m| m.as_str())
        .unwrap_or("");

    let mut cleaned = String::with_capacity(prefix.len());
    for c in prefix.chars() {
        if c == thousands {
            continue;
        }
        if c == decimal {
            cleaned.push('.');
        } else {
            cleaned.push(c);
        }
    }
    cleaned.parse().unwrap_or(0.0)
}

/// Strips one layer of enclosing matching quotes.
fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if (first == b'"' && last == b'"') || (first == b'\'' && last == b'\'') {
            return &value[1..value.len() - 1];
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{ctx, TestWorld};
    use std::cmp::Ordering;

    struct En;

    impl LocaleProvider for En {
        fn current_language(&self) -> String {
            "en".to_string()
        }
    }

    struct De;

    impl LocaleProvider for De {
        fn current_language(&self) -> String {
            "de".to_string()
        }

        fn decimal_point(&self) -> char {
            ','
        }

        fn thousands_separator(&self) -> char {
            '.'
        }
    }

    #[test]
    fn missing_operator_defaults_to_not_empty() {
        let world = TestWorld::new().with_field("genre", "jazz");
        assert!(check_condition("genre", &ctx(&world)));

        let empty = TestWorld::new().with_field("genre", "");
        assert!(!check_condition("genre", &ctx(&empty)));
    }

    #[test]
    fn operator_aliases_are_equivalent() {
        let world = TestWorld::new().with_field("x", "5");
        let ctx = ctx(&world);
        assert!(check_condition("x = 5", &ctx));
        assert!(check_condition("x == 5", &ctx));
        assert!(check_condition("x EQ 5", &ctx));
        assert!(check_condition("x IS_EQUAL_TO 5", &ctx));
    }

    #[test]
    fn unknown_operator_is_false() {
        let world = TestWorld::new().with_field("x", "5");
        assert!(!check_condition("x ALMOST 5", &ctx(&world)));
    }

    #[test]
    fn unknown_field_resolves_empty() {
        let world = TestWorld::new();
        let ctx = ctx(&world);
        assert!(check_condition("nosuch EMPTY", &ctx));
        assert!(!check_condition("nosuch NOT_EMPTY", &ctx));
    }

    #[test]
    fn self_reference_is_rejected_even_for_empty() {
        let world = TestWorld::new();
        let ctx = ctx(&world);
        // The owning field is named "card" in the fixture; even EMPTY,
        // which would hold for the unresolvable value, is rejected.
        assert!(!check_condition("card EMPTY", &ctx));
    }

    #[test]
    fn loose_equal_compares_numerically() {
        let world = TestWorld::new().with_field("x", "5.0");
        assert!(check_condition("x EQUAL 5", &ctx(&world)));
    }

    #[test]
    fn loose_equal_falls_back_to_strings() {
        let world = TestWorld::new().with_field("x", "5a");
        assert!(!check_condition("x EQUAL 5", &ctx(&world)));
        assert!(check_condition("x EQUAL 5a", &ctx(&world)));
    }

    #[test]
    fn loose_ordering_numeric_beats_lexicographic() {
        let world = TestWorld::new().with_field("x", "10");
        let ctx = ctx(&world);
        // Lexicographically "10" < "9"; numerically it is greater.
        assert!(check_condition("x MORE_THAN 9", &ctx));
        assert!(!check_condition("x LESS_THAN 9", &ctx));
    }

    #[test]
    fn quoted_values_compare_without_quotes() {
        let world = TestWorld::new().with_field("genre", "hard bop");
        let ctx = ctx(&world);
        assert!(check_condition("genre EQUAL \"hard bop\"", &ctx));
        assert!(check_condition("genre EQUAL 'hard bop'", &ctx));
    }

    #[test]
    fn contain_tests_value_inside_content() {
        let world = TestWorld::new().with_field("genre", "hard bop");
        let ctx = ctx(&world);
        assert!(check_condition("genre CONTAIN bop", &ctx));
        assert!(!check_condition("genre CONTAIN swing", &ctx));
        assert!(check_condition("genre NOT_CONTAIN swing", &ctx));
    }

    #[test]
    fn prefix_and_suffix_operators() {
        let world = TestWorld::new().with_field("genre", "hard bop");
        let ctx = ctx(&world);
        assert!(check_condition("genre START_WITH hard", &ctx));
        assert!(!check_condition("genre START_WITH bop", &ctx));
        assert!(check_condition("genre END_WITH bop", &ctx));
    }

    #[test]
    fn num_equal_tolerates_thousands_separators() {
        let world = TestWorld::new().with_field("price", "1,234");
        assert!(check_condition("price NUM_EQUAL 1234", &ctx(&world)));
    }

    #[test]
    fn num_operators_ignore_trailing_units() {
        let world = TestWorld::new().with_field("weight", "12.5kg");
        let ctx = ctx(&world);
        assert!(check_condition("weight NUM_MORE_THAN 12", &ctx));
        assert!(check_condition("weight NUM_LESS_THAN 13", &ctx));
    }

    #[test]
    fn unparseable_numeric_operand_is_zero() {
        let world = TestWorld::new().with_field("x", "n/a");
        assert!(check_condition("x NUM_EQUAL 0", &ctx(&world)));
    }

    #[test]
    fn numeric_operand_respects_locale_separators() {
        assert_eq!(numeric_operand("1.234,56", &De), 1234.56);
        assert_eq!(numeric_operand("1,234.56", &En), 1234.56);
        assert_eq!(numeric_operand("42", &En), 42.0);
        assert_eq!(numeric_operand("abc", &En), 0.0);
    }

    #[test]
    fn loose_cmp_nan_falls_back_to_strings() {
        assert_eq!(loose_cmp("NaN", "NaN"), Ordering::Equal);
        assert_ne!(loose_cmp("NaN", "nan"), Ordering::Equal);
    }

    #[test]
    fn unquote_strips_one_matching_layer() {
        assert_eq!(unquote("\"x\""), "x");
        assert_eq!(unquote("'x'"), "x");
        assert_eq!(unquote("\"'x'\""), "'x'");
        assert_eq!(unquote("\"x'"), "\"x'");
        assert_eq!(unquote("x"), "x");
        assert_eq!(unquote("\""), "\"");
    }

    #[test]
    fn value_with_spaces_stays_whole() {
        let world = TestWorld::new().with_field("genre", "hard bop");
        assert!(check_condition("genre EQUAL hard bop", &ctx(&world)));
    }

    #[test]
    fn empty_tail_is_false() {
        let world = TestWorld::new();
        assert!(!check_condition("", &ctx(&world)));
        assert!(!check_condition("   ", &ctx(&world)));
    }
}
