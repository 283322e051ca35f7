//! Comparison operators for template conditions.
//!
//! The [`OperatorKind`] enum is the closed set of operators a condition
//! tail can use. Surface syntax is richer: a fixed alias table maps
//! symbols and spelled-out forms (`=`, `EQ`, `IS_EQUAL_TO`, ...) onto the
//! enum. Parsing happens once at the boundary; nothing deeper in the
//! pipeline compares raw operator strings.

use serde::{Deserialize, Serialize};

/// Comparison operator of a condition.
///
/// Operators come in four groups:
/// - **Presence**: `Empty`, `NotEmpty`
/// - **Loose**: `Equal`, `NotEqual`, `MoreThan`, `LessThan` - numeric when
///   both operands parse fully as numbers, string comparison otherwise
/// - **Numeric**: `NumEqual`, `NumNotEqual`, `NumMoreThan`, `NumLessThan` -
///   operands are coerced through locale-aware number extraction first
/// - **String**: `Contain`, `NotContain`, `StartWith`, `EndWith`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperatorKind {
    Empty,
    NotEmpty,
    Equal,
    NotEqual,
    MoreThan,
    LessThan,
    NumEqual,
    NumNotEqual,
    NumMoreThan,
    NumLessThan,
    Contain,
    NotContain,
    StartWith,
    EndWith,
}

impl OperatorKind {
    /// Parses a surface operator through the alias table.
    ///
    /// Input is trimmed and uppercased first, so `eq`, `Eq` and `EQ` all
    /// resolve. Returns `None` for anything outside the table; conditions
    /// with an unrecognized operator evaluate to `false`.
    pub fn parse(raw: &str) -> Option<Self> {
        let op = raw.trim().to_ascii_uppercase();
        Some(match op.as_str() {
            "EMPTY" | "IS_EMPTY" => OperatorKind::Empty,
            "NOT_EMPTY" | "IS_NOT_EMPTY" => OperatorKind::NotEmpty,
            "=" | "==" | "EQ" | "EQUAL" | "IS_EQUAL_TO" => OperatorKind::Equal,
            "!=" | "<>" | "NE" | "NOT_EQUAL" | "IS_NOT_EQUAL_TO" => OperatorKind::NotEqual,
            ">" | "GT" | "MORE_THAN" | "IS_MORE_THAN" => OperatorKind::MoreThan,
            "<" | "LT" | "LESS_THAN" | "IS_LESS_THAN" => OperatorKind::LessThan,
            "N=" | "N==" | "NUM_EQ" | "NUM_EQUAL" => OperatorKind::NumEqual,
            "N!=" | "N<>" | "NUM_NE" | "NUM_NOT_EQUAL" => OperatorKind::NumNotEqual,
            "N>" | "NUM_GT" | "NUM_MORE_THAN" => OperatorKind::NumMoreThan,
            "N<" | "NUM_LT" | "NUM_LESS_THAN" => OperatorKind::NumLessThan,
            "CONTAIN" | "CONTAINS" => OperatorKind::Contain,
            "NOT_CONTAIN" | "NOT_CONTAINS" | "DOES_NOT_CONTAIN" => OperatorKind::NotContain,
            "START_WITH" | "STARTS_WITH" => OperatorKind::StartWith,
            "END_WITH" | "ENDS_WITH" => OperatorKind::EndWith,
            _ => return None,
        })
    }

    /// Returns `true` for the four operators that coerce both operands to
    /// numbers before comparing.
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            OperatorKind::NumEqual
                | OperatorKind::NumNotEqual
                | OperatorKind::NumMoreThan
                | OperatorKind::NumLessThan
        )
    }

    /// Returns the canonical spelling of this operator.
    pub fn as_str(self) -> &'static str {
        match self {
            OperatorKind::Empty => "EMPTY",
            OperatorKind::NotEmpty => "NOT_EMPTY",
            OperatorKind::Equal => "EQUAL",
            OperatorKind::NotEqual => "NOT_EQUAL",
            OperatorKind::MoreThan => "MORE_THAN",
            OperatorKind::LessThan => "LESS_THAN",
            OperatorKind::NumEqual => "NUM_EQUAL",
            OperatorKind::NumNotEqual => "NUM_NOT_EQUAL",
            OperatorKind::NumMoreThan => "NUM_MORE_THAN",
            OperatorKind::NumLessThan => "NUM_LESS_THAN",
            OperatorKind::Contain => "CONTAIN",
            OperatorKind::NotContain => "NOT_CONTAIN",
            OperatorKind::StartWith => "START_WITH",
            OperatorKind::EndWith => "END_WITH",
        }
    }
}

impl std::fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
