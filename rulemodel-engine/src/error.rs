//! Error types for rule loading and resolution.

use rulemodel_types::{KeyPath, KeyShape, TargetKey, ValueType};
use thiserror::Error;

/// Errors surfaced by the engine.
///
/// Resolution itself never fails once an engine is built; the only runtime
/// error is asking for a key outside the recognized set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    /// Requested key is not one of the recognized target keys.
    #[error("unsupported key: {0}")]
    UnsupportedKey(String),

    /// A rule failed load-time validation.
    #[error("invalid rule #{index}: {defect}")]
    InvalidRule { index: usize, defect: RuleDefect },
}

/// What is wrong with a rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleDefect {
    /// A comparison literal can never equal the attribute's declared type.
    #[error("type mismatch at `{path}`: attribute is {expected}, literal is {found}")]
    TypeMismatch {
        path: KeyPath,
        expected: ValueType,
        found: ValueType,
    },

    /// A comparison against `null`, which can never match. Presence tests
    /// express "is set" and "is not set".
    #[error("comparison of `{0}` with null, use a presence test instead")]
    NullComparison(KeyPath),

    /// The schema declares the attribute impossible.
    #[error("unknown attribute `{0}`")]
    UnknownAttribute(KeyPath),

    /// A literal value does not fit the assigned key.
    #[error("`{key}` expects {expected}, found {found}")]
    AssignmentShape {
        key: TargetKey,
        expected: KeyShape,
        found: ValueType,
    },

    /// A derived value cannot produce the assigned key's shape.
    #[error("`{key}` cannot be derived from `{path}`: {reason}")]
    InvalidDerivation {
        key: TargetKey,
        path: KeyPath,
        reason: String,
    },
}

impl RuleDefect {
    /// Attaches the rule's position.
    #[must_use]
    pub fn at(self, index: usize) -> RuleError {
        RuleError::InvalidRule {
            index,
            defect: self,
        }
    }
}

/// Result type for engine operations.
pub type RuleResult<T> = Result<T, RuleError>;
