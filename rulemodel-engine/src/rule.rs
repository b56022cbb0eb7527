//! Rules: a predicate gating exactly one key assignment.

use rulemodel_types::{Context, KeyPath, TargetKey, Value};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Predicate;

/// The right-hand side of an assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleValue {
    /// A fixed value.
    Literal(Value),
    /// The value found at a context path, e.g. `object.title`.
    Path(KeyPath),
    /// The display string of the value found at a context path,
    /// e.g. `object.rentalDate.string`.
    Display(KeyPath),
}

impl RuleValue {
    /// Produces the assigned value for `ctx`. Derived values whose path is
    /// absent produce nothing.
    #[must_use]
    pub fn evaluate(&self, ctx: &Context) -> Option<Value> {
        match self {
            Self::Literal(value) => Some(value.clone()),
            Self::Path(path) => ctx.get(path).cloned(),
            Self::Display(path) => ctx.get(path).map(|v| Value::String(v.display_string())),
        }
    }

    /// The context path a derived value reads.
    pub fn path(&self) -> Option<&KeyPath> {
        match self {
            Self::Literal(_) => None,
            Self::Path(path) | Self::Display(path) => Some(path),
        }
    }
}

impl From<Value> for RuleValue {
    fn from(value: Value) -> Self {
        Self::Literal(value)
    }
}

macro_rules! literal_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for RuleValue {
                fn from(value: $ty) -> Self {
                    Self::Literal(Value::from(value))
                }
            }
        )*
    };
}

literal_from!(bool, i64, f64, &str, String);

impl fmt::Display for RuleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => write!(f, "{value}"),
            Self::Path(path) => write!(f, "\\.{path}"),
            Self::Display(path) => write!(f, "\\.{path}.string"),
        }
    }
}

/// Assigns one value to one key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub key: TargetKey,
    pub value: RuleValue,
}

impl Assignment {
    pub fn new(key: TargetKey, value: impl Into<RuleValue>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

/// `predicate => key <= value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(default)]
    pub predicate: Predicate,
    pub assignment: Assignment,
}

impl Rule {
    pub fn new(predicate: Predicate, key: TargetKey, value: impl Into<RuleValue>) -> Self {
        Self {
            predicate,
            assignment: Assignment::new(key, value),
        }
    }

    /// An unconditional default.
    pub fn always(key: TargetKey, value: impl Into<RuleValue>) -> Self {
        Self::new(Predicate::True, key, value)
    }

    /// Starts a rule gated by `predicate`; finish with [`RuleBuilder::set`].
    pub fn when(predicate: Predicate) -> RuleBuilder {
        RuleBuilder { predicate }
    }

    #[must_use]
    pub fn key(&self) -> TargetKey {
        self.assignment.key
    }

    #[must_use]
    pub fn matches(&self, ctx: &Context) -> bool {
        self.predicate.evaluate(ctx)
    }

    /// The value this rule contributes for `ctx`, if it matches and its
    /// value can be produced. A derived value that does not fit the key's
    /// shape contributes nothing.
    #[must_use]
    pub fn apply(&self, ctx: &Context) -> Option<Value> {
        if !self.matches(ctx) {
            return None;
        }
        self.assignment
            .value
            .evaluate(ctx)
            .filter(|value| self.assignment.key.shape().accepts(value))
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.predicate != Predicate::True {
            write!(f, "{} => ", self.predicate)?;
        }
        write!(f, "{} <= {}", self.assignment.key, self.assignment.value)
    }
}

/// Half-built rule returned by [`Rule::when`].
#[derive(Debug, Clone)]
pub struct RuleBuilder {
    predicate: Predicate,
}

impl RuleBuilder {
    pub fn set(self, key: TargetKey, value: impl Into<RuleValue>) -> Rule {
        Rule::new(self.predicate, key, value)
    }
}
