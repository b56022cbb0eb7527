//! Boolean conditions over a [`Context`].
//!
//! Comparisons are absent-safe: when the attribute a comparison reads is
//! missing (or `Null`), both `==` and `!=` evaluate to false. A chain such as
//! `user.username == "Mike"` is simply false for an anonymous session.

use rulemodel_types::{Context, KeyPath, Value};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Comparison operator of a leaf test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Eq,
    Ne,
}

impl CompareOp {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
        }
    }
}

/// A pure boolean expression over context attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    /// Always matches. Rules with this predicate are unconditional defaults.
    #[default]
    True,
    Compare {
        path: KeyPath,
        op: CompareOp,
        value: Value,
    },
    /// The attribute resolves to a non-null value.
    Present(KeyPath),
    /// All operands match, evaluated left to right.
    And(Vec<Predicate>),
    /// Any operand matches, evaluated left to right.
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
}

impl Predicate {
    pub fn eq(path: KeyPath, value: impl Into<Value>) -> Self {
        Self::Compare {
            path,
            op: CompareOp::Eq,
            value: value.into(),
        }
    }

    pub fn ne(path: KeyPath, value: impl Into<Value>) -> Self {
        Self::Compare {
            path,
            op: CompareOp::Ne,
            value: value.into(),
        }
    }

    pub fn present(path: KeyPath) -> Self {
        Self::Present(path)
    }

    pub fn not(predicate: Predicate) -> Self {
        Self::Not(Box::new(predicate))
    }

    /// Conjunction of `self` and `other`. Nested conjunctions are flattened
    /// so operand order is preserved.
    #[must_use]
    pub fn and(self, other: Predicate) -> Self {
        match (self, other) {
            (Self::True, p) | (p, Self::True) => p,
            (Self::And(mut left), Self::And(right)) => {
                left.extend(right);
                Self::And(left)
            }
            (Self::And(mut left), p) => {
                left.push(p);
                Self::And(left)
            }
            (p, Self::And(mut right)) => {
                right.insert(0, p);
                Self::And(right)
            }
            (a, b) => Self::And(vec![a, b]),
        }
    }

    /// Disjunction of `self` and `other`, flattened like [`and`](Self::and).
    #[must_use]
    pub fn or(self, other: Predicate) -> Self {
        match (self, other) {
            (Self::Or(mut left), Self::Or(right)) => {
                left.extend(right);
                Self::Or(left)
            }
            (Self::Or(mut left), p) => {
                left.push(p);
                Self::Or(left)
            }
            (p, Self::Or(mut right)) => {
                right.insert(0, p);
                Self::Or(right)
            }
            (a, b) => Self::Or(vec![a, b]),
        }
    }

    /// Evaluates against `ctx`. Never fails and never mutates the context.
    #[must_use]
    pub fn evaluate(&self, ctx: &Context) -> bool {
        match self {
            Self::True => true,
            Self::Compare { path, op, value } => match ctx.get(path) {
                None => false,
                Some(actual) => match op {
                    CompareOp::Eq => actual.loosely_equals(value),
                    CompareOp::Ne => !actual.loosely_equals(value),
                },
            },
            Self::Present(path) => ctx.contains(path),
            Self::And(operands) => operands.iter().all(|p| p.evaluate(ctx)),
            Self::Or(operands) => operands.iter().any(|p| p.evaluate(ctx)),
            Self::Not(inner) => !inner.evaluate(ctx),
        }
    }

    /// Number of leaf tests. `True` counts as zero.
    #[must_use]
    pub fn complexity(&self) -> usize {
        match self {
            Self::True => 0,
            Self::Compare { .. } | Self::Present(_) => 1,
            Self::And(operands) | Self::Or(operands) => {
                operands.iter().map(Predicate::complexity).sum()
            }
            Self::Not(inner) => inner.complexity(),
        }
    }

    /// Every attribute path the predicate reads, in evaluation order.
    pub fn paths(&self) -> Vec<&KeyPath> {
        let mut out = Vec::new();
        self.collect_paths(&mut out);
        out
    }

    fn collect_paths<'a>(&'a self, out: &mut Vec<&'a KeyPath>) {
        match self {
            Self::True => {}
            Self::Compare { path, .. } | Self::Present(path) => out.push(path),
            Self::And(operands) | Self::Or(operands) => {
                for operand in operands {
                    operand.collect_paths(out);
                }
            }
            Self::Not(inner) => inner.collect_paths(out),
        }
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And(_) | Self::Or(_) => write!(f, "({self})"),
            _ => write!(f, "{self}"),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::True => f.write_str("true"),
            Self::Compare { path, op, value } => write!(f, "{path} {} {value}", op.as_str()),
            Self::Present(path) => write!(f, "{path} != nil"),
            Self::And(operands) | Self::Or(operands) => {
                let joiner = if matches!(self, Self::And(_)) { " && " } else { " || " };
                for (i, operand) in operands.iter().enumerate() {
                    if i > 0 {
                        f.write_str(joiner)?;
                    }
                    operand.fmt_operand(f)?;
                }
                Ok(())
            }
            Self::Not(inner) => {
                f.write_str("!")?;
                match inner.as_ref() {
                    Self::True => f.write_str("true"),
                    other => write!(f, "({other})"),
                }
            }
        }
    }
}
