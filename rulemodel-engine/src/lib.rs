//! Rule evaluation for data-driven UIs.
//!
//! A rule model is an ordered list of `predicate => key <= value` rules. The
//! rendering layer builds a [`Context`](rulemodel_types::Context) for each
//! decision (entity, task, property key, platform, user, current object)
//! and asks the engine for the effective value of a [`TargetKey`](rulemodel_types::TargetKey):
//!
//! - [`Predicate`]: absent-safe comparisons combined with `&&`, `||`, `!`
//! - [`Rule`]: a predicate gating exactly one [`Assignment`]
//! - [`ContextSchema`]: attribute layout used to validate rules at load time
//! - [`RuleEngine`]: indexes validated rules and resolves keys, last match wins
//! - [`RuleStore`]: publishes engines as atomically swapped snapshots
//!
//! Resolution never fails for a validated rule set. Only two errors reach
//! callers: [`RuleError::UnsupportedKey`] for a key outside the recognized
//! set, and [`RuleError::InvalidRule`] when an engine is built.

mod engine;
mod error;
mod predicate;
mod rule;
mod schema;
mod store;
mod validate;

pub use engine::{EngineOptions, Precedence, Resolution, RuleEngine};
pub use error::{RuleDefect, RuleError, RuleResult};
pub use predicate::{CompareOp, Predicate};
pub use rule::{Assignment, Rule, RuleBuilder, RuleValue};
pub use schema::ContextSchema;
pub use store::RuleStore;
pub use validate::{validate_rule, validate_rules};
