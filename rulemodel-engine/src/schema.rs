//! Declares which context attributes exist, for load-time validation.

use rulemodel_types::{KeyPath, ValueType, attr};
use std::collections::BTreeMap;

use crate::RuleDefect;

/// The attribute layout rules are checked against when an engine is built.
///
/// Declared attributes carry a type. Open subtrees (such as `object`, whose
/// fields depend on the entity being rendered) accept any path below them
/// with an unknown type. A permissive schema accepts everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextSchema {
    attributes: BTreeMap<String, ValueType>,
    open: Vec<String>,
    permissive: bool,
}

impl ContextSchema {
    /// An empty, closed schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The attributes a UI rendering layer provides.
    #[must_use]
    pub fn standard() -> Self {
        Self::new()
            .attribute(attr::ENTITY_NAME, ValueType::String)
            .attribute(attr::TASK, ValueType::String)
            .attribute(attr::PROPERTY_KEY, ValueType::String)
            .attribute(attr::PLATFORM, ValueType::Platform)
            .attribute(attr::USER_USERNAME, ValueType::String)
            .attribute(attr::DEBUG, ValueType::Bool)
            .open(attr::OBJECT)
    }

    /// Accepts every path without type information.
    #[must_use]
    pub fn permissive() -> Self {
        Self {
            permissive: true,
            ..Self::default()
        }
    }

    /// Declares an attribute and its type.
    #[must_use]
    pub fn attribute(mut self, path: &str, value_type: ValueType) -> Self {
        self.attributes.insert(path.to_string(), value_type);
        self
    }

    /// Declares a subtree whose contents are unknown until runtime.
    #[must_use]
    pub fn open(mut self, path: &str) -> Self {
        self.open.push(path.to_string());
        self
    }

    #[must_use]
    pub fn is_permissive(&self) -> bool {
        self.permissive
    }

    /// The declared type of `path`.
    ///
    /// `Ok(None)` means the path may exist but its type is unknown: it lies
    /// in an open subtree or the schema is permissive. Group prefixes of
    /// declared attributes (`user` for `user.username`) are maps.
    pub fn lookup(&self, path: &KeyPath) -> Result<Option<ValueType>, RuleDefect> {
        if self.permissive {
            return Ok(None);
        }
        let dotted = path.to_string();
        if let Some(value_type) = self.attributes.get(&dotted) {
            return Ok(Some(*value_type));
        }
        if self.open.iter().any(|prefix| is_within(&dotted, prefix)) {
            return Ok(None);
        }
        if self.attributes.keys().any(|declared| is_within(declared, &dotted)) {
            return Ok(Some(ValueType::Map));
        }
        Err(RuleDefect::UnknownAttribute(path.clone()))
    }
}

/// Whether `path` equals `prefix` or lies below it.
fn is_within(path: &str, prefix: &str) -> bool {
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('.'))
}
