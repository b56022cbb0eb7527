//! The facts known when a UI value is resolved.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{KeyPath, Platform, Value};

/// Well-known context attribute paths.
pub mod attr {
    pub const ENTITY: &str = "entity";
    pub const ENTITY_NAME: &str = "entity.name";
    pub const TASK: &str = "task";
    pub const PROPERTY_KEY: &str = "propertyKey";
    pub const PLATFORM: &str = "platform";
    pub const USER: &str = "user";
    pub const USER_USERNAME: &str = "user.username";
    pub const OBJECT: &str = "object";
    pub const DEBUG: &str = "debug";
}

/// A tree of values addressed by [`KeyPath`]s.
///
/// Contexts are built fresh for each render decision and only read during
/// resolution. Lookups never fail: a missing segment, a non-map
/// intermediate or a `Null` leaf all read as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Context {
    root: BTreeMap<String, Value>,
}

impl Context {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a context from a JSON object. Non-object input yields an
    /// empty context.
    #[must_use]
    pub fn from_json(value: serde_json::Value) -> Self {
        match Value::from(value) {
            Value::Map(root) => Self { root },
            _ => Self::default(),
        }
    }

    /// Looks up a value. `None` when any part of the path is absent.
    pub fn get(&self, path: &KeyPath) -> Option<&Value> {
        let (first, rest) = path.segments().split_first()?;
        let mut current = self.root.get(first)?;
        for segment in rest {
            current = current.as_map()?.get(segment)?;
        }
        if current.is_null() { None } else { Some(current) }
    }

    /// Whether the path resolves to a non-null value.
    pub fn contains(&self, path: &KeyPath) -> bool {
        self.get(path).is_some()
    }

    /// Sets a value, creating intermediate maps as needed. A non-map
    /// intermediate is replaced by a map.
    pub fn insert(&mut self, path: &KeyPath, value: impl Into<Value>) {
        let segments = path.segments();
        let (leaf, parents) = match segments.split_last() {
            Some(split) => split,
            None => return,
        };
        let mut map = &mut self.root;
        for segment in parents {
            let slot = map
                .entry(segment.clone())
                .or_insert_with(|| Value::Map(BTreeMap::new()));
            if !matches!(slot, Value::Map(_)) {
                *slot = Value::Map(BTreeMap::new());
            }
            map = match slot {
                Value::Map(inner) => inner,
                _ => return,
            };
        }
        map.insert(leaf.clone(), value.into());
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with_path(mut self, path: &KeyPath, value: impl Into<Value>) -> Self {
        self.insert(path, value);
        self
    }

    #[must_use]
    pub fn with_entity_name(self, name: impl Into<String>) -> Self {
        self.with_well_known(&[attr::ENTITY, "name"], Value::String(name.into()))
    }

    #[must_use]
    pub fn with_task(self, task: impl Into<String>) -> Self {
        self.with_well_known(&[attr::TASK], Value::String(task.into()))
    }

    #[must_use]
    pub fn with_property_key(self, key: impl Into<String>) -> Self {
        self.with_well_known(&[attr::PROPERTY_KEY], Value::String(key.into()))
    }

    #[must_use]
    pub fn with_platform(self, platform: Platform) -> Self {
        self.with_well_known(&[attr::PLATFORM], Value::Platform(platform))
    }

    #[must_use]
    pub fn with_user(self, username: impl Into<String>) -> Self {
        self.with_well_known(&[attr::USER, "username"], Value::String(username.into()))
    }

    #[must_use]
    pub fn with_debug(self, debug: bool) -> Self {
        self.with_well_known(&[attr::DEBUG], Value::Bool(debug))
    }

    /// Sets the current object (row) from a JSON object.
    #[must_use]
    pub fn with_object(mut self, object: serde_json::Value) -> Self {
        self.root.insert(attr::OBJECT.to_string(), Value::from(object));
        self
    }

    fn with_well_known(mut self, segments: &[&str], value: Value) -> Self {
        if let Ok(path) = KeyPath::from_segments(segments.iter().copied()) {
            self.insert(&path, value);
        }
        self
    }

    /// Top-level attributes.
    pub fn attributes(&self) -> &BTreeMap<String, Value> {
        &self.root
    }
}
