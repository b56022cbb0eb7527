//! The fixed set of keys a rule may assign.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Value};

/// A resolvable configuration key.
///
/// Names are camelCase on the wire (`displayPropertyKeys`), matching how rule
/// authors write them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TargetKey {
    /// Entities offered to the user.
    VisibleEntityNames,
    /// Whether the current object may be edited.
    IsObjectEditable,
    /// Values assigned to new objects.
    InitialPropertyValues,
    /// Component used to render one row of a list.
    RowComponent,
    /// Properties shown for an entity.
    DisplayPropertyKeys,
    DisplayNameForProperty,
    DisplayNameForEntity,
    Formatter,
    /// Page component for a whole task.
    Page,
    /// Property view or editor component.
    Component,
    Title,
    Debug,
    /// Task shown on launch.
    FirstTask,
}

impl TargetKey {
    pub const ALL: [TargetKey; 13] = [
        TargetKey::VisibleEntityNames,
        TargetKey::IsObjectEditable,
        TargetKey::InitialPropertyValues,
        TargetKey::RowComponent,
        TargetKey::DisplayPropertyKeys,
        TargetKey::DisplayNameForProperty,
        TargetKey::DisplayNameForEntity,
        TargetKey::Formatter,
        TargetKey::Page,
        TargetKey::Component,
        TargetKey::Title,
        TargetKey::Debug,
        TargetKey::FirstTask,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::VisibleEntityNames => "visibleEntityNames",
            Self::IsObjectEditable => "isObjectEditable",
            Self::InitialPropertyValues => "initialPropertyValues",
            Self::RowComponent => "rowComponent",
            Self::DisplayPropertyKeys => "displayPropertyKeys",
            Self::DisplayNameForProperty => "displayNameForProperty",
            Self::DisplayNameForEntity => "displayNameForEntity",
            Self::Formatter => "formatter",
            Self::Page => "page",
            Self::Component => "component",
            Self::Title => "title",
            Self::Debug => "debug",
            Self::FirstTask => "firstTask",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == value)
    }

    /// The shape of values this key accepts.
    #[must_use]
    pub fn shape(self) -> KeyShape {
        match self {
            Self::VisibleEntityNames | Self::DisplayPropertyKeys => KeyShape::StringList,
            Self::IsObjectEditable | Self::Debug => KeyShape::Bool,
            Self::InitialPropertyValues => KeyShape::Map,
            Self::RowComponent | Self::Page | Self::Component => KeyShape::Component,
            Self::Formatter => KeyShape::Formatter,
            Self::DisplayNameForProperty
            | Self::DisplayNameForEntity
            | Self::Title
            | Self::FirstTask => KeyShape::String,
        }
    }
}

impl fmt::Display for TargetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| Error::UnknownTargetKey(s.to_string()))
    }
}

/// The value shape a [`TargetKey`] accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyShape {
    Bool,
    String,
    StringList,
    Map,
    Component,
    Formatter,
}

impl KeyShape {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::String => "string",
            Self::StringList => "list of strings",
            Self::Map => "map",
            Self::Component => "component",
            Self::Formatter => "formatter",
        }
    }

    /// Whether `value` fits this shape. An empty list is a valid string list.
    #[must_use]
    pub fn accepts(self, value: &Value) -> bool {
        match (self, value) {
            (Self::Bool, Value::Bool(_)) => true,
            (Self::String, Value::String(_)) => true,
            (Self::StringList, Value::List(items)) => {
                items.iter().all(|item| matches!(item, Value::String(_)))
            }
            (Self::Map, Value::Map(_)) => true,
            (Self::Component, Value::Component(_)) => true,
            (Self::Formatter, Value::Formatter(_)) => true,
            _ => false,
        }
    }
}

impl fmt::Display for KeyShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
