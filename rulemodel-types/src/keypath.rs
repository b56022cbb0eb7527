//! Dotted attribute paths into a [`Context`](crate::Context).

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// A non-empty path of identifier segments, e.g. `object.address.phone`.
///
/// Parsing accepts optional-chain markers (`user?.username`) and drops them.
/// Whether an intermediate value is missing is decided at evaluation time,
/// so the marker carries no extra meaning.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyPath {
    segments: Vec<String>,
}

impl KeyPath {
    /// Parses a dotted path.
    pub fn parse(path: &str) -> crate::Result<Self> {
        let invalid = || Error::InvalidKeyPath(path.to_string());
        let mut segments = Vec::new();
        for raw in path.split('.') {
            let segment = raw.strip_suffix('?').unwrap_or(raw);
            if !is_identifier(segment) {
                return Err(invalid());
            }
            segments.push(segment.to_string());
        }
        Ok(Self { segments })
    }

    /// Builds a path from already validated segments.
    pub fn from_segments<I, S>(segments: I) -> crate::Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() || !segments.iter().all(|s| is_identifier(s)) {
            return Err(Error::InvalidKeyPath(segments.join(".")));
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The first segment (`user` in `user.username`).
    pub fn root(&self) -> &str {
        &self.segments[0]
    }

    /// The last segment.
    pub fn leaf(&self) -> &str {
        &self.segments[self.segments.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The path without its last segment, if it has more than one.
    #[must_use]
    pub fn parent(&self) -> Option<KeyPath> {
        if self.segments.len() < 2 {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// Whether `prefix` names this path or one of its ancestors.
    #[must_use]
    pub fn starts_with(&self, prefix: &KeyPath) -> bool {
        self.segments.starts_with(&prefix.segments)
    }
}

fn is_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

impl FromStr for KeyPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for KeyPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for KeyPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
