//! Core type definitions for rulemodel.
//!
//! This crate defines the vocabulary shared by the engine and the loaders:
//! - [`Value`]: the dynamic values found in contexts and assigned by rules
//! - [`KeyPath`]: dotted attribute paths (`entity.name`, `user.username`)
//! - [`Context`]: the facts known at the moment a UI value is resolved
//! - [`TargetKey`]: the fixed set of keys a rule may assign
//!
//! Nothing in here knows about predicates or precedence; those live in
//! `rulemodel-engine`.

mod context;
mod key;
mod keypath;
mod value;

pub use context::{Context, attr};
pub use key::{KeyShape, TargetKey};
pub use keypath::KeyPath;
pub use value::{Platform, Value, ValueType};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building types from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("invalid key path: {0:?}")]
    InvalidKeyPath(String),

    #[error("unknown target key: {0}")]
    UnknownTargetKey(String),

    #[error("unknown platform: {0}")]
    UnknownPlatform(String),
}
