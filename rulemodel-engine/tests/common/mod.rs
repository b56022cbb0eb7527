//! Shared helpers for engine tests.

#![allow(dead_code)]

use rulemodel_engine::Predicate;
use rulemodel_types::{KeyPath, Value};

pub fn path(p: &str) -> KeyPath {
    KeyPath::parse(p).unwrap()
}

pub fn eq(p: &str, value: impl Into<Value>) -> Predicate {
    Predicate::eq(path(p), value)
}

pub fn ne(p: &str, value: impl Into<Value>) -> Predicate {
    Predicate::ne(path(p), value)
}

pub fn present(p: &str) -> Predicate {
    Predicate::present(path(p))
}
