//! Rule sources for `rulemodel`.
//!
//! Rule models can be written three ways:
//! - the rule DSL (`task == "edit" => component <= EditField()`), see [`parse_rules`]
//! - TOML or JSON rule files with an `[engine]` section and `[[rule]]` entries, see [`RuleFile`]
//! - the builder API of `rulemodel-engine` directly
//!
//! [`load_engine`] and [`load_store`] read a file and validate it once.
//! [`reload_store`] swaps a freshly validated engine into a running
//! [`RuleStore`](rulemodel_engine::RuleStore) and leaves the old one in place
//! when the new file is broken.

mod error;
mod file;
mod lexer;
mod loader;
mod parser;

pub use error::{ConfigError, ConfigResult};
pub use file::{RuleEntry, RuleFile};
pub use loader::{
    EngineSettings, RuleFormat, SchemaMode, load_engine, load_store, parse_rule_source,
    reload_store,
};
pub use parser::{MAX_NESTING, parse_predicate, parse_rule, parse_rules};
