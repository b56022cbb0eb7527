//! Loading rule sources into engines and stores.

use rulemodel_engine::{ContextSchema, EngineOptions, Precedence, Rule, RuleEngine, RuleStore};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

use crate::file::RuleFile;
use crate::parser::parse_rules;
use crate::{ConfigError, ConfigResult};

/// Which context schema rules are validated against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaMode {
    /// [`ContextSchema::standard`].
    #[default]
    Standard,
    /// Any attribute path, no type checks.
    Permissive,
}

/// The `[engine]` section of a rule file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSettings {
    #[serde(default)]
    pub precedence: Precedence,
    #[serde(default)]
    pub schema: SchemaMode,
}

impl EngineSettings {
    pub fn options(&self) -> EngineOptions {
        EngineOptions {
            precedence: self.precedence,
        }
    }

    pub fn schema(&self) -> ContextSchema {
        match self.schema {
            SchemaMode::Standard => ContextSchema::standard(),
            SchemaMode::Permissive => ContextSchema::permissive(),
        }
    }

    /// Validates `rules` and builds an engine with these settings.
    pub fn build(&self, rules: Vec<Rule>) -> ConfigResult<RuleEngine> {
        Ok(RuleEngine::with_schema(rules, &self.schema(), self.options())?)
    }
}

/// Syntax of a rule source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleFormat {
    Toml,
    Json,
    /// The rule DSL.
    Text,
}

impl RuleFormat {
    /// `.toml` and `.json` by extension; anything else is DSL text.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Self::Toml,
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Prefix of a settings line in the comment header of rule text.
const SETTING_MARKER: &str = "// @";

/// Reads engine settings from the leading comment lines of rule text:
///
/// ```text
/// // Movie rental rules.
/// // @precedence most_specific
/// // @schema standard
/// ```
///
/// Scanning stops at the first line that is not blank or a comment.
fn text_settings(contents: &str) -> ConfigResult<EngineSettings> {
    let mut table = String::new();
    for (number, line) in contents.lines().enumerate() {
        let line = line.trim();
        let Some(setting) = line.strip_prefix(SETTING_MARKER) else {
            if line.is_empty() || line.starts_with("//") {
                continue;
            }
            break;
        };
        let (name, value) = setting
            .split_once(char::is_whitespace)
            .map_or((setting, ""), |(name, value)| (name, value.trim()));
        if !matches!(name, "precedence" | "schema") || value.is_empty() {
            return Err(ConfigError::Parse {
                line: number + 1,
                column: 1,
                message: format!(
                    "invalid setting `@{setting}`, expected `@precedence <policy>` or `@schema <mode>`"
                ),
            });
        }
        table.push_str(&format!("{name} = {value:?}\n"));
    }
    Ok(toml::from_str(&table)?)
}

/// Parses `contents` into settings and rules without validating them.
pub fn parse_rule_source(
    contents: &str,
    format: RuleFormat,
) -> ConfigResult<(EngineSettings, Vec<Rule>)> {
    let file = match format {
        RuleFormat::Toml => toml::from_str::<RuleFile>(contents)?,
        RuleFormat::Json => serde_json::from_str::<RuleFile>(contents)?,
        RuleFormat::Text => return Ok((text_settings(contents)?, parse_rules(contents)?)),
    };
    let settings = file.engine;
    Ok((settings, file.into_rules()?))
}

/// Reads, parses and validates the rule file at `path`.
pub fn load_engine(path: impl AsRef<Path>) -> ConfigResult<RuleEngine> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let (settings, rules) = parse_rule_source(&contents, RuleFormat::from_path(path))?;
    let engine = settings.build(rules)?;
    info!(
        "Loaded {} rules from {:?} ({:?} precedence)",
        engine.len(),
        path,
        settings.precedence
    );
    Ok(engine)
}

/// A store whose first snapshot is the rule file at `path`.
pub fn load_store(path: impl AsRef<Path>) -> ConfigResult<RuleStore> {
    load_engine(path).map(RuleStore::new)
}

/// Rebuilds the engine from `path` and publishes it, returning the new
/// generation. On any error the current snapshot stays live.
pub fn reload_store(store: &RuleStore, path: impl AsRef<Path>) -> ConfigResult<u64> {
    let path = path.as_ref();
    store.try_publish_with(|| load_engine(path)).inspect_err(|e| {
        warn!(
            "Failed to reload rules from {:?}: {}. Keeping generation {}.",
            path,
            e,
            store.generation()
        );
    })
}
