//! Structured rule files (TOML or JSON).
//!
//! ```toml
//! [engine]
//! precedence = "last_match"
//! schema = "standard"
//!
//! [[rule]]
//! when = 'task == "list" && entity.name == "Customer"'
//! set = "displayPropertyKeys"
//! value = ["firstName", "address.phone"]
//!
//! [[rule]]
//! set = "title"
//! from = "object.rentalDate"
//! display = true
//!
//! [[rule]]
//! text = 'propertyKey == "address.phone" => displayNameForProperty <= "Phone"'
//! ```

use rulemodel_engine::{Rule, RuleValue};
use rulemodel_types::{KeyPath, KeyShape, TargetKey, Value};
use serde::Deserialize;

use crate::loader::EngineSettings;
use crate::parser::{parse_predicate, parse_rule};
use crate::{ConfigError, ConfigResult};

/// Raw structure of a rule file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuleFile {
    #[serde(default)]
    pub engine: EngineSettings,
    #[serde(default, rename = "rule", alias = "rules")]
    pub rules: Vec<RuleEntry>,
}

impl RuleFile {
    /// Converts every entry, in file order.
    pub fn into_rules(self) -> ConfigResult<Vec<Rule>> {
        self.rules
            .into_iter()
            .enumerate()
            .map(|(index, entry)| entry.into_rule(index))
            .collect()
    }
}

/// One `[[rule]]` entry: either a full DSL rule in `text`, or `set` with
/// exactly one of `value` and `from`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleEntry {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub when: Option<String>,
    #[serde(default)]
    pub set: Option<String>,
    #[serde(default)]
    pub value: Option<serde_json::Value>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub display: bool,
}

impl RuleEntry {
    pub fn into_rule(self, index: usize) -> ConfigResult<Rule> {
        let entry_error = |message: String| ConfigError::Entry { index, message };

        if let Some(text) = self.text {
            if self.when.is_some()
                || self.set.is_some()
                || self.value.is_some()
                || self.from.is_some()
            {
                return Err(entry_error(
                    "`text` cannot be combined with `when`, `set`, `value` or `from`".into(),
                ));
            }
            return parse_rule(&text).map_err(|e| entry_error(e.to_string()));
        }

        let Some(set) = self.set else {
            return Err(entry_error("missing `set` (or `text`)".into()));
        };
        let key = TargetKey::parse(&set)
            .ok_or_else(|| entry_error(format!("unknown target key `{set}`")))?;

        let predicate = match self.when {
            Some(when) => parse_predicate(&when).map_err(|e| entry_error(e.to_string()))?,
            None => Default::default(),
        };

        let value = match (self.value, self.from) {
            (Some(_), Some(_)) => {
                return Err(entry_error("`value` and `from` are mutually exclusive".into()));
            }
            (None, None) => return Err(entry_error("missing `value` or `from`".into())),
            (Some(_), None) if self.display => {
                return Err(entry_error("`display` only applies to `from`".into()));
            }
            (Some(json), None) => RuleValue::Literal(literal_for(key, json)),
            (None, Some(from)) => {
                let path = KeyPath::parse(&from).map_err(|e| entry_error(e.to_string()))?;
                if self.display {
                    RuleValue::Display(path)
                } else {
                    RuleValue::Path(path)
                }
            }
        };

        Ok(Rule::new(predicate, key, value))
    }
}

/// JSON strings name components and formatters for keys of those shapes.
fn literal_for(key: TargetKey, json: serde_json::Value) -> Value {
    match (key.shape(), json) {
        (KeyShape::Component, serde_json::Value::String(name)) => Value::Component(name),
        (KeyShape::Formatter, serde_json::Value::String(name)) => Value::Formatter(name),
        (_, other) => Value::from(other),
    }
}
