//! The rule engine: ordered rules, one winner per key.
//!
//! Rules are scanned in declaration order. Among the rules for a key whose
//! predicate matches the context, the precedence policy picks the winner;
//! under the default [`Precedence::LastMatch`] the latest declaration wins,
//! so general defaults are written first and overrides after them.

use rulemodel_types::{Context, TargetKey, Value};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::collections::btree_map::Entry;
use tracing::{debug, trace};

use crate::validate::validate_rules;
use crate::{ContextSchema, Rule, RuleError, RuleResult};

/// How competing matches for the same key are ordered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Precedence {
    /// The last matching rule in declaration order wins.
    #[default]
    LastMatch,
    /// The matching rule with the most leaf tests wins; ties go to the later
    /// declaration.
    MostSpecific,
}

impl Precedence {
    /// Whether a later candidate with `challenger` complexity replaces the
    /// current winner with `current` complexity.
    fn prefers(self, challenger: usize, current: usize) -> bool {
        match self {
            Self::LastMatch => true,
            Self::MostSpecific => challenger >= current,
        }
    }
}

/// Engine construction options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineOptions {
    #[serde(default)]
    pub precedence: Precedence,
}

/// The outcome of a resolution, with its provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// Position of the winning rule in the rule sequence.
    pub rule_index: usize,
    pub value: Value,
    /// Number of rules for the key that matched the context.
    pub candidates: usize,
}

/// Resolves target keys against contexts using an immutable rule sequence.
///
/// Built once, validated once; every lookup afterwards is a pure function of
/// the rules, the options, the key and the context.
#[derive(Debug, Clone)]
pub struct RuleEngine {
    rules: Vec<Rule>,
    complexity: Vec<usize>,
    by_key: HashMap<TargetKey, Vec<usize>>,
    options: EngineOptions,
}

impl RuleEngine {
    /// Builds an engine checked against [`ContextSchema::standard`] with
    /// default options.
    pub fn new(rules: Vec<Rule>) -> RuleResult<Self> {
        Self::with_schema(rules, &ContextSchema::standard(), EngineOptions::default())
    }

    /// Validates `rules` against `schema` and indexes them by target key.
    pub fn with_schema(
        rules: Vec<Rule>,
        schema: &ContextSchema,
        options: EngineOptions,
    ) -> RuleResult<Self> {
        validate_rules(&rules, schema)?;

        let complexity = rules.iter().map(|r| r.predicate.complexity()).collect();
        let mut by_key: HashMap<TargetKey, Vec<usize>> = HashMap::new();
        for (index, rule) in rules.iter().enumerate() {
            by_key.entry(rule.key()).or_default().push(index);
        }

        debug!(
            "Built rule engine with {} rules over {} keys ({:?})",
            rules.len(),
            by_key.len(),
            options.precedence
        );

        Ok(Self {
            rules,
            complexity,
            by_key,
            options,
        })
    }

    /// An engine without rules; every lookup is absent.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            rules: Vec::new(),
            complexity: Vec::new(),
            by_key: HashMap::new(),
            options: EngineOptions::default(),
        }
    }

    /// Resolves a key given by name.
    ///
    /// Fails only with [`RuleError::UnsupportedKey`] for names outside the
    /// recognized set; a missing match is `Ok(None)`.
    pub fn resolve(&self, key: &str, ctx: &Context) -> RuleResult<Option<Value>> {
        let key = TargetKey::parse(key).ok_or_else(|| RuleError::UnsupportedKey(key.to_string()))?;
        Ok(self.resolve_key(key, ctx))
    }

    /// Resolves `key` for `ctx`, or `None` when no rule matches.
    #[must_use]
    pub fn resolve_key(&self, key: TargetKey, ctx: &Context) -> Option<Value> {
        let value = match self.options.precedence {
            // The last match wins, so the first match scanning backwards is it.
            Precedence::LastMatch => self
                .positions(key)
                .iter()
                .rev()
                .find_map(|&i| self.rules[i].apply(ctx)),
            Precedence::MostSpecific => self.explain(key, ctx).map(|r| r.value),
        };
        trace!("Resolved {} -> {:?}", key, value);
        value
    }

    /// Like [`resolve_key`](Self::resolve_key), also reporting which rule
    /// won and how many matched.
    #[must_use]
    pub fn explain(&self, key: TargetKey, ctx: &Context) -> Option<Resolution> {
        let mut winner: Option<(usize, Value)> = None;
        let mut candidates = 0;
        for &index in self.positions(key) {
            let Some(value) = self.rules[index].apply(ctx) else {
                continue;
            };
            candidates += 1;
            let replace = winner.as_ref().is_none_or(|(current, _)| {
                self.options
                    .precedence
                    .prefers(self.complexity[index], self.complexity[*current])
            });
            if replace {
                winner = Some((index, value));
            }
        }
        winner.map(|(rule_index, value)| Resolution {
            rule_index,
            value,
            candidates,
        })
    }

    /// Resolves every recognized key in one pass over the rules.
    ///
    /// Each predicate is evaluated at most once. The result equals calling
    /// [`resolve_key`](Self::resolve_key) for each key; keys without a match
    /// are left out.
    #[must_use]
    pub fn resolve_all(&self, ctx: &Context) -> BTreeMap<TargetKey, Value> {
        let mut winners: BTreeMap<TargetKey, (usize, Value)> = BTreeMap::new();
        for (index, rule) in self.rules.iter().enumerate() {
            let Some(value) = rule.apply(ctx) else {
                continue;
            };
            let complexity = self.complexity[index];
            match winners.entry(rule.key()) {
                Entry::Vacant(slot) => {
                    slot.insert((complexity, value));
                }
                Entry::Occupied(mut slot) => {
                    if self.options.precedence.prefers(complexity, slot.get().0) {
                        slot.insert((complexity, value));
                    }
                }
            }
        }
        winners
            .into_iter()
            .map(|(key, (_, value))| (key, value))
            .collect()
    }

    /// The rule sequence in declaration order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Rules that assign `key`, with their positions.
    pub fn rules_for(&self, key: TargetKey) -> impl Iterator<Item = (usize, &Rule)> {
        self.positions(key).iter().map(|&i| (i, &self.rules[i]))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn options(&self) -> EngineOptions {
        self.options
    }

    fn positions(&self, key: TargetKey) -> &[usize] {
        self.by_key.get(&key).map(Vec::as_slice).unwrap_or_default()
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::empty()
    }
}
