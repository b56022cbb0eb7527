//! Property-based tests for resolution semantics.
//!
//! - Determinism: equal inputs resolve to equal outputs
//! - Absence: no matching rule means no value
//! - Last match wins under the default precedence
//! - `resolve_all` agrees with per-key resolution

mod common;

use common::eq;
use proptest::prelude::*;
use rulemodel_engine::{
    ContextSchema, EngineOptions, Precedence, Predicate, Rule, RuleEngine,
};
use rulemodel_types::{Context, TargetKey, Value};

// =============================================================================
// HELPER STRATEGIES
// =============================================================================

const TASKS: [&str; 4] = ["list", "inspect", "edit", "select"];
const ENTITIES: [&str; 4] = ["Actor", "Film", "Customer", "Rental"];

fn task_strategy() -> impl Strategy<Value = &'static str> {
    prop::sample::select(TASKS.to_vec())
}

fn entity_strategy() -> impl Strategy<Value = &'static str> {
    prop::sample::select(ENTITIES.to_vec())
}

fn leaf_strategy() -> impl Strategy<Value = Predicate> {
    prop_oneof![
        task_strategy().prop_map(|t| eq("task", t)),
        entity_strategy().prop_map(|e| eq("entity.name", e)),
        task_strategy().prop_map(|t| common::ne("task", t)),
        Just(eq("user.username", "Mike")),
        Just(Predicate::True),
    ]
}

fn predicate_strategy() -> impl Strategy<Value = Predicate> {
    leaf_strategy().prop_recursive(3, 12, 3, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 1..3).prop_map(Predicate::And),
            prop::collection::vec(inner.clone(), 1..3).prop_map(Predicate::Or),
            inner.prop_map(Predicate::not),
        ]
    })
}

fn key_strategy() -> impl Strategy<Value = TargetKey> {
    prop::sample::select(vec![
        TargetKey::Title,
        TargetKey::DisplayNameForEntity,
        TargetKey::FirstTask,
    ])
}

fn rule_strategy() -> impl Strategy<Value = Rule> {
    (predicate_strategy(), key_strategy(), "[a-z]{1,6}")
        .prop_map(|(predicate, key, label)| Rule::new(predicate, key, label))
}

fn context_strategy() -> impl Strategy<Value = Context> {
    (task_strategy(), entity_strategy(), any::<bool>()).prop_map(|(task, entity, mike)| {
        let ctx = Context::new().with_task(task).with_entity_name(entity);
        if mike { ctx.with_user("Mike") } else { ctx }
    })
}

fn engine(rules: Vec<Rule>, precedence: Precedence) -> RuleEngine {
    RuleEngine::with_schema(rules, &ContextSchema::standard(), EngineOptions { precedence })
        .unwrap()
}

// =============================================================================
// RESOLUTION PROPERTIES
// =============================================================================

proptest! {
    #[test]
    fn resolution_is_deterministic(
        rules in prop::collection::vec(rule_strategy(), 0..12),
        ctx in context_strategy(),
        key in key_strategy(),
    ) {
        let engine = engine(rules, Precedence::LastMatch);
        let copy = ctx.clone();
        prop_assert_eq!(engine.resolve_key(key, &ctx), engine.resolve_key(key, &copy));
    }

    #[test]
    fn no_matching_rule_means_absent(
        rules in prop::collection::vec(rule_strategy(), 0..12),
        ctx in context_strategy(),
        key in key_strategy(),
    ) {
        let engine = engine(rules.clone(), Precedence::LastMatch);
        let any_match = rules.iter().any(|r| r.key() == key && r.matches(&ctx));
        prop_assert_eq!(engine.resolve_key(key, &ctx).is_some(), any_match);
    }

    #[test]
    fn last_match_wins(
        rules in prop::collection::vec(rule_strategy(), 1..12),
        ctx in context_strategy(),
        key in key_strategy(),
    ) {
        let engine = engine(rules.clone(), Precedence::LastMatch);
        let expected = rules
            .iter()
            .filter(|r| r.key() == key)
            .filter_map(|r| r.apply(&ctx))
            .last();
        prop_assert_eq!(engine.resolve_key(key, &ctx), expected);
    }

    #[test]
    fn appended_matching_rule_overrides(
        rules in prop::collection::vec(rule_strategy(), 0..12),
        ctx in context_strategy(),
        key in key_strategy(),
    ) {
        let mut rules = rules;
        rules.push(Rule::always(key, "override"));
        let engine = engine(rules, Precedence::LastMatch);
        prop_assert_eq!(engine.resolve_key(key, &ctx), Some(Value::from("override")));
    }

    #[test]
    fn resolve_all_matches_resolve_key(
        rules in prop::collection::vec(rule_strategy(), 0..12),
        ctx in context_strategy(),
        most_specific in any::<bool>(),
    ) {
        let precedence = if most_specific { Precedence::MostSpecific } else { Precedence::LastMatch };
        let engine = engine(rules, precedence);
        let all = engine.resolve_all(&ctx);
        for key in TargetKey::ALL {
            prop_assert_eq!(all.get(&key).cloned(), engine.resolve_key(key, &ctx));
        }
    }

    #[test]
    fn explain_agrees_with_resolve_key(
        rules in prop::collection::vec(rule_strategy(), 0..12),
        ctx in context_strategy(),
        key in key_strategy(),
    ) {
        let engine = engine(rules, Precedence::LastMatch);
        let explained = engine.explain(key, &ctx);
        prop_assert_eq!(explained.as_ref().map(|r| r.value.clone()), engine.resolve_key(key, &ctx));
        if let Some(resolution) = explained {
            prop_assert!(resolution.candidates >= 1);
            prop_assert_eq!(engine.rules()[resolution.rule_index].key(), key);
        }
    }
}
