mod common;

use common::{eq, path, present};
use rulemodel_engine::{
    ContextSchema, EngineOptions, Predicate, Rule, RuleDefect, RuleEngine, RuleError, RuleValue,
    validate_rule,
};
use rulemodel_types::{KeyShape, Platform, TargetKey, Value, ValueType};

// ── Schema lookup ────────────────────────────────────────────────

#[test]
fn standard_schema_declares_context_attributes() {
    let schema = ContextSchema::standard();
    assert_eq!(schema.lookup(&path("entity.name")), Ok(Some(ValueType::String)));
    assert_eq!(schema.lookup(&path("platform")), Ok(Some(ValueType::Platform)));
    assert_eq!(schema.lookup(&path("debug")), Ok(Some(ValueType::Bool)));
    assert_eq!(schema.lookup(&path("user")), Ok(Some(ValueType::Map)));
    assert_eq!(schema.lookup(&path("entity")), Ok(Some(ValueType::Map)));
}

#[test]
fn open_subtree_accepts_any_field() {
    let schema = ContextSchema::standard();
    assert_eq!(schema.lookup(&path("object")), Ok(None));
    assert_eq!(schema.lookup(&path("object.address.phone")), Ok(None));
}

#[test]
fn undeclared_attribute_is_unknown() {
    let schema = ContextSchema::standard();
    assert_eq!(
        schema.lookup(&path("session.token")),
        Err(RuleDefect::UnknownAttribute(path("session.token")))
    );
    assert_eq!(
        schema.lookup(&path("objects")),
        Err(RuleDefect::UnknownAttribute(path("objects")))
    );
    assert_eq!(
        schema.lookup(&path("entity.label")),
        Err(RuleDefect::UnknownAttribute(path("entity.label")))
    );
}

#[test]
fn permissive_schema_accepts_everything() {
    let schema = ContextSchema::permissive();
    assert!(schema.is_permissive());
    assert_eq!(schema.lookup(&path("anything.at.all")), Ok(None));
}

#[test]
fn custom_schema() {
    let schema = ContextSchema::new()
        .attribute("tenant.tier", ValueType::Int)
        .open("row");
    assert_eq!(schema.lookup(&path("tenant.tier")), Ok(Some(ValueType::Int)));
    assert_eq!(schema.lookup(&path("row.anything")), Ok(None));
    assert!(schema.lookup(&path("task")).is_err());
}

// ── Predicate validation ─────────────────────────────────────────

#[test]
fn type_mismatch_in_comparison() {
    let rule = Rule::when(eq("task", true)).set(TargetKey::Title, "x");
    assert_eq!(
        validate_rule(&rule, &ContextSchema::standard()),
        Err(RuleDefect::TypeMismatch {
            path: path("task"),
            expected: ValueType::String,
            found: ValueType::Bool,
        })
    );
}

#[test]
fn platform_compared_to_string_is_a_mismatch() {
    let rule = Rule::when(eq("platform", "phone")).set(TargetKey::Debug, true);
    assert!(matches!(
        validate_rule(&rule, &ContextSchema::standard()),
        Err(RuleDefect::TypeMismatch { .. })
    ));

    let fixed = Rule::when(eq("platform", Platform::Phone)).set(TargetKey::Debug, true);
    assert_eq!(validate_rule(&fixed, &ContextSchema::standard()), Ok(()));
}

#[test]
fn numeric_literals_are_interchangeable() {
    let schema = ContextSchema::new().attribute("limit", ValueType::Int);
    let rule = Rule::when(eq("limit", 2.0)).set(TargetKey::Debug, true);
    assert_eq!(validate_rule(&rule, &schema), Ok(()));
}

#[test]
fn mismatch_inside_nested_combinator() {
    let predicate = eq("task", "list").or(Predicate::not(eq("debug", "yes")));
    let rule = Rule::when(predicate).set(TargetKey::Title, "x");
    assert!(matches!(
        validate_rule(&rule, &ContextSchema::standard()),
        Err(RuleDefect::TypeMismatch { found: ValueType::String, .. })
    ));
}

#[test]
fn unknown_attribute_in_presence_test() {
    let rule = Rule::when(present("session")).set(TargetKey::Debug, true);
    assert_eq!(
        validate_rule(&rule, &ContextSchema::standard()),
        Err(RuleDefect::UnknownAttribute(path("session")))
    );
}

#[test]
fn open_subtree_comparisons_are_unchecked() {
    let rule = Rule::when(eq("object.active", 1_i64)).set(TargetKey::Debug, true);
    assert_eq!(validate_rule(&rule, &ContextSchema::standard()), Ok(()));
}

#[test]
fn null_literal_is_rejected_on_open_paths() {
    let rule = Rule::when(Predicate::ne(path("object.firstName"), Value::Null))
        .set(TargetKey::Title, "has name");
    assert_eq!(
        validate_rule(&rule, &ContextSchema::standard()),
        Err(RuleDefect::NullComparison(path("object.firstName")))
    );
    assert!(matches!(
        RuleEngine::new(vec![rule]),
        Err(RuleError::InvalidRule {
            index: 0,
            defect: RuleDefect::NullComparison(_),
        })
    ));
}

#[test]
fn null_literal_is_rejected_by_permissive_schema() {
    let rule = Rule::when(eq("tenant", Value::Null)).set(TargetKey::Title, "anonymous");
    assert_eq!(
        validate_rule(&rule, &ContextSchema::permissive()),
        Err(RuleDefect::NullComparison(path("tenant")))
    );
}

#[test]
fn null_literal_is_rejected_on_declared_paths() {
    let rule = Rule::when(eq("task", Value::Null)).set(TargetKey::Title, "x");
    assert_eq!(
        validate_rule(&rule, &ContextSchema::standard()),
        Err(RuleDefect::NullComparison(path("task")))
    );
}

#[test]
fn presence_test_replaces_null_comparison() {
    let rule = Rule::when(present("object.firstName")).set(TargetKey::Title, "has name");
    assert_eq!(validate_rule(&rule, &ContextSchema::standard()), Ok(()));
}

// ── Assignment validation ────────────────────────────────────────

#[test]
fn literal_must_fit_key_shape() {
    let rule = Rule::always(TargetKey::IsObjectEditable, "no");
    assert_eq!(
        validate_rule(&rule, &ContextSchema::standard()),
        Err(RuleDefect::AssignmentShape {
            key: TargetKey::IsObjectEditable,
            expected: KeyShape::Bool,
            found: ValueType::String,
        })
    );
}

#[test]
fn component_keys_need_component_values() {
    let rule = Rule::always(TargetKey::Page, "CustomerView");
    assert!(matches!(
        validate_rule(&rule, &ContextSchema::standard()),
        Err(RuleDefect::AssignmentShape { expected: KeyShape::Component, .. })
    ));
}

#[test]
fn string_list_with_non_string_items_is_rejected() {
    let rule = Rule::always(
        TargetKey::DisplayPropertyKeys,
        Value::List(vec![Value::from("title"), Value::Int(3)]),
    );
    assert!(validate_rule(&rule, &ContextSchema::standard()).is_err());
}

#[test]
fn display_derivation_only_for_string_keys() {
    let rule = Rule::always(TargetKey::Debug, RuleValue::Display(path("object.flag")));
    assert!(matches!(
        validate_rule(&rule, &ContextSchema::standard()),
        Err(RuleDefect::InvalidDerivation { key: TargetKey::Debug, .. })
    ));
}

#[test]
fn path_derivation_checks_declared_type() {
    let rule = Rule::always(TargetKey::IsObjectEditable, RuleValue::Path(path("task")));
    assert!(matches!(
        validate_rule(&rule, &ContextSchema::standard()),
        Err(RuleDefect::InvalidDerivation { .. })
    ));

    let ok = Rule::always(TargetKey::IsObjectEditable, RuleValue::Path(path("debug")));
    assert_eq!(validate_rule(&ok, &ContextSchema::standard()), Ok(()));
}

#[test]
fn derivation_from_unknown_attribute() {
    let rule = Rule::always(TargetKey::Title, RuleValue::Display(path("session.started")));
    assert_eq!(
        validate_rule(&rule, &ContextSchema::standard()),
        Err(RuleDefect::UnknownAttribute(path("session.started")))
    );
}

// ── Engine construction ──────────────────────────────────────────

#[test]
fn engine_reports_offending_rule_position() {
    let rules = vec![
        Rule::always(TargetKey::Title, "ok"),
        Rule::when(eq("entity.name", "Film")).set(TargetKey::DisplayNameForEntity, "Movies"),
        Rule::always(TargetKey::Formatter, "currencyFormatter"),
    ];
    let err = RuleEngine::new(rules).unwrap_err();
    assert_eq!(
        err,
        RuleError::InvalidRule {
            index: 2,
            defect: RuleDefect::AssignmentShape {
                key: TargetKey::Formatter,
                expected: KeyShape::Formatter,
                found: ValueType::String,
            },
        }
    );
}

#[test]
fn duplicate_targets_are_not_an_error() {
    let rules = vec![
        Rule::always(TargetKey::Title, "a"),
        Rule::always(TargetKey::Title, "b"),
    ];
    assert!(RuleEngine::new(rules).is_ok());
}

#[test]
fn permissive_schema_allows_custom_context() {
    let rules = vec![Rule::when(eq("tenant.plan", "pro")).set(TargetKey::Debug, true)];
    assert!(RuleEngine::new(rules.clone()).is_err());
    assert!(
        RuleEngine::with_schema(rules, &ContextSchema::permissive(), EngineOptions::default())
            .is_ok()
    );
}
