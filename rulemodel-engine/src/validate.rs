//! Load-time checks. A rule set that passes cannot make resolution fail.

use rulemodel_types::{KeyShape, ValueType};

use crate::{ContextSchema, Predicate, Rule, RuleDefect, RuleResult, RuleValue};

/// Validates every rule, reporting the first defect with its position.
pub fn validate_rules(rules: &[Rule], schema: &ContextSchema) -> RuleResult<()> {
    for (index, rule) in rules.iter().enumerate() {
        validate_rule(rule, schema).map_err(|defect| defect.at(index))?;
    }
    Ok(())
}

/// Validates a single rule against `schema`.
pub fn validate_rule(rule: &Rule, schema: &ContextSchema) -> Result<(), RuleDefect> {
    validate_predicate(&rule.predicate, schema)?;

    let key = rule.assignment.key;
    let shape = key.shape();
    match &rule.assignment.value {
        RuleValue::Literal(value) => {
            if !shape.accepts(value) {
                return Err(RuleDefect::AssignmentShape {
                    key,
                    expected: shape,
                    found: value.value_type(),
                });
            }
        }
        RuleValue::Path(path) => {
            if let Some(value_type) = schema.lookup(path)?
                && !shape_admits(shape, value_type)
            {
                return Err(RuleDefect::InvalidDerivation {
                    key,
                    path: path.clone(),
                    reason: format!("attribute is {value_type}, key expects {shape}"),
                });
            }
        }
        RuleValue::Display(path) => {
            schema.lookup(path)?;
            if shape != KeyShape::String {
                return Err(RuleDefect::InvalidDerivation {
                    key,
                    path: path.clone(),
                    reason: format!("display strings only fit string keys, key expects {shape}"),
                });
            }
        }
    }
    Ok(())
}

fn validate_predicate(predicate: &Predicate, schema: &ContextSchema) -> Result<(), RuleDefect> {
    match predicate {
        Predicate::True => Ok(()),
        Predicate::Compare { path, value, .. } => {
            let found = value.value_type();
            if found == ValueType::Null {
                return Err(RuleDefect::NullComparison(path.clone()));
            }
            match schema.lookup(path)? {
                Some(expected) if !expected.is_comparable_with(found) => {
                    Err(RuleDefect::TypeMismatch {
                        path: path.clone(),
                        expected,
                        found,
                    })
                }
                _ => Ok(()),
            }
        }
        Predicate::Present(path) => schema.lookup(path).map(|_| ()),
        Predicate::And(operands) | Predicate::Or(operands) => operands
            .iter()
            .try_for_each(|operand| validate_predicate(operand, schema)),
        Predicate::Not(inner) => validate_predicate(inner, schema),
    }
}

/// Whether a value of `value_type` can satisfy `shape`. Lists are accepted
/// for string lists since item types are only known at runtime.
fn shape_admits(shape: KeyShape, value_type: ValueType) -> bool {
    matches!(
        (shape, value_type),
        (KeyShape::Bool, ValueType::Bool)
            | (KeyShape::String, ValueType::String)
            | (KeyShape::StringList, ValueType::List)
            | (KeyShape::Map, ValueType::Map)
            | (KeyShape::Component, ValueType::Component)
            | (KeyShape::Formatter, ValueType::Formatter)
    )
}
