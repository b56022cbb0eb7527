use pretty_assertions::assert_eq;
use rulemodel_types::{Context, KeyPath, Platform, Value, attr};
use serde_json::json;

fn path(p: &str) -> KeyPath {
    KeyPath::parse(p).unwrap()
}

// ── Lookup ───────────────────────────────────────────────────────

#[test]
fn empty_context_has_nothing() {
    let ctx = Context::new();
    assert_eq!(ctx.get(&path(attr::TASK)), None);
    assert!(!ctx.contains(&path(attr::ENTITY_NAME)));
}

#[test]
fn builder_sets_well_known_attributes() {
    let ctx = Context::new()
        .with_entity_name("Customer")
        .with_task("list")
        .with_property_key("address.phone")
        .with_platform(Platform::Phone)
        .with_user("Mike")
        .with_debug(true);

    assert_eq!(ctx.get(&path(attr::ENTITY_NAME)), Some(&Value::from("Customer")));
    assert_eq!(ctx.get(&path(attr::TASK)), Some(&Value::from("list")));
    assert_eq!(
        ctx.get(&path(attr::PROPERTY_KEY)),
        Some(&Value::from("address.phone"))
    );
    assert_eq!(
        ctx.get(&path(attr::PLATFORM)),
        Some(&Value::Platform(Platform::Phone))
    );
    assert_eq!(ctx.get(&path(attr::USER_USERNAME)), Some(&Value::from("Mike")));
    assert_eq!(ctx.get(&path(attr::DEBUG)), Some(&Value::Bool(true)));
}

#[test]
fn nested_object_fields_are_reachable() {
    let ctx = Context::new().with_object(json!({
        "firstName": "Penelope",
        "address": { "phone": "555-0100" },
        "d2s": { "isDefault": false }
    }));

    assert_eq!(
        ctx.get(&path("object.firstName")),
        Some(&Value::from("Penelope"))
    );
    assert_eq!(
        ctx.get(&path("object.address.phone")),
        Some(&Value::from("555-0100"))
    );
    assert_eq!(
        ctx.get(&path("object.d2s.isDefault")),
        Some(&Value::Bool(false))
    );
}

#[test]
fn missing_intermediate_is_absent() {
    let ctx = Context::new().with_task("list");
    assert_eq!(ctx.get(&path("user.username")), None);
}

#[test]
fn non_map_intermediate_is_absent() {
    let ctx = Context::new().with_task("list");
    assert_eq!(ctx.get(&path("task.name")), None);
}

#[test]
fn null_leaf_is_absent() {
    let ctx = Context::from_json(json!({ "user": null }));
    assert_eq!(ctx.get(&path("user")), None);
    assert_eq!(ctx.get(&path("user.username")), None);
    assert!(!ctx.contains(&path("user")));
}

// ── Mutation ─────────────────────────────────────────────────────

#[test]
fn insert_creates_intermediate_maps() {
    let mut ctx = Context::new();
    ctx.insert(&path("object.address.city"), "Berlin");
    assert_eq!(
        ctx.get(&path("object.address")),
        Some(&Value::map([("city", Value::from("Berlin"))]))
    );
}

#[test]
fn insert_replaces_scalar_intermediate() {
    let mut ctx = Context::new().with_path(&path("user"), "anonymous");
    ctx.insert(&path("user.username"), "Mike");
    assert_eq!(ctx.get(&path("user.username")), Some(&Value::from("Mike")));
}

#[test]
fn with_user_keeps_other_user_fields() {
    let ctx = Context::new()
        .with_path(&path("user.role"), "admin")
        .with_user("Mike");
    assert_eq!(ctx.get(&path("user.role")), Some(&Value::from("admin")));
    assert_eq!(ctx.get(&path("user.username")), Some(&Value::from("Mike")));
}

// ── Construction from JSON ───────────────────────────────────────

#[test]
fn from_json_matches_builder() {
    let built = Context::new().with_entity_name("Actor").with_task("list");
    let parsed = Context::from_json(json!({
        "entity": { "name": "Actor" },
        "task": "list"
    }));
    assert_eq!(built, parsed);
}

#[test]
fn from_json_non_object_is_empty() {
    assert_eq!(Context::from_json(json!([1, 2, 3])), Context::new());
}

#[test]
fn attributes_lists_top_level_keys() {
    let ctx = Context::new().with_task("edit").with_entity_name("Film");
    let keys: Vec<&str> = ctx.attributes().keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["entity", "task"]);
}
