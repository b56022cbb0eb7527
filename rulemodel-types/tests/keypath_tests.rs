use proptest::prelude::*;
use rulemodel_types::{Error, KeyPath};

// ── Parsing ──────────────────────────────────────────────────────

#[test]
fn parse_single_segment() {
    let path = KeyPath::parse("task").unwrap();
    assert_eq!(path.segments(), ["task"]);
    assert_eq!(path.root(), "task");
    assert_eq!(path.leaf(), "task");
    assert_eq!(path.len(), 1);
}

#[test]
fn parse_dotted_path() {
    let path = KeyPath::parse("object.address.phone").unwrap();
    assert_eq!(path.segments(), ["object", "address", "phone"]);
    assert_eq!(path.root(), "object");
    assert_eq!(path.leaf(), "phone");
}

#[test]
fn parse_strips_optional_chain_marker() {
    let chained = KeyPath::parse("user?.username").unwrap();
    let plain = KeyPath::parse("user.username").unwrap();
    assert_eq!(chained, plain);
    assert_eq!(chained.to_string(), "user.username");
}

#[test]
fn parse_rejects_empty() {
    assert_eq!(
        KeyPath::parse(""),
        Err(Error::InvalidKeyPath(String::new()))
    );
}

#[test]
fn parse_rejects_empty_segment() {
    assert!(KeyPath::parse("entity..name").is_err());
    assert!(KeyPath::parse(".task").is_err());
    assert!(KeyPath::parse("task.").is_err());
}

#[test]
fn parse_rejects_non_identifier_segments() {
    assert!(KeyPath::parse("entity.1name").is_err());
    assert!(KeyPath::parse("entity.na-me").is_err());
    assert!(KeyPath::parse("entity name").is_err());
}

#[test]
fn from_str_matches_parse() {
    let path: KeyPath = "entity.name".parse().unwrap();
    assert_eq!(path, KeyPath::parse("entity.name").unwrap());
}

#[test]
fn from_segments_rejects_empty_list() {
    assert!(KeyPath::from_segments(Vec::<String>::new()).is_err());
}

// ── Structure ────────────────────────────────────────────────────

#[test]
fn parent_drops_leaf() {
    let path = KeyPath::parse("user.username").unwrap();
    assert_eq!(path.parent(), Some(KeyPath::parse("user").unwrap()));
    assert_eq!(KeyPath::parse("user").unwrap().parent(), None);
}

#[test]
fn starts_with_checks_whole_segments() {
    let path = KeyPath::parse("object.address.phone").unwrap();
    assert!(path.starts_with(&KeyPath::parse("object").unwrap()));
    assert!(path.starts_with(&KeyPath::parse("object.address").unwrap()));
    assert!(path.starts_with(&path));
    assert!(!path.starts_with(&KeyPath::parse("obj").unwrap()));
    assert!(!path.starts_with(&KeyPath::parse("object.address.phone.ext").unwrap()));
}

// ── Serde ────────────────────────────────────────────────────────

#[test]
fn serializes_as_string() {
    let path = KeyPath::parse("entity.name").unwrap();
    assert_eq!(serde_json::to_string(&path).unwrap(), "\"entity.name\"");
}

#[test]
fn deserialize_rejects_invalid_path() {
    let result: Result<KeyPath, _> = serde_json::from_str("\"entity..name\"");
    assert!(result.is_err());
}

proptest! {
    #[test]
    fn display_reparses_to_same_path(segments in prop::collection::vec("[a-z_][a-zA-Z0-9_]{0,8}", 1..5)) {
        let path = KeyPath::from_segments(segments.clone()).unwrap();
        let reparsed = KeyPath::parse(&path.to_string()).unwrap();
        prop_assert_eq!(reparsed.segments(), segments.as_slice());
    }
}
