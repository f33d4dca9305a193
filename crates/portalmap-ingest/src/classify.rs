//! Permissive portal classification.
//!
//! An object is a portal if ANY of these holds:
//! 1. `type` is the string `"portal"` (case-sensitive),
//! 2. `type` is an integer in [`PORTAL_TYPE_CODES`],
//! 3. a non-null top-level `targetMap` is present,
//! 4. `properties` contains `targetMap` or a truthy `isPortal`.
//!
//! Rules 3 and 4 catch portals whose `type` matches no known tag. The rules are
//! independent; their order only matters for reporting.

use portalmap_model::{keys, RawObject};
use serde_json::Value;

pub const PORTAL_TYPE_TAG: &str = "portal";

/// Integer `type` codes seen on portal-like placements.
///
/// Empirical and subject to revision: different spaces have used different
/// codes for the same concept, and it is not known whether this list is
/// exhaustive.
pub const PORTAL_TYPE_CODES: [i64; 3] = [4, 5, 6];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortalRule {
    TypeTag,
    TypeCode,
    TopLevelTarget,
    NestedMarker,
}

impl PortalRule {
    pub const ALL: [PortalRule; 4] = [
        PortalRule::TypeTag,
        PortalRule::TypeCode,
        PortalRule::TopLevelTarget,
        PortalRule::NestedMarker,
    ];

    pub fn matches(self, raw: &RawObject) -> bool {
        match self {
            PortalRule::TypeTag => raw
                .object_type
                .as_ref()
                .and_then(|t| t.as_tag())
                .is_some_and(|tag| tag == PORTAL_TYPE_TAG),
            PortalRule::TypeCode => raw
                .object_type
                .as_ref()
                .and_then(|t| t.as_code())
                .is_some_and(|code| PORTAL_TYPE_CODES.contains(&code)),
            PortalRule::TopLevelTarget => raw.top_level(keys::TARGET_MAP).is_some(),
            PortalRule::NestedMarker => raw.properties.as_ref().is_some_and(|props| {
                props.contains_key(keys::TARGET_MAP)
                    || props.get(keys::IS_PORTAL).is_some_and(is_truthy)
            }),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PortalRule::TypeTag => "type_tag",
            PortalRule::TypeCode => "type_code",
            PortalRule::TopLevelTarget => "top_level_target",
            PortalRule::NestedMarker => "nested_marker",
        }
    }
}

pub fn is_portal(raw: &RawObject) -> bool {
    PortalRule::ALL.iter().any(|rule| rule.matches(raw))
}

/// Every rule that classifies `raw` as a portal, in documentation order.
pub fn matched_rules(raw: &RawObject) -> Vec<PortalRule> {
    PortalRule::ALL
        .iter()
        .copied()
        .filter(|rule| rule.matches(raw))
        .collect()
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawObject {
        RawObject::from_value(value).unwrap()
    }

    #[test]
    fn string_tag_is_case_sensitive() {
        assert!(is_portal(&raw(json!({"type": "portal", "x": 0, "y": 0}))));
        assert!(!is_portal(&raw(json!({"type": "Portal", "x": 0, "y": 0}))));
    }

    #[test]
    fn integer_codes() {
        for code in PORTAL_TYPE_CODES {
            assert!(is_portal(&raw(json!({"type": code}))));
        }
        assert!(!is_portal(&raw(json!({"type": 3}))));
        assert!(!is_portal(&raw(json!({"type": 7}))));
    }

    #[test]
    fn top_level_target_requires_non_null() {
        assert!(is_portal(&raw(json!({"type": "image", "targetMap": "M2"}))));
        assert!(!is_portal(&raw(json!({"type": "image", "targetMap": null}))));
    }

    #[test]
    fn nested_markers() {
        assert!(is_portal(&raw(json!({"type": "custom", "properties": {"isPortal": true}}))));
        assert!(is_portal(&raw(json!({"type": "custom", "properties": {"targetMap": null}}))));
        assert!(!is_portal(&raw(json!({"type": "custom", "properties": {"isPortal": false}}))));
        assert!(!is_portal(&raw(json!({"type": "custom", "properties": {"isPortal": ""}}))));
        assert!(!is_portal(&raw(json!({"type": "custom", "properties": {}}))));
    }

    #[test]
    fn matched_rules_reports_every_match() {
        let r = raw(json!({
            "type": "portal",
            "targetMap": "M2",
            "properties": {"isPortal": 1}
        }));
        assert_eq!(
            matched_rules(&r),
            vec![
                PortalRule::TypeTag,
                PortalRule::TopLevelTarget,
                PortalRule::NestedMarker
            ]
        );
        assert!(matched_rules(&raw(json!({"type": "image"}))).is_empty());
    }
}
