//! Canonical portal records.
//!
//! A `Portal` is produced once by the normalizer and never mutated. Its
//! serialized form is flat (target fields next to the source coordinates) and
//! is the shape of every portal artifact:
//!
//! `{id, source_map, type, x, y, width, height, target_map, target_x, target_y,
//!   normal, orientation, is_valid, invalidity_reason}`

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::object::ObjectType;

/// The `normal` attribute: observed both as a boolean flag and as a label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NormalTag {
    Flag(bool),
    Label(String),
}

impl NormalTag {
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(NormalTag::Flag(*b)),
            Value::String(s) => Some(NormalTag::Label(s.clone())),
            Value::Number(n) => Some(NormalTag::Label(n.to_string())),
            _ => None,
        }
    }

    /// Boolean reading, if the tag has one (`true`, `"false"`, ...).
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            NormalTag::Flag(b) => Some(*b),
            NormalTag::Label(s) => match s.as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
        }
    }
}

impl fmt::Display for NormalTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalTag::Flag(b) => write!(f, "{b}"),
            NormalTag::Label(s) => f.write_str(s),
        }
    }
}

/// Where a portal leads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortalProperties {
    pub target_map: Option<String>,
    pub target_x: i64,
    pub target_y: i64,
    pub normal: Option<bool>,
}

impl PortalProperties {
    /// `normal` is the boolean reading of the portal's resolved normal tag.
    pub fn new(
        target_map: Option<String>,
        target_x: i64,
        target_y: i64,
        normal: Option<&NormalTag>,
    ) -> Self {
        Self {
            target_map,
            target_x,
            target_y,
            normal: normal.and_then(NormalTag::as_flag),
        }
    }

    /// Non-empty target map id.
    pub fn target(&self) -> Option<&str> {
        self.target_map.as_deref().filter(|m| !m.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidityReason {
    MissingTargetMap,
    MissingTargetX,
    MissingTargetY,
    SchemaError,
}

impl InvalidityReason {
    pub fn as_str(self) -> &'static str {
        match self {
            InvalidityReason::MissingTargetMap => "missing_target_map",
            InvalidityReason::MissingTargetX => "missing_target_x",
            InvalidityReason::MissingTargetY => "missing_target_y",
            InvalidityReason::SchemaError => "schema_error",
        }
    }
}

impl fmt::Display for InvalidityReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PortalRecord", into = "PortalRecord")]
pub struct Portal {
    pub id: String,
    pub source_map: String,
    /// Original `type` value, kept for diagnostics.
    pub object_type: Option<ObjectType>,
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
    pub properties: PortalProperties,
    pub orientation: Option<String>,
    pub normal: Option<NormalTag>,
    pub invalidity_reason: Option<InvalidityReason>,
}

impl Portal {
    pub fn is_valid(&self) -> bool {
        self.invalidity_reason.is_none()
    }

    pub fn target_map(&self) -> Option<&str> {
        self.properties.target()
    }
}

/// Flat wire shape of a [`Portal`].
#[derive(Serialize, Deserialize)]
struct PortalRecord {
    id: String,
    source_map: String,
    #[serde(rename = "type")]
    object_type: Option<ObjectType>,
    x: i64,
    y: i64,
    #[serde(default = "one")]
    width: i64,
    #[serde(default = "one")]
    height: i64,
    target_map: Option<String>,
    #[serde(default)]
    target_x: i64,
    #[serde(default)]
    target_y: i64,
    #[serde(default)]
    normal: Option<NormalTag>,
    #[serde(default)]
    orientation: Option<String>,
    is_valid: bool,
    #[serde(default)]
    invalidity_reason: Option<InvalidityReason>,
}

fn one() -> i64 {
    1
}

impl From<Portal> for PortalRecord {
    fn from(p: Portal) -> Self {
        let is_valid = p.is_valid();
        PortalRecord {
            id: p.id,
            source_map: p.source_map,
            object_type: p.object_type,
            x: p.x,
            y: p.y,
            width: p.width,
            height: p.height,
            target_map: p.properties.target_map,
            target_x: p.properties.target_x,
            target_y: p.properties.target_y,
            normal: p.normal,
            orientation: p.orientation,
            is_valid,
            invalidity_reason: p.invalidity_reason,
        }
    }
}

impl From<PortalRecord> for Portal {
    // `is_valid` is derived from `invalidity_reason`, so it is not read back.
    fn from(r: PortalRecord) -> Self {
        let properties = PortalProperties::new(r.target_map, r.target_x, r.target_y, r.normal.as_ref());
        Portal {
            id: r.id,
            source_map: r.source_map,
            object_type: r.object_type,
            x: r.x,
            y: r.y,
            width: r.width,
            height: r.height,
            properties,
            orientation: r.orientation,
            normal: r.normal,
            invalidity_reason: r.invalidity_reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Portal {
        let normal = NormalTag::Label("false".to_string());
        Portal {
            id: "p1".to_string(),
            source_map: "M1".to_string(),
            object_type: Some(ObjectType::Code(5)),
            x: 10,
            y: 20,
            width: 1,
            height: 2,
            properties: PortalProperties::new(Some("M2".to_string()), 5, 6, Some(&normal)),
            orientation: Some("north".to_string()),
            normal: Some(normal),
            invalidity_reason: None,
        }
    }

    #[test]
    fn serializes_flat_record_in_attribute_order() {
        let value = serde_json::to_value(sample()).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec![
                "id",
                "source_map",
                "type",
                "x",
                "y",
                "width",
                "height",
                "target_map",
                "target_x",
                "target_y",
                "normal",
                "orientation",
                "is_valid",
                "invalidity_reason"
            ]
        );
        assert_eq!(value["type"], json!(5));
        assert_eq!(value["is_valid"], json!(true));
        assert_eq!(value["invalidity_reason"], Value::Null);
    }

    #[test]
    fn record_reads_back_equal() {
        let portal = sample();
        let text = serde_json::to_string(&portal).unwrap();
        let back: Portal = serde_json::from_str(&text).unwrap();
        assert_eq!(back, portal);
        assert_eq!(back.properties.normal, Some(false));
    }

    #[test]
    fn invalidity_reason_wire_names() {
        assert_eq!(
            serde_json::to_value(InvalidityReason::MissingTargetMap).unwrap(),
            json!("missing_target_map")
        );
        assert_eq!(InvalidityReason::SchemaError.to_string(), "schema_error");
    }

    #[test]
    fn empty_target_map_is_no_target() {
        let props = PortalProperties::new(Some(String::new()), 0, 0, None);
        assert_eq!(props.target(), None);
    }
}
