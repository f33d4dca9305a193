//! Raw map objects as delivered by the remote API.
//!
//! The wire schema is loose: `type` is sometimes a string and sometimes an
//! integer, coordinates may be missing, and portal targets live either at the
//! top level or under a nested `properties` document. `RawObject` keeps the
//! handful of attributes every object shares as typed fields and carries
//! everything else (including known keys whose value had an unexpected shape)
//! in `extra`, so nothing the remote sent is lost before classification.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fmt;

use crate::error::{Error, Result};

/// Attribute names used by the remote API.
pub mod keys {
    pub const ID: &str = "id";
    pub const TYPE: &str = "type";
    pub const X: &str = "x";
    pub const Y: &str = "y";
    pub const WIDTH: &str = "width";
    pub const HEIGHT: &str = "height";
    pub const PROPERTIES: &str = "properties";
    pub const TARGET_MAP: &str = "targetMap";
    pub const TARGET_X: &str = "targetX";
    pub const TARGET_Y: &str = "targetY";
    pub const NORMAL: &str = "normal";
    pub const ORIENTATION: &str = "orientation";
    pub const IS_PORTAL: &str = "isPortal";

    /// Prefix used when reporting nested `properties` keys as attribute names.
    pub const NESTED_PREFIX: &str = "properties.";
}

/// The `type` attribute of a raw object, kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ObjectType {
    Code(i64),
    Tag(String),
}

impl ObjectType {
    /// Read a `type` value; anything other than a string or an integer is not a type.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(ObjectType::Tag(s.clone())),
            Value::Number(_) => as_integer(value).map(ObjectType::Code),
            _ => None,
        }
    }

    pub fn as_tag(&self) -> Option<&str> {
        match self {
            ObjectType::Tag(tag) => Some(tag),
            ObjectType::Code(_) => None,
        }
    }

    pub fn as_code(&self) -> Option<i64> {
        match self {
            ObjectType::Code(code) => Some(*code),
            ObjectType::Tag(_) => None,
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectType::Code(code) => write!(f, "{code}"),
            ObjectType::Tag(tag) => f.write_str(tag),
        }
    }
}

/// An untyped placement on a map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawObject {
    pub id: Option<String>,
    pub object_type: Option<ObjectType>,
    pub x: Option<i64>,
    pub y: Option<i64>,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub properties: Option<Map<String, Value>>,
    /// Attributes not captured above, in delivery order.
    pub extra: Map<String, Value>,
}

impl RawObject {
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(Self::from_fields(fields)),
            other => Err(Error::schema(
                None,
                format!("map object must be a JSON object, got {}", json_kind(&other)),
            )),
        }
    }

    /// Split a decoded JSON object into typed fields and the open remainder.
    ///
    /// Null values are treated as absent. A known key whose value has the wrong
    /// shape stays in `extra` under its own name.
    pub fn from_fields(fields: Map<String, Value>) -> Self {
        let mut raw = RawObject::default();
        for (key, value) in fields {
            if value.is_null() {
                continue;
            }
            let leftover = match key.as_str() {
                keys::ID => match value {
                    Value::String(s) => {
                        raw.id = Some(s);
                        None
                    }
                    Value::Number(n) => {
                        raw.id = Some(n.to_string());
                        None
                    }
                    other => Some(other),
                },
                keys::TYPE => match ObjectType::from_value(&value) {
                    Some(t) => {
                        raw.object_type = Some(t);
                        None
                    }
                    None => Some(value),
                },
                keys::X => set_integer(&mut raw.x, value),
                keys::Y => set_integer(&mut raw.y, value),
                keys::WIDTH => set_integer(&mut raw.width, value),
                keys::HEIGHT => set_integer(&mut raw.height, value),
                keys::PROPERTIES => match value {
                    Value::Object(map) => {
                        raw.properties = Some(map);
                        None
                    }
                    other => Some(other),
                },
                _ => Some(value),
            };
            if let Some(value) = leftover {
                raw.extra.insert(key, value);
            }
        }
        raw
    }

    pub fn width_or_default(&self) -> i64 {
        self.width.unwrap_or(1)
    }

    pub fn height_or_default(&self) -> i64 {
        self.height.unwrap_or(1)
    }

    /// Top-level attribute outside the typed fields (non-null by construction).
    pub fn top_level(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// Nested attribute from `properties`, ignoring nulls.
    pub fn nested(&self, key: &str) -> Option<&Value> {
        self.properties
            .as_ref()
            .and_then(|props| props.get(key))
            .filter(|v| !v.is_null())
    }

    /// Names of the attributes present on this object.
    ///
    /// Top-level attributes are reported by name, nested ones as
    /// `properties.<key>`. The `properties` container itself is not counted.
    pub fn attribute_names(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        let typed = [
            (keys::ID, self.id.is_some()),
            (keys::TYPE, self.object_type.is_some()),
            (keys::X, self.x.is_some()),
            (keys::Y, self.y.is_some()),
            (keys::WIDTH, self.width.is_some()),
            (keys::HEIGHT, self.height.is_some()),
        ];
        for (name, present) in typed {
            if present {
                names.insert(name.to_string());
            }
        }
        names.extend(self.extra.keys().cloned());
        if let Some(props) = &self.properties {
            for (key, value) in props {
                if !value.is_null() {
                    names.insert(format!("{}{key}", keys::NESTED_PREFIX));
                }
            }
        }
        names
    }
}

fn set_integer(slot: &mut Option<i64>, value: Value) -> Option<Value> {
    match as_integer(&value) {
        Some(n) => {
            *slot = Some(n);
            None
        }
        None => Some(value),
    }
}

/// Read an integer, accepting floats with no fractional part (`5.0`).
pub fn as_integer(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    let f = value.as_f64()?;
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
