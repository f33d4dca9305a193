//! Spaces, map listings, and map documents.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::error::{Error, Result};
use crate::object::{json_kind, keys, RawObject};

/// Separates the opaque primary id from the human-readable name in a space id.
pub const SPACE_ID_SEPARATOR: char = '\\';

/// Opaque space identifier, e.g. `aBc123\Town Hall`.
///
/// Both halves are significant to the remote API and are transmitted verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpaceId(String);

impl SpaceId {
    pub fn new(id: impl Into<String>) -> Self {
        SpaceId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn primary(&self) -> &str {
        self.0
            .split_once(SPACE_ID_SEPARATOR)
            .map_or(self.0.as_str(), |(primary, _)| primary)
    }

    pub fn name(&self) -> Option<&str> {
        self.0.split_once(SPACE_ID_SEPARATOR).map(|(_, name)| name)
    }
}

impl fmt::Display for SpaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SpaceId {
    fn from(s: &str) -> Self {
        SpaceId::new(s)
    }
}

impl From<String> for SpaceId {
    fn from(s: String) -> Self {
        SpaceId(s)
    }
}

/// One entry of a space's map listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapSummary {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl MapSummary {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
        }
    }

    /// Accepts `{id, name?}` objects and bare id strings.
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::String(id) => Ok(MapSummary::new(id.clone())),
            Value::Object(fields) => {
                let id = id_of(fields).ok_or_else(|| {
                    Error::schema(None, "map summary is missing a string `id`")
                })?;
                let name = fields
                    .get("name")
                    .and_then(Value::as_str)
                    .map(str::to_string);
                Ok(MapSummary { id, name })
            }
            other => Err(Error::schema(
                None,
                format!("map summary must be an object or string, got {}", json_kind(other)),
            )),
        }
    }

    /// Decode a map listing: a bare array, or an object wrapping a `maps` array.
    pub fn list_from_value(value: &Value) -> Result<Vec<Self>> {
        let entries = match value {
            Value::Array(items) => items,
            Value::Object(fields) => match fields.get("maps") {
                Some(Value::Array(items)) => items,
                _ => {
                    return Err(Error::schema(
                        None,
                        "map listing object has no `maps` array",
                    ))
                }
            },
            other => {
                return Err(Error::schema(
                    None,
                    format!("map listing must be an array, got {}", json_kind(other)),
                ))
            }
        };
        entries.iter().map(MapSummary::from_value).collect()
    }
}

/// A fetched map: its id, optional name, and objects in delivery order.
///
/// The decoded document is kept alongside the typed view so it can be dumped
/// exactly as received.
#[derive(Debug, Clone, PartialEq)]
pub struct MapDetail {
    pub id: String,
    pub name: Option<String>,
    pub objects: Vec<RawObject>,
    document: Value,
}

impl MapDetail {
    /// Project a decoded map document.
    ///
    /// `objects` may be an ordered list or a mapping keyed by object id; in the
    /// mapping case the key becomes the object's `id` unless the object already
    /// carries one. A missing or null `objects` is an empty map. `map_id` is used
    /// when the document has no `id` of its own and in error reports.
    pub fn from_document(map_id: &str, document: Value) -> Result<Self> {
        let fields = match &document {
            Value::Object(fields) => fields,
            other => {
                return Err(Error::schema(
                    Some(map_id),
                    format!("map document must be an object, got {}", json_kind(other)),
                ))
            }
        };

        let id = id_of(fields).unwrap_or_else(|| map_id.to_string());
        let name = fields
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string);
        let objects = match fields.get("objects") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(index, item)| match item {
                    Value::Object(obj) => Ok(RawObject::from_fields(obj.clone())),
                    other => Err(Error::schema(
                        Some(map_id),
                        format!("objects[{index}] must be an object, got {}", json_kind(other)),
                    )),
                })
                .collect::<Result<Vec<_>>>()?,
            Some(Value::Object(entries)) => entries
                .iter()
                .map(|(key, item)| match item {
                    Value::Object(obj) => {
                        let mut obj = obj.clone();
                        if obj.get(keys::ID).map_or(true, Value::is_null) {
                            obj.insert(keys::ID.to_string(), Value::String(key.clone()));
                        }
                        Ok(RawObject::from_fields(obj))
                    }
                    other => Err(Error::schema(
                        Some(map_id),
                        format!("objects[{key:?}] must be an object, got {}", json_kind(other)),
                    )),
                })
                .collect::<Result<Vec<_>>>()?,
            Some(other) => {
                return Err(Error::schema(
                    Some(map_id),
                    format!("objects must be a list or a mapping, got {}", json_kind(other)),
                ))
            }
        };

        Ok(MapDetail {
            id,
            name,
            objects,
            document,
        })
    }

    /// The document as received.
    pub fn document(&self) -> &Value {
        &self.document
    }

    pub fn summary(&self) -> MapSummary {
        MapSummary {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }
}

fn id_of(fields: &Map<String, Value>) -> Option<String> {
    match fields.get(keys::ID)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use serde_json::json;

    #[test]
    fn space_id_halves() {
        let space = SpaceId::new("aBc123\\Town Hall");
        assert_eq!(space.primary(), "aBc123");
        assert_eq!(space.name(), Some("Town Hall"));

        let bare = SpaceId::new("aBc123");
        assert_eq!(bare.primary(), "aBc123");
        assert_eq!(bare.name(), None);
    }

    #[test]
    fn listing_accepts_array_wrapper_and_strings() {
        let listed = MapSummary::list_from_value(&json!([
            {"id": "M1", "name": "Lobby"},
            "M2"
        ]))
        .unwrap();
        assert_eq!(listed[0].name.as_deref(), Some("Lobby"));
        assert_eq!(listed[1], MapSummary::new("M2"));

        let wrapped = MapSummary::list_from_value(&json!({"maps": [{"id": "M3"}]})).unwrap();
        assert_eq!(wrapped, vec![MapSummary::new("M3")]);

        let err = MapSummary::list_from_value(&json!({"id": "M1"})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaError);
    }

    #[test]
    fn mapping_objects_inject_key_as_id() {
        let detail = MapDetail::from_document(
            "M1",
            json!({
                "objects": {
                    "a": {"type": "portal", "x": 0, "y": 0, "targetMap": "M2"},
                    "b": {"id": "kept", "type": "image", "x": 1, "y": 1}
                }
            }),
        )
        .unwrap();

        assert_eq!(detail.id, "M1");
        let ids: Vec<_> = detail.objects.iter().map(|o| o.id.as_deref()).collect();
        assert_eq!(ids, vec![Some("a"), Some("kept")]);
    }

    #[test]
    fn list_and_mapping_forms_are_equivalent() {
        let as_list = MapDetail::from_document(
            "M1",
            json!({"id": "M1", "objects": [
                {"id": "z", "type": 4, "x": 1, "y": 2},
                {"id": "a", "type": "image", "x": 3, "y": 4}
            ]}),
        )
        .unwrap();
        let as_mapping = MapDetail::from_document(
            "M1",
            json!({"id": "M1", "objects": {
                "z": {"type": 4, "x": 1, "y": 2},
                "a": {"type": "image", "x": 3, "y": 4}
            }}),
        )
        .unwrap();

        // Key order in the mapping is delivery order, not sorted order.
        assert_eq!(as_list.objects, as_mapping.objects);
    }

    #[test]
    fn bad_objects_shape_is_a_schema_error_with_map_id() {
        let err = MapDetail::from_document("M9", json!({"objects": "nope"})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaError);
        assert_eq!(err.map_id(), Some("M9"));

        let err = MapDetail::from_document("M9", json!({"objects": [1]})).unwrap_err();
        assert!(err.to_string().contains("objects[0]"));
    }

    #[test]
    fn missing_objects_is_empty() {
        let detail = MapDetail::from_document("M1", json!({"id": "M1", "name": "Lobby"})).unwrap();
        assert!(detail.objects.is_empty());
        assert_eq!(detail.summary().name.as_deref(), Some("Lobby"));
    }
}
