//! Projection of portal-like raw objects into canonical [`Portal`] records.
//!
//! Precedence: a top-level attribute wins over the same key under
//! `properties`; a null top-level value counts as absent. Attributes not
//! consumed here are dropped.
//!
//! Validity:
//! - valid iff `target_map` is a non-empty string (permissive mode),
//! - otherwise the first missing required field names the reason
//!   (`missing_target_map`, then `missing_target_x` / `missing_target_y`,
//!   which are only required in strict mode),
//! - a value with the wrong shape anywhere in the projection yields
//!   `schema_error`; the portal is still produced from whatever could be read.

use portalmap_model::object::as_integer;
use portalmap_model::{keys, InvalidityReason, NormalTag, Portal, PortalProperties, RawObject};
use serde_json::Value;

/// The object could not be fully projected.
///
/// Carries the partially extracted portal, already flagged `schema_error`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("cannot project object `{}` into a portal: {cause}", .portal.id)]
pub struct ProjectionError {
    portal: Box<Portal>,
    cause: String,
}

impl ProjectionError {
    pub fn portal(&self) -> &Portal {
        &self.portal
    }

    pub fn cause(&self) -> &str {
        &self.cause
    }

    pub fn into_portal(self) -> Portal {
        *self.portal
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Normalizer {
    require_target_coordinates: bool,
}

impl Normalizer {
    /// `targetX`/`targetY` default to 0 when absent.
    pub fn permissive() -> Self {
        Self {
            require_target_coordinates: false,
        }
    }

    /// `targetX`/`targetY` must be present; absence makes the portal invalid.
    pub fn strict() -> Self {
        Self {
            require_target_coordinates: true,
        }
    }

    pub fn requires_target_coordinates(&self) -> bool {
        self.require_target_coordinates
    }

    pub fn normalize(&self, raw: &RawObject, source_map: &str) -> Result<Portal, ProjectionError> {
        let mut faults = Faults::default();

        let x = faults.integer_or(raw, raw.x, keys::X, 0);
        let y = faults.integer_or(raw, raw.y, keys::Y, 0);
        let width = faults.integer_or(raw, raw.width, keys::WIDTH, 1);
        let height = faults.integer_or(raw, raw.height, keys::HEIGHT, 1);

        if raw.top_level(keys::ID).is_some() {
            faults.push("`id` is not a string or number");
        }
        let id = raw
            .id
            .clone()
            .unwrap_or_else(|| synthesize_id(source_map, x, y));

        let target_map = match resolve(raw, keys::TARGET_MAP) {
            None => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                faults.push("`targetMap` is not a string");
                None
            }
        };
        let (target_x, has_target_x) = faults.target_coordinate(raw, keys::TARGET_X);
        let (target_y, has_target_y) = faults.target_coordinate(raw, keys::TARGET_Y);

        let normal = match resolve(raw, keys::NORMAL) {
            None => None,
            Some(value) => {
                let tag = NormalTag::from_value(value);
                if tag.is_none() {
                    faults.push("`normal` is not a boolean or label");
                }
                tag
            }
        };
        let orientation = match resolve(raw, keys::ORIENTATION) {
            None => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            Some(_) => {
                faults.push("`orientation` is not a string");
                None
            }
        };

        let properties = PortalProperties::new(target_map, target_x, target_y, normal.as_ref());
        let invalidity_reason = if !faults.is_empty() {
            Some(InvalidityReason::SchemaError)
        } else if properties.target().is_none() {
            Some(InvalidityReason::MissingTargetMap)
        } else if self.require_target_coordinates && !has_target_x {
            Some(InvalidityReason::MissingTargetX)
        } else if self.require_target_coordinates && !has_target_y {
            Some(InvalidityReason::MissingTargetY)
        } else {
            None
        };

        let portal = Portal {
            id,
            source_map: source_map.to_string(),
            object_type: raw.object_type.clone(),
            x,
            y,
            width,
            height,
            properties,
            orientation,
            normal,
            invalidity_reason,
        };

        if faults.is_empty() {
            Ok(portal)
        } else {
            Err(ProjectionError {
                portal: Box::new(portal),
                cause: faults.into_cause(),
            })
        }
    }
}

/// [`Normalizer::permissive`] projection.
pub fn normalize(raw: &RawObject, source_map: &str) -> Result<Portal, ProjectionError> {
    Normalizer::permissive().normalize(raw, source_map)
}

/// Id for objects delivered without one; stable for a given map and position.
fn synthesize_id(source_map: &str, x: i64, y: i64) -> String {
    format!("{source_map}_portal_{x}_{y}")
}

fn resolve<'a>(raw: &'a RawObject, key: &str) -> Option<&'a Value> {
    raw.top_level(key).or_else(|| raw.nested(key))
}

#[derive(Default)]
struct Faults(Vec<String>);

impl Faults {
    fn push(&mut self, fault: impl Into<String>) {
        self.0.push(fault.into());
    }

    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn into_cause(self) -> String {
        self.0.join("; ")
    }

    /// A typed field, `default` when absent. A present value of the wrong
    /// shape lands in `extra` and is a fault.
    fn integer_or(&mut self, raw: &RawObject, value: Option<i64>, key: &str, default: i64) -> i64 {
        if value.is_none() && raw.top_level(key).is_some() {
            self.push(format!("`{key}` is not an integer"));
        }
        value.unwrap_or(default)
    }

    /// Returns the coordinate (0 when absent) and whether it was present.
    fn target_coordinate(&mut self, raw: &RawObject, key: &str) -> (i64, bool) {
        match resolve(raw, key) {
            None => (0, false),
            Some(value) => match as_integer(value) {
                Some(n) => (n, true),
                None => {
                    self.push(format!("`{key}` is not an integer"));
                    (0, true)
                }
            },
        }
    }
}
