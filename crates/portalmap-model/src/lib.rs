//! Portalmap value types
//!
//! A *space* is a set of named maps; each map holds placed objects, and some of
//! those objects are portals that teleport a visitor into another map. This
//! crate defines:
//! - the raw object shape delivered by the remote API (`RawObject`, `ObjectType`),
//! - the canonical portal record (`Portal`, `PortalProperties`, `InvalidityReason`),
//! - map listings and map documents (`MapSummary`, `MapDetail`, `SpaceId`),
//! - the graph/statistics value types shared by analysis and storage,
//! - the error taxonomy surfaced to callers (`Error`, `ErrorKind`).
//!
//! Constructors here only check structural shape. Whether an object is a
//! portal, and whether a portal is valid, is decided by `portalmap-ingest`.

pub mod error;
pub mod graph;
pub mod map;
pub mod object;
pub mod portal;

pub use error::{Error, ErrorKind, Result};
pub use graph::{
    ConnectionEdge, ConnectionSummary, DirectionalAnalysis, DirectionalProperty,
    PropertyFrequency, PropertyStat,
};
pub use map::{MapDetail, MapSummary, SpaceId, SPACE_ID_SEPARATOR};
pub use object::{keys, ObjectType, RawObject};
pub use portal::{InvalidityReason, NormalTag, Portal, PortalProperties};
