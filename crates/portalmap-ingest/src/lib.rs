//! Portal discovery for Portalmap
//!
//! Turns a fetched map into portal records:
//! - `classify`: does a raw object look like a portal (permissive rule)?
//! - `normalize`: project a portal-like object into a canonical `Portal`,
//!   filling defaults and recording why it is invalid,
//! - `fetch`: the `MapFetcher` contract implemented by transport crates,
//! - `extract`: fetch one map and run classify + normalize over its objects
//!   in delivery order, collecting per-object faults instead of aborting.

pub mod classify;
pub mod extract;
pub mod fetch;
pub mod normalize;

pub use classify::{is_portal, matched_rules, PortalRule, PORTAL_TYPE_CODES, PORTAL_TYPE_TAG};
pub use extract::{extract_portals, ExtractedPortal, ExtractionDiagnostic, MapExtraction, PortalExtractor};
pub use fetch::{InMemoryFetcher, MapFetcher};
pub use normalize::{normalize, Normalizer, ProjectionError};
