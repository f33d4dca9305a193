//! Portalmap artifact storage
//!
//! Every analysis owns one session directory:
//!
//! ```text
//! <output>/<space_id>/
//!   maps/map_<map_id>.json              literal map document
//!   portals/portals_<map_id>.json       normalized portal records
//!   portals/portal_connections.json     source map → target maps
//!   portal_analysis.json                session report
//!   portals_<timestamp>.{json,csv}      explicit exports
//! ```
//!
//! All files are replaced atomically: a reader sees either the previous
//! content, the complete new content, or no file. Directory creation is
//! idempotent. The writer does no locking; concurrent sessions must use
//! distinct directories.

pub mod atomic;
pub mod export;
pub mod layout;
pub mod report;
pub mod writer;


pub use atomic::{write_atomic, write_json_pretty};
pub use export::{portals_to_csv, read_portals_json, ExportFormat, CSV_HEADER};
pub use layout::{safe_component, SessionLayout};
pub use report::SessionReport;
pub use writer::{ArtifactWriter, SessionArtifacts};
