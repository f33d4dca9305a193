//! Space-wide portal analysis for Portalmap
//!
//! `SpaceAnalyzer::analyze` lists a space's maps, extracts each map's portals,
//! and then, in a second pass over the collected portals, computes:
//! - the weighted map-to-map connection graph (valid portals only),
//! - the valid/invalid split,
//! - attribute frequency and directional-attribute statistics (all portals).
//!
//! Per-map fetch failures follow one policy: `not_found` skips the map, every
//! other failure aborts the analysis. Cancellation is cooperative and checked
//! before each fetch.

pub mod analyzer;
pub mod cancel;
pub mod report;
pub mod stats;

pub use analyzer::{AnalyzeOptions, SpaceAnalyzer};
pub use cancel::CancellationToken;
pub use report::{InvalidPortal, MapPortals, MapReport, PortalsByMap, SkippedMap, SpaceReport, ValidationSummary};
pub use stats::{connections, directional_analysis, property_frequency, validation_summary, DIRECTIONAL_CANDIDATES};
