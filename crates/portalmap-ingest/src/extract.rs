//! Per-map portal extraction.
//!
//! Objects are visited in delivery order and portals come out in the same
//! order. A portal that cannot be fully projected is kept (flagged
//! `schema_error`) and reported as a diagnostic; one bad object never aborts
//! the map.

use portalmap_model::{MapDetail, Portal, Result, SpaceId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, warn};

use crate::classify::{is_portal, matched_rules};
use crate::fetch::MapFetcher;
use crate::normalize::Normalizer;

/// An object that was classified as a portal but could not be fully projected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionDiagnostic {
    pub map_id: String,
    pub object_id: Option<String>,
    pub cause: String,
}

/// A portal plus the attribute names present on the raw object it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedPortal {
    pub portal: Portal,
    pub observed_attributes: BTreeSet<String>,
}

#[derive(Debug, Clone)]
pub struct MapExtraction {
    pub map: MapDetail,
    pub portals: Vec<ExtractedPortal>,
    pub diagnostics: Vec<ExtractionDiagnostic>,
}

impl MapExtraction {
    pub fn map_id(&self) -> &str {
        &self.map.id
    }

    pub fn portals(&self) -> impl Iterator<Item = &Portal> {
        self.portals.iter().map(|p| &p.portal)
    }

    pub fn portal_records(&self) -> Vec<Portal> {
        self.portals().cloned().collect()
    }
}

/// Fetches maps and extracts their portals.
pub struct PortalExtractor<'a, F: ?Sized> {
    fetcher: &'a F,
    normalizer: Normalizer,
}

impl<'a, F: MapFetcher + ?Sized> PortalExtractor<'a, F> {
    pub fn new(fetcher: &'a F) -> Self {
        Self {
            fetcher,
            normalizer: Normalizer::default(),
        }
    }

    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Fetch `map_id` and extract its portals.
    ///
    /// Fetch failures are returned with the map id attached. The extraction
    /// is keyed by the requested id even when the document names another; the
    /// dumped document itself is left untouched.
    pub fn extract(&self, space_id: &SpaceId, map_id: &str) -> Result<MapExtraction> {
        let mut map = self
            .fetcher
            .fetch_map(space_id, map_id)
            .map_err(|e| e.with_map_id(map_id))?;
        if map.id != map_id {
            warn!(map_id, document_id = %map.id, "map document names a different id");
            map.id = map_id.to_string();
        }
        Ok(extract_portals(map, self.normalizer))
    }
}

/// Classify and normalize every object of an already fetched map.
pub fn extract_portals(map: MapDetail, normalizer: Normalizer) -> MapExtraction {
    let mut portals = Vec::new();
    let mut diagnostics = Vec::new();

    for raw in &map.objects {
        if !is_portal(raw) {
            continue;
        }
        let observed_attributes = raw.attribute_names();
        let portal = match normalizer.normalize(raw, &map.id) {
            Ok(portal) => {
                debug!(
                    map_id = %map.id,
                    object_id = %portal.id,
                    rules = ?matched_rules(raw),
                    valid = portal.is_valid(),
                    "portal extracted"
                );
                portal
            }
            Err(err) => {
                warn!(
                    map_id = %map.id,
                    object_id = ?raw.id,
                    cause = err.cause(),
                    "portal projection failed"
                );
                diagnostics.push(ExtractionDiagnostic {
                    map_id: map.id.clone(),
                    object_id: raw.id.clone(),
                    cause: err.cause().to_string(),
                });
                err.into_portal()
            }
        };
        portals.push(ExtractedPortal {
            portal,
            observed_attributes,
        });
    }

    debug!(
        map_id = %map.id,
        objects = map.objects.len(),
        portals = portals.len(),
        faults = diagnostics.len(),
        "map extracted"
    );

    MapExtraction {
        map,
        portals,
        diagnostics,
    }
}
