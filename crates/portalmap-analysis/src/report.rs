//! Analysis results.

use portalmap_ingest::ExtractionDiagnostic;
use portalmap_model::{
    ConnectionEdge, ConnectionSummary, DirectionalAnalysis, InvalidityReason, MapDetail,
    MapSummary, Portal, PropertyFrequency, SpaceId,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidPortal {
    pub portal: Portal,
    pub reason: InvalidityReason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub valid: Vec<Portal>,
    pub invalid: Vec<InvalidPortal>,
}

/// A listed map left out of the analysis because the remote no longer has it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedMap {
    pub map_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapPortals {
    pub map_id: String,
    pub portals: Vec<Portal>,
}

/// Map id → portals, in map listing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortalsByMap(Vec<MapPortals>);

impl PortalsByMap {
    pub fn push(&mut self, map_id: String, portals: Vec<Portal>) {
        self.0.push(MapPortals { map_id, portals });
    }

    pub fn get(&self, map_id: &str) -> Option<&[Portal]> {
        self.0
            .iter()
            .find(|m| m.map_id == map_id)
            .map(|m| m.portals.as_slice())
    }

    pub fn contains_map(&self, map_id: &str) -> bool {
        self.get(map_id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MapPortals> {
        self.0.iter()
    }

    pub fn map_ids(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|m| m.map_id.as_str())
    }

    /// Every portal in discovery order: maps in listing order, portals in
    /// delivery order within a map.
    pub fn all_portals(&self) -> impl Iterator<Item = &Portal> {
        self.0.iter().flat_map(|m| m.portals.iter())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Result of analyzing a whole space.
#[derive(Debug, Clone)]
pub struct SpaceReport {
    pub space_id: SpaceId,
    /// The map listing, including skipped maps.
    pub maps: Vec<MapSummary>,
    /// Fetched map documents, in listing order.
    pub map_details: Vec<MapDetail>,
    pub portals_by_map: PortalsByMap,
    pub connections: Vec<ConnectionEdge>,
    pub validation_summary: ValidationSummary,
    pub property_frequency: PropertyFrequency,
    pub directional_analysis: DirectionalAnalysis,
    pub diagnostics: Vec<ExtractionDiagnostic>,
    pub skipped_maps: Vec<SkippedMap>,
}

impl SpaceReport {
    pub fn total_maps(&self) -> usize {
        self.maps.len()
    }

    pub fn total_portals(&self) -> usize {
        self.portals_by_map.all_portals().count()
    }

    pub fn all_portals(&self) -> impl Iterator<Item = &Portal> {
        self.portals_by_map.all_portals()
    }

    pub fn connection_summary(&self) -> ConnectionSummary {
        ConnectionSummary::from_edges(&self.connections)
    }
}

/// Result of analyzing a single map.
#[derive(Debug, Clone)]
pub struct MapReport {
    pub space_id: SpaceId,
    pub map: MapDetail,
    pub portals: Vec<Portal>,
    pub connections: Vec<ConnectionEdge>,
    pub validation_summary: ValidationSummary,
    pub diagnostics: Vec<ExtractionDiagnostic>,
}

impl MapReport {
    pub fn map_id(&self) -> &str {
        &self.map.id
    }
}
