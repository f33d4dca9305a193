use chrono::{DateTime, Utc};
use portalmap_analysis::{SkippedMap, SpaceReport};
use portalmap_ingest::ExtractionDiagnostic;
use portalmap_model::{ConnectionEdge, DirectionalAnalysis, PropertyFrequency};
use serde::{Deserialize, Serialize};

/// Contents of `portal_analysis.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub space_id: String,
    pub generated_at: DateTime<Utc>,
    pub total_maps: usize,
    pub total_portals: usize,
    pub valid_portals: usize,
    pub invalid_portals: usize,
    pub property_frequency: PropertyFrequency,
    pub directional_analysis: DirectionalAnalysis,
    pub connections: Vec<ConnectionEdge>,
    #[serde(default)]
    pub skipped_maps: Vec<SkippedMap>,
    #[serde(default)]
    pub diagnostics: Vec<ExtractionDiagnostic>,
}

impl SessionReport {
    pub fn from_space(report: &SpaceReport, generated_at: DateTime<Utc>) -> Self {
        Self {
            space_id: report.space_id.to_string(),
            generated_at,
            total_maps: report.total_maps(),
            total_portals: report.total_portals(),
            valid_portals: report.validation_summary.valid.len(),
            invalid_portals: report.validation_summary.invalid.len(),
            property_frequency: report.property_frequency.clone(),
            directional_analysis: report.directional_analysis.clone(),
            connections: report.connections.clone(),
            skipped_maps: report.skipped_maps.clone(),
            diagnostics: report.diagnostics.clone(),
        }
    }
}
