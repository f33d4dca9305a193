//! Map-to-map portal graph and per-space statistics.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Weighted directed edge: `portal_count` valid portals lead from `source_map`
/// to `target_map`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionEdge {
    pub source_map: String,
    pub target_map: String,
    pub portal_count: usize,
}

/// Source map id → target map ids, deduplicated, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionSummary(BTreeMap<String, Vec<String>>);

impl ConnectionSummary {
    pub fn from_edges(edges: &[ConnectionEdge]) -> Self {
        let mut out: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for edge in edges {
            let targets = out.entry(edge.source_map.clone()).or_default();
            if !targets.contains(&edge.target_map) {
                targets.push(edge.target_map.clone());
            }
        }
        ConnectionSummary(out)
    }

    pub fn targets(&self, source_map: &str) -> &[String] {
        self.0.get(source_map).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PropertyStat {
    pub count: usize,
    /// `100 * count / total_portals`, one decimal place.
    pub percentage: f64,
}

/// Attribute name → how many portals carry it.
pub type PropertyFrequency = BTreeMap<String, PropertyStat>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionalProperty {
    /// More than one distinct non-null value was observed.
    pub appears_directional: bool,
    pub values: BTreeSet<String>,
}

/// Candidate directional attribute → observed values.
pub type DirectionalAnalysis = BTreeMap<String, DirectionalProperty>;
