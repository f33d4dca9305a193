//! Pure second-pass computations over collected portals.

use portalmap_model::{
    keys, ConnectionEdge, DirectionalAnalysis, DirectionalProperty, Portal, PropertyFrequency,
    PropertyStat,
};
use std::collections::{BTreeSet, HashMap};

use crate::report::{InvalidPortal, ValidationSummary};

/// Attributes checked for direction-like variation across a space.
pub const DIRECTIONAL_CANDIDATES: [&str; 2] = [keys::NORMAL, keys::ORIENTATION];

/// One edge per distinct `(source_map, target_map)` over valid portals.
///
/// Edges appear in the order their first portal was discovered.
pub fn connections<'a>(portals: impl IntoIterator<Item = &'a Portal>) -> Vec<ConnectionEdge> {
    let mut edges: Vec<ConnectionEdge> = Vec::new();
    let mut index: HashMap<(String, String), usize> = HashMap::new();

    for portal in portals {
        if !portal.is_valid() {
            continue;
        }
        let Some(target) = portal.target_map() else {
            continue;
        };
        let key = (portal.source_map.clone(), target.to_string());
        match index.get(&key) {
            Some(&i) => edges[i].portal_count += 1,
            None => {
                index.insert(key, edges.len());
                edges.push(ConnectionEdge {
                    source_map: portal.source_map.clone(),
                    target_map: target.to_string(),
                    portal_count: 1,
                });
            }
        }
    }
    edges
}

pub fn validation_summary<'a>(portals: impl IntoIterator<Item = &'a Portal>) -> ValidationSummary {
    let mut summary = ValidationSummary::default();
    for portal in portals {
        match portal.invalidity_reason {
            None => summary.valid.push(portal.clone()),
            Some(reason) => summary.invalid.push(InvalidPortal {
                portal: portal.clone(),
                reason,
            }),
        }
    }
    summary
}

/// How many portals carry each attribute name.
///
/// `total_portals` is the denominator; a zero total reports 0.0%.
pub fn property_frequency<'a>(
    attribute_sets: impl IntoIterator<Item = &'a BTreeSet<String>>,
    total_portals: usize,
) -> PropertyFrequency {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for names in attribute_sets {
        for name in names {
            *counts.entry(name.as_str()).or_default() += 1;
        }
    }
    counts
        .into_iter()
        .map(|(name, count)| {
            (
                name.to_string(),
                PropertyStat {
                    count,
                    percentage: percentage(count, total_portals),
                },
            )
        })
        .collect()
}

/// Distinct non-null values of each directional candidate.
pub fn directional_analysis<'a>(portals: impl IntoIterator<Item = &'a Portal>) -> DirectionalAnalysis {
    let portals: Vec<&Portal> = portals.into_iter().collect();
    DIRECTIONAL_CANDIDATES
        .into_iter()
        .map(|name| {
            let values: BTreeSet<String> = portals
                .iter()
                .filter_map(|p| directional_value(p, name))
                .collect();
            (
                name.to_string(),
                DirectionalProperty {
                    appears_directional: values.len() > 1,
                    values,
                },
            )
        })
        .collect()
}

fn directional_value(portal: &Portal, name: &str) -> Option<String> {
    match name {
        keys::NORMAL => portal.normal.as_ref().map(ToString::to_string),
        keys::ORIENTATION => portal.orientation.clone(),
        _ => None,
    }
}

fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let raw = 100.0 * count as f64 / total as f64;
    (raw * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use portalmap_model::{InvalidityReason, NormalTag, PortalProperties};

    fn portal(id: &str, source: &str, target: Option<&str>) -> Portal {
        let invalidity_reason = match target {
            Some(t) if !t.is_empty() => None,
            _ => Some(InvalidityReason::MissingTargetMap),
        };
        Portal {
            id: id.to_string(),
            source_map: source.to_string(),
            object_type: None,
            x: 0,
            y: 0,
            width: 1,
            height: 1,
            properties: PortalProperties::new(target.map(str::to_string), 0, 0, None),
            orientation: None,
            normal: None,
            invalidity_reason,
        }
    }

    #[test]
    fn collapses_parallel_portals_into_one_weighted_edge() {
        let portals = vec![
            portal("a", "M1", Some("M2")),
            portal("b", "M2", Some("M1")),
            portal("c", "M1", Some("M2")),
            portal("d", "M1", None),
        ];
        let edges = connections(&portals);
        assert_eq!(
            edges,
            vec![
                ConnectionEdge {
                    source_map: "M1".to_string(),
                    target_map: "M2".to_string(),
                    portal_count: 2
                },
                ConnectionEdge {
                    source_map: "M2".to_string(),
                    target_map: "M1".to_string(),
                    portal_count: 1
                },
            ]
        );
    }

    #[test]
    fn schema_error_portals_are_not_connections() {
        let mut broken = portal("a", "M1", Some("M2"));
        broken.invalidity_reason = Some(InvalidityReason::SchemaError);
        assert!(connections([&broken]).is_empty());

        let summary = validation_summary([&broken]);
        assert!(summary.valid.is_empty());
        assert_eq!(summary.invalid[0].reason, InvalidityReason::SchemaError);
    }

    #[test]
    fn frequency_rounds_to_one_decimal() {
        let a: BTreeSet<String> = ["x", "targetMap"].iter().map(|s| s.to_string()).collect();
        let b: BTreeSet<String> = ["x"].iter().map(|s| s.to_string()).collect();
        let c = b.clone();
        let freq = property_frequency([&a, &b, &c], 3);
        assert_eq!(freq["x"].count, 3);
        assert_eq!(freq["x"].percentage, 100.0);
        assert_eq!(freq["targetMap"].count, 1);
        assert_eq!(freq["targetMap"].percentage, 33.3);
    }

    #[test]
    fn zero_portals_report_zero_percent() {
        assert!(property_frequency(std::iter::empty(), 0).is_empty());
        assert_eq!(percentage(0, 0), 0.0);
    }

    #[test]
    fn directional_needs_two_distinct_values() {
        let mut a = portal("a", "M1", Some("M2"));
        a.normal = Some(NormalTag::Flag(true));
        a.orientation = Some("north".to_string());
        let mut b = portal("b", "M1", Some("M2"));
        b.normal = Some(NormalTag::Flag(false));
        b.orientation = Some("north".to_string());

        let analysis = directional_analysis([&a, &b]);
        assert!(analysis["normal"].appears_directional);
        assert_eq!(analysis["normal"].values.len(), 2);
        assert!(!analysis["orientation"].appears_directional);

        let empty = directional_analysis(std::iter::empty());
        assert_eq!(empty.len(), DIRECTIONAL_CANDIDATES.len());
        assert!(empty.values().all(|d| !d.appears_directional && d.values.is_empty()));
    }
}
