use portalmap_analysis::{AnalyzeOptions, SpaceAnalyzer};
use portalmap_ingest::InMemoryFetcher;
use portalmap_model::SpaceId;
use proptest::prelude::*;
use serde_json::{json, Value};
use std::collections::{BTreeMap, BTreeSet};

/// Per map, the target of each portal: `None` for no `targetMap`, `Some("")`
/// for an empty one.
type Space = Vec<Vec<Option<String>>>;

fn target() -> impl Strategy<Value = Option<String>> {
    proptest::option::of(prop_oneof![
        Just(String::new()),
        (0usize..6).prop_map(|i| format!("M{i}")),
    ])
}

fn space() -> impl Strategy<Value = Space> {
    proptest::collection::vec(proptest::collection::vec(target(), 0..6), 0..5)
}

fn fetcher(space: &Space) -> InMemoryFetcher {
    space
        .iter()
        .enumerate()
        .fold(InMemoryFetcher::new(), |fetcher, (i, targets)| {
            let objects: Vec<Value> = targets
                .iter()
                .enumerate()
                .flat_map(|(k, target)| {
                    let mut portal = json!({"type": "portal", "x": k, "y": i});
                    if let Some(t) = target {
                        portal["targetMap"] = json!(t);
                    }
                    [portal, json!({"type": "image", "x": k, "y": i})]
                })
                .collect();
            fetcher.with_map(&format!("M{i}"), json!({"objects": objects}))
        })
}

fn expected_edges(space: &Space) -> BTreeMap<(String, String), usize> {
    let mut edges = BTreeMap::new();
    for (i, targets) in space.iter().enumerate() {
        for target in targets.iter().flatten().filter(|t| !t.is_empty()) {
            *edges.entry((format!("M{i}"), target.clone())).or_insert(0) += 1;
        }
    }
    edges
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn edge_counts_match_valid_portals(space in space()) {
        let report = SpaceAnalyzer::new(fetcher(&space))
            .analyze(&SpaceId::new("s"))
            .unwrap();

        let pairs: BTreeSet<_> = report
            .connections
            .iter()
            .map(|e| (e.source_map.clone(), e.target_map.clone()))
            .collect();
        prop_assert_eq!(pairs.len(), report.connections.len());

        let actual: BTreeMap<_, _> = report
            .connections
            .iter()
            .map(|e| ((e.source_map.clone(), e.target_map.clone()), e.portal_count))
            .collect();
        prop_assert_eq!(actual, expected_edges(&space));

        let total: usize = space.iter().map(Vec::len).sum();
        prop_assert_eq!(report.total_portals(), total);
        for entry in report.portals_by_map.iter() {
            for portal in &entry.portals {
                prop_assert_eq!(&portal.source_map, &entry.map_id);
            }
        }
    }

    #[test]
    fn parallel_fetch_does_not_change_the_graph(space in space()) {
        let sequential = SpaceAnalyzer::new(fetcher(&space))
            .analyze(&SpaceId::new("s"))
            .unwrap();
        let parallel = SpaceAnalyzer::new(fetcher(&space))
            .with_options(AnalyzeOptions {
                parallel: true,
                ..AnalyzeOptions::default()
            })
            .analyze(&SpaceId::new("s"))
            .unwrap();

        prop_assert_eq!(parallel.connections, sequential.connections);
        prop_assert_eq!(parallel.validation_summary, sequential.validation_summary);
    }
}
