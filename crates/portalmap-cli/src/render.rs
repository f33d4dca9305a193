//! Terminal output.

use colored::Colorize;
use portalmap_analysis::{MapReport, SpaceReport, ValidationSummary};
use portalmap_ingest::ExtractionDiagnostic;
use portalmap_model::{ConnectionEdge, MapSummary, Portal, SpaceId};
use portalmap_storage::SessionArtifacts;
use std::path::PathBuf;

pub fn map_line(map: &MapSummary) -> String {
    match &map.name {
        Some(name) => format!("{} ({name})", map.id),
        None => map.id.clone(),
    }
}

pub fn portal_line(portal: &Portal) -> String {
    let target = match portal.target_map() {
        Some(t) => format!(
            "{t} ({}, {})",
            portal.properties.target_x, portal.properties.target_y
        ),
        None => "-".to_string(),
    };
    format!(
        "{} @ ({}, {}) -> {target}",
        portal.id, portal.x, portal.y
    )
}

pub fn edge_line(edge: &ConnectionEdge) -> String {
    let noun = if edge.portal_count == 1 { "portal" } else { "portals" };
    format!(
        "{} -> {} [{} {noun}]",
        edge.source_map, edge.target_map, edge.portal_count
    )
}

pub fn print_map_list(space_id: &SpaceId, maps: &[MapSummary]) {
    println!("{} {}", "Space".bold(), space_id);
    for map in maps {
        println!("  {}", map_line(map));
    }
    println!("{} map(s)", maps.len());
}

pub fn print_map_report(report: &MapReport, written: &SessionArtifacts) {
    println!("{} {}", "Map".bold(), report.map_id());
    print_portals(&report.portals);
    print_connections(&report.connections);
    print_invalid(&report.validation_summary);
    print_diagnostics(&report.diagnostics);
    print_written(written.all());
}

pub fn print_space_report(report: &SpaceReport, written: &SessionArtifacts, exports: &[PathBuf]) {
    println!("{} {}", "Space".bold(), report.space_id);
    println!(
        "  maps: {}  portals: {}  valid: {}  invalid: {}",
        report.total_maps(),
        report.total_portals(),
        report.validation_summary.valid.len(),
        report.validation_summary.invalid.len()
    );
    print_connections(&report.connections);

    if !report.property_frequency.is_empty() {
        println!("{}", "Attributes".bold());
        for (name, stat) in &report.property_frequency {
            println!("  {name:<28} {:>5} {:>6.1}%", stat.count, stat.percentage);
        }
    }
    for (name, analysis) in &report.directional_analysis {
        if analysis.appears_directional {
            let values: Vec<&str> = analysis.values.iter().map(String::as_str).collect();
            println!("  {} `{name}` varies: {}", "directional".cyan(), values.join(", "));
        }
    }

    for skipped in &report.skipped_maps {
        println!(
            "{} map {} skipped: {}",
            "warning:".yellow().bold(),
            skipped.map_id,
            skipped.reason
        );
    }
    print_invalid(&report.validation_summary);
    print_diagnostics(&report.diagnostics);
    print_written(written.all().chain(exports));
}

pub fn print_exports(exports: &[PathBuf]) {
    print_written(exports.iter());
}

fn print_portals(portals: &[Portal]) {
    if portals.is_empty() {
        println!("  no portals");
        return;
    }
    for portal in portals {
        let line = portal_line(portal);
        if portal.is_valid() {
            println!("  {line}");
        } else {
            println!("  {}", line.dimmed());
        }
    }
}

fn print_connections(edges: &[ConnectionEdge]) {
    if edges.is_empty() {
        return;
    }
    println!("{}", "Connections".bold());
    for edge in edges {
        println!("  {}", edge_line(edge));
    }
}

fn print_invalid(summary: &ValidationSummary) {
    for invalid in &summary.invalid {
        println!(
            "{} portal {} on {} is invalid: {}",
            "warning:".yellow().bold(),
            invalid.portal.id,
            invalid.portal.source_map,
            invalid.reason
        );
    }
}

fn print_diagnostics(diagnostics: &[ExtractionDiagnostic]) {
    for diag in diagnostics {
        println!(
            "{} {} object {}: {}",
            "warning:".yellow().bold(),
            diag.map_id,
            diag.object_id.as_deref().unwrap_or("<no id>"),
            diag.cause
        );
    }
}

fn print_written<'a>(paths: impl Iterator<Item = &'a PathBuf>) {
    for path in paths {
        println!("{} {}", "wrote".green(), path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portalmap_model::PortalProperties;

    #[test]
    fn formats_portals_and_edges() {
        let portal = Portal {
            id: "p1".to_string(),
            source_map: "M1".to_string(),
            object_type: None,
            x: 10,
            y: 20,
            width: 1,
            height: 1,
            properties: PortalProperties::new(Some("M2".to_string()), 5, 6, None),
            orientation: None,
            normal: None,
            invalidity_reason: None,
        };
        assert_eq!(portal_line(&portal), "p1 @ (10, 20) -> M2 (5, 6)");

        let edge = ConnectionEdge {
            source_map: "M1".to_string(),
            target_map: "M2".to_string(),
            portal_count: 2,
        };
        assert_eq!(edge_line(&edge), "M1 -> M2 [2 portals]");

        let mut map = MapSummary::new("M1");
        assert_eq!(map_line(&map), "M1");
        map.name = Some("Lobby".to_string());
        assert_eq!(map_line(&map), "M1 (Lobby)");
    }
}
