//! Writes analysis results into a session directory.

use chrono::{DateTime, Utc};
use portalmap_analysis::{MapReport, SpaceReport};
use portalmap_model::{ConnectionSummary, Error, MapDetail, Portal, Result, SpaceId};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::atomic::{write_atomic, write_json_pretty};
use crate::export::{portals_to_csv, ExportFormat};
use crate::layout::SessionLayout;
use crate::report::SessionReport;

/// Files written by one writer call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionArtifacts {
    pub map_dumps: Vec<PathBuf>,
    pub map_portals: Vec<PathBuf>,
    pub connections: Option<PathBuf>,
    pub analysis: Option<PathBuf>,
    pub exports: Vec<PathBuf>,
}

impl SessionArtifacts {
    pub fn all(&self) -> impl Iterator<Item = &PathBuf> {
        self.map_dumps
            .iter()
            .chain(&self.map_portals)
            .chain(&self.connections)
            .chain(&self.analysis)
            .chain(&self.exports)
    }
}

pub struct ArtifactWriter {
    layout: SessionLayout,
}

impl ArtifactWriter {
    pub fn new(output_dir: impl AsRef<Path>, space_id: &SpaceId) -> Self {
        Self {
            layout: SessionLayout::new(output_dir, space_id),
        }
    }

    pub fn layout(&self) -> &SessionLayout {
        &self.layout
    }

    /// Create the session directory tree. Safe to call repeatedly.
    pub fn prepare(&self) -> Result<()> {
        for dir in [self.layout.maps_dir(), self.layout.portals_dir()] {
            fs::create_dir_all(&dir).map_err(|e| Error::io(&dir, e))?;
        }
        Ok(())
    }

    pub fn write_map_dump(&self, map: &MapDetail) -> Result<PathBuf> {
        let path = self.layout.map_dump(&map.id);
        write_json_pretty(&path, map.document())?;
        debug!(path = %path.display(), "map dump written");
        Ok(path)
    }

    pub fn write_map_portals(&self, map_id: &str, portals: &[Portal]) -> Result<PathBuf> {
        let path = self.layout.map_portals(map_id);
        write_json_pretty(&path, portals)?;
        debug!(path = %path.display(), portals = portals.len(), "map portals written");
        Ok(path)
    }

    pub fn write_connections(&self, summary: &ConnectionSummary) -> Result<PathBuf> {
        let path = self.layout.connections();
        write_json_pretty(&path, summary)?;
        Ok(path)
    }

    pub fn write_analysis(&self, report: &SessionReport) -> Result<PathBuf> {
        let path = self.layout.analysis();
        write_json_pretty(&path, report)?;
        Ok(path)
    }

    /// Write `portals_<timestamp>.{csv,json}` for the requested formats.
    pub fn write_export<'a>(
        &self,
        portals: impl IntoIterator<Item = &'a Portal>,
        format: ExportFormat,
        generated_at: DateTime<Utc>,
    ) -> Result<Vec<PathBuf>> {
        let portals: Vec<&Portal> = portals.into_iter().collect();
        let mut written = Vec::new();
        if format.includes_csv() {
            let path = self.layout.export(generated_at, "csv");
            write_atomic(&path, portals_to_csv(portals.iter().copied()).as_bytes())?;
            written.push(path);
        }
        if format.includes_json() {
            let path = self.layout.export(generated_at, "json");
            write_json_pretty(&path, &portals)?;
            written.push(path);
        }
        info!(portals = portals.len(), format = %format, files = written.len(), "portals exported");
        Ok(written)
    }

    /// Write the per-map dumps, per-map portal files, connection summary and
    /// session report for a whole space.
    pub fn write_session(
        &self,
        report: &SpaceReport,
        generated_at: DateTime<Utc>,
    ) -> Result<SessionArtifacts> {
        self.prepare()?;
        let mut artifacts = SessionArtifacts::default();

        for map in &report.map_details {
            artifacts.map_dumps.push(self.write_map_dump(map)?);
        }
        for entry in report.portals_by_map.iter() {
            artifacts
                .map_portals
                .push(self.write_map_portals(&entry.map_id, &entry.portals)?);
        }
        artifacts.connections = Some(self.write_connections(&report.connection_summary())?);
        artifacts.analysis =
            Some(self.write_analysis(&SessionReport::from_space(report, generated_at))?);

        info!(
            root = %self.layout.root().display(),
            files = artifacts.all().count(),
            "session written"
        );
        Ok(artifacts)
    }

    /// Write the dump and portals file of a single analyzed map.
    pub fn write_map_report(&self, report: &MapReport) -> Result<SessionArtifacts> {
        self.prepare()?;
        Ok(SessionArtifacts {
            map_dumps: vec![self.write_map_dump(&report.map)?],
            map_portals: vec![self.write_map_portals(report.map_id(), &report.portals)?],
            ..SessionArtifacts::default()
        })
    }
}
