use chrono::{DateTime, Utc};
use portalmap_model::SpaceId;
use std::path::{Path, PathBuf};

pub const MAPS_DIR: &str = "maps";
pub const PORTALS_DIR: &str = "portals";
pub const CONNECTIONS_FILE: &str = "portal_connections.json";
pub const ANALYSIS_FILE: &str = "portal_analysis.json";

/// Timestamp format used in export file names.
pub const EXPORT_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Make `name` usable as a single path component.
///
/// `%`, path separators and NUL are percent-encoded, so distinct names never
/// share a file. The special names `.` and `..` have their dots encoded and
/// the empty name becomes a lone `%`.
pub fn safe_component(name: &str) -> String {
    match name {
        "" => return "%".to_string(),
        "." => return "%2E".to_string(),
        ".." => return "%2E%2E".to_string(),
        _ => {}
    }
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        match c {
            '%' => out.push_str("%25"),
            '/' => out.push_str("%2F"),
            '\\' => out.push_str("%5C"),
            '\0' => out.push_str("%00"),
            other => out.push(other),
        }
    }
    out
}

/// Paths of one session directory, `<output>/<space_id>/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionLayout {
    root: PathBuf,
}

impl SessionLayout {
    pub fn new(output_dir: impl AsRef<Path>, space_id: &SpaceId) -> Self {
        Self {
            root: output_dir.as_ref().join(safe_component(space_id.as_str())),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn maps_dir(&self) -> PathBuf {
        self.root.join(MAPS_DIR)
    }

    pub fn portals_dir(&self) -> PathBuf {
        self.root.join(PORTALS_DIR)
    }

    pub fn map_dump(&self, map_id: &str) -> PathBuf {
        self.maps_dir()
            .join(format!("map_{}.json", safe_component(map_id)))
    }

    pub fn map_portals(&self, map_id: &str) -> PathBuf {
        self.portals_dir()
            .join(format!("portals_{}.json", safe_component(map_id)))
    }

    pub fn connections(&self) -> PathBuf {
        self.portals_dir().join(CONNECTIONS_FILE)
    }

    pub fn analysis(&self) -> PathBuf {
        self.root.join(ANALYSIS_FILE)
    }

    /// `portals_<YYYYmmdd_HHMMSS>.<extension>` at the session root.
    pub fn export(&self, generated_at: DateTime<Utc>, extension: &str) -> PathBuf {
        self.root.join(format!(
            "portals_{}.{extension}",
            generated_at.format(EXPORT_TIMESTAMP_FORMAT)
        ))
    }
}
