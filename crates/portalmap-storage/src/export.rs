//! Portal exports: a flat CSV table and a JSON array of portal records.

use portalmap_model::{Error, Portal, Result};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

pub const CSV_HEADER: [&str; 8] = [
    "ID",
    "Source Map",
    "X",
    "Y",
    "Target Map",
    "Target X",
    "Target Y",
    "Valid",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    Csv,
    Json,
    #[default]
    Both,
}

impl ExportFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Both => "both",
        }
    }

    pub fn includes_csv(self) -> bool {
        matches!(self, ExportFormat::Csv | ExportFormat::Both)
    }

    pub fn includes_json(self) -> bool {
        matches!(self, ExportFormat::Json | ExportFormat::Both)
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            "both" => Ok(ExportFormat::Both),
            other => Err(format!("unknown export format `{other}` (expected csv, json or both)")),
        }
    }
}

/// Render portals as CSV, one row per portal in iteration order.
pub fn portals_to_csv<'a>(portals: impl IntoIterator<Item = &'a Portal>) -> String {
    let mut out = String::new();
    push_row(&mut out, CSV_HEADER.iter().map(|s| s.to_string()));
    for portal in portals {
        let props = &portal.properties;
        push_row(
            &mut out,
            [
                portal.id.clone(),
                portal.source_map.clone(),
                portal.x.to_string(),
                portal.y.to_string(),
                props.target_map.clone().unwrap_or_default(),
                props.target_x.to_string(),
                props.target_y.to_string(),
                if portal.is_valid() { "Yes" } else { "No" }.to_string(),
            ],
        );
    }
    out
}

fn push_row(out: &mut String, fields: impl IntoIterator<Item = String>) {
    for (i, field) in fields.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&escape_field(&field));
    }
    out.push('\n');
}

fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Read back a JSON portal export or a per-map portals file.
pub fn read_portals_json(path: &Path) -> Result<Vec<Portal>> {
    let bytes = std::fs::read(path).map_err(|e| Error::io(path, e))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| Error::schema(None, format!("{}: {e}", path.display())))
}
