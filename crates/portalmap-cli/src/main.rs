//! Portalmap CLI
//!
//! Discovers the maps of a remote space, extracts and validates their
//! portals, and writes the map-to-map portal graph plus exports:
//! - `list-maps`: print the map listing
//! - `analyze-map`: extract one map's portals
//! - `analyze-space`: analyze every map and write the session directory
//! - `export`: analyze every map and write `portals_<timestamp>.{csv,json}`

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use colored::Colorize;
use portalmap_analysis::{AnalyzeOptions, CancellationToken, SpaceAnalyzer};
use portalmap_ingest::{MapFetcher, Normalizer};
use portalmap_model::ErrorKind;
use portalmap_storage::{ArtifactWriter, ExportFormat};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

mod config;
mod http;
mod render;

use config::{Config, ConfigError};
use http::HttpFetcher;

#[derive(Parser, Debug)]
#[command(name = "portalmap")]
#[command(author, version, about = "Portalmap: portal discovery and map-graph analysis for remote spaces")]
struct Cli {
    /// Log filter in `tracing` EnvFilter syntax, e.g. `info` or `portalmap_analysis=debug`.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Dotenv file to load before reading the environment (default: ./.env if present).
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    /// Space id; overrides PORTALMAP_SPACE_ID.
    #[arg(long, global = true)]
    space: Option<String>,

    /// Output directory; overrides PORTALMAP_OUTPUT_DIR.
    #[arg(long, global = true)]
    out: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the maps of the space.
    ListMaps,

    /// Extract one map's portals and write its dump and portals file.
    AnalyzeMap {
        map_id: String,
        /// Require explicit target coordinates on every portal.
        #[arg(long)]
        strict_targets: bool,
    },

    /// Analyze every map of the space and write the session directory.
    AnalyzeSpace {
        /// Fetch maps concurrently.
        #[arg(long)]
        parallel: bool,
        /// Require explicit target coordinates on every portal.
        #[arg(long)]
        strict_targets: bool,
        /// Also export portals as csv, json or both.
        #[arg(long)]
        export: Option<ExportFormat>,
    },

    /// Analyze every map and export the portals only.
    Export {
        /// csv, json or both.
        #[arg(long, default_value = "both")]
        format: ExportFormat,
        /// Fetch maps concurrently.
        #[arg(long)]
        parallel: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            ExitCode::from(exit_code(&err))
        }
    }
}

/// Process exit status for a failed command.
fn exit_code(err: &anyhow::Error) -> u8 {
    if err.downcast_ref::<ConfigError>().is_some() {
        return 2;
    }
    match err.downcast_ref::<portalmap_model::Error>().map(|e| e.kind()) {
        Some(ErrorKind::Unauthenticated) => 3,
        Some(ErrorKind::RemoteUnavailable) => 4,
        Some(ErrorKind::NotFound) => 5,
        Some(ErrorKind::SchemaError) => 6,
        Some(ErrorKind::IoError) => 7,
        Some(ErrorKind::Cancelled) => 130,
        None => 1,
    }
}

fn run(cli: Cli) -> Result<()> {
    config::load_env_file(cli.env_file.as_deref())?;
    let config = Config::from_env()?.with_overrides(cli.space, cli.out);
    let fetcher = HttpFetcher::new(&config)?;

    match cli.command {
        Commands::ListMaps => {
            let space_id = config.require_space()?;
            let maps = fetcher.list_maps(space_id)?;
            render::print_map_list(space_id, &maps);
        }

        Commands::AnalyzeMap {
            map_id,
            strict_targets,
        } => {
            let space_id = config.require_space()?;
            let analyzer = SpaceAnalyzer::new(fetcher).with_options(options(false, strict_targets));
            let report = analyzer.analyze_map(space_id, &map_id)?;

            let writer = ArtifactWriter::new(&config.output_dir, space_id);
            let written = writer
                .write_map_report(&report)
                .with_context(|| format!("failed to write artifacts for map {map_id}"))?;
            render::print_map_report(&report, &written);
        }

        Commands::AnalyzeSpace {
            parallel,
            strict_targets,
            export,
        } => {
            let space_id = config.require_space()?;
            let analyzer = SpaceAnalyzer::new(fetcher)
                .with_options(options(parallel, strict_targets))
                .with_cancellation(interrupt_token()?);
            let report = analyzer.analyze(space_id)?;

            let generated_at = Utc::now();
            let writer = ArtifactWriter::new(&config.output_dir, space_id);
            let written = writer
                .write_session(&report, generated_at)
                .context("failed to write session artifacts")?;
            let exports = match export {
                Some(format) => writer
                    .write_export(report.all_portals(), format, generated_at)
                    .context("failed to export portals")?,
                None => Vec::new(),
            };
            render::print_space_report(&report, &written, &exports);
        }

        Commands::Export { format, parallel } => {
            let space_id = config.require_space()?;
            let analyzer = SpaceAnalyzer::new(fetcher)
                .with_options(options(parallel, false))
                .with_cancellation(interrupt_token()?);
            let report = analyzer.analyze(space_id)?;

            let writer = ArtifactWriter::new(&config.output_dir, space_id);
            let exports = writer
                .write_export(report.all_portals(), format, Utc::now())
                .context("failed to export portals")?;
            info!(portals = report.total_portals(), "export complete");
            render::print_exports(&exports);
        }
    }
    Ok(())
}

fn options(parallel: bool, strict_targets: bool) -> AnalyzeOptions {
    AnalyzeOptions {
        parallel,
        normalizer: if strict_targets {
            Normalizer::strict()
        } else {
            Normalizer::permissive()
        },
    }
}

/// Cancellation token raised by Ctrl-C.
fn interrupt_token() -> Result<CancellationToken> {
    let token = CancellationToken::new();
    signal_hook::flag::register(signal_hook::consts::SIGINT, token.flag())
        .context("failed to register SIGINT handler")?;
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use portalmap_model::Error;

    #[test]
    fn exit_codes_follow_error_kind() {
        let code = |e: Error| exit_code(&anyhow::Error::from(e));
        assert_eq!(code(Error::unauthenticated(None, "401")), 3);
        assert_eq!(code(Error::remote_unavailable(None, "503")), 4);
        assert_eq!(code(Error::not_found(Some("M1"), "404")), 5);
        assert_eq!(code(Error::schema(Some("M1"), "bad")), 6);
        assert_eq!(code(Error::Cancelled), 130);
        assert_eq!(exit_code(&anyhow::Error::from(ConfigError::NoSpace)), 2);
        assert_eq!(exit_code(&anyhow::anyhow!("boom")), 1);
    }

    #[test]
    fn context_does_not_hide_the_kind() {
        let err = anyhow::Error::from(Error::io("/x", std::io::Error::new(std::io::ErrorKind::Other, "disk full")))
            .context("failed to write session artifacts");
        assert_eq!(exit_code(&err), 7);
    }

    #[test]
    fn parses_subcommands_and_global_flags() {
        let cli = Cli::try_parse_from([
            "portalmap",
            "analyze-space",
            "--parallel",
            "--export",
            "csv",
            "--space",
            "abc\\Space",
        ])
        .unwrap();
        assert_eq!(cli.space.as_deref(), Some("abc\\Space"));
        assert_eq!(cli.log_level, "warn");
        match cli.command {
            Commands::AnalyzeSpace {
                parallel, export, ..
            } => {
                assert!(parallel);
                assert_eq!(export, Some(ExportFormat::Csv));
            }
            other => panic!("unexpected command {other:?}"),
        }

        assert!(Cli::try_parse_from(["portalmap", "export", "--format", "xml"]).is_err());
    }
}
