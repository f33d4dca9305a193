//! Whole-space analysis.
//!
//! Each listed map goes `queued → fetching → classifying → normalizing → done`,
//! or `queued → fetching → skipped` on `not_found`, or
//! `queued → fetching → failed` on any other error, which aborts the run.
//! There is no retry here; retry belongs to the fetcher.

use portalmap_ingest::{ExtractedPortal, MapExtraction, MapFetcher, Normalizer, PortalExtractor};
use portalmap_model::{Error, MapSummary, Result, SpaceId};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::cancel::CancellationToken;
use crate::report::{MapReport, PortalsByMap, SkippedMap, SpaceReport};
use crate::stats::{connections, directional_analysis, property_frequency, validation_summary};

#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyzeOptions {
    /// Fetch maps concurrently. Output order and error precedence stay those
    /// of a sequential run: the first failing map in listing order wins.
    pub parallel: bool,
    pub normalizer: Normalizer,
}

enum MapOutcome {
    Done(MapExtraction),
    Skipped(SkippedMap),
}

pub struct SpaceAnalyzer<F> {
    fetcher: F,
    options: AnalyzeOptions,
    cancellation: CancellationToken,
}

impl<F: MapFetcher> SpaceAnalyzer<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            options: AnalyzeOptions::default(),
            cancellation: CancellationToken::new(),
        }
    }

    pub fn with_options(mut self, options: AnalyzeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn list_maps(&self, space_id: &SpaceId) -> Result<Vec<MapSummary>> {
        self.check_cancelled()?;
        self.fetcher.list_maps(space_id)
    }

    /// Extract one map and compute its outgoing connections.
    pub fn analyze_map(&self, space_id: &SpaceId, map_id: &str) -> Result<MapReport> {
        self.check_cancelled()?;
        let extraction = self.extractor().extract(space_id, map_id)?;
        let portals = extraction.portal_records();
        let connections = connections(&portals);
        let validation_summary = validation_summary(&portals);
        info!(
            space_id = %space_id,
            map_id = %extraction.map.id,
            portals = portals.len(),
            "map analyzed"
        );
        Ok(MapReport {
            space_id: space_id.clone(),
            map: extraction.map,
            portals,
            connections,
            validation_summary,
            diagnostics: extraction.diagnostics,
        })
    }

    /// Analyze every map of `space_id`.
    ///
    /// Returns `cancelled` if the token fires before any fetch, and the first
    /// aborting map error (in listing order) otherwise.
    pub fn analyze(&self, space_id: &SpaceId) -> Result<SpaceReport> {
        let maps = self.list_maps(space_id)?;
        info!(space_id = %space_id, maps = maps.len(), parallel = self.options.parallel, "analyzing space");

        let outcomes = if self.options.parallel {
            // Collect every outcome first so error precedence follows listing
            // order rather than completion order.
            maps.par_iter()
                .map(|summary| self.run_map(space_id, summary))
                .collect::<Vec<_>>()
                .into_iter()
                .collect::<Result<Vec<_>>>()?
        } else {
            maps.iter()
                .map(|summary| self.run_map(space_id, summary))
                .collect::<Result<Vec<_>>>()?
        };

        let report = assemble(space_id.clone(), maps, outcomes);
        info!(
            space_id = %space_id,
            maps = report.portals_by_map.len(),
            skipped = report.skipped_maps.len(),
            portals = report.total_portals(),
            connections = report.connections.len(),
            "space analyzed"
        );
        Ok(report)
    }

    fn run_map(&self, space_id: &SpaceId, summary: &MapSummary) -> Result<MapOutcome> {
        self.check_cancelled()?;
        debug!(space_id = %space_id, map_id = %summary.id, "fetching map");
        match self.extractor().extract(space_id, &summary.id) {
            Ok(extraction) => Ok(MapOutcome::Done(extraction)),
            Err(err) if !err.kind().aborts_analysis() => {
                warn!(map_id = %summary.id, cause = %err, "skipping map");
                Ok(MapOutcome::Skipped(SkippedMap {
                    map_id: summary.id.clone(),
                    reason: err.cause(),
                }))
            }
            Err(err) => {
                warn!(map_id = %summary.id, error = %err, "map failed");
                Err(err)
            }
        }
    }

    fn extractor(&self) -> PortalExtractor<'_, F> {
        PortalExtractor::new(&self.fetcher).with_normalizer(self.options.normalizer)
    }

    fn check_cancelled(&self) -> Result<()> {
        if self.cancellation.is_cancelled() {
            info!("analysis cancelled");
            return Err(Error::Cancelled);
        }
        Ok(())
    }
}

/// Second pass: aggregate per-map results and compute statistics.
fn assemble(space_id: SpaceId, maps: Vec<MapSummary>, outcomes: Vec<MapOutcome>) -> SpaceReport {
    let mut portals_by_map = PortalsByMap::default();
    let mut map_details = Vec::new();
    let mut attribute_sets = Vec::new();
    let mut diagnostics = Vec::new();
    let mut skipped_maps = Vec::new();

    for outcome in outcomes {
        match outcome {
            MapOutcome::Skipped(skipped) => skipped_maps.push(skipped),
            MapOutcome::Done(MapExtraction {
                map,
                portals,
                diagnostics: faults,
            }) => {
                let mut records = Vec::with_capacity(portals.len());
                for ExtractedPortal {
                    portal,
                    observed_attributes,
                } in portals
                {
                    attribute_sets.push(observed_attributes);
                    records.push(portal);
                }
                portals_by_map.push(map.id.clone(), records);
                diagnostics.extend(faults);
                map_details.push(map);
            }
        }
    }

    let total_portals = attribute_sets.len();
    SpaceReport {
        connections: connections(portals_by_map.all_portals()),
        validation_summary: validation_summary(portals_by_map.all_portals()),
        property_frequency: property_frequency(&attribute_sets, total_portals),
        directional_analysis: directional_analysis(portals_by_map.all_portals()),
        space_id,
        maps,
        map_details,
        portals_by_map,
        diagnostics,
        skipped_maps,
    }
}
