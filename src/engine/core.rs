//! SearchEngine - unified scan facade
//!
//! Single entry point tying the pieces together: compiles the request,
//! reverses any previous scan, snapshots the unit stream, and hands a
//! `ScanDriver` to the caller (or drives it to completion itself). The engine
//! owns the annotation ledger, the hotspot samples, and the clusters of the
//! most recent scan; a new scan or a clear discards them.
//!
//! Errors never cross this boundary as panics or raw `Err`s: `scan` converts
//! every failure into a `SearchResult { success: false, .. }`. Partial
//! highlighting left behind by a failed scan stays in place; `clear`
//! recovers.

use crate::dom::{assemble_lines, Tree, WalkSnapshot};
use crate::engine::annotations::{clear_annotations, AnnotationLedger};
use crate::engine::config::EngineConfig;
use crate::engine::hotspot::{format_hotspots, navigate, HotspotCluster, HotspotSample, Navigator};
use crate::engine::pattern::{compile_request, CompiledPattern};
use crate::engine::scheduler::{DriveMode, ScanDriver, ScanStep};
use crate::engine::types::{
    HotspotDisplay, ProgressSink, SearchMode, SearchRequest, SearchResult,
};
use crate::error::{EngineResult, SearchError};

/// Scan, clear, and navigate over one content tree
pub struct SearchEngine {
    pub(crate) config: EngineConfig,
    pub(crate) ledger: AnnotationLedger,
    pub(crate) samples: Vec<HotspotSample>,
    pub(crate) clusters: Vec<HotspotCluster>,
    /// Document extent captured at the last scan start
    pub(crate) extent: usize,
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl SearchEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            ledger: AnnotationLedger::new(),
            samples: Vec::new(),
            clusters: Vec::new(),
            extent: 0,
        }
    }

    /// Begin a scan, returning a step-wise driver for callers that embed the
    /// suspension point in their own event loop. Validation and compilation
    /// happen here, before any tree mutation; previous annotations are then
    /// cleared and the unit stream snapshotted.
    ///
    /// The driver borrows the engine mutably, so concurrent scans on one
    /// engine are rejected at compile time.
    pub fn start_scan<'e>(
        &'e mut self,
        tree: &mut Tree,
        request: &SearchRequest,
    ) -> EngineResult<ScanDriver<'e>> {
        let compiled = compile_request(request)?;

        // Reversal of the previous scan happens only after the pattern is
        // known to be valid.
        clear_annotations(tree, &mut self.ledger);
        self.samples.clear();
        self.clusters.clear();

        let snapshot = WalkSnapshot::capture(tree);
        self.extent = snapshot.extent;

        let mode = match request.mode {
            SearchMode::Keywords | SearchMode::Regex => {
                let units: Vec<_> = snapshot
                    .eligible()
                    .into_iter()
                    .map(|v| (v.id, v.offset))
                    .collect();
                log::debug!(
                    target: "pagemark.scan",
                    "scan started: mode={:?}, {} leaves, extent={}",
                    request.mode,
                    units.len(),
                    snapshot.extent
                );
                DriveMode::Units {
                    units,
                    matcher: compiled,
                }
            }
            SearchMode::Intersection => {
                let CompiledPattern::Keywords(matcher) = compiled else {
                    return Err(SearchError::Internal(
                        "intersection request compiled to a non-keyword matcher".to_string(),
                    ));
                };
                let lines = assemble_lines(tree, &snapshot);
                log::debug!(
                    target: "pagemark.scan",
                    "scan started: mode=Intersection, {} lines, extent={}",
                    lines.len(),
                    snapshot.extent
                );
                DriveMode::Lines {
                    lines,
                    matcher,
                    matched_lines: 0,
                }
            }
        };

        Ok(ScanDriver::new(self, mode))
    }

    /// Run a full scan to completion, publishing throttled progress to
    /// `sink`. Sink failures are swallowed; they never affect the scan.
    pub fn scan(
        &mut self,
        tree: &mut Tree,
        request: &SearchRequest,
        sink: &mut dyn ProgressSink,
    ) -> SearchResult {
        let mut driver = match self.start_scan(tree, request) {
            Ok(driver) => driver,
            Err(error) => return SearchResult::failure(&error),
        };
        loop {
            match driver.step(tree) {
                ScanStep::Yielded { progress } => {
                    if let Some(event) = progress {
                        if let Err(error) = sink.publish(&event) {
                            log::debug!(
                                target: "pagemark.scan",
                                "progress delivery failed, continuing: {error}"
                            );
                        }
                    }
                }
                ScanStep::Done(result) => return result,
            }
        }
    }

    /// Undo every annotation from the last scan and drop hotspot state.
    /// No-op when nothing was highlighted.
    pub fn clear(&mut self, tree: &mut Tree) {
        log::trace!(
            target: "pagemark.clear",
            "clearing {} annotations",
            self.ledger.len()
        );
        clear_annotations(tree, &mut self.ledger);
        self.samples.clear();
        self.clusters.clear();
        self.extent = 0;
    }

    /// Hotspots of the last completed scan, formatted for display
    pub fn hotspots(&self) -> Vec<HotspotDisplay> {
        format_hotspots(&self.clusters, self.extent, &self.config.cluster)
    }

    /// Jump to a hotspot by area index. Returns false when the index is out
    /// of range or no anchor position is available.
    pub fn navigate(
        &self,
        tree: &Tree,
        area_index: usize,
        navigator: &mut dyn Navigator,
    ) -> bool {
        navigate(tree, &self.ledger, &self.clusters, area_index, navigator)
    }
}
