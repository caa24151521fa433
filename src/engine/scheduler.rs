//! Batched, cooperatively yielding scan driver
//!
//! The driver processes the unit stream (leaves or logical lines) in fixed
//! size batches and hands control back after every batch: `step` is the only
//! suspension point in the engine. Progress is attached to a yield when the
//! minimum wall-clock interval has elapsed since the last emission, with an
//! ETA derived from the observed units-per-millisecond rate. The driver never
//! suspends mid-leaf or mid-line.

use std::time::Duration;

use instant::Instant;

use crate::dom::{LogicalLine, NodeId, Tree};
use crate::engine::core::SearchEngine;
use crate::engine::highlighter::{highlight_leaf, highlight_line};
use crate::engine::hotspot::{compute_clusters, format_hotspots};
use crate::engine::pattern::{CompiledPattern, KeywordMatcher};
use crate::engine::types::{ProgressEvent, SearchResult};
use crate::error::SearchError;

/// Outcome of driving one batch
pub enum ScanStep {
    /// Control handed back to the caller; progress attached when the
    /// throttle interval elapsed
    Yielded { progress: Option<ProgressEvent> },
    /// Scan complete; the engine now holds the final hotspot state
    Done(SearchResult),
}

pub(crate) enum DriveMode {
    /// OR / regex scan over eligible leaves: (leaf id, document offset)
    Units {
        units: Vec<(NodeId, usize)>,
        matcher: CompiledPattern,
    },
    /// Intersection scan over logical lines
    Lines {
        lines: Vec<LogicalLine>,
        matcher: KeywordMatcher,
        matched_lines: usize,
    },
}

/// In-flight scan. Holds the engine mutably, so scans are serialized per
/// engine by construction.
pub struct ScanDriver<'e> {
    engine: &'e mut SearchEngine,
    mode: DriveMode,
    index: usize,
    total: usize,
    matches: usize,
    started: Instant,
    last_progress: Instant,
    last_percent: u32,
    finished: bool,
}

impl<'e> ScanDriver<'e> {
    pub(crate) fn new(engine: &'e mut SearchEngine, mode: DriveMode) -> Self {
        let total = match &mode {
            DriveMode::Units { units, .. } => units.len(),
            DriveMode::Lines { lines, .. } => lines.len(),
        };
        let now = Instant::now();
        Self {
            engine,
            mode,
            index: 0,
            total,
            matches: 0,
            started: now,
            last_progress: now,
            last_percent: 0,
            finished: false,
        }
    }

    /// Process one batch. Returns `Yielded` until the unit stream is
    /// exhausted (or an early stop fires), then `Done` exactly once.
    pub fn step(&mut self, tree: &mut Tree) -> ScanStep {
        if self.finished {
            return ScanStep::Done(SearchResult::failure(&SearchError::Internal(
                "scan already completed".to_string(),
            )));
        }

        match &mut self.mode {
            DriveMode::Units { units, matcher } => {
                let batch = self.engine.config.scan.batch_leaves.max(1);
                let first_only = !matcher.global();
                let end = (self.index + batch).min(units.len());
                while self.index < end {
                    let (leaf, offset) = units[self.index];
                    self.index += 1;
                    self.matches += highlight_leaf(
                        tree,
                        leaf,
                        offset,
                        matcher,
                        first_only,
                        self.engine.config.cluster.sample_preview_chars,
                        &mut self.engine.ledger,
                        &mut self.engine.samples,
                    );
                    if first_only && self.matches > 0 {
                        return self.finish_success();
                    }
                }
                if self.index >= units.len() {
                    return self.finish_success();
                }
            }
            DriveMode::Lines {
                lines,
                matcher,
                matched_lines,
            } => {
                let batch = self.engine.config.scan.batch_lines.max(1);
                let end = (self.index + batch).min(lines.len());
                while self.index < end {
                    let line = &lines[self.index];
                    self.index += 1;
                    // Each keyword is tested independently against the line;
                    // non-matching lines are left completely untouched.
                    if matcher.all_present(&line.text) {
                        *matched_lines += 1;
                        self.matches += highlight_line(
                            tree,
                            line,
                            matcher,
                            self.engine.config.cluster.sample_preview_chars,
                            &mut self.engine.ledger,
                            &mut self.engine.samples,
                        );
                    }
                }
                if self.index >= lines.len() {
                    if *matched_lines == 0 {
                        return self.finish_no_lines(tree);
                    }
                    return self.finish_success();
                }
            }
        }

        ScanStep::Yielded {
            progress: self.maybe_progress(),
        }
    }

    fn finish_success(&mut self) -> ScanStep {
        self.finished = true;
        let clusters = compute_clusters(&self.engine.samples, &self.engine.config.cluster);
        let hotspots = format_hotspots(&clusters, self.engine.extent, &self.engine.config.cluster);
        self.engine.clusters = clusters;
        log::debug!(
            target: "pagemark.scan",
            "scan complete: {} matches, {} hotspots, {} annotations",
            self.matches,
            hotspots.len(),
            self.engine.ledger.len()
        );
        ScanStep::Done(SearchResult::ok(self.matches, hotspots))
    }

    /// Intersection fallback diagnosis: distinguish keywords missing from the
    /// whole document from keywords present but never co-located.
    fn finish_no_lines(&mut self, tree: &Tree) -> ScanStep {
        self.finished = true;
        let DriveMode::Lines { matcher, .. } = &self.mode else {
            return ScanStep::Done(SearchResult::failure(&SearchError::Internal(
                "line diagnosis outside intersection mode".to_string(),
            )));
        };
        let page_text = tree.renderable_text();
        let missing = matcher.missing_keywords(&page_text);
        let error = if missing.is_empty() {
            SearchError::KeywordsNotCoLocated
        } else {
            SearchError::KeywordsNotFound { missing }
        };
        log::debug!(target: "pagemark.scan", "intersection scan failed: {error}");
        ScanStep::Done(SearchResult::failure(&error))
    }

    fn maybe_progress(&mut self) -> Option<ProgressEvent> {
        let interval = Duration::from_millis(self.engine.config.scan.progress_interval_ms);
        let now = Instant::now();
        if now.duration_since(self.last_progress) < interval {
            return None;
        }
        self.last_progress = now;

        let percent = if self.total > 0 {
            ((self.index * 100 / self.total) as u32).min(100)
        } else {
            100
        };
        // Monotonic guard: percent never regresses within one scan
        let percent = percent.max(self.last_percent);
        self.last_percent = percent;

        let elapsed_ms = self.started.elapsed().as_millis() as u64;
        let estimated_seconds = if self.index > 0 && elapsed_ms > 0 {
            let rate = self.index as f64 / elapsed_ms as f64;
            let remaining = (self.total - self.index) as f64;
            ((remaining / rate) / 1000.0).ceil() as u64
        } else {
            0
        };

        Some(ProgressEvent {
            processed: self.index,
            total: self.total,
            percent,
            matches: self.matches,
            estimated_seconds,
        })
    }
}
