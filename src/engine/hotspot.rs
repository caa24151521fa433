//! Hotspot clustering over match positions
//!
//! Sliding-window density scoring: matches packed tightly together score
//! higher than the same number spread out. Each window is anchored at its
//! median member, candidate windows are deduplicated by quantized start
//! position, and the top three by score survive. When no window qualifies a
//! single synthetic cluster at the overall median keeps navigation useful.

use std::collections::HashMap;

use crate::dom::{NodeId, Tree};
use crate::engine::annotations::{AnnotationHandle, AnnotationLedger};
use crate::engine::config::ClusterConfig;
use crate::engine::types::HotspotDisplay;

/// One recorded match anchor
#[derive(Clone, Debug)]
pub struct HotspotSample {
    /// Document-relative position of the match, in position units
    pub position: usize,
    /// Short preview of the matched text
    pub preview: String,
    /// Handle of the owning highlight annotation
    pub handle: AnnotationHandle,
}

/// A dense window of matches
#[derive(Clone, Debug)]
pub struct HotspotCluster {
    pub start: usize,
    pub end: usize,
    pub count: usize,
    pub score: f64,
    pub anchor_handle: AnnotationHandle,
    pub anchor_position: usize,
    pub anchor_preview: String,
}

/// Density score of a window: sum of inverse consecutive distances, with a
/// fixed score for zero-distance pairs
fn window_score(window: &[&HotspotSample], config: &ClusterConfig) -> f64 {
    if window.len() <= 1 {
        return window.len() as f64;
    }
    let mut score = 0.0;
    for pair in window.windows(2) {
        let distance = pair[1].position - pair[0].position;
        if distance > 0 {
            score += 1.0 / distance as f64;
        } else {
            score += config.zero_distance_score;
        }
    }
    score
}

/// Compute up to `max_clusters` dense windows from the recorded samples
pub fn compute_clusters(samples: &[HotspotSample], config: &ClusterConfig) -> Vec<HotspotCluster> {
    if samples.is_empty() {
        return Vec::new();
    }

    let mut sorted: Vec<&HotspotSample> = samples.iter().collect();
    sorted.sort_by_key(|s| s.position);

    let mut candidates: Vec<HotspotCluster> = Vec::new();
    for current in &sorted {
        let limit = current.position + config.window_size;
        // Membership is by position range, not sorted index: samples sharing
        // `current`'s position but sorted earlier still belong to the window.
        let window: Vec<&HotspotSample> = sorted
            .iter()
            .filter(|s| s.position >= current.position && s.position <= limit)
            .copied()
            .collect();
        if window.len() < 2 {
            continue;
        }

        let score = window_score(&window, config);
        let anchor = window[window.len() / 2];
        candidates.push(HotspotCluster {
            start: current.position,
            end: limit,
            count: window.len(),
            score,
            anchor_handle: anchor.handle,
            anchor_position: anchor.position,
            anchor_preview: anchor.preview.clone(),
        });
    }

    // Deduplicate by quantized window start, keeping one representative per
    // quantum (the last candidate wins, at the first candidate's slot).
    let quantum = config.dedupe_quantum.max(1);
    let mut slots: HashMap<usize, usize> = HashMap::new();
    let mut unique: Vec<Option<HotspotCluster>> = Vec::new();
    for candidate in candidates {
        let key = (candidate.start as f64 / quantum as f64).round() as usize;
        match slots.get(&key) {
            Some(&slot) => unique[slot] = Some(candidate),
            None => {
                slots.insert(key, unique.len());
                unique.push(Some(candidate));
            }
        }
    }
    let mut unique: Vec<HotspotCluster> = unique.into_iter().flatten().collect();

    // Descending score; ascending start breaks ties deterministically
    unique.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.start.cmp(&b.start))
    });
    unique.truncate(config.max_clusters);

    if unique.is_empty() {
        // Fallback: a single synthetic cluster at the overall median
        let median = sorted[sorted.len() / 2];
        unique.push(HotspotCluster {
            start: median.position,
            end: median.position,
            count: samples.len(),
            score: 0.0,
            anchor_handle: median.handle,
            anchor_position: median.position,
            anchor_preview: median.preview.clone(),
        });
    }

    unique
}

/// Format clusters for display against the document extent
pub fn format_hotspots(
    clusters: &[HotspotCluster],
    extent: usize,
    config: &ClusterConfig,
) -> Vec<HotspotDisplay> {
    clusters
        .iter()
        .enumerate()
        .map(|(index, cluster)| {
            let percent = if extent > 0 {
                ((cluster.anchor_position as f64 / extent as f64) * 100.0).round() as u64
            } else {
                0
            };
            let budget = config.display_preview_chars;
            let mut preview: String = cluster.anchor_preview.chars().take(budget).collect();
            if cluster.anchor_preview.chars().count() > budget {
                preview.push_str("...");
            }
            HotspotDisplay {
                rank: index + 1,
                area_index: index,
                position: format!("{percent}%"),
                count: cluster.count,
                score: (cluster.score * 100.0).round() / 100.0,
                preview,
            }
        })
        .collect()
}

/// Injected navigation capability. Scrolling and the transient emphasis
/// outline belong to the caller's UI layer.
pub trait Navigator {
    fn scroll_to_node(&mut self, node: NodeId);
    fn scroll_to_offset(&mut self, offset: usize);
    /// Apply a self-reverting emphasis outline to the anchor highlight
    fn flash(&mut self, node: NodeId);
}

/// Resolve a navigation request against the current clusters. Prefers the
/// anchor's highlight when it is still attached; falls back to the stored
/// absolute position otherwise.
pub fn navigate(
    tree: &Tree,
    ledger: &AnnotationLedger,
    clusters: &[HotspotCluster],
    area_index: usize,
    navigator: &mut dyn Navigator,
) -> bool {
    let Some(cluster) = clusters.get(area_index) else {
        return false;
    };

    if let Some(node) = ledger.node(cluster.anchor_handle) {
        if tree.is_attached(node) {
            navigator.scroll_to_node(node);
            navigator.flash(node);
            return true;
        }
    }

    if cluster.anchor_position > 0 {
        navigator.scroll_to_offset(cluster.anchor_position);
        return true;
    }

    false
}
