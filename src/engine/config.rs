//! Engine configuration with serde-friendly defaults

use serde::{Deserialize, Serialize};

fn default_batch_leaves() -> usize {
    50
}
fn default_batch_lines() -> usize {
    20
}
fn default_progress_interval_ms() -> u64 {
    100
}
fn default_window_size() -> usize {
    300
}
fn default_dedupe_quantum() -> usize {
    50
}
fn default_zero_distance_score() -> f64 {
    10.0
}
fn default_max_clusters() -> usize {
    3
}
fn default_sample_preview_chars() -> usize {
    50
}
fn default_display_preview_chars() -> usize {
    40
}

/// Batching and progress throttling
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Leaves processed per batch in OR/regex mode
    #[serde(default = "default_batch_leaves")]
    pub batch_leaves: usize,
    /// Lines processed per batch in intersection mode
    #[serde(default = "default_batch_lines")]
    pub batch_lines: usize,
    /// Minimum wall-clock interval between progress emissions
    #[serde(default = "default_progress_interval_ms")]
    pub progress_interval_ms: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            batch_leaves: default_batch_leaves(),
            batch_lines: default_batch_lines(),
            progress_interval_ms: default_progress_interval_ms(),
        }
    }
}

/// Hotspot clustering parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Sliding window height in position units
    #[serde(default = "default_window_size")]
    pub window_size: usize,
    /// Window starts are quantized by this amount for deduplication
    #[serde(default = "default_dedupe_quantum")]
    pub dedupe_quantum: usize,
    /// Score contributed by a zero-distance pair (tuning constant)
    #[serde(default = "default_zero_distance_score")]
    pub zero_distance_score: f64,
    /// Maximum clusters returned
    #[serde(default = "default_max_clusters")]
    pub max_clusters: usize,
    /// Characters of matched text kept per sample
    #[serde(default = "default_sample_preview_chars")]
    pub sample_preview_chars: usize,
    /// Character budget for display previews before the ellipsis marker
    #[serde(default = "default_display_preview_chars")]
    pub display_preview_chars: usize,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            window_size: default_window_size(),
            dedupe_quantum: default_dedupe_quantum(),
            zero_distance_score: default_zero_distance_score(),
            max_clusters: default_max_clusters(),
            sample_preview_chars: default_sample_preview_chars(),
            display_preview_chars: default_display_preview_chars(),
        }
    }
}

/// Top-level engine configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub cluster: ClusterConfig,
}
