//! Engine boundary types
//!
//! The request/result/progress shapes the transport layer serializes. Wire
//! field names are camelCase; the transport owns the actual protocol and just
//! round-trips these through serde_json.

use serde::{Deserialize, Serialize};

use crate::error::SearchError;

/// Which scan algorithm to run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Independent multi-keyword matching (OR)
    Keywords,
    /// Raw pattern with a JS-style flag string
    Regex,
    /// Same-logical-line co-occurrence matching (AND)
    Intersection,
}

/// A search command, as delivered by the transport layer
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchRequest {
    pub mode: SearchMode,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub pattern: String,
    #[serde(default)]
    pub flags: String,
    #[serde(rename = "caseInsensitive", default)]
    pub case_insensitive: bool,
}

impl SearchRequest {
    pub fn keywords(keywords: &[&str], case_insensitive: bool) -> Self {
        Self {
            mode: SearchMode::Keywords,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            pattern: String::new(),
            flags: String::new(),
            case_insensitive,
        }
    }

    pub fn regex(pattern: &str, flags: &str) -> Self {
        Self {
            mode: SearchMode::Regex,
            keywords: Vec::new(),
            pattern: pattern.to_string(),
            flags: flags.to_string(),
            case_insensitive: false,
        }
    }

    pub fn intersection(keywords: &[&str], case_insensitive: bool) -> Self {
        Self {
            mode: SearchMode::Intersection,
            ..Self::keywords(keywords, case_insensitive)
        }
    }
}

/// One display-ready hotspot entry
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HotspotDisplay {
    /// 1-based rank by density score
    pub rank: usize,
    /// Index to hand back in a navigate request
    #[serde(rename = "areaIndex")]
    pub area_index: usize,
    /// Relative document position, e.g. "42%"
    pub position: String,
    /// Number of matches inside the window
    pub count: usize,
    /// Density score rounded to 2 decimals
    pub score: f64,
    /// Anchor preview, truncated with an ellipsis marker
    pub preview: String,
}

/// Outcome of a completed (or failed) scan
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchResult {
    pub success: bool,
    #[serde(default)]
    pub count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hotspots: Vec<HotspotDisplay>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(
        rename = "missingKeywords",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub missing_keywords: Option<Vec<String>>,
}

impl SearchResult {
    pub fn ok(count: usize, hotspots: Vec<HotspotDisplay>) -> Self {
        Self {
            success: true,
            count,
            hotspots,
            error: None,
            missing_keywords: None,
        }
    }

    pub fn failure(error: &SearchError) -> Self {
        let missing_keywords = match error {
            SearchError::KeywordsNotFound { missing } => Some(missing.clone()),
            _ => None,
        };
        Self {
            success: false,
            count: 0,
            hotspots: Vec::new(),
            error: Some(error.to_string()),
            missing_keywords,
        }
    }
}

/// Throttled progress notification, emitted best-effort during a scan
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub processed: usize,
    pub total: usize,
    /// Always within 0..=100 and non-decreasing across one scan
    pub percent: u32,
    pub matches: usize,
    #[serde(rename = "estimatedSeconds")]
    pub estimated_seconds: u64,
}

/// Injected progress delivery capability. Failures are swallowed by the
/// scheduler; a gone receiver never affects the scan.
pub trait ProgressSink {
    fn publish(&mut self, event: &ProgressEvent) -> Result<(), String>;
}

/// Sink that drops every event
pub struct NullSink;

impl ProgressSink for NullSink {
    fn publish(&mut self, _event: &ProgressEvent) -> Result<(), String> {
        Ok(())
    }
}

/// Sink that records every event, used in tests and simple embedders
#[derive(Default)]
pub struct CollectingSink {
    pub events: Vec<ProgressEvent>,
}

impl ProgressSink for CollectingSink {
    fn publish(&mut self, event: &ProgressEvent) -> Result<(), String> {
        self.events.push(event.clone());
        Ok(())
    }
}
