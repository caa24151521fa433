//! Error taxonomy for the search engine.
//!
//! Every error is caught at the scan entry point and converted into a failed
//! `SearchResult`; nothing crosses the engine boundary as a panic. The
//! `Display` strings double as the wire-level `error` field, so the intersection
//! diagnostics keep the exact phrasing the transport layer shows to users.

use thiserror::Error;

/// Result type for engine operations
pub type EngineResult<T> = std::result::Result<T, SearchError>;

/// Errors that can occur while compiling a pattern or scanning a tree
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SearchError {
    /// Raw pattern failed to compile. Surfaced before any tree mutation.
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    /// Empty keyword list or empty pattern input.
    #[error("No keywords provided")]
    NoKeywords,

    /// Intersection mode: one or more keywords absent from the whole document.
    #[error("Not all keywords found")]
    KeywordsNotFound { missing: Vec<String> },

    /// Intersection mode: every keyword present somewhere, but never together
    /// on one logical line.
    #[error("Keywords found on page, but not in the same line")]
    KeywordsNotCoLocated,

    /// Catch-all for unexpected traversal or mutation failures.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_match_wire_strings() {
        let missing = SearchError::KeywordsNotFound {
            missing: vec!["zzz".to_string()],
        };
        assert_eq!(missing.to_string(), "Not all keywords found");
        assert_eq!(
            SearchError::KeywordsNotCoLocated.to_string(),
            "Keywords found on page, but not in the same line"
        );
        assert_eq!(SearchError::NoKeywords.to_string(), "No keywords provided");
    }

    #[test]
    fn test_invalid_pattern_carries_detail() {
        let err = SearchError::InvalidPattern("unclosed group".to_string());
        assert!(err.to_string().contains("unclosed group"));
    }
}
