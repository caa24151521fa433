//! Pagemark: Document Highlighter + Hotspot Engine
//!
//! Scans a content tree for keywords, regex patterns, or same-line keyword
//! intersections, wraps every match in reversible highlight annotations, and
//! ranks the densest regions of the document as navigable hotspots.
//!
//! # Architecture
//!
//! ## Content Tree (`dom`)
//! - `tree.rs` - Arena-backed node tree: containers, text leaves, breaks, annotations
//! - `walker.rs` - Pre-order leaf walk with position offsets, skipping non-renderable regions
//! - `lines.rs` - Logical line assembly for intersection scans
//!
//! ## Engine (`engine`)
//! - `pattern.rs` - Pattern compilation: ranked keyword automatons and JS-flag regexes
//! - `highlighter.rs` - Reversible in-place annotation of leaves and lines
//! - `scheduler.rs` - Batched scan driver with throttled progress and ETA
//! - `hotspot.rs` - Sliding-window density clustering and navigation
//! - `annotations.rs` - Ledger of inserted annotations, reversal
//! - `core.rs` - SearchEngine facade tying it all together
//! - `types.rs` - Request/result/progress boundary types
//! - `config.rs` - Tunables and defaults
//!
//! # Usage
//! ```
//! use pagemark::{ContainerKind, NullSink, SearchEngine, SearchRequest, Tree};
//!
//! let mut tree = Tree::new();
//! let para = tree.append_container(tree.root(), ContainerKind::Block, "p");
//! tree.append_text(para, "the quick brown fox");
//!
//! let mut engine = SearchEngine::default();
//! let result = engine.scan(
//!     &mut tree,
//!     &SearchRequest::keywords(&["quick", "fox"], false),
//!     &mut NullSink,
//! );
//! assert!(result.success);
//! assert_eq!(result.count, 2);
//!
//! // Clearing restores the original text exactly.
//! engine.clear(&mut tree);
//! assert_eq!(tree.renderable_text(), "the quick brown fox");
//! ```

pub mod dom;
pub mod engine;
pub mod error;

pub use dom::*;
pub use engine::*;
pub use error::*;
