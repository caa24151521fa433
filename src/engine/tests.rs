//! End-to-end engine scenarios: scan, reverse, rescan, hotspots, progress

use crate::dom::{ContainerKind, NodeId, Tree};
use crate::engine::config::EngineConfig;
use crate::engine::core::SearchEngine;
use crate::engine::hotspot::Navigator;
use crate::engine::types::{CollectingSink, NullSink, SearchRequest};

fn paragraph_doc(paragraphs: &[&str]) -> Tree {
    let mut tree = Tree::new();
    for text in paragraphs {
        let p = tree.append_container(tree.root(), ContainerKind::Block, "p");
        tree.append_text(p, text);
    }
    tree
}

#[derive(Default)]
struct TestNavigator {
    scrolled_nodes: Vec<NodeId>,
    scrolled_offsets: Vec<usize>,
    flashed: Vec<NodeId>,
}

impl Navigator for TestNavigator {
    fn scroll_to_node(&mut self, node: NodeId) {
        self.scrolled_nodes.push(node);
    }

    fn scroll_to_offset(&mut self, offset: usize) {
        self.scrolled_offsets.push(offset);
    }

    fn flash(&mut self, node: NodeId) {
        self.flashed.push(node);
    }
}

#[test]
fn test_keyword_scan_counts_every_occurrence() {
    let mut tree = paragraph_doc(&["the quick fox", "a lazy fox and a quick dog"]);
    let mut engine = SearchEngine::default();

    let result = engine.scan(
        &mut tree,
        &SearchRequest::keywords(&["fox", "quick"], false),
        &mut NullSink,
    );

    assert!(result.success, "{:?}", result.error);
    assert_eq!(result.count, 4);
    assert!(tree.attached_annotation_count() > 0);
}

#[test]
fn test_scan_preserves_rendered_text() {
    let mut tree = paragraph_doc(&["alpha beta gamma", "beta beta"]);
    let before = tree.renderable_text();
    let mut engine = SearchEngine::default();

    let result = engine.scan(
        &mut tree,
        &SearchRequest::keywords(&["beta"], false),
        &mut NullSink,
    );

    assert!(result.success);
    assert_eq!(tree.renderable_text(), before);
}

#[test]
fn test_clear_is_a_full_reversal() {
    let mut tree = paragraph_doc(&["one two three", "two four"]);
    let before = tree.renderable_text();
    let mut engine = SearchEngine::default();

    engine.scan(
        &mut tree,
        &SearchRequest::keywords(&["two"], false),
        &mut NullSink,
    );
    assert!(tree.attached_annotation_count() > 0);

    engine.clear(&mut tree);
    assert_eq!(tree.attached_annotation_count(), 0);
    assert_eq!(tree.renderable_text(), before);
    assert!(engine.hotspots().is_empty());

    // A second clear has nothing left to undo.
    engine.clear(&mut tree);
    assert_eq!(tree.renderable_text(), before);
}

#[test]
fn test_new_scan_reverses_the_previous_one() {
    let mut tree = paragraph_doc(&["apples and oranges"]);
    let mut engine = SearchEngine::default();

    let first = engine.scan(
        &mut tree,
        &SearchRequest::keywords(&["apples"], false),
        &mut NullSink,
    );
    assert_eq!(first.count, 1);

    let second = engine.scan(
        &mut tree,
        &SearchRequest::keywords(&["oranges"], false),
        &mut NullSink,
    );
    assert_eq!(second.count, 1);

    // Only the second scan's marks remain.
    assert_eq!(tree.attached_annotation_count(), 1);
    assert_eq!(tree.renderable_text(), "apples and oranges");
}

#[test]
fn test_case_insensitive_keywords() {
    let mut tree = paragraph_doc(&["Rust and RUST and rust"]);
    let mut engine = SearchEngine::default();

    let result = engine.scan(
        &mut tree,
        &SearchRequest::keywords(&["rust"], true),
        &mut NullSink,
    );

    assert!(result.success);
    assert_eq!(result.count, 3);
}

#[test]
fn test_empty_keyword_list_is_rejected() {
    let mut tree = paragraph_doc(&["anything"]);
    let mut engine = SearchEngine::default();

    let result = engine.scan(&mut tree, &SearchRequest::keywords(&[], false), &mut NullSink);

    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("No keywords provided"));
    assert_eq!(tree.attached_annotation_count(), 0);
}

#[test]
fn test_invalid_regex_is_rejected_before_any_mutation() {
    let mut tree = paragraph_doc(&["some text"]);
    let mut engine = SearchEngine::default();

    engine.scan(
        &mut tree,
        &SearchRequest::keywords(&["text"], false),
        &mut NullSink,
    );
    assert!(tree.attached_annotation_count() > 0);

    let result = engine.scan(&mut tree, &SearchRequest::regex("(unclosed", "g"), &mut NullSink);
    assert!(!result.success);
    let message = result.error.unwrap_or_default();
    assert!(message.starts_with("Invalid pattern:"), "{message}");

    // Failed compilation leaves the previous highlights untouched.
    assert!(tree.attached_annotation_count() > 0);
}

#[test]
fn test_non_renderable_subtrees_are_skipped() {
    let mut tree = Tree::new();
    let p = tree.append_container(tree.root(), ContainerKind::Block, "p");
    tree.append_text(p, "visible token");
    let script = tree.append_container(tree.root(), ContainerKind::NonRenderable, "script");
    tree.append_text(script, "token token token");

    let mut engine = SearchEngine::default();
    let result = engine.scan(
        &mut tree,
        &SearchRequest::keywords(&["token"], false),
        &mut NullSink,
    );

    assert_eq!(result.count, 1);
}

#[test]
fn test_non_global_regex_stops_after_first_match() {
    let mut tree = paragraph_doc(&["one match", "another match", "a third match"]);
    let mut engine = SearchEngine::default();

    let result = engine.scan(&mut tree, &SearchRequest::regex("match", ""), &mut NullSink);

    assert!(result.success);
    assert_eq!(result.count, 1);
    assert_eq!(tree.attached_annotation_count(), 1);
}

#[test]
fn test_global_regex_counts_all_matches() {
    let mut tree = paragraph_doc(&["id 12, id 345", "id 6"]);
    let mut engine = SearchEngine::default();

    let result = engine.scan(&mut tree, &SearchRequest::regex(r"\d+", "g"), &mut NullSink);

    assert!(result.success);
    assert_eq!(result.count, 3);
}

#[test]
fn test_zero_width_capable_regex_terminates() {
    let text = "ab ".repeat(500);
    let mut tree = paragraph_doc(&[text.as_str()]);
    let mut engine = SearchEngine::default();

    let result = engine.scan(&mut tree, &SearchRequest::regex("a*", "g"), &mut NullSink);

    assert!(result.success);
    assert!(result.count >= 500);
    assert_eq!(tree.renderable_text(), text);
}

#[test]
fn test_intersection_highlights_only_complete_lines() {
    let mut tree = paragraph_doc(&["foo bar", "foo baz", "bar alone"]);
    let mut engine = SearchEngine::default();

    let result = engine.scan(
        &mut tree,
        &SearchRequest::intersection(&["foo", "bar"], false),
        &mut NullSink,
    );

    assert!(result.success, "{:?}", result.error);
    // Keyword spans in the one complete line: "foo" and "bar".
    assert_eq!(result.count, 2);
    assert_eq!(tree.renderable_text(), "foo barfoo bazbar alone");
}

#[test]
fn test_intersection_reports_missing_keywords() {
    let mut tree = paragraph_doc(&["foo something"]);
    let mut engine = SearchEngine::default();

    let result = engine.scan(
        &mut tree,
        &SearchRequest::intersection(&["foo", "zzz"], false),
        &mut NullSink,
    );

    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("Not all keywords found"));
    assert_eq!(result.missing_keywords, Some(vec!["zzz".to_string()]));
    assert_eq!(tree.attached_annotation_count(), 0);
}

#[test]
fn test_intersection_distinguishes_not_co_located() {
    let mut tree = paragraph_doc(&["foo on its own line", "bar somewhere else"]);
    let mut engine = SearchEngine::default();

    let result = engine.scan(
        &mut tree,
        &SearchRequest::intersection(&["foo", "bar"], false),
        &mut NullSink,
    );

    assert!(!result.success);
    assert_eq!(
        result.error.as_deref(),
        Some("Keywords found on page, but not in the same line")
    );
    assert!(result.missing_keywords.is_none());
}

#[test]
fn test_hotspots_capped_at_three() {
    // Five dense bursts of the keyword, far enough apart that each forms its
    // own window.
    let filler = "x".repeat(400);
    let burst = "hit hit hit hit";
    let paragraphs: Vec<String> = (0..5)
        .flat_map(|_| [burst.to_string(), filler.clone()])
        .collect();
    let refs: Vec<&str> = paragraphs.iter().map(String::as_str).collect();
    let mut tree = paragraph_doc(&refs);

    let mut engine = SearchEngine::default();
    let result = engine.scan(
        &mut tree,
        &SearchRequest::keywords(&["hit"], false),
        &mut NullSink,
    );

    assert!(result.success);
    assert_eq!(result.count, 20);
    assert!(!result.hotspots.is_empty());
    assert!(result.hotspots.len() <= 3);
    for (index, hotspot) in result.hotspots.iter().enumerate() {
        assert_eq!(hotspot.rank, index + 1);
        assert_eq!(hotspot.area_index, index);
        assert!(hotspot.count >= 2);
    }
    // Ordered by density, best first.
    for pair in result.hotspots.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
    assert_eq!(engine.hotspots(), result.hotspots);
}

#[test]
fn test_single_match_still_yields_a_hotspot() {
    let mut tree = paragraph_doc(&["just one needle here"]);
    let mut engine = SearchEngine::default();

    let result = engine.scan(
        &mut tree,
        &SearchRequest::keywords(&["needle"], false),
        &mut NullSink,
    );

    assert!(result.success);
    assert_eq!(result.hotspots.len(), 1);
    assert_eq!(result.hotspots[0].count, 1);
    assert_eq!(result.hotspots[0].score, 0.0);
}

#[test]
fn test_navigate_to_live_hotspot_anchor() {
    let mut tree = paragraph_doc(&["alpha alpha alpha"]);
    let mut engine = SearchEngine::default();

    let result = engine.scan(
        &mut tree,
        &SearchRequest::keywords(&["alpha"], false),
        &mut NullSink,
    );
    assert!(!result.hotspots.is_empty());

    let mut nav = TestNavigator::default();
    assert!(engine.navigate(&tree, 0, &mut nav));
    assert_eq!(nav.scrolled_nodes.len(), 1);
    assert_eq!(nav.flashed, nav.scrolled_nodes);

    assert!(!engine.navigate(&tree, 99, &mut nav));
}

#[test]
fn test_navigate_falls_back_to_offset_after_clear() {
    let mut tree = paragraph_doc(&["padding before the ", "beacon beacon"]);
    let mut engine = SearchEngine::default();

    engine.scan(
        &mut tree,
        &SearchRequest::keywords(&["beacon"], false),
        &mut NullSink,
    );
    let clusters = engine.clusters.clone();
    engine.clear(&mut tree);
    engine.clusters = clusters;

    // Anchors are detached now; navigation degrades to the recorded offset.
    let mut nav = TestNavigator::default();
    assert!(engine.navigate(&tree, 0, &mut nav));
    assert!(nav.scrolled_nodes.is_empty());
    assert_eq!(nav.scrolled_offsets.len(), 1);
    assert!(nav.flashed.is_empty());
}

#[test]
fn test_progress_events_are_monotonic_and_bounded() {
    let mut config = EngineConfig::default();
    config.scan.batch_leaves = 1;
    config.scan.progress_interval_ms = 0;

    let paragraphs: Vec<String> = (0..12).map(|i| format!("line {i} word")).collect();
    let refs: Vec<&str> = paragraphs.iter().map(String::as_str).collect();
    let mut tree = paragraph_doc(&refs);

    let mut engine = SearchEngine::new(config);
    let mut sink = CollectingSink::default();
    let result = engine.scan(
        &mut tree,
        &SearchRequest::keywords(&["word"], false),
        &mut sink,
    );

    assert!(result.success);
    assert!(!sink.events.is_empty());
    let mut last_percent = 0;
    for event in &sink.events {
        assert!(event.percent <= 100);
        assert!(event.percent >= last_percent);
        assert!(event.processed <= event.total);
        last_percent = event.percent;
    }
}

#[test]
fn test_alternation_regex_counts_each_branch() {
    let mut tree = paragraph_doc(&["cat dog cat", "dog bird"]);
    let mut engine = SearchEngine::default();

    let result = engine.scan(
        &mut tree,
        &SearchRequest::regex("(cat|dog)", "g"),
        &mut NullSink,
    );

    assert!(result.success);
    assert_eq!(result.count, 4);
}

#[test]
fn test_later_keywords_win_overlapping_matches() {
    let mut tree = paragraph_doc(&["category theory"]);
    let mut engine = SearchEngine::default();

    let result = engine.scan(
        &mut tree,
        &SearchRequest::keywords(&["cat", "category"], false),
        &mut NullSink,
    );

    assert!(result.success);
    // "category" outranks its "cat" prefix, so the span is consumed once.
    assert_eq!(result.count, 1);
    assert_eq!(tree.attached_annotation_count(), 1);
}
