//! Highlight insertion
//!
//! Locates matches inside a leaf, splits the leaf into plain and annotated
//! segments, and swaps the fragment into the tree in place. Every annotation
//! goes through the ledger so Clear can find it later, and every match span
//! records a hotspot sample at its document-relative position.
//!
//! Intersection mode rewrites whole matched lines: keyword occurrences become
//! high-emphasis marks, everything else on the line becomes a low-emphasis
//! row background span, and the first background span of the line carries the
//! row-start marker.

use crate::dom::{AnnotationKind, LogicalLine, Node, NodeId, Tree};
use crate::engine::annotations::AnnotationLedger;
use crate::engine::hotspot::HotspotSample;
use crate::engine::pattern::{CompiledPattern, KeywordMatcher};

/// Trimmed preview of matched text, bounded by the sample budget
fn sample_preview(matched: &str, budget: usize) -> String {
    let clipped: String = matched.chars().take(budget).collect();
    clipped.trim().to_string()
}

fn leaf_text(tree: &Tree, id: NodeId) -> Option<String> {
    match tree.node(id) {
        Node::Leaf { text } => Some(text.clone()),
        _ => None,
    }
}

/// Highlight all matches inside one leaf (OR/regex modes).
///
/// Returns the number of matches. `first_only` stops after one match for
/// non-global regex scans. An untouched leaf means zero matches.
pub fn highlight_leaf(
    tree: &mut Tree,
    leaf: NodeId,
    leaf_offset: usize,
    matcher: &CompiledPattern,
    first_only: bool,
    preview_budget: usize,
    ledger: &mut AnnotationLedger,
    samples: &mut Vec<HotspotSample>,
) -> usize {
    let Some(text) = leaf_text(tree, leaf) else {
        return 0;
    };
    let Some(parent) = tree.parent(leaf) else {
        return 0;
    };

    let mut spans = matcher.find_spans(&text);
    if first_only {
        spans.truncate(1);
    }
    if spans.is_empty() {
        return 0;
    }

    let mut replacements: Vec<NodeId> = Vec::with_capacity(spans.len() * 2 + 1);
    let mut cursor = 0;
    for span in &spans {
        if span.start > cursor {
            let before = tree.new_leaf(&text[cursor..span.start]);
            replacements.push(before);
        }
        let matched = &text[span.start..span.end];
        let mark = tree.new_annotation(AnnotationKind::Mark { color: span.color() }, matched);
        let handle = ledger.record(mark);
        samples.push(HotspotSample {
            position: leaf_offset + span.start,
            preview: sample_preview(matched, preview_budget),
            handle,
        });
        replacements.push(mark);
        cursor = span.end;
    }
    if cursor < text.len() {
        let after = tree.new_leaf(&text[cursor..]);
        replacements.push(after);
    }

    tree.replace_child(parent, leaf, &replacements);
    spans.len()
}

/// Rewrite one matched line (intersection mode). Every constituent leaf is
/// replaced: keyword spans become marks, uncovered portions become row
/// background annotations. Returns the number of keyword spans created.
pub fn highlight_line(
    tree: &mut Tree,
    line: &LogicalLine,
    matcher: &KeywordMatcher,
    preview_budget: usize,
    ledger: &mut AnnotationLedger,
    samples: &mut Vec<HotspotSample>,
) -> usize {
    let mut keyword_spans = 0;
    let mut row_start_pending = true;

    for line_leaf in &line.leaves {
        let Some(text) = leaf_text(tree, line_leaf.id) else {
            continue;
        };
        let Some(parent) = tree.parent(line_leaf.id) else {
            continue;
        };

        let spans = matcher.find_spans(&text);
        let mut replacements: Vec<NodeId> = Vec::with_capacity(spans.len() * 2 + 1);

        let mut push_background = |tree: &mut Tree,
                                   ledger: &mut AnnotationLedger,
                                   replacements: &mut Vec<NodeId>,
                                   segment: &str,
                                   at_leaf_start: bool| {
            let row_start = row_start_pending && at_leaf_start;
            if row_start {
                row_start_pending = false;
            }
            let bg = tree.new_annotation(AnnotationKind::RowBackground { row_start }, segment);
            ledger.record(bg);
            replacements.push(bg);
        };

        if spans.is_empty() {
            // No keyword in this leaf; the whole run still gets the row style
            push_background(tree, ledger, &mut replacements, &text, true);
        } else {
            let mut cursor = 0;
            for span in &spans {
                if span.start > cursor {
                    push_background(
                        tree,
                        ledger,
                        &mut replacements,
                        &text[cursor..span.start],
                        cursor == 0,
                    );
                }
                let matched = &text[span.start..span.end];
                let mark =
                    tree.new_annotation(AnnotationKind::Mark { color: span.color() }, matched);
                let handle = ledger.record(mark);
                samples.push(HotspotSample {
                    position: line_leaf.offset + span.start,
                    preview: sample_preview(matched, preview_budget),
                    handle,
                });
                replacements.push(mark);
                keyword_spans += 1;
                cursor = span.end;
            }
            if cursor < text.len() {
                push_background(tree, ledger, &mut replacements, &text[cursor..], false);
            }
        }

        tree.replace_child(parent, line_leaf.id, &replacements);
    }

    keyword_spans
}
