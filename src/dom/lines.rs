//! Logical line assembly for intersection mode
//!
//! Groups text leaves into the lines a reader perceives: inline containers are
//! transparent, explicit breaks and nested block containers terminate the
//! current line, and every block container produces its own independent line
//! sequence (lines never cross block boundaries). Whitespace-only lines are
//! suppressed.

use std::collections::HashMap;

use super::tree::{ContainerKind, Node, NodeId, Tree};
use super::walker::WalkSnapshot;

/// A leaf participating in a logical line
#[derive(Clone, Debug)]
pub struct LineLeaf {
    pub id: NodeId,
    /// Document-relative offset of the leaf, from the walk snapshot
    pub offset: usize,
}

/// An ordered run of leaves rendered on one visual line
#[derive(Clone, Debug)]
pub struct LogicalLine {
    pub leaves: Vec<LineLeaf>,
    /// Concatenated text of the constituent leaves
    pub text: String,
}

struct LineAccumulator {
    leaves: Vec<LineLeaf>,
    text: String,
}

impl LineAccumulator {
    fn new() -> Self {
        Self {
            leaves: Vec::new(),
            text: String::new(),
        }
    }

    fn push(&mut self, leaf: LineLeaf, text: &str) {
        self.leaves.push(leaf);
        self.text.push_str(text);
    }

    fn flush(&mut self, lines: &mut Vec<LogicalLine>) {
        if !self.text.trim().is_empty() {
            lines.push(LogicalLine {
                leaves: std::mem::take(&mut self.leaves),
                text: std::mem::take(&mut self.text),
            });
        } else {
            self.leaves.clear();
            self.text.clear();
        }
    }
}

/// Assemble all logical lines of the document, in document order
pub fn assemble_lines(tree: &Tree, snapshot: &WalkSnapshot) -> Vec<LogicalLine> {
    let offsets: HashMap<NodeId, usize> = snapshot
        .visits
        .iter()
        .map(|v| (v.id, v.offset))
        .collect();

    let mut lines = Vec::new();
    let mut blocks = vec![tree.root()];
    let mut cursor = 0;
    while cursor < blocks.len() {
        let block = blocks[cursor];
        cursor += 1;
        let mut acc = LineAccumulator::new();
        collect_block(tree, block, &offsets, &mut acc, &mut lines, &mut blocks);
        acc.flush(&mut lines);
    }
    lines
}

fn collect_block(
    tree: &Tree,
    container: NodeId,
    offsets: &HashMap<NodeId, usize>,
    acc: &mut LineAccumulator,
    lines: &mut Vec<LogicalLine>,
    blocks: &mut Vec<NodeId>,
) {
    for &child in tree.children(container) {
        match tree.node(child) {
            Node::Leaf { text } => {
                // Leaves under non-renderable regions never appear in the
                // snapshot; skip them here too.
                if let Some(&offset) = offsets.get(&child) {
                    acc.push(LineLeaf { id: child, offset }, text);
                }
            }
            Node::Break => acc.flush(lines),
            Node::Container { kind, .. } => match kind {
                ContainerKind::Inline => {
                    collect_block(tree, child, offsets, acc, lines, blocks);
                }
                ContainerKind::Block => {
                    acc.flush(lines);
                    blocks.push(child);
                }
                ContainerKind::NonRenderable => {}
            },
            // Annotations are cleared before a scan begins; treat any that
            // remain as transparent inline structure.
            Node::Annotation { .. } => {
                collect_block(tree, child, offsets, acc, lines, blocks);
            }
        }
    }
}
