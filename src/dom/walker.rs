//! Leaf enumeration over the content tree
//!
//! Produces the document-order (pre-order, depth-first) stream of text leaves
//! with their document-relative offsets. "Position units" throughout the
//! engine are byte offsets into the renderable text of the document, so two
//! scans over an unmodified tree always agree on where a match sits.
//!
//! Exclusion rules (applied per candidate, no side effects):
//! - leaves inside a non-renderable container are skipped entirely
//! - leaves inside an engine-introduced annotation are visited for offset
//!   accounting but marked ineligible, so a re-scan never highlights its own
//!   output
//! - whitespace-only leaves are ineligible

use super::tree::{ContainerKind, Node, NodeId, Tree};

/// One text leaf encountered during a walk
#[derive(Clone, Debug)]
pub struct LeafVisit {
    pub id: NodeId,
    /// Byte offset of the leaf's text within the document's renderable text
    pub offset: usize,
    /// Whether the leaf passes the scan-eligibility predicate
    pub eligible: bool,
}

/// Lazy pre-order iterator over renderable text leaves
pub struct LeafIter<'a> {
    tree: &'a Tree,
    // (node, inside_annotation)
    stack: Vec<(NodeId, bool)>,
    offset: usize,
}

impl<'a> LeafIter<'a> {
    pub fn new(tree: &'a Tree) -> Self {
        Self {
            tree,
            stack: vec![(tree.root(), false)],
            offset: 0,
        }
    }
}

impl Iterator for LeafIter<'_> {
    type Item = LeafVisit;

    fn next(&mut self) -> Option<LeafVisit> {
        while let Some((id, in_annotation)) = self.stack.pop() {
            match self.tree.node(id) {
                Node::Leaf { text } => {
                    let visit = LeafVisit {
                        id,
                        offset: self.offset,
                        eligible: !in_annotation && !text.trim().is_empty(),
                    };
                    self.offset += text.len();
                    return Some(visit);
                }
                Node::Container { kind, children, .. } => {
                    if kind.renderable() {
                        for &child in children.iter().rev() {
                            self.stack.push((child, in_annotation));
                        }
                    }
                }
                Node::Annotation { children, .. } => {
                    for &child in children.iter().rev() {
                        self.stack.push((child, true));
                    }
                }
                Node::Break => {}
            }
        }
        None
    }
}

/// Snapshot of a full walk, taken before a scan starts so that tree mutation
/// during the scan cannot disturb the unit stream
#[derive(Clone, Debug, Default)]
pub struct WalkSnapshot {
    pub visits: Vec<LeafVisit>,
    /// Total renderable text length; the document extent for hotspot display
    pub extent: usize,
}

impl WalkSnapshot {
    pub fn capture(tree: &Tree) -> Self {
        let mut iter = LeafIter::new(tree);
        let mut visits = Vec::new();
        for visit in iter.by_ref() {
            visits.push(visit);
        }
        let extent = iter.offset;
        Self { visits, extent }
    }

    /// The eligible leaves, in document order
    pub fn eligible(&self) -> Vec<LeafVisit> {
        self.visits.iter().filter(|v| v.eligible).cloned().collect()
    }
}

/// Convenience: lazy eligible-leaf stream
pub fn eligible_leaves(tree: &Tree) -> impl Iterator<Item = LeafVisit> + '_ {
    LeafIter::new(tree).filter(|v| v.eligible)
}
