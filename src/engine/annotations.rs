//! Annotation ledger and reversal
//!
//! Every highlight the engine introduces is recorded here, indexed by an
//! opaque handle. Clear walks the ledger rather than the tree, so it removes
//! exactly the introduced set even if other actors have mutated the tree
//! since the scan; records whose node is no longer attached are skipped.

use crate::dom::{NodeId, Tree};

/// Opaque handle into the annotation ledger
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AnnotationHandle(u32);

#[derive(Clone, Debug)]
struct AnnotationRecord {
    node: NodeId,
}

/// Arena of annotation records for the current scan
#[derive(Clone, Debug, Default)]
pub struct AnnotationLedger {
    records: Vec<AnnotationRecord>,
}

impl AnnotationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a newly attached annotation node
    pub fn record(&mut self, node: NodeId) -> AnnotationHandle {
        let handle = AnnotationHandle(self.records.len() as u32);
        self.records.push(AnnotationRecord { node });
        handle
    }

    /// Resolve a handle back to its annotation node
    pub fn node(&self, handle: AnnotationHandle) -> Option<NodeId> {
        self.records.get(handle.0 as usize).map(|r| r.node)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Undo every recorded annotation: replace each with its plain text, then
/// merge adjacent text leaves so the tree returns to its pre-scan shape.
/// Safe to call when the ledger is empty.
pub fn clear_annotations(tree: &mut Tree, ledger: &mut AnnotationLedger) {
    let mut touched: Vec<NodeId> = Vec::new();
    for record in &ledger.records {
        if !tree.is_attached(record.node) {
            continue;
        }
        let Some(parent) = tree.parent(record.node) else {
            continue;
        };
        let text = tree.text_of(record.node);
        let leaf = tree.new_leaf(&text);
        if tree.replace_child(parent, record.node, &[leaf]) && !touched.contains(&parent) {
            touched.push(parent);
        }
    }
    for parent in touched {
        tree.normalize_children(parent);
    }
    ledger.records.clear();
}
