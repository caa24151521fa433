//! Arena-backed content tree
//!
//! The tree the engine scans and mutates. Nodes live in a single arena and are
//! addressed by index, so ids stay stable across edits and the annotation
//! ledger can refer to highlights without bidirectional pointers. The node set
//! is a closed tagged variant: structural containers (with an explicit
//! renderable capability per kind), explicit line breaks, text leaves, and the
//! annotation wrappers the engine itself introduces during a scan.
//!
//! Invariant: every mutation the engine performs is exactly reversible to the
//! pre-mutation text content. Annotations always wrap plain leaves, never
//! other structure.

use serde::{Deserialize, Serialize};

/// Opaque node identifier: index into the tree arena
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Structural classification of a container
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContainerKind {
    /// Starts a new logical line; scanned as an independent line scope
    Block,
    /// Transparent to line assembly
    Inline,
    /// Script-like region; its subtree is never scanned or rendered
    NonRenderable,
}

impl ContainerKind {
    pub fn renderable(self) -> bool {
        !matches!(self, ContainerKind::NonRenderable)
    }
}

/// Kind of engine-introduced annotation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnnotationKind {
    /// A keyword or pattern match span; `color` is a palette index
    Mark { color: usize },
    /// Low-emphasis row background used by intersection mode. `row_start`
    /// marks the first background span of a matched line.
    RowBackground { row_start: bool },
}

/// A node in the content tree
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Container {
        kind: ContainerKind,
        label: String,
        children: Vec<NodeId>,
    },
    /// Highlight wrapper created by the engine; children hold the original text
    Annotation {
        kind: AnnotationKind,
        children: Vec<NodeId>,
    },
    /// Contiguous run of raw text
    Leaf { text: String },
    /// Explicit line terminator
    Break,
}

impl Node {
    pub fn children(&self) -> &[NodeId] {
        match self {
            Node::Container { children, .. } | Node::Annotation { children, .. } => children,
            _ => &[],
        }
    }

    pub fn is_annotation(&self) -> bool {
        matches!(self, Node::Annotation { .. })
    }
}

/// Arena-backed content tree
#[derive(Clone, Debug)]
pub struct Tree {
    nodes: Vec<Node>,
    parents: Vec<Option<NodeId>>,
    root: NodeId,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// Create a tree with a single root block container
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::Container {
                kind: ContainerKind::Block,
                label: "root".to_string(),
                children: Vec::new(),
            }],
            parents: vec![None],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parents[id.index()]
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).children()
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        self.parents.push(None);
        id
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) {
        self.parents[child.index()] = Some(parent);
        match &mut self.nodes[parent.index()] {
            Node::Container { children, .. } | Node::Annotation { children, .. } => {
                children.push(child);
            }
            _ => {}
        }
    }

    /// Append a child container and return its id
    pub fn append_container(&mut self, parent: NodeId, kind: ContainerKind, label: &str) -> NodeId {
        let id = self.alloc(Node::Container {
            kind,
            label: label.to_string(),
            children: Vec::new(),
        });
        self.attach(parent, id);
        id
    }

    /// Append a text leaf and return its id
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        let id = self.alloc(Node::Leaf {
            text: text.to_string(),
        });
        self.attach(parent, id);
        id
    }

    /// Append an explicit line break
    pub fn append_break(&mut self, parent: NodeId) -> NodeId {
        let id = self.alloc(Node::Break);
        self.attach(parent, id);
        id
    }

    /// Create a detached leaf, to be attached via `replace_child`
    pub fn new_leaf(&mut self, text: &str) -> NodeId {
        self.alloc(Node::Leaf {
            text: text.to_string(),
        })
    }

    /// Create a detached annotation wrapping a single text leaf
    pub fn new_annotation(&mut self, kind: AnnotationKind, text: &str) -> NodeId {
        let leaf = self.alloc(Node::Leaf {
            text: text.to_string(),
        });
        let id = self.alloc(Node::Annotation {
            kind,
            children: Vec::new(),
        });
        self.attach(id, leaf);
        id
    }

    /// True if the node can be reached from the root via parent links
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = id;
        loop {
            if current == self.root {
                return true;
            }
            match self.parent(current) {
                Some(p) => current = p,
                None => return false,
            }
        }
    }

    /// Replace `old_child` in `parent`'s child list with `replacements`.
    /// The old child is detached (its parent link is cleared) but stays in the
    /// arena. Returns false if `old_child` is not a child of `parent`.
    pub fn replace_child(
        &mut self,
        parent: NodeId,
        old_child: NodeId,
        replacements: &[NodeId],
    ) -> bool {
        let position = match &self.nodes[parent.index()] {
            Node::Container { children, .. } | Node::Annotation { children, .. } => {
                children.iter().position(|&c| c == old_child)
            }
            _ => None,
        };
        let Some(position) = position else {
            return false;
        };
        match &mut self.nodes[parent.index()] {
            Node::Container { children, .. } | Node::Annotation { children, .. } => {
                children.splice(position..position + 1, replacements.iter().copied());
            }
            _ => return false,
        }
        self.parents[old_child.index()] = None;
        for &id in replacements {
            self.parents[id.index()] = Some(parent);
        }
        true
    }

    /// Concatenated text of a subtree, in pre-order
    pub fn text_of(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, false, &mut out);
        out
    }

    /// Concatenated text of the whole document, skipping non-renderable regions
    pub fn renderable_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(self.root, true, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, renderable_only: bool, out: &mut String) {
        match self.node(id) {
            Node::Leaf { text } => out.push_str(text),
            Node::Container { kind, children, .. } => {
                if renderable_only && !kind.renderable() {
                    return;
                }
                for &child in children {
                    self.collect_text(child, renderable_only, out);
                }
            }
            Node::Annotation { children, .. } => {
                for &child in children {
                    self.collect_text(child, renderable_only, out);
                }
            }
            Node::Break => {}
        }
    }

    /// Merge adjacent text leaves under `parent` and drop empty ones, the way
    /// DOM `normalize()` restores a tree after highlight removal. Merged and
    /// dropped leaves are detached.
    pub fn normalize_children(&mut self, parent: NodeId) {
        let old_children: Vec<NodeId> = self.children(parent).to_vec();
        let mut merged: Vec<NodeId> = Vec::with_capacity(old_children.len());
        let mut detached: Vec<NodeId> = Vec::new();
        let mut pending_text: Option<(NodeId, String)> = None;

        for child in old_children {
            match self.node(child) {
                Node::Leaf { text } => {
                    let text = text.clone();
                    match pending_text.as_mut() {
                        Some((_, acc)) => {
                            acc.push_str(&text);
                            detached.push(child);
                        }
                        None => pending_text = Some((child, text)),
                    }
                }
                _ => {
                    if let Some((id, text)) = pending_text.take() {
                        if text.is_empty() {
                            detached.push(id);
                        } else {
                            self.nodes[id.index()] = Node::Leaf { text };
                            merged.push(id);
                        }
                    }
                    merged.push(child);
                }
            }
        }
        if let Some((id, text)) = pending_text.take() {
            if text.is_empty() {
                detached.push(id);
            } else {
                self.nodes[id.index()] = Node::Leaf { text };
                merged.push(id);
            }
        }

        for id in detached {
            self.parents[id.index()] = None;
        }
        if let Node::Container { children, .. } | Node::Annotation { children, .. } =
            &mut self.nodes[parent.index()]
        {
            *children = merged;
        }
    }

    /// Number of annotation nodes still attached anywhere in the tree
    pub fn attached_annotation_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            if self.node(id).is_annotation() {
                count += 1;
            }
            stack.extend(self.children(id).iter().copied());
        }
        count
    }
}
