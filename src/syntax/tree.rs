//! Arena-backed mutable syntax tree.
//!
//! Nodes live in a `Vec` and are addressed by [`NodeId`]. Each node keeps
//! parent and sibling links, so `tree_next`/`tree_prev` and structural edits
//! (insert, detach, replace) are O(1). Detached nodes stay in the arena until
//! the whole tree is dropped; a detached subtree is just a subtree whose root
//! has no parent, which is what tree surgery splices around.
//!
//! Leaves carry their text; composite nodes derive theirs from their leaves,
//! so the tree is lossless by construction.

use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use text_size::{TextRange, TextSize};
use thiserror::Error;

use crate::parser::SyntaxKind;

/// Handle of a node inside one [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Structural misuse of the arena.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("node {0:?} is still attached to a parent")]
    StillAttached(NodeId),

    #[error("cannot add children to leaf {0:?}")]
    LeafParent(NodeId),

    #[error("inserting {child:?} under {parent:?} would create a cycle")]
    WouldCycle { parent: NodeId, child: NodeId },

    #[error("anchor {anchor:?} is not a child of {parent:?}")]
    AnchorNotChild { parent: NodeId, anchor: NodeId },

    #[error("node {0:?} has no parent")]
    Detached(NodeId),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: SyntaxKind,
    /// `Some` for leaves
    text: Option<SmolStr>,
    parent: Option<NodeId>,
    first_child: Option<NodeId>,
    last_child: Option<NodeId>,
    prev_sibling: Option<NodeId>,
    next_sibling: Option<NodeId>,
}

impl NodeData {
    fn new(kind: SyntaxKind, text: Option<SmolStr>) -> Self {
        Self {
            kind,
            text,
            parent: None,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
        }
    }
}

/// A syntax tree arena. May hold several disjoint subtrees (one attached
/// root plus any number of detached fragments).
#[derive(Debug, Clone, Default)]
pub struct Tree {
    nodes: Vec<NodeData>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes ever allocated, detached ones included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }

    fn data_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.index()]
    }

    // =========================================================================
    // Allocation
    // =========================================================================

    /// Allocate a detached composite node with no children.
    pub fn alloc_node(&mut self, kind: SyntaxKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeData::new(kind, None));
        id
    }

    /// Allocate a detached leaf.
    pub fn alloc_leaf(&mut self, kind: SyntaxKind, text: impl Into<SmolStr>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeData::new(kind, Some(text.into())));
        id
    }

    // =========================================================================
    // Inspection and navigation
    // =========================================================================

    pub fn kind(&self, id: NodeId) -> SyntaxKind {
        self.data(id).kind
    }

    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.data(id).text.is_some()
    }

    pub fn leaf_text(&self, id: NodeId) -> Option<&str> {
        self.data(id).text.as_deref()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.data(id).parent
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.data(id).first_child
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.data(id).last_child
    }

    /// Next sibling in tree order.
    pub fn tree_next(&self, id: NodeId) -> Option<NodeId> {
        self.data(id).next_sibling
    }

    /// Previous sibling in tree order.
    pub fn tree_prev(&self, id: NodeId) -> Option<NodeId> {
        self.data(id).prev_sibling
    }

    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            tree: self,
            next: self.first_child(id),
        }
    }

    /// Strict ancestors, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&n| self.parent(n))
    }

    /// Preorder traversal of `id` and everything below it.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            tree: self,
            root: id,
            next: Some(id),
        }
    }

    pub fn find_child(&self, id: NodeId, kind: SyntaxKind) -> Option<NodeId> {
        self.children(id).find(|&c| self.kind(c) == kind)
    }

    /// First node at or after `start` (following `tree_next`) that is not
    /// whitespace or a comment.
    pub fn skip_trivia_forward(&self, start: Option<NodeId>) -> Option<NodeId> {
        let mut current = start;
        while let Some(node) = current {
            if !self.kind(node).is_trivia() {
                return Some(node);
            }
            current = self.tree_next(node);
        }
        None
    }

    /// First node at or before `start` (following `tree_prev`) that is not
    /// whitespace or a comment.
    pub fn skip_trivia_backward(&self, start: Option<NodeId>) -> Option<NodeId> {
        let mut current = start;
        while let Some(node) = current {
            if !self.kind(node).is_trivia() {
                return Some(node);
            }
            current = self.tree_prev(node);
        }
        None
    }

    /// Whether `ancestor` is `node` or one of its ancestors.
    pub fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        node == ancestor || self.ancestors(node).any(|a| a == ancestor)
    }

    /// The topmost ancestor of `id` (itself when detached).
    pub fn root_of(&self, id: NodeId) -> NodeId {
        self.ancestors(id).last().unwrap_or(id)
    }

    // =========================================================================
    // Text
    // =========================================================================

    pub fn text(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_text(id, &mut out);
        out
    }

    fn write_text(&self, id: NodeId, out: &mut String) {
        for node in self.descendants(id) {
            if let Some(text) = self.leaf_text(node) {
                out.push_str(text);
            }
        }
    }

    pub fn text_len(&self, id: NodeId) -> TextSize {
        self.descendants(id)
            .filter_map(|n| self.leaf_text(n))
            .map(TextSize::of)
            .sum()
    }

    /// Range of `id` relative to the start of its root.
    pub fn text_range(&self, id: NodeId) -> TextRange {
        let mut offset = TextSize::new(0);
        let mut current = id;
        loop {
            let mut prev = self.tree_prev(current);
            while let Some(p) = prev {
                offset += self.text_len(p);
                prev = self.tree_prev(p);
            }
            match self.parent(current) {
                Some(parent) => current = parent,
                None => break,
            }
        }
        TextRange::at(offset, self.text_len(id))
    }

    // =========================================================================
    // Structural edits
    // =========================================================================

    fn check_insertable(&self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        if self.parent(child).is_some() {
            return Err(TreeError::StillAttached(child));
        }
        if self.is_leaf(parent) {
            return Err(TreeError::LeafParent(parent));
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(TreeError::WouldCycle { parent, child });
        }
        Ok(())
    }

    /// Insert detached `child` under `parent` before `anchor`, or at the end
    /// when `anchor` is `None`.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        anchor: Option<NodeId>,
    ) -> Result<(), TreeError> {
        self.check_insertable(parent, child)?;
        let Some(anchor) = anchor else {
            self.link_last(parent, child);
            return Ok(());
        };
        if self.parent(anchor) != Some(parent) {
            return Err(TreeError::AnchorNotChild { parent, anchor });
        }

        let prev = self.tree_prev(anchor);
        {
            let c = self.data_mut(child);
            c.parent = Some(parent);
            c.prev_sibling = prev;
            c.next_sibling = Some(anchor);
        }
        self.data_mut(anchor).prev_sibling = Some(child);
        match prev {
            Some(p) => self.data_mut(p).next_sibling = Some(child),
            None => self.data_mut(parent).first_child = Some(child),
        }
        Ok(())
    }

    /// Insert detached `child` under `parent` right after `anchor`, or as the
    /// first child when `anchor` is `None`.
    pub fn insert_after(
        &mut self,
        parent: NodeId,
        child: NodeId,
        anchor: Option<NodeId>,
    ) -> Result<(), TreeError> {
        match anchor {
            Some(anchor) => {
                if self.parent(anchor) != Some(parent) {
                    return Err(TreeError::AnchorNotChild { parent, anchor });
                }
                let next = self.tree_next(anchor);
                self.insert_before(parent, child, next)
            }
            None => {
                let first = self.first_child(parent);
                self.insert_before(parent, child, first)
            }
        }
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        self.insert_before(parent, child, None)
    }

    fn link_last(&mut self, parent: NodeId, child: NodeId) {
        let last = self.last_child(parent);
        {
            let c = self.data_mut(child);
            c.parent = Some(parent);
            c.prev_sibling = last;
            c.next_sibling = None;
        }
        match last {
            Some(l) => self.data_mut(l).next_sibling = Some(child),
            None => self.data_mut(parent).first_child = Some(child),
        }
        self.data_mut(parent).last_child = Some(child);
    }

    /// Unlink `id` from its parent. The subtree below `id` is kept intact.
    /// Returns the former parent.
    pub fn detach(&mut self, id: NodeId) -> Result<NodeId, TreeError> {
        let parent = self.parent(id).ok_or(TreeError::Detached(id))?;
        let prev = self.tree_prev(id);
        let next = self.tree_next(id);
        match prev {
            Some(p) => self.data_mut(p).next_sibling = next,
            None => self.data_mut(parent).first_child = next,
        }
        match next {
            Some(n) => self.data_mut(n).prev_sibling = prev,
            None => self.data_mut(parent).last_child = prev,
        }
        let d = self.data_mut(id);
        d.parent = None;
        d.prev_sibling = None;
        d.next_sibling = None;
        Ok(parent)
    }

    /// Put detached `new` where `old` is; `old` becomes detached.
    pub fn replace(&mut self, old: NodeId, new: NodeId) -> Result<NodeId, TreeError> {
        let parent = self.parent(old).ok_or(TreeError::Detached(old))?;
        self.check_insertable(parent, new)?;
        self.insert_before(parent, new, Some(old))?;
        self.detach(old)
    }

    /// Clone the subtree rooted at `id` into fresh, detached nodes of this
    /// arena.
    pub fn deep_copy(&mut self, id: NodeId) -> NodeId {
        let originals: Vec<NodeId> = self.descendants(id).collect();
        let root = self.alloc_like(id);
        let mut mapping = FxHashMap::default();
        mapping.insert(id, root);
        // Preorder: a parent is always copied before its children, and
        // siblings are visited in order.
        for src in originals.into_iter().skip(1) {
            let copy = self.alloc_like(src);
            if let Some(parent) = self.parent(src).and_then(|p| mapping.get(&p).copied()) {
                self.link_last(parent, copy);
            }
            mapping.insert(src, copy);
        }
        root
    }

    fn alloc_like(&mut self, src: NodeId) -> NodeId {
        let kind = self.kind(src);
        match self.data(src).text.clone() {
            Some(text) => self.alloc_leaf(kind, text),
            None => self.alloc_node(kind),
        }
    }

    /// Copy the subtree rooted at `id` in `source` into this arena. The copy
    /// is detached; its root id is returned.
    pub fn import_subtree(&mut self, source: &Tree, id: NodeId) -> NodeId {
        let root = match source.leaf_text(id) {
            Some(text) => self.alloc_leaf(source.kind(id), text),
            None => self.alloc_node(source.kind(id)),
        };
        let mut stack = vec![(id, root)];
        while let Some((src, dst)) = stack.pop() {
            for child in source.children(src) {
                let copy = match source.leaf_text(child) {
                    Some(text) => self.alloc_leaf(source.kind(child), text),
                    None => self.alloc_node(source.kind(child)),
                };
                self.link_last(dst, copy);
                if !source.is_leaf(child) {
                    stack.push((child, copy));
                }
            }
        }
        root
    }

    /// Debug rendering: one node per line, indented by depth.
    pub fn debug_dump(&self, id: NodeId) -> String {
        let mut out = String::new();
        let base = self.ancestors(id).count();
        for node in self.descendants(id) {
            let depth = self.ancestors(node).count() - base;
            out.push_str(&"  ".repeat(depth));
            match self.leaf_text(node) {
                Some(text) => out.push_str(&format!("{:?} {:?}\n", self.kind(node), text)),
                None => out.push_str(&format!("{:?}\n", self.kind(node))),
            }
        }
        out
    }
}

/// Iterator over the direct children of a node.
pub struct Children<'a> {
    tree: &'a Tree,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.tree_next(current);
        Some(current)
    }
}

/// Preorder iterator over a subtree.
pub struct Descendants<'a> {
    tree: &'a Tree,
    root: NodeId,
    next: Option<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = match self.tree.first_child(current) {
            Some(child) => Some(child),
            None => {
                let mut node = current;
                loop {
                    if node == self.root {
                        break None;
                    }
                    if let Some(next) = self.tree.tree_next(node) {
                        break Some(next);
                    }
                    match self.tree.parent(node) {
                        Some(parent) => node = parent,
                        None => break None,
                    }
                }
            }
        };
        Some(current)
    }
}
