//! Event-style tree construction.
//!
//! Mirrors the green-node builder workflow: `start_node` / `token` /
//! `finish_node`, plus checkpoints so a node can be opened retroactively
//! around children that were already emitted (binary expressions, casts).

use smol_str::SmolStr;

use super::tree::{NodeId, Tree};
use crate::parser::SyntaxKind;

/// Position in the builder to wrap from later.
#[derive(Debug, Clone, Copy)]
pub struct Checkpoint {
    parent: NodeId,
    last_child: Option<NodeId>,
}

#[derive(Debug)]
pub struct TreeBuilder {
    tree: Tree,
    stack: Vec<NodeId>,
    root: Option<NodeId>,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self {
            tree: Tree::new(),
            stack: Vec::new(),
            root: None,
        }
    }

    fn attach(&mut self, node: NodeId) {
        match self.stack.last() {
            Some(&parent) => {
                // A freshly allocated node is detached and the parent is a
                // composite on the stack, so linking cannot fail.
                let _ = self.tree.append_child(parent, node);
            }
            None => {
                if self.root.is_none() {
                    self.root = Some(node);
                }
            }
        }
    }

    pub fn start_node(&mut self, kind: SyntaxKind) {
        let node = self.tree.alloc_node(kind);
        self.attach(node);
        self.stack.push(node);
    }

    pub fn token(&mut self, kind: SyntaxKind, text: impl Into<SmolStr>) {
        let leaf = self.tree.alloc_leaf(kind, text);
        self.attach(leaf);
    }

    pub fn finish_node(&mut self) {
        self.stack.pop();
    }

    /// Remember the current insertion point. Only valid while a node is open.
    pub fn checkpoint(&self) -> Option<Checkpoint> {
        let parent = *self.stack.last()?;
        Some(Checkpoint {
            parent,
            last_child: self.tree.last_child(parent),
        })
    }

    /// Open a node of `kind` that adopts every child emitted since `checkpoint`.
    pub fn start_node_at(&mut self, checkpoint: Checkpoint, kind: SyntaxKind) {
        let parent = checkpoint.parent;
        debug_assert_eq!(self.stack.last(), Some(&parent), "checkpoint from another node");

        let mut moved = Vec::new();
        let mut next = match checkpoint.last_child {
            Some(last) => self.tree.tree_next(last),
            None => self.tree.first_child(parent),
        };
        while let Some(child) = next {
            next = self.tree.tree_next(child);
            moved.push(child);
        }

        let node = self.tree.alloc_node(kind);
        for child in moved {
            let _ = self.tree.detach(child);
            let _ = self.tree.append_child(node, child);
        }
        let _ = self.tree.append_child(parent, node);
        self.stack.push(node);
    }

    /// Close any nodes left open and hand out the tree with its root.
    pub fn finish(mut self) -> (Tree, NodeId) {
        self.stack.clear();
        let root = match self.root {
            Some(root) => root,
            None => self.tree.alloc_node(SyntaxKind::ERROR),
        };
        (self.tree, root)
    }
}
