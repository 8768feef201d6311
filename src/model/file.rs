//! Per-file state: text, stubs, lazily materialized tree, field table.
//!
//! A file always has a field table. Field ids are indexes into it and are
//! never reused; a field whose node disappears in an edit stays in the table
//! as dead.
//!
//! While the file is unedited its stub tree is authoritative and the syntax
//! tree is a cache that can be built (and dropped) at any time. The first
//! structural edit drops the stubs: from then on the tree is the only
//! representation until [`SourceFile::commit_stubs`] summarizes it again.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, warn};

use crate::base::{FileId, LineIndex, Name, Position};
use crate::hir::{ConstValue, Expr, TypeContext, TypeDescriptor};
use crate::parser::{SyntaxKind, parse_file};
use crate::stubs::{StubId, StubTree, build_stub_tree};
use crate::syntax::{ChildRole, NodeId, Tree, TreeError};

use super::EditError;

/// Address of a field: its file and its slot in the file's field table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldId {
    pub file: FileId,
    pub index: u32,
}

/// Second tier of the constant cache, kept per field.
#[derive(Debug, Clone)]
pub(crate) enum ConstSlot {
    /// Initializer was a literal; this is its converted value
    Value(ConstValue),
    /// Initializer lowered but not a literal; re-evaluated on demand
    Expression(Arc<Expr>),
    NotConstant,
}

#[derive(Debug, Default)]
pub(crate) struct FieldCaches {
    pub(crate) ty: Option<TypeDescriptor>,
    pub(crate) initializer: Option<ConstSlot>,
}

#[derive(Debug)]
pub(crate) struct FieldDecl {
    pub(crate) stub: Option<StubId>,
    pub(crate) alive: bool,
    pub(crate) caches: Mutex<FieldCaches>,
}

impl FieldDecl {
    fn new(stub: Option<StubId>) -> Self {
        Self {
            stub,
            alive: true,
            caches: Mutex::new(FieldCaches::default()),
        }
    }

    pub(crate) fn clear_caches(&mut self) {
        *self.caches.get_mut() = FieldCaches::default();
    }
}

/// A materialized syntax tree and its binding to the field table.
#[derive(Debug, Clone)]
pub(crate) struct FileAst {
    pub(crate) tree: Tree,
    pub(crate) root: NodeId,
    field_nodes: Vec<Option<NodeId>>,
    node_fields: FxHashMap<NodeId, usize>,
}

impl FileAst {
    /// Parse `text` and bind FIELD nodes to field slots by position: the
    /// n-th FIELD in preorder belongs to the slot holding the n-th field stub.
    fn materialize(path: &str, text: &str, fields: &[FieldDecl], stubs: Option<&StubTree>) -> Self {
        debug!(path, "materializing syntax tree");
        let parse = parse_file(text);

        let slots: Vec<usize> = match stubs {
            Some(stubs) => {
                let ordinals: FxHashMap<StubId, usize> = stubs
                    .fields()
                    .enumerate()
                    .map(|(ordinal, (id, _))| (id, ordinal))
                    .collect();
                let mut by_ordinal = vec![None; ordinals.len()];
                for (index, decl) in fields.iter().enumerate() {
                    let ordinal = decl.stub.and_then(|id| ordinals.get(&id).copied());
                    if let Some(ordinal) = ordinal.filter(|_| decl.alive) {
                        by_ordinal[ordinal] = Some(index);
                    }
                }
                by_ordinal.into_iter().flatten().collect()
            }
            None => (0..fields.len()).filter(|&i| fields[i].alive).collect(),
        };

        let nodes: Vec<NodeId> = field_nodes_in_order(&parse.tree, parse.root).collect();
        if nodes.len() != slots.len() {
            warn!(
                path,
                nodes = nodes.len(),
                stubs = slots.len(),
                "stub and tree field counts do not line up"
            );
        }

        let mut ast = FileAst {
            tree: parse.tree,
            root: parse.root,
            field_nodes: vec![None; fields.len()],
            node_fields: FxHashMap::default(),
        };
        for (node, slot) in nodes.into_iter().zip(slots) {
            ast.field_nodes[slot] = Some(node);
            ast.node_fields.insert(node, slot);
        }
        ast
    }

    pub(crate) fn field_node(&self, index: usize) -> Option<NodeId> {
        self.field_nodes.get(index).copied().flatten()
    }

    pub(crate) fn field_at(&self, node: NodeId) -> Option<usize> {
        self.node_fields.get(&node).copied()
    }

    /// Slots whose cached values an edit around `anchors` may invalidate:
    /// every FIELD at or above an anchor together with its whole grouped
    /// declaration, and the FIELD children of each anchor.
    fn affected_fields(&self, anchors: &[NodeId]) -> FxHashSet<usize> {
        let tree = &self.tree;
        let mut affected = FxHashSet::default();
        for &anchor in anchors {
            let enclosing = std::iter::once(anchor).chain(tree.ancestors(anchor));
            for node in enclosing.filter(|&n| tree.kind(n) == SyntaxKind::FIELD) {
                affected.extend(tree.declaration_group(node).into_iter().filter_map(|m| self.field_at(m)));
            }
            if !tree.is_leaf(anchor) {
                affected.extend(tree.children(anchor).filter_map(|c| self.field_at(c)));
            }
        }
        affected
    }

    /// Re-bind FIELD nodes after an edit. Known nodes keep their slot, new
    /// nodes get fresh slots, slots whose node left the tree die.
    fn reindex(&mut self, fields: &mut Vec<FieldDecl>) {
        let mut live = vec![false; fields.len()];
        let mut node_fields = FxHashMap::default();
        for node in field_nodes_in_order(&self.tree, self.root) {
            let slot = match self.node_fields.get(&node) {
                Some(&slot) => slot,
                None => {
                    fields.push(FieldDecl::new(None));
                    live.push(false);
                    fields.len() - 1
                }
            };
            live[slot] = true;
            node_fields.insert(node, slot);
        }
        for (decl, live) in fields.iter_mut().zip(live) {
            if decl.alive && !live {
                decl.clear_caches();
            }
            decl.alive = live;
        }
        self.field_nodes = vec![None; fields.len()];
        for (&node, &slot) in &node_fields {
            self.field_nodes[slot] = Some(node);
        }
        self.node_fields = node_fields;
    }
}

fn field_nodes_in_order(tree: &Tree, root: NodeId) -> impl Iterator<Item = NodeId> + '_ {
    tree.descendants(root)
        .filter(move |&n| tree.kind(n) == SyntaxKind::FIELD)
}

/// Names of the CLASS nodes under `root`, in preorder.
fn declared_classes(tree: &Tree, root: NodeId) -> Vec<Name> {
    tree.descendants(root)
        .filter(|&n| tree.kind(n) == SyntaxKind::CLASS)
        .filter_map(|class| tree.find_child_by_role(class, ChildRole::Name))
        .filter_map(|name| tree.leaf_text(name))
        .map(Name::from)
        .collect()
}

/// Parse `text` and summarize it, dropping the tree.
pub(crate) fn index_text(text: &str, timestamp: u64, max_initializer_len: usize) -> StubTree {
    let parse = parse_file(text);
    build_stub_tree(&parse.tree, parse.root, timestamp, max_initializer_len)
}

#[derive(Debug)]
pub struct SourceFile {
    id: FileId,
    path: String,
    text: Arc<str>,
    timestamp: u64,
    writable: bool,
    stubs: Option<Arc<StubTree>>,
    ast: RwLock<Option<Arc<FileAst>>>,
    pub(crate) fields: Vec<FieldDecl>,
}

impl SourceFile {
    pub(crate) fn new(id: FileId, path: String, text: Arc<str>, stubs: StubTree) -> Self {
        let fields = stubs.fields().map(|(sid, _)| FieldDecl::new(Some(sid))).collect();
        Self {
            id,
            path,
            text,
            timestamp: stubs.source_timestamp,
            writable: true,
            stubs: Some(Arc::new(stubs)),
            ast: RwLock::new(None),
            fields,
        }
    }

    pub fn id(&self) -> FileId {
        self.id
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Version of the text; bumped by every text replacement and commit.
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn is_writable(&self) -> bool {
        self.writable
    }

    pub(crate) fn set_writable(&mut self, writable: bool) {
        self.writable = writable;
    }

    /// The stub tree, absent while the file has uncommitted edits.
    pub fn stubs(&self) -> Option<&StubTree> {
        self.stubs.as_deref()
    }

    pub fn is_materialized(&self) -> bool {
        self.ast.read().is_some()
    }

    /// Current text, including uncommitted edits.
    pub fn text(&self) -> Arc<str> {
        if self.stubs.is_none() {
            if let Some(ast) = self.ast.read().as_ref() {
                return Arc::from(ast.tree.text(ast.root));
            }
        }
        Arc::clone(&self.text)
    }

    pub(crate) fn field_decl(&self, index: usize) -> Option<&FieldDecl> {
        self.fields.get(index)
    }

    pub(crate) fn live_field_ids(&self) -> impl Iterator<Item = FieldId> + '_ {
        self.fields
            .iter()
            .enumerate()
            .filter(|(_, decl)| decl.alive)
            .map(|(index, _)| FieldId {
                file: self.id,
                index: index as u32,
            })
    }

    /// The tree if it has already been built.
    pub(crate) fn materialized(&self) -> Option<Arc<FileAst>> {
        self.ast.read().clone()
    }

    /// The tree, building it on first use. Concurrent callers build it once.
    pub(crate) fn ast(&self) -> Arc<FileAst> {
        if let Some(ast) = self.ast.read().as_ref() {
            return Arc::clone(ast);
        }
        let mut slot = self.ast.write();
        if let Some(ast) = slot.as_ref() {
            return Arc::clone(ast);
        }
        let ast = Arc::new(FileAst::materialize(
            &self.path,
            &self.text,
            &self.fields,
            self.stubs.as_deref(),
        ));
        *slot = Some(Arc::clone(&ast));
        ast
    }

    /// Mutable access to the tree for allocating detached nodes.
    pub(crate) fn ast_mut(&mut self) -> &mut FileAst {
        let SourceFile {
            ast,
            path,
            text,
            fields,
            stubs,
            ..
        } = self;
        let slot = ast.get_mut().get_or_insert_with(|| {
            Arc::new(FileAst::materialize(path, text, fields, stubs.as_deref()))
        });
        Arc::make_mut(slot)
    }

    /// Names of the classes declared in this file.
    pub(crate) fn type_context(&self) -> TypeContext {
        match &self.stubs {
            Some(stubs) => TypeContext::new(stubs.class_names().cloned()),
            None => {
                let ast = self.ast();
                TypeContext::new(declared_classes(&ast.tree, ast.root))
            }
        }
    }

    pub(crate) fn position_of(&self, node: NodeId) -> Position {
        let ast = self.ast();
        let offset = ast.tree.text_range(node).start();
        LineIndex::new(&ast.tree.text(ast.root)).position(offset)
    }

    pub(crate) fn check_writable(&self, at: Option<NodeId>) -> Result<(), EditError> {
        if self.writable {
            return Ok(());
        }
        let position = match at {
            Some(node) => self.position_of(node),
            None => Position::new(0, 0),
        };
        Err(EditError::ReadOnly {
            path: self.path.clone(),
            position,
        })
    }

    pub(crate) fn tree_error(&self, at: NodeId, source: TreeError) -> EditError {
        EditError::Tree {
            path: self.path.clone(),
            position: self.position_of(at),
            source,
        }
    }

    /// Run a structural edit and bring the field table up to date.
    ///
    /// The edit runs on a copy of the tree that replaces the current one
    /// only when every step succeeded, so a failure part way through a
    /// multi-step edit leaves the file as it was. Caches of fields around
    /// `anchors` are dropped for the structure both before and after the
    /// edit (an edit can move fields between groups). If the set of declared
    /// classes changes, every field cache of the file is dropped: resolved
    /// types depend on it.
    pub(crate) fn apply_edit<R>(
        &mut self,
        anchors: &[NodeId],
        edit: impl FnOnce(&mut Tree) -> Result<R, TreeError>,
    ) -> Result<R, TreeError> {
        let mut next = FileAst::clone(&self.ast());
        let classes = declared_classes(&next.tree, next.root);

        let mut affected = next.affected_fields(anchors);
        let result = edit(&mut next.tree)?;
        affected.extend(next.affected_fields(anchors));
        if declared_classes(&next.tree, next.root) != classes {
            debug!(path = %self.path, "declared classes changed, dropping all field caches");
            affected.extend(0..self.fields.len());
        }
        for slot in affected {
            self.fields[slot].clear_caches();
        }

        if self.stubs.take().is_some() {
            debug!(path = %self.path, "file edited, dropping stubs");
            for decl in &mut self.fields {
                decl.stub = None;
            }
        }
        next.reindex(&mut self.fields);
        *self.ast.get_mut() = Some(Arc::new(next));
        Ok(result)
    }

    /// Replace the whole text. Every existing field dies; the new text gets
    /// fresh stubs and fresh field slots.
    pub(crate) fn replace_text(&mut self, text: Arc<str>, max_initializer_len: usize) {
        let stubs = index_text(&text, self.timestamp + 1, max_initializer_len);
        self.replace_with_stubs(text, stubs);
    }

    /// Replace the whole text with `text`, summarized by `stubs`. The file
    /// takes the stubs' timestamp as its version.
    pub(crate) fn replace_with_stubs(&mut self, text: Arc<str>, stubs: StubTree) {
        for decl in &mut self.fields {
            decl.alive = false;
            decl.stub = None;
            decl.clear_caches();
        }
        self.fields
            .extend(stubs.fields().map(|(sid, _)| FieldDecl::new(Some(sid))));
        self.timestamp = stubs.source_timestamp;
        self.text = text;
        self.stubs = Some(Arc::new(stubs));
        *self.ast.get_mut() = None;
    }

    /// Summarize the current tree into a new stub tree and make it
    /// authoritative again. Bumps the timestamp when there were edits.
    pub(crate) fn commit_stubs(&mut self, max_initializer_len: usize) {
        if self.stubs.is_some() {
            return;
        }
        let ast = self.ast();
        self.timestamp += 1;
        let stubs = build_stub_tree(&ast.tree, ast.root, self.timestamp, max_initializer_len);

        for decl in &mut self.fields {
            decl.stub = None;
        }
        let stub_ids = stubs.fields().map(|(sid, _)| sid);
        for (node, sid) in field_nodes_in_order(&ast.tree, ast.root).zip(stub_ids) {
            if let Some(slot) = ast.field_at(node) {
                self.fields[slot].stub = Some(sid);
            }
        }
        self.text = Arc::from(ast.tree.text(ast.root));
        self.stubs = Some(Arc::new(stubs));
    }

    /// Drop every soft cache. An unedited file also drops its tree, which
    /// the stubs can rebuild on demand.
    pub(crate) fn reclaim(&mut self) {
        for decl in &mut self.fields {
            decl.clear_caches();
        }
        if self.stubs.is_some() {
            *self.ast.get_mut() = None;
        }
    }
}
