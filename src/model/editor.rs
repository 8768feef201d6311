//! Structural editing of one file under the project's write guard.

use tracing::debug;

use crate::base::FileId;
use crate::parser::{SyntaxKind, parse_standalone_expression, tokenize};
use crate::syntax::{ChildRole, NodeId, Tree, TreeError};

use super::EditError;
use super::field::SyntaxRef;
use super::file::{FieldId, SourceFile};
use super::host::ProjectData;

/// Tree surgery on a single file.
///
/// Nodes are created detached (`create_leaf`, `deep_copy`, `import_subtree`)
/// and become visible only when spliced in by one of the edit operations.
/// Every edit checks that the file is writable, drops the caches of the
/// fields around the edit point and the project's constant cache, and
/// re-binds FIELD nodes before it returns.
pub struct FileEditor<'a> {
    data: &'a mut ProjectData,
    file: FileId,
}

impl<'a> FileEditor<'a> {
    pub(crate) fn new(data: &'a mut ProjectData, file: FileId) -> Result<Self, EditError> {
        data.file(file).ok_or(EditError::UnknownFile(file))?;
        Ok(Self { data, file })
    }

    pub fn file_id(&self) -> FileId {
        self.file
    }

    pub(super) fn source(&self) -> &SourceFile {
        // Checked in `new`; files are never removed.
        &self.data.files[self.file.index()]
    }

    fn source_mut(&mut self) -> &mut SourceFile {
        &mut self.data.files[self.file.index()]
    }

    /// The current tree, from its root.
    pub fn syntax(&self) -> SyntaxRef {
        let ast = self.source().ast();
        let root = ast.root;
        SyntaxRef::new(ast, root)
    }

    pub fn root(&self) -> NodeId {
        self.source().ast().root
    }

    /// The FIELD node of a live field of this file.
    pub fn field_node(&self, field: FieldId) -> Result<NodeId, EditError> {
        let source = self.source();
        let alive = field.file == self.file
            && source
                .field_decl(field.index as usize)
                .is_some_and(|decl| decl.alive);
        if !alive {
            return Err(EditError::UnknownField(field));
        }
        source
            .ast()
            .field_node(field.index as usize)
            .ok_or(EditError::UnknownField(field))
    }

    pub fn create_leaf(&mut self, kind: SyntaxKind, text: &str) -> NodeId {
        self.source_mut().ast_mut().tree.alloc_leaf(kind, text)
    }

    pub fn create_node(&mut self, kind: SyntaxKind) -> NodeId {
        self.source_mut().ast_mut().tree.alloc_node(kind)
    }

    pub fn deep_copy(&mut self, node: NodeId) -> NodeId {
        self.source_mut().ast_mut().tree.deep_copy(node)
    }

    pub fn import_subtree(&mut self, source: &Tree, node: NodeId) -> NodeId {
        self.source_mut().ast_mut().tree.import_subtree(source, node)
    }

    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        anchor: Option<NodeId>,
    ) -> Result<(), EditError> {
        self.edit(&[parent], parent, |tree| tree.insert_before(parent, child, anchor))
    }

    pub fn insert_after(
        &mut self,
        parent: NodeId,
        child: NodeId,
        anchor: Option<NodeId>,
    ) -> Result<(), EditError> {
        self.edit(&[parent], parent, |tree| tree.insert_after(parent, child, anchor))
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), EditError> {
        self.edit(&[parent], parent, |tree| tree.append_child(parent, child))
    }

    /// Detach `node` from the tree; returns its former parent.
    pub fn remove(&mut self, node: NodeId) -> Result<NodeId, EditError> {
        let anchors: Vec<NodeId> = self.source().ast().tree.parent(node).into_iter().collect();
        self.edit(&anchors, node, |tree| tree.detach(node))
    }

    /// Put detached `new` in place of `old`; returns the parent.
    pub fn replace(&mut self, old: NodeId, new: NodeId) -> Result<NodeId, EditError> {
        let anchors: Vec<NodeId> = self.source().ast().tree.parent(old).into_iter().collect();
        self.edit(&anchors, old, |tree| tree.replace(old, new))
    }

    /// Run `edit` as one structural change. `at` locates errors.
    pub(crate) fn edit<R>(
        &mut self,
        anchors: &[NodeId],
        at: NodeId,
        edit: impl FnOnce(&mut Tree) -> Result<R, TreeError>,
    ) -> Result<R, EditError> {
        let source = self.source_mut();
        source.check_writable(Some(at))?;
        let result = match source.apply_edit(anchors, edit) {
            Ok(result) => result,
            Err(err) => return Err(source.tree_error(at, err)),
        };
        self.data.constants.clear();
        self.data.modification_count += 1;
        Ok(result)
    }

    /// Rename a field. `name` must lex as exactly one identifier.
    pub fn set_field_name(&mut self, field: FieldId, name: &str) -> Result<(), EditError> {
        if !is_identifier(name) {
            return Err(EditError::InvalidIdentifier(name.to_string()));
        }
        let node = self.field_node(field)?;
        let old = self
            .source()
            .ast()
            .tree
            .find_child_by_role(node, ChildRole::Name)
            .ok_or(EditError::UnknownField(field))?;
        let new = self.create_leaf(SyntaxKind::IDENT, name);
        self.edit(&[node], node, |tree| tree.replace(old, new).map(|_| ()))
    }

    /// Replace the field's initializer with `text`, add one, or with `None`
    /// remove `= initializer` altogether.
    pub fn set_initializer(&mut self, field: FieldId, text: Option<&str>) -> Result<(), EditError> {
        let node = self.field_node(field)?;
        let fragment = text.map(parse_standalone_expression).transpose()?;
        let expr = fragment
            .as_ref()
            .map(|fragment| self.import_subtree(&fragment.tree, fragment.node));

        self.edit(&[node], node, |tree| {
            let current = tree.find_child_by_role(node, ChildRole::Initializer);
            match (current, expr) {
                (Some(old), Some(new)) => tree.replace(old, new).map(|_| ()),
                (None, Some(new)) => {
                    let anchor = tree.find_child_by_role(node, ChildRole::Semicolon);
                    for leaf in [
                        tree.alloc_leaf(SyntaxKind::WHITESPACE, " "),
                        tree.alloc_leaf(SyntaxKind::EQ, "="),
                        tree.alloc_leaf(SyntaxKind::WHITESPACE, " "),
                        new,
                    ] {
                        tree.insert_before(node, leaf, anchor)?;
                    }
                    Ok(())
                }
                (Some(old), None) => {
                    for doomed in initializer_span(tree, node, old) {
                        tree.detach(doomed)?;
                    }
                    Ok(())
                }
                (None, None) => Ok(()),
            }
        })?;
        debug!(?field, removed = text.is_none(), "initializer updated");
        Ok(())
    }
}

/// The children making up ` = initializer`: trivia before `=`, `=`, and
/// everything up to the initializer itself.
fn initializer_span(tree: &Tree, field: NodeId, init: NodeId) -> Vec<NodeId> {
    let Some(eq) = tree.find_child_by_role(field, ChildRole::InitializerEq) else {
        return vec![init];
    };
    let mut span = Vec::new();
    let mut prev = tree.tree_prev(eq);
    while let Some(node) = prev.filter(|&n| tree.kind(n).is_trivia()) {
        span.push(node);
        prev = tree.tree_prev(node);
    }
    span.reverse();
    let mut next = Some(eq);
    while let Some(node) = next {
        span.push(node);
        if node == init {
            break;
        }
        next = tree.tree_next(node);
    }
    span
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let valid_chars = chars
        .next()
        .is_some_and(|c| unicode_ident::is_xid_start(c) || c == '_' || c == '$')
        && chars.all(|c| unicode_ident::is_xid_continue(c) || c == '$');
    valid_chars && matches!(tokenize(name).as_slice(), [token] if token.kind == SyntaxKind::IDENT)
}
