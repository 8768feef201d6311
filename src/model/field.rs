//! The field façade: one semantic view over a field stub, its syntax node,
//! or both.
//!
//! Every query decides for itself whether the stub suffices. Name, flags,
//! type and initializer presence come from the stub while the file is
//! unedited; anything that needs nodes (the type element, the initializer
//! expression, text) materializes the file's tree. Once a file has been
//! edited its stubs are gone and every query reads the tree.

use std::sync::Arc;

use rustc_hash::FxHashSet;
use tracing::{debug, trace, warn};

use crate::base::Name;
use crate::hir::{
    ConstValue, ConstantResolver, Expr, TypeDescriptor, compute_cast_to, evaluate, from_type_node,
    lower_expression, parse_type_from_text,
};
use crate::parser::{SyntaxKind, parse_standalone_expression};
use crate::stubs::{FieldStub, InitializerText, StubId, has_deprecated_tag};
use crate::syntax::{ChildRole, ModifierSet, Modifiers, NodeId, Tree};

use super::file::{ConstSlot, FieldDecl, FieldId, FileAst, SourceFile};
use super::host::ProjectData;

/// Which representations currently back a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backing {
    Stub(StubId),
    Tree(NodeId),
    Both(StubId, NodeId),
}

/// A node of a materialized file tree, kept alive by its own handle.
#[derive(Debug, Clone)]
pub struct SyntaxRef {
    ast: Arc<FileAst>,
    node: NodeId,
}

impl SyntaxRef {
    pub(crate) fn new(ast: Arc<FileAst>, node: NodeId) -> Self {
        Self { ast, node }
    }

    pub fn tree(&self) -> &Tree {
        &self.ast.tree
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn kind(&self) -> SyntaxKind {
        self.ast.tree.kind(self.node)
    }

    pub fn text(&self) -> String {
        self.ast.tree.text(self.node)
    }

    fn at(&self, node: NodeId) -> SyntaxRef {
        SyntaxRef::new(Arc::clone(&self.ast), node)
    }
}

#[derive(Clone, Copy)]
pub struct Field<'a> {
    data: &'a ProjectData,
    file: &'a SourceFile,
    decl: &'a FieldDecl,
    id: FieldId,
}

impl std::fmt::Debug for Field<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Field")
            .field("id", &self.id)
            .field("backing", &self.backing())
            .finish()
    }
}

impl<'a> Field<'a> {
    pub(crate) fn new(data: &'a ProjectData, file: &'a SourceFile, id: FieldId) -> Option<Self> {
        let decl = file.field_decl(id.index as usize).filter(|d| d.alive)?;
        Some(Self {
            data,
            file,
            decl,
            id,
        })
    }

    pub fn id(&self) -> FieldId {
        self.id
    }

    fn stub(&self) -> Option<(StubId, &'a FieldStub)> {
        let id = self.decl.stub?;
        let stub = self.file.stubs()?.field(id)?;
        Some((id, stub))
    }

    /// The bound node if the tree already exists; never materializes.
    fn loaded_node(&self) -> Option<NodeId> {
        self.file.materialized()?.field_node(self.id.index as usize)
    }

    pub fn backing(&self) -> Option<Backing> {
        match (self.stub(), self.loaded_node()) {
            (Some((stub, _)), Some(node)) => Some(Backing::Both(stub, node)),
            (Some((stub, _)), None) => Some(Backing::Stub(stub)),
            (None, Some(node)) => Some(Backing::Tree(node)),
            (None, None) => None,
        }
    }

    /// The field's FIELD node, materializing the file's tree if needed.
    pub fn syntax(&self) -> Option<SyntaxRef> {
        let ast = self.file.ast();
        let node = ast.field_node(self.id.index as usize)?;
        Some(SyntaxRef::new(ast, node))
    }

    /// The FIELD owning the group's modifier list and type.
    fn first_in_declaration(&self) -> Option<SyntaxRef> {
        let syntax = self.syntax()?;
        let first = syntax.tree().first_in_declaration(syntax.node)?;
        Some(syntax.at(first))
    }

    pub fn name(&self) -> Name {
        if let Some((_, stub)) = self.stub() {
            return stub.name.clone();
        }
        self.syntax()
            .and_then(|s| {
                let name = s.tree().find_child_by_role(s.node, ChildRole::Name)?;
                s.tree().leaf_text(name).map(Name::from)
            })
            .unwrap_or_default()
    }

    /// Declared type of this declarator, its own trailing `[]` included.
    /// Unresolvable stored type text is logged and yields `None`.
    pub fn ty(&self) -> Option<TypeDescriptor> {
        if let Some(ty) = self.decl.caches.lock().ty.clone() {
            trace!(field = ?self.id, "type cache hit");
            return Some(ty);
        }
        let ty = match self.stub() {
            Some((_, stub)) => match parse_type_from_text(&stub.type_text, &self.file.type_context()) {
                Ok(ty) => ty,
                Err(err) => {
                    warn!(
                        field = %stub.name,
                        type_text = %stub.type_text,
                        error = %err,
                        "cannot resolve stored field type"
                    );
                    return None;
                }
            },
            None => self.type_from_tree()?,
        };
        self.decl.caches.lock().ty = Some(ty.clone());
        Some(ty)
    }

    fn type_from_tree(&self) -> Option<TypeDescriptor> {
        let syntax = self.syntax()?;
        let tree = syntax.tree();
        let first = tree.first_in_declaration(syntax.node)?;
        let type_node = tree.find_child_by_role(first, ChildRole::Type)?;
        match from_type_node(tree, type_node, &self.file.type_context()) {
            Ok(ty) => Some(ty.with_extra_dims(tree.array_dims_after_name(syntax.node))),
            Err(err) => {
                warn!(field = ?self.id, error = %err, "cannot resolve field type");
                None
            }
        }
    }

    /// The group's shared TYPE node.
    pub fn type_element(&self) -> Option<SyntaxRef> {
        let first = self.first_in_declaration()?;
        let ty = first.tree().find_child_by_role(first.node, ChildRole::Type)?;
        Some(first.at(ty))
    }

    /// Modifiers of the declaration, shared by every declarator in a group.
    pub fn modifier_list(&self) -> Option<ModifierSet> {
        if let Some((id, _)) = self.stub() {
            let stubs = self.file.stubs()?;
            let first = stubs.first_in_group(id)?;
            return stubs.modifier_list(first).cloned();
        }
        let first = self.first_in_declaration()?;
        let list = first.tree().find_child_by_role(first.node, ChildRole::ModifierList)?;
        Some(ModifierSet::from_tree(first.tree(), list))
    }

    pub fn has_modifier(&self, flag: Modifiers) -> bool {
        self.modifier_list().is_some_and(|set| set.has(flag))
    }

    /// An initializer that was too long to store still counts.
    pub fn has_initializer(&self) -> bool {
        if let Some((_, stub)) = self.stub() {
            return stub.initializer.is_present();
        }
        self.initializer().is_some()
    }

    pub fn initializer(&self) -> Option<SyntaxRef> {
        let syntax = self.syntax()?;
        let init = syntax.tree().find_child_by_role(syntax.node, ChildRole::Initializer)?;
        Some(syntax.at(init))
    }

    pub fn doc_comment(&self) -> Option<String> {
        let syntax = self.syntax()?;
        let tree = syntax.tree();
        let own = tree.find_child_by_role(syntax.node, ChildRole::DocComment);
        let doc = own.or_else(|| {
            let first = tree.first_in_declaration(syntax.node)?;
            tree.find_child_by_role(first, ChildRole::DocComment)
        })?;
        tree.leaf_text(doc).map(str::to_string)
    }

    pub fn is_deprecated(&self) -> bool {
        if let Some((_, stub)) = self.stub() {
            return stub.deprecated;
        }
        self.doc_comment().is_some_and(|doc| has_deprecated_tag(&doc))
            || self.modifier_list().is_some_and(|set| set.is_deprecated())
    }

    pub fn containing_class(&self) -> Option<Name> {
        self.enclosing_classes().into_iter().next()
    }

    /// Names of the classes this field is nested in, innermost first.
    pub fn enclosing_classes(&self) -> Vec<Name> {
        if let Some((id, _)) = self.stub() {
            return match self.file.stubs() {
                Some(stubs) => stubs.enclosing_classes(id).cloned().collect(),
                None => Vec::new(),
            };
        }
        let Some(syntax) = self.syntax() else {
            return Vec::new();
        };
        let tree = syntax.tree();
        tree.ancestors(syntax.node)
            .filter(|&n| tree.kind(n) == SyntaxKind::CLASS)
            .filter_map(|class| tree.find_child_by_role(class, ChildRole::Name))
            .filter_map(|name| tree.leaf_text(name).map(Name::from))
            .collect()
    }

    pub fn text(&self) -> Option<String> {
        self.syntax().map(|s| s.text())
    }

    /// Compile-time constant value, `None` when the field is not a constant.
    pub fn compute_constant_value(&self) -> Option<ConstValue> {
        let mut visited = FxHashSet::default();
        self.compute_constant_value_with(&mut visited)
    }

    /// Like [`compute_constant_value`](Self::compute_constant_value), as one
    /// step of an evaluation already in progress for the fields in `visited`.
    pub fn compute_constant_value_with(&self, visited: &mut FxHashSet<FieldId>) -> Option<ConstValue> {
        if !self.has_modifier(Modifiers::FINAL) {
            return None;
        }
        self.data
            .constants
            .compute_with_caching(self.id, visited, |visited| self.compute_uncached(visited))
    }

    fn compute_uncached(&self, visited: &mut FxHashSet<FieldId>) -> Option<ConstValue> {
        let slot = self.decl.caches.lock().initializer.clone();
        let expr = match slot {
            Some(ConstSlot::Value(value)) => return Some(value),
            Some(ConstSlot::NotConstant) => return None,
            Some(ConstSlot::Expression(expr)) => expr,
            None => {
                let foldable = self.ty().is_some_and(|ty| ty.is_primitive() || ty.is_string());
                let lowered = if foldable { self.lower_initializer() } else { None };
                match lowered {
                    Some(expr) => Arc::new(expr),
                    None => {
                        self.store_slot(ConstSlot::NotConstant);
                        return None;
                    }
                }
            }
        };

        let ty = self.ty()?;
        let mut resolver = FieldResolver {
            origin: self,
            visited,
        };
        let value = evaluate(&expr, &mut resolver).and_then(|value| compute_cast_to(value, &ty));

        let slot = match (&value, expr.is_literal()) {
            (Some(value), true) => ConstSlot::Value(value.clone()),
            (None, true) => ConstSlot::NotConstant,
            _ => ConstSlot::Expression(expr),
        };
        self.store_slot(slot);
        value
    }

    fn store_slot(&self, slot: ConstSlot) {
        self.decl.caches.lock().initializer = Some(slot);
    }

    /// Lower the initializer from the tree when one exists, otherwise from
    /// the stored text parsed on its own. Text too long to store sends us
    /// to the tree after all.
    fn lower_initializer(&self) -> Option<Expr> {
        let stub = self.stub().filter(|_| self.loaded_node().is_none());
        let Some((_, stub)) = stub else {
            return self.lower_initializer_from_tree();
        };
        match &stub.initializer {
            InitializerText::None => None,
            InitializerText::Text(text) => match parse_standalone_expression(text) {
                Ok(fragment) => Some(lower_expression(&fragment.tree, fragment.node)),
                Err(err) => {
                    warn!(field = %stub.name, error = %err, "cannot parse stored initializer");
                    None
                }
            },
            InitializerText::TooLong => {
                debug!(field = %stub.name, "initializer not stored, reading it from the tree");
                self.lower_initializer_from_tree()
            }
        }
    }

    fn lower_initializer_from_tree(&self) -> Option<Expr> {
        let init = self.initializer()?;
        Some(lower_expression(init.tree(), init.node))
    }
}

/// Resolves references met while folding a field's initializer.
///
/// `NAME` is looked up in the field's own class, then in each enclosing
/// class outwards, then among the file's top-level fields. `Class.NAME` (or
/// the last two segments of a longer path) is field `NAME` of a class named
/// `Class` anywhere in the project.
struct FieldResolver<'f, 'a, 'v> {
    origin: &'f Field<'a>,
    visited: &'v mut FxHashSet<FieldId>,
}

impl ConstantResolver for FieldResolver<'_, '_, '_> {
    fn resolve_reference(&mut self, path: &[Name]) -> Option<ConstValue> {
        let data = self.origin.data;
        let target = match path {
            [name] => {
                let file = self.origin.file.id();
                let scope = self.origin.enclosing_classes();
                (0..=scope.len())
                    .find_map(|depth| data.find_field_in_scope(file, &scope[depth..], name))
            }
            [.., class, name] => data.find_class_field(class, name),
            [] => None,
        }?;
        target.compute_constant_value_with(self.visited)
    }
}
