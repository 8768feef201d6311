//! Stub tree: the persistable summary of one file's declarations.
//!
//! A stub tree mirrors the declaration structure of a syntax tree (file,
//! classes, modifier lists, fields) without any expression or trivia detail.
//! Field stubs appear in the same preorder as FIELD nodes in the tree they
//! were built from; that positional correspondence is what binds a stub to a
//! materialized node later on.

use serde::{Deserialize, Serialize};

use crate::base::Name;
use crate::syntax::ModifierSet;

/// Index of a stub inside its [`StubTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StubId(u32);

impl StubId {
    pub const ROOT: StubId = StubId(0);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Initializer text as stored in a field stub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InitializerText {
    None,
    Text(String),
    /// An initializer exists but is longer than the configured bound. The
    /// text itself lives only in the source.
    TooLong,
}

impl InitializerText {
    pub fn is_present(&self) -> bool {
        !matches!(self, InitializerText::None)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            InitializerText::Text(text) => Some(text),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldStub {
    pub name: Name,
    /// `@deprecated` doc tag or `@Deprecated` annotation on the declaration
    pub deprecated: bool,
    /// Full type of this declarator, own trailing `[]` included
    pub type_text: Name,
    pub initializer: InitializerText,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassStub {
    pub name: Name,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StubKind {
    File,
    Class(ClassStub),
    ModifierList(ModifierSet),
    Field(FieldStub),
}

impl StubKind {
    pub fn as_field(&self) -> Option<&FieldStub> {
        match self {
            StubKind::Field(field) => Some(field),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct StubNode {
    pub(crate) kind: StubKind,
    pub(crate) parent: Option<StubId>,
    pub(crate) children: Vec<StubId>,
}

/// Immutable stub tree of one file version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StubTree {
    /// Version of the source text the stubs were derived from
    pub source_timestamp: u64,
    pub(crate) nodes: Vec<StubNode>,
}

impl StubTree {
    /// A tree holding only the file stub.
    pub fn new(source_timestamp: u64) -> Self {
        Self {
            source_timestamp,
            nodes: vec![StubNode {
                kind: StubKind::File,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    pub(crate) fn push(&mut self, parent: StubId, kind: StubKind) -> StubId {
        let id = StubId(self.nodes.len() as u32);
        self.nodes.push(StubNode {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.index()].children.push(id);
        id
    }

    pub fn root(&self) -> StubId {
        StubId::ROOT
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn kind(&self, id: StubId) -> Option<&StubKind> {
        self.nodes.get(id.index()).map(|n| &n.kind)
    }

    pub fn parent(&self, id: StubId) -> Option<StubId> {
        self.nodes.get(id.index())?.parent
    }

    pub fn children(&self, id: StubId) -> &[StubId] {
        self.nodes
            .get(id.index())
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn field(&self, id: StubId) -> Option<&FieldStub> {
        self.kind(id)?.as_field()
    }

    /// Field stubs in preorder, matching FIELD node order in the tree.
    pub fn fields(&self) -> impl Iterator<Item = (StubId, &FieldStub)> + '_ {
        self.preorder()
            .filter_map(|id| self.field(id).map(|field| (id, field)))
    }

    pub fn preorder(&self) -> impl Iterator<Item = StubId> + '_ {
        let mut stack = vec![StubId::ROOT];
        std::iter::from_fn(move || {
            let id = stack.pop()?;
            stack.extend(self.children(id).iter().rev().copied());
            Some(id)
        })
    }

    /// The sibling stub right before `id`.
    pub fn prev_sibling(&self, id: StubId) -> Option<StubId> {
        let siblings = self.children(self.parent(id)?);
        let pos = siblings.iter().position(|&s| s == id)?;
        pos.checked_sub(1).map(|p| siblings[p])
    }

    /// Modifier list stub owned directly by `id`, if any.
    pub fn modifier_list(&self, id: StubId) -> Option<&ModifierSet> {
        self.children(id).iter().find_map(|&child| match self.kind(child)? {
            StubKind::ModifierList(set) => Some(set),
            _ => None,
        })
    }

    /// First field of the grouped declaration `id` belongs to: the nearest
    /// field at or before `id` that owns a modifier list.
    pub fn first_in_group(&self, id: StubId) -> Option<StubId> {
        let mut current = id;
        loop {
            self.field(current)?;
            if self.modifier_list(current).is_some() {
                return Some(current);
            }
            current = self.prev_sibling(current)?;
        }
    }

    pub fn containing_class(&self, id: StubId) -> Option<&Name> {
        self.enclosing_classes(id).next()
    }

    /// Names of the classes around `id`, innermost first.
    pub fn enclosing_classes(&self, id: StubId) -> impl Iterator<Item = &Name> + '_ {
        std::iter::successors(self.parent(id), move |&stub| self.parent(stub)).filter_map(
            move |stub| match self.kind(stub) {
                Some(StubKind::Class(class)) => Some(&class.name),
                _ => None,
            },
        )
    }

    pub fn class_names(&self) -> impl Iterator<Item = &Name> + '_ {
        self.nodes.iter().filter_map(|node| match &node.kind {
            StubKind::Class(class) => Some(&class.name),
            _ => None,
        })
    }

    /// Check that parent and child links agree and that the tree is shaped
    /// like something the builder could have produced.
    pub(crate) fn validate(&self) -> Result<(), String> {
        let Some(root) = self.nodes.first() else {
            return Err("empty stub tree".to_string());
        };
        if root.kind != StubKind::File || root.parent.is_some() {
            return Err("root stub is not a file".to_string());
        }
        for (index, node) in self.nodes.iter().enumerate() {
            let id = StubId(index as u32);
            if index > 0 {
                let parent = node
                    .parent
                    .ok_or_else(|| format!("stub {index} has no parent"))?;
                let parent_node = self
                    .nodes
                    .get(parent.index())
                    .ok_or_else(|| format!("stub {index} points at missing parent"))?;
                if parent.index() >= index || !parent_node.children.contains(&id) {
                    return Err(format!("stub {index} is not listed by its parent"));
                }
                let allowed = match (&parent_node.kind, &node.kind) {
                    (StubKind::File | StubKind::Class(_), StubKind::Class(_) | StubKind::Field(_)) => true,
                    (StubKind::Class(_) | StubKind::Field(_), StubKind::ModifierList(_)) => true,
                    _ => false,
                };
                if !allowed {
                    return Err(format!("stub {index} cannot appear under its parent"));
                }
            }
            for child in &node.children {
                let parent = self.nodes.get(child.index()).and_then(|c| c.parent);
                if parent != Some(id) {
                    return Err(format!("stub {index} lists a foreign child"));
                }
            }
        }
        Ok(())
    }
}
