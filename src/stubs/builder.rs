//! Building a stub tree from a parsed file.

use smol_str::SmolStr;

use super::stub::{ClassStub, FieldStub, InitializerText, StubId, StubKind, StubTree};
use crate::parser::SyntaxKind;
use crate::syntax::{ChildRole, ModifierSet, NodeId, Tree};

/// Summarize the declarations under `root` into a stub tree.
///
/// Initializer text longer than `max_initializer_len` bytes is recorded as
/// [`InitializerText::TooLong`].
pub fn build_stub_tree(
    tree: &Tree,
    root: NodeId,
    source_timestamp: u64,
    max_initializer_len: usize,
) -> StubTree {
    let mut stubs = StubTree::new(source_timestamp);
    let mut builder = StubBuilder {
        tree,
        stubs: &mut stubs,
        max_initializer_len,
    };
    builder.members(root, StubId::ROOT);
    stubs
}

struct StubBuilder<'a> {
    tree: &'a Tree,
    stubs: &'a mut StubTree,
    max_initializer_len: usize,
}

/// State shared by the declarators of one grouped declaration.
struct Group {
    type_text: String,
    deprecated: bool,
}

impl StubBuilder<'_> {
    fn members(&mut self, container: NodeId, parent: StubId) {
        let mut group: Option<Group> = None;
        for child in self.tree.children(container) {
            match self.tree.kind(child) {
                SyntaxKind::CLASS => {
                    group = None;
                    self.class(child, parent);
                }
                SyntaxKind::FIELD => self.field(child, parent, &mut group),
                SyntaxKind::COMMA => {}
                kind if kind.is_trivia() => {}
                _ => group = None,
            }
        }
    }

    fn class(&mut self, node: NodeId, parent: StubId) {
        let name = self
            .tree
            .find_child_by_role(node, ChildRole::Name)
            .and_then(|n| self.tree.leaf_text(n))
            .unwrap_or_default();
        let id = self.stubs.push(parent, StubKind::Class(ClassStub { name: name.into() }));
        if let Some(list) = self.tree.find_child_by_role(node, ChildRole::ModifierList) {
            let set = ModifierSet::from_tree(self.tree, list);
            self.stubs.push(id, StubKind::ModifierList(set));
        }
        self.members(node, id);
    }

    fn field(&mut self, node: NodeId, parent: StubId, group: &mut Option<Group>) {
        let modifiers = self
            .tree
            .find_child_by_role(node, ChildRole::ModifierList)
            .map(|list| ModifierSet::from_tree(self.tree, list));

        if let Some(set) = &modifiers {
            let type_text = self
                .tree
                .find_child_by_role(node, ChildRole::Type)
                .map(|ty| significant_text(self.tree, ty))
                .unwrap_or_default();
            let doc_deprecated = self
                .tree
                .find_child_by_role(node, ChildRole::DocComment)
                .and_then(|doc| self.tree.leaf_text(doc))
                .is_some_and(has_deprecated_tag);
            *group = Some(Group {
                type_text,
                deprecated: doc_deprecated || set.is_deprecated(),
            });
        }
        // Every FIELD node gets a stub so positions keep lining up; a
        // declarator cut off from its group has no type text.
        let orphan = Group {
            type_text: String::new(),
            deprecated: false,
        };
        let shared = group.as_ref().unwrap_or(&orphan);

        let name = self
            .tree
            .find_child_by_role(node, ChildRole::Name)
            .and_then(|n| self.tree.leaf_text(n))
            .unwrap_or_default();
        let mut type_text = shared.type_text.clone();
        for _ in 0..self.tree.array_dims_after_name(node) {
            type_text.push_str("[]");
        }
        let initializer = match self.tree.find_child_by_role(node, ChildRole::Initializer) {
            Some(init) => {
                let text = self.tree.text(init);
                if text.len() > self.max_initializer_len {
                    InitializerText::TooLong
                } else {
                    InitializerText::Text(text)
                }
            }
            None => InitializerText::None,
        };

        let stub = FieldStub {
            name: name.into(),
            deprecated: shared.deprecated,
            type_text: SmolStr::from(type_text),
            initializer,
        };
        let id = self.stubs.push(parent, StubKind::Field(stub));
        if let Some(set) = modifiers {
            self.stubs.push(id, StubKind::ModifierList(set));
        }
    }
}

/// Concatenated non-trivia leaf text: `java.util.List<String>` for
/// `java.util. List < String >`.
pub(crate) fn significant_text(tree: &Tree, node: NodeId) -> String {
    tree.descendants(node)
        .filter(|&n| !tree.kind(n).is_trivia())
        .filter_map(|n| tree.leaf_text(n))
        .collect()
}

pub(crate) fn has_deprecated_tag(doc: &str) -> bool {
    doc.lines().any(|line| {
        line.trim_start_matches(|c: char| c.is_whitespace() || c == '*' || c == '/')
            .starts_with("@deprecated")
    })
}
