//! Splitting grouped declarations.
//!
//! `static int a = 1, b[] = {};` becomes `static int a = 1; static int[] b = {};`.
//! Each declarator after the first receives copies of the group's modifier
//! list and type, the separating commas go away, and brackets written after a
//! declarator's name move onto its own type.

use tracing::debug;

use crate::parser::SyntaxKind;
use crate::syntax::{ChildRole, NodeId, Tree, TreeError};

use super::EditError;
use super::editor::FileEditor;
use super::file::FieldId;

/// One declarator boundary: `current` `,` `next`.
#[derive(Debug, Clone, Copy)]
struct SplitStep {
    current: NodeId,
    comma: NodeId,
    next: NodeId,
}

/// What to rewrite, computed before touching the tree.
#[derive(Debug)]
struct Plan {
    parent: NodeId,
    modifier_list: NodeId,
    ty: NodeId,
    steps: Vec<SplitStep>,
    members: Vec<NodeId>,
}

impl Plan {
    fn is_noop(&self, tree: &Tree) -> bool {
        self.steps.is_empty()
            && self
                .members
                .iter()
                .all(|&m| tree.brackets_after_name(m).is_empty())
    }
}

/// Walk the declarators following `first`. A separator not followed by a
/// FIELD that continues the group ends the walk: a malformed group is left
/// as it is from that point on.
fn plan(tree: &Tree, field: NodeId) -> Option<Plan> {
    let first = tree.first_in_declaration(field)?;
    let parent = tree.parent(first)?;
    let modifier_list = tree.find_child_by_role(first, ChildRole::ModifierList)?;
    let ty = tree.find_child_by_role(first, ChildRole::Type)?;

    let mut steps = Vec::new();
    let mut members = vec![first];
    let mut current = first;
    loop {
        let Some(comma) = tree.skip_trivia_forward(tree.tree_next(current)) else {
            break;
        };
        if tree.kind(comma) != SyntaxKind::COMMA {
            break;
        }
        let Some(next) = tree.skip_trivia_forward(tree.tree_next(comma)) else {
            break;
        };
        let continues = tree.kind(next) == SyntaxKind::FIELD
            && tree.find_child_by_role(next, ChildRole::ModifierList).is_none();
        if !continues {
            break;
        }
        steps.push(SplitStep {
            current,
            comma,
            next,
        });
        members.push(next);
        current = next;
    }

    Some(Plan {
        parent,
        modifier_list,
        ty,
        steps,
        members,
    })
}

fn split(tree: &mut Tree, plan: &Plan) -> Result<(), TreeError> {
    let modifiers_empty = tree.text(plan.modifier_list).is_empty();
    for step in &plan.steps {
        if tree.find_child_by_role(step.current, ChildRole::Semicolon).is_none() {
            let semicolon = tree.alloc_leaf(SyntaxKind::SEMICOLON, ";");
            tree.append_child(step.current, semicolon)?;
        }
        tree.detach(step.comma)?;

        let anchor = tree.first_child(step.next);
        let modifiers = tree.deep_copy(plan.modifier_list);
        tree.insert_before(step.next, modifiers, anchor)?;
        if !modifiers_empty {
            let space = tree.alloc_leaf(SyntaxKind::WHITESPACE, " ");
            tree.insert_before(step.next, space, anchor)?;
        }
        let ty = tree.deep_copy(plan.ty);
        tree.insert_before(step.next, ty, anchor)?;
        let space = tree.alloc_leaf(SyntaxKind::WHITESPACE, " ");
        tree.insert_before(step.next, space, anchor)?;
    }
    for &member in &plan.members {
        normalize_brackets(tree, member)?;
    }
    Ok(())
}

/// Move `[]` pairs after the declarator's name onto its TYPE, dropping the
/// trivia between them.
fn normalize_brackets(tree: &mut Tree, field: NodeId) -> Result<(), TreeError> {
    let brackets = tree.brackets_after_name(field);
    let (Some(&last), Some(name), Some(ty)) = (
        brackets.last(),
        tree.find_child_by_role(field, ChildRole::Name),
        tree.find_child_by_role(field, ChildRole::Type),
    ) else {
        return Ok(());
    };

    let mut span = Vec::new();
    let mut next = tree.tree_next(name);
    while let Some(node) = next {
        span.push(node);
        if node == last {
            break;
        }
        next = tree.tree_next(node);
    }
    for node in span {
        tree.detach(node)?;
        if !tree.kind(node).is_trivia() {
            tree.append_child(ty, node)?;
        }
    }
    Ok(())
}

impl FileEditor<'_> {
    /// Rewrite the grouped declaration containing `field` into one
    /// declaration per declarator. Returns `false` when there was nothing to
    /// rewrite; the tree is then untouched.
    pub fn normalize_declaration(&mut self, field: FieldId) -> Result<bool, EditError> {
        let node = self.field_node(field)?;
        self.source().check_writable(Some(node))?;
        let syntax = self.syntax();
        let tree = syntax.tree();
        let Some(plan) = plan(tree, node) else {
            return Ok(false);
        };
        if plan.is_noop(tree) {
            return Ok(false);
        }
        drop(syntax);

        let declarators = plan.members.len();
        self.edit(&[plan.parent], node, |tree| split(tree, &plan))?;
        debug!(?field, declarators, "normalized grouped declaration");
        Ok(true)
    }
}
