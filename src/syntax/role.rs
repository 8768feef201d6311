//! Typed child lookup by structural role.
//!
//! A FIELD's children appear in fixed positions: doc comment, modifier list,
//! type, name, own array brackets, `=`, initializer, `;`. Roles name those
//! positions so callers never depend on raw child indexes.

use super::tree::{NodeId, Tree};
use crate::parser::SyntaxKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChildRole {
    DocComment,
    ModifierList,
    Type,
    Name,
    InitializerEq,
    Initializer,
    Semicolon,
}

impl Tree {
    pub fn find_child_by_role(&self, node: NodeId, role: ChildRole) -> Option<NodeId> {
        match role {
            ChildRole::DocComment => self.find_child(node, SyntaxKind::DOC_COMMENT),
            ChildRole::ModifierList => self.find_child(node, SyntaxKind::MODIFIER_LIST),
            ChildRole::Type => self.find_child(node, SyntaxKind::TYPE),
            ChildRole::Name => self.find_child(node, SyntaxKind::IDENT),
            ChildRole::InitializerEq => self.find_child(node, SyntaxKind::EQ),
            ChildRole::Initializer => {
                let eq = self.find_child(node, SyntaxKind::EQ)?;
                let mut next = self.tree_next(eq);
                while let Some(child) = next {
                    if self.kind(child).is_expression() {
                        return Some(child);
                    }
                    next = self.tree_next(child);
                }
                None
            }
            ChildRole::Semicolon => self.find_child(node, SyntaxKind::SEMICOLON),
        }
    }

    /// The `[` `]` leaves that follow a declarator's name (`int a[][]`), in
    /// order, up to the initializer or terminator.
    pub fn brackets_after_name(&self, field: NodeId) -> Vec<NodeId> {
        let Some(name) = self.find_child_by_role(field, ChildRole::Name) else {
            return Vec::new();
        };
        let mut brackets = Vec::new();
        let mut next = self.tree_next(name);
        while let Some(child) = next {
            match self.kind(child) {
                SyntaxKind::L_BRACKET | SyntaxKind::R_BRACKET => brackets.push(child),
                kind if kind.is_trivia() => {}
                _ => break,
            }
            next = self.tree_next(child);
        }
        brackets
    }

    /// Number of `[]` pairs after a declarator's name.
    pub fn array_dims_after_name(&self, field: NodeId) -> usize {
        self.brackets_after_name(field)
            .iter()
            .filter(|&&b| self.kind(b) == SyntaxKind::R_BRACKET)
            .count()
    }

    /// The FIELD that owns the modifier list and type of `field`'s grouped
    /// declaration: `field` itself, or the nearest FIELD reached by walking
    /// back over `,` separators.
    pub fn first_in_declaration(&self, field: NodeId) -> Option<NodeId> {
        let mut current = field;
        loop {
            if self.kind(current) != SyntaxKind::FIELD {
                return None;
            }
            if self.find_child_by_role(current, ChildRole::ModifierList).is_some() {
                return Some(current);
            }
            let comma = self.skip_trivia_backward(self.tree_prev(current))?;
            if self.kind(comma) != SyntaxKind::COMMA {
                return None;
            }
            current = self.skip_trivia_backward(self.tree_prev(comma))?;
        }
    }

    /// All FIELDs of the grouped declaration containing `field`, in order.
    pub fn declaration_group(&self, field: NodeId) -> Vec<NodeId> {
        let first = self.first_in_declaration(field).unwrap_or(field);
        let mut group = vec![first];
        let mut current = first;
        while let Some(comma) = self.skip_trivia_forward(self.tree_next(current)) {
            if self.kind(comma) != SyntaxKind::COMMA {
                break;
            }
            match self.skip_trivia_forward(self.tree_next(comma)) {
                Some(next)
                    if self.kind(next) == SyntaxKind::FIELD
                        && self.find_child_by_role(next, ChildRole::ModifierList).is_none() =>
                {
                    group.push(next);
                    current = next;
                }
                _ => break,
            }
        }
        group
    }
}
