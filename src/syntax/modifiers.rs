//! Modifier flags of a declaration.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use super::tree::{NodeId, Tree};
use crate::parser::SyntaxKind;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Modifiers: u16 {
        const PUBLIC = 1 << 0;
        const PROTECTED = 1 << 1;
        const PRIVATE = 1 << 2;
        const STATIC = 1 << 3;
        const FINAL = 1 << 4;
        const TRANSIENT = 1 << 5;
        const VOLATILE = 1 << 6;
        const ABSTRACT = 1 << 7;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Modifiers::empty()
    }
}

impl Modifiers {
    pub fn from_keyword(kind: SyntaxKind) -> Option<Modifiers> {
        let flag = match kind {
            SyntaxKind::PUBLIC_KW => Modifiers::PUBLIC,
            SyntaxKind::PROTECTED_KW => Modifiers::PROTECTED,
            SyntaxKind::PRIVATE_KW => Modifiers::PRIVATE,
            SyntaxKind::STATIC_KW => Modifiers::STATIC,
            SyntaxKind::FINAL_KW => Modifiers::FINAL,
            SyntaxKind::TRANSIENT_KW => Modifiers::TRANSIENT,
            SyntaxKind::VOLATILE_KW => Modifiers::VOLATILE,
            SyntaxKind::ABSTRACT_KW => Modifiers::ABSTRACT,
            _ => return None,
        };
        Some(flag)
    }
}

/// Modifier keywords and annotation names of one MODIFIER_LIST.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifierSet {
    pub modifiers: Modifiers,
    /// Annotation names as written, without `@` (`Deprecated`, `java.lang.Deprecated`)
    pub annotations: Vec<SmolStr>,
}

impl ModifierSet {
    pub fn from_tree(tree: &Tree, modifier_list: NodeId) -> Self {
        let mut set = ModifierSet::default();
        for child in tree.children(modifier_list) {
            let kind = tree.kind(child);
            if let Some(flag) = Modifiers::from_keyword(kind) {
                set.modifiers |= flag;
            } else if kind == SyntaxKind::ANNOTATION {
                let name: String = tree
                    .children(child)
                    .filter(|&n| matches!(tree.kind(n), SyntaxKind::IDENT | SyntaxKind::DOT))
                    .filter_map(|n| tree.leaf_text(n))
                    .collect();
                set.annotations.push(name.into());
            }
        }
        set
    }

    pub fn has(&self, flag: Modifiers) -> bool {
        self.modifiers.contains(flag)
    }

    pub fn has_annotation(&self, name: &str) -> bool {
        self.annotations.iter().any(|a| {
            a == name || a.rsplit_once('.').is_some_and(|(_, simple)| simple == name)
        })
    }

    pub fn is_deprecated(&self) -> bool {
        self.has_annotation("Deprecated")
    }
}
