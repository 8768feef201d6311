//! Type descriptors resolved from type text or TYPE nodes.

use std::fmt;

use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::base::Name;
use crate::parser::{ParseError, SyntaxKind, parse_type};
use crate::stubs::significant_text;
use crate::syntax::{NodeId, Tree};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    Void,
}

impl PrimitiveType {
    pub fn from_keyword(kind: SyntaxKind) -> Option<Self> {
        let ty = match kind {
            SyntaxKind::BOOLEAN_KW => PrimitiveType::Boolean,
            SyntaxKind::BYTE_KW => PrimitiveType::Byte,
            SyntaxKind::CHAR_KW => PrimitiveType::Char,
            SyntaxKind::SHORT_KW => PrimitiveType::Short,
            SyntaxKind::INT_KW => PrimitiveType::Int,
            SyntaxKind::LONG_KW => PrimitiveType::Long,
            SyntaxKind::FLOAT_KW => PrimitiveType::Float,
            SyntaxKind::DOUBLE_KW => PrimitiveType::Double,
            SyntaxKind::VOID_KW => PrimitiveType::Void,
            _ => return None,
        };
        Some(ty)
    }

    pub fn keyword(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Byte => "byte",
            PrimitiveType::Char => "char",
            PrimitiveType::Short => "short",
            PrimitiveType::Int => "int",
            PrimitiveType::Long => "long",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
            PrimitiveType::Void => "void",
        }
    }

    pub fn is_numeric(self) -> bool {
        !matches!(self, PrimitiveType::Boolean | PrimitiveType::Void)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeBase {
    Primitive(PrimitiveType),
    /// A class type. `name` is fully qualified when it could be resolved;
    /// type arguments are kept as canonical text.
    Class { name: Name, args: Vec<Name> },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
    pub base: TypeBase,
    pub array_dims: usize,
}

impl TypeDescriptor {
    pub fn primitive(ty: PrimitiveType) -> Self {
        Self {
            base: TypeBase::Primitive(ty),
            array_dims: 0,
        }
    }

    pub fn class(name: impl Into<Name>) -> Self {
        Self {
            base: TypeBase::Class {
                name: name.into(),
                args: Vec::new(),
            },
            array_dims: 0,
        }
    }

    pub fn with_extra_dims(mut self, dims: usize) -> Self {
        self.array_dims += dims;
        self
    }

    /// The primitive type when this is a non-array primitive.
    pub fn as_primitive(&self) -> Option<PrimitiveType> {
        match self.base {
            TypeBase::Primitive(ty) if self.array_dims == 0 => Some(ty),
            _ => None,
        }
    }

    pub fn is_primitive(&self) -> bool {
        self.as_primitive().is_some()
    }

    pub fn is_string(&self) -> bool {
        self.array_dims == 0
            && matches!(&self.base, TypeBase::Class { name, args } if name == "java.lang.String" && args.is_empty())
    }

    pub fn is_array(&self) -> bool {
        self.array_dims > 0
    }

    /// Compare against written type text, resolved the same way.
    pub fn equals_to_text(&self, text: &str, context: &TypeContext) -> bool {
        parse_type_from_text(text, context).is_ok_and(|other| &other == self)
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.base {
            TypeBase::Primitive(ty) => f.write_str(ty.keyword())?,
            TypeBase::Class { name, args } => {
                f.write_str(name)?;
                if !args.is_empty() {
                    write!(f, "<{}>", args.join(","))?;
                }
            }
        }
        for _ in 0..self.array_dims {
            f.write_str("[]")?;
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum TypeError {
    #[error(transparent)]
    Unparseable(#[from] ParseError),

    #[error("`{0}` does not describe a type")]
    NotAType(String),
}

/// Names a type is resolved against: classes declared in the file shadow
/// the implicitly imported `java.lang` names.
#[derive(Debug, Clone, Default)]
pub struct TypeContext {
    declared_classes: FxHashSet<Name>,
}

impl TypeContext {
    pub fn new(declared_classes: impl IntoIterator<Item = Name>) -> Self {
        Self {
            declared_classes: declared_classes.into_iter().collect(),
        }
    }

    fn resolve(&self, name: &str) -> Name {
        if !name.contains('.')
            && !self.declared_classes.contains(name)
            && JAVA_LANG.contains(&name)
        {
            return Name::from(format!("java.lang.{name}"));
        }
        Name::from(name)
    }
}

const JAVA_LANG: &[&str] = &[
    "Boolean",
    "Byte",
    "Character",
    "CharSequence",
    "Class",
    "Double",
    "Enum",
    "Float",
    "Integer",
    "Long",
    "Number",
    "Object",
    "Short",
    "String",
    "StringBuilder",
    "Void",
];

/// Resolve written type text (`int[]`, `String`, `java.util.List<T>`).
pub fn parse_type_from_text(text: &str, context: &TypeContext) -> Result<TypeDescriptor, TypeError> {
    let fragment = parse_type(text)?;
    from_type_node(&fragment.tree, fragment.node, context)
}

/// Resolve a TYPE node in place.
pub fn from_type_node(
    tree: &Tree,
    node: NodeId,
    context: &TypeContext,
) -> Result<TypeDescriptor, TypeError> {
    let not_a_type = || TypeError::NotAType(tree.text(node));
    if tree.kind(node) != SyntaxKind::TYPE {
        return Err(not_a_type());
    }

    let mut base = None;
    let mut qualified = String::new();
    let mut args = Vec::new();
    let mut array_dims = 0;
    for child in tree.children(node) {
        let kind = tree.kind(child);
        match kind {
            _ if kind.is_trivia() => {}
            _ if kind.is_primitive_type() => base = PrimitiveType::from_keyword(kind).map(TypeBase::Primitive),
            SyntaxKind::IDENT | SyntaxKind::DOT => {
                qualified.push_str(tree.leaf_text(child).unwrap_or_default());
            }
            SyntaxKind::TYPE_ARGS => args = split_type_args(&significant_text(tree, child)),
            SyntaxKind::R_BRACKET => array_dims += 1,
            SyntaxKind::L_BRACKET => {}
            _ => return Err(not_a_type()),
        }
    }

    let base = match base {
        Some(base) if qualified.is_empty() => base,
        None if !qualified.is_empty() => TypeBase::Class {
            name: context.resolve(&qualified),
            args,
        },
        _ => return Err(not_a_type()),
    };
    Ok(TypeDescriptor { base, array_dims })
}

/// Split `<A,B<C,D>>` into its top-level arguments.
fn split_type_args(text: &str) -> Vec<Name> {
    let inner = text
        .strip_prefix('<')
        .and_then(|t| t.strip_suffix('>'))
        .unwrap_or(text);
    let mut args = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (idx, ch) in inner.char_indices() {
        match ch {
            '<' => depth += 1,
            '>' => depth -= 1,
            ',' if depth == 0 => {
                args.push(Name::from(&inner[start..idx]));
                start = idx + 1;
            }
            _ => {}
        }
    }
    if start < inner.len() {
        args.push(Name::from(&inner[start..]));
    }
    args
}
