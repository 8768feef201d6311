//! HIR: semantic values derived from syntax.
//!
//! ```text
//! TYPE node / type text ──▶ TypeDescriptor
//! expression node ──lower──▶ Expr ──evaluate──▶ ConstValue
//!                                    │
//!                                    └── ConstantResolver (references)
//! ```
//!
//! Nothing in here knows about files or projects; the model layer supplies
//! a [`ConstantResolver`] and keys the [`ConstantCache`].

mod cache;
mod constant;
mod eval;
mod expr;
mod types;

pub use cache::ConstantCache;
pub use constant::{ConstValue, compute_cast_to};
pub use eval::{ConstantResolver, NoReferences, evaluate};
pub use expr::{BinaryOp, Expr, UnaryOp, lower_expression, parse_literal};
pub use types::{
    PrimitiveType, TypeBase, TypeContext, TypeDescriptor, TypeError, from_type_node,
    parse_type_from_text,
};
