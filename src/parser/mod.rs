//! Lossless parser for class and field declarations
//!
//! This module provides a lossless parser using:
//! - **logos** for fast lexing
//! - a hand-written recursive descent parser feeding [`crate::syntax::TreeBuilder`]
//!
//! All whitespace and comments are preserved as leaves, so the text of any
//! node is exactly the source text it was parsed from.
//!
//! ## Architecture
//!
//! ```text
//! Source Text
//!     ↓
//! Lexer (logos) → Tokens with SyntaxKind
//!     ↓
//! Parser → TreeBuilder events
//!     ↓
//! Tree (arena, mutable) → structural edits, stub building, HIR lowering
//! ```
//!
//! Besides whole files, the parser accepts standalone fragments: an
//! expression or a type parsed into a parentless DUMMY_HOLDER. Fragments are
//! how initializer text kept in stubs is turned back into expressions.

#[allow(clippy::module_inception)]
mod parser;

mod lexer;
mod syntax_kind;

pub use lexer::{Lexer, Token, tokenize};
pub use parser::{
    Fragment, Parse, ParseError, SyntaxError, parse_file, parse_standalone_expression, parse_type,
};
pub use syntax_kind::SyntaxKind;

pub use text_size::{TextRange, TextSize};
