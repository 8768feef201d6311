//! # stubtree
//!
//! Lazy stub-backed syntax trees for declarations: persistable stubs,
//! on-demand tree materialization, coherent derived-value caches, constant
//! folding and declaration normalization.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! model     → Project host, read/write guards, Field façade, editor, normalizer
//!   ↓
//! hir       → Type descriptors, constant values, evaluator, constant cache
//!   ↓
//! stubs     → Stub tree, stub builder, persistent stub codec
//!   ↓
//! syntax    → Arena syntax tree, builder, child roles, modifiers
//!   ↓
//! parser    → Logos lexer, recursive-descent parser
//!   ↓
//! base      → Primitives (FileId, Name, TextRange, LineIndex)
//! ```

// ============================================================================
// MODULES (dependency order: base → parser → syntax → stubs → hir → model)
// ============================================================================

/// Foundation types: FileId, Name, TextRange, LineIndex
pub mod base;

/// Parser: Logos lexer, recursive-descent parser, fragment parsing
pub mod parser;

/// Syntax: arena tree with lossless text and structural edits
pub mod syntax;

/// Stubs: persistable declaration summaries and their codec
pub mod stubs;

/// High-level IR: types, constant values, expression evaluation
pub mod hir;

/// Project model: files, fields, editing
pub mod model;

// Re-export foundation types
pub use base::{FileId, LineIndex, Name, Position, Span, TextRange, TextSize};

pub use model::{Analysis, EditError, Field, FieldId, Project, ProjectConfig, WriteAccess};
