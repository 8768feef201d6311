//! Foundation types for the stub tree.
//!
//! This module provides fundamental types used throughout the crate:
//! - [`FileId`] - Identifier of a source file inside a project
//! - [`Name`] - Cheap-to-clone identifier / token text
//! - [`TextRange`], [`TextSize`] - Source positions (byte offsets)
//! - [`LineIndex`], [`Position`], [`Span`] - Line/column conversion
//!
//! This module has NO dependencies on other modules of the crate.

mod file_id;
mod position;

pub use file_id::FileId;
pub use position::{LineIndex, Position, Span};

/// Interned-ish identifier text. Small names stay inline, larger ones are
/// reference counted.
pub type Name = smol_str::SmolStr;

// Re-export text-size types for convenience
pub use text_size::{self, TextRange, TextSize};
