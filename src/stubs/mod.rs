//! Stubs: lightweight, persistable summaries of a file's declarations.
//!
//! ```text
//! Tree ──build_stub_tree──▶ StubTree ──StubTreeExternalizer──▶ bytes
//!                              ▲                                 │
//!                              └──────────── read ◀──────────────┘
//! ```
//!
//! A stub tree answers name, flag, type-text and initializer-text queries
//! without a syntax tree. It is discarded (never patched) when the file's
//! tree is edited.

mod builder;
mod codec;
mod stub;

pub use builder::build_stub_tree;
pub(crate) use builder::{has_deprecated_tag, significant_text};
pub use codec::{
    CodecError, FieldStubExternalizer, Persisted, StubExternalizer, StubTreeExternalizer,
};
pub use stub::{ClassStub, FieldStub, InitializerText, StubId, StubKind, StubTree};
