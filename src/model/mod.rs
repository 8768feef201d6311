//! Model: the project host and everything reachable through it.
//!
//! ```text
//! Project ──read()──▶ Analysis ──▶ Field (stub and/or tree backed)
//!    │
//!    └────write()──▶ WriteAccess ──▶ FileEditor (tree surgery, normalization)
//! ```
//!
//! Files start out stub-backed. Trees are materialized on the first query
//! that needs one and can be dropped again by
//! [`WriteAccess::reclaim_soft_caches`] as long as the file is unedited.

mod config;
mod editor;
mod error;
mod field;
mod file;
mod host;
mod normalize;

pub use config::{DEFAULT_MAX_INITIALIZER_LEN, ProjectConfig};
pub use editor::FileEditor;
pub use error::EditError;
pub use field::{Backing, Field, SyntaxRef};
pub use file::{FieldId, SourceFile};
pub use host::{Analysis, Project, ProjectData, StubOrigin, WriteAccess};
