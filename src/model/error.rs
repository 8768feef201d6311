//! Errors reported by write-side operations.

use thiserror::Error;

use crate::base::Position;
use crate::parser::ParseError;
use crate::syntax::TreeError;

use super::FieldId;

#[derive(Debug, Error)]
pub enum EditError {
    #[error("{path}:{position}: cannot modify read-only file")]
    ReadOnly { path: String, position: Position },

    #[error("{0:?} does not name a live field")]
    UnknownField(FieldId),

    #[error("unknown file {0}")]
    UnknownFile(crate::base::FileId),

    #[error("`{0}` is not a valid identifier")]
    InvalidIdentifier(String),

    #[error("invalid initializer: {0}")]
    InvalidInitializer(#[from] ParseError),

    #[error("{path}:{position}: {source}")]
    Tree {
        path: String,
        position: Position,
        #[source]
        source: TreeError,
    },
}
