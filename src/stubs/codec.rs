//! Persistent stub codec.
//!
//! Wire format of every record:
//!
//! ```text
//! [8-byte big-endian source timestamp][payload]
//! ```
//!
//! The timestamp has no length prefix. The payload framing belongs to the
//! externalizer of the entity kind; both externalizers here use bincode.
//! A record that fails to decode is invalid as a whole: there is no partial
//! recovery.

use std::io::{self, Read, Write};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::stub::{FieldStub, StubNode, StubTree};

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("stub record is truncated: missing source timestamp")]
    Truncated,

    #[error("i/o error while writing stub record: {0}")]
    Io(#[from] io::Error),

    #[error("malformed stub payload: {0}")]
    Payload(#[from] bincode::Error),

    #[error("inconsistent stub record: {0}")]
    Inconsistent(String),
}

/// Reads and writes one kind of persisted stub state.
///
/// Implementors only handle the payload; [`save`](Self::save) and
/// [`read`](Self::read) frame it with the source timestamp.
pub trait StubExternalizer {
    type State;

    fn source_timestamp(&self, state: &Self::State) -> u64;

    fn save_payload<W: Write>(&self, out: &mut W, state: &Self::State) -> Result<(), CodecError>;

    fn read_payload<R: Read>(
        &self,
        input: &mut R,
        source_timestamp: u64,
    ) -> Result<Self::State, CodecError>;

    fn save<W: Write>(&self, out: &mut W, state: &Self::State) -> Result<(), CodecError> {
        out.write_all(&self.source_timestamp(state).to_be_bytes())?;
        self.save_payload(out, state)
    }

    fn read<R: Read>(&self, input: &mut R) -> Result<Self::State, CodecError> {
        let mut stamp = [0u8; 8];
        input.read_exact(&mut stamp).map_err(|err| match err.kind() {
            io::ErrorKind::UnexpectedEof => CodecError::Truncated,
            _ => CodecError::Io(err),
        })?;
        self.read_payload(input, u64::from_be_bytes(stamp))
    }

    fn encode(&self, state: &Self::State) -> Result<Vec<u8>, CodecError> {
        let mut bytes = Vec::new();
        self.save(&mut bytes, state)?;
        Ok(bytes)
    }

    /// Decode a whole record; bytes left over after the payload make the
    /// record invalid.
    fn decode(&self, bytes: &[u8]) -> Result<Self::State, CodecError> {
        let mut input = bytes;
        let state = self.read(&mut input)?;
        if !input.is_empty() {
            return Err(CodecError::Inconsistent(format!(
                "{} trailing bytes after payload",
                input.len()
            )));
        }
        Ok(state)
    }
}

/// A stub together with the source version it was derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Persisted<T> {
    pub source_timestamp: u64,
    pub stub: T,
}

impl<T> Persisted<T> {
    pub fn new(source_timestamp: u64, stub: T) -> Self {
        Self {
            source_timestamp,
            stub,
        }
    }
}

/// Externalizer for a single field stub.
#[derive(Debug, Default, Clone, Copy)]
pub struct FieldStubExternalizer;

impl StubExternalizer for FieldStubExternalizer {
    type State = Persisted<FieldStub>;

    fn source_timestamp(&self, state: &Self::State) -> u64 {
        state.source_timestamp
    }

    fn save_payload<W: Write>(&self, out: &mut W, state: &Self::State) -> Result<(), CodecError> {
        bincode::serialize_into(out, &state.stub)?;
        Ok(())
    }

    fn read_payload<R: Read>(
        &self,
        input: &mut R,
        source_timestamp: u64,
    ) -> Result<Self::State, CodecError> {
        let stub: FieldStub = bincode::deserialize_from(input)?;
        Ok(Persisted::new(source_timestamp, stub))
    }
}

#[derive(Serialize)]
struct StubTreePayloadRef<'a> {
    nodes: &'a [StubNode],
}

#[derive(Deserialize)]
struct StubTreePayload {
    nodes: Vec<StubNode>,
}

/// Externalizer for a whole file's stub tree.
#[derive(Debug, Default, Clone, Copy)]
pub struct StubTreeExternalizer;

impl StubExternalizer for StubTreeExternalizer {
    type State = StubTree;

    fn source_timestamp(&self, state: &Self::State) -> u64 {
        state.source_timestamp
    }

    fn save_payload<W: Write>(&self, out: &mut W, state: &Self::State) -> Result<(), CodecError> {
        bincode::serialize_into(out, &StubTreePayloadRef { nodes: &state.nodes })?;
        Ok(())
    }

    fn read_payload<R: Read>(
        &self,
        input: &mut R,
        source_timestamp: u64,
    ) -> Result<Self::State, CodecError> {
        let payload: StubTreePayload = bincode::deserialize_from(input)?;
        let tree = StubTree {
            source_timestamp,
            nodes: payload.nodes,
        };
        tree.validate().map_err(CodecError::Inconsistent)?;
        Ok(tree)
    }
}
