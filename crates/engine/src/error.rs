use std::path::PathBuf;

use dirbase_codec::CodecError;
use thiserror::Error;

/// Violations of the CSR layout invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("vertex offsets are empty, expected at least one entry")]
    MissingOffsets,

    #[error("first vertex offset is {0}, expected 0")]
    NonZeroStart(u32),

    #[error("vertex offsets decrease at vertex {vertex}")]
    Decreasing { vertex: usize },

    #[error("last vertex offset is {last}, but there are {edges} edge targets")]
    EndMismatch { last: u32, edges: usize },

    #[error("edge target {target} out of range for {vertices} vertices")]
    TargetOutOfRange { target: u32, vertices: usize },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("baseline store unavailable at {}: {reason}", path.display())]
    Unavailable { path: PathBuf, reason: String },

    #[error("key not found: {0}")]
    KeyNotFound(String),

    #[error("baseline store was opened read-only")]
    ReadOnly,

    #[error("value under key {key} could not be (de)serialized: {source}")]
    Serialization {
        key: String,
        #[source]
        source: CodecError,
    },

    #[error("corrupt folder graph: {0}")]
    CorruptGraph(#[from] GraphError),

    #[error("inconsistent baseline: {0}")]
    Inconsistent(String),

    #[error("key-value engine error: {0}")]
    Engine(#[from] sled::Error),

    #[error("{0} worker panicked")]
    WorkerPanicked(&'static str),
}

impl StoreError {
    pub(crate) fn serialization(key: impl Into<String>, source: CodecError) -> Self {
        StoreError::Serialization {
            key: key.into(),
            source,
        }
    }

    pub(crate) fn unavailable(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        StoreError::Unavailable {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
