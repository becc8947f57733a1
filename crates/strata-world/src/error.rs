//! World error types.

use std::path::PathBuf;
use std::sync::Arc;

use strata_tag::TagError;
use strata_terrain::StageError;
use strata_voxel::{ChunkCoord, ChunkError};

/// Errors raised by the world, its storage and its generation workers.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// Filesystem failure other than a missing file.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored file exists but cannot be decoded or does not match the
    /// expected schema.
    #[error("corrupt data in {}: {source}", .path.display())]
    StorageCorruption {
        path: PathBuf,
        #[source]
        source: TagError,
    },

    /// Encoding a tag tree for writing failed.
    #[error("failed to encode {}: {source}", .path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: TagError,
    },

    /// A pipeline stage failed; the chunk was discarded.
    #[error("generating chunk {coord} failed in stage `{stage}`: {source}")]
    Generation {
        coord: ChunkCoord,
        stage: String,
        #[source]
        source: StageError,
    },

    /// The configured pipeline could not be built.
    #[error("invalid pipeline: {0}")]
    Pipeline(#[source] StageError),

    #[error(transparent)]
    Chunk(#[from] ChunkError),

    /// Player names are 1-16 ASCII letters, digits or underscores.
    #[error("invalid player name {0:?}")]
    InvalidUsername(String),

    /// The generation pool has shut down.
    #[error("generation workers have shut down")]
    WorkerGone,

    /// A job failure delivered to every request waiting on it.
    #[error(transparent)]
    Shared(Arc<WorldError>),
}

impl WorldError {
    /// The underlying error, looking through [`WorldError::Shared`].
    pub fn root(&self) -> &WorldError {
        match self {
            WorldError::Shared(inner) => inner.root(),
            other => other,
        }
    }
}
