//! Chunk access errors.

/// Errors raised by chunk accessors.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ChunkError {
    /// Chunk-local coordinates outside `16 x 128 x 16`.
    #[error("local position ({x}, {y}, {z}) is outside the chunk")]
    OutOfRange { x: usize, y: usize, z: usize },

    /// World coordinates whose height falls outside the world.
    #[error("world position ({x}, {y}, {z}) is outside the world height")]
    OutOfWorld { x: i32, y: i32, z: i32 },

    /// A chunk coordinate whose voxels would not fit `i32` world coordinates.
    #[error("chunk ({x}, {z}) is outside the world")]
    ChunkOutOfWorld { x: i32, z: i32 },

    /// A bulk array of the wrong size was supplied.
    #[error("{what} has {len} entries, expected {expected}")]
    Length {
        what: &'static str,
        len: usize,
        expected: usize,
    },
}
