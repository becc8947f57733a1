//! Tag tree error types.

/// Errors raised while encoding, decoding or reading a tag tree.
#[derive(Debug, thiserror::Error)]
pub enum TagError {
    /// A required field is absent from a compound.
    #[error("missing tag `{0}`")]
    Missing(String),

    /// A field exists but holds a different tag type.
    #[error("tag `{name}` is {found}, expected {expected}")]
    WrongType {
        /// Field name.
        name: String,
        /// The tag type the reader wanted.
        expected: &'static str,
        /// The tag type actually stored.
        found: &'static str,
    },

    /// Input ended before a complete tag was read.
    #[error("unexpected end of tag data")]
    Truncated,

    /// An unknown tag type byte.
    #[error("unknown tag type id {0}")]
    UnknownTagId(u8),

    /// The document root is not a compound.
    #[error("root tag must be a compound")]
    RootNotCompound,

    /// Nesting deeper than the decoder allows.
    #[error("tag nesting exceeds {0} levels")]
    TooDeep(usize),

    /// Structurally valid bytes with invalid content (bad UTF-8, mixed list).
    #[error("malformed tag data: {0}")]
    Malformed(String),

    /// Compression or decompression failure.
    #[error("compression error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding failure.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
