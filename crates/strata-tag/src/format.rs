//! The serialization interface consumed by the world store.

use crate::error::TagError;
use crate::tag::Compound;

/// Converts a root [`Compound`] to and from its on-disk bytes.
pub trait TagFormat: Send + Sync {
    /// File extension including the leading dot, e.g. `".dat"`.
    fn extension(&self) -> &'static str;

    /// Encodes a root compound.
    fn encode(&self, root: &Compound) -> Result<Vec<u8>, TagError>;

    /// Decodes bytes produced by [`TagFormat::encode`].
    fn decode(&self, bytes: &[u8]) -> Result<Compound, TagError>;
}
