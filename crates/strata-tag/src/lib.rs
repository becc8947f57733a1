//! Persisted tag trees and the encodings that store them.
//!
//! Chunks, level metadata and players are converted to a [`Compound`] tree by
//! the world crate; a [`TagFormat`] turns that tree into bytes. Two formats
//! ship: gzip-compressed binary NBT ([`NbtFormat`], `.dat`) and JSON
//! ([`JsonFormat`], `.json`).

mod error;
mod format;
mod json;
mod nbt;
mod tag;

pub use error::TagError;
pub use format::TagFormat;
pub use json::JsonFormat;
pub use nbt::{MAX_DEPTH, NbtFormat, read_compound, write_compound};
pub use tag::{Compound, Tag};
