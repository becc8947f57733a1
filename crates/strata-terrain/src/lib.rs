//! Chunk generation: the [`Stage`] contract, ordered [`Pipeline`]s and the
//! bundled stages.
//!
//! Stages only touch blocks. Light tables are invalid while a pipeline runs;
//! the caller regenerates them once every stage has finished.

mod error;
mod pipeline;
mod registry;
mod seed;

pub mod stages;

pub use error::{PipelineError, StageError};
pub use pipeline::{Pipeline, Stage};
pub use registry::StageRegistry;
pub use seed::{chunk_rng, derive_chunk_seed};
