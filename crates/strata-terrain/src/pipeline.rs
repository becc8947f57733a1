//! The stage contract and ordered pipelines.

use std::fmt;
use std::sync::Arc;

use strata_voxel::Chunk;

use crate::error::{PipelineError, StageError};

/// One step of chunk generation.
///
/// Implementations must be deterministic in the chunk coordinate and the
/// seed, and may only read and write blocks and metadata.
pub trait Stage: Send + Sync {
    /// Name used in configuration and error reports.
    fn name(&self) -> &str;

    /// Populates `chunk` in place.
    fn populate(&self, chunk: &mut Chunk, seed: u64) -> Result<(), StageError>;
}

/// An ordered list of stages run once against each fresh chunk.
#[derive(Clone, Default)]
pub struct Pipeline {
    stages: Vec<Arc<dyn Stage>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a stage, returning the pipeline for chaining.
    pub fn with(mut self, stage: Arc<dyn Stage>) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn push(&mut self, stage: Arc<dyn Stage>) {
        self.stages.push(stage);
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Stage names in run order.
    pub fn names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Runs every stage in order, stopping at the first failure.
    pub fn run(&self, chunk: &mut Chunk, seed: u64) -> Result<(), PipelineError> {
        for stage in &self.stages {
            tracing::trace!(stage = stage.name(), coord = %chunk.coord(), "running stage");
            stage.populate(chunk, seed).map_err(|source| PipelineError {
                stage: stage.name().to_string(),
                source,
            })?;
        }
        Ok(())
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
