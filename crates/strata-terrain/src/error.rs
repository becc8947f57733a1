use strata_voxel::ChunkError;

/// Errors raised by a single stage or while resolving stage names.
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    /// No stage is registered under this name.
    #[error("unknown generation stage `{0}`")]
    UnknownStage(String),

    /// The stage addressed the chunk incorrectly.
    #[error(transparent)]
    Chunk(#[from] ChunkError),

    /// Any other stage-specific failure.
    #[error("{0}")]
    Failed(String),
}

/// A stage failed partway through a pipeline.
#[derive(Debug, thiserror::Error)]
#[error("stage `{stage}` failed: {source}")]
pub struct PipelineError {
    pub stage: String,
    #[source]
    pub source: StageError,
}
