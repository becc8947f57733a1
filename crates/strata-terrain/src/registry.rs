//! Name-to-stage lookup for configured pipelines.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::StageError;
use crate::pipeline::{Pipeline, Stage};
use crate::stages::{Flat, Ores, Safety, SimplexTerrain, WaterTable};

/// Stages available to configuration, keyed by [`Stage::name`].
#[derive(Clone, Default)]
pub struct StageRegistry {
    stages: HashMap<String, Arc<dyn Stage>>,
}

impl StageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every bundled stage.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(Flat::default()));
        registry.register(Arc::new(SimplexTerrain::default()));
        registry.register(Arc::new(WaterTable::default()));
        registry.register(Arc::new(Ores::default()));
        registry.register(Arc::new(Safety));
        registry
    }

    /// Adds or replaces a stage under its own name.
    pub fn register(&mut self, stage: Arc<dyn Stage>) {
        self.stages.insert(stage.name().to_string(), stage);
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn Stage>, StageError> {
        self.stages
            .get(name)
            .cloned()
            .ok_or_else(|| StageError::UnknownStage(name.to_string()))
    }

    /// Builds a pipeline from stage names, in the given order.
    pub fn pipeline<S: AsRef<str>>(&self, names: &[S]) -> Result<Pipeline, StageError> {
        let mut pipeline = Pipeline::new();
        for name in names {
            pipeline.push(self.get(name.as_ref())?);
        }
        Ok(pipeline)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.stages.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
