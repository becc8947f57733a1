use strata_voxel::{Chunk, ids};

use super::each_column;
use crate::error::StageError;
use crate::pipeline::Stage;

/// Seals the bottom layer with bedrock so nothing falls out of the world.
#[derive(Clone, Copy, Debug, Default)]
pub struct Safety;

impl Stage for Safety {
    fn name(&self) -> &str {
        "safety"
    }

    fn populate(&self, chunk: &mut Chunk, _seed: u64) -> Result<(), StageError> {
        each_column(chunk, |_, _, column| column[0] = ids::BEDROCK)?;
        Ok(())
    }
}
