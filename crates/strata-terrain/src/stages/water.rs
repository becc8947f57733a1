use strata_voxel::{Chunk, ids};

use super::each_column;
use crate::error::StageError;
use crate::pipeline::Stage;

/// Floods every air voxel below the water level.
#[derive(Clone, Debug)]
pub struct WaterTable {
    /// Voxels with `y < level` are flooded.
    pub level: usize,
}

impl Default for WaterTable {
    fn default() -> Self {
        Self { level: 62 }
    }
}

impl Stage for WaterTable {
    fn name(&self) -> &str {
        "watertable"
    }

    fn populate(&self, chunk: &mut Chunk, _seed: u64) -> Result<(), StageError> {
        let level = self.level.min(strata_voxel::CHUNK_Y);
        each_column(chunk, |_, _, column| {
            for b in column[..level].iter_mut().filter(|b| **b == ids::AIR) {
                *b = ids::WATER;
            }
        })?;
        Ok(())
    }
}
