//! Ore veins scattered through stone.

use rand::Rng;
use strata_voxel::{CHUNK_X, CHUNK_Z, Chunk, ids};

use crate::error::StageError;
use crate::pipeline::Stage;
use crate::seed::chunk_rng;

/// One kind of ore and how often it appears.
#[derive(Clone, Debug)]
pub struct OreVein {
    pub block: u8,
    /// Veins attempted per chunk.
    pub veins: u32,
    /// Voxels visited by each vein's random walk.
    pub size: u32,
    /// Veins start below this height.
    pub max_y: usize,
}

/// Replaces stone with ore along short random walks.
#[derive(Clone, Debug)]
pub struct Ores {
    pub kinds: Vec<OreVein>,
}

impl Default for Ores {
    fn default() -> Self {
        Self {
            kinds: vec![
                OreVein {
                    block: ids::COAL_ORE,
                    veins: 20,
                    size: 12,
                    max_y: 128,
                },
                OreVein {
                    block: ids::IRON_ORE,
                    veins: 12,
                    size: 8,
                    max_y: 64,
                },
            ],
        }
    }
}

impl Stage for Ores {
    fn name(&self) -> &str {
        "ores"
    }

    fn populate(&self, chunk: &mut Chunk, seed: u64) -> Result<(), StageError> {
        let mut rng = chunk_rng(seed, self.name(), chunk.coord());
        for kind in &self.kinds {
            let max_y = kind.max_y.clamp(2, strata_voxel::CHUNK_Y);
            for _ in 0..kind.veins {
                let mut x = rng.random_range(0..CHUNK_X);
                let mut y = rng.random_range(1..max_y);
                let mut z = rng.random_range(0..CHUNK_Z);
                for _ in 0..kind.size {
                    if chunk.get_block(x, y, z)? == ids::STONE {
                        chunk.edit_column(x, z, |column| column[y] = kind.block)?;
                    }
                    match rng.random_range(0..6) {
                        0 => x = (x + 1).min(CHUNK_X - 1),
                        1 => x = x.saturating_sub(1),
                        2 => y = (y + 1).min(max_y - 1),
                        3 => y = y.saturating_sub(1).max(1),
                        4 => z = (z + 1).min(CHUNK_Z - 1),
                        _ => z = z.saturating_sub(1),
                    }
                }
            }
        }
        Ok(())
    }
}
