//! Bundled generation stages.

mod flat;
mod ores;
mod safety;
mod simplex;
mod water;

pub use flat::Flat;
pub use ores::{OreVein, Ores};
pub use safety::Safety;
pub use simplex::SimplexTerrain;
pub use water::WaterTable;

use strata_voxel::{CHUNK_X, CHUNK_Z, Chunk, ChunkError};

/// Calls `edit(x, z, column)` for every column of `chunk`.
pub(crate) fn each_column(
    chunk: &mut Chunk,
    mut edit: impl FnMut(usize, usize, &mut [u8]),
) -> Result<(), ChunkError> {
    for x in 0..CHUNK_X {
        for z in 0..CHUNK_Z {
            chunk.edit_column(x, z, |column| edit(x, z, column))?;
        }
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_util {
    use std::sync::Arc;

    use strata_voxel::{BlockRegistry, Chunk, ChunkCoord};

    pub fn chunk_at(x: i32, z: i32) -> Chunk {
        Chunk::new(ChunkCoord::new(x, z), Arc::new(BlockRegistry::with_defaults()))
    }
}
