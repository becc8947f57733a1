use strata_voxel::{Chunk, ids};

use super::each_column;
use crate::error::StageError;
use crate::pipeline::Stage;

/// Solid ground of a single block type below a fixed height.
#[derive(Clone, Debug)]
pub struct Flat {
    pub block: u8,
    /// Voxels with `y < height` are filled.
    pub height: usize,
}

impl Default for Flat {
    fn default() -> Self {
        Self {
            block: ids::STONE,
            height: 64,
        }
    }
}

impl Stage for Flat {
    fn name(&self) -> &str {
        "flat"
    }

    fn populate(&self, chunk: &mut Chunk, _seed: u64) -> Result<(), StageError> {
        let top = self.height.min(strata_voxel::CHUNK_Y);
        each_column(chunk, |_, _, column| column[..top].fill(self.block))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::test_util::chunk_at;

    #[test]
    fn test_flat_fills_below_64() {
        let mut chunk = chunk_at(3, -3);
        Flat::default().populate(&mut chunk, 0).unwrap();
        assert_eq!(chunk.get_block(5, 0, 5).unwrap(), ids::STONE);
        assert_eq!(chunk.get_block(5, 63, 5).unwrap(), ids::STONE);
        assert_eq!(chunk.get_block(5, 64, 5).unwrap(), ids::AIR);
        assert_eq!(chunk.get_block(5, 70, 5).unwrap(), ids::AIR);
        assert_eq!(chunk.height_at(0, 15).unwrap(), 63);
    }
}
