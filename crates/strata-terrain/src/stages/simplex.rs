//! Rolling terrain from fractal Brownian motion over simplex noise.

use noise::{NoiseFn, Simplex};
use strata_voxel::{CHUNK_Y, Chunk, ids};

use super::each_column;
use crate::error::StageError;
use crate::pipeline::Stage;

/// Heightmap terrain: stone, a few layers of dirt and a grass cap.
#[derive(Clone, Debug)]
pub struct SimplexTerrain {
    /// Average surface height.
    pub base_height: f64,
    /// Peak deviation of the first octave.
    pub amplitude: f64,
    /// Frequency of the first octave, in cycles per voxel.
    pub base_frequency: f64,
    pub octaves: u32,
    pub lacunarity: f64,
    pub persistence: f64,
    /// Dirt layers under the grass.
    pub soil_depth: usize,
}

impl Default for SimplexTerrain {
    fn default() -> Self {
        Self {
            base_height: 64.0,
            amplitude: 12.0,
            base_frequency: 0.01,
            octaves: 4,
            lacunarity: 2.0,
            persistence: 0.5,
            soil_depth: 3,
        }
    }
}

impl SimplexTerrain {
    fn fbm(&self, noise: &Simplex, x: f64, z: f64) -> f64 {
        let mut total = 0.0;
        let mut frequency = self.base_frequency;
        let mut amplitude = self.amplitude;
        for _ in 0..self.octaves {
            total += noise.get([x * frequency, z * frequency]) * amplitude;
            frequency *= self.lacunarity;
            amplitude *= self.persistence;
        }
        total
    }

    /// Surface height of world column `(wx, wz)`.
    pub fn surface(&self, noise: &Simplex, wx: i32, wz: i32) -> usize {
        let h = self.base_height + self.fbm(noise, wx as f64, wz as f64);
        h.round().clamp(1.0, (CHUNK_Y - 2) as f64) as usize
    }
}

impl Stage for SimplexTerrain {
    fn name(&self) -> &str {
        "simplex"
    }

    fn populate(&self, chunk: &mut Chunk, seed: u64) -> Result<(), StageError> {
        let noise = Simplex::new(seed as u32);
        let coord = chunk.coord();
        each_column(chunk, |x, z, column| {
            let top = self.surface(&noise, coord.base_x() + x as i32, coord.base_z() + z as i32);
            let soil = top.saturating_sub(self.soil_depth);
            column[..soil].fill(ids::STONE);
            column[soil..top].fill(ids::DIRT);
            column[top] = ids::GRASS;
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::test_util::chunk_at;

    #[test]
    fn test_layers() {
        let stage = SimplexTerrain::default();
        let mut chunk = chunk_at(5, 7);
        stage.populate(&mut chunk, 1234).unwrap();
        for x in 0..16 {
            for z in 0..16 {
                let top = chunk.height_at(x, z).unwrap() as usize;
                assert_eq!(chunk.get_block(x, top, z).unwrap(), ids::GRASS);
                assert_eq!(chunk.get_block(x, top - 1, z).unwrap(), ids::DIRT);
                assert_eq!(chunk.get_block(x, 0, z).unwrap(), ids::STONE);
                assert!((40..=90).contains(&top), "surface {top} out of band");
            }
        }
    }

    #[test]
    fn test_deterministic() {
        let stage = SimplexTerrain::default();
        let mut a = chunk_at(-2, 9);
        let mut b = chunk_at(-2, 9);
        stage.populate(&mut a, 77).unwrap();
        stage.populate(&mut b, 77).unwrap();
        assert_eq!(a.blocks(), b.blocks());

        let mut other = chunk_at(-2, 9);
        stage.populate(&mut other, 78).unwrap();
        assert_ne!(a.blocks(), other.blocks());
    }

    #[test]
    fn test_seamless_across_chunks() {
        let stage = SimplexTerrain::default();
        let noise = Simplex::new(5);
        let mut left = chunk_at(0, 0);
        stage.populate(&mut left, 5).unwrap();
        assert_eq!(
            left.height_at(15, 3).unwrap() as usize,
            stage.surface(&noise, 15, 3)
        );
        let mut right = chunk_at(1, 0);
        stage.populate(&mut right, 5).unwrap();
        assert_eq!(
            right.height_at(0, 3).unwrap() as usize,
            stage.surface(&noise, 16, 3)
        );
    }
}
