//! Full recomputation of the derived tables from block data.
//!
//! These run once after generation and on explicit regeneration requests;
//! single-voxel edits composite locally instead.

use crate::glow::{SKY_STRENGTH, composite_glow};
use crate::volume::LightVolume;

/// Height of the topmost non-air voxel in a contiguous vertical strip.
///
/// An all-air column reports 0.
pub fn column_height(column: &[u8]) -> u8 {
    column
        .iter()
        .rposition(|&b| b != 0)
        .map(|y| y as u8)
        .unwrap_or(0)
}

/// Computes the `sx × sz` heightmap of a column-major block array.
///
/// The result is indexed `x * sz + z`.
pub fn heightmap(blocks: &[u8], sx: usize, sy: usize, sz: usize) -> Vec<u8> {
    debug_assert_eq!(blocks.len(), sx * sy * sz);
    blocks.chunks_exact(sy).map(column_height).collect()
}

/// Sky light: a source of [`SKY_STRENGTH`] composited at every column's
/// surface voxel.
pub fn sky_light(heights: &[u8], sx: usize, sy: usize, sz: usize) -> LightVolume {
    debug_assert_eq!(heights.len(), sx * sz);
    let mut light = LightVolume::new(sx, sy, sz);
    for x in 0..sx {
        for z in 0..sz {
            let y = (heights[x * sz + z] as usize).min(sy.saturating_sub(1));
            composite_glow(&mut light, SKY_STRENGTH, x, y, z);
        }
    }
    light
}

/// Block light: every voxel whose type glows composites a kernel of that
/// strength. `glow` maps a block id to its strength (0 for non-emitters).
pub fn block_light(
    blocks: &[u8],
    sx: usize,
    sy: usize,
    sz: usize,
    glow: impl Fn(u8) -> u8,
) -> LightVolume {
    debug_assert_eq!(blocks.len(), sx * sy * sz);
    let mut light = LightVolume::new(sx, sy, sz);
    for (i, &id) in blocks.iter().enumerate() {
        let strength = glow(id);
        if strength == 0 {
            continue;
        }
        let y = i % sy;
        let z = (i / sy) % sz;
        let x = i / (sy * sz);
        composite_glow(&mut light, strength, x, y, z);
    }
    light
}
