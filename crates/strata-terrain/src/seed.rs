//! Per-chunk seed derivation.
//!
//! The mixing is fixed (splitmix64) so a world seed produces the same
//! terrain on every platform and toolchain.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use strata_voxel::ChunkCoord;

/// One splitmix64 step.
fn splitmix64(value: u64) -> u64 {
    let mut z = value.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Combines the world seed, a stage salt and the chunk coordinate into one
/// well-mixed `u64`.
pub fn derive_chunk_seed(world_seed: u64, salt: &str, coord: ChunkCoord) -> u64 {
    let mut h = splitmix64(world_seed);
    for byte in salt.bytes() {
        h = splitmix64(h ^ u64::from(byte));
    }
    h = splitmix64(h ^ salt.len() as u64);
    h = splitmix64(h ^ u64::from(coord.x as u32));
    splitmix64(h ^ u64::from(coord.z as u32))
}

/// A deterministic RNG for one stage of one chunk.
pub fn chunk_rng(world_seed: u64, salt: &str, coord: ChunkCoord) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(derive_chunk_seed(world_seed, salt, coord))
}
