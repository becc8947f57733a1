//! Heightmap, sky-light and block-light computation for voxel columns.
//!
//! Everything here is a pure function over flat arrays laid out column-major
//! (`x` outermost, then `z`, then `y` innermost) so that a vertical strip of
//! voxels is contiguous. The chunk crate owns the arrays; this crate only
//! recomputes them.

mod glow;
mod regenerate;
mod volume;

pub use glow::{GlowKernel, MAX_LIGHT, SKY_STRENGTH, composite_glow, glow_kernel};
pub use regenerate::{block_light, column_height, heightmap, sky_light};
pub use volume::LightVolume;
