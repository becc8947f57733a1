//! Diamond-shaped glow kernels and additive compositing.
//!
//! A light source of strength `s` lights its surroundings with a kernel of
//! side `2s + 1` whose cell value is `s + 1 - manhattan_distance` from the
//! centre, floored at zero and capped at [`MAX_LIGHT`]. Compositing adds a
//! kernel onto a target volume and then clamps, so overlapping sources
//! brighten each other up to the cap.

use std::sync::LazyLock;

use crate::volume::LightVolume;

/// Brightest representable light level (one nibble).
pub const MAX_LIGHT: u8 = 15;

/// Strength of the sky source placed on every column surface.
pub const SKY_STRENGTH: u8 = 14;

/// Precomputed kernel for one source strength.
#[derive(Clone, Debug)]
pub struct GlowKernel {
    strength: u8,
    side: usize,
    cells: Vec<u8>,
}

impl GlowKernel {
    fn build(strength: u8) -> Self {
        let s = strength as i32;
        let side = (2 * s + 1) as usize;
        let mut cells = vec![0u8; side * side * side];
        for i in 0..side {
            for j in 0..side {
                for k in 0..side {
                    let d = (i as i32 - s).abs() + (j as i32 - s).abs() + (k as i32 - s).abs();
                    let v = (s + 1 - d).clamp(0, MAX_LIGHT as i32);
                    cells[(i * side + k) * side + j] = v as u8;
                }
            }
        }
        Self {
            strength,
            side,
            cells,
        }
    }

    pub fn strength(&self) -> u8 {
        self.strength
    }

    /// Side length, `2 * strength + 1`.
    pub fn side(&self) -> usize {
        self.side
    }

    /// Kernel value at offset `(i, j, k)` from the kernel corner, `j` being
    /// the vertical axis.
    #[inline]
    pub fn get(&self, i: usize, j: usize, k: usize) -> u8 {
        self.cells[(i * self.side + k) * self.side + j]
    }
}

static KERNELS: LazyLock<Vec<GlowKernel>> =
    LazyLock::new(|| (0..=MAX_LIGHT).map(GlowKernel::build).collect());

/// Returns the shared kernel for `strength`, capped at [`MAX_LIGHT`].
pub fn glow_kernel(strength: u8) -> &'static GlowKernel {
    &KERNELS[strength.min(MAX_LIGHT) as usize]
}

/// Adds the glow of a source of `strength` centred on `(x, y, z)` onto
/// `target`, clipping the kernel to the target bounds, then clamps.
///
/// Only the clipped region is re-clamped: the rest of the volume is already
/// within `[0, 15]`, so this matches clamping the whole array after the add.
/// A zero strength source contributes nothing.
pub fn composite_glow(target: &mut LightVolume, strength: u8, x: usize, y: usize, z: usize) {
    if strength == 0 {
        return;
    }
    let kernel = glow_kernel(strength);
    let s = kernel.strength() as isize;
    let (sx, sy, sz) = target.dims();

    let span = |centre: usize, bound: usize| -> (usize, usize, usize) {
        // (target start, target end exclusive, kernel start)
        let lo = centre as isize - s;
        let hi = (centre as isize + s + 1).min(bound as isize);
        let start = lo.max(0);
        (start as usize, hi.max(start) as usize, (start - lo) as usize)
    };
    let (x0, x1, i0) = span(x, sx);
    let (y0, y1, j0) = span(y, sy);
    let (z0, z1, k0) = span(z, sz);

    let raw = target.raw_mut();
    for (i, tx) in (x0..x1).enumerate() {
        for (k, tz) in (z0..z1).enumerate() {
            let base = (tx * sz + tz) * sy;
            for (j, ty) in (y0..y1).enumerate() {
                let cell = &mut raw[base + ty];
                let added = *cell as u16 + kernel.get(i0 + i, j0 + j, k0 + k) as u16;
                *cell = added.min(MAX_LIGHT as u16) as u8;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernel_centre_and_falloff() {
        let k = glow_kernel(3);
        assert_eq!(k.side(), 7);
        assert_eq!(k.get(3, 3, 3), 4);
        assert_eq!(k.get(4, 3, 3), 3);
        assert_eq!(k.get(3, 5, 3), 2);
        assert_eq!(k.get(0, 0, 0), 0);
    }

    #[test]
    fn test_kernel_is_symmetric() {
        let k = glow_kernel(5);
        let n = k.side() - 1;
        for i in 0..=n {
            for j in 0..=n {
                for kk in 0..=n {
                    assert_eq!(k.get(i, j, kk), k.get(n - i, j, kk));
                    assert_eq!(k.get(i, j, kk), k.get(i, n - j, kk));
                    assert_eq!(k.get(i, j, kk), k.get(i, j, n - kk));
                }
            }
        }
    }

    #[test]
    fn test_strongest_kernel_is_capped() {
        let k = glow_kernel(15);
        assert_eq!(k.get(15, 15, 15), 15);
        assert_eq!(k.get(16, 15, 15), 15);
        assert_eq!(k.get(17, 15, 15), 14);
    }

    #[test]
    fn test_composite_single_source_in_open_volume() {
        let mut v = LightVolume::new(16, 32, 16);
        composite_glow(&mut v, 4, 8, 8, 8);
        assert_eq!(v.get(8, 8, 8), 5);
        assert_eq!(v.get(9, 8, 8), 4);
        assert_eq!(v.get(8, 12, 8), 1);
        assert_eq!(v.get(8, 13, 8), 0);
    }

    #[test]
    fn test_composite_clips_at_corner() {
        let mut v = LightVolume::new(4, 4, 4);
        composite_glow(&mut v, 6, 0, 0, 0);
        assert_eq!(v.get(0, 0, 0), 7);
        assert_eq!(v.get(3, 3, 3), 0);
        assert_eq!(v.get(3, 0, 0), 4);
    }

    #[test]
    fn test_composite_is_additive_then_clamped() {
        let mut v = LightVolume::new(8, 8, 8);
        composite_glow(&mut v, 3, 3, 3, 3);
        composite_glow(&mut v, 3, 4, 3, 3);
        // The second source sits one step away and adds 3 on top of 4.
        assert_eq!(v.get(3, 3, 3), 4 + 3);
        for _ in 0..5 {
            composite_glow(&mut v, 3, 3, 3, 3);
        }
        assert_eq!(v.get(3, 3, 3), 15);
        assert!(v.as_slice().iter().all(|&l| l <= MAX_LIGHT));
    }

    #[test]
    fn test_zero_strength_is_noop() {
        let mut v = LightVolume::new(2, 2, 2);
        composite_glow(&mut v, 0, 1, 1, 1);
        assert!(v.as_slice().iter().all(|&l| l == 0));
    }
}
