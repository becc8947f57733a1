//! Dense per-voxel light storage.

use crate::glow::MAX_LIGHT;

/// One light level per voxel for a `sx × sy × sz` box.
///
/// Values are stored one per byte in memory; packing into nibbles happens at
/// the persistence and wire boundaries. Every public mutator leaves the
/// volume clamped to `[0, 15]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LightVolume {
    sx: usize,
    sy: usize,
    sz: usize,
    data: Vec<u8>,
}

impl LightVolume {
    /// Creates a fully dark volume.
    pub fn new(sx: usize, sy: usize, sz: usize) -> Self {
        Self {
            sx,
            sy,
            sz,
            data: vec![0; sx * sy * sz],
        }
    }

    /// Wraps an existing buffer, clamping every value into `[0, 15]`.
    ///
    /// Returns `None` when the buffer length does not match the dimensions.
    pub fn from_vec(sx: usize, sy: usize, sz: usize, mut data: Vec<u8>) -> Option<Self> {
        if data.len() != sx * sy * sz {
            return None;
        }
        for v in &mut data {
            *v = (*v).min(MAX_LIGHT);
        }
        Some(Self { sx, sy, sz, data })
    }

    /// Returns `(sx, sy, sz)`.
    pub fn dims(&self) -> (usize, usize, usize) {
        (self.sx, self.sy, self.sz)
    }

    /// Linear index of `(x, y, z)`; `y` varies fastest.
    #[inline]
    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        debug_assert!(x < self.sx && y < self.sy && z < self.sz);
        (x * self.sz + z) * self.sy + y
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> u8 {
        self.data[self.index(x, y, z)]
    }

    /// Stores `level`, clamped to the maximum light level.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, z: usize, level: u8) {
        let i = self.index(x, y, z);
        self.data[i] = level.min(MAX_LIGHT);
    }

    /// Raw light values in column-major order.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Mutable access for the compositing pass, which clamps afterwards.
    pub(crate) fn raw_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_volume_is_dark() {
        let v = LightVolume::new(4, 8, 4);
        assert_eq!(v.as_slice().len(), 128);
        assert!(v.as_slice().iter().all(|&l| l == 0));
    }

    #[test]
    fn test_index_is_column_major() {
        let v = LightVolume::new(16, 128, 16);
        assert_eq!(v.index(0, 1, 0), 1);
        assert_eq!(v.index(0, 0, 1), 128);
        assert_eq!(v.index(1, 0, 0), 128 * 16);
    }

    #[test]
    fn test_set_clamps() {
        let mut v = LightVolume::new(2, 2, 2);
        v.set(1, 1, 1, 200);
        assert_eq!(v.get(1, 1, 1), 15);
    }

    #[test]
    fn test_from_vec_rejects_wrong_length_and_clamps() {
        assert!(LightVolume::from_vec(2, 2, 2, vec![0; 7]).is_none());
        let v = LightVolume::from_vec(1, 2, 1, vec![3, 99]).expect("length matches");
        assert_eq!(v.as_slice(), &[3, 15]);
    }
}
