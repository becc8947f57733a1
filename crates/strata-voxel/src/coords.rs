//! Chunk and voxel coordinate types.
//!
//! World space is split into columns of `16 x 128 x 16` voxels addressed by
//! [`ChunkCoord`]. Inside a chunk a voxel is addressed by [`LocalPos`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ChunkError;

/// Chunk width along x.
pub const CHUNK_X: usize = 16;
/// Chunk height.
pub const CHUNK_Y: usize = 128;
/// Chunk depth along z.
pub const CHUNK_Z: usize = 16;
/// Voxels in a single chunk.
pub const CHUNK_VOLUME: usize = CHUNK_X * CHUNK_Y * CHUNK_Z;
/// Columns in a single chunk.
pub const CHUNK_COLUMNS: usize = CHUNK_X * CHUNK_Z;

/// Column coordinate of a chunk in the world grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkCoord {
    pub x: i32,
    pub z: i32,
}

impl ChunkCoord {
    /// Smallest chunk x whose voxels all have `i32` world coordinates.
    pub const MIN_X: i32 = i32::MIN / CHUNK_X as i32;
    /// Largest chunk x whose voxels all have `i32` world coordinates.
    pub const MAX_X: i32 = i32::MAX / CHUNK_X as i32;
    pub const MIN_Z: i32 = i32::MIN / CHUNK_Z as i32;
    pub const MAX_Z: i32 = i32::MAX / CHUNK_Z as i32;

    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Like [`ChunkCoord::new`] but rejects chunks that would reach past the
    /// `i32` world coordinate space. [`ChunkCoord::containing`] always yields
    /// a valid coordinate.
    pub fn checked(x: i32, z: i32) -> Result<Self, ChunkError> {
        if (Self::MIN_X..=Self::MAX_X).contains(&x) && (Self::MIN_Z..=Self::MAX_Z).contains(&z) {
            Ok(Self { x, z })
        } else {
            Err(ChunkError::ChunkOutOfWorld { x, z })
        }
    }

    /// The chunk holding world column `(wx, wz)`.
    pub fn containing(wx: i32, wz: i32) -> Self {
        Self {
            x: wx.div_euclid(CHUNK_X as i32),
            z: wz.div_euclid(CHUNK_Z as i32),
        }
    }

    /// World x of this chunk's local x = 0. Only meaningful for coordinates
    /// accepted by [`ChunkCoord::checked`].
    pub fn base_x(&self) -> i32 {
        self.x * CHUNK_X as i32
    }

    /// World z of this chunk's local z = 0.
    pub fn base_z(&self) -> i32 {
        self.z * CHUNK_Z as i32
    }
}

impl fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

/// A validated voxel position inside a chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocalPos {
    x: u8,
    y: u8,
    z: u8,
}

impl LocalPos {
    /// Validates chunk-local coordinates.
    pub fn new(x: usize, y: usize, z: usize) -> Result<Self, ChunkError> {
        if x >= CHUNK_X || y >= CHUNK_Y || z >= CHUNK_Z {
            return Err(ChunkError::OutOfRange { x, y, z });
        }
        Ok(Self {
            x: x as u8,
            y: y as u8,
            z: z as u8,
        })
    }

    pub fn x(&self) -> usize {
        self.x as usize
    }

    pub fn y(&self) -> usize {
        self.y as usize
    }

    pub fn z(&self) -> usize {
        self.z as usize
    }

    /// Index into a chunk's flat voxel arrays.
    pub fn index(&self) -> usize {
        voxel_index(self.x(), self.y(), self.z())
    }

    /// Index of this position's column.
    pub fn column(&self) -> usize {
        column_index(self.x(), self.z())
    }

    /// `x << 12 | z << 8 | y`, the packing used by batch block updates.
    pub fn packed(&self) -> u16 {
        (self.x as u16) << 12 | (self.z as u16) << 8 | self.y as u16
    }

    /// Inverse of [`LocalPos::packed`].
    pub fn from_packed(packed: u16) -> Result<Self, ChunkError> {
        Self::new(
            (packed >> 12) as usize & 0xF,
            packed as usize & 0xFF,
            (packed >> 8) as usize & 0xF,
        )
    }
}

/// Flat index of `(x, y, z)`; vertical strips are contiguous.
#[inline]
pub fn voxel_index(x: usize, y: usize, z: usize) -> usize {
    (x * CHUNK_Z + z) * CHUNK_Y + y
}

/// Flat index of column `(x, z)`.
#[inline]
pub fn column_index(x: usize, z: usize) -> usize {
    x * CHUNK_Z + z
}

/// Splits a world voxel position into its chunk and local position.
pub fn split_world(wx: i32, wy: i32, wz: i32) -> Result<(ChunkCoord, LocalPos), ChunkError> {
    if wy < 0 || wy >= CHUNK_Y as i32 {
        return Err(ChunkError::OutOfWorld {
            x: wx,
            y: wy,
            z: wz,
        });
    }
    let coord = ChunkCoord::containing(wx, wz);
    let local = LocalPos::new(
        wx.rem_euclid(CHUNK_X as i32) as usize,
        wy as usize,
        wz.rem_euclid(CHUNK_Z as i32) as usize,
    )?;
    Ok((coord, local))
}

/// Signed base-36 rendering (`0-9a-z`, leading `-` when negative).
pub fn base36(value: i64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut n = value.unsigned_abs();
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    if value < 0 {
        out.push(b'-');
    }
    out.reverse();
    out.into_iter().map(char::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_pos_bounds() {
        assert!(LocalPos::new(15, 127, 15).is_ok());
        assert_eq!(
            LocalPos::new(16, 0, 0),
            Err(ChunkError::OutOfRange { x: 16, y: 0, z: 0 })
        );
        assert!(LocalPos::new(0, 128, 0).is_err());
        assert!(LocalPos::new(0, 0, 16).is_err());
    }

    #[test]
    fn test_column_is_contiguous() {
        let a = voxel_index(3, 10, 7);
        let b = voxel_index(3, 11, 7);
        assert_eq!(b, a + 1);
        assert_eq!(voxel_index(15, 127, 15), CHUNK_VOLUME - 1);
    }

    #[test]
    fn test_checked_chunk_range() {
        let far = ChunkCoord::checked(ChunkCoord::MAX_X, ChunkCoord::MIN_Z).unwrap();
        assert_eq!(far.base_x() + 15, i32::MAX);
        assert_eq!(far.base_z(), i32::MIN);
        assert_eq!(
            ChunkCoord::checked(1 << 28, 0),
            Err(ChunkError::ChunkOutOfWorld { x: 1 << 28, z: 0 })
        );
        assert!(ChunkCoord::checked(0, ChunkCoord::MIN_Z - 1).is_err());
        assert_eq!(
            ChunkCoord::containing(i32::MAX, i32::MIN),
            ChunkCoord::new(ChunkCoord::MAX_X, ChunkCoord::MIN_Z)
        );
    }

    #[test]
    fn test_packed_layout() {
        let p = LocalPos::new(2, 0, 2).unwrap();
        assert_eq!(p.packed(), 0x2200);
        let q = LocalPos::new(15, 127, 1).unwrap();
        assert_eq!(q.packed(), 0xF17F);
        assert_eq!(LocalPos::from_packed(q.packed()).unwrap(), q);
    }

    #[test]
    fn test_split_world_negative() {
        let (c, l) = split_world(-1, 64, -17).unwrap();
        assert_eq!(c, ChunkCoord::new(-1, -2));
        assert_eq!((l.x(), l.y(), l.z()), (15, 64, 15));
        let (c, l) = split_world(16, 0, 31).unwrap();
        assert_eq!(c, ChunkCoord::new(1, 1));
        assert_eq!((l.x(), l.z()), (0, 15));
        assert!(matches!(
            split_world(0, 128, 0),
            Err(ChunkError::OutOfWorld { .. })
        ));
        assert!(split_world(0, -1, 0).is_err());
    }

    #[test]
    fn test_base36() {
        assert_eq!(base36(0), "0");
        assert_eq!(base36(35), "z");
        assert_eq!(base36(36), "10");
        assert_eq!(base36(-1), "-1");
        assert_eq!(base36(-73), "-21");
        assert_eq!(base36(i64::MIN), "-1y2p0ij32e8e8");
    }
}
