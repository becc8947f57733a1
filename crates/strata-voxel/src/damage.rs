//! Tracking of voxels changed since clients were last synchronised.
//!
//! A chunk records each changed position until the set grows past a
//! threshold, then collapses to "all damaged" and resends the whole chunk.

use lz4_flex::{compress_prepend_size, decompress_size_prepended};

use crate::coords::{ChunkCoord, LocalPos};

/// Default number of distinct voxels tracked before collapsing.
pub const DEFAULT_DAMAGE_THRESHOLD: usize = 176;

/// Changed voxels in insertion order, or the whole chunk.
#[derive(Clone, Debug)]
pub struct Damage {
    positions: Vec<LocalPos>,
    all: bool,
    threshold: usize,
}

impl Damage {
    pub fn new(threshold: usize) -> Self {
        Self {
            positions: Vec::new(),
            all: false,
            threshold,
        }
    }

    /// Records `pos`. Repeats are ignored; one past the threshold collapses
    /// the set.
    pub fn mark(&mut self, pos: LocalPos) {
        if self.all || self.positions.contains(&pos) {
            return;
        }
        self.positions.push(pos);
        if self.positions.len() > self.threshold {
            self.mark_all();
        }
    }

    /// Collapses to "all damaged", dropping the fine-grained set.
    pub fn mark_all(&mut self) {
        self.all = true;
        self.positions.clear();
    }

    pub fn is_damaged(&self) -> bool {
        self.all || !self.positions.is_empty()
    }

    pub fn is_all(&self) -> bool {
        self.all
    }

    /// Damaged positions in the order they were first recorded. Empty when
    /// collapsed.
    pub fn positions(&self) -> &[LocalPos] {
        &self.positions
    }

    pub fn clear(&mut self) {
        self.all = false;
        self.positions.clear();
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Changes the threshold; a set already past the new bound collapses.
    pub fn set_threshold(&mut self, threshold: usize) {
        self.threshold = threshold;
        if self.positions.len() > threshold {
            self.mark_all();
        }
    }
}

impl Default for Damage {
    fn default() -> Self {
        Self::new(DEFAULT_DAMAGE_THRESHOLD)
    }
}

/// Compressed full-chunk transmission.
///
/// The uncompressed layout is the block array, then nibble-packed metadata,
/// block light and sky light, each in voxel index order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkPayload {
    pub coord: ChunkCoord,
    /// LZ4 with the uncompressed size prepended.
    pub data: Vec<u8>,
}

impl ChunkPayload {
    pub fn compress(coord: ChunkCoord, raw: &[u8]) -> Self {
        Self {
            coord,
            data: compress_prepend_size(raw),
        }
    }

    /// Uncompressed bytes, or `None` if the payload is corrupt.
    pub fn decompress(&self) -> Option<Vec<u8>> {
        decompress_size_prepended(&self.data).ok()
    }
}

/// What a client needs to catch up with a damaged chunk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DamagePacket {
    /// One changed voxel, in world coordinates.
    Single {
        x: i32,
        y: i32,
        z: i32,
        block: u8,
        metadata: u8,
    },
    /// Several changed voxels. The three arrays are parallel; coordinates are
    /// packed with [`LocalPos::packed`].
    Batch {
        coord: ChunkCoord,
        coords: Vec<u16>,
        blocks: Vec<u8>,
        metadata: Vec<u8>,
    },
    /// The whole chunk.
    Full(ChunkPayload),
}

impl DamagePacket {
    /// Number of voxels a batch carries; 1 for single updates and 0 for
    /// full resends.
    pub fn count(&self) -> usize {
        match self {
            DamagePacket::Single { .. } => 1,
            DamagePacket::Batch { coords, .. } => coords.len(),
            DamagePacket::Full(_) => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::{CHUNK_X, CHUNK_Z};

    fn nth(i: usize) -> LocalPos {
        LocalPos::new(i % CHUNK_X, i / (CHUNK_X * CHUNK_Z), (i / CHUNK_X) % CHUNK_Z).unwrap()
    }

    #[test]
    fn test_threshold_boundary() {
        let mut damage = Damage::default();
        for i in 0..176 {
            damage.mark(nth(i));
        }
        assert!(!damage.is_all());
        assert_eq!(damage.positions().len(), 176);

        damage.mark(nth(176));
        assert!(damage.is_all());
        assert!(damage.positions().is_empty());

        damage.mark(nth(3));
        assert!(damage.is_all());
    }

    #[test]
    fn test_repeats_do_not_count() {
        let mut damage = Damage::new(2);
        for _ in 0..10 {
            damage.mark(nth(0));
        }
        damage.mark(nth(1));
        damage.mark(nth(0));
        assert!(!damage.is_all());
        assert_eq!(damage.positions(), &[nth(0), nth(1)]);
    }

    #[test]
    fn test_clear() {
        let mut damage = Damage::default();
        damage.mark_all();
        damage.clear();
        assert!(!damage.is_damaged());
        damage.clear();
        assert!(!damage.is_damaged());
    }

    #[test]
    fn test_lowering_threshold_collapses() {
        let mut damage = Damage::default();
        for i in 0..10 {
            damage.mark(nth(i));
        }
        damage.set_threshold(4);
        assert!(damage.is_all());
    }

    #[test]
    fn test_payload_decompress() {
        let raw: Vec<u8> = (0..1000).map(|i| (i % 7) as u8).collect();
        let payload = ChunkPayload::compress(ChunkCoord::new(1, 2), &raw);
        assert_eq!(payload.decompress().unwrap(), raw);
        let broken = ChunkPayload {
            coord: payload.coord,
            data: vec![0x10, 0, 0, 0, 0xFF],
        };
        assert!(broken.decompress().is_none());
    }
}
