//! The chunk: one `16 x 128 x 16` column of blocks with its derived tables.
//!
//! [`Chunk`] keeps the heightmap exact after every mutation, composites block
//! light around newly placed emitters, and records which voxels changed since
//! the last client sync. Full light recomputation only happens through
//! [`Chunk::regenerate`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use strata_lighting::{
    LightVolume, block_light, column_height, composite_glow, heightmap, sky_light,
};

use crate::coords::{
    CHUNK_COLUMNS, CHUNK_VOLUME, CHUNK_X, CHUNK_Y, CHUNK_Z, ChunkCoord, LocalPos, column_index,
    voxel_index,
};
use crate::damage::{ChunkPayload, Damage, DamagePacket};
use crate::error::ChunkError;
use crate::nibble;
use crate::registry::{BlockRegistry, ids};
use crate::tile_entity::TileEntity;

/// Raw arrays for rebuilding a chunk from storage.
///
/// All per-voxel arrays hold one value per entry in voxel index order.
#[derive(Clone, Debug, Default)]
pub struct ChunkParts {
    pub blocks: Vec<u8>,
    pub metadata: Vec<u8>,
    pub skylight: Vec<u8>,
    pub blocklight: Vec<u8>,
    pub populated: bool,
}

/// A column of voxels with metadata, light, height and damage state.
pub struct Chunk {
    coord: ChunkCoord,
    registry: Arc<BlockRegistry>,
    blocks: Vec<u8>,
    metadata: Vec<u8>,
    heightmap: Vec<u8>,
    skylight: LightVolume,
    blocklight: LightVolume,
    tile_entities: BTreeMap<LocalPos, Box<dyn TileEntity>>,
    populated: bool,
    dirty: bool,
    damage: Damage,
}

fn check_len(what: &'static str, len: usize, expected: usize) -> Result<(), ChunkError> {
    if len != expected {
        return Err(ChunkError::Length {
            what,
            len,
            expected,
        });
    }
    Ok(())
}

fn dark() -> LightVolume {
    LightVolume::new(CHUNK_X, CHUNK_Y, CHUNK_Z)
}

impl Chunk {
    /// An empty, unpopulated chunk full of air.
    pub fn new(coord: ChunkCoord, registry: Arc<BlockRegistry>) -> Self {
        Self {
            coord,
            registry,
            blocks: vec![ids::AIR; CHUNK_VOLUME],
            metadata: vec![0; CHUNK_VOLUME],
            heightmap: vec![0; CHUNK_COLUMNS],
            skylight: dark(),
            blocklight: dark(),
            tile_entities: BTreeMap::new(),
            populated: false,
            dirty: false,
            damage: Damage::default(),
        }
    }

    /// Rebuilds a chunk from stored arrays. The heightmap is recomputed from
    /// the blocks; the chunk starts clean and undamaged.
    pub fn from_parts(
        coord: ChunkCoord,
        registry: Arc<BlockRegistry>,
        parts: ChunkParts,
    ) -> Result<Self, ChunkError> {
        check_len("blocks", parts.blocks.len(), CHUNK_VOLUME)?;
        check_len("metadata", parts.metadata.len(), CHUNK_VOLUME)?;
        let to_volume = |what: &'static str, data: Vec<u8>| {
            let len = data.len();
            LightVolume::from_vec(CHUNK_X, CHUNK_Y, CHUNK_Z, data).ok_or(ChunkError::Length {
                what,
                len,
                expected: CHUNK_VOLUME,
            })
        };
        let skylight = to_volume("skylight", parts.skylight)?;
        let blocklight = to_volume("blocklight", parts.blocklight)?;

        let mut metadata = parts.metadata;
        for m in &mut metadata {
            *m &= 0x0F;
        }

        Ok(Self {
            coord,
            registry,
            heightmap: heightmap(&parts.blocks, CHUNK_X, CHUNK_Y, CHUNK_Z),
            blocks: parts.blocks,
            metadata,
            skylight,
            blocklight,
            tile_entities: BTreeMap::new(),
            populated: parts.populated,
            dirty: false,
            damage: Damage::default(),
        })
    }

    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    pub fn registry(&self) -> &Arc<BlockRegistry> {
        &self.registry
    }

    // -----------------------------------------------------------------------
    // Blocks and metadata
    // -----------------------------------------------------------------------

    pub fn get_block(&self, x: usize, y: usize, z: usize) -> Result<u8, ChunkError> {
        let pos = LocalPos::new(x, y, z)?;
        Ok(self.blocks[pos.index()])
    }

    /// Places `block` at `(x, y, z)`.
    ///
    /// Returns `Ok(false)` without side effects when the voxel already holds
    /// `block`. Otherwise the column height is rescanned, block light is
    /// composited around the voxel if `block` glows, and the chunk becomes
    /// dirty and damaged at that position.
    pub fn set_block(
        &mut self,
        x: usize,
        y: usize,
        z: usize,
        block: u8,
    ) -> Result<bool, ChunkError> {
        let pos = LocalPos::new(x, y, z)?;
        let i = pos.index();
        if self.blocks[i] == block {
            return Ok(false);
        }
        self.blocks[i] = block;
        self.refresh_height(x, z);

        let glow = self.registry.glow(block);
        if glow > 0 {
            composite_glow(&mut self.blocklight, glow, x, y, z);
        }

        self.dirty = true;
        self.damage.mark(pos);
        Ok(true)
    }

    pub fn get_metadata(&self, x: usize, y: usize, z: usize) -> Result<u8, ChunkError> {
        let pos = LocalPos::new(x, y, z)?;
        Ok(self.metadata[pos.index()])
    }

    /// Stores the low four bits of `value`. Same contract as
    /// [`Chunk::set_block`] without the height and light side effects.
    pub fn set_metadata(
        &mut self,
        x: usize,
        y: usize,
        z: usize,
        value: u8,
    ) -> Result<bool, ChunkError> {
        let pos = LocalPos::new(x, y, z)?;
        let i = pos.index();
        let value = value & 0x0F;
        if self.metadata[i] == value {
            return Ok(false);
        }
        self.metadata[i] = value;
        self.dirty = true;
        self.damage.mark(pos);
        Ok(true)
    }

    /// The 128 block ids of column `(x, z)`, bottom first.
    pub fn get_column(&self, x: usize, z: usize) -> Result<&[u8], ChunkError> {
        LocalPos::new(x, 0, z)?;
        let start = voxel_index(x, 0, z);
        Ok(&self.blocks[start..start + CHUNK_Y])
    }

    /// Replaces column `(x, z)` and damages all of its voxels.
    pub fn set_column(&mut self, x: usize, z: usize, column: &[u8]) -> Result<(), ChunkError> {
        check_len("column", column.len(), CHUNK_Y)?;
        self.edit_column(x, z, |dst| dst.copy_from_slice(column))?;
        for y in 0..CHUNK_Y {
            self.damage.mark(LocalPos::new(x, y, z)?);
        }
        Ok(())
    }

    /// Hands column `(x, z)` to `edit` and rescans its height afterwards.
    ///
    /// Marks the chunk dirty but records no damage and touches no light,
    /// which is what generation stages want.
    pub fn edit_column(
        &mut self,
        x: usize,
        z: usize,
        edit: impl FnOnce(&mut [u8]),
    ) -> Result<(), ChunkError> {
        LocalPos::new(x, 0, z)?;
        let start = voxel_index(x, 0, z);
        edit(&mut self.blocks[start..start + CHUNK_Y]);
        self.refresh_height(x, z);
        self.dirty = true;
        Ok(())
    }

    /// Replaces every `search` voxel with `replace`. Returns how many voxels
    /// changed; any change damages the whole chunk.
    pub fn sed(&mut self, search: u8, replace: u8) -> usize {
        if search == replace {
            return 0;
        }
        let mut changed = 0;
        for b in self.blocks.iter_mut().filter(|b| **b == search) {
            *b = replace;
            changed += 1;
        }
        if changed > 0 {
            if search == ids::AIR || replace == ids::AIR {
                self.regenerate_heightmap();
            }
            self.dirty = true;
            self.damage.mark_all();
        }
        changed
    }

    /// Sets `(x, y, z)` to air and drops any tile entity there.
    pub fn destroy(&mut self, x: usize, y: usize, z: usize) -> Result<(), ChunkError> {
        self.set_block(x, y, z, ids::AIR)?;
        self.remove_tile_entity(x, y, z)?;
        Ok(())
    }

    fn refresh_height(&mut self, x: usize, z: usize) {
        let start = voxel_index(x, 0, z);
        self.heightmap[column_index(x, z)] = column_height(&self.blocks[start..start + CHUNK_Y]);
    }

    // -----------------------------------------------------------------------
    // Derived tables
    // -----------------------------------------------------------------------

    /// Recomputes heightmap, block light and sky light from the blocks.
    pub fn regenerate(&mut self) {
        self.regenerate_heightmap();
        self.regenerate_blocklight();
        self.regenerate_skylight();
    }

    pub fn regenerate_heightmap(&mut self) {
        self.heightmap = heightmap(&self.blocks, CHUNK_X, CHUNK_Y, CHUNK_Z);
    }

    pub fn regenerate_blocklight(&mut self) {
        let registry = &self.registry;
        self.blocklight = block_light(&self.blocks, CHUNK_X, CHUNK_Y, CHUNK_Z, |id| {
            registry.glow(id)
        });
    }

    /// Uses the current heightmap.
    pub fn regenerate_skylight(&mut self) {
        self.skylight = sky_light(&self.heightmap, CHUNK_X, CHUNK_Y, CHUNK_Z);
    }

    pub fn height_at(&self, x: usize, z: usize) -> Result<u8, ChunkError> {
        LocalPos::new(x, 0, z)?;
        Ok(self.heightmap[column_index(x, z)])
    }

    pub fn skylight_at(&self, x: usize, y: usize, z: usize) -> Result<u8, ChunkError> {
        LocalPos::new(x, y, z)?;
        Ok(self.skylight.get(x, y, z))
    }

    pub fn blocklight_at(&self, x: usize, y: usize, z: usize) -> Result<u8, ChunkError> {
        LocalPos::new(x, y, z)?;
        Ok(self.blocklight.get(x, y, z))
    }

    pub fn blocks(&self) -> &[u8] {
        &self.blocks
    }

    pub fn metadata(&self) -> &[u8] {
        &self.metadata
    }

    /// Column heights indexed `x * 16 + z`.
    pub fn heightmap(&self) -> &[u8] {
        &self.heightmap
    }

    pub fn skylight(&self) -> &LightVolume {
        &self.skylight
    }

    pub fn blocklight(&self) -> &LightVolume {
        &self.blocklight
    }

    // -----------------------------------------------------------------------
    // Tile entities
    // -----------------------------------------------------------------------

    pub fn tile_entity(
        &self,
        x: usize,
        y: usize,
        z: usize,
    ) -> Result<Option<&dyn TileEntity>, ChunkError> {
        let pos = LocalPos::new(x, y, z)?;
        Ok(self.tile_entities.get(&pos).map(|te| te.as_ref()))
    }

    pub fn tile_entity_mut(
        &mut self,
        x: usize,
        y: usize,
        z: usize,
    ) -> Result<Option<&mut dyn TileEntity>, ChunkError> {
        let pos = LocalPos::new(x, y, z)?;
        Ok(self.tile_entities.get_mut(&pos).map(|te| te.as_mut()))
    }

    /// Attaches `entity` at `(x, y, z)`, replacing any previous one.
    pub fn set_tile_entity(
        &mut self,
        x: usize,
        y: usize,
        z: usize,
        entity: Box<dyn TileEntity>,
    ) -> Result<Option<Box<dyn TileEntity>>, ChunkError> {
        let pos = LocalPos::new(x, y, z)?;
        self.dirty = true;
        Ok(self.tile_entities.insert(pos, entity))
    }

    pub fn remove_tile_entity(
        &mut self,
        x: usize,
        y: usize,
        z: usize,
    ) -> Result<Option<Box<dyn TileEntity>>, ChunkError> {
        let pos = LocalPos::new(x, y, z)?;
        let removed = self.tile_entities.remove(&pos);
        if removed.is_some() {
            self.dirty = true;
        }
        Ok(removed)
    }

    /// Tile entities in position order.
    pub fn tile_entities(&self) -> impl Iterator<Item = (LocalPos, &dyn TileEntity)> {
        self.tile_entities.iter().map(|(pos, te)| (*pos, te.as_ref()))
    }

    // -----------------------------------------------------------------------
    // Lifecycle flags
    // -----------------------------------------------------------------------

    pub fn is_populated(&self) -> bool {
        self.populated
    }

    pub fn set_populated(&mut self, populated: bool) {
        self.populated = populated;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Called once the chunk's current state has been persisted.
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    // -----------------------------------------------------------------------
    // Damage
    // -----------------------------------------------------------------------

    /// Records `(x, y, z)` as changed since the last client sync.
    pub fn damage(&mut self, x: usize, y: usize, z: usize) -> Result<(), ChunkError> {
        self.damage.mark(LocalPos::new(x, y, z)?);
        Ok(())
    }

    pub fn is_damaged(&self) -> bool {
        self.damage.is_damaged()
    }

    /// Builds the update a client needs. Callers clear the damage with
    /// [`Chunk::clear_damage`] once the packet has been sent.
    pub fn get_damage_packet(&self) -> Option<DamagePacket> {
        if !self.damage.is_damaged() {
            return None;
        }
        if self.damage.is_all() {
            return Some(DamagePacket::Full(self.encode_full()));
        }
        let positions = self.damage.positions();
        if let [pos] = positions {
            return Some(DamagePacket::Single {
                x: self.coord.base_x() + pos.x() as i32,
                y: pos.y() as i32,
                z: self.coord.base_z() + pos.z() as i32,
                block: self.blocks[pos.index()],
                metadata: self.metadata[pos.index()],
            });
        }
        Some(DamagePacket::Batch {
            coord: self.coord,
            coords: positions.iter().map(LocalPos::packed).collect(),
            blocks: positions.iter().map(|p| self.blocks[p.index()]).collect(),
            metadata: positions.iter().map(|p| self.metadata[p.index()]).collect(),
        })
    }

    pub fn clear_damage(&mut self) {
        self.damage.clear();
    }

    pub fn damage_threshold(&self) -> usize {
        self.damage.threshold()
    }

    pub fn set_damage_threshold(&mut self, threshold: usize) {
        self.damage.set_threshold(threshold);
    }

    /// Compressed blocks, metadata, block light and sky light.
    pub fn encode_full(&self) -> ChunkPayload {
        let mut raw = Vec::with_capacity(CHUNK_VOLUME * 5 / 2);
        raw.extend_from_slice(&self.blocks);
        raw.extend(nibble::pack(&self.metadata));
        raw.extend(nibble::pack(self.blocklight.as_slice()));
        raw.extend(nibble::pack(self.skylight.as_slice()));
        ChunkPayload::compress(self.coord, &raw)
    }
}

impl fmt::Debug for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chunk")
            .field("coord", &self.coord)
            .field("populated", &self.populated)
            .field("dirty", &self.dirty)
            .field("damage", &self.damage)
            .field("tile_entities", &self.tile_entities.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ids::{STONE, TORCH};
    use crate::tile_entity::Sign;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn chunk() -> Chunk {
        Chunk::new(ChunkCoord::new(2, -1), Arc::new(BlockRegistry::with_defaults()))
    }

    fn flat_chunk() -> Chunk {
        let mut c = chunk();
        for x in 0..CHUNK_X {
            for z in 0..CHUNK_Z {
                c.edit_column(x, z, |col| col[..64].fill(STONE)).unwrap();
            }
        }
        c
    }

    fn brute_height(c: &Chunk, x: usize, z: usize) -> u8 {
        (0..CHUNK_Y)
            .rev()
            .find(|&y| c.get_block(x, y, z).unwrap() != ids::AIR)
            .unwrap_or(0) as u8
    }

    #[test]
    fn test_out_of_range() {
        let mut c = chunk();
        assert_eq!(
            c.get_block(16, 0, 0),
            Err(ChunkError::OutOfRange { x: 16, y: 0, z: 0 })
        );
        assert!(c.set_block(0, 128, 0, STONE).is_err());
        assert!(c.set_metadata(0, 0, 99, 1).is_err());
        assert!(c.get_column(0, 16).is_err());
        assert!(c.damage(20, 0, 0).is_err());
    }

    #[test]
    fn test_set_block_unchanged_is_noop() {
        let mut c = chunk();
        assert!(!c.set_block(1, 1, 1, ids::AIR).unwrap());
        assert!(!c.is_dirty());
        assert!(!c.is_damaged());
        assert!(c.set_block(1, 1, 1, STONE).unwrap());
        assert!(c.is_dirty());
        assert!(c.is_damaged());
    }

    #[test]
    fn test_heightmap_tracks_every_edit() {
        let mut rng = ChaCha8Rng::seed_from_u64(0x5eed);
        let mut c = chunk();
        for _ in 0..4000 {
            let x = rng.random_range(0..CHUNK_X);
            let y = rng.random_range(0..CHUNK_Y);
            let z = rng.random_range(0..CHUNK_Z);
            let block = if rng.random_bool(0.4) { ids::AIR } else { STONE };
            c.set_block(x, y, z, block).unwrap();
            assert_eq!(c.height_at(x, z).unwrap(), brute_height(&c, x, z));
        }
    }

    #[test]
    fn test_flat_generation() {
        let c = flat_chunk();
        assert_eq!(c.get_block(5, 0, 5).unwrap(), STONE);
        assert_eq!(c.get_block(5, 63, 5).unwrap(), STONE);
        assert_eq!(c.get_block(5, 70, 5).unwrap(), ids::AIR);
        assert!(c.heightmap().iter().all(|&h| h == 63));
    }

    #[test]
    fn test_flat_skylight() {
        let mut c = flat_chunk();
        c.regenerate();
        for x in 0..CHUNK_X {
            for z in 0..CHUNK_Z {
                assert_eq!(c.skylight_at(x, 63, z).unwrap(), 15);
                assert_eq!(c.skylight_at(x, 64, z).unwrap(), 15);
                // Fourteen steps below the surface the kernel has run out.
                assert_eq!(c.skylight_at(x, 48, z).unwrap(), 0);
                assert_eq!(c.skylight_at(x, 0, z).unwrap(), 0);
            }
        }
    }

    #[test]
    fn test_torch_composites_block_light() {
        let mut c = chunk();
        c.set_block(8, 60, 8, TORCH).unwrap();
        assert_eq!(c.blocklight_at(8, 60, 8).unwrap(), 15);
        assert_eq!(c.blocklight_at(8, 61, 8).unwrap(), 14);
        assert_eq!(c.blocklight_at(10, 60, 9).unwrap(), 12);
        assert_eq!(c.blocklight_at(0, 0, 0).unwrap(), 0);

        let mut regenerated = chunk();
        regenerated.set_block(8, 60, 8, TORCH).unwrap();
        regenerated.regenerate_blocklight();
        assert_eq!(regenerated.blocklight(), c.blocklight());
    }

    #[test]
    fn test_set_column_damages_whole_strip() {
        let mut c = chunk();
        let mut column = vec![ids::AIR; CHUNK_Y];
        column[..10].fill(STONE);
        c.set_column(3, 4, &column).unwrap();
        assert_eq!(c.get_column(3, 4).unwrap(), column.as_slice());
        assert_eq!(c.height_at(3, 4).unwrap(), 9);
        assert!(c.is_dirty());
        match c.get_damage_packet() {
            Some(DamagePacket::Batch { coords, .. }) => assert_eq!(coords.len(), CHUNK_Y),
            other => panic!("expected batch, got {other:?}"),
        }
        assert!(matches!(
            c.set_column(0, 0, &[STONE; 5]),
            Err(ChunkError::Length { len: 5, .. })
        ));
    }

    #[test]
    fn test_sed_damages_everything() {
        let mut c = flat_chunk();
        assert_eq!(c.sed(STONE, ids::DIRT), 64 * CHUNK_COLUMNS);
        assert_eq!(c.get_block(0, 0, 0).unwrap(), ids::DIRT);
        assert!(matches!(c.get_damage_packet(), Some(DamagePacket::Full(_))));

        let mut clean = chunk();
        assert_eq!(clean.sed(STONE, ids::DIRT), 0);
        assert!(!clean.is_damaged());
        assert!(!clean.is_dirty());

        assert_eq!(c.sed(ids::DIRT, ids::AIR), 64 * CHUNK_COLUMNS);
        assert!(c.heightmap().iter().all(|&h| h == 0));
    }

    #[test]
    fn test_damage_threshold_collapses() {
        let mut c = chunk();
        let mut n = 0;
        'outer: for x in 0..CHUNK_X {
            for z in 0..CHUNK_Z {
                if n == 176 {
                    break 'outer;
                }
                c.set_block(x, 0, z, STONE).unwrap();
                n += 1;
            }
        }
        assert!(matches!(
            c.get_damage_packet(),
            Some(DamagePacket::Batch { ref coords, .. }) if coords.len() == 176
        ));

        c.set_block(0, 5, 0, STONE).unwrap();
        assert!(matches!(c.get_damage_packet(), Some(DamagePacket::Full(_))));
        c.damage(1, 1, 1).unwrap();
        assert!(matches!(c.get_damage_packet(), Some(DamagePacket::Full(_))));
    }

    #[test]
    fn test_clear_damage_is_idempotent() {
        let mut c = chunk();
        c.set_block(0, 0, 0, STONE).unwrap();
        c.clear_damage();
        assert!(!c.is_damaged());
        assert!(c.get_damage_packet().is_none());
        c.clear_damage();
        assert!(!c.is_damaged());
        assert!(c.get_damage_packet().is_none());
    }

    #[test]
    fn test_single_damage_packet_uses_world_coords() {
        let mut c = chunk();
        c.set_block(1, 70, 3, STONE).unwrap();
        c.set_metadata(1, 70, 3, 0x1A).unwrap();
        assert_eq!(
            c.get_damage_packet(),
            Some(DamagePacket::Single {
                x: 33,
                y: 70,
                z: -13,
                block: STONE,
                metadata: 0x0A,
            })
        );
    }

    #[test]
    fn test_batch_damage_in_order() {
        let mut c = chunk();
        c.set_block(1, 0, 1, STONE).unwrap();
        c.set_block(2, 0, 2, ids::DIRT).unwrap();
        c.set_metadata(2, 0, 2, 5).unwrap();
        let packet = c.get_damage_packet().unwrap();
        assert_eq!(packet.count(), 2);
        assert_eq!(
            packet,
            DamagePacket::Batch {
                coord: ChunkCoord::new(2, -1),
                coords: vec![0x1100, 0x2200],
                blocks: vec![STONE, ids::DIRT],
                metadata: vec![0, 5],
            }
        );
    }

    #[test]
    fn test_full_packet_layout() {
        let mut c = flat_chunk();
        c.regenerate();
        c.set_metadata(0, 1, 0, 9).unwrap();
        let raw = c.encode_full().decompress().unwrap();
        assert_eq!(raw.len(), CHUNK_VOLUME * 5 / 2);
        assert_eq!(&raw[..CHUNK_VOLUME], c.blocks());
        let meta = nibble::unpack(&raw[CHUNK_VOLUME..], CHUNK_VOLUME).unwrap();
        assert_eq!(meta, c.metadata());
    }

    #[test]
    fn test_from_parts_round_trip() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut c = chunk();
        for _ in 0..500 {
            let (x, y, z) = (
                rng.random_range(0..CHUNK_X),
                rng.random_range(0..CHUNK_Y),
                rng.random_range(0..CHUNK_Z),
            );
            c.set_block(x, y, z, rng.random_range(0..=255)).unwrap();
            c.set_metadata(x, y, z, rng.random_range(0..16)).unwrap();
        }
        c.regenerate();
        let parts = ChunkParts {
            blocks: c.blocks().to_vec(),
            metadata: c.metadata().to_vec(),
            skylight: c.skylight().as_slice().to_vec(),
            blocklight: c.blocklight().as_slice().to_vec(),
            populated: true,
        };
        let back = Chunk::from_parts(c.coord(), c.registry().clone(), parts).unwrap();
        assert_eq!(back.blocks(), c.blocks());
        assert_eq!(back.metadata(), c.metadata());
        assert_eq!(back.heightmap(), c.heightmap());
        assert_eq!(back.skylight(), c.skylight());
        assert_eq!(back.blocklight(), c.blocklight());
        assert!(back.is_populated());
        assert!(!back.is_dirty());
    }

    #[test]
    fn test_from_parts_rejects_short_arrays() {
        let parts = ChunkParts {
            blocks: vec![0; 10],
            ..ChunkParts::default()
        };
        let registry = Arc::new(BlockRegistry::with_defaults());
        assert!(matches!(
            Chunk::from_parts(ChunkCoord::new(0, 0), registry, parts),
            Err(ChunkError::Length { what: "blocks", .. })
        ));
    }

    #[test]
    fn test_tile_entities_and_destroy() {
        let mut c = chunk();
        c.set_block(4, 65, 4, ids::SIGN_POST).unwrap();
        c.set_tile_entity(4, 65, 4, Box::new(Sign::default())).unwrap();
        assert_eq!(c.tile_entity(4, 65, 4).unwrap().unwrap().id(), "Sign");

        c.tile_entity_mut(4, 65, 4)
            .unwrap()
            .and_then(|te| te.downcast_mut::<Sign>())
            .unwrap()
            .lines[0] = "hi".into();
        let sign = c.tile_entity(4, 65, 4).unwrap().unwrap();
        assert_eq!(sign.downcast_ref::<Sign>().unwrap().lines[0], "hi");

        c.destroy(4, 65, 4).unwrap();
        assert_eq!(c.get_block(4, 65, 4).unwrap(), ids::AIR);
        assert!(c.tile_entity(4, 65, 4).unwrap().is_none());
        assert_eq!(c.tile_entities().count(), 0);
    }
}
