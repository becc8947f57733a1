//! Conversion between chunks and their persisted tag trees.
//!
//! ```text
//! Level
//!   xPos, zPos        Int
//!   Blocks            ByteArray, one id per voxel
//!   Data              ByteArray, nibble-packed metadata
//!   SkyLight          ByteArray, nibble-packed
//!   BlockLight        ByteArray, nibble-packed
//!   HeightMap         ByteArray, one byte per column
//!   TerrainPopulated  Byte
//!   TileEntities      List of records with id, x, y, z
//! ```

use std::sync::Arc;

use strata_tag::{Compound, Tag, TagError};
use strata_voxel::{
    BlockRegistry, CHUNK_VOLUME, Chunk, ChunkCoord, ChunkParts, TileEntityRegistry, nibble,
    save_record,
};

/// Saves and loads chunks, resolving tile entities through a registry.
#[derive(Clone, Debug)]
pub struct ChunkSchema {
    tile_entities: TileEntityRegistry,
}

impl ChunkSchema {
    pub fn new(tile_entities: TileEntityRegistry) -> Self {
        Self { tile_entities }
    }

    pub fn save(&self, chunk: &Chunk) -> Compound {
        let coord = chunk.coord();
        let tile_entities = chunk
            .tile_entities()
            .map(|(pos, te)| {
                Tag::Compound(save_record(
                    te,
                    coord.base_x() + pos.x() as i32,
                    pos.y() as i32,
                    coord.base_z() + pos.z() as i32,
                ))
            })
            .collect();

        let mut level = Compound::new();
        level
            .insert("xPos", Tag::Int(coord.x))
            .insert("zPos", Tag::Int(coord.z))
            .insert("Blocks", Tag::ByteArray(chunk.blocks().to_vec()))
            .insert("Data", Tag::ByteArray(nibble::pack(chunk.metadata())))
            .insert(
                "SkyLight",
                Tag::ByteArray(nibble::pack(chunk.skylight().as_slice())),
            )
            .insert(
                "BlockLight",
                Tag::ByteArray(nibble::pack(chunk.blocklight().as_slice())),
            )
            .insert("HeightMap", Tag::ByteArray(chunk.heightmap().to_vec()))
            .insert("TerrainPopulated", Tag::Byte(chunk.is_populated() as i8))
            .insert("TileEntities", Tag::List(tile_entities));

        let mut root = Compound::new();
        root.insert("Level", level);
        root
    }

    /// Rebuilds the chunk at `coord`.
    ///
    /// Tile entities with an unknown `id` or a position outside the chunk are
    /// skipped with a warning; anything else malformed fails the whole load.
    pub fn load(
        &self,
        coord: ChunkCoord,
        blocks: &Arc<BlockRegistry>,
        root: &Compound,
    ) -> Result<Chunk, TagError> {
        let level = root.compound("Level")?;
        let (x, z) = (level.int("xPos")?, level.int("zPos")?);
        if (x, z) != (coord.x, coord.z) {
            return Err(TagError::Malformed(format!(
                "file holds chunk ({x}, {z}), expected {coord}"
            )));
        }

        let unpack = |name: &str| {
            nibble::unpack(level.byte_array(name)?, CHUNK_VOLUME)
                .ok_or_else(|| TagError::Malformed(format!("`{name}` is too short")))
        };
        let parts = ChunkParts {
            blocks: level.byte_array("Blocks")?.to_vec(),
            metadata: unpack("Data")?,
            skylight: unpack("SkyLight")?,
            blocklight: unpack("BlockLight")?,
            populated: level.flag("TerrainPopulated")?,
        };
        let mut chunk = Chunk::from_parts(coord, Arc::clone(blocks), parts)
            .map_err(|e| TagError::Malformed(e.to_string()))?;

        let records = match level.get("TileEntities") {
            Some(Tag::List(records)) => records.as_slice(),
            Some(_) => return Err(TagError::Malformed("`TileEntities` is not a list".into())),
            None => &[],
        };
        for record in records {
            let Tag::Compound(record) = record else {
                return Err(TagError::Malformed("tile entity is not a compound".into()));
            };
            let Some(entity) = self.tile_entities.load(record)? else {
                tracing::warn!(
                    id = record.string("id")?,
                    %coord,
                    "skipping unknown tile entity"
                );
                continue;
            };
            let lx = record.int("x")? - coord.base_x();
            let ly = record.int("y")?;
            let lz = record.int("z")? - coord.base_z();
            let placed = usize::try_from(lx)
                .ok()
                .zip(usize::try_from(ly).ok())
                .zip(usize::try_from(lz).ok())
                .map(|((x, y), z)| chunk.set_tile_entity(x, y, z, entity));
            if !matches!(placed, Some(Ok(_))) {
                tracing::warn!(
                    id = record.string("id")?,
                    %coord,
                    "skipping tile entity outside its chunk"
                );
            }
        }
        chunk.mark_clean();
        Ok(chunk)
    }
}

impl Default for ChunkSchema {
    fn default() -> Self {
        Self::new(TileEntityRegistry::with_defaults())
    }
}
