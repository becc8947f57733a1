//! Load-or-generate for a single chunk, shared by the synchronous path and
//! the generation workers.

use std::sync::Arc;

use strata_terrain::Pipeline;
use strata_voxel::{BlockRegistry, Chunk, ChunkCoord};

use crate::error::WorldError;
use crate::schema::ChunkSchema;
use crate::storage::Storage;

/// Where a chunk handed out by [`ChunkSource`] came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Origin {
    /// Read from storage, already populated.
    Loaded,
    /// Run through the pipeline.
    Generated,
}

/// Everything needed to produce a chunk from nothing but its coordinate.
pub struct ChunkSource {
    storage: Storage,
    schema: ChunkSchema,
    pipeline: Pipeline,
    blocks: Arc<BlockRegistry>,
    seed: u64,
    damage_threshold: usize,
}

impl ChunkSource {
    pub fn new(
        storage: Storage,
        schema: ChunkSchema,
        pipeline: Pipeline,
        blocks: Arc<BlockRegistry>,
        seed: u64,
        damage_threshold: usize,
    ) -> Self {
        Self {
            storage,
            schema,
            pipeline,
            blocks,
            seed,
            damage_threshold,
        }
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn schema(&self) -> &ChunkSchema {
        &self.schema
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Reads the chunk from storage if present, then runs the pipeline if it
    /// is not yet populated.
    ///
    /// A generated chunk comes back populated, dirty and with fresh light.
    /// Damage is always cleared since no client has seen the chunk yet.
    pub fn load_or_generate(&self, coord: ChunkCoord) -> Result<(Chunk, Origin), WorldError> {
        let coord = ChunkCoord::checked(coord.x, coord.z)?;
        let path = self.storage.chunk_path(coord);
        let mut chunk = match self.storage.read(&path)? {
            Some(root) => self
                .schema
                .load(coord, &self.blocks, &root)
                .map_err(|source| WorldError::StorageCorruption { path, source })?,
            None => Chunk::new(coord, Arc::clone(&self.blocks)),
        };
        chunk.set_damage_threshold(self.damage_threshold);

        let origin = if chunk.is_populated() {
            tracing::debug!(%coord, "loaded chunk");
            Origin::Loaded
        } else {
            self.pipeline
                .run(&mut chunk, self.seed)
                .map_err(|e| WorldError::Generation {
                    coord,
                    stage: e.stage,
                    source: e.source,
                })?;
            chunk.regenerate();
            chunk.set_populated(true);
            chunk.mark_dirty();
            tracing::debug!(%coord, "generated chunk");
            Origin::Generated
        };

        chunk.clear_damage();
        Ok((chunk, origin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_tag::{NbtFormat, TagError};
    use strata_terrain::{Stage, StageError, StageRegistry};
    use strata_voxel::ids;

    struct Broken;

    impl Stage for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        fn populate(&self, chunk: &mut Chunk, _seed: u64) -> Result<(), StageError> {
            chunk.set_block(0, 0, 0, ids::STONE)?;
            Err(StageError::Failed("no".into()))
        }
    }

    fn source(dir: &std::path::Path, pipeline: Pipeline) -> ChunkSource {
        ChunkSource::new(
            Storage::new(dir, Arc::new(NbtFormat)),
            ChunkSchema::default(),
            pipeline,
            Arc::new(BlockRegistry::with_defaults()),
            42,
            176,
        )
    }

    fn flat() -> Pipeline {
        StageRegistry::with_defaults().pipeline(&["flat"]).unwrap()
    }

    #[test]
    fn test_generates_when_absent() {
        let dir = tempfile::tempdir().unwrap();
        let (chunk, origin) = source(dir.path(), flat())
            .load_or_generate(ChunkCoord::new(1, 1))
            .unwrap();
        assert_eq!(origin, Origin::Generated);
        assert!(chunk.is_populated());
        assert!(chunk.is_dirty());
        assert!(!chunk.is_damaged());
        assert_eq!(chunk.get_block(5, 0, 5).unwrap(), ids::STONE);
        assert_eq!(chunk.skylight_at(5, 63, 5).unwrap(), 15);
    }

    #[test]
    fn test_loads_when_present() {
        let dir = tempfile::tempdir().unwrap();
        let src = source(dir.path(), flat());
        let coord = ChunkCoord::new(-2, 0);
        let (chunk, _) = src.load_or_generate(coord).unwrap();
        let path = src.storage().chunk_path(coord);
        src.storage()
            .write(&path, &src.schema().save(&chunk))
            .unwrap();

        let (again, origin) = src.load_or_generate(coord).unwrap();
        assert_eq!(origin, Origin::Loaded);
        assert!(!again.is_dirty());
        assert_eq!(again.blocks(), chunk.blocks());
    }

    #[test]
    fn test_unpopulated_file_is_generated() {
        let dir = tempfile::tempdir().unwrap();
        let src = source(dir.path(), flat());
        let coord = ChunkCoord::new(0, 0);
        let blank = Chunk::new(coord, Arc::new(BlockRegistry::with_defaults()));
        let path = src.storage().chunk_path(coord);
        src.storage().write(&path, &src.schema().save(&blank)).unwrap();

        let (chunk, origin) = src.load_or_generate(coord).unwrap();
        assert_eq!(origin, Origin::Generated);
        assert!(chunk.is_populated());
    }

    #[test]
    fn test_stage_failure() {
        let dir = tempfile::tempdir().unwrap();
        let src = source(dir.path(), Pipeline::new().with(Arc::new(Broken)));
        match src.load_or_generate(ChunkCoord::new(0, 0)) {
            Err(WorldError::Generation { stage, .. }) => assert_eq!(stage, "broken"),
            other => panic!("expected generation error, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_chunk_outside_world() {
        let dir = tempfile::tempdir().unwrap();
        let src = source(dir.path(), flat());
        assert!(matches!(
            src.load_or_generate(ChunkCoord::new(ChunkCoord::MAX_X + 1, 0)),
            Err(WorldError::Chunk(strata_voxel::ChunkError::ChunkOutOfWorld { .. }))
        ));
    }

    #[test]
    fn test_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let src = source(dir.path(), flat());
        let coord = ChunkCoord::new(4, 4);
        let path = src.storage().chunk_path(coord);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"\x1f\x8bgarbage").unwrap();
        assert!(matches!(
            src.load_or_generate(coord),
            Err(WorldError::StorageCorruption { .. })
        ));

        let mut wrong = strata_tag::Compound::new();
        wrong.insert("Level", strata_tag::Compound::new());
        src.storage().write(&path, &wrong).unwrap();
        match src.load_or_generate(coord) {
            Err(WorldError::StorageCorruption { source, .. }) => {
                assert!(matches!(source, TagError::Missing(_)))
            }
            other => panic!("expected corruption, got {other:?}"),
        }
    }
}
