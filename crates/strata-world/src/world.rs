//! The world: every chunk the server knows about, split across two cache tiers.
//!
//! Clean chunks live in the soft tier, an LRU that may drop them once nobody
//! else holds a reference. Dirty chunks are pinned in the hard tier until a
//! flush writes them back. Generation runs on a [`GenerationPool`]; requests
//! for a coordinate that is already being produced join the existing job
//! through the pending table.

use std::collections::hash_map::Entry;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Sender, bounded};
use lru::LruCache;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use strata_config::{Config, StorageFormat};
use strata_tag::{JsonFormat, NbtFormat, TagFormat};
use strata_terrain::{Pipeline, StageRegistry};
use strata_voxel::{
    BlockRegistry, Chunk, ChunkCoord, DEFAULT_DAMAGE_THRESHOLD, TileEntityRegistry, split_world,
};

use crate::error::WorldError;
use crate::generation::{GenerationPool, JobOutcome};
use crate::level::Level;
use crate::player::{Player, valid_username};
use crate::request::{ChunkRequest, Delivery};
use crate::schema::ChunkSchema;
use crate::source::{ChunkSource, Origin};
use crate::storage::Storage;

/// A cached chunk. The world and any number of callers share it.
pub type SharedChunk = Arc<RwLock<Chunk>>;

/// Cache occupancy and lifetime counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub soft: usize,
    pub hard: usize,
    pub pending: usize,
    pub generated: u64,
    pub loaded: u64,
    pub flushed: u64,
}

/// What one [`World::sort_chunks`] pass did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SortReport {
    pub flushed: usize,
    pub remaining_dirty: usize,
    pub evicted: usize,
    pub soft: usize,
    pub hard: usize,
}

struct Pinned {
    chunk: SharedChunk,
    since: u64,
}

pub struct World {
    source: Arc<ChunkSource>,
    pool: GenerationPool,
    soft: LruCache<ChunkCoord, SharedChunk>,
    hard: FxHashMap<ChunkCoord, Pinned>,
    pending: FxHashMap<ChunkCoord, Vec<Sender<Delivery>>>,
    level: Level,
    saving: bool,
    soft_capacity: usize,
    flushes_per_sweep: usize,
    seq: u64,
    generated: u64,
    loaded: u64,
    flushed: u64,
}

impl World {
    /// Starts configuring a world rooted at `directory`.
    pub fn builder(directory: impl Into<PathBuf>) -> WorldBuilder {
        WorldBuilder::new(directory)
    }

    /// Opens the world described by `config`, creating the level file if the
    /// directory is new.
    pub fn open(config: &Config) -> Result<Self, WorldError> {
        let format: Arc<dyn TagFormat> = match config.world.format {
            StorageFormat::Nbt => Arc::new(NbtFormat),
            StorageFormat::Json => Arc::new(JsonFormat),
        };
        let pipeline = StageRegistry::with_defaults()
            .pipeline(config.world.pipeline.as_slice())
            .map_err(WorldError::Pipeline)?;

        let mut builder = WorldBuilder::new(&config.world.directory)
            .format(format)
            .pipeline(pipeline)
            .soft_capacity(config.cache.soft_capacity)
            .damage_threshold(config.cache.damage_threshold)
            .flushes_per_sweep(config.cache.flushes_per_sweep)
            .workers(config.generation.effective_workers())
            .queue_capacity(config.generation.queue_capacity);
        if let Some(seed) = config.world.seed {
            builder = builder.seed(seed);
        }
        builder.build()
    }

    /// The file layout and encoding backing this world.
    pub fn storage(&self) -> &Storage {
        self.source.storage()
    }

    // -- chunk access -------------------------------------------------------

    /// The cached chunk at `coord`, if any. Touches the soft tier's LRU order.
    pub fn cached(&mut self, coord: ChunkCoord) -> Option<SharedChunk> {
        if let Some(pinned) = self.hard.get(&coord) {
            return Some(Arc::clone(&pinned.chunk));
        }
        self.soft.get(&coord).map(Arc::clone)
    }

    /// Returns the chunk at `(x, z)`, loading or generating it on the calling
    /// thread on a miss.
    ///
    /// If a worker is already producing the chunk this waits for that job
    /// instead of starting another one.
    pub fn load_chunk(&mut self, x: i32, z: i32) -> Result<SharedChunk, WorldError> {
        let coord = ChunkCoord::checked(x, z)?;
        if let Some(chunk) = self.cached(coord) {
            return Ok(chunk);
        }
        if let Some(waiters) = self.pending.get_mut(&coord) {
            let (tx, rx) = bounded(1);
            waiters.push(tx);
            return ChunkRequest::Waiting { coord, rx }.wait_pumping(self);
        }
        let (chunk, origin) = self.source.load_or_generate(coord)?;
        Ok(self.insert(chunk, origin))
    }

    /// Asks for the chunk at `(x, z)` without blocking.
    ///
    /// Cached chunks resolve immediately. Otherwise the request joins the job
    /// already running for the coordinate, or queues a new one. Results are
    /// delivered by [`World::pump`].
    pub fn request_chunk(&mut self, x: i32, z: i32) -> ChunkRequest {
        let coord = match ChunkCoord::checked(x, z) {
            Ok(coord) => coord,
            Err(e) => return ChunkRequest::Ready(Some(Err(e.into()))),
        };
        if let Some(chunk) = self.cached(coord) {
            return ChunkRequest::ready(chunk);
        }
        let (tx, rx) = bounded(1);
        match self.pending.entry(coord) {
            Entry::Occupied(mut waiters) => waiters.get_mut().push(tx),
            Entry::Vacant(slot) => {
                if let Err(e) = self.pool.submit(coord) {
                    return ChunkRequest::Ready(Some(Err(e)));
                }
                slot.insert(vec![tx]);
            }
        }
        ChunkRequest::Waiting { coord, rx }
    }

    /// Moves finished jobs into the cache and wakes their waiters.
    pub fn pump(&mut self) -> usize {
        let mut delivered = 0;
        while let Some(outcome) = self.pool.try_recv() {
            self.deliver(outcome);
            delivered += 1;
        }
        delivered
    }

    /// Like [`World::pump`] but waits up to `timeout` for the first result.
    pub fn pump_wait(&mut self, timeout: Duration) -> Result<usize, WorldError> {
        match self.pool.recv_timeout(timeout)? {
            Some(outcome) => {
                self.deliver(outcome);
                Ok(1 + self.pump())
            }
            None => Ok(0),
        }
    }

    fn deliver(&mut self, outcome: JobOutcome) {
        let JobOutcome { coord, result } = outcome;
        let waiters = self.pending.remove(&coord).unwrap_or_default();
        match result {
            Ok((chunk, origin)) => {
                let shared = match self.cached(coord) {
                    Some(existing) => existing,
                    None => self.insert(chunk, origin),
                };
                for tx in waiters {
                    let _ = tx.send(Ok(Arc::clone(&shared)));
                }
            }
            Err(e) => {
                tracing::warn!(%coord, error = %e, "chunk job failed");
                let e = Arc::new(e);
                for tx in waiters {
                    let _ = tx.send(Err(Arc::clone(&e)));
                }
            }
        }
    }

    fn insert(&mut self, chunk: Chunk, origin: Origin) -> SharedChunk {
        match origin {
            Origin::Generated => self.generated += 1,
            Origin::Loaded => self.loaded += 1,
        }
        let coord = chunk.coord();
        let dirty = chunk.is_dirty();
        let shared = Arc::new(RwLock::new(chunk));
        if dirty {
            self.pin(coord, Arc::clone(&shared));
        } else {
            self.soft.put(coord, Arc::clone(&shared));
        }
        shared
    }

    fn pin(&mut self, coord: ChunkCoord, chunk: SharedChunk) {
        if self.hard.contains_key(&coord) {
            return;
        }
        self.soft.pop(&coord);
        self.seq += 1;
        self.hard.insert(
            coord,
            Pinned {
                chunk,
                since: self.seq,
            },
        );
    }

    // -- world-coordinate accessors ----------------------------------------

    /// Block ID at world coordinates, loading the owning chunk if needed.
    pub fn get_block(&mut self, wx: i32, wy: i32, wz: i32) -> Result<u8, WorldError> {
        let (coord, pos) = split_world(wx, wy, wz)?;
        let chunk = self.load_chunk(coord.x, coord.z)?;
        let block = chunk.read().get_block(pos.x(), pos.y(), pos.z())?;
        Ok(block)
    }

    /// Places a block at world coordinates. A change pins the chunk until the
    /// next flush.
    pub fn set_block(&mut self, wx: i32, wy: i32, wz: i32, block: u8) -> Result<bool, WorldError> {
        let (coord, pos) = split_world(wx, wy, wz)?;
        let chunk = self.load_chunk(coord.x, coord.z)?;
        let changed = chunk.write().set_block(pos.x(), pos.y(), pos.z(), block)?;
        if changed {
            self.pin(coord, chunk);
        }
        Ok(changed)
    }

    /// The 4-bit metadata nibble at world coordinates.
    pub fn get_metadata(&mut self, wx: i32, wy: i32, wz: i32) -> Result<u8, WorldError> {
        let (coord, pos) = split_world(wx, wy, wz)?;
        let chunk = self.load_chunk(coord.x, coord.z)?;
        let value = chunk.read().get_metadata(pos.x(), pos.y(), pos.z())?;
        Ok(value)
    }

    /// Sets the metadata nibble at world coordinates. Pins the chunk on change,
    /// like [`World::set_block`].
    pub fn set_metadata(
        &mut self,
        wx: i32,
        wy: i32,
        wz: i32,
        value: u8,
    ) -> Result<bool, WorldError> {
        let (coord, pos) = split_world(wx, wy, wz)?;
        let chunk = self.load_chunk(coord.x, coord.z)?;
        let changed = chunk
            .write()
            .set_metadata(pos.x(), pos.y(), pos.z(), value)?;
        if changed {
            self.pin(coord, chunk);
        }
        Ok(changed)
    }

    // -- write-back ---------------------------------------------------------

    /// Writes `chunk` to storage if it is dirty and saving is enabled.
    ///
    /// Takes the chunk's write lock for the duration of the write, so the
    /// caller must not hold a guard on it.
    pub fn save_chunk(&mut self, chunk: &SharedChunk) -> Result<(), WorldError> {
        if self.write_back(chunk)? {
            let coord = chunk.read().coord();
            if let Some(pinned) = self.hard.remove(&coord) {
                self.soft.put(coord, pinned.chunk);
            }
        }
        Ok(())
    }

    fn write_back(&mut self, chunk: &SharedChunk) -> Result<bool, WorldError> {
        if !self.saving {
            tracing::debug!("saving disabled, chunk not written");
            return Ok(false);
        }
        let mut chunk = chunk.write();
        if !chunk.is_dirty() {
            return Ok(false);
        }
        let coord = chunk.coord();
        let storage = self.source.storage();
        let path = storage.chunk_path(coord);
        storage.write(&path, &self.source.schema().save(&chunk))?;
        chunk.mark_clean();
        self.flushed += 1;
        tracing::debug!(%coord, "flushed chunk");
        Ok(true)
    }

    /// Periodic maintenance.
    ///
    /// Re-files every chunk by its dirty flag, writes back at most
    /// `flushes_per_sweep` dirty chunks (oldest first), then trims the soft
    /// tier to its capacity.
    pub fn sort_chunks(&mut self) -> Result<SortReport, WorldError> {
        self.rebalance();

        let mut report = SortReport::default();
        for coord in self.oldest_dirty(self.flushes_per_sweep) {
            if self.flush_pinned(coord)? {
                report.flushed += 1;
            }
        }
        report.evicted = self.evict();

        report.remaining_dirty = self.hard.len();
        report.soft = self.soft.len();
        report.hard = self.hard.len();
        Ok(report)
    }

    /// Writes back every dirty chunk regardless of the per-sweep bound.
    /// Meant for shutdown.
    pub fn flush_all(&mut self) -> Result<usize, WorldError> {
        self.rebalance();
        let mut flushed = 0;
        for coord in self.oldest_dirty(usize::MAX) {
            if self.flush_pinned(coord)? {
                flushed += 1;
            }
        }
        if flushed > 0 {
            tracing::info!(flushed, "flushed all dirty chunks");
        }
        Ok(flushed)
    }

    fn rebalance(&mut self) {
        let dirtied: Vec<ChunkCoord> = self
            .soft
            .iter()
            .filter(|(_, chunk)| chunk.read().is_dirty())
            .map(|(coord, _)| *coord)
            .collect();
        for coord in dirtied {
            if let Some(chunk) = self.soft.pop(&coord) {
                self.pin(coord, chunk);
            }
        }

        let cleaned: Vec<ChunkCoord> = self
            .hard
            .iter()
            .filter(|(_, pinned)| !pinned.chunk.read().is_dirty())
            .map(|(coord, _)| *coord)
            .collect();
        for coord in cleaned {
            if let Some(pinned) = self.hard.remove(&coord) {
                self.soft.put(coord, pinned.chunk);
            }
        }
    }

    fn oldest_dirty(&self, limit: usize) -> Vec<ChunkCoord> {
        let mut order: Vec<(u64, ChunkCoord)> = self
            .hard
            .iter()
            .map(|(coord, pinned)| (pinned.since, *coord))
            .collect();
        order.sort_unstable();
        order.into_iter().take(limit).map(|(_, c)| c).collect()
    }

    fn flush_pinned(&mut self, coord: ChunkCoord) -> Result<bool, WorldError> {
        let Some(chunk) = self.hard.get(&coord).map(|p| Arc::clone(&p.chunk)) else {
            return Ok(false);
        };
        if !self.write_back(&chunk)? {
            return Ok(false);
        }
        self.hard.remove(&coord);
        self.soft.put(coord, chunk);
        Ok(true)
    }

    fn evict(&mut self) -> usize {
        let excess = self.soft.len().saturating_sub(self.soft_capacity);
        if excess == 0 {
            return 0;
        }
        let victims: Vec<ChunkCoord> = self
            .soft
            .iter()
            .rev()
            .filter(|(_, chunk)| Arc::strong_count(chunk) == 1 && !chunk.read().is_dirty())
            .map(|(coord, _)| *coord)
            .take(excess)
            .collect();
        for coord in &victims {
            self.soft.pop(coord);
        }
        if !victims.is_empty() {
            tracing::trace!(evicted = victims.len(), "evicted clean chunks");
        }
        victims.len()
    }

    // -- players and level --------------------------------------------------

    /// Loads a player, or a fresh one at spawn if none was saved.
    pub fn load_player(&self, username: &str) -> Result<Player, WorldError> {
        if !valid_username(username) {
            return Err(WorldError::InvalidUsername(username.to_string()));
        }
        let storage = self.source.storage();
        let path = storage.player_path(username);
        match storage.read(&path)? {
            Some(root) => Player::load(username, &root)
                .map_err(|source| WorldError::StorageCorruption { path, source }),
            None => Ok(Player::new(username, self.level.spawn)),
        }
    }

    /// Writes a player file. A no-op while saving is disabled.
    pub fn save_player(&self, player: &Player) -> Result<(), WorldError> {
        if !valid_username(&player.username) {
            return Err(WorldError::InvalidUsername(player.username.clone()));
        }
        if !self.saving {
            tracing::debug!(username = %player.username, "saving disabled, player not written");
            return Ok(());
        }
        let storage = self.source.storage();
        storage.write(&storage.player_path(&player.username), &player.save())
    }

    /// World-wide metadata as loaded from, or created for, the level file.
    pub fn level(&self) -> &Level {
        &self.level
    }

    /// Seed every generation stage derives its randomness from.
    pub fn seed(&self) -> u64 {
        self.level.seed
    }

    /// Spawn point in world coordinates.
    pub fn spawn(&self) -> (i32, i32, i32) {
        self.level.spawn
    }

    /// Moves the spawn point. Persisted by the next [`World::save_level`].
    pub fn set_spawn(&mut self, spawn: (i32, i32, i32)) {
        self.level.spawn = spawn;
    }

    /// Writes the level file. A no-op while saving is disabled.
    pub fn save_level(&self) -> Result<(), WorldError> {
        if !self.saving {
            tracing::debug!("saving disabled, level not written");
            return Ok(());
        }
        let storage = self.source.storage();
        storage.write(&storage.level_path(), &self.level.save())
    }

    // -- saving toggle and stats --------------------------------------------

    /// Suspends every write to storage. Dirty chunks stay pinned until saving
    /// is enabled again.
    pub fn disable_saving(&mut self) {
        self.saving = false;
        tracing::info!("saving disabled");
    }

    /// Resumes writes. Pending dirty chunks go out on the following sweeps.
    pub fn enable_saving(&mut self) {
        self.saving = true;
        tracing::info!("saving enabled");
    }

    pub fn saving_enabled(&self) -> bool {
        self.saving
    }

    // -- cache limits -------------------------------------------------------

    /// Clean chunks the soft tier keeps after a sweep.
    pub fn soft_capacity(&self) -> usize {
        self.soft_capacity
    }

    /// Changes the soft tier bound. Takes effect on the next sweep.
    pub fn set_soft_capacity(&mut self, capacity: usize) {
        self.soft_capacity = capacity;
    }

    pub fn flushes_per_sweep(&self) -> usize {
        self.flushes_per_sweep
    }

    /// Changes how many dirty chunks one sweep may write back.
    pub fn set_flushes_per_sweep(&mut self, count: usize) {
        self.flushes_per_sweep = count;
    }

    /// Snapshot of cache occupancy and lifetime counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            soft: self.soft.len(),
            hard: self.hard.len(),
            pending: self.pending.len(),
            generated: self.generated,
            loaded: self.loaded,
            flushed: self.flushed,
        }
    }
}

/// Configures and opens a [`World`].
pub struct WorldBuilder {
    directory: PathBuf,
    format: Arc<dyn TagFormat>,
    pipeline: Pipeline,
    seed: Option<u64>,
    blocks: Arc<BlockRegistry>,
    tile_entities: TileEntityRegistry,
    soft_capacity: usize,
    damage_threshold: usize,
    flushes_per_sweep: usize,
    workers: usize,
    queue_capacity: usize,
}

impl WorldBuilder {
    /// Defaults: NBT storage, an empty pipeline, the bundled block and tile
    /// entity registries, one worker.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            format: Arc::new(NbtFormat),
            pipeline: Pipeline::new(),
            seed: None,
            blocks: Arc::new(BlockRegistry::with_defaults()),
            tile_entities: TileEntityRegistry::with_defaults(),
            soft_capacity: 512,
            damage_threshold: DEFAULT_DAMAGE_THRESHOLD,
            flushes_per_sweep: 1,
            workers: 1,
            queue_capacity: 256,
        }
    }

    pub fn format(mut self, format: Arc<dyn TagFormat>) -> Self {
        self.format = format;
        self
    }

    pub fn pipeline(mut self, pipeline: Pipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// Seed for a newly created level. Ignored when the level file exists.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn blocks(mut self, blocks: Arc<BlockRegistry>) -> Self {
        self.blocks = blocks;
        self
    }

    pub fn tile_entities(mut self, registry: TileEntityRegistry) -> Self {
        self.tile_entities = registry;
        self
    }

    pub fn soft_capacity(mut self, capacity: usize) -> Self {
        self.soft_capacity = capacity;
        self
    }

    pub fn damage_threshold(mut self, threshold: usize) -> Self {
        self.damage_threshold = threshold;
        self
    }

    pub fn flushes_per_sweep(mut self, count: usize) -> Self {
        self.flushes_per_sweep = count;
        self
    }

    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Zero means unbounded.
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    pub fn build(self) -> Result<World, WorldError> {
        let storage = Storage::new(self.directory, self.format);
        let level_path = storage.level_path();
        let level = match storage.read(&level_path)? {
            Some(root) => Level::load(&root).map_err(|source| WorldError::StorageCorruption {
                path: level_path.clone(),
                source,
            })?,
            None => {
                let level = Level::new(self.seed.unwrap_or_else(rand::random));
                storage.write(&level_path, &level.save())?;
                tracing::info!(seed = level.seed, path = %level_path.display(), "created level");
                level
            }
        };

        let source = Arc::new(ChunkSource::new(
            storage,
            ChunkSchema::new(self.tile_entities),
            self.pipeline,
            self.blocks,
            level.seed,
            self.damage_threshold,
        ));
        let pool = GenerationPool::new(Arc::clone(&source), self.workers, self.queue_capacity)?;
        tracing::debug!(workers = pool.worker_count(), "world opened");

        Ok(World {
            source,
            pool,
            soft: LruCache::unbounded(),
            hard: FxHashMap::default(),
            pending: FxHashMap::default(),
            level,
            saving: true,
            soft_capacity: self.soft_capacity,
            flushes_per_sweep: self.flushes_per_sweep,
            seq: 0,
            generated: 0,
            loaded: 0,
            flushed: 0,
        })
    }
}
