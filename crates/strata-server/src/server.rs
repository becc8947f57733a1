//! The maintenance loop driven by `main`.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use strata_config::{CliArgs, Config};
use strata_voxel::ChunkCoord;
use strata_world::{ChunkRequest, World, WorldError};

/// Chunks around spawn requested at startup, as a radius in chunks.
const SPAWN_RADIUS: i32 = 2;

pub struct Server {
    world: World,
    tick_interval: Duration,
    sort_interval: Duration,
    last_sort: Instant,
    warmup: Vec<ChunkRequest>,
    watch: Option<ConfigWatch>,
}

/// The config file as last read, before CLI overrides, plus the overrides to
/// reapply after a reload.
struct ConfigWatch {
    dir: PathBuf,
    on_disk: Config,
    args: CliArgs,
}

impl Server {
    pub fn open(config: &Config) -> Result<Self, WorldError> {
        let mut world = World::open(config)?;
        let (sx, _, sz) = world.spawn();
        let center = ChunkCoord::containing(sx, sz);
        let warmup = spawn_area(center, SPAWN_RADIUS)
            .map(|c| world.request_chunk(c.x, c.z))
            .collect();

        Ok(Self {
            world,
            tick_interval: Duration::from_millis(config.maintenance.tick_interval_ms),
            sort_interval: Duration::from_millis(config.maintenance.sort_interval_ms),
            last_sort: Instant::now(),
            warmup,
            watch: None,
        })
    }

    /// Re-reads `config.ron` in `dir` on every sort sweep. `on_disk` is the
    /// config as loaded, before `args` were applied.
    pub fn watch_config(&mut self, dir: PathBuf, on_disk: Config, args: CliArgs) {
        self.watch = Some(ConfigWatch { dir, on_disk, args });
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// One loop iteration: deliver finished generation jobs, then run a sort
    /// sweep if the interval has elapsed.
    pub fn tick(&mut self) {
        self.world.pump();
        self.poll_warmup();

        if self.last_sort.elapsed() >= self.sort_interval {
            self.last_sort = Instant::now();
            self.reload_config();
            match self.world.sort_chunks() {
                Ok(report) => tracing::trace!(?report, "sorted chunks"),
                Err(e) => tracing::error!("chunk sweep failed: {e}"),
            }
        }
    }

    /// Cache limits and loop intervals apply live. World, generation and
    /// logging settings need a restart.
    fn reload_config(&mut self) {
        let Some(watch) = self.watch.as_mut() else {
            return;
        };
        let fresh = match watch.on_disk.reload(&watch.dir) {
            Ok(Some(fresh)) => fresh,
            Ok(None) => return,
            Err(e) => {
                tracing::warn!("config reload failed: {e}");
                return;
            }
        };
        if fresh.world != watch.on_disk.world
            || fresh.generation != watch.on_disk.generation
            || fresh.debug != watch.on_disk.debug
        {
            tracing::warn!("world, generation and debug settings apply after a restart");
        }
        watch.on_disk = fresh.clone();

        let mut config = fresh;
        config.apply_cli_overrides(&watch.args);
        self.world.set_soft_capacity(config.cache.soft_capacity);
        self.world.set_flushes_per_sweep(config.cache.flushes_per_sweep);
        self.tick_interval = Duration::from_millis(config.maintenance.tick_interval_ms);
        self.sort_interval = Duration::from_millis(config.maintenance.sort_interval_ms);
        tracing::info!(
            soft_capacity = config.cache.soft_capacity,
            flushes_per_sweep = config.cache.flushes_per_sweep,
            "config applied"
        );
    }

    fn poll_warmup(&mut self) {
        if self.warmup.is_empty() {
            return;
        }
        self.warmup.retain_mut(|request| match request.try_take() {
            None => true,
            Some(Ok(_)) => false,
            Some(Err(e)) => {
                tracing::warn!("spawn chunk unavailable: {e}");
                false
            }
        });
        if self.warmup.is_empty() {
            let stats = self.world.stats();
            tracing::info!(
                generated = stats.generated,
                loaded = stats.loaded,
                "spawn area ready"
            );
        }
    }

    pub fn warming_up(&self) -> bool {
        !self.warmup.is_empty()
    }

    /// Writes back every dirty chunk and the level file.
    pub fn shutdown(mut self) -> Result<(), WorldError> {
        self.world.pump();
        let flushed = self.world.flush_all()?;
        self.world.save_level()?;
        tracing::info!(flushed, "world saved");
        Ok(())
    }
}

/// Coordinates within `radius` chunks of `center`, row by row.
fn spawn_area(center: ChunkCoord, radius: i32) -> impl Iterator<Item = ChunkCoord> {
    (-radius..=radius).flat_map(move |dx| {
        (-radius..=radius).map(move |dz| ChunkCoord::new(center.x + dx, center.z + dz))
    })
}
