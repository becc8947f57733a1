//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// World location and generation settings.
    pub world: WorldConfig,
    /// Chunk cache policy.
    pub cache: CacheConfig,
    /// Background generation workers.
    pub generation: GenerationConfig,
    /// Periodic maintenance timing.
    pub maintenance: MaintenanceConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Encoding used for persisted chunk, level and player files.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
pub enum StorageFormat {
    /// Gzip-compressed binary NBT (`.dat`).
    #[default]
    Nbt,
    /// Plain JSON (`.json`).
    Json,
}

/// World configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    /// Directory holding chunk, level and player files.
    pub directory: PathBuf,
    /// Encoding for newly written files.
    pub format: StorageFormat,
    /// Seed used when the world has no level file yet. `None` picks one at
    /// random.
    pub seed: Option<u64>,
    /// Generation stages, in run order.
    pub pipeline: Vec<String>,
}

/// Cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    /// Clean chunks kept in memory before the least recently used are
    /// evicted.
    pub soft_capacity: usize,
    /// Distinct damaged voxels tracked per chunk before a full resend.
    pub damage_threshold: usize,
    /// Dirty chunks written per maintenance sweep.
    pub flushes_per_sweep: usize,
}

/// Generation worker configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GenerationConfig {
    /// Worker threads (0 = one less than the number of CPUs, at least 1).
    pub worker_threads: usize,
    /// Maximum queued jobs before submission blocks (0 = unbounded).
    pub queue_capacity: usize,
}

/// Maintenance loop timing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MaintenanceConfig {
    /// Milliseconds between cache sweeps.
    pub sort_interval_ms: u64,
    /// Milliseconds between ticks that deliver finished chunks.
    pub tick_interval_ms: u64,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("world"),
            format: StorageFormat::Nbt,
            seed: None,
            pipeline: ["simplex", "watertable", "ores", "safety"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            soft_capacity: 512,
            damage_threshold: 176,
            flushes_per_sweep: 1,
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            worker_threads: 0,
            queue_capacity: 256,
        }
    }
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            sort_interval_ms: 5000,
            tick_interval_ms: 50,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl GenerationConfig {
    /// Worker count with the `0 = automatic` rule applied.
    pub fn effective_workers(&self) -> usize {
        if self.worker_threads > 0 {
            self.worker_threads
        } else {
            num_cpus::get().saturating_sub(1).max(1)
        }
    }
}

/// Platform config directory for strata, e.g. `~/.config/strata`.
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("strata"))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// File name of the config inside its directory.
pub const CONFIG_FILE: &str = "config.ron";

// --- Load / Save / Reload ---

impl Config {
    /// Reads `config.ron` from `config_dir`, writing the defaults there first
    /// if it does not exist.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let path = config_dir.join(CONFIG_FILE);
        if !path.exists() {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", path.display());
            return Ok(config);
        }
        let config = Self::read(&path)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Writes this config to `config_dir/config.ron`, creating the directory.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        let path = config_dir.join(CONFIG_FILE);
        let write_err = |source| ConfigError::Write {
            path: path.clone(),
            source,
        };
        std::fs::create_dir_all(config_dir).map_err(write_err)?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);
        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::Serialize)?;
        std::fs::write(&path, serialized).map_err(write_err)
    }

    /// Re-reads `config.ron`: `Some(new_config)` if it changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let fresh = Self::read(&config_dir.join(CONFIG_FILE))?;
        if &fresh == self {
            return Ok(None);
        }
        log::info!("Config reloaded with changes");
        Ok(Some(fresh))
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        ron::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(3))
                .unwrap();
        assert!(ron_str.contains("soft_capacity: 512"));
        assert!(ron_str.contains("damage_threshold: 176"));
        assert!(ron_str.contains("\"watertable\""));
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = Config::default();
        config.world.seed = Some(12345);
        config.world.format = StorageFormat::Json;
        let ron_str = ron::to_string(&config).unwrap();
        let deserialized: Config = ron::from_str(&ron_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_section_uses_default() {
        let ron_str = "(world: (seed: Some(9)), debug: ())";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.world.seed, Some(9));
        assert_eq!(config.world.directory, PathBuf::from("world"));
        assert_eq!(config.cache, CacheConfig::default());
        assert_eq!(config.maintenance.sort_interval_ms, 5000);
    }

    #[test]
    fn test_extra_field_ignored() {
        let result: Result<Config, _> = ron::from_str("(future_setting: true)");
        assert!(result.is_ok());
    }

    #[test]
    fn test_effective_workers() {
        let explicit = GenerationConfig {
            worker_threads: 3,
            ..GenerationConfig::default()
        };
        assert_eq!(explicit.effective_workers(), 3);
        assert!(GenerationConfig::default().effective_workers() >= 1);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.world.directory = PathBuf::from("/srv/strata/world");
        config.cache.soft_capacity = 64;
        config.world.pipeline = vec!["flat".to_string()];

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_or_create_writes_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join("config.ron").exists());
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let mut modified = config.clone();
        modified.maintenance.sort_interval_ms = 1000;
        modified.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert_eq!(result.unwrap().maintenance.sort_interval_ms, 1000);
        assert!(modified.reload(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_invalid_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "{{not valid}}").unwrap();
        match Config::load_or_create(dir.path()) {
            Err(ConfigError::Parse { path, .. }) => {
                assert_eq!(path, dir.path().join(CONFIG_FILE))
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }
}
