//! Command-line argument parsing for the strata server.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;
use crate::config::StorageFormat;

/// strata command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "strata", about = "Persistent voxel world server")]
pub struct CliArgs {
    /// World directory.
    #[arg(long)]
    pub world: Option<PathBuf>,

    /// Storage encoding for world files.
    #[arg(long, value_enum)]
    pub format: Option<StorageFormat>,

    /// Seed for a world that does not exist yet.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Comma-separated generation stages, in run order.
    #[arg(long, value_delimiter = ',')]
    pub pipeline: Option<Vec<String>>,

    /// Clean chunks kept in memory.
    #[arg(long)]
    pub soft_capacity: Option<usize>,

    /// Generation worker threads (0 = automatic).
    #[arg(long)]
    pub workers: Option<usize>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(ref dir) = args.world {
            self.world.directory = dir.clone();
        }
        if let Some(format) = args.format {
            self.world.format = format;
        }
        if let Some(seed) = args.seed {
            self.world.seed = Some(seed);
        }
        if let Some(ref stages) = args.pipeline {
            self.world.pipeline = stages.clone();
        }
        if let Some(capacity) = args.soft_capacity {
            self.cache.soft_capacity = capacity;
        }
        if let Some(workers) = args.workers {
            self.generation.worker_threads = workers;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            world: Some(PathBuf::from("/tmp/w")),
            seed: Some(7),
            workers: Some(2),
            ..CliArgs::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.world.directory, PathBuf::from("/tmp/w"));
        assert_eq!(config.world.seed, Some(7));
        assert_eq!(config.generation.worker_threads, 2);
        // Non-overridden fields retain defaults
        assert_eq!(config.cache.soft_capacity, 512);
        assert_eq!(config.world.format, StorageFormat::Nbt);
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, original);
    }

    #[test]
    fn test_parse_flags() {
        let args = CliArgs::try_parse_from([
            "strata",
            "--format",
            "json",
            "--pipeline",
            "flat,safety",
            "--soft-capacity",
            "32",
        ])
        .unwrap();
        assert_eq!(args.format, Some(StorageFormat::Json));
        assert_eq!(
            args.pipeline,
            Some(vec!["flat".to_string(), "safety".to_string()])
        );
        assert_eq!(args.soft_capacity, Some(32));
    }
}
