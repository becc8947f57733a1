//! Configuration for the strata world server.
//!
//! Settings persist to disk as `config.ron`. Missing fields fall back to
//! defaults, unknown fields are ignored, and command-line flags override
//! whatever the file says.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    CacheConfig, Config, DebugConfig, GenerationConfig, MaintenanceConfig, StorageFormat,
    CONFIG_FILE, WorldConfig, default_config_dir,
};
pub use error::ConfigError;
