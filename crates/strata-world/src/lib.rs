//! The world cache: chunk storage, generation workers and write-back.

pub mod error;
pub mod generation;
pub mod level;
pub mod player;
pub mod request;
pub mod schema;
pub mod source;
pub mod storage;
pub mod world;

pub use error::WorldError;
pub use generation::{GenerationPool, JobOutcome};
pub use level::Level;
pub use player::{PLAYER_SLOTS, Player, valid_username};
pub use request::ChunkRequest;
pub use schema::ChunkSchema;
pub use source::{ChunkSource, Origin};
pub use storage::Storage;
pub use world::{CacheStats, SharedChunk, SortReport, World, WorldBuilder};
