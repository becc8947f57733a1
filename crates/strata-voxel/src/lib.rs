//! Voxel chunks: block, metadata and light storage, damage tracking, block
//! and tile-entity registries.

pub mod chunk;
pub mod coords;
pub mod damage;
pub mod error;
pub mod inventory;
pub mod nibble;
pub mod registry;
pub mod tile_entity;

pub use chunk::{Chunk, ChunkParts};
pub use coords::{
    CHUNK_COLUMNS, CHUNK_VOLUME, CHUNK_X, CHUNK_Y, CHUNK_Z, ChunkCoord, LocalPos, base36,
    split_world,
};
pub use damage::{ChunkPayload, DEFAULT_DAMAGE_THRESHOLD, Damage, DamagePacket};
pub use error::ChunkError;
pub use inventory::{Inventory, ItemStack};
pub use registry::{BlockDef, BlockRegistry, RegistryError, ids};
pub use tile_entity::{
    Chest, Furnace, MobSpawner, Sign, TileEntity, TileEntityLoader, TileEntityRegistry,
    save_record,
};
