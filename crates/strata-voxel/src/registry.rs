//! Block registry: maps the 256 block ids to their [`BlockDef`] metadata.
//!
//! Air is always id 0 so zero-initialized chunk memory is empty space. The
//! lighting code only needs [`BlockRegistry::glow`]; everything else is for
//! generation stages and tooling.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Well-known ids
// ---------------------------------------------------------------------------

/// Ids of the blocks registered by [`BlockRegistry::with_defaults`].
pub mod ids {
    pub const AIR: u8 = 0;
    pub const STONE: u8 = 1;
    pub const GRASS: u8 = 2;
    pub const DIRT: u8 = 3;
    pub const COBBLESTONE: u8 = 4;
    pub const PLANKS: u8 = 5;
    pub const BEDROCK: u8 = 7;
    pub const FLOWING_WATER: u8 = 8;
    pub const WATER: u8 = 9;
    pub const FLOWING_LAVA: u8 = 10;
    pub const LAVA: u8 = 11;
    pub const SAND: u8 = 12;
    pub const GRAVEL: u8 = 13;
    pub const GOLD_ORE: u8 = 14;
    pub const IRON_ORE: u8 = 15;
    pub const COAL_ORE: u8 = 16;
    pub const LOG: u8 = 17;
    pub const LEAVES: u8 = 18;
    pub const GLASS: u8 = 20;
    pub const BROWN_MUSHROOM: u8 = 39;
    pub const TORCH: u8 = 50;
    pub const FIRE: u8 = 51;
    pub const MOB_SPAWNER: u8 = 52;
    pub const CHEST: u8 = 54;
    pub const FURNACE: u8 = 61;
    pub const BURNING_FURNACE: u8 = 62;
    pub const SIGN_POST: u8 = 63;
    pub const WALL_SIGN: u8 = 68;
    pub const REDSTONE_TORCH: u8 = 76;
    pub const GLOWSTONE: u8 = 89;
    pub const JACK_O_LANTERN: u8 = 91;
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Descriptor for one block id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockDef {
    /// Human-readable name (e.g. "stone", "torch").
    pub name: String,
    /// Emitted light strength (0 = none, 15 = max).
    pub glow: u8,
}

impl BlockDef {
    pub fn new(name: impl Into<String>, glow: u8) -> Self {
        Self {
            name: name.into(),
            glow: glow.min(15),
        }
    }
}

/// Errors that can occur during block registration.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A block with the same name has already been registered.
    #[error("duplicate block name: {0}")]
    DuplicateName(String),
    /// The id is already taken.
    #[error("block id {0} is already registered")]
    DuplicateId(u8),
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Maps block ids to [`BlockDef`]s with O(1) lookup both ways.
pub struct BlockRegistry {
    /// Dense table where `index == id`.
    defs: Vec<Option<BlockDef>>,
    name_to_id: HashMap<String, u8>,
}

impl BlockRegistry {
    /// Creates a registry containing only air.
    pub fn new() -> Self {
        let mut defs = vec![None; 256];
        defs[0] = Some(BlockDef::new("air", 0));
        let mut name_to_id = HashMap::new();
        name_to_id.insert("air".to_string(), ids::AIR);
        Self { defs, name_to_id }
    }

    /// Registry holding the standard block set.
    pub fn with_defaults() -> Self {
        use ids::*;

        let table: &[(u8, &str, u8)] = &[
            (STONE, "stone", 0),
            (GRASS, "grass", 0),
            (DIRT, "dirt", 0),
            (COBBLESTONE, "cobblestone", 0),
            (PLANKS, "planks", 0),
            (BEDROCK, "bedrock", 0),
            (FLOWING_WATER, "flowing-water", 0),
            (WATER, "water", 0),
            (FLOWING_LAVA, "flowing-lava", 15),
            (LAVA, "lava", 15),
            (SAND, "sand", 0),
            (GRAVEL, "gravel", 0),
            (GOLD_ORE, "gold-ore", 0),
            (IRON_ORE, "iron-ore", 0),
            (COAL_ORE, "coal-ore", 0),
            (LOG, "log", 0),
            (LEAVES, "leaves", 0),
            (GLASS, "glass", 0),
            (BROWN_MUSHROOM, "brown-mushroom", 1),
            (TORCH, "torch", 14),
            (FIRE, "fire", 15),
            (MOB_SPAWNER, "mob-spawner", 0),
            (CHEST, "chest", 0),
            (FURNACE, "furnace", 0),
            (BURNING_FURNACE, "burning-furnace", 14),
            (SIGN_POST, "sign-post", 0),
            (WALL_SIGN, "wall-sign", 0),
            (REDSTONE_TORCH, "redstone-torch", 7),
            (GLOWSTONE, "glowstone", 15),
            (JACK_O_LANTERN, "jack-o-lantern", 15),
        ];

        let mut registry = Self::new();
        for &(id, name, glow) in table {
            // The table has unique ids and names.
            let _ = registry.register(id, BlockDef::new(name, glow));
        }
        registry
    }

    /// Registers `def` under `id`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateId`] if the id is taken, or
    /// [`RegistryError::DuplicateName`] if the name is.
    pub fn register(&mut self, id: u8, def: BlockDef) -> Result<(), RegistryError> {
        if self.defs[id as usize].is_some() {
            return Err(RegistryError::DuplicateId(id));
        }
        if self.name_to_id.contains_key(&def.name) {
            return Err(RegistryError::DuplicateName(def.name));
        }
        self.name_to_id.insert(def.name.clone(), id);
        self.defs[id as usize] = Some(def);
        Ok(())
    }

    /// Returns the definition for `id`, if registered.
    pub fn get(&self, id: u8) -> Option<&BlockDef> {
        self.defs[id as usize].as_ref()
    }

    /// Returns the id registered under `name`.
    pub fn lookup_by_name(&self, name: &str) -> Option<u8> {
        self.name_to_id.get(name).copied()
    }

    /// Light emitted by `id`. Unregistered ids emit nothing.
    pub fn glow(&self, id: u8) -> u8 {
        self.get(id).map_or(0, |def| def.glow)
    }

    /// Number of registered ids, including air.
    pub fn len(&self) -> usize {
        self.name_to_id.len()
    }

    /// Returns `true` if only air is registered.
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }
}

impl Default for BlockRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
