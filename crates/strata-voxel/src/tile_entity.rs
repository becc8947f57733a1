//! Tile entities: structured state attached to a single voxel.
//!
//! The chunk owns its tile entities but never constructs them from stored
//! records itself. Loading goes through a [`TileEntityRegistry`] handed to the
//! chunk serializer, which maps each record's `id` to a loader.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;

use strata_tag::{Compound, Tag, TagError};

use crate::inventory::Inventory;

/// State attached to one voxel.
pub trait TileEntity: Any + Send + Sync + fmt::Debug {
    /// Stored discriminator, e.g. `"Chest"`.
    fn id(&self) -> &'static str;

    /// Writes the type-specific fields into `record`. The caller adds `id`
    /// and the position.
    fn save(&self, record: &mut Compound);

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl dyn TileEntity {
    pub fn downcast_ref<T: TileEntity + 'static>(&self) -> Option<&T> {
        self.as_any().downcast_ref()
    }

    pub fn downcast_mut<T: TileEntity + 'static>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut()
    }
}

macro_rules! any_impls {
    () => {
        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    };
}

// ---------------------------------------------------------------------------
// Bundled tile entities
// ---------------------------------------------------------------------------

/// A 27-slot storage chest.
#[derive(Clone, Debug, PartialEq)]
pub struct Chest {
    pub inventory: Inventory,
}

impl Chest {
    pub const SLOTS: usize = 27;

    fn load(record: &Compound) -> Result<Box<dyn TileEntity>, TagError> {
        let mut chest = Chest::default();
        chest.inventory.load(record.list("Items")?)?;
        Ok(Box::new(chest))
    }
}

impl Default for Chest {
    fn default() -> Self {
        Self {
            inventory: Inventory::new(Self::SLOTS),
        }
    }
}

impl TileEntity for Chest {
    fn id(&self) -> &'static str {
        "Chest"
    }

    fn save(&self, record: &mut Compound) {
        record.insert("Items", self.inventory.save());
    }

    any_impls!();
}

/// A sign with four lines of text.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Sign {
    pub lines: [String; 4],
}

impl Sign {
    const KEYS: [&'static str; 4] = ["Text1", "Text2", "Text3", "Text4"];

    fn load(record: &Compound) -> Result<Box<dyn TileEntity>, TagError> {
        let mut sign = Sign::default();
        for (line, key) in sign.lines.iter_mut().zip(Self::KEYS) {
            *line = record.string(key)?.to_string();
        }
        Ok(Box::new(sign))
    }
}

impl TileEntity for Sign {
    fn id(&self) -> &'static str {
        "Sign"
    }

    fn save(&self, record: &mut Compound) {
        for (line, key) in self.lines.iter().zip(Self::KEYS) {
            record.insert(key, line.as_str());
        }
    }

    any_impls!();
}

/// A furnace: input, fuel and output slots plus its timers.
#[derive(Clone, Debug, PartialEq)]
pub struct Furnace {
    pub inventory: Inventory,
    pub burn_time: i16,
    pub cook_time: i16,
}

impl Furnace {
    pub const SLOTS: usize = 3;

    fn load(record: &Compound) -> Result<Box<dyn TileEntity>, TagError> {
        let mut furnace = Furnace {
            burn_time: record.short("BurnTime")?,
            cook_time: record.short("CookTime")?,
            ..Furnace::default()
        };
        furnace.inventory.load(record.list("Items")?)?;
        Ok(Box::new(furnace))
    }
}

impl Default for Furnace {
    fn default() -> Self {
        Self {
            inventory: Inventory::new(Self::SLOTS),
            burn_time: 0,
            cook_time: 0,
        }
    }
}

impl TileEntity for Furnace {
    fn id(&self) -> &'static str {
        "Furnace"
    }

    fn save(&self, record: &mut Compound) {
        record
            .insert("Items", self.inventory.save())
            .insert("BurnTime", Tag::Short(self.burn_time))
            .insert("CookTime", Tag::Short(self.cook_time));
    }

    any_impls!();
}

/// A monster spawner cage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MobSpawner {
    pub entity_id: String,
    pub delay: i16,
}

impl MobSpawner {
    fn load(record: &Compound) -> Result<Box<dyn TileEntity>, TagError> {
        Ok(Box::new(MobSpawner {
            entity_id: record.string("EntityId")?.to_string(),
            delay: record.short("Delay")?,
        }))
    }
}

impl Default for MobSpawner {
    fn default() -> Self {
        Self {
            entity_id: "Pig".to_string(),
            delay: 20,
        }
    }
}

impl TileEntity for MobSpawner {
    fn id(&self) -> &'static str {
        "MobSpawner"
    }

    fn save(&self, record: &mut Compound) {
        record
            .insert("EntityId", self.entity_id.as_str())
            .insert("Delay", Tag::Short(self.delay));
    }

    any_impls!();
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Builds a tile entity from its stored record.
pub type TileEntityLoader = fn(&Compound) -> Result<Box<dyn TileEntity>, TagError>;

/// Maps stored discriminators to loaders.
#[derive(Clone, Default)]
pub struct TileEntityRegistry {
    loaders: HashMap<String, TileEntityLoader>,
}

impl TileEntityRegistry {
    /// An empty registry; every record loads as unknown.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the bundled chest, sign, furnace and spawner.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("Chest", Chest::load);
        registry.register("Sign", Sign::load);
        registry.register("Furnace", Furnace::load);
        registry.register("MobSpawner", MobSpawner::load);
        registry
    }

    /// Adds or replaces the loader for `id`.
    pub fn register(&mut self, id: impl Into<String>, loader: TileEntityLoader) {
        self.loaders.insert(id.into(), loader);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.loaders.contains_key(id)
    }

    /// Loads a record. `Ok(None)` means the discriminator is not registered.
    pub fn load(&self, record: &Compound) -> Result<Option<Box<dyn TileEntity>>, TagError> {
        let id = record.string("id")?;
        match self.loaders.get(id) {
            Some(loader) => loader(record).map(Some),
            None => Ok(None),
        }
    }
}

impl fmt::Debug for TileEntityRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<_> = self.loaders.keys().collect();
        ids.sort();
        f.debug_struct("TileEntityRegistry").field("ids", &ids).finish()
    }
}

/// Builds the full stored record for `entity` at world position `(x, y, z)`.
pub fn save_record(entity: &dyn TileEntity, x: i32, y: i32, z: i32) -> Compound {
    let mut record = Compound::new();
    record
        .insert("id", entity.id())
        .insert("x", Tag::Int(x))
        .insert("y", Tag::Int(y))
        .insert("z", Tag::Int(z));
    entity.save(&mut record);
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::ItemStack;

    fn reload(entity: &dyn TileEntity) -> Box<dyn TileEntity> {
        let record = save_record(entity, 10, 64, -3);
        assert_eq!(record.int("x").unwrap(), 10);
        assert_eq!(record.int("z").unwrap(), -3);
        TileEntityRegistry::with_defaults()
            .load(&record)
            .unwrap()
            .expect("registered id")
    }

    #[test]
    fn test_chest_reload() {
        let mut chest = Chest::default();
        chest.inventory.set(5, Some(ItemStack::new(264, 0, 3)));
        let back = reload(&chest);
        assert_eq!(back.id(), "Chest");
        assert_eq!(back.downcast_ref::<Chest>(), Some(&chest));
    }

    #[test]
    fn test_sign_reload() {
        let sign = Sign {
            lines: ["north".into(), "".into(), "to spawn".into(), "->".into()],
        };
        let back = reload(&sign);
        assert_eq!(back.downcast_ref::<Sign>(), Some(&sign));
    }

    #[test]
    fn test_furnace_and_spawner_reload() {
        let mut furnace = Furnace {
            burn_time: 120,
            cook_time: 40,
            ..Furnace::default()
        };
        furnace.inventory.set(1, Some(ItemStack::new(263, 0, 8)));
        assert_eq!(reload(&furnace).downcast_ref::<Furnace>(), Some(&furnace));

        let spawner = MobSpawner {
            entity_id: "Zombie".into(),
            delay: 200,
        };
        assert_eq!(
            reload(&spawner).downcast_ref::<MobSpawner>(),
            Some(&spawner)
        );
    }

    #[test]
    fn test_unknown_id_is_none() {
        let mut record = Compound::new();
        record.insert("id", "Jukebox");
        assert!(TileEntityRegistry::with_defaults()
            .load(&record)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_missing_field_is_error() {
        let mut record = Compound::new();
        record.insert("id", "Sign").insert("Text1", "only one");
        assert!(TileEntityRegistry::with_defaults().load(&record).is_err());
    }
}
