//! World-wide metadata stored in `level<ext>`.

use strata_tag::{Compound, Tag, TagError};

/// Seed and spawn point shared by the whole world.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Level {
    pub seed: u64,
    pub spawn: (i32, i32, i32),
}

impl Level {
    pub const DEFAULT_SPAWN: (i32, i32, i32) = (0, 64, 0);

    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            spawn: Self::DEFAULT_SPAWN,
        }
    }

    pub fn save(&self) -> Compound {
        let mut data = Compound::new();
        data.insert("RandomSeed", Tag::Long(self.seed as i64))
            .insert("SpawnX", Tag::Int(self.spawn.0))
            .insert("SpawnY", Tag::Int(self.spawn.1))
            .insert("SpawnZ", Tag::Int(self.spawn.2));
        let mut root = Compound::new();
        root.insert("Data", data);
        root
    }

    pub fn load(root: &Compound) -> Result<Self, TagError> {
        let data = root.compound("Data")?;
        Ok(Self {
            seed: data.long("RandomSeed")? as u64,
            spawn: (data.int("SpawnX")?, data.int("SpawnY")?, data.int("SpawnZ")?),
        })
    }
}
