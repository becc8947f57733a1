//! Player files: position, look direction and inventory.

use strata_tag::{Compound, Tag, TagError};
use strata_voxel::Inventory;

/// Inventory slots: 36 carried, then crafting at 80 and armour at 100.
pub const PLAYER_SLOTS: usize = 104;

/// Persisted state of one player.
#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub username: String,
    pub position: [f64; 3],
    pub yaw: f32,
    pub pitch: f32,
    pub inventory: Inventory,
}

impl Player {
    /// A fresh player standing at `spawn`.
    pub fn new(username: impl Into<String>, spawn: (i32, i32, i32)) -> Self {
        Self {
            username: username.into(),
            position: [spawn.0 as f64, spawn.1 as f64, spawn.2 as f64],
            yaw: 0.0,
            pitch: 0.0,
            inventory: Inventory::new(PLAYER_SLOTS),
        }
    }

    pub fn save(&self) -> Compound {
        let mut root = Compound::new();
        root.insert(
            "Pos",
            Tag::List(self.position.iter().map(|&v| Tag::Double(v)).collect()),
        )
        .insert(
            "Rotation",
            Tag::List(vec![Tag::Float(self.yaw), Tag::Float(self.pitch)]),
        )
        .insert("Inventory", self.inventory.save());
        root
    }

    pub fn load(username: &str, root: &Compound) -> Result<Self, TagError> {
        let pos = root.list("Pos")?;
        let position = match pos {
            [Tag::Double(x), Tag::Double(y), Tag::Double(z)] => [*x, *y, *z],
            _ => return Err(TagError::Malformed("`Pos` must hold three doubles".into())),
        };
        let (yaw, pitch) = match root.list("Rotation")? {
            [Tag::Float(yaw), Tag::Float(pitch)] => (*yaw, *pitch),
            _ => return Err(TagError::Malformed("`Rotation` must hold two floats".into())),
        };
        let mut inventory = Inventory::new(PLAYER_SLOTS);
        inventory.load(root.list("Inventory")?)?;
        Ok(Self {
            username: username.to_string(),
            position,
            yaw,
            pitch,
            inventory,
        })
    }
}

/// 1-16 ASCII letters, digits or underscores; anything else could escape the
/// players directory.
pub fn valid_username(name: &str) -> bool {
    (1..=16).contains(&name.len())
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_voxel::ItemStack;

    #[test]
    fn test_save_load() {
        let mut player = Player::new("steve", (0, 64, 0));
        player.position = [10.5, 65.0, -3.25];
        player.yaw = 90.0;
        player.pitch = -12.5;
        player.inventory.set(0, Some(ItemStack::new(278, 3, 1)));
        player.inventory.set(103, Some(ItemStack::new(310, 0, 1)));
        let back = Player::load("steve", &player.save()).unwrap();
        assert_eq!(back, player);
    }

    #[test]
    fn test_bad_position() {
        let mut root = Player::new("alex", (0, 0, 0)).save();
        root.insert("Pos", Tag::List(vec![Tag::Double(1.0)]));
        assert!(matches!(
            Player::load("alex", &root),
            Err(TagError::Malformed(_))
        ));
    }

    #[test]
    fn test_usernames() {
        assert!(valid_username("Notch"));
        assert!(valid_username("a_b_9"));
        assert!(!valid_username(""));
        assert!(!valid_username("../../etc/passwd"));
        assert!(!valid_username("seventeen_chars__"));
        assert!(!valid_username("has space"));
    }
}
