//! Item stacks and fixed-size inventories.

use strata_tag::{Compound, Tag, TagError};

/// One stack of items.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ItemStack {
    /// Item or block id.
    pub id: i16,
    /// Durability or variant.
    pub damage: i16,
    pub count: i8,
}

impl ItemStack {
    pub fn new(id: i16, damage: i16, count: i8) -> Self {
        Self { id, damage, count }
    }
}

/// A fixed number of slots, each holding at most one stack.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Inventory {
    slots: Vec<Option<ItemStack>>,
}

impl Inventory {
    pub fn new(size: usize) -> Self {
        Self {
            slots: vec![None; size],
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    pub fn get(&self, slot: usize) -> Option<ItemStack> {
        self.slots.get(slot).copied().flatten()
    }

    /// Puts `item` in `slot`, returning the previous stack. Out-of-range slots
    /// leave the inventory untouched and hand `item` back.
    pub fn set(&mut self, slot: usize, item: Option<ItemStack>) -> Option<ItemStack> {
        match self.slots.get_mut(slot) {
            Some(cell) => std::mem::replace(cell, item),
            None => item,
        }
    }

    /// Occupied slots in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, ItemStack)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.map(|stack| (i, stack)))
    }

    /// Stores occupied slots as `{Slot, id, Damage, Count}` records.
    pub fn save(&self) -> Tag {
        Tag::List(
            self.iter()
                .map(|(slot, item)| {
                    let mut record = Compound::new();
                    record
                        .insert("Slot", Tag::Byte(slot as i8))
                        .insert("id", Tag::Short(item.id))
                        .insert("Damage", Tag::Short(item.damage))
                        .insert("Count", Tag::Byte(item.count));
                    Tag::Compound(record)
                })
                .collect(),
        )
    }

    /// Fills slots from records written by [`Inventory::save`]. Records naming
    /// a slot beyond this inventory are ignored.
    pub fn load(&mut self, records: &[Tag]) -> Result<(), TagError> {
        for record in records {
            let Tag::Compound(record) = record else {
                return Err(TagError::Malformed("inventory entry is not a compound".into()));
            };
            let slot = record.byte("Slot")? as u8 as usize;
            let item = ItemStack::new(
                record.short("id")?,
                record.short("Damage")?,
                record.byte("Count")?,
            );
            if slot < self.slots.len() {
                self.slots[slot] = Some(item);
            } else {
                tracing::debug!(slot, "dropping item in out-of-range slot");
            }
        }
        Ok(())
    }
}
