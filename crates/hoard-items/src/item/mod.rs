//! Items, slots and inventories
//!
//! Plain data. Relations between items are stored as handles; the
//! [`ItemWorld`](crate::world::ItemWorld) keeps both sides consistent.

mod inventory;
#[allow(clippy::module_inception)]
mod item;
mod slot;

use hoard_core::Handle;
use serde::{Deserialize, Serialize};

pub use inventory::Inventory;
pub use item::{Durability, Item};
pub use slot::{Slot, SlotRef, SlotRejection, Slots};

/// Handle to an item in the world
pub type ItemId = Handle<Item>;

/// Handle to an inventory in the world
pub type InventoryId = Handle<Inventory>;

/// Catalog identity of an item type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemTypeId(pub u32);

/// An item resolved relative to another item in the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelativeTarget {
    /// The item itself
    #[default]
    SelfItem,
    /// The item's direct parent
    Parent,
    /// The character root above the item
    Character,
}
