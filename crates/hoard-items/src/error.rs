//! Item operation errors
//!
//! Operations that can't be carried out return one of these and leave the
//! world untouched. Configuration errors and tree-walk warnings don't live here:
//! they go to the diagnostics channel.

use crate::effect::{ComponentId, EffectId};
use crate::item::{InventoryId, ItemId, ItemTypeId};

/// Errors returned by item, inventory, slot and stack operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ItemError {
    #[error("item {0:?} does not exist")]
    ItemNotFound(ItemId),

    #[error("inventory {0:?} does not exist")]
    InventoryNotFound(InventoryId),

    #[error("inventory is full (capacity: {capacity})")]
    CapacityExceeded { capacity: usize },

    #[error("item {item:?} is not in inventory {inventory:?}")]
    NotInInventory { item: ItemId, inventory: InventoryId },

    #[error("position {index} is already occupied by {occupant:?}")]
    PositionOccupied { index: usize, occupant: ItemId },

    #[error("position {index} is outside the inventory (capacity: {capacity})")]
    IndexOutOfRange { index: usize, capacity: usize },

    #[error("item {0:?} already has a parent")]
    AlreadyParented(ItemId),

    #[error("item {item:?} has no slot named '{key}'")]
    SlotNotFound { item: ItemId, key: String },

    #[error("slot '{key}' does not accept {item:?}: {reason}")]
    SlotRejected {
        key: String,
        item: ItemId,
        reason: &'static str,
    },

    #[error("placing {item:?} under {parent:?} would create a cycle")]
    WouldCreateCycle { item: ItemId, parent: ItemId },

    #[error("item type {0:?} does not stack")]
    NotStackable(ItemTypeId),

    #[error("cannot merge type {got:?} into type {expected:?}")]
    TypeMismatch {
        expected: ItemTypeId,
        got: ItemTypeId,
    },

    #[error("stack count {requested} is out of range (max: {max})")]
    StackOutOfRange { requested: u32, max: u32 },

    #[error("cannot split {requested} from a stack of {available}")]
    SplitOutOfRange { requested: u32, available: u32 },

    #[error("item {0:?} does not use durability")]
    NoDurability(ItemId),

    #[error("item {item:?} has no effect {effect:?}")]
    EffectNotFound { item: ItemId, effect: EffectId },

    #[error("effect {effect:?} has no component {component:?}")]
    ComponentNotFound {
        effect: EffectId,
        component: ComponentId,
    },

    #[error("item {item:?} has no stat '{key}'")]
    StatNotFound { item: ItemId, key: String },

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Errors reported by a [`Catalog`](crate::catalog::Catalog)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("item type {0:?} is not in the catalog")]
    NotFound(ItemTypeId),

    #[error("catalog has not been configured")]
    NotConfigured,

    #[error("failed to parse catalog: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::Parse(err.to_string())
    }
}
