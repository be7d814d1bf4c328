//! Hoard Items - Data-driven item, stat and effect system
//!
//! Items form a tree through inventories and slots, carry stats resolved
//! from layered modifiers, and react to gameplay through a
//! trigger → filter → action effect graph. Everything lives in an
//! [`ItemWorld`].

pub mod catalog;
pub mod effect;
pub mod error;
pub mod events;
pub mod item;
pub mod stat;
pub mod tag;
pub mod world;

pub use catalog::{Catalog, InventoryTemplate, ItemTemplate, StaticCatalog};
pub use effect::{
    Action, ActionContext, ActionTemplate, ComponentId, Effect, EffectId, EffectTemplate, Filter, FilterContext,
    FilterTemplate, TriggerKind,
};
pub use error::{CatalogError, ItemError};
pub use events::{EventBus, ItemEvent, SubscriptionId};
pub use item::{Durability, Inventory, InventoryId, Item, ItemId, ItemTypeId, RelativeTarget, Slot, SlotRef, Slots};
pub use stat::{Modifier, ModifierDescription, ModifierKey, ModifierKind, ModifierSource, Stat, Stats};
pub use tag::{TagInfo, TagRegistry};
pub use world::{ItemWorld, SplitReservation};

pub use hoard_core::{Diagnostic, DiagnosticKind, ItemConfig};
