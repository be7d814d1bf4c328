//! The item world
//!
//! Owns every item and inventory in arenas addressed by generational handles,
//! keeps parent links consistent, and drives effects. All mutation goes
//! through here so change events fire once, after caches are invalidated.

mod container;
mod effects;
mod modifiers;
mod sort;
mod stack;
mod tree;

use std::cell::{Ref, RefCell};
use std::fmt;

use hoard_core::{Arena, Diagnostic, Diagnostics, ItemConfig};
use tracing::debug;

use crate::catalog::{Catalog, ItemTemplate};
use crate::effect::EffectId;
use crate::error::{CatalogError, ItemError};
use crate::events::{EventBus, ItemEvent, SubscriptionId};
use crate::item::{Inventory, InventoryId, Item, ItemId, ItemTypeId};
use crate::tag::TagRegistry;

pub use stack::SplitReservation;

/// Arena-backed store of items and inventories
#[derive(Debug)]
pub struct ItemWorld {
    pub(crate) items: Arena<Item>,
    pub(crate) inventories: Arena<Inventory>,
    tags: TagRegistry,
    config: ItemConfig,
    diagnostics: RefCell<Diagnostics>,
    events: EventBus,
    next_effect: u32,
}

impl ItemWorld {
    pub fn new(config: ItemConfig) -> Self {
        Self::with_tags(config, TagRegistry::new())
    }

    pub fn with_tags(config: ItemConfig, tags: TagRegistry) -> Self {
        Self {
            items: Arena::new(),
            inventories: Arena::new(),
            tags,
            diagnostics: RefCell::new(Diagnostics::new(config.record_diagnostics, config.max_recorded_diagnostics)),
            config,
            events: EventBus::new(),
            next_effect: 0,
        }
    }

    pub fn config(&self) -> &ItemConfig {
        &self.config
    }

    pub fn tags(&self) -> &TagRegistry {
        &self.tags
    }

    pub fn tags_mut(&mut self) -> &mut TagRegistry {
        &mut self.tags
    }

    // -- Diagnostics --

    pub fn diagnostics(&self) -> Ref<'_, Diagnostics> {
        self.diagnostics.borrow()
    }

    /// Take every recorded diagnostic
    pub fn take_diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow_mut().drain()
    }

    /// Report a configuration error (logged, never fatal)
    pub fn report_configuration(&self, subject: &dyn fmt::Debug, message: impl Into<String>) {
        self.diagnostics.borrow_mut().configuration(subject, message);
    }

    pub(crate) fn report_structural(&self, subject: &dyn fmt::Debug, message: impl Into<String>) {
        self.diagnostics.borrow_mut().structural(subject, message);
    }

    // -- Events --

    pub fn subscribe(&mut self, subscriber: impl FnMut(&ItemEvent) + 'static) -> SubscriptionId {
        self.events.subscribe(subscriber)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    pub(crate) fn emit(&mut self, event: ItemEvent) {
        self.events.emit(event);
    }

    // -- Lookup --

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.get(id)
    }

    #[cfg(test)]
    pub(crate) fn item_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        self.items.get_mut(id)
    }

    pub(crate) fn get(&self, id: ItemId) -> Result<&Item, ItemError> {
        self.items.get(id).ok_or(ItemError::ItemNotFound(id))
    }

    pub fn inventory(&self, id: InventoryId) -> Option<&Inventory> {
        self.inventories.get(id)
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.items.contains(id)
    }

    pub fn items(&self) -> impl Iterator<Item = (ItemId, &Item)> + '_ {
        self.items.iter()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Resolved value of a stat on an item
    pub fn stat_value(&self, item: ItemId, key: &str) -> Option<f32> {
        self.items.get(item)?.stat_value(key)
    }

    // -- Creation --

    pub(crate) fn allocate_effect_id(&mut self) -> EffectId {
        let id = EffectId(self.next_effect);
        self.next_effect += 1;
        id
    }

    /// Instantiate a template. The new item has no parent.
    pub fn spawn(&mut self, template: &ItemTemplate) -> ItemId {
        let id = self.items.insert(Item::from_template(template));

        if let Some(inventory) = template.inventory {
            let capacity = inventory
                .capacity
                .unwrap_or(self.config.default_inventory_capacity);
            let inv = self.inventories.insert(Inventory::new(Some(id), capacity));
            if let Some(item) = self.items.get_mut(id) {
                item.inventory = Some(inv);
            }
        }

        let effects: Vec<_> = template
            .effects
            .iter()
            .map(|t| t.build(self.allocate_effect_id()))
            .collect();
        if let Some(item) = self.items.get_mut(id) {
            item.effects = effects;
        }

        self.validate_effects(id);
        self.refresh_descriptions(id);
        self.handle_effects_active(id);
        debug!(item = ?id, type_id = template.type_id.0, name = %template.name, "spawned item");
        id
    }

    /// Instantiate through a catalog
    pub async fn spawn_from<C: Catalog>(&mut self, catalog: &C, type_id: ItemTypeId) -> Result<ItemId, CatalogError> {
        let template = catalog.instantiate(type_id).await?;
        Ok(self.spawn(&template))
    }
}

impl Default for ItemWorld {
    fn default() -> Self {
        Self::new(ItemConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticCatalog;
    use crate::item::Slot;

    #[test]
    fn spawn_builds_inventory_and_slots() {
        let mut world = ItemWorld::default();
        let pack = world.spawn(
            &ItemTemplate::new(ItemTypeId(1), "Backpack")
                .inventory(8)
                .slot(Slot::new("pouch")),
        );
        let item = world.item(pack).unwrap();
        let inv = world.inventory(item.inventory().unwrap()).unwrap();
        assert_eq!(inv.capacity(), 8);
        assert_eq!(inv.owner(), Some(pack));
        assert!(item.slot("pouch").is_some());
    }

    #[test]
    fn default_inventory_capacity() {
        let mut world = ItemWorld::default();
        let mut template = ItemTemplate::new(ItemTypeId(1), "Crate");
        template.inventory = Some(Default::default());
        let id = world.spawn(&template);
        let inv = world.item(id).unwrap().inventory().unwrap();
        assert_eq!(world.inventory(inv).unwrap().capacity(), 16);
    }

    #[test]
    fn character_roots_start_active() {
        let mut world = ItemWorld::default();
        let hero = world.spawn(&ItemTemplate::new(ItemTypeId(1), "Hero").character());
        let rock = world.spawn(&ItemTemplate::new(ItemTypeId(2), "Rock"));
        assert!(world.item(hero).unwrap().effects_active());
        assert!(!world.item(rock).unwrap().effects_active());
    }

    #[tokio::test]
    async fn spawn_from_catalog() {
        let mut catalog = StaticCatalog::new();
        catalog.insert(ItemTemplate::new(ItemTypeId(5), "Medkit").stackable(3));
        let mut world = ItemWorld::default();
        let id = world.spawn_from(&catalog, ItemTypeId(5)).await.unwrap();
        assert_eq!(world.item(id).unwrap().name, "Medkit");
        assert_eq!(
            world.spawn_from(&catalog, ItemTypeId(6)).await,
            Err(CatalogError::NotFound(ItemTypeId(6)))
        );
    }
}
