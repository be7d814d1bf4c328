use std::cell::Cell;

use serde::{Deserialize, Serialize};

use super::slot::{Slot, SlotRef, Slots};
use super::{InventoryId, ItemTypeId};
use crate::catalog::ItemTemplate;
use crate::effect::{Effect, EffectId};
use crate::stat::{DescribedModifier, Stat, Stats};

/// Current and maximum durability
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Durability {
    pub current: f32,
    pub max: f32,
}

impl Durability {
    pub fn new(max: f32) -> Self {
        Self { current: max, max }
    }

    pub fn is_depleted(&self) -> bool {
        self.current <= 0.0
    }

    /// `current / max`, 1.0 when `max` is not positive
    pub fn fraction(&self) -> f32 {
        if self.max > 0.0 {
            self.current / self.max
        } else {
            1.0
        }
    }
}

/// A node in the item tree
#[derive(Debug)]
pub struct Item {
    type_id: ItemTypeId,
    pub name: String,
    /// Catalog sort order, used by inventory sorting
    pub order: i32,
    /// Character roots always have active effects
    pub is_character: bool,
    pub(crate) stack_count: u32,
    max_stack_count: u32,
    /// Weight of one unit
    pub(crate) unit_weight: f32,
    pub value: f32,
    pub quality: i32,
    pub(crate) durability: Option<Durability>,
    tags: Vec<String>,
    pub(crate) stats: Option<Stats>,
    pub(crate) slots: Option<Slots>,
    pub(crate) inventory: Option<InventoryId>,
    pub(crate) effects: Vec<Effect>,
    pub(crate) descriptions: Vec<DescribedModifier>,

    // Parent links, maintained by the world
    pub(crate) plugged_into: Option<SlotRef>,
    pub(crate) in_inventory: Option<InventoryId>,

    pub(crate) effects_active: bool,
    pub(crate) being_destroyed: bool,
    pub(crate) weight_cache: Cell<Option<f32>>,
}

impl Item {
    /// Build the plain data of an item. Effects and the inventory need the
    /// world and are attached by it.
    pub(crate) fn from_template(template: &ItemTemplate) -> Self {
        let max_stack_count = template.max_stack_count.max(1);
        let stats = (!template.stats.is_empty()).then(|| {
            let mut stats = Stats::new();
            for stat in &template.stats {
                stats.insert(Stat::new(stat.key(), stat.base_value()));
            }
            stats
        });
        let slots = (!template.slots.is_empty())
            .then(|| Slots::new(template.slots.iter().map(Slot::cleared).collect()));

        let mut tags: Vec<String> = Vec::with_capacity(template.tags.len());
        for tag in &template.tags {
            if !tags.contains(tag) {
                tags.push(tag.clone());
            }
        }

        Self {
            type_id: template.type_id,
            name: template.name.clone(),
            order: template.order,
            is_character: template.is_character,
            stack_count: template.stack_count.clamp(1, max_stack_count),
            max_stack_count,
            unit_weight: template.unit_weight,
            value: template.value,
            quality: template.quality,
            durability: template.max_durability.map(Durability::new),
            tags,
            stats,
            slots,
            inventory: None,
            effects: Vec::new(),
            descriptions: template
                .modifiers
                .iter()
                .cloned()
                .map(DescribedModifier::new)
                .collect(),
            plugged_into: None,
            in_inventory: None,
            effects_active: false,
            being_destroyed: false,
            weight_cache: Cell::new(None),
        }
    }

    pub fn type_id(&self) -> ItemTypeId {
        self.type_id
    }

    pub fn stack_count(&self) -> u32 {
        self.stack_count
    }

    pub fn max_stack_count(&self) -> u32 {
        self.max_stack_count
    }

    /// Check if this item can stack
    pub fn is_stackable(&self) -> bool {
        self.max_stack_count > 1
    }

    /// Free room left on this stack
    pub fn stack_space(&self) -> u32 {
        self.max_stack_count.saturating_sub(self.stack_count)
    }

    pub fn unit_weight(&self) -> f32 {
        self.unit_weight
    }

    /// Weight of this stack, excluding contents
    pub fn self_weight(&self) -> f32 {
        self.unit_weight * self.stack_count as f32
    }

    pub fn durability(&self) -> Option<Durability> {
        self.durability
    }

    pub fn uses_durability(&self) -> bool {
        self.durability.is_some()
    }

    /// Uses durability and has none left
    pub fn is_broken(&self) -> bool {
        self.durability.is_some_and(|d| d.is_depleted())
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// The tag that decides this item's sort group
    pub fn first_tag(&self) -> Option<&str> {
        self.tags.first().map(String::as_str)
    }

    pub fn add_tag(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        if !self.has_tag(&tag) {
            self.tags.push(tag);
        }
    }

    pub fn stats(&self) -> Option<&Stats> {
        self.stats.as_ref()
    }

    pub fn stat_value(&self, key: &str) -> Option<f32> {
        self.stats.as_ref()?.value(key)
    }

    pub fn has_stat(&self, key: &str) -> bool {
        self.stats.as_ref().is_some_and(|s| s.contains(key))
    }

    pub fn slots(&self) -> Option<&Slots> {
        self.slots.as_ref()
    }

    pub fn slot(&self, key: &str) -> Option<&Slot> {
        self.slots.as_ref()?.get(key)
    }

    /// The inventory this item owns
    pub fn inventory(&self) -> Option<InventoryId> {
        self.inventory
    }

    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    pub fn effect(&self, id: EffectId) -> Option<&Effect> {
        self.effects.iter().find(|e| e.id() == id)
    }

    pub(crate) fn effect_mut(&mut self, id: EffectId) -> Option<&mut Effect> {
        self.effects.iter_mut().find(|e| e.id() == id)
    }

    pub fn descriptions(&self) -> &[DescribedModifier] {
        &self.descriptions
    }

    /// The slot this item is plugged into
    pub fn plugged_into(&self) -> Option<&SlotRef> {
        self.plugged_into.as_ref()
    }

    /// The inventory this item sits in
    pub fn in_inventory(&self) -> Option<InventoryId> {
        self.in_inventory
    }

    pub fn has_parent_link(&self) -> bool {
        self.plugged_into.is_some() || self.in_inventory.is_some()
    }

    pub fn effects_active(&self) -> bool {
        self.effects_active
    }

    pub fn is_being_destroyed(&self) -> bool {
        self.being_destroyed
    }

    pub(crate) fn invalidate_weight(&self) {
        self.weight_cache.set(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_ammo() -> Item {
        Item::from_template(
            &ItemTemplate::new(ItemTypeId(7), "9mm Rounds")
                .stackable(30)
                .stack(12)
                .weight(0.01)
                .tag("ammo")
                .tag("ammo"),
        )
    }

    #[test]
    fn test_stackable() {
        let ammo = make_ammo();
        assert!(ammo.is_stackable());
        assert_eq!(ammo.stack_count(), 12);
        assert_eq!(ammo.stack_space(), 18);
        assert!((ammo.self_weight() - 0.12).abs() < 1e-6);
        assert_eq!(ammo.tags().len(), 1);
        assert_eq!(ammo.first_tag(), Some("ammo"));
    }

    #[test]
    fn test_durability() {
        let template = ItemTemplate::new(ItemTypeId(1), "Helmet").durability(50.0);
        let mut helmet = Item::from_template(&template);
        assert!(helmet.uses_durability());
        assert!(!helmet.is_broken());
        helmet.durability = Some(Durability { current: 0.0, max: 50.0 });
        assert!(helmet.is_broken());
    }

    #[test]
    fn stack_clamped_to_max() {
        let template = ItemTemplate::new(ItemTypeId(2), "Bandage").stackable(5).stack(9);
        let item = Item::from_template(&template);
        assert_eq!(item.stack_count(), 5);
    }
}
