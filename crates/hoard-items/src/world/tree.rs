//! Parent resolution, traversal and weight aggregation
//!
//! Every walk is bounded: parent walks by `max_tree_depth`, child walks by a
//! visited set and `max_traversal_nodes`. Hitting a bound reports a diagnostic
//! and returns what was gathered so far.

use std::collections::HashSet;

use super::ItemWorld;
use crate::item::{InventoryId, ItemId, RelativeTarget};

impl ItemWorld {
    /// Parent without consistency reporting
    pub(crate) fn parent_of(&self, item: ItemId) -> Option<ItemId> {
        let it = self.items.get(item)?;
        if let Some(slot) = &it.plugged_into {
            return Some(slot.owner);
        }
        self.inventories.get(it.in_inventory?)?.owner()
    }

    /// The item's parent: the owner of the slot it is plugged into, otherwise
    /// the owner of the inventory it sits in.
    pub fn parent_item(&self, item: ItemId) -> Option<ItemId> {
        let it = self.items.get(item)?;
        if let (Some(slot), Some(inv)) = (&it.plugged_into, it.in_inventory) {
            self.report_configuration(
                &item,
                format!(
                    "plugged into slot '{}' of {:?} while inside inventory {:?}",
                    slot.key, slot.owner, inv
                ),
            );
        }
        self.parent_of(item)
    }

    /// Items directly below `item`: slot contents, then inventory contents
    pub fn direct_children(&self, item: ItemId) -> Vec<ItemId> {
        let Some(it) = self.items.get(item) else {
            return Vec::new();
        };
        let mut children: Vec<ItemId> = it.slots.iter().flat_map(|s| s.contents()).collect();
        if let Some(inv) = it.inventory.and_then(|id| self.inventories.get(id)) {
            children.extend(inv.iter().map(|(_, id)| id));
        }
        children
    }

    /// Collect the items below `item`. Loops back to `item` or repeated
    /// visits are skipped with a structural warning.
    pub fn get_all_children(&self, item: ItemId, include_grandchildren: bool, exclude_self: bool) -> Vec<ItemId> {
        let mut result = Vec::new();
        if !self.items.contains(item) {
            return result;
        }
        if !exclude_self {
            result.push(item);
        }

        let mut visited = HashSet::from([item]);
        let mut stack = vec![item];
        while let Some(current) = stack.pop() {
            for child in self.direct_children(current) {
                if child == item {
                    self.report_structural(&item, format!("loop: {current:?} contains the traversal root"));
                    continue;
                }
                if !visited.insert(child) {
                    self.report_structural(&child, "reached twice during traversal");
                    continue;
                }
                if visited.len() > self.config.max_traversal_nodes {
                    self.report_structural(&item, "traversal node limit reached");
                    return result;
                }
                result.push(child);
                if include_grandchildren {
                    stack.push(child);
                }
            }
        }
        result
    }

    /// Walk up the parent chain. A repeated ancestor aborts the walk.
    pub fn get_all_parents(&self, item: ItemId, exclude_self: bool) -> Vec<ItemId> {
        let mut result = Vec::new();
        if !self.items.contains(item) {
            return result;
        }
        if !exclude_self {
            result.push(item);
        }

        let mut visited = HashSet::from([item]);
        let mut current = item;
        while let Some(parent) = self.parent_item(current) {
            if !visited.insert(parent) {
                self.report_configuration(&parent, format!("ancestor repeats above {item:?}"));
                break;
            }
            if visited.len() > self.config.max_tree_depth {
                self.report_structural(&item, "parent walk exceeded max tree depth");
                break;
            }
            result.push(parent);
            current = parent;
        }
        result
    }

    /// Topmost ancestor. Gives up after `max_tree_depth` hops and returns the
    /// deepest node reached.
    pub fn get_root(&self, item: ItemId) -> ItemId {
        let mut current = item;
        for _ in 0..self.config.max_tree_depth {
            match self.parent_of(current) {
                Some(parent) => current = parent,
                None => return current,
            }
        }
        if self.parent_of(current).is_some() {
            self.report_structural(&item, "root walk exceeded max tree depth");
        }
        current
    }

    /// Nearest character at or above `item`
    pub fn character_item(&self, item: ItemId) -> Option<ItemId> {
        self.get_all_parents(item, false)
            .into_iter()
            .find(|id| self.items.get(*id).is_some_and(|i| i.is_character))
    }

    pub fn resolve_target(&self, item: ItemId, target: RelativeTarget) -> Option<ItemId> {
        match target {
            RelativeTarget::SelfItem => self.items.contains(item).then_some(item),
            RelativeTarget::Parent => self.parent_item(item),
            RelativeTarget::Character => self.character_item(item),
        }
    }

    /// Whether placing `item` under `parent` would close a loop
    pub(crate) fn would_create_cycle(&self, item: ItemId, parent: ItemId) -> bool {
        self.get_all_parents(parent, false).contains(&item)
    }

    // -- Weight --

    /// Weight of the item, its inventory and everything plugged into it
    pub fn total_weight(&self, item: ItemId) -> f32 {
        self.item_weight(item, 0)
    }

    fn item_weight(&self, item: ItemId, depth: usize) -> f32 {
        let Some(it) = self.items.get(item) else {
            return 0.0;
        };
        if let Some(cached) = it.weight_cache.get() {
            return cached;
        }
        if depth > self.config.max_tree_depth {
            self.report_structural(&item, "weight walk exceeded max tree depth");
            return it.self_weight();
        }

        let mut total = it.self_weight();
        if let Some(inv) = it.inventory {
            total += self.contents_weight(inv, depth + 1);
        }
        if let Some(slots) = &it.slots {
            total += slots
                .contents()
                .map(|child| self.item_weight(child, depth + 1))
                .sum::<f32>();
        }
        it.weight_cache.set(Some(total));
        total
    }

    /// Summed weight of everything in an inventory
    pub fn inventory_weight(&self, inventory: InventoryId) -> f32 {
        self.contents_weight(inventory, 0)
    }

    fn contents_weight(&self, inventory: InventoryId, depth: usize) -> f32 {
        let Some(inv) = self.inventories.get(inventory) else {
            return 0.0;
        };
        if let Some(cached) = inv.weight_cache.get() {
            return cached;
        }
        let total = inv.iter().map(|(_, id)| self.item_weight(id, depth)).sum();
        inv.weight_cache.set(Some(total));
        total
    }

    /// Drop cached weights from `item` up to the root
    pub(crate) fn notify_child_changed(&self, item: ItemId) {
        let mut current = item;
        for _ in 0..=self.config.max_tree_depth {
            let Some(it) = self.items.get(current) else {
                return;
            };
            it.invalidate_weight();
            if let Some(inv) = it.in_inventory.and_then(|id| self.inventories.get(id)) {
                inv.invalidate_weight();
            }
            match self.parent_of(current) {
                Some(parent) if parent != item => current = parent,
                _ => return,
            }
        }
        self.report_structural(&item, "invalidation walk exceeded max tree depth");
    }

    /// Drop an inventory's cached weight and everything above it
    pub(crate) fn invalidate_inventory(&self, inventory: InventoryId) {
        if let Some(inv) = self.inventories.get(inventory) {
            inv.invalidate_weight();
            if let Some(owner) = inv.owner() {
                self.notify_child_changed(owner);
            }
        }
    }
}
