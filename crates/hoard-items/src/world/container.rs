//! Inventory and slot operations, detaching and destruction

use tracing::{debug, warn};

use super::ItemWorld;
use crate::error::ItemError;
use crate::events::ItemEvent;
use crate::item::{Inventory, InventoryId, ItemId, ItemTypeId, SlotRef};

impl ItemWorld {
    /// Create an inventory, optionally attached to an owner item.
    /// An owner that already has one keeps it (reported).
    pub fn create_inventory(&mut self, owner: Option<ItemId>, capacity: usize) -> Result<InventoryId, ItemError> {
        if let Some(owner) = owner {
            if let Some(existing) = self.get(owner)?.inventory {
                self.report_configuration(&owner, format!("already owns inventory {existing:?}"));
                return Ok(existing);
            }
        }
        let id = self.inventories.insert(Inventory::new(owner, capacity));
        if let Some(item) = owner.and_then(|o| self.items.get_mut(o)) {
            item.inventory = Some(id);
        }
        Ok(id)
    }

    /// Put a parentless item at a specific position
    pub fn add_at(&mut self, inventory: InventoryId, item: ItemId, index: usize) -> Result<(), ItemError> {
        let inv = self
            .inventories
            .get(inventory)
            .ok_or(ItemError::InventoryNotFound(inventory))?;
        let it = self.get(item)?;
        if index >= inv.capacity() {
            return Err(ItemError::IndexOutOfRange {
                index,
                capacity: inv.capacity(),
            });
        }
        if let Some(occupant) = inv.get(index) {
            return Err(ItemError::PositionOccupied { index, occupant });
        }
        if it.has_parent_link() {
            return Err(ItemError::AlreadyParented(item));
        }
        if let Some(owner) = inv.owner() {
            if self.would_create_cycle(item, owner) {
                return Err(ItemError::WouldCreateCycle { item, parent: owner });
            }
        }

        if let Some(inv) = self.inventories.get_mut(inventory) {
            inv.place(index, item);
        }
        if let Some(it) = self.items.get_mut(item) {
            it.in_inventory = Some(inventory);
        }
        self.invalidate_inventory(inventory);
        self.emit(ItemEvent::ContentChanged {
            inventory,
            index: Some(index),
        });
        self.emit(ItemEvent::ParentChanged { item });
        self.on_tree_changed(item);
        Ok(())
    }

    /// Put a parentless item in the first empty position
    pub fn add_item(&mut self, inventory: InventoryId, item: ItemId) -> Result<usize, ItemError> {
        let inv = self
            .inventories
            .get(inventory)
            .ok_or(ItemError::InventoryNotFound(inventory))?;
        let index = inv.first_empty(0).ok_or(ItemError::CapacityExceeded {
            capacity: inv.capacity(),
        })?;
        self.add_at(inventory, item, index)?;
        Ok(index)
    }

    /// Top up existing stacks of the same type, then place what's left.
    /// Returns the position of the remainder, `None` if it was fully absorbed
    /// (the item is destroyed).
    pub fn add_and_merge(&mut self, inventory: InventoryId, item: ItemId) -> Result<Option<usize>, ItemError> {
        let inv = self
            .inventories
            .get(inventory)
            .ok_or(ItemError::InventoryNotFound(inventory))?;
        let it = self.get(item)?;
        if it.has_parent_link() {
            return Err(ItemError::AlreadyParented(item));
        }
        if !it.is_stackable() {
            return self.add_item(inventory, item).map(Some);
        }

        let targets: Vec<ItemId> = inv
            .iter()
            .map(|(_, id)| id)
            .filter(|id| {
                self.items
                    .get(*id)
                    .is_some_and(|o| o.type_id() == it.type_id() && o.stack_space() > 0)
            })
            .collect();
        let room: u32 = targets
            .iter()
            .filter_map(|id| self.items.get(*id))
            .map(|o| o.stack_space())
            .sum();
        if room < it.stack_count() && inv.first_empty(0).is_none() {
            return Err(ItemError::CapacityExceeded {
                capacity: inv.capacity(),
            });
        }
        if let Some(owner) = inv.owner() {
            if self.would_create_cycle(item, owner) {
                return Err(ItemError::WouldCreateCycle { item, parent: owner });
            }
        }

        for target in targets {
            self.combine(target, item)?;
            if !self.contains(item) {
                return Ok(None);
            }
        }
        self.add_item(inventory, item).map(Some)
    }

    /// Take whatever sits at `index`. The item is left parentless.
    pub fn remove_at(&mut self, inventory: InventoryId, index: usize) -> Result<Option<ItemId>, ItemError> {
        let inv = self
            .inventories
            .get_mut(inventory)
            .ok_or(ItemError::InventoryNotFound(inventory))?;
        if index >= inv.capacity() {
            return Err(ItemError::IndexOutOfRange {
                index,
                capacity: inv.capacity(),
            });
        }
        let Some(item) = inv.take(index) else {
            return Ok(None);
        };
        if let Some(it) = self.items.get_mut(item) {
            it.in_inventory = None;
        }
        self.invalidate_inventory(inventory);
        self.emit(ItemEvent::ContentChanged {
            inventory,
            index: Some(index),
        });
        self.emit(ItemEvent::ParentChanged { item });
        self.on_tree_changed(item);
        Ok(Some(item))
    }

    /// Remove a specific item. Returns the position it was at.
    pub fn remove_item(&mut self, inventory: InventoryId, item: ItemId) -> Result<usize, ItemError> {
        let index = self
            .inventories
            .get(inventory)
            .ok_or(ItemError::InventoryNotFound(inventory))?
            .position_of(item)
            .ok_or(ItemError::NotInInventory { item, inventory })?;
        self.remove_at(inventory, index)?;
        Ok(index)
    }

    /// Lock or unlock a position against sorting. Returns `true` if the state changed.
    pub fn set_locked(&mut self, inventory: InventoryId, index: usize, locked: bool) -> Result<bool, ItemError> {
        let inv = self
            .inventories
            .get_mut(inventory)
            .ok_or(ItemError::InventoryNotFound(inventory))?;
        if index >= inv.capacity() {
            return Err(ItemError::IndexOutOfRange {
                index,
                capacity: inv.capacity(),
            });
        }
        Ok(inv.set_locked(index, locked))
    }

    /// Items of one type, in position order
    pub fn find_type(&self, inventory: InventoryId, type_id: ItemTypeId) -> Vec<ItemId> {
        let Some(inv) = self.inventories.get(inventory) else {
            return Vec::new();
        };
        inv.iter()
            .map(|(_, id)| id)
            .filter(|id| self.items.get(*id).is_some_and(|i| i.type_id() == type_id))
            .collect()
    }

    // -- Slots --

    /// Plug a parentless item into a slot. Returns the item it displaced,
    /// which is left parentless.
    pub fn plug(&mut self, owner: ItemId, key: &str, item: ItemId) -> Result<Option<ItemId>, ItemError> {
        let owner_item = self.get(owner)?;
        let it = self.get(item)?;
        let slot = owner_item.slot(key).ok_or_else(|| ItemError::SlotNotFound {
            item: owner,
            key: key.to_string(),
        })?;
        if it.has_parent_link() {
            self.report_configuration(
                &item,
                format!("already has a parent; refusing to also plug it into '{key}' of {owner:?}"),
            );
            return Err(ItemError::AlreadyParented(item));
        }
        if self.would_create_cycle(item, owner) {
            return Err(ItemError::WouldCreateCycle { item, parent: owner });
        }
        slot.can_plug(it, owner_item.type_id())
            .map_err(|rejection| ItemError::SlotRejected {
                key: key.to_string(),
                item,
                reason: rejection.reason(),
            })?;
        let displaced = slot.content();

        if let Some(slot) = self.slot_mut(owner, key) {
            slot.content = Some(item);
        }
        if let Some(old) = displaced.and_then(|id| self.items.get_mut(id)) {
            old.plugged_into = None;
        }
        if let Some(it) = self.items.get_mut(item) {
            it.plugged_into = Some(SlotRef {
                owner,
                key: key.to_string(),
            });
        }
        self.notify_child_changed(owner);
        self.emit(ItemEvent::SlotContentChanged {
            item: owner,
            slot: key.to_string(),
        });
        if let Some(old) = displaced {
            self.emit(ItemEvent::ParentChanged { item: old });
            self.on_tree_changed(old);
        }
        self.emit(ItemEvent::ParentChanged { item });
        self.on_tree_changed(item);
        debug!(owner = ?owner, slot = key, item = ?item, "plugged");
        Ok(displaced)
    }

    /// Empty a slot. Returns the item that was in it.
    pub fn unplug(&mut self, owner: ItemId, key: &str) -> Result<Option<ItemId>, ItemError> {
        let slot = self.get(owner)?.slot(key).ok_or_else(|| ItemError::SlotNotFound {
            item: owner,
            key: key.to_string(),
        })?;
        let Some(item) = slot.content() else {
            return Ok(None);
        };

        if let Some(slot) = self.slot_mut(owner, key) {
            slot.content = None;
        }
        if let Some(it) = self.items.get_mut(item) {
            it.plugged_into = None;
        }
        self.notify_child_changed(owner);
        self.emit(ItemEvent::SlotContentChanged {
            item: owner,
            slot: key.to_string(),
        });
        self.emit(ItemEvent::ParentChanged { item });
        self.on_tree_changed(item);
        Ok(Some(item))
    }

    fn slot_mut(&mut self, owner: ItemId, key: &str) -> Option<&mut crate::item::Slot> {
        self.items.get_mut(owner)?.slots.as_mut()?.get_mut(key)
    }

    /// Unplug from its slot and remove from its inventory
    pub fn detach(&mut self, item: ItemId) -> Result<(), ItemError> {
        let it = self.get(item)?;
        let plugged = it.plugged_into.clone();
        let inventory = it.in_inventory;

        if let Some(SlotRef { owner, key }) = plugged {
            let holds_item = self
                .item(owner)
                .and_then(|o| o.slot(&key))
                .and_then(|s| s.content())
                == Some(item);
            if holds_item {
                self.unplug(owner, &key)?;
            } else {
                self.report_configuration(&item, format!("linked to slot '{key}' of {owner:?}, which doesn't hold it"));
                if let Some(it) = self.items.get_mut(item) {
                    it.plugged_into = None;
                }
            }
        }

        if let Some(inventory) = inventory {
            let listed = self
                .inventories
                .get(inventory)
                .and_then(|inv| inv.position_of(item))
                .is_some();
            if listed {
                self.remove_item(inventory, item)?;
            } else {
                self.report_configuration(&item, format!("linked to inventory {inventory:?}, which doesn't list it"));
                if let Some(it) = self.items.get_mut(item) {
                    it.in_inventory = None;
                }
            }
        }
        Ok(())
    }

    /// Detach and destroy an item with everything below it
    pub fn destroy(&mut self, item: ItemId) -> Result<(), ItemError> {
        self.get(item)?;
        self.detach(item)?;
        self.destroy_tree(item);
        Ok(())
    }

    /// Destroy an item and everything in its inventory and slots.
    /// The item should already be detached; if it isn't, that is reported
    /// and it is detached first.
    pub fn destroy_tree(&mut self, item: ItemId) {
        let Some(it) = self.items.get(item) else {
            return;
        };
        if it.being_destroyed {
            return;
        }
        if it.has_parent_link() {
            self.report_configuration(&item, "destroyed while still attached");
            if let Err(err) = self.detach(item) {
                warn!(item = ?item, %err, "detach before destroy failed");
            }
        }

        let doomed = self.get_all_children(item, true, false);
        for id in &doomed {
            if let Some(it) = self.items.get_mut(*id) {
                it.being_destroyed = true;
            }
        }
        // Pull back everything the tree applied to items outside it
        for id in doomed.iter().rev() {
            self.handle_effects_active(*id);
            self.refresh_descriptions(*id);
        }
        for id in doomed.iter().rev() {
            if let Some(removed) = self.items.remove(*id) {
                if let Some(inv) = removed.inventory {
                    self.inventories.remove(inv);
                }
                self.emit(ItemEvent::Destroyed { item: *id });
            }
        }
        debug!(item = ?item, count = doomed.len(), "destroyed tree");
    }

    /// Re-evaluate everything that depends on where `item` sits. Items below
    /// it keep their activity but may now resolve a different parent or
    /// character.
    pub(crate) fn on_tree_changed(&mut self, item: ItemId) {
        self.handle_effects_active(item);
        for id in self.get_all_children(item, true, false) {
            self.refresh_descriptions(id);
            self.retarget_effects(id);
            self.emit(ItemEvent::ItemTreeChanged { item: id });
        }
    }
}
