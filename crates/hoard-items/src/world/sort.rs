//! Inventory sorting and stack consolidation

use tracing::debug;

use super::ItemWorld;
use crate::error::ItemError;
use crate::events::ItemEvent;
use crate::item::{InventoryId, ItemId, ItemTypeId};

/// Sort key of a tag group. Untagged items come first.
fn tag_key(world: &ItemWorld, tag: Option<&str>) -> (i32, String) {
    match tag {
        Some(tag) => (world.tags().priority(tag), tag.to_lowercase()),
        None => (-1, String::new()),
    }
}

impl ItemWorld {
    /// Sort the unlocked positions of an inventory.
    ///
    /// Items are grouped by first tag (tag priority, then name), then by type
    /// (catalog order, then type id). Stackable types are merged into as few
    /// stacks as possible. Locked positions keep their item.
    pub fn sort_inventory(&mut self, inventory: InventoryId) -> Result<(), ItemError> {
        let inv = self
            .inventories
            .get(inventory)
            .ok_or(ItemError::InventoryNotFound(inventory))?;
        let pulled: Vec<(usize, ItemId)> = inv.iter().filter(|(i, _)| !inv.is_locked(*i)).collect();
        if pulled.is_empty() {
            return Ok(());
        }

        // Pull everything out; links are restored on reinsertion
        if let Some(inv) = self.inventories.get_mut(inventory) {
            for (index, _) in &pulled {
                inv.take(*index);
            }
        }
        for (_, id) in &pulled {
            if let Some(it) = self.items.get_mut(*id) {
                it.in_inventory = None;
            }
        }

        // Group by first tag, keeping first-seen order within a group
        let mut groups: Vec<(Option<String>, Vec<ItemId>)> = Vec::new();
        for (_, id) in &pulled {
            let tag = self.items.get(*id).and_then(|i| i.first_tag()).map(str::to_string);
            match groups.iter_mut().find(|(t, _)| *t == tag) {
                Some((_, members)) => members.push(*id),
                None => groups.push((tag, vec![*id])),
            }
        }
        let world = &*self;
        groups.sort_by_cached_key(|(tag, _)| tag_key(world, tag.as_deref()));

        let mut sorted = Vec::with_capacity(pulled.len());
        for (_, members) in groups {
            let mut by_type: Vec<(ItemTypeId, i32, Vec<ItemId>)> = Vec::new();
            for id in members {
                let Some(it) = self.items.get(id) else {
                    continue;
                };
                match by_type.iter_mut().find(|(t, _, _)| *t == it.type_id()) {
                    Some((_, _, items)) => items.push(id),
                    None => by_type.push((it.type_id(), it.order, vec![id])),
                }
            }
            by_type.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)));

            for (_, _, items) in by_type {
                let stackable = items
                    .first()
                    .and_then(|id| self.items.get(*id))
                    .is_some_and(|i| i.is_stackable());
                if stackable {
                    sorted.extend(self.merge_stacks(items));
                } else {
                    sorted.extend(items);
                }
            }
        }

        // Refill unlocked holes in ascending order
        let mut cursor = 0;
        for id in sorted {
            let slot = self
                .inventories
                .get(inventory)
                .and_then(|inv| inv.first_empty_unlocked(cursor));
            let Some(index) = slot else {
                self.report_configuration(&inventory, format!("no unlocked position left for {id:?} after sorting"));
                continue;
            };
            if let Some(inv) = self.inventories.get_mut(inventory) {
                inv.place(index, id);
            }
            if let Some(it) = self.items.get_mut(id) {
                it.in_inventory = Some(inventory);
            }
            cursor = index + 1;
        }

        self.invalidate_inventory(inventory);
        self.emit(ItemEvent::ContentChanged { inventory, index: None });
        debug!(inventory = ?inventory, items = pulled.len(), "sorted inventory");
        Ok(())
    }

    /// Consolidate same-type stacks into as few items as possible.
    ///
    /// Items are treated as a stack: pop an accumulator, pop donors into it
    /// until it is full. A donor with stack left over becomes the next
    /// accumulator. Emptied donors are destroyed. A failed combine is
    /// reported and only that donor is kept aside unmerged.
    pub fn merge_stacks(&mut self, items: Vec<ItemId>) -> Vec<ItemId> {
        let mut pending = items;
        let mut merged = Vec::new();
        let Some(mut accumulator) = pending.pop() else {
            return merged;
        };

        loop {
            while self.items.get(accumulator).is_some_and(|i| i.stack_space() > 0) {
                let Some(donor) = pending.pop() else {
                    break;
                };
                match self.combine(accumulator, donor) {
                    Ok(_) if self.contains(donor) => {
                        merged.push(accumulator);
                        accumulator = donor;
                    }
                    Ok(_) => {}
                    Err(err) => {
                        self.report_configuration(&donor, format!("merge into {accumulator:?} aborted: {err}"));
                        merged.push(donor);
                    }
                }
            }
            merged.push(accumulator);
            match pending.pop() {
                Some(next) => accumulator = next,
                None => break,
            }
        }
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ItemTemplate;

    fn make_world() -> ItemWorld {
        let mut world = ItemWorld::default();
        world.tags_mut().register("weapon", 1, "Weapon");
        world.tags_mut().register("ammo", 2, "Ammo");
        world.tags_mut().register("food", 2, "Food");
        world.tags_mut().register("Bolts", 2, "Bolts");
        world
    }

    fn make_bag(world: &mut ItemWorld, capacity: usize) -> InventoryId {
        let bag = world.spawn(&ItemTemplate::new(ItemTypeId(100), "Bag").inventory(capacity));
        world.item(bag).unwrap().inventory().unwrap()
    }

    fn spawn_in(world: &mut ItemWorld, inv: InventoryId, index: usize, template: ItemTemplate) -> ItemId {
        let id = world.spawn(&template);
        world.add_at(inv, id, index).unwrap();
        id
    }

    fn ammo(stack: u32) -> ItemTemplate {
        ItemTemplate::new(ItemTypeId(5), "Ammo").tag("ammo").stackable(10).stack(stack)
    }

    fn contents(world: &ItemWorld, inv: InventoryId) -> Vec<Option<ItemId>> {
        let inv = world.inventory(inv).unwrap();
        (0..inv.len()).map(|i| inv.get(i)).collect()
    }

    #[test]
    fn test_merge_conservation() {
        let mut world = make_world();
        let stacks = [3, 7, 9, 1, 10, 4];
        let ids: Vec<_> = stacks.iter().map(|s| world.spawn(&ammo(*s))).collect();
        let merged = world.merge_stacks(ids);

        let total: u32 = stacks.iter().sum();
        assert_eq!(merged.len() as u32, total.div_ceil(10));
        let counts: Vec<u32> = merged.iter().map(|id| world.item(*id).unwrap().stack_count()).collect();
        assert_eq!(counts.iter().sum::<u32>(), total);
        assert_eq!(world.item_count(), merged.len());
    }

    #[test]
    fn test_merge_four_and_nine() {
        let mut world = make_world();
        let a = world.spawn(&ammo(4));
        let b = world.spawn(&ammo(9));
        let merged = world.merge_stacks(vec![a, b]);
        let counts: Vec<u32> = merged.iter().map(|id| world.item(*id).unwrap().stack_count()).collect();
        assert_eq!(counts, vec![10, 3]);
    }

    #[test]
    fn test_merge_mismatch_keeps_donor() {
        let mut world = make_world();
        let a = world.spawn(&ammo(4));
        let odd = world.spawn(&ItemTemplate::new(ItemTypeId(6), "Shells").stackable(10).stack(2));
        let b = world.spawn(&ammo(3));
        let merged = world.merge_stacks(vec![a, odd, b]);
        assert_eq!(merged.len(), 2);
        assert!(merged.contains(&odd));
        assert_eq!(world.item(b).unwrap().stack_count(), 7);
        assert_eq!(world.diagnostics().count(hoard_core::DiagnosticKind::Configuration), 1);
    }

    #[test]
    fn test_sort_groups_by_tag_then_type() {
        let mut world = make_world();
        let inv = make_bag(&mut world, 8);
        let bread = spawn_in(&mut world, inv, 0, ItemTemplate::new(ItemTypeId(30), "Bread").tag("food"));
        let rounds = spawn_in(&mut world, inv, 1, ammo(5));
        let knife = spawn_in(&mut world, inv, 3, ItemTemplate::new(ItemTypeId(21), "Knife").tag("weapon"));
        let junk = spawn_in(&mut world, inv, 4, ItemTemplate::new(ItemTypeId(40), "Junk"));
        let axe = spawn_in(&mut world, inv, 5, ItemTemplate::new(ItemTypeId(20), "Axe").tag("weapon").order(-1));
        let more = spawn_in(&mut world, inv, 6, ammo(2));

        world.sort_inventory(inv).unwrap();

        // untagged, weapons (axe by order), merged ammo, then food (same priority as ammo, later name)
        assert_eq!(
            contents(&world, inv),
            vec![Some(junk), Some(axe), Some(knife), Some(more), Some(bread)]
        );
        assert!(!world.contains(rounds));
        assert_eq!(world.item(more).unwrap().stack_count(), 7);
        assert_eq!(world.item(axe).unwrap().in_inventory(), Some(inv));
    }

    #[test]
    fn test_sort_keeps_locked() {
        let mut world = make_world();
        let inv = make_bag(&mut world, 6);
        let bread = spawn_in(&mut world, inv, 0, ItemTemplate::new(ItemTypeId(30), "Bread").tag("food"));
        let knife = spawn_in(&mut world, inv, 1, ItemTemplate::new(ItemTypeId(21), "Knife").tag("weapon"));
        let rounds = spawn_in(&mut world, inv, 2, ammo(5));
        let junk = spawn_in(&mut world, inv, 4, ItemTemplate::new(ItemTypeId(40), "Junk"));
        world.set_locked(inv, 0, true).unwrap();
        world.set_locked(inv, 2, true).unwrap();

        world.sort_inventory(inv).unwrap();

        let after = contents(&world, inv);
        assert_eq!(after[0], Some(bread));
        assert_eq!(after[2], Some(rounds));
        assert_eq!(after[1], Some(junk));
        assert_eq!(after[3], Some(knife));
    }

    #[test]
    fn test_sort_emits_whole_inventory_change() {
        let mut world = make_world();
        let inv = make_bag(&mut world, 4);
        spawn_in(&mut world, inv, 2, ItemTemplate::new(ItemTypeId(40), "Junk"));
        let log = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let sink = log.clone();
        world.subscribe(move |e| sink.borrow_mut().push(e.clone()));

        world.sort_inventory(inv).unwrap();
        assert_eq!(
            *log.borrow(),
            vec![ItemEvent::ContentChanged { inventory: inv, index: None }]
        );
        assert_eq!(world.inventory(inv).unwrap().len(), 1);
    }

    #[test]
    fn test_tag_key_order() {
        let world = make_world();
        assert!(tag_key(&world, None) < tag_key(&world, Some("weapon")));
        assert!(tag_key(&world, Some("weapon")) < tag_key(&world, Some("ammo")));
        // same priority: case-insensitive name
        assert!(tag_key(&world, Some("ammo")) < tag_key(&world, Some("Bolts")));
        assert!(tag_key(&world, Some("Bolts")) < tag_key(&world, Some("food")));
    }
}
