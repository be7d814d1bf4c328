//! Inventory container
//!
//! A sparse, fixed-capacity sequence of item handles. Locked positions are
//! left alone by sorting.

use std::cell::Cell;
use std::collections::BTreeSet;

use super::ItemId;

/// Ordered, bounded, sparse item container
#[derive(Debug, Clone)]
pub struct Inventory {
    owner: Option<ItemId>,
    capacity: usize,
    /// `None` entries are holes. Never longer than `capacity`, no trailing holes.
    content: Vec<Option<ItemId>>,
    locked: BTreeSet<usize>,
    pub(crate) weight_cache: Cell<Option<f32>>,
}

impl Inventory {
    pub fn new(owner: Option<ItemId>, capacity: usize) -> Self {
        Self {
            owner,
            capacity,
            content: Vec::new(),
            locked: BTreeSet::new(),
            weight_cache: Cell::new(None),
        }
    }

    /// The item this inventory belongs to
    pub fn owner(&self) -> Option<ItemId> {
        self.owner
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Length of the content list, holes included
    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<ItemId> {
        self.content.get(index).copied().flatten()
    }

    /// Occupied positions in index order
    pub fn iter(&self) -> impl Iterator<Item = (usize, ItemId)> + '_ {
        self.content
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.map(|id| (i, id)))
    }

    pub fn items(&self) -> Vec<ItemId> {
        self.iter().map(|(_, id)| id).collect()
    }

    pub fn occupied(&self) -> usize {
        self.content.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_full(&self) -> bool {
        self.occupied() >= self.capacity
    }

    pub fn position_of(&self, item: ItemId) -> Option<usize> {
        self.content.iter().position(|s| *s == Some(item))
    }

    /// First empty position at or after `from`, holes first, then the tail
    pub fn first_empty(&self, from: usize) -> Option<usize> {
        (from..self.capacity).find(|&i| self.get(i).is_none())
    }

    /// First empty position that isn't locked
    pub fn first_empty_unlocked(&self, from: usize) -> Option<usize> {
        (from..self.capacity).find(|&i| self.get(i).is_none() && !self.is_locked(i))
    }

    pub fn is_locked(&self, index: usize) -> bool {
        self.locked.contains(&index)
    }

    pub fn locked_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.locked.iter().copied()
    }

    pub(crate) fn set_locked(&mut self, index: usize, locked: bool) -> bool {
        if locked {
            self.locked.insert(index)
        } else {
            self.locked.remove(&index)
        }
    }

    /// Put an item at `index`. Caller checks bounds and occupancy.
    pub(crate) fn place(&mut self, index: usize, item: ItemId) {
        if index >= self.content.len() {
            self.content.resize(index + 1, None);
        }
        self.content[index] = Some(item);
    }

    /// Take the item at `index`, trimming trailing holes
    pub(crate) fn take(&mut self, index: usize) -> Option<ItemId> {
        let taken = self.content.get_mut(index)?.take();
        self.trim();
        taken
    }

    fn trim(&mut self) {
        while matches!(self.content.last(), Some(None)) {
            self.content.pop();
        }
    }

    pub(crate) fn invalidate_weight(&self) {
        self.weight_cache.set(None);
    }
}
