use crate::handle::{Handle, HandleAllocator};

/// Slot storage addressed by generational handles.
///
/// Values never move once inserted; a removed slot is recycled with a bumped
/// generation, so stale handles resolve to `None` instead of aliasing the new value.
#[derive(Debug)]
pub struct Arena<T> {
    allocator: HandleAllocator,
    slots: Vec<Option<T>>,
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self {
            allocator: HandleAllocator::new(),
            slots: Vec::new(),
        }
    }

    /// Store a value and return its handle.
    pub fn insert(&mut self, value: T) -> Handle<T> {
        let handle: Handle<T> = self.allocator.allocate();
        let idx = handle.index() as usize;
        if idx >= self.slots.len() {
            self.slots.resize_with(idx + 1, || None);
        }
        self.slots[idx] = Some(value);
        handle
    }

    /// Remove a value, returning it if the handle was alive.
    pub fn remove(&mut self, handle: Handle<T>) -> Option<T> {
        if !self.allocator.deallocate(handle) {
            return None;
        }
        self.slots[handle.index() as usize].take()
    }

    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        if !self.allocator.is_alive(handle) {
            return None;
        }
        self.slots.get(handle.index() as usize)?.as_ref()
    }

    pub fn get_mut(&mut self, handle: Handle<T>) -> Option<&mut T> {
        if !self.allocator.is_alive(handle) {
            return None;
        }
        self.slots.get_mut(handle.index() as usize)?.as_mut()
    }

    /// Whether the handle still addresses a live value.
    pub fn contains(&self, handle: Handle<T>) -> bool {
        self.allocator.is_alive(handle)
    }

    /// Iterate over all `(handle, &value)` pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (Handle<T>, &T)> + '_ {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            let value = slot.as_ref()?;
            let handle = self.allocator.handle_at(i as u32)?;
            Some((handle, value))
        })
    }

    /// Snapshot of all live handles, in slot order.
    pub fn handles(&self) -> Vec<Handle<T>> {
        self.iter().map(|(h, _)| h).collect()
    }

    /// Number of live values.
    pub fn len(&self) -> usize {
        self.allocator.len()
    }

    pub fn is_empty(&self) -> bool {
        self.allocator.is_empty()
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Crate(&'static str);

    #[test]
    fn insert_get_remove() {
        let mut arena = Arena::new();
        let a = arena.insert(Crate("ammo"));
        let b = arena.insert(Crate("bandage"));
        assert_eq!(arena.get(a), Some(&Crate("ammo")));
        assert_eq!(arena.len(), 2);
        assert_eq!(arena.remove(a), Some(Crate("ammo")));
        assert!(!arena.contains(a));
        assert!(arena.contains(b));
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn stale_handle_does_not_alias() {
        let mut arena = Arena::new();
        let old = arena.insert(Crate("old"));
        arena.remove(old);
        let new = arena.insert(Crate("new"));
        assert_eq!(old.index(), new.index());
        assert_eq!(arena.get(old), None);
        assert_eq!(arena.get(new), Some(&Crate("new")));
        assert_eq!(arena.remove(old), None);
    }

    #[test]
    fn iter_skips_removed() {
        let mut arena = Arena::new();
        let a = arena.insert(Crate("a"));
        let b = arena.insert(Crate("b"));
        let c = arena.insert(Crate("c"));
        arena.remove(b);
        assert_eq!(arena.handles(), vec![a, c]);
    }

    #[test]
    fn get_mut_mutates() {
        let mut arena = Arena::new();
        let a = arena.insert(Crate("a"));
        arena.get_mut(a).unwrap().0 = "z";
        assert_eq!(arena.get(a), Some(&Crate("z")));
    }
}
