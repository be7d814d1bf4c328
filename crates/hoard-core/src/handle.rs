use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

/// A generational handle into an [`Arena`](crate::Arena). Compact u32 index + generation,
/// typed by the value it points at so an item handle can't address an inventory.
#[derive(Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Handle<T> {
    index: u32,
    generation: u32,
    #[serde(skip)]
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    /// Create a handle from raw parts (mainly for testing).
    pub const fn from_raw(index: u32, generation: u32) -> Self {
        Self {
            index,
            generation,
            _marker: PhantomData,
        }
    }

    /// The slot index of this handle.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// The generation of this handle (incremented on slot reuse).
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

// Manual impls: derives would put bounds on `T`.
impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
        self.generation.hash(state);
    }
}

impl<T> PartialOrd for Handle<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Handle<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.index, self.generation).cmp(&(other.index, other.generation))
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = std::any::type_name::<T>();
        let short = name.rsplit("::").next().unwrap_or(name);
        write!(f, "{}({}v{})", short, self.index, self.generation)
    }
}

impl<T> fmt::Display for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// Allocates and recycles slots with generational tracking.
#[derive(Debug, Default)]
pub struct HandleAllocator {
    generations: Vec<u32>,
    alive: Vec<bool>,
    free_list: Vec<u32>,
    len: usize,
}

impl HandleAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new handle, reusing a freed slot if available.
    pub fn allocate<T>(&mut self) -> Handle<T> {
        self.len += 1;
        if let Some(index) = self.free_list.pop() {
            self.alive[index as usize] = true;
            Handle::from_raw(index, self.generations[index as usize])
        } else {
            let index = self.generations.len() as u32;
            self.generations.push(0);
            self.alive.push(true);
            Handle::from_raw(index, 0)
        }
    }

    /// Deallocate a handle. Returns `true` if it was alive.
    pub fn deallocate<T>(&mut self, handle: Handle<T>) -> bool {
        if !self.is_alive(handle) {
            return false;
        }
        let idx = handle.index as usize;
        self.alive[idx] = false;
        self.generations[idx] += 1;
        self.free_list.push(handle.index);
        self.len -= 1;
        true
    }

    /// Check if a handle is currently alive.
    pub fn is_alive<T>(&self, handle: Handle<T>) -> bool {
        let idx = handle.index as usize;
        idx < self.alive.len() && self.alive[idx] && self.generations[idx] == handle.generation
    }

    /// The live handle occupying `index`, if any.
    pub fn handle_at<T>(&self, index: u32) -> Option<Handle<T>> {
        let idx = index as usize;
        if idx < self.alive.len() && self.alive[idx] {
            Some(Handle::from_raw(index, self.generations[idx]))
        } else {
            None
        }
    }

    /// Number of currently alive handles.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether there are no alive handles.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Marker;

    #[test]
    fn allocate_sequential() {
        let mut alloc = HandleAllocator::new();
        let h0: Handle<Marker> = alloc.allocate();
        let h1: Handle<Marker> = alloc.allocate();
        assert_eq!(h0.index(), 0);
        assert_eq!(h1.index(), 1);
        assert_eq!(h0.generation(), 0);
        assert_eq!(alloc.len(), 2);
    }

    #[test]
    fn deallocate_and_reuse() {
        let mut alloc = HandleAllocator::new();
        let h0: Handle<Marker> = alloc.allocate();
        assert!(alloc.deallocate(h0));
        let reused: Handle<Marker> = alloc.allocate();
        assert_eq!(reused.index(), 0);
        assert_eq!(reused.generation(), 1);
        assert_ne!(h0, reused);
    }

    #[test]
    fn double_deallocate_fails() {
        let mut alloc = HandleAllocator::new();
        let h: Handle<Marker> = alloc.allocate();
        assert!(alloc.deallocate(h));
        assert!(!alloc.deallocate(h));
    }

    #[test]
    fn debug_uses_type_name() {
        let h: Handle<Marker> = Handle::from_raw(3, 1);
        assert_eq!(format!("{h:?}"), "Marker(3v1)");
        assert_eq!(h.to_string(), "3v1");
    }
}
