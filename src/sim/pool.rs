//! Fixed-capacity entity arena
//!
//! Slots are reused in place; capacity never grows. Insertion takes the first
//! empty slot, so iteration order is slot order and stays deterministic.

use serde::{Deserialize, Serialize};

/// Index of an occupied slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Handle(usize);

impl Handle {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// State of one pool slot
#[derive(Debug, Clone, PartialEq)]
pub enum Slot<T> {
    Empty,
    Occupied(T),
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Slot::Empty
    }
}

impl<T> Slot<T> {
    pub fn is_occupied(&self) -> bool {
        matches!(self, Slot::Occupied(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Slot::Occupied(value) => Some(value),
            Slot::Empty => None,
        }
    }

    pub fn value_mut(&mut self) -> Option<&mut T> {
        match self {
            Slot::Occupied(value) => Some(value),
            Slot::Empty => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SlotPool<T, const N: usize> {
    slots: [Slot<T>; N],
}

impl<T, const N: usize> Default for SlotPool<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> SlotPool<T, N> {
    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| Slot::Empty),
        }
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of occupied slots
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_occupied()).count()
    }

    pub fn is_empty(&self) -> bool {
        !self.slots.iter().any(Slot::is_occupied)
    }

    pub fn is_full(&self) -> bool {
        self.slots.iter().all(Slot::is_occupied)
    }

    /// Handle the next `insert` would use, if any slot is free
    pub fn first_free(&self) -> Option<Handle> {
        self.slots
            .iter()
            .position(|s| !s.is_occupied())
            .map(Handle)
    }

    /// Place a value in the first empty slot. Returns `None` (and drops the
    /// value) when the pool is full.
    pub fn insert(&mut self, value: T) -> Option<Handle> {
        let handle = self.first_free()?;
        self.slots[handle.0] = Slot::Occupied(value);
        Some(handle)
    }

    pub fn remove(&mut self, handle: Handle) -> Option<T> {
        let slot = self.slots.get_mut(handle.0)?;
        match std::mem::replace(slot, Slot::Empty) {
            Slot::Occupied(value) => Some(value),
            Slot::Empty => None,
        }
    }

    pub fn get(&self, handle: Handle) -> Option<&T> {
        self.slots.get(handle.0).and_then(Slot::value)
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        self.slots.get_mut(handle.0).and_then(Slot::value_mut)
    }

    /// Empty every slot
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = Slot::Empty;
        }
    }

    /// Occupied entries in slot order
    pub fn iter(&self) -> impl Iterator<Item = (Handle, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.value().map(|v| (Handle(i), v)))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Handle, &mut T)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(i, s)| s.value_mut().map(|v| (Handle(i), v)))
    }

    /// Empty every slot whose value fails the predicate
    pub fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) {
        for slot in &mut self.slots {
            let evict = match slot {
                Slot::Occupied(value) => !keep(value),
                Slot::Empty => false,
            };
            if evict {
                *slot = Slot::Empty;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_until_full() {
        let mut pool: SlotPool<u32, 3> = SlotPool::new();
        assert!(pool.is_empty());
        assert_eq!(pool.insert(1).map(Handle::index), Some(0));
        assert_eq!(pool.insert(2).map(Handle::index), Some(1));
        assert_eq!(pool.insert(3).map(Handle::index), Some(2));
        assert!(pool.is_full());
        assert_eq!(pool.insert(4), None);
        assert_eq!(pool.len(), 3);
        let values: Vec<u32> = pool.iter().map(|(_, v)| *v).collect();
        assert_eq!(values, vec![1, 2, 3]);
    }

    #[test]
    fn test_freed_slot_is_reused_first() {
        let mut pool: SlotPool<&str, 4> = SlotPool::new();
        let a = pool.insert("a").unwrap();
        let b = pool.insert("b").unwrap();
        pool.insert("c").unwrap();
        assert_eq!(pool.remove(b), Some("b"));
        assert_eq!(pool.remove(b), None);
        assert_eq!(pool.insert("d"), Some(b));
        assert_eq!(pool.get(a), Some(&"a"));
    }

    #[test]
    fn test_retain_and_clear() {
        let mut pool: SlotPool<u32, 5> = SlotPool::new();
        for v in 0..5 {
            pool.insert(v);
        }
        pool.retain(|v| v % 2 == 0);
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.first_free().map(Handle::index), Some(1));
        pool.clear();
        assert!(pool.is_empty());
        assert_eq!(pool.capacity(), 5);
    }
}
