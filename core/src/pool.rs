//! Reference-counted resource arena.
//!
//! [`ResourcePool<T>`] stores GPU-backed resources (geometries, materials,
//! textures) in slots addressed by generational [`Handle<T>`]s. Each slot
//! tracks how many referrers currently hold it; a resource is disposed
//! only when its last referrer releases it, so a buffer shared between
//! nodes is never freed while one of them still uses it.
//!
//! When a slot is freed its generation is bumped and the index goes on a
//! free list. A handle to the old generation no longer resolves, so a
//! disposed resource can neither be read nor released a second time.
//!
//! # Example
//!
//! ```
//! use scene_utils::pool::{Release, ResourcePool};
//!
//! let mut pool = ResourcePool::new();
//! let handle = pool.insert(String::from("vertex buffer"));
//! pool.retain(handle);
//! pool.retain(handle);
//!
//! assert!(matches!(pool.release(handle), Release::Retained { remaining: 1 }));
//! assert!(matches!(pool.release(handle), Release::Disposed(_)));
//! assert!(matches!(pool.release(handle), Release::Stale));
//! assert!(pool.get(handle).is_none());
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Generational handle to a value in a [`ResourcePool<T>`].
pub struct Handle<T> {
    index: u32,
    generation: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    fn new(index: u32, generation: u32) -> Self {
        Self {
            index,
            generation,
            _marker: PhantomData,
        }
    }

    /// Returns the slot index.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Returns the slot generation this handle was issued for.
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

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

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({}@{})", self.index, self.generation)
    }
}

/// Result of releasing one reference to a pooled resource.
#[derive(Debug)]
pub enum Release<T> {
    /// That was the last reference; the resource has been removed from the pool.
    Disposed(T),
    /// Other referrers remain; the resource stays alive.
    Retained {
        /// Number of referrers still holding the resource.
        remaining: u32,
    },
    /// The handle does not refer to a live resource.
    Stale,
}

struct Slot<T> {
    value: Option<T>,
    generation: u32,
    refs: u32,
}

/// Arena of reference-counted resources.
pub struct ResourcePool<T> {
    slots: Vec<Slot<T>>,
    /// Recyclable slot indices (LIFO stack).
    free_list: Vec<u32>,
    /// Number of live resources.
    count: usize,
}

impl<T> ResourcePool<T> {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            count: 0,
        }
    }

    /// Stores `value` with no referrers and returns its handle.
    pub fn insert(&mut self, value: T) -> Handle<T> {
        self.count += 1;

        if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            slot.refs = 0;
            Handle::new(index, slot.generation)
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                value: Some(value),
                generation: 0,
                refs: 0,
            });
            Handle::new(index, 0)
        }
    }

    fn slot(&self, handle: Handle<T>) -> Option<&Slot<T>> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation && slot.value.is_some())
    }

    fn slot_mut(&mut self, handle: Handle<T>) -> Option<&mut Slot<T>> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation && slot.value.is_some())
    }

    /// Returns `true` if `handle` refers to a live resource.
    pub fn contains(&self, handle: Handle<T>) -> bool {
        self.slot(handle).is_some()
    }

    /// Borrow a live resource.
    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        self.slot(handle).and_then(|slot| slot.value.as_ref())
    }

    /// Mutably borrow a live resource.
    pub fn get_mut(&mut self, handle: Handle<T>) -> Option<&mut T> {
        self.slot_mut(handle).and_then(|slot| slot.value.as_mut())
    }

    /// Number of referrers currently holding `handle`, if live.
    pub fn ref_count(&self, handle: Handle<T>) -> Option<u32> {
        self.slot(handle).map(|slot| slot.refs)
    }

    /// Register one more referrer. Returns `false` for stale handles.
    pub fn retain(&mut self, handle: Handle<T>) -> bool {
        match self.slot_mut(handle) {
            Some(slot) => {
                slot.refs += 1;
                true
            }
            None => false,
        }
    }

    /// Drop one referrer, disposing the resource when none remain.
    ///
    /// Releasing a resource that was inserted but never retained disposes it.
    pub fn release(&mut self, handle: Handle<T>) -> Release<T> {
        let Some(slot) = self.slot_mut(handle) else {
            return Release::Stale;
        };

        slot.refs = slot.refs.saturating_sub(1);
        if slot.refs > 0 {
            return Release::Retained {
                remaining: slot.refs,
            };
        }

        match self.remove(handle) {
            Some(value) => Release::Disposed(value),
            None => Release::Stale,
        }
    }

    /// Remove a resource regardless of its referrers.
    pub fn remove(&mut self, handle: Handle<T>) -> Option<T> {
        let slot = self.slot_mut(handle)?;
        let value = slot.value.take();
        slot.refs = 0;
        // Invalidate outstanding handles before the slot is reused
        slot.generation = slot.generation.wrapping_add(1);
        self.free_list.push(handle.index);
        self.count -= 1;
        value
    }

    /// Number of live resources.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns `true` if the pool holds no live resource.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Iterate over live resources with their handles.
    pub fn iter(&self) -> impl Iterator<Item = (Handle<T>, &T)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.value
                .as_ref()
                .map(|value| (Handle::new(index as u32, slot.generation), value))
        })
    }
}

impl<T> Default for ResourcePool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for ResourcePool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourcePool")
            .field("len", &self.count)
            .field("capacity", &self.slots.len())
            .finish()
    }
}
