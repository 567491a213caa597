//! Identity store: one hidden slot per object, read through capabilities.
//!
//! Every `Object` carries a private `OnceCell<Slot>` that is filled on the
//! first store and then reused for the object's lifetime. A slot maps a
//! capability id (`Uid`) to a type-erased value. Only the `Locker` that
//! minted a capability can name it, so collections sharing the same slot
//! never observe each other's cells.
//!
//! A locker remembers (weakly) every object it has stored into. Dropping
//! the locker evicts its cells from those objects right away, so values
//! go away with the collection that owns them as well as with their key.
//! Evicted values are dropped only after the slot's borrow has ended.

use crate::uid::Uid;
use crate::value::{Object, WeakObject};
use core::any::Any;
use core::cell::{Cell, RefCell};
use core::fmt;
use core::marker::PhantomData;
use hashbrown::HashMap;
use std::rc::Rc;

/// Per-object storage area.
pub(crate) struct Slot {
    cells: RefCell<HashMap<Uid, Box<dyn Any>>>,
}

impl Slot {
    fn new() -> Self {
        Self {
            cells: RefCell::new(HashMap::new()),
        }
    }

    fn read<T: Clone + 'static>(&self, cap: Uid) -> Option<T> {
        self.cells
            .borrow()
            .get(&cap)
            .and_then(|c| c.downcast_ref::<T>())
            .cloned()
    }

    fn contains(&self, cap: Uid) -> bool {
        self.cells.borrow().contains_key(&cap)
    }

    fn write<T: 'static>(&self, cap: Uid, value: T) -> Option<T> {
        let old = self.cells.borrow_mut().insert(cap, Box::new(value))?;
        old.downcast::<T>().ok().map(|b| *b)
    }

    fn take<T: 'static>(&self, cap: Uid) -> Option<T> {
        self.evict(cap)?.downcast::<T>().ok().map(|b| *b)
    }

    /// Remove a cell without looking at its type. The caller drops it.
    fn evict(&self, cap: Uid) -> Option<Box<dyn Any>> {
        self.cells.borrow_mut().remove(&cap)
    }
}

/// Return the object's slot, allocating it on first use.
pub(crate) fn attach(object: &Object) -> &Slot {
    object.slot_cell().get_or_init(|| {
        tracing::trace!(object = %object.id(), "allocating hidden slot");
        Slot::new()
    })
}

fn existing(object: &Object) -> Option<&Slot> {
    object.slot_cell().get()
}

#[cfg(test)]
pub(crate) fn is_attached(object: &Object) -> bool {
    existing(object).is_some()
}

/// Below this many tracked objects the dead-object sweep never runs.
const MIN_SWEEP: usize = 32;

/// A private namespace inside every object's hidden slot.
///
/// Holding a `Locker` is the capability: values stored through it can
/// only be read back through it. Dropping it releases everything it still
/// holds in objects that are alive.
pub struct Locker<T> {
    id: Uid,
    // Objects written through this locker, by object id.
    written: RefCell<HashMap<Uid, WeakObject>>,
    sweep_at: Cell<usize>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: 'static> Locker<T> {
    pub fn new() -> Self {
        Self {
            id: Uid::next(),
            written: RefCell::new(HashMap::new()),
            sweep_at: Cell::new(MIN_SWEEP),
            _marker: PhantomData,
        }
    }

    /// Capability id of this locker.
    pub fn id(&self) -> Uid {
        self.id
    }

    pub fn get(&self, object: &Object) -> Option<T>
    where
        T: Clone,
    {
        existing(object)?.read(self.id)
    }

    pub fn contains(&self, object: &Object) -> bool {
        existing(object).is_some_and(|s| s.contains(self.id))
    }

    /// Store `value` for `object`; returns the value it replaces.
    pub fn set(&self, object: &Object, value: T) -> Option<T> {
        let old = attach(object).write(self.id, value);
        if old.is_none() {
            self.track(object);
        }
        old
    }

    /// Remove and return the value stored for `object`.
    pub fn take(&self, object: &Object) -> Option<T> {
        let value = existing(object)?.take(self.id)?;
        self.written.borrow_mut().remove(&object.id());
        Some(value)
    }

    /// Number of live objects holding a cell of this locker.
    #[cfg(test)]
    pub(crate) fn tracked(&self) -> usize {
        self.written
            .borrow()
            .values()
            .filter(|w| w.is_alive())
            .count()
    }

    fn track(&self, object: &Object) {
        let mut written = self.written.borrow_mut();
        written.insert(object.id(), object.downgrade());
        // Amortized: forget dead objects once the table doubles.
        if written.len() >= self.sweep_at.get() {
            written.retain(|_, w| w.is_alive());
            self.sweep_at.set((written.len() * 2).max(MIN_SWEEP));
        }
    }
}

impl<T: 'static> Default for Locker<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for Locker<T> {
    fn drop(&mut self) {
        let written = core::mem::take(self.written.get_mut());
        let mut evicted = 0usize;
        for weak in written.into_values() {
            let Some(object) = weak.upgrade() else {
                continue;
            };
            let cell = existing(&object).and_then(|s| s.evict(self.id));
            if cell.is_some() {
                evicted += 1;
            }
            // Value first: it may hold the last other reference to `object`.
            drop(cell);
            drop(object);
        }
        if evicted > 0 {
            tracing::trace!(locker = %self.id, evicted, "released cells of dropped locker");
        }
    }
}

impl<T> fmt::Debug for Locker<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Locker").field("id", &self.id).finish()
    }
}

thread_local! {
    // Ties a collection object to its internal state.
    static BRANDS: Locker<Rc<dyn Any>> = Locker::new();
}

/// Mark `object` as a collection whose state is `state`.
pub(crate) fn brand(object: &Object, state: Rc<dyn Any>) {
    BRANDS.with(|b| b.set(object, state));
}

/// Recover the state stored by `brand`, if `object` carries state of type `S`.
pub(crate) fn unbrand<S: Any>(object: &Object) -> Option<Rc<S>> {
    let state = BRANDS.with(|b| b.get(object))?;
    match state.downcast::<S>() {
        Ok(s) => Some(s),
        Err(_) => {
            tracing::trace!(
                object = %object.id(),
                class = object.class_name(),
                "receiver brand mismatch"
            );
            None
        }
    }
}
