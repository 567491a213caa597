//! Map: any-keyed table that remembers insertion order.
//!
//! Entries live in one `OrderedSlots` sequence. Each key is routed to a
//! sub-table by kind, object keys to a `WeakMap` and primitive keys to a
//! `HashMap`, and the sub-table stores the handle of the key's entry.
//! Overwrites therefore keep their position, appends go to the back, and
//! deletes unlink in O(1) without disturbing the rest of the order.

use crate::error::{CollectionError, CollectionKind, Result};
use crate::hash_map::{HashMap, PrimitiveKey};
use crate::identity;
use crate::order::{Handle, OrderedSlots};
use crate::value::{Object, Value};
use crate::weak_map::WeakMap;
use core::cell::RefCell;
use core::fmt;
use std::rc::Rc;

/// Where a key is routed.
enum Route<'a> {
    Object(&'a Object),
    Primitive(PrimitiveKey),
}

impl<'a> Route<'a> {
    fn of(key: &'a Value) -> Self {
        match PrimitiveKey::classify(key) {
            Ok(k) => Route::Primitive(k),
            Err(o) => Route::Object(o),
        }
    }
}

struct State<V> {
    objects: WeakMap<Handle>,
    primitives: HashMap<Handle>,
    entries: OrderedSlots<(Value, V)>,
}

impl<V> State<V> {
    fn find(&self, route: &Route<'_>) -> Option<Handle> {
        match route {
            Route::Object(o) => self.objects.get_object(o),
            Route::Primitive(k) => self.primitives.get_key(k),
        }
    }

    fn set(&mut self, key: Value, value: V) -> Option<V> {
        let route = Route::of(&key);
        if let Some(h) = self.find(&route) {
            return self
                .entries
                .get_mut(h)
                .map(|(_, v)| core::mem::replace(v, value));
        }
        let stored = match &route {
            Route::Object(_) => key.clone(),
            // Normalized form: `-0` is stored as `+0`.
            Route::Primitive(k) => k.to_value(),
        };
        let h = self.entries.push_back((stored, value));
        match route {
            Route::Object(o) => {
                self.objects.set_object(o, h);
            }
            Route::Primitive(k) => {
                self.primitives.set_key(k, h);
            }
        }
        None
    }

    fn delete(&mut self, key: &Value) -> Option<(Value, V)> {
        let h = match Route::of(key) {
            Route::Object(o) => self.objects.delete_object(o)?,
            Route::Primitive(k) => self.primitives.delete_key(&k)?,
        };
        self.entries.remove(h)
    }
}

pub struct Map<V> {
    object: Object,
    state: Rc<RefCell<State<V>>>,
}

impl<V: 'static> Map<V> {
    pub fn new() -> Self {
        let object = Object::with_class(CollectionKind::Map.as_str());
        let state = Rc::new(RefCell::new(State {
            objects: WeakMap::new(),
            primitives: HashMap::new(),
            entries: OrderedSlots::new(),
        }));
        identity::brand(&object, state.clone());
        Self { object, state }
    }

    pub fn len(&self) -> usize {
        self.state.borrow().entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.state.borrow().entries.is_empty()
    }

    pub fn get(&self, key: &Value) -> Option<V>
    where
        V: Clone,
    {
        let state = self.state.borrow();
        let h = state.find(&Route::of(key))?;
        state.entries.get(h).map(|(_, v)| v.clone())
    }

    /// Associate `value` with `key`, returning the value it replaces. A new
    /// key goes to the end of the iteration order; an existing key keeps
    /// its position.
    pub fn set(&self, key: impl Into<Value>, value: V) -> Option<V> {
        self.state.borrow_mut().set(key.into(), value)
    }

    pub fn has(&self, key: &Value) -> bool {
        self.state.borrow().find(&Route::of(key)).is_some()
    }

    /// Remove the entry for `key`; true if there was one.
    pub fn delete(&self, key: &Value) -> bool {
        let removed = self.state.borrow_mut().delete(key);
        removed.is_some()
    }

    /// Snapshot of `(key, value)` pairs in insertion order.
    pub fn entries(&self) -> Vec<(Value, V)>
    where
        V: Clone,
    {
        self.state
            .borrow()
            .entries
            .iter()
            .map(|(_, (k, v))| (k.clone(), v.clone()))
            .collect()
    }

    pub fn keys(&self) -> Vec<Value> {
        self.state
            .borrow()
            .entries
            .iter()
            .map(|(_, (k, _))| k.clone())
            .collect()
    }

    pub fn values(&self) -> Vec<V>
    where
        V: Clone,
    {
        self.state
            .borrow()
            .entries
            .iter()
            .map(|(_, (_, v))| v.clone())
            .collect()
    }

    /// Call `callback(value, key)` for each entry of a snapshot taken
    /// before the first call; the callback may mutate the map.
    pub fn iterate(&self, mut callback: impl FnMut(&V, &Value))
    where
        V: Clone,
    {
        for (k, v) in self.entries() {
            callback(&v, &k);
        }
    }

    /// The object that represents this map.
    pub fn as_object(&self) -> &Object {
        &self.object
    }

    /// Recover a map from its object. Fails unless `object` was created by
    /// `Map::<V>::new`.
    pub fn from_object(object: &Object) -> Result<Self> {
        identity::unbrand::<RefCell<State<V>>>(object)
            .map(|state| Self {
                object: object.clone(),
                state,
            })
            .ok_or(CollectionError::IncompatibleReceiver {
                expected: CollectionKind::Map,
            })
    }
}

impl<V: 'static> Default for Map<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Clone for Map<V> {
    fn clone(&self) -> Self {
        Self {
            object: self.object.clone(),
            state: self.state.clone(),
        }
    }
}

impl<K: Into<Value>, V: 'static> FromIterator<(K, V)> for Map<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let map = Self::new();
        for (k, v) in iter {
            map.set(k, v);
        }
        map
    }
}

impl<K: Into<Value>, V: 'static> Extend<(K, V)> for Map<V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.set(k, v);
        }
    }
}

impl<V: 'static> TryFrom<&Value> for Map<V> {
    type Error = CollectionError;

    fn try_from(value: &Value) -> Result<Self> {
        match value {
            Value::Object(o) => Self::from_object(o),
            _ => Err(CollectionError::IncompatibleReceiver {
                expected: CollectionKind::Map,
            }),
        }
    }
}

impl<V> From<Map<V>> for Value {
    fn from(map: Map<V>) -> Self {
        Value::Object(map.object)
    }
}

impl<V> From<&Map<V>> for Value {
    fn from(map: &Map<V>) -> Self {
        Value::Object(map.object.clone())
    }
}

impl<V> fmt::Display for Map<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.object, f)
    }
}

impl<V: fmt::Debug> fmt::Debug for Map<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_map();
        if let Ok(state) = self.state.try_borrow() {
            for (_, (k, v)) in state.entries.iter() {
                d.entry(k, v);
            }
        }
        d.finish()
    }
}
