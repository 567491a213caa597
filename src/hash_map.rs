//! HashMap: primitive-keyed table partitioned by key type.
//!
//! Strings, numbers and the remaining primitives (booleans, null,
//! undefined) live in separate ordered hash tables, so `1` and `"1"` can
//! never collide. Snapshots visit the string partition first, then
//! numbers, then the rest; each partition keeps insertion order.
//!
//! Number keys use SameValueZero: `NaN` matches `NaN`, and `-0` is the
//! same key as `+0` (stored and reported as `+0`).

use crate::error::{CollectionError, CollectionKind, Result};
use crate::handle_hash_map::HandleHashMap;
use crate::identity;
use crate::value::{Object, Value};
use core::cell::RefCell;
use core::fmt;
use core::hash::{BuildHasher, Hash, Hasher};
use std::collections::hash_map::RandomState;
use std::rc::Rc;

/// Partition a primitive key is stored in.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Partition {
    String,
    Number,
    Other,
}

impl Partition {
    /// Validate `key` and report the partition it belongs to.
    pub fn of(key: &Value) -> Result<Partition> {
        primitive_key(key).map(|k| k.partition())
    }
}

fn primitive_key(key: &Value) -> Result<PrimitiveKey> {
    PrimitiveKey::from_value(key).ok_or_else(|| {
        tracing::debug!(found = %key.type_of(), "rejected HashMap key");
        CollectionError::InvalidKey {
            collection: CollectionKind::HashMap,
            found: key.type_of(),
        }
    })
}

/// Normalized number key: `-0` folded into `+0`, every `NaN` canonical.
#[derive(Copy, Clone, Debug)]
pub(crate) struct NumberKey(f64);

impl NumberKey {
    fn new(n: f64) -> Self {
        if n == 0.0 {
            NumberKey(0.0)
        } else if n.is_nan() {
            NumberKey(f64::NAN)
        } else {
            NumberKey(n)
        }
    }
}

impl PartialEq for NumberKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for NumberKey {}

impl Hash for NumberKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub(crate) enum OtherKey {
    Undefined,
    Null,
    Bool(bool),
}

/// A validated primitive key.
#[derive(Clone, Debug)]
pub(crate) enum PrimitiveKey {
    String(Rc<str>),
    Number(NumberKey),
    Other(OtherKey),
}

impl PrimitiveKey {
    /// Split a value into a primitive key or the object it refers to.
    pub(crate) fn classify(value: &Value) -> core::result::Result<Self, &Object> {
        Ok(match value {
            Value::String(s) => PrimitiveKey::String(s.clone()),
            Value::Number(n) => PrimitiveKey::Number(NumberKey::new(*n)),
            Value::Undefined => PrimitiveKey::Other(OtherKey::Undefined),
            Value::Null => PrimitiveKey::Other(OtherKey::Null),
            Value::Bool(b) => PrimitiveKey::Other(OtherKey::Bool(*b)),
            Value::Object(o) => return Err(o),
        })
    }

    /// `None` for objects.
    pub(crate) fn from_value(value: &Value) -> Option<Self> {
        Self::classify(value).ok()
    }

    pub(crate) fn to_value(&self) -> Value {
        match self {
            PrimitiveKey::String(s) => Value::String(s.clone()),
            PrimitiveKey::Number(n) => Value::Number(n.0),
            PrimitiveKey::Other(o) => other_to_value(*o),
        }
    }

    fn partition(&self) -> Partition {
        match self {
            PrimitiveKey::String(_) => Partition::String,
            PrimitiveKey::Number(_) => Partition::Number,
            PrimitiveKey::Other(_) => Partition::Other,
        }
    }
}

fn other_to_value(key: OtherKey) -> Value {
    match key {
        OtherKey::Undefined => Value::Undefined,
        OtherKey::Null => Value::Null,
        OtherKey::Bool(b) => Value::Bool(b),
    }
}

struct Partitions<V, S> {
    strings: HandleHashMap<Rc<str>, V, S>,
    numbers: HandleHashMap<NumberKey, V, S>,
    others: HandleHashMap<OtherKey, V, S>,
}

impl<V, S> Partitions<V, S>
where
    S: BuildHasher + Clone,
{
    fn with_hasher(hasher: S) -> Self {
        Self {
            strings: HandleHashMap::with_hasher(hasher.clone()),
            numbers: HandleHashMap::with_hasher(hasher.clone()),
            others: HandleHashMap::with_hasher(hasher),
        }
    }

    fn len(&self) -> usize {
        self.strings.len() + self.numbers.len() + self.others.len()
    }

    fn get(&self, key: &PrimitiveKey) -> Option<&V> {
        match key {
            PrimitiveKey::String(s) => self.strings.get(&**s),
            PrimitiveKey::Number(n) => self.numbers.get(n),
            PrimitiveKey::Other(o) => self.others.get(o),
        }
    }

    fn upsert(&mut self, key: PrimitiveKey, value: V) -> Option<V> {
        match key {
            PrimitiveKey::String(s) => self.strings.upsert(s, value).1,
            PrimitiveKey::Number(n) => self.numbers.upsert(n, value).1,
            PrimitiveKey::Other(o) => self.others.upsert(o, value).1,
        }
    }

    fn remove(&mut self, key: &PrimitiveKey) -> Option<V> {
        match key {
            PrimitiveKey::String(s) => self.strings.remove_key(&**s).map(|(_, v)| v),
            PrimitiveKey::Number(n) => self.numbers.remove_key(n).map(|(_, v)| v),
            PrimitiveKey::Other(o) => self.others.remove_key(o).map(|(_, v)| v),
        }
    }

    /// Visit every entry: strings, then numbers, then the rest.
    fn for_each(&self, mut f: impl FnMut(Value, &V)) {
        for (_, k, v) in self.strings.iter() {
            f(Value::String(k.clone()), v);
        }
        for (_, k, v) in self.numbers.iter() {
            f(Value::Number(k.0), v);
        }
        for (_, k, v) in self.others.iter() {
            f(other_to_value(*k), v);
        }
    }
}

pub struct HashMap<V, S = RandomState> {
    object: Object,
    state: Rc<RefCell<Partitions<V, S>>>,
}

impl<V: 'static> HashMap<V> {
    pub fn new() -> Self {
        Self::with_hasher(RandomState::new())
    }

    /// Build a map from `(key, value)` pairs, inserted in order. Fails on
    /// the first object key.
    pub fn from_entries<K, I>(entries: I) -> Result<Self>
    where
        K: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        let map = Self::new();
        for (k, v) in entries {
            map.set(k, v)?;
        }
        Ok(map)
    }
}

impl<V: 'static> Default for HashMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, S> HashMap<V, S>
where
    V: 'static,
    S: BuildHasher + Clone + 'static,
{
    pub fn with_hasher(hasher: S) -> Self {
        let object = Object::with_class(CollectionKind::HashMap.as_str());
        let state = Rc::new(RefCell::new(Partitions::with_hasher(hasher)));
        identity::brand(&object, state.clone());
        Self { object, state }
    }

    pub fn len(&self) -> usize {
        self.state.borrow().len()
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, key: &Value) -> Result<Option<V>>
    where
        V: Clone,
    {
        Ok(self.get_key(&primitive_key(key)?))
    }

    /// Associate `value` with `key`, returning the value it replaces.
    pub fn set(&self, key: impl Into<Value>, value: V) -> Result<Option<V>> {
        let key = primitive_key(&key.into())?;
        Ok(self.set_key(key, value))
    }

    pub fn has(&self, key: &Value) -> Result<bool> {
        Ok(self.has_key(&primitive_key(key)?))
    }

    /// Remove the entry for `key`; true if there was one.
    pub fn delete(&self, key: &Value) -> Result<bool> {
        Ok(self.delete_key(&primitive_key(key)?).is_some())
    }

    pub(crate) fn get_key(&self, key: &PrimitiveKey) -> Option<V>
    where
        V: Clone,
    {
        self.state.borrow().get(key).cloned()
    }

    pub(crate) fn set_key(&self, key: PrimitiveKey, value: V) -> Option<V> {
        self.state.borrow_mut().upsert(key, value)
    }

    pub(crate) fn has_key(&self, key: &PrimitiveKey) -> bool {
        self.state.borrow().get(key).is_some()
    }

    pub(crate) fn delete_key(&self, key: &PrimitiveKey) -> Option<V> {
        self.state.borrow_mut().remove(key)
    }

    /// Snapshot of `(key, value)` pairs.
    pub fn entries(&self) -> Vec<(Value, V)>
    where
        V: Clone,
    {
        let state = self.state.borrow();
        let mut out = Vec::with_capacity(state.len());
        state.for_each(|k, v| out.push((k, v.clone())));
        out
    }

    pub fn keys(&self) -> Vec<Value> {
        let state = self.state.borrow();
        let mut out = Vec::with_capacity(state.len());
        state.for_each(|k, _| out.push(k));
        out
    }

    pub fn values(&self) -> Vec<V>
    where
        V: Clone,
    {
        let state = self.state.borrow();
        let mut out = Vec::with_capacity(state.len());
        state.for_each(|_, v| out.push(v.clone()));
        out
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
    /// a `HashMap<V, S>` constructor.
    pub fn from_object(object: &Object) -> Result<Self> {
        identity::unbrand::<RefCell<Partitions<V, S>>>(object)
            .map(|state| Self {
                object: object.clone(),
                state,
            })
            .ok_or(CollectionError::IncompatibleReceiver {
                expected: CollectionKind::HashMap,
            })
    }
}

impl<S> HashMap<Value, S>
where
    S: BuildHasher + Clone + 'static,
{
    /// Plain object with one member per entry, named by the key's string
    /// form. Later partitions win when two keys print the same.
    pub fn to_object(&self) -> Object {
        let out = Object::new();
        for (k, v) in self.entries() {
            out.set(k.to_property_key(), v);
        }
        out
    }
}

impl<V, S> Clone for HashMap<V, S> {
    fn clone(&self) -> Self {
        Self {
            object: self.object.clone(),
            state: self.state.clone(),
        }
    }
}

impl<V, S> TryFrom<&Value> for HashMap<V, S>
where
    V: 'static,
    S: BuildHasher + Clone + 'static,
{
    type Error = CollectionError;

    fn try_from(value: &Value) -> Result<Self> {
        match value {
            Value::Object(o) => Self::from_object(o),
            _ => Err(CollectionError::IncompatibleReceiver {
                expected: CollectionKind::HashMap,
            }),
        }
    }
}

impl<V, S> From<HashMap<V, S>> for Value {
    fn from(map: HashMap<V, S>) -> Self {
        Value::Object(map.object)
    }
}

impl<V, S> From<&HashMap<V, S>> for Value {
    fn from(map: &HashMap<V, S>) -> Self {
        Value::Object(map.object.clone())
    }
}

impl<V, S> fmt::Display for HashMap<V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.object, f)
    }
}

impl<V: fmt::Debug, S: BuildHasher> fmt::Debug for HashMap<V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_map();
        if let Ok(state) = self.state.try_borrow() {
            for (_, k, v) in state.strings.iter() {
                d.entry(k, v);
            }
            for (_, k, v) in state.numbers.iter() {
                d.entry(&Value::Number(k.0), v);
            }
            for (_, k, v) in state.others.iter() {
                d.entry(&other_to_value(*k), v);
            }
        }
        d.finish()
    }
}
