//! WeakMap: object-keyed table with no enumeration.
//!
//! Each map owns one `Locker`; a value is stored in the key object's own
//! hidden slot rather than in the map. Consequently the map never keeps a
//! key alive, and an entry is released as soon as its key object is
//! dropped, whether or not the map is still around. Dropping the last
//! handle to the map releases the values it still holds in live keys.

use crate::error::{CollectionError, CollectionKind, Result};
use crate::identity::{self, Locker};
use crate::value::{Object, Value};
use core::fmt;
use std::rc::Rc;

pub struct WeakMap<V> {
    object: Object,
    data: Rc<Locker<V>>,
}

impl<V: 'static> WeakMap<V> {
    pub fn new() -> Self {
        let object = Object::with_class(CollectionKind::WeakMap.as_str());
        let data = Rc::new(Locker::new());
        identity::brand(&object, data.clone());
        Self { object, data }
    }

    /// Build a map from `(key, value)` pairs, inserted in order. Fails on
    /// the first primitive key.
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

    fn key_object(key: &Value) -> Result<&Object> {
        match key {
            Value::Object(o) => Ok(o),
            other => {
                tracing::debug!(found = %other.type_of(), "rejected WeakMap key");
                Err(CollectionError::InvalidKey {
                    collection: CollectionKind::WeakMap,
                    found: other.type_of(),
                })
            }
        }
    }

    pub fn get(&self, key: &Value) -> Result<Option<V>>
    where
        V: Clone,
    {
        Ok(self.get_object(Self::key_object(key)?))
    }

    /// Associate `value` with `key`, returning the value it replaces.
    pub fn set(&self, key: impl Into<Value>, value: V) -> Result<Option<V>> {
        let key = key.into();
        Ok(self.set_object(Self::key_object(&key)?, value))
    }

    pub fn has(&self, key: &Value) -> Result<bool> {
        Ok(self.has_object(Self::key_object(key)?))
    }

    /// Remove the entry for `key`; true if there was one.
    pub fn delete(&self, key: &Value) -> Result<bool> {
        Ok(self.delete_object(Self::key_object(key)?).is_some())
    }

    pub(crate) fn get_object(&self, key: &Object) -> Option<V>
    where
        V: Clone,
    {
        self.data.get(key)
    }

    pub(crate) fn set_object(&self, key: &Object, value: V) -> Option<V> {
        self.data.set(key, value)
    }

    pub(crate) fn has_object(&self, key: &Object) -> bool {
        self.data.contains(key)
    }

    pub(crate) fn delete_object(&self, key: &Object) -> Option<V> {
        self.data.take(key)
    }

    /// The object that represents this map.
    pub fn as_object(&self) -> &Object {
        &self.object
    }

    /// Recover a map from its object. Fails unless `object` was created by
    /// `WeakMap::<V>::new`.
    pub fn from_object(object: &Object) -> Result<Self> {
        identity::unbrand::<Locker<V>>(object)
            .map(|data| Self {
                object: object.clone(),
                data,
            })
            .ok_or(CollectionError::IncompatibleReceiver {
                expected: CollectionKind::WeakMap,
            })
    }
}

impl<V: 'static> Default for WeakMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Clone for WeakMap<V> {
    fn clone(&self) -> Self {
        Self {
            object: self.object.clone(),
            data: self.data.clone(),
        }
    }
}

impl<V: 'static> TryFrom<&Value> for WeakMap<V> {
    type Error = CollectionError;

    fn try_from(value: &Value) -> Result<Self> {
        match value {
            Value::Object(o) => Self::from_object(o),
            _ => Err(CollectionError::IncompatibleReceiver {
                expected: CollectionKind::WeakMap,
            }),
        }
    }
}

impl<V> From<WeakMap<V>> for Value {
    fn from(map: WeakMap<V>) -> Self {
        Value::Object(map.object)
    }
}

impl<V> From<&WeakMap<V>> for Value {
    fn from(map: &WeakMap<V>) -> Self {
        Value::Object(map.object.clone())
    }
}

impl<V> fmt::Display for WeakMap<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.object, f)
    }
}

impl<V> fmt::Debug for WeakMap<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakMap")
            .field("id", &self.object.id())
            .finish_non_exhaustive()
    }
}
