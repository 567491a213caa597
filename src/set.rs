//! Set: a `Map` whose values are a unit sentinel.

use crate::error::{CollectionError, CollectionKind, Result};
use crate::identity;
use crate::map::Map;
use crate::value::{Object, Value};
use core::fmt;
use std::rc::Rc;

/// Brand payload; distinct from a `Map<()>`'s own state.
struct SetState(Map<()>);

#[derive(Clone)]
pub struct Set {
    object: Object,
    map: Map<()>,
}

impl Set {
    pub fn new() -> Self {
        let object = Object::with_class(CollectionKind::Set.as_str());
        let map = Map::new();
        identity::brand(&object, Rc::new(SetState(map.clone())));
        Self { object, map }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Insert `value`; true if it was not already present.
    pub fn add(&self, value: impl Into<Value>) -> bool {
        self.map.set(value, ()).is_none()
    }

    pub fn has(&self, value: &Value) -> bool {
        self.map.has(value)
    }

    /// Remove `value`; true if it was present.
    pub fn delete(&self, value: &Value) -> bool {
        self.map.delete(value)
    }

    /// Snapshot of the elements in insertion order.
    pub fn values(&self) -> Vec<Value> {
        self.map.keys()
    }

    /// Call `callback(value)` for each element of a snapshot taken before
    /// the first call; the callback may mutate the set.
    pub fn iterate(&self, mut callback: impl FnMut(&Value)) {
        for v in self.values() {
            callback(&v);
        }
    }

    /// The object that represents this set.
    pub fn as_object(&self) -> &Object {
        &self.object
    }

    /// Recover a set from its object. Fails unless `object` was created by
    /// `Set::new`.
    pub fn from_object(object: &Object) -> Result<Self> {
        identity::unbrand::<SetState>(object)
            .map(|state| Self {
                object: object.clone(),
                map: state.0.clone(),
            })
            .ok_or(CollectionError::IncompatibleReceiver {
                expected: CollectionKind::Set,
            })
    }
}

impl Default for Set {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Into<Value>> FromIterator<T> for Set {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let set = Self::new();
        for v in iter {
            set.add(v);
        }
        set
    }
}

impl<T: Into<Value>> Extend<T> for Set {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for v in iter {
            self.add(v);
        }
    }
}

impl TryFrom<&Value> for Set {
    type Error = CollectionError;

    fn try_from(value: &Value) -> Result<Self> {
        match value {
            Value::Object(o) => Self::from_object(o),
            _ => Err(CollectionError::IncompatibleReceiver {
                expected: CollectionKind::Set,
            }),
        }
    }
}

impl From<Set> for Value {
    fn from(set: Set) -> Self {
        Value::Object(set.object)
    }
}

impl From<&Set> for Value {
    fn from(set: &Set) -> Self {
        Value::Object(set.object.clone())
    }
}

impl fmt::Display for Set {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.object, f)
    }
}

impl fmt::Debug for Set {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.values()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovered_set_shares_elements() {
        let s = Set::new();
        s.add(1);
        let again = Set::from_object(s.as_object()).unwrap();
        again.add("x");
        assert_eq!(s.values(), [Value::from(1), Value::from("x")]);
        assert!(s.map.as_object().ptr_eq(again.map.as_object()));
    }

    #[test]
    fn set_and_inner_map_are_distinct_receivers() {
        let s = Set::new();
        assert!(Map::<()>::from_object(s.as_object()).is_err());
        assert!(Set::from_object(s.map.as_object()).is_err());
    }
}
