//! HandleHashMap: insertion-ordered hash table with stable handles.
//!
//! The index is a `hashbrown::HashTable` of handles; entries live in
//! `OrderedSlots`, which keeps insertion order across removals. Each
//! entry stores its precomputed hash, so the index never rehashes a key
//! after insertion.

use crate::order::{self, OrderedSlots};
use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use hashbrown::HashTable;
use std::collections::hash_map::RandomState;

pub use crate::order::Handle;

impl Handle {
    #[cfg(any(test, feature = "bench_internal"))]
    pub fn key<'a, K, V, S>(&self, map: &'a HandleHashMap<K, V, S>) -> Option<&'a K>
    where
        K: Eq + Hash,
        S: BuildHasher,
    {
        map.handle_key(*self)
    }

    #[cfg(any(test, feature = "bench_internal"))]
    pub fn value<'a, K, V, S>(&self, map: &'a HandleHashMap<K, V, S>) -> Option<&'a V>
    where
        K: Eq + Hash,
        S: BuildHasher,
    {
        map.handle_value(*self)
    }

    #[cfg(any(test, feature = "bench_internal"))]
    pub fn value_mut<'a, K, V, S>(&self, map: &'a mut HandleHashMap<K, V, S>) -> Option<&'a mut V>
    where
        K: Eq + Hash,
        S: BuildHasher,
    {
        map.handle_value_mut(*self)
    }
}

#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
    hash: u64,
}

pub struct HandleHashMap<K, V, S = RandomState> {
    hasher: S,
    index: HashTable<Handle>,
    entries: OrderedSlots<Entry<K, V>>,
}

impl<K, V> HandleHashMap<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_hasher(Default::default())
    }
}

impl<K, V> Default for HandleHashMap<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over entries in insertion order.
pub struct Iter<'a, K, V> {
    it: order::Iter<'a, Entry<K, V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (Handle, &'a K, &'a V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(h, e)| (h, &e.key, &e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<K, V, S> HandleHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            index: HashTable::new(),
            hasher,
            entries: OrderedSlots::new(),
        }
    }

    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
    #[cfg(any(test, feature = "bench_internal"))]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn find<Q>(&self, q: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(q);
        self.index
            .find(hash, |&h| {
                self.entries
                    .get(h)
                    .map(|e| e.key.borrow() == q)
                    .unwrap_or(false)
            })
            .copied()
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.find(q).is_some()
    }

    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.find(q).and_then(|h| self.handle_value(h))
    }

    /// Insert `key -> value`, or overwrite the value of an existing key in
    /// place (its position in the iteration order is kept). Returns the
    /// entry's handle and the replaced value, if any.
    pub fn upsert(&mut self, key: K, value: V) -> (Handle, Option<V>) {
        let hash = self.make_hash(&key);
        match self.index.entry(
            hash,
            |&h| self.entries.get(h).map(|e| e.key == key).unwrap_or(false),
            |&h| self.entries.get(h).map(|e| e.hash).unwrap_or(0),
        ) {
            hashbrown::hash_table::Entry::Occupied(o) => {
                let h = *o.get();
                let old = self
                    .entries
                    .get_mut(h)
                    .map(|e| core::mem::replace(&mut e.value, value));
                (h, old)
            }
            hashbrown::hash_table::Entry::Vacant(v) => {
                let h = self.entries.push_back(Entry { key, value, hash });
                let _ = v.insert(h);
                (h, None)
            }
        }
    }

    pub fn remove(&mut self, handle: Handle) -> Option<(K, V)> {
        let entry = self.entries.remove(handle)?;

        // Unlink from index via occupied entry removal
        if let Ok(o) = self.index.find_entry(entry.hash, |&h| h == handle) {
            o.remove();
        }

        Some((entry.key, entry.value))
    }

    pub fn remove_key<Q>(&mut self, q: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let h = self.find(q)?;
        self.remove(h)
    }

    #[cfg(any(test, feature = "bench_internal"))]
    pub(crate) fn handle_key(&self, h: Handle) -> Option<&K> {
        self.entries.get(h).map(|e| &e.key)
    }

    pub(crate) fn handle_value(&self, h: Handle) -> Option<&V> {
        self.entries.get(h).map(|e| &e.value)
    }

    #[cfg(any(test, feature = "bench_internal"))]
    pub(crate) fn handle_value_mut(&mut self, h: Handle) -> Option<&mut V> {
        self.entries.get_mut(h).map(|e| &mut e.value)
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            it: self.entries.iter(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::hash::Hasher;

    /// Invariant: `find(k).is_some() == contains_key(k)` for present/absent keys.
    #[test]
    fn find_contains_parity() {
        let mut m: HandleHashMap<String, i32> = HandleHashMap::new();
        let present = ["a", "b", "c"];
        for (i, k) in present.iter().enumerate() {
            m.upsert((*k).to_string(), i as i32);
        }

        for k in present {
            assert!(m.find(k).is_some());
            assert!(m.contains_key(k));
        }

        for k in ["x", "y", "z"] {
            assert!(m.find(k).is_none());
            assert!(!m.contains_key(k));
        }
    }

    /// Invariant: upserting an existing key replaces the value, keeps the
    /// handle and keeps the key's position in the iteration order.
    #[test]
    fn upsert_overwrites_in_place() {
        let mut m: HandleHashMap<String, i32> = HandleHashMap::new();
        let (ha, old) = m.upsert("a".to_string(), 1);
        assert!(old.is_none());
        m.upsert("b".to_string(), 2);
        let (ha2, old) = m.upsert("a".to_string(), 3);
        assert_eq!(ha, ha2);
        assert_eq!(old, Some(1));
        assert_eq!(m.len(), 2);

        let order: Vec<(&str, i32)> = m.iter().map(|(_, k, v)| (k.as_str(), *v)).collect();
        assert_eq!(order, [("a", 3), ("b", 2)]);
    }

    /// Invariant: Handle-based access yields references while the entry exists and
    /// becomes `None` after removal. Mutating via `value_mut` updates the stored value.
    #[test]
    fn handle_access_and_mutation() {
        let mut m: HandleHashMap<String, i32> = HandleHashMap::new();
        let (h, _) = m.upsert("k1".to_string(), 10);
        assert_eq!(h.key(&m), Some(&"k1".to_string()));
        assert_eq!(h.value(&m), Some(&10));
        if let Some(v) = h.value_mut(&mut m) {
            *v += 5;
        }
        assert_eq!(h.value(&m), Some(&15));

        let (_k, _v) = m.remove(h).unwrap();
        assert!(h.value(&m).is_none());
    }

    /// Invariant: After removal the key is absent; reinserting appends it at the
    /// end of the order with a fresh handle.
    #[test]
    fn remove_then_reinsert_moves_to_back() {
        let mut m: HandleHashMap<&'static str, i32> = HandleHashMap::new();
        let (h1, _) = m.upsert("k", 1);
        m.upsert("j", 2);

        assert_eq!(m.remove_key("k"), Some(("k", 1)));
        assert!(!m.contains_key("k"));
        assert!(h1.value(&m).is_none());

        let (h2, old) = m.upsert("k", 3);
        assert!(old.is_none());
        assert_ne!(h1, h2, "old handle must not alias new entry");
        let keys: Vec<&str> = m.iter().map(|(_, k, _)| *k).collect();
        assert_eq!(keys, ["j", "k"]);
    }

    /// Invariant: Lookups work under heavy hash collisions; equality resolves to the
    /// correct entry.
    #[test]
    fn collision_handling_with_const_hasher() {
        #[derive(Clone, Default)]
        struct ConstBuildHasher;
        struct ConstHasher;
        impl BuildHasher for ConstBuildHasher {
            type Hasher = ConstHasher;
            fn build_hasher(&self) -> Self::Hasher {
                ConstHasher
            }
        }
        impl Hasher for ConstHasher {
            fn write(&mut self, _bytes: &[u8]) {}
            fn finish(&self) -> u64 {
                0
            } // force all keys into the same hash bucket
        }

        let mut m: HandleHashMap<String, i32, ConstBuildHasher> =
            HandleHashMap::with_hasher(ConstBuildHasher);
        m.upsert("a".to_string(), 1);
        m.upsert("b".to_string(), 2);

        let ha = m.find("a").expect("find a");
        let hb = m.find("b").expect("find b");
        assert_ne!(ha, hb);
        assert_eq!(m.get("a"), Some(&1));
        assert_eq!(m.get("b"), Some(&2));

        m.remove(ha);
        assert_eq!(m.get("b"), Some(&2));
        assert!(m.get("a").is_none());
    }

    /// Invariant: `len()` and `is_empty()` reflect the number of live entries,
    /// unaffected by overwrites, and updated after removals.
    #[test]
    fn len_and_is_empty_behaviors() {
        let mut m: HandleHashMap<String, i32> = HandleHashMap::new();
        assert_eq!(m.len(), 0);
        assert!(m.is_empty());

        let (h1, _) = m.upsert("a".to_string(), 1);
        m.upsert("a".to_string(), 2);
        assert_eq!(m.len(), 1);

        let (h2, _) = m.upsert("b".to_string(), 2);
        assert_eq!(m.len(), 2);

        let _ = m.remove(h1).unwrap();
        assert_eq!(m.len(), 1);
        assert!(!m.is_empty());

        let _ = m.remove(h2).unwrap();
        assert_eq!(m.len(), 0);
        assert!(m.is_empty());
    }
}
