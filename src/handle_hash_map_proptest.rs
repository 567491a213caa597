#![cfg(test)]

// Property tests for HandleHashMap kept inside the crate so they do not
// require feature gates to access internal modules.

use crate::handle_hash_map::{Handle, HandleHashMap};
use proptest::prelude::*;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hasher;

// Key newtype with Borrow<str> to exercise borrowed lookup.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
struct Key(String);
impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
impl std::borrow::Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Upsert(usize, i32),
    Remove(usize),
    Find(usize),
    Contains(String),
    Mutate(usize, i32),
    Iterate,
}

fn key_from(pool: &[String], i: usize) -> Key {
    Key(pool[i].clone())
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=8).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Upsert(i, v)),
            idx.clone().prop_map(OpI::Remove),
            idx.clone().prop_map(OpI::Find),
            prop_oneof![
                contains_pool.prop_map(|s: String| s),
                "[a-z]{0,5}".prop_map(|s| s)
            ]
            .prop_map(OpI::Contains),
            (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
            Just(OpI::Iterate),
        ];
        proptest::collection::vec(op, 1..60).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Insertion-ordered model: a Vec of (key, value) in first-insert order.
#[derive(Default)]
struct Model {
    entries: Vec<(Key, i32)>,
}

impl Model {
    fn position(&self, k: &Key) -> Option<usize> {
        self.entries.iter().position(|(kk, _)| kk == k)
    }
    fn upsert(&mut self, k: Key, v: i32) -> Option<i32> {
        match self.position(&k) {
            Some(i) => Some(std::mem::replace(&mut self.entries[i].1, v)),
            None => {
                self.entries.push((k, v));
                None
            }
        }
    }
    fn remove(&mut self, k: &Key) -> Option<i32> {
        let i = self.position(k)?;
        Some(self.entries.remove(i).1)
    }
}

fn run<S>(mut sut: HandleHashMap<Key, i32, S>, pool: Vec<String>, ops: Vec<OpI>) -> Result<(), TestCaseError>
where
    S: std::hash::BuildHasher,
{
    let mut model = Model::default();
    let mut live: HashMap<Key, Handle> = HashMap::new();
    let mut stale: Vec<Handle> = Vec::new();

    for op in ops {
        match op {
            OpI::Upsert(i, v) => {
                let k = key_from(&pool, i);
                let (h, old) = sut.upsert(k.clone(), v);
                let mold = model.upsert(k.clone(), v);
                prop_assert_eq!(old, mold);
                match live.get(&k) {
                    // Overwrite keeps the handle.
                    Some(&lh) => prop_assert_eq!(h, lh),
                    None => {
                        live.insert(k, h);
                    }
                }
            }
            OpI::Remove(i) => {
                let k = key_from(&pool, i);
                if let Some(h) = live.remove(&k) {
                    let (kk, vv) = sut.remove(h).expect("handle valid for removal");
                    prop_assert!(kk == k);
                    let mv = model.remove(&kk).expect("present in model");
                    prop_assert_eq!(vv, mv);
                    stale.push(h);
                } else {
                    prop_assert!(sut.find(&k).is_none());
                    prop_assert!(sut.remove_key(&k).is_none());
                }
            }
            OpI::Find(i) => {
                let k = key_from(&pool, i);
                let s = sut.find(&k);
                prop_assert_eq!(s.is_some(), model.position(&k).is_some());
                if let Some(h) = s {
                    prop_assert_eq!(Some(&h), live.get(&k));
                }
            }
            OpI::Contains(s) => {
                let has = sut.contains_key(s.as_str());
                let has_model = model.entries.iter().any(|(k, _)| k.0 == s);
                prop_assert_eq!(has, has_model);
            }
            OpI::Mutate(i, d) => {
                let k = key_from(&pool, i);
                if let Some(&h) = live.get(&k) {
                    if let Some(vr) = h.value_mut(&mut sut) {
                        *vr = vr.saturating_add(d);
                        if let Some(p) = model.position(&k) {
                            let mv = &mut model.entries[p].1;
                            *mv = mv.saturating_add(d);
                        }
                    } else {
                        prop_assert!(false, "live handle should resolve");
                    }
                }
            }
            OpI::Iterate => {
                // Order, not just membership, must match the model.
                let s: Vec<(Key, i32)> = sut.iter().map(|(_, k, v)| (k.clone(), *v)).collect();
                prop_assert_eq!(&s, &model.entries);
            }
        }

        // Post-conditions after each op
        for &h in &stale {
            prop_assert!(h.value(&sut).is_none());
        }
        prop_assert_eq!(sut.len(), model.entries.len());
        prop_assert_eq!(sut.is_empty(), model.entries.is_empty());
    }
    Ok(())
}

// Property: State-machine equivalence against an insertion-ordered model.
// Invariants exercised across random operation sequences:
// - `upsert` returns the replaced value and keeps the handle of an existing key.
// - `find`/`contains_key` parity and handle stability for live entries.
// - `remove(handle)` returns the owned `(K,V)` matching the model and invalidates the handle.
// - `iter` yields live entries in insertion order.
// - Stale handles never resolve; `len`/`is_empty` parity with the model after each op.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        run(HandleHashMap::new(), pool, ops)?;
    }
}

// Collision variant using a constant hasher to stress equality resolution.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl std::hash::BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        run(HandleHashMap::with_hasher(ConstBuildHasher), pool, ops)?;
    }
}
