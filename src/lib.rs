//! harmony-collections: `WeakMap`, `Map`, `Set` and a primitive-keyed
//! `HashMap` over a small dynamic value model, built on hidden
//! identity-keyed storage.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: give every object one private storage slot that collections
//!   can use as an identity-keyed lookup table, and build the collection
//!   types on top of it in layers that can each be reasoned about alone.
//! - Layers:
//!   - `Uid`: process-wide, never-repeating tokens (object ids and
//!     capabilities).
//!   - Identity store: a lazily allocated `Slot` inside each `Object`,
//!     read and written through `Locker`s. A locker's `Uid` is its
//!     capability; nothing else can name its cells.
//!   - `WeakMap<V>`: one `Locker` per map; values live in the key
//!     objects' slots.
//!   - `HashMap<V>`: primitive keys only, split into string, number and
//!     other partitions, each an insertion-ordered `HandleHashMap`.
//!   - `Map<V>`: one insertion-ordered entry sequence; object keys are
//!     indexed through a `WeakMap`, primitive keys through a `HashMap`.
//!   - `Set`: `Map<()>`.
//!
//! Constraints
//! - Single-threaded: objects and collections are `!Send`/`!Sync` (`Rc`,
//!   `RefCell`). A slot is created through `OnceCell`, so at most once.
//! - Collections are objects too. Each constructor brands its object with
//!   the collection state, so a collection can be a key or value of
//!   another collection and be recovered with `from_object`.
//! - Snapshots: `keys`, `values`, `entries` and `iterate` copy before
//!   handing anything to the caller; callbacks may mutate the collection.
//! - Key equality: SameValueZero (`NaN` equals itself, `+0 == -0`);
//!   objects by identity.
//!
//! Notes and non-goals
//! - Entries of a `WeakMap` are owned by the key object, so they go away
//!   with the key. Dropping the map evicts them from every live key.
//!   A value that strongly references its own key keeps both alive while
//!   the map lives (reference counting has no ephemerons).
//! - Nothing in an object's visible members, `Debug` output or `Display`
//!   output reveals the hidden slot.

mod error;
#[cfg(feature = "bench_internal")]
pub mod handle_hash_map;
#[cfg(not(feature = "bench_internal"))]
mod handle_hash_map;
mod handle_hash_map_proptest;
mod hash_map;
mod identity;
mod map;
mod order;
mod set;
mod uid;
mod value;
mod weak_map;

// Public surface
pub use error::{CollectionError, CollectionKind, Result};
pub use hash_map::{HashMap, Partition};
pub use identity::Locker;
pub use map::Map;
pub use set::Set;
pub use uid::Uid;
pub use value::{Object, Value, ValueType, WeakObject};
pub use weak_map::WeakMap;
