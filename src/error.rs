//! Error types shared by the collections.

use crate::value::ValueType;
use core::fmt;
use thiserror::Error;

/// Which collection raised an error.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum CollectionKind {
    WeakMap,
    HashMap,
    Map,
    Set,
}

impl CollectionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CollectionKind::WeakMap => "WeakMap",
            CollectionKind::HashMap => "HashMap",
            CollectionKind::Map => "Map",
            CollectionKind::Set => "Set",
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Copy, Clone, Debug, Eq, PartialEq)]
pub enum CollectionError {
    /// A key of the wrong kind: a primitive for `WeakMap`, an object for
    /// `HashMap`.
    #[error("Invalid {collection} key: {found} values cannot be used as keys")]
    InvalidKey {
        collection: CollectionKind,
        found: ValueType,
    },

    /// The receiver was not produced by the expected collection constructor.
    #[error("{expected} method called on an incompatible receiver")]
    IncompatibleReceiver { expected: CollectionKind },
}

pub type Result<T, E = CollectionError> = core::result::Result<T, E>;
