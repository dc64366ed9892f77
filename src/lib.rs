//! merry-maps: open-addressing hash maps and sets built on Fibonacci
//! placement and Robin Hood linear probing.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: one probing engine shared by every collection, so placement,
//!   growth and deletion are written and tested once.
//! - Layers:
//!   - `placement`: maps a 64-bit hash to a home slot by multiplying with
//!     the 64-bit golden ratio and keeping the top `log2(capacity)` bits.
//!   - `RawTable<T, V, P>`: parallel slot/value arrays with Robin Hood
//!     insertion, early-exit lookup, backward-shift deletion and a removing
//!     cursor. `T` is the slot type and `P` the key policy that hashes and
//!     compares keys.
//!   - Wrappers: `ObjectMap`/`ObjectSet` (hashed, cached hash per slot),
//!     `IdentityMap` (pointer identity), `PrimitiveMap`/`PrimitiveSet`
//!     (integer keys stored inline, `0` kept outside the table) and
//!     `OrderedMap`/`OrderedSet` (insertion order kept in a side vector).
//!
//! Constraints
//! - Capacity is a power of two in `[2, 2^30]`; the table always keeps at
//!   least one empty slot so every probe terminates.
//! - Growth doubles the capacity before an insert would reach the
//!   threshold `floor(capacity * load_factor)`; resizing reinserts every
//!   entry into fresh arrays.
//! - Removal never leaves tombstones: following entries shift back until an
//!   empty slot or an entry already at its home slot.
//! - Iteration order is slot order and is unspecified; only the ordered
//!   wrappers promise an order.
//! - No interior mutability: collections are `Send` and `Sync` when their
//!   contents are, so shared lookups from many threads are fine while no
//!   thread mutates.
//!
//! Reentrancy
//! - `RawTable` carries a debug-only guard around probing, the one place
//!   user `Eq` runs while a lookup is mid-walk. An `Eq` that calls back
//!   into the same table on the same thread panics in debug builds; the
//!   guard compiles away in release.
//! - Removal during iteration goes through a `Cursor`, which holds the
//!   table mutably and adjusts its position after each backward shift.
//!
//! Notes and non-goals
//! - No concurrent variants and no tombstone-based deletion.
//! - Keys are immutable post-insert; there is no `key_mut`. The ordered
//!   wrappers rename keys in place with `alter`/`alter_index`.
//! - Serde support is behind the `serde` feature.

mod config;
mod error;
mod identity_map;
mod object_map;
mod object_map_proptest;
mod object_set;
mod ordered_map;
mod ordered_set;
pub mod placement;
pub mod policy;
mod primitive_map;
mod primitive_map_proptest;
mod primitive_set;
pub mod raw_table;
mod reentrancy;
#[cfg(feature = "serde")]
pub mod serde_impls;

// Public surface
pub use config::{TableConfig, DEFAULT_CAPACITY, DEFAULT_LOAD_FACTOR, MAX_CAPACITY, MIN_CAPACITY};
pub use error::{Error, Result};
pub use identity_map::IdentityMap;
pub use object_map::ObjectMap;
pub use object_set::ObjectSet;
pub use ordered_map::OrderedMap;
pub use ordered_set::OrderedSet;
pub use policy::{Identity, PrimitiveKey};
pub use primitive_map::{Counter, IntFloatMap, IntIntMap, IntMap, LongMap, PrimitiveMap};
pub use primitive_set::{IntSet, LongSet, PrimitiveSet};
pub use reentrancy::DebugReentrancy;

/// Iterator and cursor types, grouped per collection.
pub mod iter {
    pub mod identity_map {
        pub use crate::identity_map::{Cursor, IntoIter, Iter, IterMut};
    }
    pub mod object_map {
        pub use crate::object_map::{Cursor, IntoIter, Iter, IterMut};
    }
    pub mod object_set {
        pub use crate::object_set::{Cursor, IntoIter, Iter};
    }
    pub mod ordered_map {
        pub use crate::ordered_map::{Cursor, IntoIter, Iter};
    }
    pub mod ordered_set {
        pub use crate::ordered_set::Cursor;
    }
    pub mod primitive_map {
        pub use crate::primitive_map::{Cursor, IntoIter, Iter, IterMut};
    }
    pub mod primitive_set {
        pub use crate::primitive_set::{Cursor, Iter};
    }
}
