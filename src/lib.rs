//! chained-hashmap: a single-threaded, separately-chained hash map whose
//! collision chains are arena-backed doubly-linked sequences.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a chained hash table with caller-supplied hashing, comparison
//!   and teardown, built from two small layers that can each be reasoned
//!   about on their own.
//! - Layers:
//!   - Chain<T>: ordered doubly-linked sequence. Nodes live in a
//!     `SlotMap`; `prev`/`next` are generational keys, so there are no raw
//!     pointers and no reference cycles. Index-addressed insert/delete,
//!     linear search, early-exit traversal.
//!   - ChainedHashMap<K, V, H>: a `Vec` of optional chains ("slots"),
//!     indexed by `hash(key) % slot_count`. Owns the chains and decides
//!     when to grow.
//!
//! Constraints
//! - Single-threaded: no locking, no atomics. All mutation goes through
//!   `&mut self`.
//! - Duplicate keys are accepted: a newer entry shadows an older one until
//!   it is deleted. Each slot's chain is newest first.
//! - The destructor registered at construction runs exactly once per entry,
//!   on `delete` or when the table drops. It never runs for entries moved
//!   during a resize.
//!
//! Sizing
//! - Tables start with 16 slots and only ever double.
//! - The collision counter counts inserts that land in a slot whose chain is
//!   already allocated, even if deletes emptied it; it is not the entry
//!   count. When it reaches 3/4 of the slot count the next insert first
//!   doubles the slot array and relocates every entry (stop-the-world,
//!   O(entries)), recomputing the counter on the way.
//! - Growth reserves the new slot array before touching the live one, so an
//!   allocation failure returns `Error::OutOfMemory` and leaves the table as
//!   it was.
//!
//! Hashing and comparison
//! - `KeyHasher<K>` is implemented by any `Fn(&K) -> u64` and by
//!   `BuildKeyHasher<S>` for `K: Hash`; `ChainedHashMap::new` uses
//!   hashbrown's default hasher.
//! - Lookups take an optional comparator `(query, candidate) -> Ordering`
//!   where only `Equal` matters. The `K: Eq` entry points use `==`.
//!
//! Traversal
//! - `foreach` on both layers takes a visitor returning `ControlFlow<()>`;
//!   `Break` stops the walk immediately.
//!
//! Notes and non-goals
//! - No persistence, no concurrency, no incremental rehash.
//! - `len()` walks every slot; it is not cached.

pub mod builder;
pub mod chain;
mod chain_proptest;
pub mod chained_hash_map;
mod chained_hash_map_proptest;
mod entry;
pub mod error;
pub mod hasher;

// Public surface
pub use builder::Builder;
pub use chain::{Chain, Position};
pub use chained_hash_map::{ChainedHashMap, INITIAL_SLOT_COUNT};
pub use error::{Error, Result};
pub use hasher::{BuildKeyHasher, KeyHasher};
