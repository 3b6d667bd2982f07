//! Hash capability consumed by `ChainedHashMap`.
//!
//! Any `Fn(&K) -> u64` closure is a `KeyHasher<K>`, which is how callers
//! plug in a bespoke hash (including degenerate ones in tests). Types
//! implementing `Hash` can instead go through `BuildKeyHasher`, which
//! adapts a `BuildHasher` and defaults to hashbrown's hasher.

use core::hash::{BuildHasher, Hash};
use hashbrown::hash_map::DefaultHashBuilder;

/// Maps a key to an integer; the table reduces it modulo its slot count.
pub trait KeyHasher<K: ?Sized> {
    fn hash_key(&self, key: &K) -> u64;
}

impl<K, F> KeyHasher<K> for F
where
    K: ?Sized,
    F: Fn(&K) -> u64,
{
    #[inline]
    fn hash_key(&self, key: &K) -> u64 {
        self(key)
    }
}

/// `KeyHasher` backed by a `BuildHasher`.
#[derive(Clone, Debug, Default)]
pub struct BuildKeyHasher<S = DefaultHashBuilder> {
    build: S,
}

impl<S> BuildKeyHasher<S> {
    pub fn new(build: S) -> Self {
        Self { build }
    }
}

impl<K, S> KeyHasher<K> for BuildKeyHasher<S>
where
    K: ?Sized + Hash,
    S: BuildHasher,
{
    #[inline]
    fn hash_key(&self, key: &K) -> u64 {
        self.build.hash_one(key)
    }
}
