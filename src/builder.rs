//! Construction-time configuration for `ChainedHashMap`.

use crate::chained_hash_map::{ChainedHashMap, EntryDestructor};
use crate::error::{Error, Result};
use crate::hasher::KeyHasher;

/// Collects the hash and destructor capabilities before a table exists.
///
/// ```
/// use chained_hashmap::ChainedHashMap;
///
/// let mut m = ChainedHashMap::builder()
///     .hasher(|k: &u32| u64::from(*k))
///     .destructor(|_k, _v: String| {})
///     .build()
///     .unwrap();
/// m.set(1, "one".to_string()).unwrap();
/// assert_eq!(m.get(&1).map(String::as_str), Ok("one"));
/// ```
pub struct Builder<K, V, H> {
    hasher: Option<H>,
    destructor: Option<EntryDestructor<K, V>>,
}

impl<K, V, H> Default for Builder<K, V, H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, H> Builder<K, V, H> {
    pub fn new() -> Self {
        Self {
            hasher: None,
            destructor: None,
        }
    }

    pub fn hasher(mut self, hasher: H) -> Self {
        self.hasher = Some(hasher);
        self
    }

    /// Called exactly once per entry on `delete` or when the table drops,
    /// never while entries are relocated by a resize.
    pub fn destructor<F>(mut self, destroy: F) -> Self
    where
        F: FnMut(K, V) + 'static,
    {
        self.destructor = Some(Box::new(destroy));
        self
    }

    /// Fails with [`Error::MissingHasher`] when no hasher was supplied.
    pub fn build(self) -> Result<ChainedHashMap<K, V, H>>
    where
        H: KeyHasher<K>,
    {
        let hasher = self.hasher.ok_or(Error::MissingHasher)?;
        Ok(ChainedHashMap::from_parts(hasher, self.destructor))
    }
}
