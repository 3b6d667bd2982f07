//! ChainedHashMap: slot array of chains with collision-triggered doubling.

use crate::builder::Builder;
use crate::chain::{self, Chain};
use crate::entry::Entry;
use crate::error::{Error, Result};
use crate::hasher::{BuildKeyHasher, KeyHasher};
use core::cmp::Ordering;
use core::fmt;
use core::ops::ControlFlow;
use tracing::{debug, trace, warn};

/// Slot count of a freshly built table.
pub const INITIAL_SLOT_COUNT: usize = 16;

/// Caller-supplied teardown for a key/value pair.
pub type EntryDestructor<K, V> = Box<dyn FnMut(K, V)>;

type Slot<K, V> = Option<Chain<Entry<K, V>>>;

// floor(0.75 * slot_count); slot counts are powers of two >= 16.
fn threshold_for(slot_count: usize) -> usize {
    slot_count / 4 * 3
}

fn slot_for<K, H>(hasher: &H, key: &K, slot_count: usize) -> usize
where
    K: ?Sized,
    H: KeyHasher<K> + ?Sized,
{
    (hasher.hash_key(key) % slot_count as u64) as usize
}

// Doubled slot count, or `OutOfMemory` once doubling overflows `usize`.
fn grown_slot_count(slot_count: usize) -> Result<usize> {
    slot_count.checked_mul(2).ok_or_else(|| {
        warn!(slot_count, "slot count overflow, not resizing");
        Error::OutOfMemory
    })
}

// Equality-only comparator used by the `K: Eq` entry points.
fn eq_cmp<K: Eq>(a: &K, b: &K) -> Ordering {
    if a == b {
        Ordering::Equal
    } else {
        Ordering::Less
    }
}

/// Separately-chained hash map.
///
/// Entries hash into one of `slot_count` slots; each occupied slot owns a
/// [`Chain`] with the most recently inserted entry first. Duplicate keys
/// are allowed and shadow older entries until deleted.
pub struct ChainedHashMap<K, V, H = BuildKeyHasher> {
    hasher: H,
    slots: Vec<Slot<K, V>>,
    collisions: usize,
    threshold: usize,
    destroy: Option<EntryDestructor<K, V>>,
}

impl<K, V> ChainedHashMap<K, V>
where
    K: core::hash::Hash,
{
    pub fn new() -> Self {
        Self::with_hasher(BuildKeyHasher::default())
    }
}

impl<K, V> Default for ChainedHashMap<K, V>
where
    K: core::hash::Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, H> ChainedHashMap<K, V, H>
where
    H: KeyHasher<K>,
{
    /// Empty table with 16 slots hashing keys through `hasher`.
    pub fn with_hasher(hasher: H) -> Self {
        Self::from_parts(hasher, None)
    }

    /// Start a [`Builder`], the only way to register a destructor.
    pub fn builder() -> Builder<K, V, H> {
        Builder::new()
    }

    pub(crate) fn from_parts(hasher: H, destroy: Option<EntryDestructor<K, V>>) -> Self {
        let mut slots = Vec::with_capacity(INITIAL_SLOT_COUNT);
        slots.resize_with(INITIAL_SLOT_COUNT, || None);
        Self {
            hasher,
            slots,
            collisions: 0,
            threshold: threshold_for(INITIAL_SLOT_COUNT),
            destroy,
        }
    }

    #[inline]
    fn slot_index(&self, key: &K) -> usize {
        slot_for(&self.hasher, key, self.slots.len())
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Inserts that landed in a slot with an allocated chain since the last
    /// resize, plus the collisions recomputed by that resize.
    pub fn collision_count(&self) -> usize {
        self.collisions
    }

    pub fn resize_threshold(&self) -> usize {
        self.threshold
    }

    /// Sum of all chain lengths; walks every slot.
    pub fn len(&self) -> usize {
        self.slots.iter().flatten().map(Chain::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().flatten().all(Chain::is_empty)
    }

    /// Insert `(key, value)` in front of its slot's chain.
    ///
    /// Existing entries with an equal key are kept and shadowed. Landing in
    /// a slot that already holds a chain counts as a collision, even when
    /// deletes have emptied that chain. When this insert brings the
    /// collision count to the resize threshold, the slot array doubles
    /// before the entry is placed; if that growth fails the table is left
    /// untouched and `Error::OutOfMemory` is returned.
    pub fn set(&mut self, key: K, value: V) -> Result<()> {
        let index = self.slot_index(&key);
        let pending = self.collisions + usize::from(self.slots[index].is_some());

        let index = if pending >= self.threshold {
            self.resize()?;
            self.slot_index(&key)
        } else {
            self.collisions = pending;
            index
        };

        self.slots[index]
            .get_or_insert_with(Chain::new)
            .prepend(Entry::new(key, value));
        Ok(())
    }

    fn resize(&mut self) -> Result<()> {
        let new_count = grown_slot_count(self.slots.len())?;
        self.rehash(new_count)
    }

    // Move every entry into a fresh array of `new_count` slots. Entries move
    // by value; nothing reaches the destructor. The new array is reserved
    // before the live one is touched.
    fn rehash(&mut self, new_count: usize) -> Result<()> {
        let old_count = self.slots.len();
        let mut slots: Vec<Slot<K, V>> = Vec::new();
        if let Err(err) = slots.try_reserve_exact(new_count) {
            warn!(slot_count = old_count, new_count, %err, "slot array growth failed");
            return Err(Error::OutOfMemory);
        }
        slots.resize_with(new_count, || None);

        let mut collisions = 0;
        for chain in self.slots.drain(..).flatten() {
            // Tail first, not head first: prepending in chain order would
            // reverse every chain and let older duplicates shadow newer ones.
            for entry in chain.into_iter().rev() {
                let dest = &mut slots[slot_for(&self.hasher, entry.key(), new_count)];
                if dest.is_some() {
                    collisions += 1;
                }
                dest.get_or_insert_with(Chain::new).prepend(entry);
            }
        }

        debug!(
            old_slot_count = old_count,
            new_slot_count = new_count,
            collisions,
            "resized chained hash map"
        );
        self.slots = slots;
        self.collisions = collisions;
        self.threshold = threshold_for(new_count);
        Ok(())
    }

    /// Value of the most recent entry whose key compares `Equal` to `key`.
    pub fn get_by<F>(&self, key: &K, mut cmp: F) -> Result<&V>
    where
        F: FnMut(&K, &K) -> Ordering,
    {
        let chain = self.slots[self.slot_index(key)]
            .as_ref()
            .ok_or(Error::NotFound)?;
        chain
            .find_data(|entry| cmp(key, entry.key()))
            .map(|(_, entry)| entry.value())
            .ok_or(Error::NotFound)
    }

    pub fn get(&self, key: &K) -> Result<&V>
    where
        K: Eq,
    {
        self.get_by(key, eq_cmp)
    }

    pub fn get_mut_by<F>(&mut self, key: &K, mut cmp: F) -> Result<&mut V>
    where
        F: FnMut(&K, &K) -> Ordering,
    {
        let index = self.slot_index(key);
        let chain = self.slots[index].as_mut().ok_or(Error::NotFound)?;
        let pos = chain
            .find(|entry| cmp(key, entry.key()))
            .ok_or(Error::NotFound)?;
        chain.get_mut(pos).map(Entry::value_mut)
    }

    pub fn get_mut(&mut self, key: &K) -> Result<&mut V>
    where
        K: Eq,
    {
        self.get_mut_by(key, eq_cmp)
    }

    pub fn contains_key(&self, key: &K) -> bool
    where
        K: Eq,
    {
        self.get(key).is_ok()
    }

    /// Remove the most recent entry matching `key` and hand it to the
    /// destructor. Older entries with the same key become visible again.
    pub fn delete_by<F>(&mut self, key: &K, mut cmp: F) -> Result<()>
    where
        F: FnMut(&K, &K) -> Ordering,
    {
        let index = self.slot_index(key);
        let Some(chain) = self.slots[index].as_mut() else {
            trace!(slot = index, "delete on empty slot");
            return Err(Error::NotFound);
        };
        let Some(pos) = chain.find(|entry| cmp(key, entry.key())) else {
            trace!(slot = index, "delete found no matching key");
            return Err(Error::NotFound);
        };
        let (k, v) = chain.remove_at(pos)?.into_parts();
        if let Some(destroy) = self.destroy.as_mut() {
            destroy(k, v);
        }
        Ok(())
    }

    pub fn delete(&mut self, key: &K) -> Result<()>
    where
        K: Eq,
    {
        self.delete_by(key, eq_cmp)
    }

    /// Visit entries slot by slot, each chain newest first, stopping on
    /// the first `Break`.
    pub fn foreach<F>(&self, mut visit: F) -> ControlFlow<()>
    where
        F: FnMut(&K, &V) -> ControlFlow<()>,
    {
        self.iter().try_for_each(|(k, v)| visit(k, v))
    }

    pub fn foreach_mut<F>(&mut self, mut visit: F) -> ControlFlow<()>
    where
        F: FnMut(&K, &mut V) -> ControlFlow<()>,
    {
        self.slots.iter_mut().flatten().try_for_each(|chain| {
            chain.foreach_mut(|_, entry| {
                let (k, v) = entry.parts_mut();
                visit(k, v)
            })
        })
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            slots: self.slots.iter(),
            chain: None,
        }
    }
}

impl<K, V, H> Drop for ChainedHashMap<K, V, H> {
    fn drop(&mut self) {
        let Some(mut destroy) = self.destroy.take() else {
            return;
        };
        for chain in self.slots.drain(..).flatten() {
            for entry in chain {
                let (k, v) = entry.into_parts();
                destroy(k, v);
            }
        }
    }
}

impl<K, V, H> fmt::Debug for ChainedHashMap<K, V, H>
where
    K: fmt::Debug,
    V: fmt::Debug,
    H: KeyHasher<K>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Iterator over `(&K, &V)` in slot order, newest first within a slot.
pub struct Iter<'a, K, V> {
    slots: core::slice::Iter<'a, Slot<K, V>>,
    chain: Option<chain::Iter<'a, Entry<K, V>>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.chain.as_mut().and_then(Iterator::next) {
                return Some((entry.key(), entry.value()));
            }
            self.chain = self.slots.next()?.as_ref().map(Chain::iter);
        }
    }
}

impl<'a, K, V, H> IntoIterator for &'a ChainedHashMap<K, V, H>
where
    H: KeyHasher<K>,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
