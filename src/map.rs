//! ShiftMap: owns the slot table, the entry arena, the seed and the config,
//! and composes probing, growth, deletion and compaction.

use crate::config::Config;
use crate::entry::{self, Entry};
use crate::error::Error;
use crate::hash::{generate_seed, sanitize_seed, KeyHash, MixHasher};
use crate::key::Key;
use crate::table::{self, Slot, SlotTable, MIN_CAPACITY};
use slotmap::{DefaultKey, SlotMap};

/// A map from byte-string keys to values of type `V`.
///
/// Keys are copied into the map on first insertion; lookups borrow them.
/// Single-threaded: wrap the map in a lock, or shard across several maps, to
/// share it between threads.
pub struct ShiftMap<V, H = MixHasher> {
    pub(crate) table: SlotTable,
    pub(crate) entries: SlotMap<DefaultKey, Entry<V>>,
    seed: Option<u64>,
    config: Config,
    hasher: H,
}

impl<V> ShiftMap<V> {
    /// An empty map. Nothing is allocated until the first insertion.
    pub fn new() -> Self {
        Self::with_config_and_hasher(Config::new(), MixHasher)
    }

    pub fn with_config(config: Config) -> Self {
        Self::with_config_and_hasher(config, MixHasher)
    }

    /// A map whose table already holds `capacity` entries without growing.
    pub fn with_capacity(capacity: usize) -> Result<Self, Error> {
        let mut map = Self::new();
        map.reserve(capacity)?;
        Ok(map)
    }
}

impl<V> Default for ShiftMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over `(key, &value)` pairs, in no particular order.
pub struct Iter<'a, V> {
    it: slotmap::basic::Iter<'a, DefaultKey, Entry<V>>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a [u8], &'a V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(_, e)| (e.key(), &e.value))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

/// Iterator over `(key, &mut value)` pairs, in no particular order.
pub struct IterMut<'a, V> {
    it: slotmap::basic::IterMut<'a, DefaultKey, Entry<V>>,
}

impl<'a, V> Iterator for IterMut<'a, V> {
    type Item = (&'a [u8], &'a mut V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(_, e)| e.key_and_value_mut())
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<V, H: KeyHash> ShiftMap<V, H> {
    pub fn with_hasher(hasher: H) -> Self {
        Self::with_config_and_hasher(Config::new(), hasher)
    }

    pub fn with_config_and_hasher(config: Config, hasher: H) -> Self {
        Self {
            table: SlotTable::new(),
            entries: SlotMap::with_key(),
            seed: None,
            config,
            hasher,
        }
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of slots in the table; zero when nothing is allocated.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Entries the current table holds before the next insertion grows it.
    pub fn load_limit(&self) -> usize {
        table::load_limit(self.table.capacity())
    }

    /// The seed in use, fixed at the first allocation.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn check<'k>(&self, key: Key<'k>) -> Result<&'k [u8], Error> {
        let max = self.config.max_key_len();
        if key.len() > max {
            return Err(Error::KeyTooLong {
                len: key.len(),
                max,
            });
        }
        Ok(key.as_bytes())
    }

    /// Position and contents of the slot holding `bytes`, if any.
    fn lookup(&self, bytes: &[u8]) -> Option<(usize, Slot)> {
        let seed = self.seed?;
        if self.entries.is_empty() {
            return None;
        }
        let i = self.find_slot(self.hasher.hash_key(bytes, seed), bytes);
        self.table.get(i).map(|slot| (i, slot))
    }

    pub fn get<'k>(&self, key: impl Into<Key<'k>>) -> Result<Option<&V>, Error> {
        let bytes = self.check(key.into())?;
        Ok(self
            .lookup(bytes)
            .and_then(|(_, slot)| self.entries.get(slot.entry))
            .map(|e| &e.value))
    }

    pub fn get_mut<'k>(&mut self, key: impl Into<Key<'k>>) -> Result<Option<&mut V>, Error> {
        let bytes = self.check(key.into())?;
        Ok(match self.lookup(bytes) {
            Some((_, slot)) => self.entries.get_mut(slot.entry).map(|e| &mut e.value),
            None => None,
        })
    }

    pub fn contains_key<'k>(&self, key: impl Into<Key<'k>>) -> Result<bool, Error> {
        let bytes = self.check(key.into())?;
        Ok(self.lookup(bytes).is_some())
    }

    /// The value cell for `key`, created holding `V::default()` if the key is
    /// new. An existing value is never touched.
    pub fn insert<'k>(&mut self, key: impl Into<Key<'k>>) -> Result<&mut V, Error>
    where
        V: Default,
    {
        self.insert_with(key, V::default)
    }

    /// Like [`insert`](Self::insert), running `default` only when a new entry
    /// is created.
    pub fn insert_with<'k, F>(&mut self, key: impl Into<Key<'k>>, default: F) -> Result<&mut V, Error>
    where
        F: FnOnce() -> V,
    {
        let bytes = self.check(key.into())?;
        if let Some((_, slot)) = self.lookup(bytes) {
            return Ok(&mut self.entries[slot.entry].value);
        }

        // Nothing is allocated or seeded until the key copy has succeeded.
        let key = entry::copy_key(bytes)?;
        if self.len() == self.load_limit() {
            self.grow()?;
        }
        let seed = self.ensure_seed();
        let hash = self.hasher.hash_key(bytes, seed);
        let i = self.find_slot(hash, bytes);
        let entry = self.entries.insert(Entry::new(key, default()));
        self.table.occupy(i, Slot { entry, hash });
        Ok(&mut self.entries[entry].value)
    }

    fn find_slot(&self, hash: u64, bytes: &[u8]) -> usize {
        self.table.find_slot(hash, |k| {
            self.entries
                .get(k)
                .map(|e| e.matches(bytes))
                .unwrap_or(false)
        })
    }

    /// Remove `key`, handing back its value.
    pub fn remove<'k>(&mut self, key: impl Into<Key<'k>>) -> Result<Option<V>, Error> {
        let bytes = self.check(key.into())?;
        Ok(match self.lookup(bytes) {
            Some((i, slot)) => self.vacate(i, slot),
            None => None,
        })
    }

    /// Drop the entry of slot `i` and close the gap behind it.
    pub(crate) fn vacate(&mut self, i: usize, slot: Slot) -> Option<V> {
        self.table.delete_slot(i);
        self.entries.remove(slot.entry).map(Entry::into_value)
    }

    /// Resize so that `n` entries (or the current count, if larger) fit
    /// without growth. Shrinks as well as grows; `reserve(0)` on an empty map
    /// releases the table.
    pub fn reserve(&mut self, n: usize) -> Result<(), Error> {
        let n = n.max(self.len());
        if n == 0 {
            if self.table.capacity() != 0 {
                tracing::debug!(from = self.table.capacity(), "released empty slot table");
            }
            self.table = SlotTable::new();
            self.entries = SlotMap::with_key();
            return Ok(());
        }
        let capacity = table::capacity_for(n)?;
        if capacity == self.table.capacity() {
            return Ok(());
        }
        self.resize(capacity)
    }

    /// Shrink the table to fit if it is sparsely used: the count is at most
    /// an eighth of the load limit and the table is larger than the minimum.
    /// Otherwise do nothing.
    pub fn compact(&mut self) -> Result<(), Error> {
        let capacity = self.table.capacity();
        if capacity <= MIN_CAPACITY || self.len() > table::compact_threshold(capacity) {
            tracing::trace!(capacity, len = self.len(), "compaction skipped");
            return Ok(());
        }
        let target = table::capacity_for(self.len())?;
        if target >= capacity {
            return Ok(());
        }
        self.resize(target)
    }

    /// Drop every entry and release all storage. The seed is kept.
    pub fn clear(&mut self) {
        self.clear_with(drop)
    }

    /// Like [`clear`](Self::clear), handing each value to `release` first.
    pub fn clear_with<F>(&mut self, mut release: F)
    where
        F: FnMut(V),
    {
        tracing::trace!(len = self.len(), capacity = self.table.capacity(), "clearing map");
        let entries = std::mem::replace(&mut self.entries, SlotMap::with_key());
        self.table = SlotTable::new();
        for (_, entry) in entries {
            release(entry.into_value());
        }
    }

    /// The seed, chosen on first use and never changed afterwards.
    fn ensure_seed(&mut self) -> u64 {
        let config = self.config;
        *self
            .seed
            .get_or_insert_with(|| config.seed().map_or_else(generate_seed, sanitize_seed))
    }

    fn grow(&mut self) -> Result<(), Error> {
        let capacity = match self.table.capacity() {
            0 => MIN_CAPACITY,
            c => c.checked_mul(2).ok_or(Error::CapacityOverflow)?,
        };
        self.resize(capacity)
    }

    /// Move to a table of `capacity` slots. Growing re-homes slots over the
    /// same entries; shrinking also rebuilds the entry arena so its memory is
    /// returned.
    fn resize(&mut self, capacity: usize) -> Result<(), Error> {
        debug_assert!(self.len() <= table::load_limit(capacity));
        let from = self.table.capacity();
        if capacity >= from {
            self.table = self.table.rehome(capacity)?;
        } else {
            self.rebuild(capacity)?;
        }
        self.ensure_seed();
        tracing::debug!(from, to = capacity, len = self.len(), "resized slot table");
        Ok(())
    }

    fn rebuild(&mut self, capacity: usize) -> Result<(), Error> {
        let mut table = SlotTable::with_capacity(capacity)?;
        let mut entries = SlotMap::with_capacity_and_key(self.len());
        for (_, slot) in self.table.occupied() {
            if let Some(entry) = self.entries.remove(slot.entry) {
                let i = table.place(slot);
                table.set_entry(i, entries.insert(entry));
            }
        }
        self.table = table;
        self.entries = entries;
        Ok(())
    }

    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            it: self.entries.iter(),
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, V> {
        IterMut {
            it: self.entries.iter_mut(),
        }
    }

    /// Panics unless the probe invariant, the load limit and the slot/entry
    /// correspondence all hold.
    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        let cap = self.table.capacity();
        if cap == 0 {
            assert!(self.entries.is_empty());
            return;
        }
        assert!(cap.is_power_of_two() && cap >= MIN_CAPACITY, "capacity {}", cap);
        assert!(self.len() <= table::load_limit(cap), "len {} over limit of {}", self.len(), cap);
        assert_eq!(self.table.occupied().count(), self.len());
        self.table.assert_probe_invariant();
        let seed = self.seed.expect("allocated map has a seed");
        for (_, slot) in self.table.occupied() {
            let e = &self.entries[slot.entry];
            assert_eq!(self.hasher.hash_key(e.key(), seed), slot.hash);
        }
    }

    /// Slot index of `key`, for layout assertions.
    #[cfg(test)]
    pub(crate) fn slot_of(&self, key: &[u8]) -> Option<usize> {
        self.lookup(key).map(|(i, _)| i)
    }
}

impl<'a, V, H: KeyHash> IntoIterator for &'a ShiftMap<V, H> {
    type Item = (&'a [u8], &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, V, H: KeyHash> IntoIterator for &'a mut ShiftMap<V, H> {
    type Item = (&'a [u8], &'a mut V);
    type IntoIter = IterMut<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
