//! SlotTable: the open-addressing slot array with linear probing and
//! backward-shift deletion.
//!
//! The table knows nothing about keys. A slot records where its entry lives
//! in the map's entry arena and the entry's cached hash; the caller supplies
//! key comparison to [`SlotTable::find_slot`] as a closure.
//!
//! Probe invariant: for every occupied slot `s` with home bucket
//! `h = s.hash & mask`, every slot on the cyclic path from `h` to `s` is
//! occupied. All operations here preserve it; none leaves a tombstone.

use crate::error::Error;
use slotmap::DefaultKey;

/// Smallest slot count of an allocated table.
pub(crate) const MIN_CAPACITY: usize = 16;

/// Number of live entries a table of `capacity` slots may hold at rest.
#[inline]
pub(crate) const fn load_limit(capacity: usize) -> usize {
    capacity - capacity / 4
}

/// A table is worth compacting once its entries fit in an eighth of its
/// usable capacity.
#[inline]
pub(crate) const fn compact_threshold(capacity: usize) -> usize {
    load_limit(capacity) / 8
}

/// Smallest power-of-two capacity, at least [`MIN_CAPACITY`], whose load
/// limit admits `n` entries.
///
/// A count exactly at the load limit fits without doubling: 12 entries get
/// 16 slots, not 32. Growth on insert is stricter, since it needs room for
/// one entry more than the count it finds.
pub(crate) fn capacity_for(n: usize) -> Result<usize, Error> {
    let cap = n
        .checked_next_power_of_two()
        .ok_or(Error::CapacityOverflow)?
        .max(MIN_CAPACITY);
    if n > load_limit(cap) {
        cap.checked_mul(2).ok_or(Error::CapacityOverflow)
    } else {
        Ok(cap)
    }
}

/// `k` lies in the cyclic interval `(i, j]`.
#[inline]
fn cyclic_within(i: usize, k: usize, j: usize) -> bool {
    if i <= j {
        i < k && k <= j
    } else {
        i < k || k <= j
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Slot {
    pub(crate) entry: DefaultKey,
    pub(crate) hash: u64,
}

#[derive(Debug, Default)]
pub(crate) struct SlotTable {
    slots: Vec<Option<Slot>>,
}

impl SlotTable {
    /// A table with no backing storage.
    pub(crate) const fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// An all-empty table of `capacity` slots. `capacity` must be a power
    /// of two.
    pub(crate) fn with_capacity(capacity: usize) -> Result<Self, Error> {
        debug_assert!(capacity.is_power_of_two());
        let mut slots = Vec::new();
        slots.try_reserve_exact(capacity)?;
        slots.resize(capacity, None);
        Ok(Self { slots })
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    fn mask(&self) -> usize {
        self.slots.len().wrapping_sub(1)
    }

    #[inline]
    pub(crate) fn home(&self, hash: u64) -> usize {
        hash as usize & self.mask()
    }

    #[inline]
    pub(crate) fn get(&self, i: usize) -> Option<Slot> {
        self.slots[i]
    }

    /// Fill the empty slot `i`.
    #[inline]
    pub(crate) fn occupy(&mut self, i: usize, slot: Slot) {
        debug_assert!(self.slots[i].is_none());
        self.slots[i] = Some(slot);
    }

    /// Point slot `i` at a relocated entry.
    #[inline]
    pub(crate) fn set_entry(&mut self, i: usize, entry: DefaultKey) {
        if let Some(slot) = self.slots[i].as_mut() {
            slot.entry = entry;
        }
    }

    /// Walk from the home bucket of `hash` to either the slot whose hash
    /// matches and whose entry satisfies `is_match`, or the first empty slot.
    ///
    /// The table must have storage and at least one empty slot.
    pub(crate) fn find_slot<F>(&self, hash: u64, mut is_match: F) -> usize
    where
        F: FnMut(DefaultKey) -> bool,
    {
        let mask = self.mask();
        let mut i = self.home(hash);
        while let Some(slot) = &self.slots[i] {
            if slot.hash == hash && is_match(slot.entry) {
                break;
            }
            i = (i + 1) & mask;
        }
        i
    }

    /// First empty slot at or after `hash`'s home bucket.
    fn vacant_for(&self, hash: u64) -> usize {
        let mask = self.mask();
        let mut i = self.home(hash);
        while self.slots[i].is_some() {
            i = (i + 1) & mask;
        }
        i
    }

    /// Empty slot `i` and shift the rest of its cluster back so that every
    /// entry stays reachable from its home bucket.
    ///
    /// An entry at `j` keeps its place when its home `k` lies cyclically in
    /// `(i, j]`: probing from `k` never passes the hole. Otherwise it moves
    /// into the hole and the hole moves to `j`.
    pub(crate) fn delete_slot(&mut self, mut i: usize) {
        let mask = self.mask();
        self.slots[i] = None;
        let mut j = i;
        loop {
            j = (j + 1) & mask;
            let slot = match self.slots[j] {
                Some(slot) => slot,
                None => return,
            };
            if cyclic_within(i, self.home(slot.hash), j) {
                continue;
            }
            self.slots[i] = Some(slot);
            self.slots[j] = None;
            i = j;
        }
    }

    /// Copy every slot into a fresh table of `capacity` slots, homing each by
    /// its cached hash. The entry references are unchanged.
    pub(crate) fn rehome(&self, capacity: usize) -> Result<SlotTable, Error> {
        let mut table = SlotTable::with_capacity(capacity)?;
        for (_, slot) in self.occupied() {
            let i = table.vacant_for(slot.hash);
            table.slots[i] = Some(slot);
        }
        Ok(table)
    }

    /// Place `slot` by its cached hash; the table must have a free slot.
    pub(crate) fn place(&mut self, slot: Slot) -> usize {
        let i = self.vacant_for(slot.hash);
        self.slots[i] = Some(slot);
        i
    }

    pub(crate) fn occupied(&self) -> impl Iterator<Item = (usize, Slot)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.map(|s| (i, s)))
    }

    pub(crate) fn first_vacant(&self) -> Option<usize> {
        self.slots.iter().position(Option::is_none)
    }

    /// Panics if any occupied slot is unreachable from its home bucket.
    #[cfg(test)]
    pub(crate) fn assert_probe_invariant(&self) {
        let mask = self.mask();
        for (pos, slot) in self.occupied() {
            let mut i = self.home(slot.hash);
            while i != pos {
                assert!(
                    self.slots[i].is_some(),
                    "slot {} (home {}) unreachable: hole at {}",
                    pos,
                    self.home(slot.hash),
                    i
                );
                i = (i + 1) & mask;
            }
        }
    }
}
