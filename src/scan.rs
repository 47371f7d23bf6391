//! Full traversal with in-place deletion and early exit.

use crate::hash::KeyHash;
use crate::map::ShiftMap;
use core::ops::ControlFlow;

/// What a [`ShiftMap::scan`] callback wants done after seeing an entry.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Scan<B = ()> {
    /// Keep the entry and move on.
    Continue,
    /// Remove the entry, dropping its value, and move on.
    Delete,
    /// Stop the scan and return `B` to the caller.
    Break(B),
}

impl<V, H: KeyHash> ShiftMap<V, H> {
    /// Visit every entry once, in slot order, letting `f` keep, delete or
    /// stop at each.
    ///
    /// The walk starts just past an empty slot. No cluster spans that point,
    /// so when a deletion shifts entries back they only ever come from
    /// positions the walk has not reached yet, and the walk re-examines the
    /// current position instead of advancing.
    ///
    /// ```
    /// use shiftmap::{Scan, ShiftMap};
    /// use std::ops::ControlFlow;
    ///
    /// let mut map = ShiftMap::new();
    /// for i in 0u32..10 {
    ///     *map.insert(&i.to_le_bytes()).unwrap() = i;
    /// }
    /// let flow = map.scan(|_, v| if *v % 2 == 1 { Scan::Delete } else { Scan::<()>::Continue });
    /// assert_eq!(flow, ControlFlow::Continue(()));
    /// assert_eq!(map.len(), 5);
    /// ```
    pub fn scan<B, F>(&mut self, mut f: F) -> ControlFlow<B>
    where
        F: FnMut(&[u8], &mut V) -> Scan<B>,
    {
        let origin = match self.table.first_vacant() {
            Some(i) => i,
            None => return ControlFlow::Continue(()),
        };
        let capacity = self.table.capacity();
        let mask = capacity - 1;

        let mut step = 1;
        while step < capacity {
            let i = (origin + step) & mask;
            let slot = match self.table.get(i) {
                Some(slot) => slot,
                None => {
                    step += 1;
                    continue;
                }
            };
            let verdict = match self.entries.get_mut(slot.entry) {
                Some(entry) => {
                    let (key, value) = entry.key_and_value_mut();
                    f(key, value)
                }
                None => Scan::Continue,
            };
            match verdict {
                Scan::Continue => step += 1,
                Scan::Delete => {
                    let _ = self.vacate(i, slot);
                }
                Scan::Break(b) => return ControlFlow::Break(b),
            }
        }
        ControlFlow::Continue(())
    }
}
