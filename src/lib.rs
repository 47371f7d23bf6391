//! shiftmap: a single-threaded open-addressing map from byte-string keys to
//! values, with linear probing and tombstone-free deletion.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: fast insert/lookup/delete over arbitrary byte keys with low
//!   per-entry overhead, as a building block inside larger programs.
//! - Layers:
//!   - `hash`: seeded 64-bit wide-multiply folding hash behind the `KeyHash`
//!     seam, plus per-map seed generation.
//!   - `SlotTable`: power-of-two array of `Option<Slot>`, each slot holding
//!     an entry reference and that entry's cached hash. Owns probing,
//!     backward-shift deletion and re-homing.
//!   - `ShiftMap<V, H>`: owns the table, a `SlotMap` arena of entries (key
//!     copy plus value), the seed and the config. Composes the above into
//!     get/insert/remove, growth, reserve, compaction and scan.
//!
//! Constraints
//! - Single-threaded: no locks, no atomics on the data path. Share between
//!   threads by wrapping in a lock or by sharding across maps.
//! - Capacity is a power of two, at least 16, and the count never exceeds
//!   `capacity - capacity / 4` at rest.
//! - Every live key is reachable by linear probing from its home bucket
//!   `hash & (capacity - 1)` without crossing an empty slot.
//! - Keys longer than `Config::max_key_len` are rejected before hashing or
//!   allocation.
//!
//! Deletion
//! - Removing an entry empties its slot and then walks the rest of the
//!   cluster. An entry whose home bucket lies cyclically in `(hole, here]`
//!   stays; any other entry moves into the hole, which moves along with it.
//!   No tombstones are ever left behind, so probe lengths do not degrade
//!   under churn.
//!
//! Growth and shrinking
//! - An insertion that finds the table at its load limit doubles the table
//!   first. Slots are re-homed from their cached hashes; key bytes are never
//!   rehashed and entries stay where they are in the arena.
//! - `compact()` shrinks a table whose count fell to an eighth of its load
//!   limit; `reserve(n)` resizes to fit `n` in one step in either
//!   direction. Shrinking rebuilds the arena too, so memory is returned.
//! - The seed is chosen at the first allocation and never changes: cached
//!   hashes stay valid across every resize and across `clear`.
//!
//! Failure
//! - Slot tables and key copies are allocated fallibly; any failure, like
//!   an oversized key, leaves the map as it was. A missing key is not an
//!   error. Inserting an existing key returns its current value untouched.
//!
//! Scan
//! - `scan` visits each entry once and may delete the current one. The walk
//!   starts just past an empty slot so shifted entries are never revisited
//!   or skipped. The `&mut self` borrow rules out any other mutation while a
//!   scan is running.
//!
//! ```
//! use shiftmap::ShiftMap;
//!
//! let mut map: ShiftMap<u32> = ShiftMap::new();
//! *map.insert("aaa").unwrap() = 1;
//! *map.insert("bbb").unwrap() = 2;
//! assert_eq!(map.get("aaa").unwrap(), Some(&1));
//! assert_eq!(map.remove("aaa").unwrap(), Some(1));
//! assert_eq!(map.get("aaa").unwrap(), None);
//! assert_eq!(map.len(), 1);
//! ```

mod config;
mod entry;
mod error;
mod hash;
mod key;
mod map;
mod map_proptest;
mod scan;
mod table;

// Public surface
pub use config::{Config, DEFAULT_MAX_KEY_LEN};
pub use error::Error;
pub use hash::{generate_seed, hash_bytes, sanitize_seed, KeyHash, MixHasher};
pub use key::{BinaryKey, Key};
pub use map::{Iter, IterMut, ShiftMap};
pub use scan::Scan;
