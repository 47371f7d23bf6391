//! Construction-time settings.

/// Longest key accepted by default. Entry key lengths stay within 32 bits.
pub const DEFAULT_MAX_KEY_LEN: usize = u32::MAX as usize - 1;

/// Settings fixed for the lifetime of a [`ShiftMap`](crate::ShiftMap).
///
/// ```
/// use shiftmap::{Config, ShiftMap};
///
/// let config = Config::new().with_max_key_len(64);
/// let map: ShiftMap<u32> = ShiftMap::with_config(config);
/// assert_eq!(map.config().max_key_len(), 64);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Config {
    max_key_len: usize,
    seed: Option<u64>,
}

impl Config {
    pub const fn new() -> Self {
        Self {
            max_key_len: DEFAULT_MAX_KEY_LEN,
            seed: None,
        }
    }

    /// Reject keys longer than `len` bytes on every lookup and mutation.
    pub const fn with_max_key_len(mut self, len: usize) -> Self {
        self.max_key_len = len;
        self
    }

    /// Use `seed` instead of a freshly generated one. The value still goes
    /// through [`sanitize_seed`](crate::sanitize_seed).
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub const fn max_key_len(&self) -> usize {
        self.max_key_len
    }

    pub const fn seed(&self) -> Option<u64> {
        self.seed
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
