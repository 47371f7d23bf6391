//! Failure modes of map operations.

use std::collections::TryReserveError;
use std::fmt;

/// Why an operation on a [`ShiftMap`](crate::ShiftMap) did not happen.
///
/// Every variant leaves the map exactly as it was before the call. A missing
/// key is not an error; lookups and removals report it as `Ok(None)`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Error {
    /// The key is longer than the configured maximum.
    KeyTooLong { len: usize, max: usize },
    /// The allocator refused to hand out memory for a slot table or a key copy.
    AllocFailed,
    /// The requested capacity does not fit in `usize`.
    CapacityOverflow,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::KeyTooLong { len, max } => {
                write!(f, "key of {} bytes exceeds the maximum of {} bytes", len, max)
            }
            Error::AllocFailed => f.write_str("memory allocation failed"),
            Error::CapacityOverflow => f.write_str("capacity overflow"),
        }
    }
}

impl std::error::Error for Error {}

impl From<TryReserveError> for Error {
    fn from(_: TryReserveError) -> Self {
        Error::AllocFailed
    }
}
