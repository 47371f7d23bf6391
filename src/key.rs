//! Borrowed key views.

use core::fmt;
use std::ffi::CStr;

/// A borrowed byte-string key.
///
/// The map never keeps a `Key`; it copies the bytes into its own entry on
/// first insertion. Every byte is significant, embedded zeros included, and
/// two keys are equal iff they have the same length and the same bytes.
#[derive(Clone, Copy, Eq, PartialEq, Hash)]
pub struct Key<'a>(&'a [u8]);

impl<'a> Key<'a> {
    /// Key over an explicit byte span.
    #[inline]
    pub const fn bytes(bytes: &'a [u8]) -> Self {
        Key(bytes)
    }

    /// Key over the UTF-8 bytes of a string.
    #[inline]
    pub const fn str(s: &'a str) -> Self {
        Key(s.as_bytes())
    }

    /// Key over a null-terminated string, excluding the terminator.
    #[inline]
    pub fn c_str(s: &'a CStr) -> Self {
        Key(s.to_bytes())
    }

    /// Key over the in-memory representation of a fixed-size value.
    #[inline]
    pub fn bin<T: BinaryKey>(value: &'a T) -> Self {
        // SAFETY: `BinaryKey` types have no padding and no uninitialized
        // bytes, so all `size_of::<T>()` bytes behind `value` are readable.
        let bytes = unsafe {
            core::slice::from_raw_parts(value as *const T as *const u8, core::mem::size_of::<T>())
        };
        Key(bytes)
    }

    #[inline]
    pub const fn as_bytes(&self) -> &'a [u8] {
        self.0
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Key<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key(\"{}\")", self.0.escape_ascii())
    }
}

impl<'a> From<&'a [u8]> for Key<'a> {
    fn from(b: &'a [u8]) -> Self {
        Key(b)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for Key<'a> {
    fn from(b: &'a [u8; N]) -> Self {
        Key(b)
    }
}

impl<'a> From<&'a Vec<u8>> for Key<'a> {
    fn from(b: &'a Vec<u8>) -> Self {
        Key(b)
    }
}

impl<'a> From<&'a str> for Key<'a> {
    fn from(s: &'a str) -> Self {
        Key(s.as_bytes())
    }
}

impl<'a> From<&'a String> for Key<'a> {
    fn from(s: &'a String) -> Self {
        Key(s.as_bytes())
    }
}

impl<'a> From<&'a CStr> for Key<'a> {
    fn from(s: &'a CStr) -> Self {
        Key(s.to_bytes())
    }
}

/// Plain values whose raw bytes can serve as a key.
///
/// # Safety
///
/// Implementors must be `Copy` types without padding or uninitialized bytes.
/// The bytes are native-endian, so such keys are only meaningful within one
/// process.
pub unsafe trait BinaryKey: Copy {}

macro_rules! binary_key {
    ($($t:ty),* $(,)?) => {
        $(unsafe impl BinaryKey for $t {})*
    };
}

binary_key!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, bool, char);

unsafe impl<T: BinaryKey, const N: usize> BinaryKey for [T; N] {}
