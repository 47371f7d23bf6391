//! Entries: a private copy of the key plus the value cell.

use crate::error::Error;

/// Copy `bytes` into a fresh buffer, reporting allocation failure instead of
/// aborting.
pub(crate) fn copy_key(bytes: &[u8]) -> Result<Box<[u8]>, Error> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(bytes.len())?;
    buf.extend_from_slice(bytes);
    Ok(buf.into_boxed_slice())
}

#[derive(Debug)]
pub(crate) struct Entry<V> {
    key: Box<[u8]>,
    pub(crate) value: V,
}

impl<V> Entry<V> {
    pub(crate) fn new(key: Box<[u8]>, value: V) -> Self {
        Self { key, value }
    }

    #[inline]
    pub(crate) fn key(&self) -> &[u8] {
        &self.key
    }

    #[inline]
    pub(crate) fn matches(&self, key: &[u8]) -> bool {
        *self.key == *key
    }

    #[inline]
    pub(crate) fn key_and_value_mut(&mut self) -> (&[u8], &mut V) {
        (&self.key, &mut self.value)
    }

    pub(crate) fn into_value(self) -> V {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copy_is_private() {
        let mut src = b"abc".to_vec();
        let e = Entry::new(copy_key(&src).unwrap(), 5);
        src[0] = b'z';
        assert_eq!(e.key(), b"abc");
        assert_eq!(e.into_value(), 5);
    }

    /// Invariant: a match requires equal length and equal bytes.
    #[test]
    fn matches_exact_bytes() {
        let e = Entry::new(copy_key(b"a\0b").unwrap(), ());
        assert!(e.matches(b"a\0b"));
        assert!(!e.matches(b"a\0"));
        assert!(!e.matches(b"a\0bc"));
        assert!(!e.matches(b"a\0c"));

        let empty = Entry::new(copy_key(b"").unwrap(), ());
        assert!(empty.matches(b""));
        assert!(!empty.matches(b"\0"));
    }
}
