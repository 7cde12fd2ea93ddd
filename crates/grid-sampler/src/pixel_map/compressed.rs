//! Width-adaptive storage for non-negative indices.
//!
//! The element width is fixed at construction from the largest value the
//! array will ever hold, so a pixel map over a small grid costs one byte per
//! index instead of eight.

use crate::error::{GridError, Result};
use num_traits::NumCast;

/// Unsigned index array using the narrowest width that fits `max_value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompressedIndexArray {
    U8(Vec<u8>),
    U16(Vec<u16>),
    U32(Vec<u32>),
    U64(Vec<u64>),
}

impl CompressedIndexArray {
    /// Create an empty array able to hold values up to `max_value`.
    pub fn for_max_value(max_value: u64) -> Self {
        if max_value <= u8::MAX as u64 {
            Self::U8(Vec::new())
        } else if max_value <= u16::MAX as u64 {
            Self::U16(Vec::new())
        } else if max_value <= u32::MAX as u64 {
            Self::U32(Vec::new())
        } else {
            Self::U64(Vec::new())
        }
    }

    /// Element width in bits.
    pub fn bits(&self) -> u32 {
        match self {
            Self::U8(_) => 8,
            Self::U16(_) => 16,
            Self::U32(_) => 32,
            Self::U64(_) => 64,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::U8(v) => v.len(),
            Self::U16(v) => v.len(),
            Self::U32(v) => v.len(),
            Self::U64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append a value, failing if it does not fit the element width.
    pub fn push(&mut self, value: u64) -> Result<()> {
        let bits = self.bits();
        match self {
            Self::U8(v) => push_checked(v, value, bits),
            Self::U16(v) => push_checked(v, value, bits),
            Self::U32(v) => push_checked(v, value, bits),
            Self::U64(v) => {
                v.push(value);
                Ok(())
            }
        }
    }

    /// Value at `index`. Panics if out of bounds, like slice indexing.
    #[inline]
    pub fn get(&self, index: usize) -> u64 {
        match self {
            Self::U8(v) => v[index] as u64,
            Self::U16(v) => v[index] as u64,
            Self::U32(v) => v[index] as u64,
            Self::U64(v) => v[index],
        }
    }

    /// Exchange the values at `a` and `b`.
    #[inline]
    pub fn swap(&mut self, a: usize, b: usize) {
        match self {
            Self::U8(v) => v.swap(a, b),
            Self::U16(v) => v.swap(a, b),
            Self::U32(v) => v.swap(a, b),
            Self::U64(v) => v.swap(a, b),
        }
    }

    /// Approximate heap usage in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.len() * (self.bits() as usize / 8)
    }
}

fn push_checked<T: NumCast>(values: &mut Vec<T>, value: u64, bits: u32) -> Result<()> {
    let narrowed = <T as NumCast>::from(value).ok_or(GridError::IndexOverflow { value, bits })?;
    values.push(narrowed);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_selection() {
        assert_eq!(CompressedIndexArray::for_max_value(0).bits(), 8);
        assert_eq!(CompressedIndexArray::for_max_value(255).bits(), 8);
        assert_eq!(CompressedIndexArray::for_max_value(256).bits(), 16);
        assert_eq!(CompressedIndexArray::for_max_value(65_535).bits(), 16);
        assert_eq!(CompressedIndexArray::for_max_value(65_536).bits(), 32);
        assert_eq!(CompressedIndexArray::for_max_value(u32::MAX as u64).bits(), 32);
        assert_eq!(CompressedIndexArray::for_max_value(u32::MAX as u64 + 1).bits(), 64);
    }

    #[test]
    fn test_push_get_swap() {
        let mut array = CompressedIndexArray::for_max_value(1000);
        for value in [7u64, 999, 0, 512] {
            array.push(value).unwrap();
        }
        assert_eq!(array.len(), 4);
        assert_eq!(array.get(1), 999);

        array.swap(0, 3);
        assert_eq!(array.get(0), 512);
        assert_eq!(array.get(3), 7);
        assert_eq!(array.memory_bytes(), 8);
    }

    #[test]
    fn test_overflow_is_rejected() {
        let mut array = CompressedIndexArray::for_max_value(200);
        assert!(array.push(255).is_ok());
        let err = array.push(256).unwrap_err();
        assert!(matches!(err, GridError::IndexOverflow { value: 256, bits: 8 }));
        assert_eq!(array.len(), 1);
    }
}
