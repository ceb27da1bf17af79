//! Numeric utilities: safe and centralized integer conversions.
//!
//! Wire fields are `i32` while in-memory sizes are `usize`; every crossing goes through here so
//! that an out-of-range value stops the operation instead of wrapping.

#[inline]
#[must_use]
pub fn i32_to_usize(v: i32) -> Option<usize> {
    usize::try_from(v).ok()
}

#[inline]
#[must_use]
pub fn usize_to_i32(v: usize) -> Option<i32> {
    i32::try_from(v).ok()
}

#[inline]
#[must_use]
pub fn u32_to_usize(v: u32) -> usize {
    usize::try_from(v).unwrap_or(usize::MAX)
}

#[inline]
#[must_use]
pub fn usize_to_u64(v: usize) -> u64 {
    u64::try_from(v).unwrap_or(u64::MAX)
}
