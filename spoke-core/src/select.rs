//! Constant-time selection on secret bits.
//!
//! Protocol code must never branch on a secret choice bit. Everything that
//! depends on one goes through these helpers.

use subtle::{Choice, ConditionallySelectable};

/// Returns `a` if `choice` is 0 and `b` if `choice` is 1.
#[inline]
pub fn select<T: ConditionallySelectable>(choice: Choice, a: &T, b: &T) -> T {
    T::conditional_select(a, b, choice)
}

/// Writes `a` into `out` if `choice` is 0 and `b` if `choice` is 1.
///
/// # Panics
///
/// Panics if the slices differ in length.
#[inline]
pub fn select_bytes(choice: Choice, a: &[u8], b: &[u8], out: &mut [u8]) {
    assert_eq!(a.len(), b.len());
    assert_eq!(a.len(), out.len());

    out.iter_mut()
        .zip(a.iter().zip(b))
        .for_each(|(o, (a, b))| *o = u8::conditional_select(a, b, choice));
}

/// Xors `src` into `dst` if `choice` is 1, leaves `dst` unchanged otherwise.
///
/// # Panics
///
/// Panics if the slices differ in length.
#[inline]
pub fn xor_if(choice: Choice, dst: &mut [u8], src: &[u8]) {
    assert_eq!(dst.len(), src.len());

    let mask = 0u8.wrapping_sub(choice.unwrap_u8());
    dst.iter_mut().zip(src).for_each(|(d, s)| *d ^= s & mask);
}
