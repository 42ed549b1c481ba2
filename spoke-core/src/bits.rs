//! Packed bit vectors.
//!
//! Bit `i` of a [`BitVector`] lives in byte `i / 8` at position `i % 8` (LSB0).

use core::ops::BitXor;

use itybity::{FromBitIterator, ToBits};
use rand::{CryptoRng, Rng};
use serde::{Deserialize, Serialize};
use subtle::Choice;

/// Errors that can occur when constructing a [`BitVector`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[allow(missing_docs)]
pub enum BitsError {
    #[error("value {value} at index {index} is not a bit")]
    NonBinary { index: usize, value: u8 },
    #[error("expected {expected} bytes for {bits} bits, got {actual}")]
    LengthMismatch {
        bits: usize,
        expected: usize,
        actual: usize,
    },
    #[error("padding bits beyond bit {0} must be zero")]
    NonZeroPadding(usize),
}

/// A vector of bits packed into bytes.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Packed")]
pub struct BitVector {
    bytes: Vec<u8>,
    len: usize,
}

/// The wire form of a [`BitVector`], validated on decode.
#[derive(Deserialize)]
struct Packed {
    bytes: Vec<u8>,
    len: usize,
}

impl TryFrom<Packed> for BitVector {
    type Error = BitsError;

    fn try_from(packed: Packed) -> Result<Self, Self::Error> {
        BitVector::from_bytes(packed.bytes, packed.len)
    }
}

impl BitVector {
    /// Creates a vector of `len` zero bits.
    pub fn zeros(len: usize) -> Self {
        Self {
            bytes: vec![0u8; byte_len(len)],
            len,
        }
    }

    /// Samples `len` uniformly random bits.
    pub fn random<R: Rng + CryptoRng + ?Sized>(rng: &mut R, len: usize) -> Self {
        let mut bytes = vec![0u8; byte_len(len)];
        rng.fill_bytes(&mut bytes);

        let mut bits = Self { bytes, len };
        bits.mask_tail();
        bits
    }

    /// Packs a slice of `0`/`1` values.
    ///
    /// Fails if any entry is neither 0 nor 1.
    pub fn pack(bits: &[u8]) -> Result<Self, BitsError> {
        if let Some((index, &value)) = bits.iter().enumerate().find(|(_, b)| **b > 1) {
            return Err(BitsError::NonBinary { index, value });
        }

        Ok(bits.iter().map(|b| *b == 1).collect())
    }

    /// Unpacks the vector into one `0`/`1` byte per bit.
    pub fn unpack(&self) -> Vec<u8> {
        self.iter().map(u8::from).collect()
    }

    /// Wraps packed bytes holding `len` bits.
    ///
    /// The unused high bits of the last byte must be zero.
    pub fn from_bytes(bytes: Vec<u8>, len: usize) -> Result<Self, BitsError> {
        if bytes.len() != byte_len(len) {
            return Err(BitsError::LengthMismatch {
                bits: len,
                expected: byte_len(len),
                actual: bytes.len(),
            });
        }

        let rem = len % 8;
        if rem != 0 && bytes.last().map_or(false, |last| last >> rem != 0) {
            return Err(BitsError::NonZeroPadding(len));
        }

        Ok(Self { bytes, len })
    }

    /// Returns the number of bits.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the vector holds no bits.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the packed bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consumes the vector, returning the packed bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Returns bit `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of bounds.
    pub fn get(&self, i: usize) -> bool {
        bool::from(self.choice(i))
    }

    /// Returns bit `i` as a [`Choice`], without branching on its value.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of bounds.
    pub fn choice(&self, i: usize) -> Choice {
        self.check_index(i);
        Choice::from((self.bytes[i / 8] >> (i % 8)) & 1)
    }

    /// Sets bit `i` to 1.
    pub fn set(&mut self, i: usize) {
        self.check_index(i);
        self.bytes[i / 8] |= 1 << (i % 8);
    }

    /// Sets bit `i` to 0.
    pub fn clear(&mut self, i: usize) {
        self.check_index(i);
        self.bytes[i / 8] &= !(1 << (i % 8));
    }

    /// Swaps bits `i` and `j`.
    pub fn swap(&mut self, i: usize, j: usize) {
        self.check_index(i);
        self.check_index(j);

        let a = (self.bytes[i / 8] >> (i % 8)) & 1;
        let b = (self.bytes[j / 8] >> (j % 8)) & 1;
        let diff = a ^ b;
        self.bytes[i / 8] ^= diff << (i % 8);
        self.bytes[j / 8] ^= diff << (j % 8);
    }

    /// Tiles the vector `n` times, so bit `k * len + i` of the result is bit `i`.
    pub fn repeat(&self, n: usize) -> Self {
        if self.len % 8 == 0 {
            return Self {
                bytes: self.bytes.repeat(n),
                len: self.len * n,
            };
        }

        (0..n).flat_map(|_| self.iter()).collect()
    }

    /// Appends the bits of `other`.
    pub fn append(&mut self, other: &BitVector) {
        if self.len % 8 == 0 {
            self.bytes.extend_from_slice(&other.bytes);
            self.len += other.len;
        } else {
            *self = self.iter().chain(other.iter()).collect();
        }
    }

    /// Returns an iterator over the bits.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.bytes.iter_lsb0().take(self.len)
    }

    fn check_index(&self, i: usize) {
        assert!(
            i < self.len,
            "bit index {} out of range for length {}",
            i,
            self.len
        );
    }

    fn mask_tail(&mut self) {
        let rem = self.len % 8;
        if rem != 0 {
            if let Some(last) = self.bytes.last_mut() {
                *last &= (1u8 << rem) - 1;
            }
        }
    }
}

impl std::fmt::Debug for BitVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BitVector")
            .field("len", &self.len)
            .finish_non_exhaustive()
    }
}

impl FromIterator<bool> for BitVector {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        let bits: Vec<bool> = iter.into_iter().collect();
        let len = bits.len();

        Self {
            bytes: Vec::<u8>::from_lsb0_iter(bits),
            len,
        }
    }
}

impl BitXor for &BitVector {
    type Output = BitVector;

    /// # Panics
    ///
    /// Panics if the lengths differ.
    fn bitxor(self, rhs: Self) -> Self::Output {
        assert_eq!(self.len, rhs.len, "bit vector lengths must match");

        BitVector {
            bytes: self
                .bytes
                .iter()
                .zip(&rhs.bytes)
                .map(|(a, b)| a ^ b)
                .collect(),
            len: self.len,
        }
    }
}

#[inline]
fn byte_len(bits: usize) -> usize {
    (bits + 7) / 8
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;
    use rstest::*;

    #[fixture]
    fn unpacked() -> Vec<u8> {
        let mut rng = ChaCha12Rng::seed_from_u64(0);
        (0..77).map(|_| rng.gen_range(0..2)).collect()
    }

    #[rstest]
    fn test_pack_unpack(unpacked: Vec<u8>) {
        let packed = BitVector::pack(&unpacked).unwrap();

        assert_eq!(packed.len(), 77);
        assert_eq!(packed.as_bytes().len(), 10);
        assert_eq!(packed.unpack(), unpacked);
    }

    #[test]
    fn test_pack_layout() {
        let packed = BitVector::pack(&[1, 0, 0, 0, 0, 0, 0, 0, 0, 1]).unwrap();

        assert_eq!(packed.as_bytes(), &[0x01, 0x02]);
    }

    #[test]
    fn test_pack_non_binary() {
        let err = BitVector::pack(&[0, 1, 2, 1]).unwrap_err();

        assert_eq!(err, BitsError::NonBinary { index: 2, value: 2 });
    }

    #[test]
    fn test_from_bytes_length() {
        assert!(BitVector::from_bytes(vec![0u8; 2], 16).is_ok());
        assert!(BitVector::from_bytes(vec![0u8; 2], 9).is_ok());

        let err = BitVector::from_bytes(vec![0u8; 2], 17).unwrap_err();
        assert_eq!(
            err,
            BitsError::LengthMismatch {
                bits: 17,
                expected: 3,
                actual: 2
            }
        );
    }

    #[test]
    fn test_from_bytes_padding() {
        let bits = BitVector::from_bytes(vec![0xff, 0x01], 9).unwrap();
        assert_eq!(bits.unpack(), vec![1; 9]);

        let err = BitVector::from_bytes(vec![0xff, 0x03], 9).unwrap_err();
        assert_eq!(err, BitsError::NonZeroPadding(9));
    }

    #[test]
    fn test_deserialize_validates() {
        let bits = BitVector::pack(&[1, 0, 1]).unwrap();
        let bytes = bincode::serialize(&bits).unwrap();
        assert_eq!(bincode::deserialize::<BitVector>(&bytes).unwrap(), bits);

        let dirty = bincode::serialize(&(vec![0x85u8], 3usize)).unwrap();
        assert!(bincode::deserialize::<BitVector>(&dirty).is_err());

        let short = bincode::serialize(&(vec![0x05u8], 9usize)).unwrap();
        assert!(bincode::deserialize::<BitVector>(&short).is_err());
    }

    #[test]
    fn test_set_clear_swap() {
        let mut bits = BitVector::zeros(20);

        bits.set(3);
        bits.set(17);
        assert!(bits.get(3));
        assert!(bits.get(17));
        assert!(!bits.get(4));

        bits.swap(3, 4);
        assert!(!bits.get(3));
        assert!(bits.get(4));

        // swapping equal bits is a no-op
        bits.swap(0, 1);
        assert!(!bits.get(0));
        assert!(!bits.get(1));

        bits.clear(17);
        assert!(!bits.get(17));
        assert_eq!(bits.iter().filter(|b| *b).count(), 1);
    }

    #[test]
    #[should_panic]
    fn test_out_of_range() {
        let bits = BitVector::zeros(9);
        bits.get(9);
    }

    #[rstest]
    #[case::byte_aligned(16)]
    #[case::unaligned(13)]
    fn test_repeat(#[case] len: usize) {
        let mut rng = ChaCha12Rng::seed_from_u64(1);
        let bits = BitVector::random(&mut rng, len);

        let tiled = bits.repeat(3);

        assert_eq!(tiled.len(), 3 * len);
        for k in 0..3 {
            for i in 0..len {
                assert_eq!(tiled.get(k * len + i), bits.get(i));
            }
        }
    }

    #[test]
    fn test_append_unaligned() {
        let mut a = BitVector::pack(&[1, 0, 1]).unwrap();
        let b = BitVector::pack(&[1, 1]).unwrap();

        a.append(&b);

        assert_eq!(a.unpack(), vec![1, 0, 1, 1, 1]);
    }

    #[test]
    fn test_random_masks_tail() {
        let mut rng = ChaCha12Rng::seed_from_u64(2);
        let bits = BitVector::random(&mut rng, 12);

        assert_eq!(bits.as_bytes()[1] & 0xf0, 0);
    }

    #[test]
    fn test_xor() {
        let a = BitVector::pack(&[1, 0, 1, 1]).unwrap();
        let b = BitVector::pack(&[1, 1, 0, 1]).unwrap();

        assert_eq!((&a ^ &b).unpack(), vec![0, 1, 1, 0]);
    }
}
