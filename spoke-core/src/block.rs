//! 128-bit blocks and arithmetic in GF(2^128).

use core::ops::{BitAnd, BitAndAssign, BitXor, BitXorAssign};
use itybity::{BitIterable, BitLength, GetBit, Lsb0, Msb0};
use rand::{distributions::Standard, prelude::Distribution, CryptoRng, Rng};
use serde::{Deserialize, Serialize};
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};

/// A block of 128 bits
#[repr(transparent)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block([u8; 16]);

impl Block {
    /// The length of a block in bytes
    pub const LEN: usize = 16;
    /// The length of a block in bits
    pub const BITS: usize = 128;
    /// A zero block
    pub const ZERO: Self = Self([0; 16]);
    /// A block with all bits set to 1
    pub const ONES: Self = Self([0xff; 16]);

    /// Create a new block
    #[inline]
    pub fn new(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Returns the byte representation of the block
    #[inline]
    pub fn to_bytes(self) -> [u8; 16] {
        self.0
    }

    /// Returns a reference to the bytes of the block
    #[inline]
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Generate a random block using the provided RNG
    #[inline]
    pub fn random<R: Rng + CryptoRng + ?Sized>(rng: &mut R) -> Self {
        Self::new(rng.gen())
    }

    /// Generate a random vector of blocks using the provided RNG
    #[inline]
    pub fn random_vec<R: Rng + CryptoRng + ?Sized>(rng: &mut R, n: usize) -> Vec<Self> {
        (0..n).map(|_| rng.gen::<[u8; 16]>().into()).collect()
    }

    /// Returns bit `index` of the block (LSB0) as a [`Choice`].
    #[inline]
    pub fn choice(&self, index: usize) -> Choice {
        Choice::from((self.0[index / 8] >> (index % 8)) & 1)
    }

    /// Carry-less multiplication of two blocks, without the reduction step.
    ///
    /// Returns the low and high halves of the 256-bit product. Runs in time
    /// independent of the operands.
    #[inline]
    pub fn clmul(self, other: Self) -> (Self, Self) {
        let a = u128::from_le_bytes(self.0);
        let b = u128::from_le_bytes(other.0);

        let mut lo = 0u128;
        let mut hi = 0u128;
        for i in 0..128 {
            let mask = 0u128.wrapping_sub((b >> i) & 1);
            lo ^= (a << i) & mask;
            // `(a >> 1) >> (127 - i)` is `a >> (128 - i)` without overflowing at i = 0.
            hi ^= ((a >> 1) >> (127 - i)) & mask;
        }

        (
            Self::new(lo.to_le_bytes()),
            Self::new(hi.to_le_bytes()),
        )
    }

    /// Reduces a 256-bit product modulo `x^128 + x^7 + x^2 + x + 1`.
    #[inline]
    pub fn reduce(lo: Self, hi: Self) -> Self {
        let lo = u128::from_le_bytes(lo.0);
        let hi = u128::from_le_bytes(hi.0);

        let folded = hi ^ (hi << 1) ^ (hi << 2) ^ (hi << 7);
        let overflow = (hi >> 127) ^ (hi >> 126) ^ (hi >> 121);
        let folded = folded ^ overflow ^ (overflow << 1) ^ (overflow << 2) ^ (overflow << 7);

        Self::new((lo ^ folded).to_le_bytes())
    }

    /// The multiplication of two field elements.
    #[inline]
    pub fn gfmul(self, x: Self) -> Self {
        let (a, b) = self.clmul(x);
        Block::reduce(a, b)
    }

    /// Computes the inner product of two block vectors, without reducing the polynomial.
    pub fn inner_product_no_red(a: &[Block], b: &[Block]) -> (Block, Block) {
        assert_eq!(a.len(), b.len());
        a.iter()
            .zip(b.iter())
            .fold((Block::ZERO, Block::ZERO), |acc, (x, y)| {
                let t = x.clmul(*y);
                (t.0 ^ acc.0, t.1 ^ acc.1)
            })
    }

    /// Computes the inner product of two block vectors.
    pub fn inner_product(a: &[Block], b: &[Block]) -> Block {
        let (x, y) = Block::inner_product_no_red(a, b);
        Block::reduce(x, y)
    }

    /// Sets the least significant bit of the block
    #[inline]
    pub fn set_lsb(&mut self) {
        self.0[0] |= 1;
    }

    /// Returns the least significant bit of the block
    #[inline]
    pub fn lsb(&self) -> usize {
        ((self.0[0] & 1) == 1) as usize
    }
}

impl BitLength for Block {
    const BITS: usize = 128;
}

impl GetBit<Lsb0> for Block {
    fn get_bit(&self, index: usize) -> bool {
        GetBit::<Lsb0>::get_bit(&self.0[index / 8], index % 8)
    }
}

impl GetBit<Msb0> for Block {
    fn get_bit(&self, index: usize) -> bool {
        GetBit::<Msb0>::get_bit(&self.0[15 - (index / 8)], index % 8)
    }
}

impl BitIterable for Block {}

impl From<[u8; 16]> for Block {
    #[inline]
    fn from(bytes: [u8; 16]) -> Self {
        Block::new(bytes)
    }
}

impl<'a> TryFrom<&'a [u8]> for Block {
    type Error = <[u8; 16] as TryFrom<&'a [u8]>>::Error;

    fn try_from(value: &'a [u8]) -> Result<Self, Self::Error> {
        <[u8; 16]>::try_from(value).map(Self::from)
    }
}

impl From<Block> for [u8; 16] {
    #[inline]
    fn from(b: Block) -> Self {
        b.0
    }
}

impl AsRef<[u8]> for Block {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl AsMut<[u8]> for Block {
    #[inline]
    fn as_mut(&mut self) -> &mut [u8] {
        &mut self.0
    }
}

impl BitXor for Block {
    type Output = Self;

    #[inline]
    fn bitxor(self, other: Self) -> Self::Output {
        Self(std::array::from_fn(|i| self.0[i] ^ other.0[i]))
    }
}

impl BitXorAssign for Block {
    #[inline(always)]
    fn bitxor_assign(&mut self, rhs: Self) {
        *self = *self ^ rhs;
    }
}

impl BitAnd for Block {
    type Output = Self;

    #[inline]
    fn bitand(self, other: Self) -> Self::Output {
        Self(std::array::from_fn(|i| self.0[i] & other.0[i]))
    }
}

impl BitAndAssign for Block {
    #[inline(always)]
    fn bitand_assign(&mut self, rhs: Self) {
        *self = *self & rhs
    }
}

impl ConditionallySelectable for Block {
    #[inline]
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Self(std::array::from_fn(|i| {
            u8::conditional_select(&a.0[i], &b.0[i], choice)
        }))
    }
}

impl ConstantTimeEq for Block {
    #[inline]
    fn ct_eq(&self, other: &Self) -> Choice {
        self.0.ct_eq(&other.0)
    }
}

impl Distribution<Block> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Block {
        Block::new(rng.gen())
    }
}
