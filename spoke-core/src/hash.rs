//! Domain-separated hashing.

use core::ops::BitXor;

use blake3::Hasher;
use serde::{Deserialize, Serialize};
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};

use crate::Block;

/// A 32-byte digest.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hash([u8; 32]);

impl Hash {
    /// The length of a digest in bytes.
    pub const LEN: usize = 32;

    /// Creates a digest from raw bytes.
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the digest bytes.
    pub fn to_bytes(self) -> [u8; 32] {
        self.0
    }

    /// Returns a reference to the digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hashes the digest itself, `H(self)`.
    pub fn digest(&self) -> Self {
        Self(*blake3::hash(&self.0).as_bytes())
    }
}

impl From<[u8; 32]> for Hash {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl BitXor for Hash {
    type Output = Self;

    fn bitxor(self, rhs: Self) -> Self::Output {
        Self(std::array::from_fn(|i| self.0[i] ^ rhs.0[i]))
    }
}

impl ConstantTimeEq for Hash {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.0.ct_eq(&other.0)
    }
}

impl ConditionallySelectable for Hash {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Self(std::array::from_fn(|i| {
            u8::conditional_select(&a.0[i], &b.0[i], choice)
        }))
    }
}

/// Returns a hasher keyed to `context`, absorbing each part with a length prefix.
fn hasher(context: &str, parts: &[&[u8]]) -> Hasher {
    let mut h = Hasher::new_derive_key(context);
    for part in parts {
        h.update(&(part.len() as u64).to_le_bytes());
        h.update(part);
    }
    h
}

/// Hashes `parts` under the domain `context`.
pub fn hash(context: &str, parts: &[&[u8]]) -> Hash {
    Hash(*hasher(context, parts).finalize().as_bytes())
}

/// Hashes `parts` under the domain `context`, truncating the digest to a [`Block`].
pub fn hash_to_block(context: &str, parts: &[&[u8]]) -> Block {
    let digest = hasher(context, parts).finalize();

    let mut block = [0u8; 16];
    block.copy_from_slice(&digest.as_bytes()[..16]);
    block.into()
}

/// Hashes `parts` under the domain `context` into 64 bytes of output.
pub fn hash_wide(context: &str, parts: &[&[u8]]) -> [u8; 64] {
    let mut out = [0u8; 64];
    hasher(context, parts).finalize_xof().fill(&mut out);
    out
}
