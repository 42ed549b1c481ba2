//! Seed expansion.

use rand_chacha::ChaCha20Rng;
use rand_core::{CryptoRng, RngCore, SeedableRng};

use crate::{hash::hash, Block};

const PRG_CONTEXT: &str = "spoke prg";

/// A PRG which expands a [`Block`] seed, salted with a session id and an index.
///
/// Two PRGs created from the same seed, session id and index produce the same stream.
#[derive(Clone)]
pub struct Prg(ChaCha20Rng);

opaque_debug::implement!(Prg);

impl Prg {
    /// Creates a new PRG.
    pub fn new(seed: Block, session_id: &[u8], index: usize) -> Self {
        let key = hash(
            PRG_CONTEXT,
            &[session_id, &(index as u64).to_le_bytes(), seed.as_bytes()],
        );

        Self(ChaCha20Rng::from_seed(key.to_bytes()))
    }
}

impl RngCore for Prg {
    #[inline(always)]
    fn next_u32(&mut self) -> u32 {
        self.0.next_u32()
    }

    #[inline(always)]
    fn next_u64(&mut self) -> u64 {
        self.0.next_u64()
    }

    #[inline(always)]
    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.0.fill_bytes(dest)
    }

    #[inline(always)]
    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        self.0.try_fill_bytes(dest)
    }
}

impl CryptoRng for Prg {}
