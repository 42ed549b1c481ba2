//! Fiat-Shamir transcripts.

use ff::PrimeField;
use group::GroupEncoding;

use crate::{Block, Curve};

/// An append-only protocol transcript.
///
/// Two transcripts fed the same sequence of appends produce identical challenges.
/// [`Clone`] forks the transcript, so a sub-protocol can derive challenges without
/// affecting the parent.
#[derive(Clone)]
pub struct Transcript(merlin::Transcript);

opaque_debug::implement!(Transcript);

impl Transcript {
    /// Creates a new transcript with the protocol label.
    pub fn new(label: &'static [u8]) -> Self {
        Self(merlin::Transcript::new(label))
    }

    /// Appends `data` under `label`.
    pub fn append_bytes(&mut self, label: &'static [u8], data: &[u8]) {
        self.0.append_message(label, data);
    }

    /// Appends an integer under `label`.
    pub fn append_u64(&mut self, label: &'static [u8], value: u64) {
        self.0.append_u64(label, value);
    }

    /// Appends a group element under `label`.
    pub fn append_point<C: Curve>(&mut self, label: &'static [u8], point: &C::Point) {
        self.0.append_message(label, point.to_bytes().as_ref());
    }

    /// Appends a scalar under `label`.
    pub fn append_scalar<C: Curve>(&mut self, label: &'static [u8], scalar: &C::Scalar) {
        self.0.append_message(label, scalar.to_repr().as_ref());
    }

    /// Returns `n` challenge bytes bound to everything appended so far.
    pub fn extract_bytes(&mut self, label: &'static [u8], n: usize) -> Vec<u8> {
        let mut bytes = vec![0u8; n];
        self.0.challenge_bytes(label, &mut bytes);
        bytes
    }

    /// Returns a challenge block.
    pub fn challenge_block(&mut self, label: &'static [u8]) -> Block {
        let mut bytes = [0u8; 16];
        self.0.challenge_bytes(label, &mut bytes);
        bytes.into()
    }

    /// Returns `n` challenge blocks.
    pub fn challenge_blocks(&mut self, label: &'static [u8], n: usize) -> Vec<Block> {
        let mut bytes = vec![0u8; n * Block::LEN];
        self.0.challenge_bytes(label, &mut bytes);
        bytes
            .chunks_exact(Block::LEN)
            .map(|chunk| {
                let mut block = [0u8; 16];
                block.copy_from_slice(chunk);
                Block::new(block)
            })
            .collect()
    }

    /// Returns a challenge scalar.
    pub fn challenge_scalar<C: Curve>(&mut self, label: &'static [u8]) -> C::Scalar {
        let mut bytes = [0u8; 64];
        self.0.challenge_bytes(label, &mut bytes);
        C::scalar_from_wide(&bytes)
    }
}
