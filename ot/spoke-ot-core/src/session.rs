use rand::{CryptoRng, Rng};
use serde::{Deserialize, Serialize};
use spoke_core::hash::hash;

/// An opaque identifier, unique per protocol run.
///
/// It is bound into every transcript and key derivation, so two runs with different ids
/// never produce related outputs. An empty id is rejected when building a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Vec<u8>);

impl SessionId {
    /// Samples a random 32-byte session id.
    pub fn random<R: Rng + CryptoRng + ?Sized>(rng: &mut R) -> Self {
        Self(rng.gen::<[u8; 32]>().to_vec())
    }

    /// Derives a sub-session id, used for a sub-protocol.
    pub fn derive(&self, label: &str) -> Self {
        Self(
            hash("spoke session", &[self.0.as_slice(), label.as_bytes()])
                .to_bytes()
                .to_vec(),
        )
    }

    /// Returns the id bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns `true` if the id is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for SessionId {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for SessionId {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl<const N: usize> From<[u8; N]> for SessionId {
    fn from(bytes: [u8; N]) -> Self {
        Self(bytes.to_vec())
    }
}

impl AsRef<[u8]> for SessionId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// The shape of a batch of OTs.
///
/// `width` OT instances, each carrying `depth` blocks per message. Block `l` of instance
/// `i` occupies slot `i * depth + l`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSize {
    /// The number of OT instances.
    pub width: usize,
    /// The number of blocks per message.
    pub depth: usize,
}

impl BatchSize {
    /// Creates a new batch size.
    pub fn new(width: usize, depth: usize) -> Self {
        Self { width, depth }
    }

    /// Returns the total number of slots.
    pub fn slots(&self) -> usize {
        self.width * self.depth
    }

    /// Returns the slot of block `l` of instance `i`.
    #[inline]
    pub fn slot(&self, i: usize, l: usize) -> usize {
        i * self.depth + l
    }
}
