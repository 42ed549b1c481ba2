use serde::{Deserialize, Serialize};
use spoke_core::{BitVector, Block};

/// The sender's output of a batch of random OTs.
///
/// `messages[i]` holds the two `depth`-block messages of instance `i`.
#[derive(Serialize, Deserialize)]
pub struct RandomOTSenderOutput {
    /// The message pairs.
    pub messages: Vec<[Vec<Block>; 2]>,
}

opaque_debug::implement!(RandomOTSenderOutput);

impl RandomOTSenderOutput {
    /// Returns the number of OT instances.
    pub fn width(&self) -> usize {
        self.messages.len()
    }

    /// Returns the number of blocks per message.
    pub fn depth(&self) -> usize {
        self.messages.first().map(|[m0, _]| m0.len()).unwrap_or(0)
    }
}

/// The receiver's output of a batch of random OTs.
///
/// `messages[i]` equals `messages[i][choices[i]]` of the sender's output.
#[derive(Serialize, Deserialize)]
pub struct RandomOTReceiverOutput {
    /// The receiver's choice bits.
    pub choices: BitVector,
    /// The chosen messages.
    pub messages: Vec<Vec<Block>>,
}

opaque_debug::implement!(RandomOTReceiverOutput);

impl RandomOTReceiverOutput {
    /// Returns the number of OT instances.
    pub fn width(&self) -> usize {
        self.messages.len()
    }

    /// Returns the number of blocks per message.
    pub fn depth(&self) -> usize {
        self.messages.first().map(Vec::len).unwrap_or(0)
    }
}
