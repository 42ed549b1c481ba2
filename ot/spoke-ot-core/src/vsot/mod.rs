//! An implementation of the "Verified Simplest OT" base oblivious transfer protocol
//! ([DKLs18](https://eprint.iacr.org/2018/499.pdf), protocol 7).
//!
//! The sender proves knowledge of its secret key, the receiver blinds one group element
//! per slot, and a challenge/response/opening exchange over double hashes of the derived
//! keys confirms that both parties hold consistent keys. Every failed check is an
//! identifiable [`Abort`](crate::Abort).

mod config;
mod dlog;
mod error;
pub mod msgs;
mod receiver;
mod sender;

pub use config::{VsotConfig, VsotConfigBuilder, VsotConfigBuilderError};
pub use dlog::DLogProof;
pub use error::{ReceiverError, SenderError};
pub use receiver::{state as receiver_state, Receiver};
pub use sender::{state as sender_state, Sender};

use group::GroupEncoding;
use spoke_core::{
    hash::{hash, hash_to_block},
    Block, Curve, Hash, Transcript,
};

const KEY_CONTEXT: &str = "spoke vsot key";
const OPEN_CONTEXT: &str = "spoke vsot open";

/// Returns the transcript the sender's proof is bound to.
pub(crate) fn transcript<C: Curve>(config: &VsotConfig) -> Transcript {
    let mut transcript = Transcript::new(b"spoke vsot");
    transcript.append_bytes(b"session-id", config.session_id().as_bytes());
    transcript.append_u64(b"width", config.width() as u64);
    transcript.append_u64(b"depth", config.depth() as u64);
    transcript.append_bytes(b"curve", C::NAME);
    transcript
}

/// Derives the key of `slot` from the shared point `rho`.
pub(crate) fn derive_key<C: Curve>(session_id: &[u8], slot: usize, rho: &C::Point) -> Block {
    hash_to_block(
        KEY_CONTEXT,
        &[
            session_id,
            &(slot as u64).to_le_bytes(),
            rho.to_bytes().as_ref(),
        ],
    )
}

/// `H(k)`, the opening of a key.
pub(crate) fn open(key: &Block) -> Hash {
    hash(OPEN_CONTEXT, &[key.as_bytes()])
}
