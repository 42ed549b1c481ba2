//! A two-message batched base OT in the style of
//! [Masny-Rindal](https://eprint.iacr.org/2019/706.pdf).
//!
//! The sender publishes `A = a * G`. For every slot the receiver picks `b`, hides
//! `B = b * G` behind a programmable once-forgetful function keyed by its choice bit and
//! sends the pair `(r0, r1)`. The sender recovers one candidate point per bit, and only the
//! chosen one is `B`. Keys are `H(a * B_x)` on the sender side and `H(b * A)` on the
//! receiver side.
//!
//! Unlike [`vsot`](crate::vsot) there is no verification phase, so BBOT finishes in two
//! messages but offers no identifiable abort on inconsistent keys.

mod config;
mod error;
pub mod msgs;
mod receiver;
mod sender;

pub use config::{BbotConfig, BbotConfigBuilder, BbotConfigBuilderError};
pub use error::{ReceiverError, SenderError};
pub use receiver::{state as receiver_state, Receiver};
pub use sender::{state as sender_state, Sender};

use group::GroupEncoding;
use spoke_core::{curve::HashToCurveError, hash::hash_to_block, Block, Curve};

const POPF_CONTEXT: &str = "spoke bbot popf";
const KEY_CONTEXT: &str = "spoke bbot key";

/// `H_bit(slot, r)`, the point masking the other half of a slot's pair.
pub(crate) fn popf<C: Curve>(
    session_id: &[u8],
    slot: usize,
    bit: u8,
    r: &C::Point,
) -> Result<C::Point, HashToCurveError> {
    C::hash_to_point(
        POPF_CONTEXT,
        &[
            session_id,
            &(slot as u64).to_le_bytes(),
            &[bit],
            r.to_bytes().as_ref(),
        ],
    )
}

/// Derives the key of `slot` from the shared point `rho`.
pub(crate) fn derive_key<C: Curve>(
    session_id: &[u8],
    slot: usize,
    public_key: &C::Point,
    rho: &C::Point,
) -> Block {
    hash_to_block(
        KEY_CONTEXT,
        &[
            session_id,
            &(slot as u64).to_le_bytes(),
            public_key.to_bytes().as_ref(),
            rho.to_bytes().as_ref(),
        ],
    )
}
