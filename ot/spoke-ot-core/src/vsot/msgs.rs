//! Messages for the VSOT protocol.

use enum_try_as_inner::EnumTryAsInner;
use serde::{Deserialize, Serialize};
use spoke_core::{serialize::points, Curve, Hash};

use super::DLogProof;

/// A VSOT protocol message.
#[derive(Debug, Clone, EnumTryAsInner, Serialize, Deserialize)]
#[derive_err(Debug)]
#[serde(bound = "")]
#[allow(missing_docs)]
pub enum Message<C: Curve> {
    SenderSetup(SenderSetup<C>),
    ReceiverPayload(ReceiverPayload<C>),
    SenderChallenge(SenderChallenge),
    ReceiverResponse(ReceiverResponse),
    SenderOpening(SenderOpening),
}

impl<C: Curve> From<MessageError<C>> for std::io::Error {
    fn from(err: MessageError<C>) -> Self {
        std::io::Error::new(std::io::ErrorKind::InvalidData, err.to_string())
    }
}

/// Sender setup message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct SenderSetup<C: Curve> {
    /// The sender's public key `A`.
    #[serde(with = "spoke_core::serialize::point")]
    pub public_key: C::Point,
    /// Proof of knowledge of the secret key.
    pub proof: DLogProof<C>,
}

/// Receiver payload message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct ReceiverPayload<C: Curve> {
    /// The blinded choice of every slot.
    #[serde(with = "points")]
    pub blinded_choices: Vec<C::Point>,
}

/// Sender challenge message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderChallenge {
    /// `H(H(k0)) ^ H(H(k1))` of every slot.
    pub challenges: Vec<Hash>,
}

/// Receiver response message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiverResponse {
    /// The response to every challenge.
    pub responses: Vec<Hash>,
}

/// Sender opening message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderOpening {
    /// `[H(k0), H(k1)]` of every slot.
    pub openings: Vec<[Hash; 2]>,
}
