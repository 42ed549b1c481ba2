//! Messages for the BBOT protocol.

use enum_try_as_inner::EnumTryAsInner;
use serde::{Deserialize, Serialize};
use spoke_core::{serialize::points, Curve};

/// A BBOT protocol message.
#[derive(Debug, Clone, EnumTryAsInner, Serialize, Deserialize)]
#[derive_err(Debug)]
#[serde(bound = "")]
#[allow(missing_docs)]
pub enum Message<C: Curve> {
    SenderSetup(SenderSetup<C>),
    ReceiverPayload(ReceiverPayload<C>),
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
}

/// Receiver payload message.
///
/// Slot `j` is the pair `(r0[j], r1[j])`, which encodes the receiver's key share
/// under its choice bit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct ReceiverPayload<C: Curve> {
    #[serde(with = "points")]
    #[allow(missing_docs)]
    pub r0: Vec<C::Point>,
    #[serde(with = "points")]
    #[allow(missing_docs)]
    pub r1: Vec<C::Point>,
}
