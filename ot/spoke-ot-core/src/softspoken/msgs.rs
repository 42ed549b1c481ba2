//! Messages for the SoftSpokenOT protocol.

use enum_try_as_inner::EnumTryAsInner;
use serde::{Deserialize, Serialize};
use spoke_core::{Block, Curve};

use crate::{
    msgs::{Ciphertexts, Derandomize},
    vsot,
};

/// A SoftSpokenOT protocol message.
#[derive(Debug, Clone, EnumTryAsInner, Serialize, Deserialize)]
#[derive_err(Debug)]
#[serde(bound = "")]
#[allow(missing_docs)]
pub enum Message<C: Curve> {
    BaseMsg(vsot::msgs::Message<C>),
    Extend(Extend),
    Ciphertexts(Ciphertexts),
    Derandomize(Derandomize<C>),
}

impl<C: Curve> From<MessageError<C>> for std::io::Error {
    fn from(err: MessageError<C>) -> Self {
        std::io::Error::new(std::io::ErrorKind::InvalidData, err.to_string())
    }
}

/// Extension message sent by the receiver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extend {
    /// The masked rows `u_i = t0_i ^ t1_i ^ x`, concatenated.
    pub us: Vec<u8>,
    /// The consistency check values.
    pub check: Check,
}

/// Values for the consistency check sent by the receiver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Check {
    /// The folded choice vector.
    pub x: Block,
    /// The folded `t0_i` of every row.
    pub ts: Vec<Block>,
}
