//! General OT message types.

use serde::{Deserialize, Serialize};
use spoke_core::{serialize::scalars, Block, Curve};

/// One-time-padded message pairs sent by the sender for chosen-message OT.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ciphertexts {
    /// The padded message pairs, one per OT instance.
    pub ciphertexts: Vec<[Vec<Block>; 2]>,
}

/// A message sent by the sender which the receiver uses to derandomize its random OT
/// output into a correlated OT output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Derandomize<C: Curve> {
    /// The correction `τ` of every slot.
    #[serde(with = "scalars")]
    pub tau: Vec<C::Scalar>,
}
