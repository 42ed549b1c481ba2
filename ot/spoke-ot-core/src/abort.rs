use serde::{Deserialize, Serialize};

/// A protocol role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// The OT sender.
    Sender,
    /// The OT receiver.
    Receiver,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Sender => write!(f, "sender"),
            Role::Receiver => write!(f, "receiver"),
        }
    }
}

/// The check which failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[allow(missing_docs)]
pub enum AbortReason {
    #[error("proof of knowledge of the secret key is invalid")]
    InvalidProof,
    #[error("received the identity point")]
    IdentityPoint,
    #[error("challenge response does not match")]
    ChallengeResponse,
    #[error("opening does not match the commitment")]
    Decommitment,
    #[error("consistency check failed")]
    ConsistencyCheck,
}

/// An identifiable abort.
///
/// Raised when a cryptographic check fails. `culprit` is the role whose input caused the
/// failure. The session must be torn down, it is never safe to retry with the same keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("aborted, {culprit} misbehaved: {reason}")]
pub struct Abort {
    /// The party blamed for the abort.
    pub culprit: Role,
    /// The failed check.
    pub reason: AbortReason,
}

impl Abort {
    pub(crate) fn new(culprit: Role, reason: AbortReason) -> Self {
        tracing::warn!(%culprit, %reason, "protocol aborted");

        Self { culprit, reason }
    }
}
