use spoke_core::transpose::TransposeError;

use crate::{convert::ConvertError, Abort};

/// Errors that can occur when using the SoftSpokenOT sender.
#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum SenderError {
    #[error("count mismatch: expected {0}, got {1}")]
    CountMismatch(usize, usize),
    #[error("invalid base OT output: {0}")]
    InvalidBaseOT(String),
    #[error(transparent)]
    Abort(#[from] Abort),
    #[error(transparent)]
    TransposeError(#[from] TransposeError),
    #[error(transparent)]
    ConvertError(#[from] ConvertError),
}

/// Errors that can occur when using the SoftSpokenOT receiver.
#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum ReceiverError {
    #[error("count mismatch: expected {0}, got {1}")]
    CountMismatch(usize, usize),
    #[error("invalid base OT output: {0}")]
    InvalidBaseOT(String),
    #[error(transparent)]
    TransposeError(#[from] TransposeError),
    #[error(transparent)]
    ConvertError(#[from] ConvertError),
}
