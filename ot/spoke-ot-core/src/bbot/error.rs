use spoke_core::curve::HashToCurveError;

use crate::Abort;

/// Errors that can occur when using the BBOT sender.
#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum SenderError {
    #[error("count mismatch: expected {0}, got {1}")]
    CountMismatch(usize, usize),
    #[error(transparent)]
    HashToCurve(#[from] HashToCurveError),
    #[error(transparent)]
    Abort(#[from] Abort),
}

/// Errors that can occur when using the BBOT receiver.
#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum ReceiverError {
    #[error("count mismatch: expected {0}, got {1}")]
    CountMismatch(usize, usize),
    #[error(transparent)]
    HashToCurve(#[from] HashToCurveError),
    #[error(transparent)]
    Abort(#[from] Abort),
}
