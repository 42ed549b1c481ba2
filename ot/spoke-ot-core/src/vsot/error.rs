use crate::Abort;

/// Errors that can occur when using the VSOT sender.
#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum SenderError {
    #[error("count mismatch: expected {0}, got {1}")]
    CountMismatch(usize, usize),
    #[error(transparent)]
    Abort(#[from] Abort),
}

/// Errors that can occur when using the VSOT receiver.
#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum ReceiverError {
    #[error("count mismatch: expected {0}, got {1}")]
    CountMismatch(usize, usize),
    #[error(transparent)]
    Abort(#[from] Abort),
}
