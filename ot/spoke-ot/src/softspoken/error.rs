use spoke_core::Curve;
use spoke_ot_core::softspoken::msgs::MessageError;

use crate::OTError;

/// A SoftSpokenOT sender error.
#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum SenderError {
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    #[error(transparent)]
    CoreError(#[from] spoke_ot_core::softspoken::SenderError),
    #[error(transparent)]
    BaseOTError(#[from] crate::OTError),
    #[error("invalid state: expected {0}")]
    StateError(String),
}

impl From<SenderError> for OTError {
    fn from(err: SenderError) -> Self {
        match err {
            SenderError::IOError(e) => e.into(),
            e => OTError::SenderError(Box::new(e)),
        }
    }
}

impl From<crate::softspoken::sender::StateError> for SenderError {
    fn from(err: crate::softspoken::sender::StateError) -> Self {
        SenderError::StateError(err.to_string())
    }
}

impl<C: Curve> From<MessageError<C>> for SenderError {
    fn from(err: MessageError<C>) -> Self {
        SenderError::from(std::io::Error::from(err))
    }
}

/// A SoftSpokenOT receiver error.
#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum ReceiverError {
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    #[error(transparent)]
    CoreError(#[from] spoke_ot_core::softspoken::ReceiverError),
    #[error(transparent)]
    BaseOTError(#[from] crate::OTError),
    #[error("invalid state: expected {0}")]
    StateError(String),
}

impl From<ReceiverError> for OTError {
    fn from(err: ReceiverError) -> Self {
        match err {
            ReceiverError::IOError(e) => e.into(),
            e => OTError::ReceiverError(Box::new(e)),
        }
    }
}

impl From<crate::softspoken::receiver::StateError> for ReceiverError {
    fn from(err: crate::softspoken::receiver::StateError) -> Self {
        ReceiverError::StateError(err.to_string())
    }
}

impl<C: Curve> From<MessageError<C>> for ReceiverError {
    fn from(err: MessageError<C>) -> Self {
        ReceiverError::from(std::io::Error::from(err))
    }
}
