use spoke_core::Curve;
use spoke_ot_core::vsot::msgs::MessageError;

use crate::OTError;

/// A VSOT sender error.
#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum SenderError {
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    #[error(transparent)]
    CoreError(#[from] spoke_ot_core::vsot::SenderError),
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

impl<C: Curve> From<crate::vsot::sender::StateError<C>> for SenderError {
    fn from(err: crate::vsot::sender::StateError<C>) -> Self {
        SenderError::StateError(err.to_string())
    }
}

impl<C: Curve> From<MessageError<C>> for SenderError {
    fn from(err: MessageError<C>) -> Self {
        SenderError::from(std::io::Error::from(err))
    }
}

/// A VSOT receiver error.
#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum ReceiverError {
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    #[error(transparent)]
    CoreError(#[from] spoke_ot_core::vsot::ReceiverError),
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

impl<C: Curve> From<crate::vsot::receiver::StateError<C>> for ReceiverError {
    fn from(err: crate::vsot::receiver::StateError<C>) -> Self {
        ReceiverError::StateError(err.to_string())
    }
}

impl<C: Curve> From<MessageError<C>> for ReceiverError {
    fn from(err: MessageError<C>) -> Self {
        ReceiverError::from(std::io::Error::from(err))
    }
}
