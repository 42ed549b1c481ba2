//! Async drivers for the VSOT and BBOT base OTs and the SoftSpokenOT extension.
//!
//! The drivers run the sans-IO cores of `spoke-ot-core` over a message sink and stream,
//! keeping track of which round comes next. Calling a method out of order, or calling a
//! method of a finished session again, fails with a state error.

#![deny(missing_docs, unreachable_pub, unused_must_use)]
#![deny(unsafe_code)]
#![deny(clippy::all)]

pub mod bbot;
pub mod softspoken;
pub mod vsot;

use async_trait::async_trait;
use spoke_core::{BitVector, Block};
use utils_aio::{sink::IoSink, stream::IoStream};

pub use spoke_ot_core::{
    Abort, AbortReason, RandomOTReceiverOutput, RandomOTSenderOutput, Role, SessionId,
};

/// An oblivious transfer error.
#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum OTError {
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    #[error("sender error: {0}")]
    SenderError(Box<dyn std::error::Error + Send + Sync>),
    #[error("receiver error: {0}")]
    ReceiverError(Box<dyn std::error::Error + Send + Sync>),
}

/// A protocol with a message type.
pub trait ProtocolMessage {
    /// The type of message sent and received by the protocol.
    type Msg: Send + 'static;
}

/// An oblivious transfer protocol that needs to perform a one-time setup.
#[async_trait]
pub trait OTSetup: ProtocolMessage {
    /// Runs any one-time setup for the protocol.
    ///
    /// # Arguments
    ///
    /// * `sink` - The IO sink to the peer.
    /// * `stream` - The IO stream from the peer.
    async fn setup<Si: IoSink<Self::Msg> + Send + Unpin, St: IoStream<Self::Msg> + Send + Unpin>(
        &mut self,
        sink: &mut Si,
        stream: &mut St,
    ) -> Result<(), OTError>;
}

/// A random OT sender.
#[async_trait]
pub trait RandomOTSender: ProtocolMessage {
    /// Outputs pairs of random messages, as many as the sender was configured for.
    ///
    /// # Arguments
    ///
    /// * `sink` - The IO sink to the receiver.
    /// * `stream` - The IO stream from the receiver.
    async fn send_random<
        Si: IoSink<Self::Msg> + Send + Unpin,
        St: IoStream<Self::Msg> + Send + Unpin,
    >(
        &mut self,
        sink: &mut Si,
        stream: &mut St,
    ) -> Result<RandomOTSenderOutput, OTError>;
}

/// A random OT receiver.
#[async_trait]
pub trait RandomOTReceiver: ProtocolMessage {
    /// Outputs the messages selected by `choices`.
    ///
    /// # Arguments
    ///
    /// * `sink` - The IO sink to the sender.
    /// * `stream` - The IO stream from the sender.
    /// * `choices` - The receiver's choice bits, one per OT instance.
    async fn receive_random<
        Si: IoSink<Self::Msg> + Send + Unpin,
        St: IoStream<Self::Msg> + Send + Unpin,
    >(
        &mut self,
        sink: &mut Si,
        stream: &mut St,
        choices: &BitVector,
    ) -> Result<RandomOTReceiverOutput, OTError>;
}

/// An oblivious transfer sender.
#[async_trait]
pub trait OTSender: ProtocolMessage {
    /// Obliviously transfers the messages to the receiver.
    ///
    /// # Arguments
    ///
    /// * `sink` - The IO sink to the receiver.
    /// * `stream` - The IO stream from the receiver.
    /// * `msgs` - The message pairs, one per OT instance.
    async fn send<Si: IoSink<Self::Msg> + Send + Unpin, St: IoStream<Self::Msg> + Send + Unpin>(
        &mut self,
        sink: &mut Si,
        stream: &mut St,
        msgs: &[[Vec<Block>; 2]],
    ) -> Result<(), OTError>;
}

/// An oblivious transfer receiver.
#[async_trait]
pub trait OTReceiver: ProtocolMessage {
    /// Obliviously receives the messages selected by `choices`.
    ///
    /// # Arguments
    ///
    /// * `sink` - The IO sink to the sender.
    /// * `stream` - The IO stream from the sender.
    /// * `choices` - The receiver's choice bits, one per OT instance.
    async fn receive<Si: IoSink<Self::Msg> + Send + Unpin, St: IoStream<Self::Msg> + Send + Unpin>(
        &mut self,
        sink: &mut Si,
        stream: &mut St,
        choices: &BitVector,
    ) -> Result<Vec<Vec<Block>>, OTError>;
}

/// A correlated oblivious transfer sender.
#[async_trait]
pub trait COTSender<T>: ProtocolMessage
where
    T: Send + Sync,
{
    /// Obliviously transfers the correlation to the receiver, returning the sender's shares.
    ///
    /// After the transfer the shares of both parties for slot `l` of instance `i` sum to
    /// `alpha[i][l]` if the receiver chose `1` and to zero otherwise.
    ///
    /// # Arguments
    ///
    /// * `sink` - The IO sink to the receiver.
    /// * `stream` - The IO stream from the receiver.
    /// * `alpha` - The correlation, one vector per OT instance.
    async fn send_correlated<
        Si: IoSink<Self::Msg> + Send + Unpin,
        St: IoStream<Self::Msg> + Send + Unpin,
    >(
        &mut self,
        sink: &mut Si,
        stream: &mut St,
        alpha: &[Vec<T>],
    ) -> Result<Vec<Vec<T>>, OTError>;
}

/// A correlated oblivious transfer receiver.
#[async_trait]
pub trait COTReceiver<T>: ProtocolMessage
where
    T: Send + Sync,
{
    /// Obliviously receives the receiver's shares of the correlation.
    ///
    /// # Arguments
    ///
    /// * `sink` - The IO sink to the sender.
    /// * `stream` - The IO stream from the sender.
    /// * `choices` - The receiver's choice bits, one per OT instance.
    async fn receive_correlated<
        Si: IoSink<Self::Msg> + Send + Unpin,
        St: IoStream<Self::Msg> + Send + Unpin,
    >(
        &mut self,
        sink: &mut Si,
        stream: &mut St,
        choices: &BitVector,
    ) -> Result<Vec<Vec<T>>, OTError>;
}
