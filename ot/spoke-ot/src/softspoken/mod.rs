//! Async driver for the SoftSpokenOT extension.
//!
//! [`OTSetup::setup`](crate::OTSetup::setup) runs the base OTs with reversed roles. Afterwards a
//! single call extends the base OTs to the configured batch and converts the result: random OT
//! ([`RandomOTSender`](crate::RandomOTSender)), chosen-message OT ([`OTSender`](crate::OTSender))
//! or correlated OT ([`COTSender`](crate::COTSender)). A session runs exactly one extension.

mod error;
mod receiver;
mod sender;

pub use error::{ReceiverError, SenderError};
pub use receiver::Receiver;
pub use sender::Sender;

pub use spoke_ot_core::softspoken::{
    msgs, SoftSpokenConfig, SoftSpokenConfigBuilder, SoftSpokenConfigBuilderError, CSP, SSP,
};

use futures::{SinkExt, StreamExt};
use spoke_core::Curve;
use spoke_ot_core::vsot;
use utils_aio::{sink::IoSink, stream::IoStream};

/// Converts a sink of SoftSpokenOT messages into a sink of base OT messages.
pub(crate) fn into_base_sink<'a, C: Curve, Si: IoSink<msgs::Message<C>> + Send + Unpin>(
    sink: &'a mut Si,
) -> impl IoSink<vsot::msgs::Message<C>> + Send + Unpin + 'a {
    Box::pin(SinkExt::with(sink, |msg| async move {
        Ok(msgs::Message::BaseMsg(msg))
    }))
}

/// Converts a stream of SoftSpokenOT messages into a stream of base OT messages.
pub(crate) fn into_base_stream<'a, C: Curve, St: IoStream<msgs::Message<C>> + Send + Unpin>(
    stream: &'a mut St,
) -> impl IoStream<vsot::msgs::Message<C>> + Send + Unpin + 'a {
    StreamExt::map(stream, |msg| match msg {
        Ok(msg) => msg.try_into_base_msg().map_err(From::from),
        Err(err) => Err(err),
    })
}
