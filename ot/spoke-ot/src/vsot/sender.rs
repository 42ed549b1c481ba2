use async_trait::async_trait;
use enum_try_as_inner::EnumTryAsInner;
use futures::SinkExt;
use spoke_core::Curve;
use spoke_ot_core::{
    vsot::{msgs::Message, Sender as SenderCore, VsotConfig},
    RandomOTSenderOutput,
};
use tracing::{debug, instrument};
use utils_aio::{
    non_blocking_backend::{Backend, NonBlockingBackend},
    sink::IoSink,
    stream::{ExpectStreamExt, IoStream},
};

use crate::{vsot::SenderError, OTError, ProtocolMessage, RandomOTSender};

#[derive(Debug, EnumTryAsInner)]
#[derive_err(Debug)]
pub(crate) enum State<C: Curve> {
    Initialized(SenderCore<C>),
    Complete,
    Error,
}

/// VSOT sender.
#[derive(Debug)]
pub struct Sender<C: Curve> {
    state: State<C>,
}

impl<C: Curve> Sender<C> {
    /// Creates a new Sender.
    ///
    /// # Arguments
    ///
    /// * `config` - The Sender's configuration
    pub fn new(config: VsotConfig) -> Self {
        Self {
            state: State::Initialized(SenderCore::new(config)),
        }
    }

    /// Creates a new Sender with the provided RNG seed.
    ///
    /// # Arguments
    ///
    /// * `config` - The Sender's configuration
    /// * `seed` - The RNG seed used to generate the sender's keys
    pub fn new_with_seed(config: VsotConfig, seed: [u8; 32]) -> Self {
        Self {
            state: State::Initialized(SenderCore::new_with_seed(config, seed)),
        }
    }

    #[instrument(level = "debug", skip_all, err)]
    async fn _send_random<
        Si: IoSink<Message<C>> + Send + Unpin,
        St: IoStream<Message<C>> + Send + Unpin,
    >(
        &mut self,
        sink: &mut Si,
        stream: &mut St,
    ) -> Result<RandomOTSenderOutput, SenderError> {
        let sender = std::mem::replace(&mut self.state, State::Error).try_into_initialized()?;

        let (setup, sender) = sender.setup();
        sink.send(Message::SenderSetup(setup)).await?;

        let payload = stream.expect_next().await?.try_into_receiver_payload()?;
        let (challenge, sender) = Backend::spawn(move || sender.receive_payload(payload)).await?;
        sink.send(Message::SenderChallenge(challenge)).await?;

        let response = stream.expect_next().await?.try_into_receiver_response()?;
        let (opening, output) = sender.receive_response(response)?;
        sink.send(Message::SenderOpening(opening)).await?;

        debug!(width = output.width(), depth = output.depth(), "vsot complete");

        self.state = State::Complete;

        Ok(output)
    }
}

impl<C: Curve> ProtocolMessage for Sender<C> {
    type Msg = Message<C>;
}

#[async_trait]
impl<C: Curve> RandomOTSender for Sender<C> {
    async fn send_random<
        Si: IoSink<Message<C>> + Send + Unpin,
        St: IoStream<Message<C>> + Send + Unpin,
    >(
        &mut self,
        sink: &mut Si,
        stream: &mut St,
    ) -> Result<RandomOTSenderOutput, OTError> {
        self._send_random(sink, stream)
            .await
            .map_err(OTError::from)
    }
}
