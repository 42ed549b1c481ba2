use async_trait::async_trait;
use enum_try_as_inner::EnumTryAsInner;
use futures::SinkExt;
use spoke_core::{BitVector, Curve};
use spoke_ot_core::{
    bbot::{msgs::Message, BbotConfig, Receiver as ReceiverCore},
    RandomOTReceiverOutput,
};
use tracing::{debug, instrument};
use utils_aio::{
    non_blocking_backend::{Backend, NonBlockingBackend},
    sink::IoSink,
    stream::{ExpectStreamExt, IoStream},
};

use crate::{bbot::ReceiverError, OTError, ProtocolMessage, RandomOTReceiver};

#[derive(Debug, EnumTryAsInner)]
#[derive_err(Debug)]
pub(crate) enum State<C: Curve> {
    Initialized(ReceiverCore<C>),
    Complete,
    Error,
}

/// BBOT receiver.
#[derive(Debug)]
pub struct Receiver<C: Curve> {
    state: State<C>,
}

impl<C: Curve> Receiver<C> {
    /// Creates a new Receiver.
    pub fn new(config: BbotConfig) -> Self {
        Self {
            state: State::Initialized(ReceiverCore::new(config)),
        }
    }

    /// Creates a new Receiver with the provided RNG seed.
    pub fn new_with_seed(config: BbotConfig, seed: [u8; 32]) -> Self {
        Self {
            state: State::Initialized(ReceiverCore::new_with_seed(config, seed)),
        }
    }

    #[instrument(level = "debug", skip_all, fields(count = choices.len()), err)]
    async fn _receive_random<
        Si: IoSink<Message<C>> + Send + Unpin,
        St: IoStream<Message<C>> + Send + Unpin,
    >(
        &mut self,
        sink: &mut Si,
        stream: &mut St,
        choices: &BitVector,
    ) -> Result<RandomOTReceiverOutput, ReceiverError> {
        let receiver = std::mem::replace(&mut self.state, State::Error).try_into_initialized()?;

        let setup = stream.expect_next().await?.try_into_sender_setup()?;
        let choices = choices.clone();
        let (payload, output) =
            Backend::spawn(move || receiver.receive_setup(&choices, setup)).await?;
        sink.send(Message::ReceiverPayload(payload)).await?;

        debug!(width = output.width(), depth = output.depth(), "bbot complete");

        self.state = State::Complete;

        Ok(output)
    }
}

impl<C: Curve> ProtocolMessage for Receiver<C> {
    type Msg = Message<C>;
}

#[async_trait]
impl<C: Curve> RandomOTReceiver for Receiver<C> {
    async fn receive_random<
        Si: IoSink<Message<C>> + Send + Unpin,
        St: IoStream<Message<C>> + Send + Unpin,
    >(
        &mut self,
        sink: &mut Si,
        stream: &mut St,
        choices: &BitVector,
    ) -> Result<RandomOTReceiverOutput, OTError> {
        self._receive_random(sink, stream, choices)
            .await
            .map_err(OTError::from)
    }
}
