use std::marker::PhantomData;

use async_trait::async_trait;
use enum_try_as_inner::EnumTryAsInner;
use futures::SinkExt;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use spoke_core::{BitVector, Block, Curve};
use spoke_ot_core::{
    softspoken::{
        msgs::Message, receiver_state as state, Receiver as ReceiverCore, SoftSpokenConfig,
    },
    RandomOTReceiverOutput,
};
use tracing::{debug, instrument};
use utils_aio::{
    non_blocking_backend::{Backend, NonBlockingBackend},
    sink::IoSink,
    stream::{ExpectStreamExt, IoStream},
};

use crate::{
    softspoken::{into_base_sink, into_base_stream, ReceiverError},
    vsot, COTReceiver, OTError, OTReceiver, OTSetup, ProtocolMessage, RandomOTReceiver,
    RandomOTSender,
};

pub(crate) struct Pending {
    rng: ChaCha20Rng,
}

opaque_debug::implement!(Pending);

#[derive(Debug, EnumTryAsInner)]
#[derive_err(Debug)]
pub(crate) enum State {
    Initialized(Pending),
    Setup(ReceiverCore),
    Complete,
    Error,
}

/// SoftSpokenOT receiver.
///
/// The receiver plays the sender of the base OTs and keeps both seeds of every instance.
#[derive(Debug)]
pub struct Receiver<C: Curve> {
    config: SoftSpokenConfig,
    state: State,
    _curve: PhantomData<C>,
}

impl<C: Curve> Receiver<C> {
    /// Creates a new Receiver.
    ///
    /// # Arguments
    ///
    /// * `config` - The Receiver's configuration
    pub fn new(config: SoftSpokenConfig) -> Self {
        Self::new_with_rng(config, ChaCha20Rng::from_entropy())
    }

    /// Creates a new Receiver with the provided RNG seed.
    ///
    /// # Arguments
    ///
    /// * `config` - The Receiver's configuration
    /// * `seed` - The RNG seed used to run the base OTs and sample the padding
    pub fn new_with_seed(config: SoftSpokenConfig, seed: [u8; 32]) -> Self {
        Self::new_with_rng(config, ChaCha20Rng::from_seed(seed))
    }

    fn new_with_rng(config: SoftSpokenConfig, rng: ChaCha20Rng) -> Self {
        Self {
            config,
            state: State::Initialized(Pending { rng }),
            _curve: PhantomData,
        }
    }

    /// Returns the Receiver's configuration.
    pub fn config(&self) -> &SoftSpokenConfig {
        &self.config
    }

    #[instrument(level = "debug", skip_all, err)]
    async fn _setup<Si: IoSink<Message<C>> + Send + Unpin, St: IoStream<Message<C>> + Send + Unpin>(
        &mut self,
        sink: &mut Si,
        stream: &mut St,
    ) -> Result<(), ReceiverError> {
        let Pending { mut rng } =
            std::mem::replace(&mut self.state, State::Error).try_into_initialized()?;

        let mut base = vsot::Sender::<C>::new_with_seed(self.config.base_config(), rng.gen());
        let seeds = base
            .send_random(&mut into_base_sink(sink), &mut into_base_stream(stream))
            .await?;

        let receiver = ReceiverCore::new_with_seed(self.config.clone(), seeds, rng.gen())?;

        debug!("base OTs complete");

        self.state = State::Setup(receiver);

        Ok(())
    }

    /// Extends the base OTs to the configured batch and sends the extension message.
    #[instrument(level = "debug", skip_all, fields(count = choices.len()), err)]
    async fn _extend<Si: IoSink<Message<C>> + Send + Unpin>(
        &mut self,
        sink: &mut Si,
        choices: &BitVector,
    ) -> Result<ReceiverCore<state::Extended>, ReceiverError> {
        let receiver = std::mem::replace(&mut self.state, State::Error).try_into_setup()?;

        let choices = choices.clone();
        let (extend, receiver) = Backend::spawn(move || receiver.extend(&choices)).await?;

        sink.send(Message::Extend(extend)).await?;

        debug!(
            width = self.config.width(),
            depth = self.config.depth(),
            "extension complete"
        );

        Ok(receiver)
    }
}

impl<C: Curve> ProtocolMessage for Receiver<C> {
    type Msg = Message<C>;
}

#[async_trait]
impl<C: Curve> OTSetup for Receiver<C> {
    async fn setup<Si: IoSink<Message<C>> + Send + Unpin, St: IoStream<Message<C>> + Send + Unpin>(
        &mut self,
        sink: &mut Si,
        stream: &mut St,
    ) -> Result<(), OTError> {
        self._setup(sink, stream).await.map_err(OTError::from)
    }
}

#[async_trait]
impl<C: Curve> RandomOTReceiver for Receiver<C> {
    async fn receive_random<
        Si: IoSink<Message<C>> + Send + Unpin,
        St: IoStream<Message<C>> + Send + Unpin,
    >(
        &mut self,
        sink: &mut Si,
        _stream: &mut St,
        choices: &BitVector,
    ) -> Result<RandomOTReceiverOutput, OTError> {
        let receiver = self._extend(sink, choices).await?;

        self.state = State::Complete;

        Ok(receiver.into_output())
    }
}

#[async_trait]
impl<C: Curve> OTReceiver for Receiver<C> {
    async fn receive<
        Si: IoSink<Message<C>> + Send + Unpin,
        St: IoStream<Message<C>> + Send + Unpin,
    >(
        &mut self,
        sink: &mut Si,
        stream: &mut St,
        choices: &BitVector,
    ) -> Result<Vec<Vec<Block>>, OTError> {
        let receiver = self._extend(sink, choices).await?;

        let ciphertexts = stream
            .expect_next()
            .await?
            .try_into_ciphertexts()
            .map_err(ReceiverError::from)?;

        let msgs = receiver
            .decrypt(&ciphertexts)
            .map_err(ReceiverError::from)?;

        self.state = State::Complete;

        Ok(msgs)
    }
}

#[async_trait]
impl<C: Curve> COTReceiver<C::Scalar> for Receiver<C> {
    async fn receive_correlated<
        Si: IoSink<Message<C>> + Send + Unpin,
        St: IoStream<Message<C>> + Send + Unpin,
    >(
        &mut self,
        sink: &mut Si,
        stream: &mut St,
        choices: &BitVector,
    ) -> Result<Vec<Vec<C::Scalar>>, OTError> {
        let receiver = self._extend(sink, choices).await?;

        let derandomize = stream
            .expect_next()
            .await?
            .try_into_derandomize()
            .map_err(ReceiverError::from)?;

        let shares = Backend::spawn(move || receiver.correlate::<C>(&derandomize))
            .await
            .map_err(ReceiverError::from)?;

        self.state = State::Complete;

        Ok(shares)
    }
}
