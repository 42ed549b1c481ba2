use std::marker::PhantomData;

use async_trait::async_trait;
use enum_try_as_inner::EnumTryAsInner;
use futures::SinkExt;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use spoke_core::{BitVector, Block, Curve};
use spoke_ot_core::{
    softspoken::{
        msgs::Message, sender_state as state, Sender as SenderCore, SoftSpokenConfig, CSP,
    },
    RandomOTSenderOutput,
};
use tracing::{debug, instrument};
use utils_aio::{
    non_blocking_backend::{Backend, NonBlockingBackend},
    sink::IoSink,
    stream::{ExpectStreamExt, IoStream},
};

use crate::{
    softspoken::{into_base_sink, into_base_stream, SenderError},
    vsot, COTSender, OTError, OTSender, OTSetup, ProtocolMessage, RandomOTReceiver,
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
    Setup(SenderCore),
    Complete,
    Error,
}

/// SoftSpokenOT sender.
///
/// The sender samples `Δ` and receives one seed per bit of `Δ` from the base OTs, in which it
/// plays the receiver.
#[derive(Debug)]
pub struct Sender<C: Curve> {
    config: SoftSpokenConfig,
    state: State,
    _curve: PhantomData<C>,
}

impl<C: Curve> Sender<C> {
    /// Creates a new Sender.
    ///
    /// # Arguments
    ///
    /// * `config` - The Sender's configuration
    pub fn new(config: SoftSpokenConfig) -> Self {
        Self::new_with_rng(config, ChaCha20Rng::from_entropy())
    }

    /// Creates a new Sender with the provided RNG seed.
    ///
    /// # Arguments
    ///
    /// * `config` - The Sender's configuration
    /// * `seed` - The RNG seed used to sample `Δ` and run the base OTs
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

    /// Returns the Sender's configuration.
    pub fn config(&self) -> &SoftSpokenConfig {
        &self.config
    }

    #[instrument(level = "debug", skip_all, err)]
    async fn _setup<Si: IoSink<Message<C>> + Send + Unpin, St: IoStream<Message<C>> + Send + Unpin>(
        &mut self,
        sink: &mut Si,
        stream: &mut St,
    ) -> Result<(), SenderError> {
        let Pending { mut rng } =
            std::mem::replace(&mut self.state, State::Error).try_into_initialized()?;

        let delta = BitVector::random(&mut rng, CSP);

        let mut base = vsot::Receiver::<C>::new_with_seed(self.config.base_config(), rng.gen());
        let seeds = base
            .receive_random(
                &mut into_base_sink(sink),
                &mut into_base_stream(stream),
                &delta,
            )
            .await?;

        let sender = SenderCore::new(self.config.clone(), seeds)?;

        debug!("base OTs complete");

        self.state = State::Setup(sender);

        Ok(())
    }

    /// Receives the extension message and checks it.
    #[instrument(level = "debug", skip_all, err)]
    async fn _extend<St: IoStream<Message<C>> + Send + Unpin>(
        &mut self,
        stream: &mut St,
    ) -> Result<SenderCore<state::Extended>, SenderError> {
        let sender = std::mem::replace(&mut self.state, State::Error).try_into_setup()?;

        let extend = stream.expect_next().await?.try_into_extend()?;
        let sender = Backend::spawn(move || sender.extend(extend)).await?;

        debug!(
            width = self.config.width(),
            depth = self.config.depth(),
            "extension complete"
        );

        Ok(sender)
    }
}

impl<C: Curve> ProtocolMessage for Sender<C> {
    type Msg = Message<C>;
}

#[async_trait]
impl<C: Curve> OTSetup for Sender<C> {
    async fn setup<Si: IoSink<Message<C>> + Send + Unpin, St: IoStream<Message<C>> + Send + Unpin>(
        &mut self,
        sink: &mut Si,
        stream: &mut St,
    ) -> Result<(), OTError> {
        self._setup(sink, stream).await.map_err(OTError::from)
    }
}

#[async_trait]
impl<C: Curve> RandomOTSender for Sender<C> {
    async fn send_random<
        Si: IoSink<Message<C>> + Send + Unpin,
        St: IoStream<Message<C>> + Send + Unpin,
    >(
        &mut self,
        _sink: &mut Si,
        stream: &mut St,
    ) -> Result<RandomOTSenderOutput, OTError> {
        let sender = self._extend(stream).await?;

        self.state = State::Complete;

        Ok(sender.into_output())
    }
}

#[async_trait]
impl<C: Curve> OTSender for Sender<C> {
    async fn send<Si: IoSink<Message<C>> + Send + Unpin, St: IoStream<Message<C>> + Send + Unpin>(
        &mut self,
        sink: &mut Si,
        stream: &mut St,
        msgs: &[[Vec<Block>; 2]],
    ) -> Result<(), OTError> {
        let sender = self._extend(stream).await?;

        let msgs = msgs.to_vec();
        let ciphertexts = Backend::spawn(move || sender.encrypt(&msgs))
            .await
            .map_err(SenderError::from)?;

        sink.send(Message::Ciphertexts(ciphertexts)).await?;

        self.state = State::Complete;

        Ok(())
    }
}

#[async_trait]
impl<C: Curve> COTSender<C::Scalar> for Sender<C> {
    async fn send_correlated<
        Si: IoSink<Message<C>> + Send + Unpin,
        St: IoStream<Message<C>> + Send + Unpin,
    >(
        &mut self,
        sink: &mut Si,
        stream: &mut St,
        alpha: &[Vec<C::Scalar>],
    ) -> Result<Vec<Vec<C::Scalar>>, OTError> {
        let sender = self._extend(stream).await?;

        let alpha = alpha.to_vec();
        let (shares, derandomize) = Backend::spawn(move || sender.correlate::<C>(&alpha))
            .await
            .map_err(SenderError::from)?;

        sink.send(Message::Derandomize(derandomize)).await?;

        self.state = State::Complete;

        Ok(shares)
    }
}
