use std::marker::PhantomData;

use ff::Field;
use group::Group;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use spoke_core::{Block, Curve, Hash};
use subtle::{Choice, ConstantTimeEq};
use tracing::debug;

use crate::{
    vsot::{
        derive_key, open,
        msgs::{ReceiverPayload, ReceiverResponse, SenderChallenge, SenderOpening, SenderSetup},
        transcript, DLogProof, SenderError, VsotConfig,
    },
    Abort, AbortReason, RandomOTSenderOutput, Role,
};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// A VSOT sender.
#[derive(Debug)]
pub struct Sender<C: Curve, T: state::State = state::Initialized<C>> {
    config: VsotConfig,
    state: T,
    _curve: PhantomData<C>,
}

impl<C: Curve> Sender<C> {
    /// Creates a new Sender.
    ///
    /// # Arguments
    ///
    /// * `config` - The Sender's configuration
    pub fn new(config: VsotConfig) -> Self {
        Self::new_with_rng(config, ChaCha20Rng::from_entropy())
    }

    /// Creates a new Sender with the provided RNG seed.
    ///
    /// # Arguments
    ///
    /// * `config` - The Sender's configuration
    /// * `seed` - The RNG seed used to generate the sender's keys
    pub fn new_with_seed(config: VsotConfig, seed: [u8; 32]) -> Self {
        Self::new_with_rng(config, ChaCha20Rng::from_seed(seed))
    }

    fn new_with_rng(config: VsotConfig, mut rng: ChaCha20Rng) -> Self {
        let private_key = C::Scalar::random(&mut rng);

        Sender {
            config,
            state: state::Initialized { private_key, rng },
            _curve: PhantomData,
        }
    }

    /// Returns the setup message to be sent to the receiver.
    ///
    /// The message carries the public key `A = a * G` and a proof of knowledge of `a`
    /// bound to the session.
    pub fn setup(self) -> (SenderSetup<C>, Sender<C, state::ReceivePayload<C>>) {
        let state::Initialized {
            private_key,
            mut rng,
        } = self.state;

        let public_key = C::generator() * private_key;
        let proof = DLogProof::prove(
            &private_key,
            &mut transcript::<C>(&self.config),
            &mut rng,
        );

        debug!(
            width = self.config.width(),
            depth = self.config.depth(),
            "vsot sender setup"
        );

        (
            SenderSetup { public_key, proof },
            Sender {
                config: self.config,
                state: state::ReceivePayload {
                    private_key,
                    public_key,
                },
                _curve: PhantomData,
            },
        )
    }
}

impl<C: Curve> Sender<C, state::ReceivePayload<C>> {
    /// Receives the receiver's blinded choices and returns the challenges.
    ///
    /// # Arguments
    ///
    /// * `payload` - The receiver's blinded choices.
    pub fn receive_payload(
        self,
        payload: ReceiverPayload<C>,
    ) -> Result<(SenderChallenge, Sender<C, state::ReceiveResponse>), SenderError> {
        let state::ReceivePayload {
            private_key,
            public_key,
        } = self.state;

        let ReceiverPayload { blinded_choices } = payload;

        let slots = self.config.batch_size().slots();
        if blinded_choices.len() != slots {
            return Err(SenderError::CountMismatch(slots, blinded_choices.len()));
        }

        let is_identity = blinded_choices
            .iter()
            .fold(Choice::from(0), |acc, b| acc | b.is_identity());
        if bool::from(is_identity) {
            return Err(Abort::new(Role::Receiver, AbortReason::IdentityPoint).into());
        }

        let session_id = self.config.session_id().as_bytes();

        cfg_if::cfg_if! {
            if #[cfg(feature = "rayon")] {
                let iter = blinded_choices.par_iter().enumerate();
            } else {
                let iter = blinded_choices.iter().enumerate();
            }
        }

        let keys: Vec<[Block; 2]> = iter
            .map(|(slot, blinded_choice)| {
                let rho_0 = *blinded_choice * private_key;
                let rho_1 = (*blinded_choice - public_key) * private_key;

                [
                    derive_key::<C>(session_id, slot, &rho_0),
                    derive_key::<C>(session_id, slot, &rho_1),
                ]
            })
            .collect();

        let openings: Vec<[Hash; 2]> = keys.iter().map(|[k0, k1]| [open(k0), open(k1)]).collect();

        let challenges = openings
            .iter()
            .map(|[o0, o1]| o0.digest() ^ o1.digest())
            .collect();

        debug!(slots, "vsot sender sent challenges");

        Ok((
            SenderChallenge { challenges },
            Sender {
                config: self.config,
                state: state::ReceiveResponse { keys, openings },
                _curve: PhantomData,
            },
        ))
    }
}

impl<C: Curve> Sender<C, state::ReceiveResponse> {
    /// Verifies the receiver's responses and returns the openings along with the
    /// sender's output.
    ///
    /// # Arguments
    ///
    /// * `response` - The receiver's challenge responses.
    pub fn receive_response(
        self,
        response: ReceiverResponse,
    ) -> Result<(SenderOpening, RandomOTSenderOutput), SenderError> {
        let state::ReceiveResponse { keys, openings } = self.state;
        let ReceiverResponse { responses } = response;

        if responses.len() != openings.len() {
            return Err(SenderError::CountMismatch(openings.len(), responses.len()));
        }

        let valid = responses
            .iter()
            .zip(&openings)
            .fold(Choice::from(1), |acc, (response, [o0, _])| {
                acc & response.ct_eq(&o0.digest())
            });
        if !bool::from(valid) {
            return Err(Abort::new(Role::Receiver, AbortReason::ChallengeResponse).into());
        }

        let depth = self.config.depth();
        let messages = keys
            .chunks_exact(depth)
            .map(|keys| {
                [
                    keys.iter().map(|[k0, _]| *k0).collect(),
                    keys.iter().map(|[_, k1]| *k1).collect(),
                ]
            })
            .collect();

        debug!("vsot sender complete");

        Ok((SenderOpening { openings }, RandomOTSenderOutput { messages }))
    }
}

/// The sender's state.
pub mod state {
    use super::*;

    mod sealed {
        pub trait Sealed {}

        impl<C: super::Curve> Sealed for super::Initialized<C> {}
        impl<C: super::Curve> Sealed for super::ReceivePayload<C> {}
        impl Sealed for super::ReceiveResponse {}
    }

    /// The sender's state.
    pub trait State: sealed::Sealed {}

    /// The sender's initial state.
    pub struct Initialized<C: Curve> {
        /// The secret key `a`
        pub(super) private_key: C::Scalar,
        pub(super) rng: ChaCha20Rng,
    }

    impl<C: Curve> State for Initialized<C> {}

    impl<C: Curve> std::fmt::Debug for Initialized<C> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("Initialized { .. }")
        }
    }

    /// The sender's state while waiting for the receiver's blinded choices.
    pub struct ReceivePayload<C: Curve> {
        pub(super) private_key: C::Scalar,
        /// The public key `A`
        pub(super) public_key: C::Point,
    }

    impl<C: Curve> State for ReceivePayload<C> {}

    impl<C: Curve> std::fmt::Debug for ReceivePayload<C> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("ReceivePayload { .. }")
        }
    }

    /// The sender's state while waiting for the challenge responses.
    pub struct ReceiveResponse {
        /// The key pair of every slot
        pub(super) keys: Vec<[Block; 2]>,
        pub(super) openings: Vec<[Hash; 2]>,
    }

    impl State for ReceiveResponse {}

    opaque_debug::implement!(ReceiveResponse);
}
