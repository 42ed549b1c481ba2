use std::marker::PhantomData;

use ff::Field;
use group::Group;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use spoke_core::{Block, Curve};
use subtle::Choice;
use tracing::debug;

use crate::{
    bbot::{
        derive_key,
        msgs::{ReceiverPayload, SenderSetup},
        popf, BbotConfig, SenderError,
    },
    Abort, AbortReason, RandomOTSenderOutput, Role,
};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// A BBOT sender.
#[derive(Debug)]
pub struct Sender<C: Curve, T: state::State = state::Initialized<C>> {
    config: BbotConfig,
    state: T,
    _curve: PhantomData<C>,
}

impl<C: Curve> Sender<C> {
    /// Creates a new Sender.
    ///
    /// # Arguments
    ///
    /// * `config` - The Sender's configuration
    pub fn new(config: BbotConfig) -> Self {
        Self::new_with_rng(config, ChaCha20Rng::from_entropy())
    }

    /// Creates a new Sender with the provided RNG seed.
    ///
    /// # Arguments
    ///
    /// * `config` - The Sender's configuration
    /// * `seed` - The RNG seed used to generate the sender's key
    pub fn new_with_seed(config: BbotConfig, seed: [u8; 32]) -> Self {
        Self::new_with_rng(config, ChaCha20Rng::from_seed(seed))
    }

    fn new_with_rng(config: BbotConfig, mut rng: ChaCha20Rng) -> Self {
        Sender {
            config,
            state: state::Initialized {
                private_key: C::Scalar::random(&mut rng),
            },
            _curve: PhantomData,
        }
    }

    /// Returns the public key `A = a * G` to be sent to the receiver.
    pub fn setup(self) -> (SenderSetup<C>, Sender<C, state::ReceivePayload<C>>) {
        let state::Initialized { private_key } = self.state;
        let public_key = C::generator() * private_key;

        debug!(
            width = self.config.width(),
            depth = self.config.depth(),
            "bbot sender setup"
        );

        (
            SenderSetup { public_key },
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
    /// Receives the receiver's point pairs and returns the sender's output.
    ///
    /// # Arguments
    ///
    /// * `payload` - The receiver's point pairs.
    pub fn receive_payload(
        self,
        payload: ReceiverPayload<C>,
    ) -> Result<RandomOTSenderOutput, SenderError> {
        let state::ReceivePayload {
            private_key,
            public_key,
        } = self.state;
        let ReceiverPayload { r0, r1 } = payload;

        let slots = self.config.batch_size().slots();
        if r0.len() != slots {
            return Err(SenderError::CountMismatch(slots, r0.len()));
        }
        if r1.len() != slots {
            return Err(SenderError::CountMismatch(slots, r1.len()));
        }

        let session_id = self.config.session_id().as_bytes();

        cfg_if::cfg_if! {
            if #[cfg(feature = "rayon")] {
                let iter = r0.par_iter().zip(r1.par_iter()).enumerate();
            } else {
                let iter = r0.iter().zip(r1.iter()).enumerate();
            }
        }

        let points: Vec<[C::Point; 2]> = iter
            .map(|(slot, (r0, r1))| -> Result<[C::Point; 2], SenderError> {
                Ok([
                    *r0 + popf::<C>(session_id, slot, 0, r1)?,
                    *r1 + popf::<C>(session_id, slot, 1, r0)?,
                ])
            })
            .collect::<Result<_, _>>()?;

        let is_identity = points.iter().fold(Choice::from(0), |acc, [b0, b1]| {
            acc | b0.is_identity() | b1.is_identity()
        });
        if bool::from(is_identity) {
            return Err(Abort::new(Role::Receiver, AbortReason::IdentityPoint).into());
        }

        cfg_if::cfg_if! {
            if #[cfg(feature = "rayon")] {
                let iter = points.par_iter().enumerate();
            } else {
                let iter = points.iter().enumerate();
            }
        }

        let keys: Vec<[Block; 2]> = iter
            .map(|(slot, [b0, b1])| {
                [
                    derive_key::<C>(session_id, slot, &public_key, &(*b0 * private_key)),
                    derive_key::<C>(session_id, slot, &public_key, &(*b1 * private_key)),
                ]
            })
            .collect();

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

        debug!(slots, "bbot sender complete");

        Ok(RandomOTSenderOutput { messages })
    }
}

/// The sender's state.
pub mod state {
    use super::*;

    mod sealed {
        pub trait Sealed {}

        impl<C: super::Curve> Sealed for super::Initialized<C> {}
        impl<C: super::Curve> Sealed for super::ReceivePayload<C> {}
    }

    /// The sender's state.
    pub trait State: sealed::Sealed {}

    /// The sender's initial state.
    pub struct Initialized<C: Curve> {
        /// The secret key `a`
        pub(super) private_key: C::Scalar,
    }

    impl<C: Curve> State for Initialized<C> {}

    impl<C: Curve> std::fmt::Debug for Initialized<C> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("Initialized { .. }")
        }
    }

    /// The sender's state while waiting for the receiver's point pairs.
    pub struct ReceivePayload<C: Curve> {
        pub(super) private_key: C::Scalar,
        pub(super) public_key: C::Point,
    }

    impl<C: Curve> State for ReceivePayload<C> {}

    impl<C: Curve> std::fmt::Debug for ReceivePayload<C> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("ReceivePayload { .. }")
        }
    }
}
