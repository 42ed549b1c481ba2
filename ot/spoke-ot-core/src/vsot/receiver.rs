use std::marker::PhantomData;

use ff::Field;
use group::Group;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use spoke_core::{select::select, BitVector, Block, Curve, Hash};
use subtle::{Choice, ConstantTimeEq};
use tracing::debug;

use crate::{
    vsot::{
        derive_key, open,
        msgs::{ReceiverPayload, ReceiverResponse, SenderChallenge, SenderOpening, SenderSetup},
        transcript, ReceiverError, VsotConfig,
    },
    Abort, AbortReason, RandomOTReceiverOutput, Role,
};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// A VSOT receiver.
#[derive(Debug)]
pub struct Receiver<C: Curve, T: state::State = state::Initialized> {
    config: VsotConfig,
    state: T,
    _curve: PhantomData<C>,
}

impl<C: Curve> Receiver<C> {
    /// Creates a new Receiver.
    ///
    /// # Arguments
    ///
    /// * `config` - The Receiver's configuration
    pub fn new(config: VsotConfig) -> Self {
        Self::new_with_rng(config, ChaCha20Rng::from_entropy())
    }

    /// Creates a new Receiver with the provided RNG seed.
    ///
    /// # Arguments
    ///
    /// * `config` - The Receiver's configuration
    /// * `seed` - The RNG seed used to blind the receiver's choices
    pub fn new_with_seed(config: VsotConfig, seed: [u8; 32]) -> Self {
        Self::new_with_rng(config, ChaCha20Rng::from_seed(seed))
    }

    fn new_with_rng(config: VsotConfig, rng: ChaCha20Rng) -> Self {
        Receiver {
            config,
            state: state::Initialized { rng },
            _curve: PhantomData,
        }
    }

    /// Verifies the sender's setup and returns the blinded choices.
    ///
    /// # Arguments
    ///
    /// * `choices` - One choice bit per OT instance.
    /// * `setup` - The sender's setup message.
    pub fn receive_setup(
        self,
        choices: &BitVector,
        setup: SenderSetup<C>,
    ) -> Result<(ReceiverPayload<C>, Receiver<C, state::ReceiveChallenge>), ReceiverError> {
        let state::Initialized { mut rng } = self.state;
        let SenderSetup { public_key, proof } = setup;

        let size = self.config.batch_size();
        if choices.len() != size.width {
            return Err(ReceiverError::CountMismatch(size.width, choices.len()));
        }

        if !proof.verify(&public_key, &mut transcript::<C>(&self.config)) {
            return Err(Abort::new(Role::Sender, AbortReason::InvalidProof).into());
        }

        if bool::from(public_key.is_identity()) {
            return Err(Abort::new(Role::Sender, AbortReason::IdentityPoint).into());
        }

        let blinding: Vec<C::Scalar> = (0..size.slots())
            .map(|_| C::Scalar::random(&mut rng))
            .collect();

        let session_id = self.config.session_id().as_bytes();

        cfg_if::cfg_if! {
            if #[cfg(feature = "rayon")] {
                let iter = blinding.par_iter().enumerate();
            } else {
                let iter = blinding.iter().enumerate();
            }
        }

        let (blinded_choices, keys): (Vec<C::Point>, Vec<Block>) = iter
            .map(|(slot, r)| {
                let choice = choices.choice(slot / size.depth);

                let b_0 = C::generator() * r;
                let b_1 = b_0 + public_key;
                let blinded_choice = select(choice, &b_0, &b_1);

                let key = derive_key::<C>(session_id, slot, &(public_key * r));

                (blinded_choice, key)
            })
            .unzip();

        debug!(slots = size.slots(), "vsot receiver sent blinded choices");

        Ok((
            ReceiverPayload { blinded_choices },
            Receiver {
                config: self.config,
                state: state::ReceiveChallenge {
                    choices: choices.clone(),
                    keys,
                },
                _curve: PhantomData,
            },
        ))
    }
}

impl<C: Curve> Receiver<C, state::ReceiveChallenge> {
    /// Answers the sender's challenges.
    ///
    /// # Arguments
    ///
    /// * `challenge` - The sender's challenges.
    pub fn receive_challenge(
        self,
        challenge: SenderChallenge,
    ) -> Result<(ReceiverResponse, Receiver<C, state::ReceiveOpening>), ReceiverError> {
        let state::ReceiveChallenge { choices, keys } = self.state;
        let SenderChallenge { challenges } = challenge;

        if challenges.len() != keys.len() {
            return Err(ReceiverError::CountMismatch(keys.len(), challenges.len()));
        }

        let depth = self.config.depth();
        let responses = keys
            .iter()
            .zip(&challenges)
            .enumerate()
            .map(|(slot, (key, challenge))| {
                let choice = choices.choice(slot / depth);
                open(key).digest() ^ select(choice, &Hash::default(), challenge)
            })
            .collect();

        Ok((
            ReceiverResponse { responses },
            Receiver {
                config: self.config,
                state: state::ReceiveOpening {
                    choices,
                    keys,
                    challenges,
                },
                _curve: PhantomData,
            },
        ))
    }
}

impl<C: Curve> Receiver<C, state::ReceiveOpening> {
    /// Verifies the sender's openings and returns the receiver's output.
    ///
    /// # Arguments
    ///
    /// * `opening` - The sender's openings.
    pub fn receive_opening(
        self,
        opening: SenderOpening,
    ) -> Result<RandomOTReceiverOutput, ReceiverError> {
        let state::ReceiveOpening {
            choices,
            keys,
            challenges,
        } = self.state;
        let SenderOpening { openings } = opening;

        if openings.len() != keys.len() {
            return Err(ReceiverError::CountMismatch(keys.len(), openings.len()));
        }

        let depth = self.config.depth();
        let valid = keys
            .iter()
            .zip(&openings)
            .zip(&challenges)
            .enumerate()
            .fold(Choice::from(1), |acc, (slot, ((key, [o0, o1]), challenge))| {
                let choice = choices.choice(slot / depth);
                let chosen = select(choice, o0, o1);

                acc & chosen.ct_eq(&open(key)) & (o0.digest() ^ o1.digest()).ct_eq(challenge)
            });
        if !bool::from(valid) {
            return Err(Abort::new(Role::Sender, AbortReason::Decommitment).into());
        }

        debug!("vsot receiver complete");

        Ok(RandomOTReceiverOutput {
            choices,
            messages: keys.chunks_exact(depth).map(<[Block]>::to_vec).collect(),
        })
    }
}

/// The receiver's state.
pub mod state {
    use super::*;

    mod sealed {
        pub trait Sealed {}

        impl Sealed for super::Initialized {}
        impl Sealed for super::ReceiveChallenge {}
        impl Sealed for super::ReceiveOpening {}
    }

    /// The receiver's state.
    pub trait State: sealed::Sealed {}

    /// The receiver's initial state.
    pub struct Initialized {
        pub(super) rng: ChaCha20Rng,
    }

    impl State for Initialized {}

    opaque_debug::implement!(Initialized);

    /// The receiver's state while waiting for the sender's challenges.
    pub struct ReceiveChallenge {
        pub(super) choices: BitVector,
        /// The chosen key of every slot
        pub(super) keys: Vec<Block>,
    }

    impl State for ReceiveChallenge {}

    opaque_debug::implement!(ReceiveChallenge);

    /// The receiver's state while waiting for the sender's openings.
    pub struct ReceiveOpening {
        pub(super) choices: BitVector,
        pub(super) keys: Vec<Block>,
        pub(super) challenges: Vec<Hash>,
    }

    impl State for ReceiveOpening {}

    opaque_debug::implement!(ReceiveOpening);
}
