use std::marker::PhantomData;

use ff::Field;
use group::Group;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use spoke_core::{select::select, BitVector, Block, Curve};
use tracing::debug;

use crate::{
    bbot::{
        derive_key,
        msgs::{ReceiverPayload, SenderSetup},
        popf, BbotConfig, ReceiverError,
    },
    Abort, AbortReason, RandomOTReceiverOutput, Role,
};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// A BBOT receiver.
#[derive(Debug)]
pub struct Receiver<C: Curve, T: state::State = state::Initialized> {
    config: BbotConfig,
    state: T,
    _curve: PhantomData<C>,
}

impl<C: Curve> Receiver<C> {
    /// Creates a new Receiver.
    ///
    /// # Arguments
    ///
    /// * `config` - The Receiver's configuration
    pub fn new(config: BbotConfig) -> Self {
        Self::new_with_rng(config, ChaCha20Rng::from_entropy())
    }

    /// Creates a new Receiver with the provided RNG seed.
    ///
    /// # Arguments
    ///
    /// * `config` - The Receiver's configuration
    /// * `seed` - The RNG seed used to sample the receiver's points
    pub fn new_with_seed(config: BbotConfig, seed: [u8; 32]) -> Self {
        Self::new_with_rng(config, ChaCha20Rng::from_seed(seed))
    }

    fn new_with_rng(config: BbotConfig, rng: ChaCha20Rng) -> Self {
        Receiver {
            config,
            state: state::Initialized { rng },
            _curve: PhantomData,
        }
    }

    /// Receives the sender's public key and returns the point pairs together with the
    /// receiver's output.
    ///
    /// # Arguments
    ///
    /// * `choices` - One choice bit per OT instance.
    /// * `setup` - The sender's setup message.
    pub fn receive_setup(
        self,
        choices: &BitVector,
        setup: SenderSetup<C>,
    ) -> Result<(ReceiverPayload<C>, RandomOTReceiverOutput), ReceiverError> {
        let state::Initialized { mut rng } = self.state;
        let SenderSetup { public_key } = setup;

        let size = self.config.batch_size();
        if choices.len() != size.width {
            return Err(ReceiverError::CountMismatch(size.width, choices.len()));
        }

        if bool::from(public_key.is_identity()) {
            return Err(Abort::new(Role::Sender, AbortReason::IdentityPoint).into());
        }

        // The secret `b` and the random half of every slot.
        let samples: Vec<(C::Scalar, C::Point)> = (0..size.slots())
            .map(|_| (C::Scalar::random(&mut rng), C::Point::random(&mut rng)))
            .collect();

        let session_id = self.config.session_id().as_bytes();

        cfg_if::cfg_if! {
            if #[cfg(feature = "rayon")] {
                let iter = samples.par_iter().enumerate();
            } else {
                let iter = samples.iter().enumerate();
            }
        }

        let slots: Vec<([C::Point; 2], Block)> = iter
            .map(|(slot, (b, r_other))| -> Result<([C::Point; 2], Block), ReceiverError> {
                let choice = choices.choice(slot / size.depth);

                let h = popf::<C>(session_id, slot, choice.unwrap_u8(), r_other)?;
                let r_chosen = C::generator() * b - h;

                let pair = [
                    select(choice, &r_chosen, r_other),
                    select(choice, r_other, &r_chosen),
                ];
                let key = derive_key::<C>(session_id, slot, &public_key, &(public_key * b));

                Ok((pair, key))
            })
            .collect::<Result<_, _>>()?;

        let (r0, r1) = slots.iter().map(|([r0, r1], _)| (*r0, *r1)).unzip();
        let keys: Vec<Block> = slots.into_iter().map(|(_, key)| key).collect();

        debug!(slots = size.slots(), "bbot receiver complete");

        Ok((
            ReceiverPayload { r0, r1 },
            RandomOTReceiverOutput {
                choices: choices.clone(),
                messages: keys
                    .chunks_exact(size.depth)
                    .map(<[Block]>::to_vec)
                    .collect(),
            },
        ))
    }
}

/// The receiver's state.
pub mod state {
    use super::*;

    mod sealed {
        pub trait Sealed {}

        impl Sealed for super::Initialized {}
    }

    /// The receiver's state.
    pub trait State: sealed::Sealed {}

    /// The receiver's initial state.
    pub struct Initialized {
        pub(super) rng: ChaCha20Rng,
    }

    impl State for Initialized {}

    opaque_debug::implement!(Initialized);
}
