use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use spoke_core::{transpose::transpose_bits, BitVector, Block, Curve};
use tracing::debug;

use crate::{
    convert,
    msgs::{Ciphertexts, Derandomize},
    softspoken::{
        arrange, chi, expand, fold, hash_column,
        msgs::{Check, Extend},
        row_len, to_block, ReceiverError, SoftSpokenConfig, CSP, SSP,
    },
    RandomOTReceiverOutput, RandomOTSenderOutput,
};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// SoftSpokenOT receiver.
#[derive(Debug)]
pub struct Receiver<T: state::State = state::Initialized> {
    config: SoftSpokenConfig,
    state: T,
}

impl Receiver {
    /// Creates a new Receiver.
    ///
    /// # Arguments
    ///
    /// * `config` - The Receiver's configuration
    /// * `base` - The output of the base OTs, in which the receiver played the sender
    pub fn new(
        config: SoftSpokenConfig,
        base: RandomOTSenderOutput,
    ) -> Result<Self, ReceiverError> {
        Self::new_with_rng(config, base, ChaCha20Rng::from_entropy())
    }

    /// Creates a new Receiver with the provided RNG seed.
    ///
    /// # Arguments
    ///
    /// * `config` - The Receiver's configuration
    /// * `base` - The output of the base OTs, in which the receiver played the sender
    /// * `seed` - The RNG seed used to sample the padding columns
    pub fn new_with_seed(
        config: SoftSpokenConfig,
        base: RandomOTSenderOutput,
        seed: [u8; 32],
    ) -> Result<Self, ReceiverError> {
        Self::new_with_rng(config, base, ChaCha20Rng::from_seed(seed))
    }

    fn new_with_rng(
        config: SoftSpokenConfig,
        base: RandomOTSenderOutput,
        rng: ChaCha20Rng,
    ) -> Result<Self, ReceiverError> {
        if base.width() != CSP {
            return Err(ReceiverError::InvalidBaseOT(format!(
                "expected {} instances, got {}",
                CSP,
                base.width()
            )));
        }

        let seeds = base
            .messages
            .into_iter()
            .map(|[m0, m1]| match (m0.as_slice(), m1.as_slice()) {
                ([s0], [s1]) => Ok([*s0, *s1]),
                _ => Err(ReceiverError::InvalidBaseOT(
                    "expected single block messages".to_string(),
                )),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Receiver {
            config,
            state: state::Initialized { seeds, rng },
        })
    }

    /// Extends the base OTs, returning the message for the sender.
    ///
    /// The receiver's random OTs are available immediately, see
    /// [`Receiver::into_output`].
    ///
    /// # Arguments
    ///
    /// * `choices` - One choice bit per OT instance.
    pub fn extend(
        self,
        choices: &BitVector,
    ) -> Result<(Extend, Receiver<state::Extended>), ReceiverError> {
        let state::Initialized { seeds, mut rng } = self.state;

        let size = self.config.batch_size();
        if choices.len() != size.width {
            return Err(ReceiverError::CountMismatch(size.width, choices.len()));
        }

        // Column `l * width + i` carries choice `i`, followed by the padding columns.
        let mut x = choices.repeat(size.depth);
        x.append(&BitVector::random(&mut rng, SSP));

        let row_len = row_len(&self.config);
        let x = x.as_bytes();
        let session_id = self.config.session_id().as_bytes();

        cfg_if::cfg_if! {
            if #[cfg(feature = "rayon")] {
                let iter = seeds.par_iter().enumerate();
            } else {
                let iter = seeds.iter().enumerate();
            }
        }

        let (ts, us): (Vec<Vec<u8>>, Vec<Vec<u8>>) = iter
            .map(|(i, [s0, s1])| {
                let t0 = expand(*s0, session_id, i, row_len);
                let mut u = expand(*s1, session_id, i, row_len);
                u.iter_mut()
                    .zip(&t0)
                    .zip(x)
                    .for_each(|((u, t0), x)| *u ^= t0 ^ x);

                (t0, u)
            })
            .unzip();

        let us = us.concat();
        let chi = chi(&self.config, &us);

        let check = Check {
            x: fold(&chi, x),
            ts: ts.iter().map(|t| fold(&chi, t)).collect(),
        };

        let n = size.slots();
        let t = transpose_bits(&ts.concat(), CSP)?;

        cfg_if::cfg_if! {
            if #[cfg(feature = "rayon")] {
                let columns = t[..n * Block::LEN].par_chunks_exact(Block::LEN);
            } else {
                let columns = t[..n * Block::LEN].chunks_exact(Block::LEN);
            }
        }

        let columns: Vec<Block> = columns
            .enumerate()
            .map(|(j, column)| hash_column(session_id, j, &to_block(column)))
            .collect();

        debug!(
            width = size.width,
            depth = size.depth,
            "softspoken receiver extended"
        );

        let output = RandomOTReceiverOutput {
            choices: choices.clone(),
            messages: arrange(&columns, size.width, size.depth),
        };

        Ok((
            Extend { us, check },
            Receiver {
                config: self.config,
                state: state::Extended { output },
            },
        ))
    }
}

impl Receiver<state::Extended> {
    /// Returns the receiver's random OTs.
    pub fn into_output(self) -> RandomOTReceiverOutput {
        self.state.output
    }

    /// Derandomizes the random OTs into correlated OTs, returning the receiver's shares.
    ///
    /// # Arguments
    ///
    /// * `derandomize` - The sender's correction.
    pub fn correlate<C: Curve>(
        self,
        derandomize: &Derandomize<C>,
    ) -> Result<Vec<Vec<C::Scalar>>, ReceiverError> {
        Ok(convert::apply_correlation(&self.state.output, derandomize)?)
    }

    /// Decrypts the chosen messages.
    ///
    /// # Arguments
    ///
    /// * `ciphertexts` - The sender's padded messages.
    pub fn decrypt(self, ciphertexts: &Ciphertexts) -> Result<Vec<Vec<Block>>, ReceiverError> {
        Ok(convert::decrypt(&self.state.output, ciphertexts)?)
    }
}

/// The receiver's state.
pub mod state {
    use super::*;

    mod sealed {
        pub trait Sealed {}

        impl Sealed for super::Initialized {}
        impl Sealed for super::Extended {}
    }

    /// The receiver's state.
    pub trait State: sealed::Sealed {}

    /// The receiver's initial state.
    pub struct Initialized {
        /// Both seeds of every base OT
        pub(super) seeds: Vec<[Block; 2]>,
        pub(super) rng: ChaCha20Rng,
    }

    impl State for Initialized {}

    opaque_debug::implement!(Initialized);

    /// The receiver's state after extension.
    pub struct Extended {
        pub(super) output: RandomOTReceiverOutput,
    }

    impl State for Extended {}

    opaque_debug::implement!(Extended);
}
