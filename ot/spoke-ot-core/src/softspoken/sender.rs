use spoke_core::{
    select::{select, xor_if},
    transpose::transpose_bits,
    Block, Curve,
};
use subtle::{Choice, ConstantTimeEq};
use tracing::debug;

use crate::{
    convert,
    msgs::{Ciphertexts, Derandomize},
    softspoken::{
        arrange, chi, expand, fold, hash_column,
        msgs::{Check, Extend},
        row_len, to_block, SenderError, SoftSpokenConfig, CSP,
    },
    Abort, AbortReason, RandomOTReceiverOutput, RandomOTSenderOutput, Role,
};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// SoftSpokenOT sender.
#[derive(Debug)]
pub struct Sender<T: state::State = state::Initialized> {
    config: SoftSpokenConfig,
    state: T,
}

impl Sender {
    /// Creates a new Sender.
    ///
    /// The choice bits of the base OTs become the sender's global correlation `Δ`.
    ///
    /// # Arguments
    ///
    /// * `config` - The Sender's configuration
    /// * `base` - The output of the base OTs, in which the sender played the receiver
    pub fn new(
        config: SoftSpokenConfig,
        base: RandomOTReceiverOutput,
    ) -> Result<Self, SenderError> {
        if base.choices.len() != CSP || base.width() != CSP {
            return Err(SenderError::InvalidBaseOT(format!(
                "expected {} instances, got {}",
                CSP,
                base.width()
            )));
        }

        let delta = to_block(base.choices.as_bytes());
        let seeds = base
            .messages
            .into_iter()
            .map(|m| match m.as_slice() {
                [seed] => Ok(*seed),
                _ => Err(SenderError::InvalidBaseOT(
                    "expected single block messages".to_string(),
                )),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Sender {
            config,
            state: state::Initialized { delta, seeds },
        })
    }

    /// Receives the receiver's extension message and checks its consistency.
    ///
    /// # Arguments
    ///
    /// * `extend` - The receiver's extension message.
    pub fn extend(self, extend: Extend) -> Result<Sender<state::Extended>, SenderError> {
        let state::Initialized { delta, seeds } = self.state;
        let Extend {
            us,
            check: Check { x, ts },
        } = extend;

        let row_len = row_len(&self.config);
        if us.len() != CSP * row_len {
            return Err(SenderError::CountMismatch(CSP * row_len, us.len()));
        }

        if ts.len() != CSP {
            return Err(SenderError::CountMismatch(CSP, ts.len()));
        }

        let chi = chi(&self.config, &us);
        let session_id = self.config.session_id().as_bytes();

        cfg_if::cfg_if! {
            if #[cfg(feature = "rayon")] {
                let iter = seeds.par_iter().zip(us.par_chunks_exact(row_len)).enumerate();
            } else {
                let iter = seeds.iter().zip(us.chunks_exact(row_len)).enumerate();
            }
        }

        // q_i = t0_i ^ delta_i * x
        let qs: Vec<Vec<u8>> = iter
            .map(|(i, (seed, u))| {
                let mut q = expand(*seed, session_id, i, row_len);
                xor_if(delta.choice(i), &mut q, u);
                q
            })
            .collect();

        let valid = qs
            .iter()
            .zip(&ts)
            .enumerate()
            .fold(Choice::from(1), |acc, (i, (q, t))| {
                let expected = *t ^ select(delta.choice(i), &Block::ZERO, &x);
                acc & fold(&chi, q).ct_eq(&expected)
            });

        // A failed check is attributed to the receiver, although a sender with a corrupted
        // delta fails the same way.
        if !bool::from(valid) {
            return Err(Abort::new(Role::Receiver, AbortReason::ConsistencyCheck).into());
        }

        let size = self.config.batch_size();
        let n = size.slots();
        let q = transpose_bits(&qs.concat(), CSP)?;

        cfg_if::cfg_if! {
            if #[cfg(feature = "rayon")] {
                let columns = q[..n * Block::LEN].par_chunks_exact(Block::LEN);
            } else {
                let columns = q[..n * Block::LEN].chunks_exact(Block::LEN);
            }
        }

        let (v0, v1): (Vec<Block>, Vec<Block>) = columns
            .enumerate()
            .map(|(j, column)| {
                let q = to_block(column);
                (
                    hash_column(session_id, j, &q),
                    hash_column(session_id, j, &(q ^ delta)),
                )
            })
            .unzip();

        debug!(
            width = size.width,
            depth = size.depth,
            "softspoken sender extended"
        );

        let messages = arrange(&v0, size.width, size.depth)
            .into_iter()
            .zip(arrange(&v1, size.width, size.depth))
            .map(|(m0, m1)| [m0, m1])
            .collect();

        Ok(Sender {
            config: self.config,
            state: state::Extended {
                output: RandomOTSenderOutput { messages },
            },
        })
    }
}

impl Sender<state::Extended> {
    /// Returns the sender's random OTs.
    pub fn into_output(self) -> RandomOTSenderOutput {
        self.state.output
    }

    /// Derandomizes the random OTs into correlated OTs with correlation `alpha`.
    ///
    /// Returns the sender's shares along with the correction for the receiver.
    ///
    /// # Arguments
    ///
    /// * `alpha` - The correlation of every slot, `width` vectors of `depth` scalars.
    pub fn correlate<C: Curve>(
        self,
        alpha: &[Vec<C::Scalar>],
    ) -> Result<(Vec<Vec<C::Scalar>>, Derandomize<C>), SenderError> {
        Ok(convert::create_correlation(&self.state.output, alpha)?)
    }

    /// Pads the message pairs for chosen-message OT.
    ///
    /// # Arguments
    ///
    /// * `messages` - The message pairs, one per OT instance.
    pub fn encrypt(self, messages: &[[Vec<Block>; 2]]) -> Result<Ciphertexts, SenderError> {
        Ok(convert::encrypt(&self.state.output, messages)?)
    }
}

/// The sender's state.
pub mod state {
    use super::*;

    mod sealed {
        pub trait Sealed {}

        impl Sealed for super::Initialized {}
        impl Sealed for super::Extended {}
    }

    /// The sender's state.
    pub trait State: sealed::Sealed {}

    /// The sender's initial state.
    pub struct Initialized {
        /// The choice bits of the base OTs
        pub(super) delta: Block,
        /// The chosen seed of every base OT
        pub(super) seeds: Vec<Block>,
    }

    impl State for Initialized {}

    opaque_debug::implement!(Initialized);

    /// The sender's state after extension.
    pub struct Extended {
        pub(super) output: RandomOTSenderOutput,
    }

    impl State for Extended {}

    opaque_debug::implement!(Extended);
}
