//! An implementation of the [SoftSpokenOT](https://eprint.iacr.org/2022/192.pdf) oblivious
//! transfer extension protocol, with the Fiat-Shamir consistency check of
//! [DKLs23](https://eprint.iacr.org/2023/765.pdf).
//!
//! The receiver of the extension plays the sender of the [`CSP`] base OTs and the other way
//! around. The extension runs in a single message from the receiver, after which both
//! parties hold random OTs which can be turned into chosen-message or correlated OTs.

mod config;
mod error;
pub mod msgs;
mod receiver;
mod sender;

pub use config::{SoftSpokenConfig, SoftSpokenConfigBuilder, SoftSpokenConfigBuilderError};
pub use error::{ReceiverError, SenderError};
pub use receiver::{state as receiver_state, Receiver};
pub use sender::{state as sender_state, Sender};

use rand_core::RngCore;
use spoke_core::{hash::hash_to_block, prg::Prg, Block, Transcript};

/// Computational security parameter, the number of base OTs.
pub const CSP: usize = 128;
/// Statistical security parameter, the number of padding columns.
pub const SSP: usize = 128;

const COLUMN_CONTEXT: &str = "spoke softspoken column";

/// Returns the byte length of a row of the extension matrix.
pub(crate) fn row_len(config: &SoftSpokenConfig) -> usize {
    (config.batch_size().slots() + SSP) / 8
}

/// Expands the seed of row `index` into a row of `len` bytes.
pub(crate) fn expand(seed: Block, session_id: &[u8], index: usize, len: usize) -> Vec<u8> {
    let mut row = vec![0u8; len];
    Prg::new(seed, session_id, index).fill_bytes(&mut row);
    row
}

/// Derives the consistency check challenge from the masked rows.
pub(crate) fn chi(config: &SoftSpokenConfig, us: &[u8]) -> Vec<Block> {
    let mut transcript = Transcript::new(b"spoke softspoken");
    transcript.append_bytes(b"session-id", config.session_id().as_bytes());
    transcript.append_u64(b"width", config.width() as u64);
    transcript.append_u64(b"depth", config.depth() as u64);

    for u in us.chunks_exact(row_len(config)) {
        transcript.append_bytes(b"u", u);
    }

    transcript.challenge_blocks(b"chi", config.batch_size().slots() / SSP)
}

/// Folds a row into a single block, `row[M] + sum(chi[j] * row[j])` over GF(2^128).
pub(crate) fn fold(chi: &[Block], row: &[u8]) -> Block {
    let blocks: Vec<Block> = row.chunks_exact(Block::LEN).map(to_block).collect();
    let (blocks, padding) = blocks.split_at(chi.len());

    Block::inner_product(chi, blocks) ^ padding[0]
}

/// Hashes column `index` of the transposed matrix into an output block.
pub(crate) fn hash_column(session_id: &[u8], index: usize, column: &Block) -> Block {
    hash_to_block(
        COLUMN_CONTEXT,
        &[session_id, &(index as u64).to_le_bytes(), column.as_bytes()],
    )
}

/// Converts a block-sized chunk into a block.
pub(crate) fn to_block(chunk: &[u8]) -> Block {
    let mut bytes = [0u8; Block::LEN];
    bytes.copy_from_slice(chunk);
    bytes.into()
}

/// Arranges output columns into instances, block `l` of instance `i` is column `l * width + i`.
pub(crate) fn arrange(columns: &[Block], width: usize, depth: usize) -> Vec<Vec<Block>> {
    (0..width)
        .map(|i| (0..depth).map(|l| columns[l * width + i]).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use msgs::Extend;
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;
    use rstest::*;
    use spoke_core::{
        curve::{Curve, Ristretto, P256},
        BitVector,
    };

    use crate::{
        Abort, AbortReason, RandomOTReceiverOutput, RandomOTSenderOutput, Role,
    };

    #[fixture]
    fn delta() -> BitVector {
        let mut rng = ChaCha12Rng::seed_from_u64(2);
        BitVector::random(&mut rng, CSP)
    }

    /// An ideal run of the base OTs with the sender of the extension choosing `delta`.
    fn base(delta: &BitVector) -> (RandomOTSenderOutput, RandomOTReceiverOutput) {
        let mut rng = ChaCha12Rng::seed_from_u64(3);
        let seeds: Vec<[Block; 2]> = (0..CSP)
            .map(|_| [Block::random(&mut rng), Block::random(&mut rng)])
            .collect();

        let chosen = seeds
            .iter()
            .zip(delta.iter())
            .map(|([s0, s1], d)| vec![if d { *s1 } else { *s0 }])
            .collect();

        (
            RandomOTSenderOutput {
                messages: seeds
                    .into_iter()
                    .map(|[s0, s1]| [vec![s0], vec![s1]])
                    .collect(),
            },
            RandomOTReceiverOutput {
                choices: delta.clone(),
                messages: chosen,
            },
        )
    }

    fn config(session_id: &[u8], width: usize, depth: usize) -> SoftSpokenConfig {
        SoftSpokenConfig::builder()
            .session_id(session_id)
            .width(width)
            .depth(depth)
            .build()
            .unwrap()
    }

    fn choices(width: usize) -> BitVector {
        let mut rng = ChaCha12Rng::seed_from_u64(0);
        BitVector::random(&mut rng, width)
    }

    fn setup(
        config: &SoftSpokenConfig,
        delta: &BitVector,
    ) -> (Sender<sender_state::Initialized>, Receiver<receiver_state::Initialized>) {
        let (base_sender, base_receiver) = base(delta);

        (
            Sender::new(config.clone(), base_receiver).unwrap(),
            Receiver::new_with_seed(config.clone(), base_sender, [1; 32]).unwrap(),
        )
    }

    #[rstest]
    #[case(128, 1)]
    #[case(32, 4)]
    #[case(16, 16)]
    #[case(256, 2)]
    fn test_softspoken(delta: BitVector, #[case] width: usize, #[case] depth: usize) {
        let config = config(b"test softspoken", width, depth);
        let (sender, receiver) = setup(&config, &delta);
        let choices = choices(width);

        let (extend, receiver) = receiver.extend(&choices).unwrap();
        let sender = sender.extend(extend).unwrap();

        let sender = sender.into_output();
        let receiver = receiver.into_output();

        assert_eq!(sender.width(), width);
        assert_eq!(sender.depth(), depth);
        assert_eq!(receiver.choices, choices);

        for (i, ([m0, m1], m_x)) in sender.messages.iter().zip(&receiver.messages).enumerate() {
            let (chosen, other) = if choices.get(i) { (m1, m0) } else { (m0, m1) };
            assert_eq!(m_x, chosen);
            assert_ne!(m_x, other);
        }
    }

    #[rstest]
    fn test_corrupted_check(delta: BitVector) {
        let config = config(b"test softspoken", 128, 1);
        let (sender, receiver) = setup(&config, &delta);

        let (mut extend, _) = receiver.extend(&choices(128)).unwrap();
        extend.check.x = extend.check.x ^ Block::ONES;

        let err = sender.extend(extend).unwrap_err();

        assert!(matches!(
            err,
            SenderError::Abort(Abort {
                culprit: Role::Receiver,
                reason: AbortReason::ConsistencyCheck
            })
        ));
    }

    #[rstest]
    fn test_inconsistent_choices(delta: BitVector) {
        let config = config(b"test softspoken", 128, 1);
        let (sender, receiver) = setup(&config, &delta);

        // Flipping a bit of one row of u corresponds to using different choices in that row.
        let row = (0..CSP).find(|&i| delta.get(i)).unwrap();
        let (extend, _) = receiver.extend(&choices(128)).unwrap();
        let Extend { mut us, check } = extend;
        us[row_len(&config) * row] ^= 1;

        let err = sender.extend(Extend { us, check }).unwrap_err();

        assert!(matches!(
            err,
            SenderError::Abort(Abort {
                culprit: Role::Receiver,
                ..
            })
        ));
    }

    #[rstest]
    fn test_mismatched_session(delta: BitVector) {
        let (base_sender, base_receiver) = base(&delta);
        let sender = Sender::new(config(b"session a", 128, 1), base_receiver).unwrap();
        let receiver = Receiver::new(config(b"session b", 128, 1), base_sender).unwrap();

        let (extend, _) = receiver.extend(&choices(128)).unwrap();

        assert!(matches!(sender.extend(extend), Err(SenderError::Abort(_))));
    }

    #[rstest]
    fn test_mismatched_size(delta: BitVector) {
        let (base_sender, base_receiver) = base(&delta);
        let sender = Sender::new(config(b"session", 128, 1), base_receiver).unwrap();
        let receiver = Receiver::new(config(b"session", 128, 2), base_sender).unwrap();

        let (extend, _) = receiver.extend(&choices(128)).unwrap();

        assert!(matches!(
            sender.extend(extend),
            Err(SenderError::CountMismatch(..))
        ));
    }

    #[rstest]
    fn test_invalid_base(delta: BitVector) {
        let (mut base_sender, base_receiver) = base(&delta);
        base_sender.messages.pop();

        assert!(matches!(
            Receiver::new(config(b"session", 128, 1), base_sender),
            Err(ReceiverError::InvalidBaseOT(_))
        ));

        let RandomOTReceiverOutput { choices, mut messages } = base_receiver;
        messages[0].push(Block::ZERO);

        assert!(matches!(
            Sender::new(
                config(b"session", 128, 1),
                RandomOTReceiverOutput { choices, messages }
            ),
            Err(SenderError::InvalidBaseOT(_))
        ));
    }

    #[rstest]
    fn test_choice_count_mismatch(delta: BitVector) {
        let config = config(b"session", 128, 1);
        let (_, receiver) = setup(&config, &delta);

        assert!(matches!(
            receiver.extend(&choices(64)),
            Err(ReceiverError::CountMismatch(128, 64))
        ));
    }

    fn check_correlated<C: Curve>(delta: &BitVector) {
        let config = config(b"test correlated", 32, 4);
        let (sender, receiver) = setup(&config, delta);
        let choices = choices(32);

        let (extend, receiver) = receiver.extend(&choices).unwrap();
        let sender = sender.extend(extend).unwrap();

        let alpha: Vec<Vec<C::Scalar>> = (0..32u64)
            .map(|i| (0..4u64).map(|l| C::Scalar::from(i * 4 + l + 1)).collect())
            .collect();

        let (z_a, derandomize) = sender.correlate::<C>(&alpha).unwrap();
        let z_b = receiver.correlate::<C>(&derandomize).unwrap();

        for (i, ((z_a, z_b), alpha)) in z_a.iter().zip(&z_b).zip(&alpha).enumerate() {
            for ((a, b), alpha) in z_a.iter().zip(z_b).zip(alpha) {
                if choices.get(i) {
                    assert_eq!(*a + b, *alpha);
                } else {
                    assert_eq!(*a + b, C::Scalar::from(0u64));
                }
            }
        }
    }

    #[rstest]
    fn test_correlated(delta: BitVector) {
        check_correlated::<Ristretto>(&delta);
        check_correlated::<P256>(&delta);
    }

    #[rstest]
    fn test_chosen_message(delta: BitVector) {
        let config = config(b"test chosen", 64, 2);
        let (sender, receiver) = setup(&config, &delta);
        let choices = choices(64);

        let (extend, receiver) = receiver.extend(&choices).unwrap();
        let sender = sender.extend(extend).unwrap();

        let mut rng = ChaCha12Rng::seed_from_u64(5);
        let messages: Vec<[Vec<Block>; 2]> = (0..64)
            .map(|_| [Block::random_vec(&mut rng, 2), Block::random_vec(&mut rng, 2)])
            .collect();

        let ciphertexts = sender.encrypt(&messages).unwrap();
        let received = receiver.decrypt(&ciphertexts).unwrap();

        for (i, ([m0, m1], m)) in messages.iter().zip(&received).enumerate() {
            assert_eq!(m, if choices.get(i) { m1 } else { m0 });
        }
    }

    #[test]
    fn test_fold_is_linear() {
        let mut rng = ChaCha12Rng::seed_from_u64(6);
        let chi = Block::random_vec(&mut rng, 3);
        let a: Vec<u8> = Block::random_vec(&mut rng, 4)
            .iter()
            .flat_map(|b| b.to_bytes())
            .collect();
        let b: Vec<u8> = Block::random_vec(&mut rng, 4)
            .iter()
            .flat_map(|b| b.to_bytes())
            .collect();
        let sum: Vec<u8> = a.iter().zip(&b).map(|(a, b)| a ^ b).collect();

        assert_eq!(fold(&chi, &sum), fold(&chi, &a) ^ fold(&chi, &b));
    }
}
