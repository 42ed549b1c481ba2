//! Conversions from random OT into chosen-message OT and correlated OT.
//!
//! These are pure functions of a random OT output, so they work the same whether the
//! output came from a base OT or from [`softspoken`](crate::softspoken).

use spoke_core::{select::select, Block, Curve};
use subtle::ConditionallySelectable;

use crate::{
    msgs::{Ciphertexts, Derandomize},
    RandomOTReceiverOutput, RandomOTSenderOutput,
};

const ECP_CONTEXT: &str = "spoke ecp";

/// Errors that can occur when converting a random OT output.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[allow(missing_docs)]
pub enum ConvertError {
    #[error("count mismatch: expected {0}, got {1}")]
    CountMismatch(usize, usize),
    #[error("depth mismatch at instance {slot}: expected {expected}, got {actual}")]
    DepthMismatch {
        slot: usize,
        expected: usize,
        actual: usize,
    },
}

/// Maps a message block of `slot` to a scalar.
fn ecp<C: Curve>(slot: usize, block: &Block) -> C::Scalar {
    C::hash_to_scalar(ECP_CONTEXT, &[&(slot as u64).to_le_bytes(), block.as_bytes()])
}

fn check_depth(slot: usize, expected: usize, actual: usize) -> Result<(), ConvertError> {
    if expected != actual {
        return Err(ConvertError::DepthMismatch {
            slot,
            expected,
            actual,
        });
    }
    Ok(())
}

/// Checks that the receiver holds one choice bit per OT instance.
fn check_choices(output: &RandomOTReceiverOutput) -> Result<(), ConvertError> {
    if output.choices.len() != output.messages.len() {
        return Err(ConvertError::CountMismatch(
            output.messages.len(),
            output.choices.len(),
        ));
    }
    Ok(())
}

/// Pads the sender's message pairs with its random OT messages.
///
/// # Arguments
///
/// * `output` - The sender's random OT output.
/// * `messages` - The message pairs to transfer, one per OT instance.
pub fn encrypt(
    output: &RandomOTSenderOutput,
    messages: &[[Vec<Block>; 2]],
) -> Result<Ciphertexts, ConvertError> {
    if messages.len() != output.width() {
        return Err(ConvertError::CountMismatch(output.width(), messages.len()));
    }

    let ciphertexts = output
        .messages
        .iter()
        .zip(messages)
        .enumerate()
        .map(|(i, (keys, msgs))| {
            let [k0, k1] = keys;
            let [m0, m1] = msgs;
            check_depth(i, k0.len(), m0.len())?;
            check_depth(i, k1.len(), m1.len())?;

            Ok([
                k0.iter().zip(m0).map(|(k, m)| *k ^ *m).collect(),
                k1.iter().zip(m1).map(|(k, m)| *k ^ *m).collect(),
            ])
        })
        .collect::<Result<Vec<_>, ConvertError>>()?;

    Ok(Ciphertexts { ciphertexts })
}

/// Removes the pad from the chosen message of every OT instance.
///
/// # Arguments
///
/// * `output` - The receiver's random OT output.
/// * `ciphertexts` - The sender's padded messages.
pub fn decrypt(
    output: &RandomOTReceiverOutput,
    ciphertexts: &Ciphertexts,
) -> Result<Vec<Vec<Block>>, ConvertError> {
    let Ciphertexts { ciphertexts } = ciphertexts;

    check_choices(output)?;
    if ciphertexts.len() != output.width() {
        return Err(ConvertError::CountMismatch(
            output.width(),
            ciphertexts.len(),
        ));
    }

    output
        .messages
        .iter()
        .zip(ciphertexts)
        .enumerate()
        .map(|(i, (keys, [c0, c1]))| {
            check_depth(i, keys.len(), c0.len())?;
            check_depth(i, keys.len(), c1.len())?;

            let choice = output.choices.choice(i);
            Ok(keys
                .iter()
                .zip(c0.iter().zip(c1))
                .map(|(k, (c0, c1))| *k ^ select(choice, c0, c1))
                .collect())
        })
        .collect()
}

/// Creates the sender's side of a correlated OT with correlation `alpha`.
///
/// Returns the sender's shares `z_A` and the correction the receiver needs. For every
/// instance `i` and block `l` the receiver's share satisfies
/// `z_A[i][l] + z_B[i][l] == alpha[i][l] * x_i`.
pub fn create_correlation<C: Curve>(
    output: &RandomOTSenderOutput,
    alpha: &[Vec<C::Scalar>],
) -> Result<(Vec<Vec<C::Scalar>>, Derandomize<C>), ConvertError> {
    if alpha.len() != output.width() {
        return Err(ConvertError::CountMismatch(output.width(), alpha.len()));
    }

    let depth = output.depth();
    let mut tau = Vec::with_capacity(output.width() * depth);
    let mut shares = Vec::with_capacity(output.width());
    for (i, ([m0, m1], alpha)) in output.messages.iter().zip(alpha).enumerate() {
        check_depth(i, depth, m0.len())?;
        check_depth(i, depth, m1.len())?;
        check_depth(i, depth, alpha.len())?;

        let share: Vec<C::Scalar> = m0
            .iter()
            .zip(m1)
            .zip(alpha)
            .enumerate()
            .map(|(l, ((m0, m1), alpha))| {
                let slot = i * depth + l;
                let z_a = ecp::<C>(slot, m0);
                tau.push(ecp::<C>(slot, m1) - z_a + alpha);
                z_a
            })
            .collect();

        shares.push(share);
    }

    Ok((shares, Derandomize { tau }))
}

/// Applies the sender's correction, returning the receiver's shares `z_B`.
pub fn apply_correlation<C: Curve>(
    output: &RandomOTReceiverOutput,
    derandomize: &Derandomize<C>,
) -> Result<Vec<Vec<C::Scalar>>, ConvertError> {
    check_choices(output)?;

    let depth = output.depth();
    let expected = output.width() * depth;
    if derandomize.tau.len() != expected {
        return Err(ConvertError::CountMismatch(expected, derandomize.tau.len()));
    }

    output
        .messages
        .iter()
        .zip(derandomize.tau.chunks_exact(depth.max(1)))
        .enumerate()
        .map(|(i, (m_x, tau))| {
            check_depth(i, depth, m_x.len())?;

            let choice = output.choices.choice(i);
            Ok(m_x
                .iter()
                .zip(tau)
                .enumerate()
                .map(|(l, (m_x, tau))| {
                    let h = ecp::<C>(i * depth + l, m_x);
                    C::Scalar::conditional_select(&-h, &(*tau - h), choice)
                })
                .collect())
        })
        .collect()
}
