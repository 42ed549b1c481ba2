//! Async driver for the BBOT base OT.
//!
//! BBOT is a two-message random OT. Chosen-message and correlated OT are derived from its
//! output with [`spoke_ot_core::convert`].

mod error;
mod receiver;
mod sender;

pub use error::{ReceiverError, SenderError};
pub use receiver::Receiver;
pub use sender::Sender;

pub use spoke_ot_core::bbot::{msgs, BbotConfig, BbotConfigBuilder, BbotConfigBuilderError};

#[cfg(test)]
mod tests {
    use super::*;
    use ff::Field;
    use futures::StreamExt;
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;
    use spoke_core::{
        curve::{Curve, Secp256k1, P256},
        BitVector, Block,
    };
    use spoke_ot_core::convert;
    use utils_aio::duplex::MemoryDuplex;

    use crate::{
        OTError, RandomOTReceiver, RandomOTReceiverOutput, RandomOTSender, RandomOTSenderOutput,
    };

    fn config(width: usize, depth: usize) -> BbotConfig {
        BbotConfig::builder()
            .session_id(b"bbot driver test".to_vec())
            .width(width)
            .depth(depth)
            .build()
            .unwrap()
    }

    fn choices(width: usize) -> BitVector {
        let mut rng = ChaCha12Rng::seed_from_u64(0);
        BitVector::random(&mut rng, width)
    }

    async fn run<C: Curve>(
        config: BbotConfig,
        choices: &BitVector,
    ) -> (RandomOTSenderOutput, RandomOTReceiverOutput) {
        let (sender_channel, receiver_channel) = MemoryDuplex::<msgs::Message<C>>::new();

        let (mut sender_sink, mut sender_stream) = sender_channel.split();
        let (mut receiver_sink, mut receiver_stream) = receiver_channel.split();

        let mut sender = Sender::<C>::new(config.clone());
        let mut receiver = Receiver::<C>::new(config);

        let (sender_res, receiver_res) = tokio::join!(
            sender.send_random(&mut sender_sink, &mut sender_stream),
            receiver.receive_random(&mut receiver_sink, &mut receiver_stream, choices)
        );

        (sender_res.unwrap(), receiver_res.unwrap())
    }

    async fn check_rot<C: Curve>() {
        let choices = choices(128);
        let (sender, receiver) = run::<C>(config(128, 2), &choices).await;

        assert_eq!(receiver.choices, choices);
        for (i, ([m0, m1], m)) in sender.messages.iter().zip(&receiver.messages).enumerate() {
            assert_eq!(m, if choices.get(i) { m1 } else { m0 });
        }
    }

    async fn check_ot<C: Curve>() {
        let choices = choices(256);
        let (sender, receiver) = run::<C>(config(256, 3), &choices).await;

        let mut rng = ChaCha12Rng::seed_from_u64(1);
        let messages: Vec<[Vec<Block>; 2]> = (0..256)
            .map(|_| [Block::random_vec(&mut rng, 3), Block::random_vec(&mut rng, 3)])
            .collect();

        let ciphertexts = convert::encrypt(&sender, &messages).unwrap();
        let chosen = convert::decrypt(&receiver, &ciphertexts).unwrap();

        for (i, ([m0, m1], m)) in messages.iter().zip(&chosen).enumerate() {
            assert_eq!(m, if choices.get(i) { m1 } else { m0 });
        }
    }

    async fn check_cot<C: Curve>() {
        let choices = choices(256);
        let (sender, receiver) = run::<C>(config(256, 3), &choices).await;

        let mut rng = ChaCha12Rng::seed_from_u64(2);
        let alpha: Vec<Vec<C::Scalar>> = (0..256)
            .map(|_| (0..3).map(|_| C::Scalar::random(&mut rng)).collect())
            .collect();

        let (z_a, derandomize) = convert::create_correlation::<C>(&sender, &alpha).unwrap();
        let z_b = convert::apply_correlation::<C>(&receiver, &derandomize).unwrap();

        for (i, ((z_a, z_b), alpha)) in z_a.iter().zip(&z_b).zip(&alpha).enumerate() {
            for ((a, b), alpha) in z_a.iter().zip(z_b).zip(alpha) {
                let expected = if choices.get(i) { *alpha } else { C::Scalar::ZERO };
                assert_eq!(*a + *b, expected);
            }
        }
    }

    #[tokio::test]
    async fn test_bbot_rot() {
        check_rot::<Secp256k1>().await;
        check_rot::<P256>().await;
    }

    #[tokio::test]
    async fn test_bbot_ot() {
        check_ot::<Secp256k1>().await;
        check_ot::<P256>().await;
    }

    #[tokio::test]
    async fn test_bbot_cot() {
        check_cot::<Secp256k1>().await;
        check_cot::<P256>().await;
    }

    #[tokio::test]
    async fn test_bbot_reuse() {
        let config = config(64, 1);
        let choices = choices(64);

        let (sender_channel, receiver_channel) = MemoryDuplex::<msgs::Message<P256>>::new();

        let (mut sender_sink, mut sender_stream) = sender_channel.split();
        let (mut receiver_sink, mut receiver_stream) = receiver_channel.split();

        let mut sender = Sender::<P256>::new_with_seed(config.clone(), [0; 32]);
        let mut receiver = Receiver::<P256>::new_with_seed(config, [1; 32]);

        let (sender_res, receiver_res) = tokio::join!(
            sender.send_random(&mut sender_sink, &mut sender_stream),
            receiver.receive_random(&mut receiver_sink, &mut receiver_stream, &choices)
        );
        sender_res.unwrap();
        receiver_res.unwrap();

        let err = sender
            .send_random(&mut sender_sink, &mut sender_stream)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            OTError::SenderError(e) if matches!(
                e.downcast_ref::<SenderError>(),
                Some(SenderError::StateError(_))
            )
        ));

        let err = receiver
            .receive_random(&mut receiver_sink, &mut receiver_stream, &choices)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            OTError::ReceiverError(e) if matches!(
                e.downcast_ref::<ReceiverError>(),
                Some(ReceiverError::StateError(_))
            )
        ));
    }
}
