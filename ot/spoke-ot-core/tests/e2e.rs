use ff::Field;
use pretty_assertions::assert_eq;
use rand::SeedableRng;
use rand_chacha::{ChaCha12Rng, ChaCha20Rng};
use rstest::*;
use spoke_core::{
    curve::{Curve, Ristretto, Secp256k1, P256},
    BitVector, Block,
};
use spoke_ot_core::{
    bbot::{self, BbotConfig},
    convert,
    softspoken::{self, SoftSpokenConfig},
    vsot, Abort, AbortReason, RandomOTReceiverOutput, RandomOTSenderOutput, Role,
};

const SEED: [u8; 32] = [0x01; 32];
const SESSION_ID: [u8; 32] = *b"spoke end-to-end test session id";

fn config(width: usize, depth: usize) -> SoftSpokenConfig {
    SoftSpokenConfig::builder()
        .session_id(SESSION_ID)
        .width(width)
        .depth(depth)
        .build()
        .unwrap()
}

/// Runs the base OTs with the sender of the extension choosing `delta`.
fn base_ot<C: Curve>(
    config: &SoftSpokenConfig,
    delta: &BitVector,
) -> (RandomOTSenderOutput, RandomOTReceiverOutput) {
    let base_config = config.base_config();

    let sender = vsot::Sender::<C>::new_with_seed(base_config.clone(), SEED);
    let receiver = vsot::Receiver::<C>::new_with_seed(base_config, SEED);

    let (setup, sender) = sender.setup();
    let (payload, receiver) = receiver.receive_setup(delta, setup).unwrap();
    let (challenge, sender) = sender.receive_payload(payload).unwrap();
    let (response, receiver) = receiver.receive_challenge(challenge).unwrap();
    let (opening, sender_output) = sender.receive_response(response).unwrap();
    let receiver_output = receiver.receive_opening(opening).unwrap();

    (sender_output, receiver_output)
}

fn extend<C: Curve>(
    config: &SoftSpokenConfig,
    choices: &BitVector,
) -> (
    softspoken::Sender<softspoken::sender_state::Extended>,
    softspoken::Receiver<softspoken::receiver_state::Extended>,
) {
    let mut rng = ChaCha20Rng::from_seed(SEED);
    let delta = BitVector::random(&mut rng, softspoken::CSP);

    let (base_sender, base_receiver) = base_ot::<C>(config, &delta);

    let sender = softspoken::Sender::new(config.clone(), base_receiver).unwrap();
    let receiver =
        softspoken::Receiver::new_with_seed(config.clone(), base_sender, SEED).unwrap();

    let (extend, receiver) = receiver.extend(choices).unwrap();
    let sender = sender.extend(extend).unwrap();

    (sender, receiver)
}

fn check_extension<C: Curve>(width: usize, depth: usize) {
    let config = config(width, depth);
    let mut rng = ChaCha12Rng::seed_from_u64(0);
    let choices = BitVector::random(&mut rng, width);

    let (sender, receiver) = extend::<C>(&config, &choices);
    let sender = sender.into_output();
    let receiver = receiver.into_output();

    assert_eq!(receiver.width(), width);
    assert_eq!(receiver.depth(), depth);

    for (i, ([m0, m1], m_x)) in sender.messages.iter().zip(&receiver.messages).enumerate() {
        let (chosen, other) = if choices.get(i) { (m1, m0) } else { (m0, m1) };
        assert_eq!(m_x, chosen);
        assert_ne!(m_x, other);
    }
}

#[rstest]
#[case(128, 1)]
#[case(128, 4)]
#[case(128, 16)]
#[case(2048, 1)]
#[case(2048, 4)]
#[case(2048, 16)]
fn test_extension_ristretto(#[case] width: usize, #[case] depth: usize) {
    check_extension::<Ristretto>(width, depth);
}

#[rstest]
#[case(128, 1)]
#[case(128, 4)]
#[case(128, 16)]
#[case(2048, 1)]
#[case(2048, 4)]
#[case(2048, 16)]
fn test_extension_p256(#[case] width: usize, #[case] depth: usize) {
    check_extension::<P256>(width, depth);
}

#[rstest]
#[case(128, 4)]
#[case(2048, 1)]
fn test_extension_secp256k1(#[case] width: usize, #[case] depth: usize) {
    check_extension::<Secp256k1>(width, depth);
}

fn correlate_seven<C: Curve>(choices: &BitVector) -> Vec<(C::Scalar, bool)> {
    let config = config(128, 4);
    let (sender, receiver) = extend::<C>(&config, choices);

    let alpha = vec![vec![C::Scalar::from(7u64); 4]; 128];
    let (z_a, derandomize) = sender.correlate::<C>(&alpha).unwrap();
    let z_b = receiver.correlate::<C>(&derandomize).unwrap();

    assert_eq!(z_a.len(), 128);
    assert_eq!(z_b.len(), 128);

    z_a.iter()
        .zip(&z_b)
        .enumerate()
        .flat_map(|(i, (z_a, z_b))| {
            assert_eq!(z_a.len(), 4);
            z_a.iter()
                .zip(z_b)
                .map(move |(a, b)| (*a + *b, choices.get(i)))
        })
        .collect()
}

#[test]
fn test_end_to_end_correlation() {
    let mut rng = ChaCha20Rng::from_seed(SEED);
    let choices = BitVector::random(&mut rng, 128);

    for (sum, choice) in correlate_seven::<Ristretto>(&choices) {
        let expected = if choice {
            <Ristretto as Curve>::Scalar::from(7u64)
        } else {
            <Ristretto as Curve>::Scalar::ZERO
        };
        assert_eq!(sum, expected);
    }
}

#[test]
fn test_end_to_end_correlation_all_chosen() {
    let choices = BitVector::pack(&[1; 128]).unwrap();

    for (sum, _) in correlate_seven::<P256>(&choices) {
        assert_eq!(sum, <P256 as Curve>::Scalar::from(7u64));
    }
}

#[test]
fn test_replayed_base_setup() {
    let other = SoftSpokenConfig::builder()
        .session_id(b"another session".to_vec())
        .width(128)
        .build()
        .unwrap();
    let config = config(128, 1);

    // The sender's first message from another session must not be accepted.
    let (setup, _) = vsot::Sender::<Ristretto>::new(other.base_config()).setup();

    let mut rng = ChaCha12Rng::seed_from_u64(0);
    let delta = BitVector::random(&mut rng, softspoken::CSP);
    let err = vsot::Receiver::<Ristretto>::new(config.base_config())
        .receive_setup(&delta, setup)
        .unwrap_err();

    assert!(matches!(
        err,
        vsot::ReceiverError::Abort(Abort {
            culprit: Role::Sender,
            reason: AbortReason::InvalidProof
        })
    ));
}

#[test]
fn test_reused_base_output() {
    let config = config(128, 1);
    let mut rng = ChaCha12Rng::seed_from_u64(0);
    let delta = BitVector::random(&mut rng, softspoken::CSP);
    let choices = BitVector::random(&mut rng, 128);

    let (base_sender, base_receiver) = base_ot::<Ristretto>(&config, &delta);

    // A copy of the receiver's base output replayed in a second extension, in which the
    // sender's base output belongs to a different base run.
    let replayed: RandomOTReceiverOutput =
        bincode::deserialize(&bincode::serialize(&base_receiver).unwrap()).unwrap();

    let first = softspoken::Sender::new(config.clone(), base_receiver).unwrap();
    let receiver = softspoken::Receiver::new(config.clone(), base_sender).unwrap();
    let (extend, _) = receiver.extend(&choices).unwrap();
    assert!(first.extend(extend).is_ok());

    let fresh = SoftSpokenConfig::builder()
        .session_id(b"fresh session".to_vec())
        .width(128)
        .build()
        .unwrap();
    let (fresh_base_sender, _) = base_ot::<Ristretto>(&fresh, &delta);

    let second = softspoken::Sender::new(config.clone(), replayed).unwrap();
    let receiver = softspoken::Receiver::new(config, fresh_base_sender).unwrap();
    let (extend, _) = receiver.extend(&choices).unwrap();

    assert!(matches!(
        second.extend(extend),
        Err(softspoken::SenderError::Abort(Abort {
            culprit: Role::Receiver,
            reason: AbortReason::ConsistencyCheck
        }))
    ));
}

#[test]
fn test_outputs_serialize() {
    let config = config(128, 1);
    let mut rng = ChaCha12Rng::seed_from_u64(0);
    let choices = BitVector::random(&mut rng, 128);

    let (sender, receiver) = extend::<Ristretto>(&config, &choices);
    let sender = sender.into_output();
    let receiver = receiver.into_output();

    let decoded: RandomOTSenderOutput =
        bincode::deserialize(&bincode::serialize(&sender).unwrap()).unwrap();
    assert_eq!(decoded.messages, sender.messages);

    let decoded: RandomOTReceiverOutput =
        bincode::deserialize(&bincode::serialize(&receiver).unwrap()).unwrap();
    assert_eq!(decoded.choices, receiver.choices);
    assert_eq!(decoded.messages, receiver.messages);
}

type BbotRun = fn(usize, usize) -> (RandomOTSenderOutput, RandomOTReceiverOutput, BitVector);

fn run_bbot<C: Curve>(
    config: BbotConfig,
    choices: &BitVector,
) -> (RandomOTSenderOutput, RandomOTReceiverOutput) {
    let sender = bbot::Sender::<C>::new_with_seed(config.clone(), SEED);
    let receiver = bbot::Receiver::<C>::new_with_seed(config, SEED);

    let (setup, sender) = sender.setup();
    let (payload, receiver_output) = receiver.receive_setup(choices, setup).unwrap();
    let sender_output = sender.receive_payload(payload).unwrap();

    (sender_output, receiver_output)
}

fn bbot_rot<C: Curve>(
    width: usize,
    depth: usize,
) -> (RandomOTSenderOutput, RandomOTReceiverOutput, BitVector) {
    let config = BbotConfig::builder()
        .session_id(SESSION_ID)
        .width(width)
        .depth(depth)
        .build()
        .unwrap();
    let mut rng = ChaCha12Rng::seed_from_u64(0);
    let choices = BitVector::random(&mut rng, width);

    let (sender, receiver) = run_bbot::<C>(config, &choices);

    assert_eq!(sender.width(), width);
    assert_eq!(sender.depth(), depth);
    check_rot(&sender.messages, &receiver.messages, &choices);

    (sender, receiver, choices)
}

fn check_rot(sender: &[[Vec<Block>; 2]], receiver: &[Vec<Block>], choices: &BitVector) {
    assert_eq!(sender.len(), receiver.len());
    for (i, ([m0, m1], m_x)) in sender.iter().zip(receiver).enumerate() {
        let (chosen, other) = if choices.get(i) { (m1, m0) } else { (m0, m1) };
        assert_eq!(m_x, chosen);
        assert_ne!(m_x, other);
    }
}

#[rstest]
#[case::secp256k1(bbot_rot::<Secp256k1>)]
#[case::p256(bbot_rot::<P256>)]
fn test_bbot_rot(#[case] rot: BbotRun) {
    rot(128, 4);
}

#[rstest]
#[case::secp256k1(bbot_rot::<Secp256k1>)]
#[case::p256(bbot_rot::<P256>)]
fn test_bbot_ot(#[case] rot: BbotRun) {
    let (sender, receiver, choices) = rot(256, 3);

    let mut rng = ChaCha12Rng::seed_from_u64(1);
    let messages: Vec<[Vec<Block>; 2]> = (0..256)
        .map(|_| [Block::random_vec(&mut rng, 3), Block::random_vec(&mut rng, 3)])
        .collect();

    let ciphertexts = convert::encrypt(&sender, &messages).unwrap();
    let chosen = convert::decrypt(&receiver, &ciphertexts).unwrap();

    check_rot(&messages, &chosen, &choices);
}

fn check_bbot_cot<C: Curve>() {
    let (sender, receiver, choices) = bbot_rot::<C>(256, 3);

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

#[test]
fn test_bbot_cot() {
    check_bbot_cot::<Secp256k1>();
    check_bbot_cot::<P256>();
}

fn check_extension_on_bbot<C: Curve>(width: usize, depth: usize) {
    let config = config(width, depth);
    let mut rng = ChaCha20Rng::from_seed(SEED);
    let delta = BitVector::random(&mut rng, softspoken::CSP);
    let choices = BitVector::random(&mut rng, width);

    let (base_sender, base_receiver) = run_bbot::<C>(config.bbot_base_config(), &delta);

    let sender = softspoken::Sender::new(config.clone(), base_receiver).unwrap();
    let receiver = softspoken::Receiver::new_with_seed(config, base_sender, SEED).unwrap();

    let (extend, receiver) = receiver.extend(&choices).unwrap();
    let sender = sender.extend(extend).unwrap().into_output();
    let receiver = receiver.into_output();

    assert_eq!(receiver.width(), width);
    assert_eq!(receiver.depth(), depth);
    check_rot(&sender.messages, &receiver.messages, &choices);
}

#[rstest]
#[case(128, 4)]
#[case(2048, 1)]
fn test_extension_on_bbot(#[case] width: usize, #[case] depth: usize) {
    check_extension_on_bbot::<Secp256k1>(width, depth);
    check_extension_on_bbot::<P256>(width, depth);
}
