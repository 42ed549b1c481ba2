//! Prime-order groups the protocols are generic over.

use ff::PrimeField;
use group::{Group, GroupEncoding};
use subtle::{ConditionallySelectable, ConstantTimeEq};

use crate::hash::{hash, hash_wide};

/// Errors that can occur when hashing onto a curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("failed to hash onto {0}")]
pub struct HashToCurveError(pub &'static str);

/// A prime-order group together with its scalar field.
pub trait Curve: Copy + Clone + std::fmt::Debug + Default + Send + Sync + 'static {
    /// The scalar field.
    type Scalar: PrimeField + ConditionallySelectable;
    /// The group elements.
    type Point: Group<Scalar = Self::Scalar>
        + GroupEncoding
        + ConditionallySelectable
        + ConstantTimeEq;

    /// A name bound into transcripts, so runs over different curves never agree.
    const NAME: &'static [u8];

    /// Reduces 64 uniform bytes into a scalar.
    fn scalar_from_wide(bytes: &[u8; 64]) -> Self::Scalar;

    /// Hashes `parts` into a scalar under the domain `context`.
    fn hash_to_scalar(context: &str, parts: &[&[u8]]) -> Self::Scalar {
        Self::scalar_from_wide(&hash_wide(context, parts))
    }

    /// Hashes `parts` onto a point whose discrete log nobody knows.
    fn hash_to_point(context: &str, parts: &[&[u8]]) -> Result<Self::Point, HashToCurveError>;

    /// Returns the group generator.
    fn generator() -> Self::Point {
        Self::Point::generator()
    }
}

/// The Ristretto group over Curve25519.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Ristretto;

impl Curve for Ristretto {
    type Scalar = curve25519_dalek::Scalar;
    type Point = curve25519_dalek::RistrettoPoint;

    const NAME: &'static [u8] = b"ristretto255";

    fn scalar_from_wide(bytes: &[u8; 64]) -> Self::Scalar {
        curve25519_dalek::Scalar::from_bytes_mod_order_wide(bytes)
    }

    fn hash_to_point(context: &str, parts: &[&[u8]]) -> Result<Self::Point, HashToCurveError> {
        Ok(curve25519_dalek::RistrettoPoint::from_uniform_bytes(
            &hash_wide(context, parts),
        ))
    }
}

/// The NIST P-256 curve.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct P256;

impl Curve for P256 {
    type Scalar = p256::Scalar;
    type Point = p256::ProjectivePoint;

    const NAME: &'static [u8] = b"P-256";

    fn scalar_from_wide(bytes: &[u8; 64]) -> Self::Scalar {
        use elliptic_curve::{bigint::U256, ops::Reduce};

        <p256::Scalar as Reduce<U256>>::reduce_bytes(p256::FieldBytes::from_slice(&bytes[..32]))
    }

    fn hash_to_point(context: &str, parts: &[&[u8]]) -> Result<Self::Point, HashToCurveError> {
        use elliptic_curve::hash2curve::{ExpandMsgXmd, GroupDigest};

        let msg = hash(context, parts);
        p256::NistP256::hash_from_bytes::<ExpandMsgXmd<sha2::Sha256>>(
            &[msg.as_ref()],
            &[context.as_bytes()],
        )
        .map_err(|_| HashToCurveError("P-256"))
    }
}

/// The secp256k1 curve.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Secp256k1;

impl Curve for Secp256k1 {
    type Scalar = k256::Scalar;
    type Point = k256::ProjectivePoint;

    const NAME: &'static [u8] = b"secp256k1";

    fn scalar_from_wide(bytes: &[u8; 64]) -> Self::Scalar {
        use elliptic_curve::{bigint::U256, ops::Reduce};

        <k256::Scalar as Reduce<U256>>::reduce_bytes(k256::FieldBytes::from_slice(&bytes[..32]))
    }

    fn hash_to_point(context: &str, parts: &[&[u8]]) -> Result<Self::Point, HashToCurveError> {
        use elliptic_curve::hash2curve::{ExpandMsgXmd, GroupDigest};

        let msg = hash(context, parts);
        k256::Secp256k1::hash_from_bytes::<ExpandMsgXmd<sha2::Sha256>>(
            &[msg.as_ref()],
            &[context.as_bytes()],
        )
        .map_err(|_| HashToCurveError("secp256k1"))
    }
}

/// Decodes a point from its canonical encoding.
pub fn decode_point<P: GroupEncoding>(bytes: &[u8]) -> Option<P> {
    let mut repr = P::Repr::default();
    if repr.as_ref().len() != bytes.len() {
        return None;
    }
    repr.as_mut().copy_from_slice(bytes);

    Option::from(P::from_bytes(&repr))
}

/// Decodes a scalar from its canonical encoding.
pub fn decode_scalar<S: PrimeField>(bytes: &[u8]) -> Option<S> {
    let mut repr = S::Repr::default();
    if repr.as_ref().len() != bytes.len() {
        return None;
    }
    repr.as_mut().copy_from_slice(bytes);

    Option::from(S::from_repr(repr))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ff::Field;
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;

    fn check_curve<C: Curve>() {
        let mut rng = ChaCha12Rng::seed_from_u64(0);
        let a = C::Scalar::random(&mut rng);
        let b = C::Scalar::random(&mut rng);

        let g = C::generator();
        assert_eq!(g * a + g * b, g * (a + b));

        let p = g * a;
        let decoded: C::Point = decode_point(p.to_bytes().as_ref()).unwrap();
        assert_eq!(decoded, p);

        let decoded: C::Scalar = decode_scalar(a.to_repr().as_ref()).unwrap();
        assert_eq!(decoded, a);

        assert!(decode_point::<C::Point>(&[0u8; 3]).is_none());

        let h0 = C::hash_to_scalar("spoke test", &[b"x"]);
        let h1 = C::hash_to_scalar("spoke test", &[b"y"]);
        assert_ne!(h0, h1);
        assert_eq!(h0, C::hash_to_scalar("spoke test", &[b"x"]));

        let p0 = C::hash_to_point("spoke test", &[b"x"]).unwrap();
        let p1 = C::hash_to_point("spoke test", &[b"y"]).unwrap();
        assert_ne!(p0, p1);
        assert!(!bool::from(p0.is_identity()));
        assert_eq!(p0, C::hash_to_point("spoke test", &[b"x"]).unwrap());
        assert_ne!(p0, C::hash_to_point("spoke other", &[b"x"]).unwrap());
    }

    #[test]
    fn test_ristretto() {
        check_curve::<Ristretto>();
    }

    #[test]
    fn test_p256() {
        check_curve::<P256>();
    }

    #[test]
    fn test_secp256k1() {
        check_curve::<Secp256k1>();
    }
}
