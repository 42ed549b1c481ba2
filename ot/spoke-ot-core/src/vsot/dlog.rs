//! Non-interactive proof of knowledge of a discrete logarithm.

use ff::Field;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use spoke_core::{
    serialize::{point, scalar},
    Curve, Transcript,
};
use subtle::ConstantTimeEq;

/// A Schnorr proof of knowledge of `x` such that `y = x * G`, made non-interactive with
/// the Fiat-Shamir transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct DLogProof<C: Curve> {
    /// The commitment `t = r * G`.
    #[serde(with = "point")]
    pub t: C::Point,
    /// The response `s = r + c * x`.
    #[serde(with = "scalar")]
    pub s: C::Scalar,
}

impl<C: Curve> DLogProof<C> {
    /// Proves knowledge of `x`.
    pub fn prove<R: RngCore + CryptoRng>(
        x: &C::Scalar,
        transcript: &mut Transcript,
        rng: &mut R,
    ) -> Self {
        let r = C::Scalar::random(rng);
        let t = C::generator() * r;
        let y = C::generator() * x;
        let c = Self::fiat_shamir(&y, &t, transcript);

        Self { t, s: r + c * x }
    }

    /// Verifies the proof against the public key `y`.
    pub fn verify(&self, y: &C::Point, transcript: &mut Transcript) -> bool {
        let c = Self::fiat_shamir(y, &self.t, transcript);
        let lhs = C::generator() * self.s;
        let rhs = self.t + *y * c;

        lhs.ct_eq(&rhs).into()
    }

    fn fiat_shamir(y: &C::Point, t: &C::Point, transcript: &mut Transcript) -> C::Scalar {
        transcript.append_point::<C>(b"y", y);
        transcript.append_point::<C>(b"t", t);
        transcript.append_point::<C>(b"base-point", &C::generator());
        transcript.challenge_scalar::<C>(b"dlog-challenge")
    }
}
