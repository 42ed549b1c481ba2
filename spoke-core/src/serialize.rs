//! Serde helpers for group elements and scalars.
//!
//! Use with `#[serde(with = "...")]`. Values are written in their canonical
//! compressed encoding and rejected on decode if they are not valid.

use ff::PrimeField;
use group::GroupEncoding;
use serde::{de::Error, Deserialize, Deserializer, Serialize, Serializer};

use crate::curve::{decode_point, decode_scalar};

/// A single group element.
pub mod point {
    use super::*;

    /// Serializes a group element.
    pub fn serialize<P: GroupEncoding, S: Serializer>(
        point: &P,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        point.to_bytes().as_ref().serialize(serializer)
    }

    /// Deserializes a group element.
    pub fn deserialize<'de, P: GroupEncoding, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<P, D::Error> {
        let bytes = Vec::<u8>::deserialize(deserializer)?;
        decode_point(&bytes).ok_or_else(|| D::Error::custom("invalid point encoding"))
    }
}

/// A vector of group elements.
pub mod points {
    use super::*;

    /// Serializes group elements.
    pub fn serialize<P: GroupEncoding, S: Serializer>(
        points: &[P],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(points.iter().map(|p| p.to_bytes().as_ref().to_vec()))
    }

    /// Deserializes group elements.
    pub fn deserialize<'de, P: GroupEncoding, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<P>, D::Error> {
        Vec::<Vec<u8>>::deserialize(deserializer)?
            .iter()
            .map(|bytes| {
                decode_point(bytes).ok_or_else(|| D::Error::custom("invalid point encoding"))
            })
            .collect()
    }
}

/// A single scalar.
pub mod scalar {
    use super::*;

    /// Serializes a scalar.
    pub fn serialize<F: PrimeField, S: Serializer>(
        scalar: &F,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        scalar.to_repr().as_ref().serialize(serializer)
    }

    /// Deserializes a scalar.
    pub fn deserialize<'de, F: PrimeField, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<F, D::Error> {
        let bytes = Vec::<u8>::deserialize(deserializer)?;
        decode_scalar(&bytes).ok_or_else(|| D::Error::custom("invalid scalar encoding"))
    }
}

/// A vector of scalars.
pub mod scalars {
    use super::*;

    /// Serializes scalars.
    pub fn serialize<F: PrimeField, S: Serializer>(
        scalars: &[F],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(scalars.iter().map(|s| s.to_repr().as_ref().to_vec()))
    }

    /// Deserializes scalars.
    pub fn deserialize<'de, F: PrimeField, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<F>, D::Error> {
        Vec::<Vec<u8>>::deserialize(deserializer)?
            .iter()
            .map(|bytes| {
                decode_scalar(bytes).ok_or_else(|| D::Error::custom("invalid scalar encoding"))
            })
            .collect()
    }
}
