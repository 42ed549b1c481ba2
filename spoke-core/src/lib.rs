//! Core types and utilities for oblivious transfer protocols.
#![deny(missing_docs, unreachable_pub, unused_must_use)]
#![deny(unsafe_code)]
#![deny(clippy::all)]

pub mod bits;
pub mod block;
pub mod curve;
pub mod hash;
pub mod prg;
pub mod select;
pub mod serialize;
pub mod transcript;
pub mod transpose;

pub use bits::BitVector;
pub use block::Block;
pub use curve::Curve;
pub use hash::Hash;
pub use transcript::Transcript;
