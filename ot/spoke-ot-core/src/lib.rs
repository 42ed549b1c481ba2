//! Low-level crate containing the sans-IO cores of the VSOT and BBOT base OTs, the
//! SoftSpokenOT extension and the conversions from random OT to chosen-message and
//! correlated OT.
//!
//! Every participant is a typestate: each round consumes the previous state and returns
//! the next one together with the message for the peer, so rounds can neither be skipped
//! nor replayed. Use the `spoke-ot` crate to run these over a channel.
//!
//! # ⚠️ Warning ⚠️
//!
//! Session ids must be unique per run. Reusing one lets the peer correlate the outputs
//! of both runs.

#![deny(missing_docs, unreachable_pub, unused_must_use)]
#![deny(unsafe_code)]
#![deny(clippy::all)]

mod abort;
pub mod bbot;
pub mod convert;
pub mod msgs;
mod output;
mod session;
pub mod softspoken;
pub mod vsot;

pub use abort::{Abort, AbortReason, Role};
pub use output::{RandomOTReceiverOutput, RandomOTSenderOutput};
pub use session::{BatchSize, SessionId};
