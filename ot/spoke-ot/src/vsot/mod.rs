//! Async driver for the VSOT base OT.
//!
//! # Examples
//!
//! ```
//! use futures::StreamExt;
//! use spoke_core::{curve::Ristretto, BitVector};
//! use spoke_ot::{
//!     vsot::{Receiver, Sender, VsotConfig},
//!     RandomOTReceiver, RandomOTSender,
//! };
//! use utils_aio::duplex::MemoryDuplex;
//!
//! # futures::executor::block_on(async {
//! // An in-memory duplex channel.
//! let (sender_channel, receiver_channel) = MemoryDuplex::new();
//!
//! let (mut sender_sink, mut sender_stream) = sender_channel.split();
//! let (mut receiver_sink, mut receiver_stream) = receiver_channel.split();
//!
//! let config = VsotConfig::builder()
//!     .session_id(b"example session".to_vec())
//!     .width(8)
//!     .build()
//!     .unwrap();
//!
//! let mut sender = Sender::<Ristretto>::new(config.clone());
//! let mut receiver = Receiver::<Ristretto>::new(config);
//!
//! let choices = BitVector::pack(&[0, 1, 1, 0, 1, 0, 0, 1]).unwrap();
//!
//! let (sender_res, receiver_res) = futures::join!(
//!     sender.send_random(&mut sender_sink, &mut sender_stream),
//!     receiver.receive_random(&mut receiver_sink, &mut receiver_stream, &choices)
//! );
//!
//! let sender_output = sender_res.unwrap();
//! let receiver_output = receiver_res.unwrap();
//!
//! assert_eq!(receiver_output.messages[1], sender_output.messages[1][1]);
//! # });
//! ```

mod error;
mod receiver;
mod sender;

pub use error::{ReceiverError, SenderError};
pub use receiver::Receiver;
pub use sender::Sender;

pub use spoke_ot_core::vsot::{msgs, VsotConfig, VsotConfigBuilder, VsotConfigBuilderError};
