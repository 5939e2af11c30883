#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]

//! CSP-style channels for communicating threads.
//!
//! Strand provides the classic channel vocabulary of Hoare's Communicating
//! Sequential Processes over plain OS threads: rendezvous (unbuffered)
//! channels, bounded FIFO (buffered) channels, closure as the one
//! cancellation signal, and a multi-way `select` that commits exactly one of
//! several potential sends and receives, chosen uniformly at random among
//! the ready ones.
//!
//! Messages are opaque byte blobs of a fixed width chosen per channel; the
//! channel copies and never interprets them. There is no async machinery:
//! every blocking operation parks a real thread.
//!
//! # Example
//!
//! ```
//! use strand::{task, Channel};
//!
//! // A FIFO of four 4-byte messages.
//! let ch = Channel::new(4, 4);
//!
//! let tx = ch.clone();
//! let producer = task::spawn(move || {
//!   for v in 0..10i32 {
//!     tx.send(&v.to_le_bytes()).unwrap();
//!   }
//!   tx.close();
//! })
//! .unwrap();
//!
//! let mut buf = [0u8; 4];
//! let mut received = Vec::new();
//! while ch.recv(&mut buf).is_ok() {
//!   received.push(i32::from_le_bytes(buf));
//! }
//! producer.join();
//!
//! assert_eq!(received, (0..10).collect::<Vec<_>>());
//! ```

pub mod error;
pub mod select;
pub mod task;
pub mod telemetry;

mod channel;
mod flavors;
mod observer;
mod ring;

pub use channel::Channel;
pub use error::{RecvError, SendError, TryRecvError, TrySendError};
pub use select::{select, try_select, RecvOp, SendOp};
