// src/channel.rs

//! The public channel handle.
//!
//! A `Channel` is a cheap clone over shared state; every clone addresses the
//! same channel. The channel's resources are reclaimed when the last clone
//! drops, so there is no disposal call to race against in-flight operations:
//! a thread blocked inside `send`, `recv`, or a select holds a handle borrow
//! and thereby keeps the channel alive.

use crate::error::{RecvError, SendError, TryRecvError, TrySendError};
use crate::flavors::buffered::BufferedChannel;
use crate::flavors::rendezvous::RendezvousChannel;
use crate::observer::ObserverRegistry;

use std::fmt;
use std::sync::Arc;

pub(crate) enum Flavor {
  Buffered(BufferedChannel),
  Rendezvous(RendezvousChannel),
}

/// A channel transporting opaque messages of a fixed byte width.
///
/// Capacity `0` creates a rendezvous channel: every send completes only once
/// a receiver takes the message, and vice versa. Capacity `n > 0` creates a
/// bounded FIFO holding up to `n` messages; senders block on a full ring and
/// receivers on an empty one.
///
/// The channel never interprets message bytes. Callers pick a fixed encoding
/// per channel (`i32::to_le_bytes`, a packed struct, …) and pass slices of
/// exactly [`msg_len`](Channel::msg_len) bytes.
pub struct Channel {
  shared: Arc<Flavor>,
}

impl Clone for Channel {
  fn clone(&self) -> Self {
    Channel {
      shared: Arc::clone(&self.shared),
    }
  }
}

impl Channel {
  /// Creates a channel for messages of `msg_len` bytes.
  ///
  /// `capacity == 0` selects rendezvous mode; `capacity > 0` a bounded FIFO.
  ///
  /// # Panics
  ///
  /// Panics if `msg_len` is 0.
  pub fn new(capacity: usize, msg_len: usize) -> Self {
    assert!(msg_len > 0, "message width must be greater than 0");
    let flavor = if capacity == 0 {
      Flavor::Rendezvous(RendezvousChannel::new(msg_len))
    } else {
      Flavor::Buffered(BufferedChannel::new(capacity, msg_len))
    };
    Channel {
      shared: Arc::new(flavor),
    }
  }

  /// Sends one message, blocking while the channel cannot accept it.
  ///
  /// Returns `Err(SendError::Closed)` if the channel is closed before the
  /// message is accepted.
  ///
  /// # Panics
  ///
  /// Panics if `msg.len() != self.msg_len()`.
  pub fn send(&self, msg: &[u8]) -> Result<(), SendError> {
    assert_eq!(msg.len(), self.msg_len(), "message width mismatch");
    match &*self.shared {
      Flavor::Buffered(chan) => chan.send(msg),
      Flavor::Rendezvous(chan) => chan.send(msg),
    }
  }

  /// Receives one message into `out`, blocking while none is available.
  ///
  /// Messages enqueued before close remain receivable. Once the channel is
  /// closed and drained, `out` is zero-filled and `Err(RecvError::Closed)`
  /// is returned.
  ///
  /// # Panics
  ///
  /// Panics if `out.len() != self.msg_len()`.
  pub fn recv(&self, out: &mut [u8]) -> Result<(), RecvError> {
    assert_eq!(out.len(), self.msg_len(), "message width mismatch");
    match &*self.shared {
      Flavor::Buffered(chan) => chan.recv(out),
      Flavor::Rendezvous(chan) => chan.recv(out),
    }
  }

  /// Non-blocking send: accepts the message only if the channel can take it
  /// right now (ring not full, or a receiver already waiting at the
  /// rendezvous).
  ///
  /// # Panics
  ///
  /// Panics if `msg.len() != self.msg_len()`.
  pub fn try_send(&self, msg: &[u8]) -> Result<(), TrySendError> {
    assert_eq!(msg.len(), self.msg_len(), "message width mismatch");
    match &*self.shared {
      Flavor::Buffered(chan) => chan.try_send(msg),
      Flavor::Rendezvous(chan) => chan.try_send(msg),
    }
  }

  /// Non-blocking receive: takes a message only if one is available right
  /// now (ring not empty, or a sender already waiting at the rendezvous).
  ///
  /// # Panics
  ///
  /// Panics if `out.len() != self.msg_len()`.
  pub fn try_recv(&self, out: &mut [u8]) -> Result<(), TryRecvError> {
    assert_eq!(out.len(), self.msg_len(), "message width mismatch");
    match &*self.shared {
      Flavor::Buffered(chan) => chan.try_recv(out),
      Flavor::Rendezvous(chan) => chan.try_recv(out),
    }
  }

  /// Closes the channel. Idempotent; wakes every blocked sender, receiver,
  /// and selector. Subsequent sends fail with `Closed`; receives drain any
  /// buffered messages and then report `Closed` with zero-filled output.
  pub fn close(&self) {
    match &*self.shared {
      Flavor::Buffered(chan) => chan.close(),
      Flavor::Rendezvous(chan) => chan.close(),
    }
  }

  /// True once [`close`](Channel::close) has been called. Monotonic.
  pub fn is_closed(&self) -> bool {
    match &*self.shared {
      Flavor::Buffered(chan) => chan.is_closed(),
      Flavor::Rendezvous(chan) => chan.is_closed(),
    }
  }

  /// Number of buffered messages. Always 0 for a rendezvous channel, which
  /// holds nothing between handshakes.
  pub fn len(&self) -> usize {
    match &*self.shared {
      Flavor::Buffered(chan) => chan.len(),
      Flavor::Rendezvous(_) => 0,
    }
  }

  /// True if no message is buffered.
  pub fn is_empty(&self) -> bool {
    match &*self.shared {
      Flavor::Buffered(chan) => chan.is_empty(),
      Flavor::Rendezvous(_) => true,
    }
  }

  /// True if a send would block. A rendezvous channel buffers nothing, so
  /// it reports full except while a receiver is already parked at the
  /// barrier, when a send would complete immediately.
  pub fn is_full(&self) -> bool {
    match &*self.shared {
      Flavor::Buffered(chan) => chan.is_full(),
      Flavor::Rendezvous(chan) => chan.is_full(),
    }
  }

  /// The FIFO depth this channel was created with; 0 for rendezvous.
  pub fn capacity(&self) -> usize {
    match &*self.shared {
      Flavor::Buffered(chan) => chan.capacity(),
      Flavor::Rendezvous(_) => 0,
    }
  }

  /// The fixed message width in bytes.
  pub fn msg_len(&self) -> usize {
    match &*self.shared {
      Flavor::Buffered(chan) => chan.msg_len(),
      Flavor::Rendezvous(chan) => chan.msg_len(),
    }
  }

  #[inline]
  pub(crate) fn flavor(&self) -> &Flavor {
    &self.shared
  }

  pub(crate) fn observers(&self) -> &ObserverRegistry {
    match &*self.shared {
      Flavor::Buffered(chan) => &chan.observers,
      Flavor::Rendezvous(chan) => &chan.observers,
    }
  }
}

impl fmt::Debug for Channel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Channel")
      .field("capacity", &self.capacity())
      .field("msg_len", &self.msg_len())
      .field("closed", &self.is_closed())
      .finish()
  }
}
