// src/error.rs

//! Errors reported by channel operations.
//!
//! Closure is the only failure a blocking operation can see, so the blocking
//! errors are single-variant. The `try_*` forms additionally report the
//! would-block cases (`Full` / `Empty`).

use core::fmt;

/// Error returned by [`Channel::send`](crate::Channel::send).
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum SendError {
  /// The channel is closed; the message was not accepted.
  Closed,
}

impl std::error::Error for SendError {}
impl fmt::Display for SendError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      SendError::Closed => write!(f, "sending on a closed channel"),
    }
  }
}

/// Error returned by [`Channel::recv`](crate::Channel::recv).
///
/// On `Closed` the output buffer has been zero-filled: a closed channel
/// yields zero messages once drained.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum RecvError {
  /// The channel is closed and holds no more messages.
  Closed,
}

impl std::error::Error for RecvError {}
impl fmt::Display for RecvError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RecvError::Closed => write!(f, "receiving on a closed, drained channel"),
    }
  }
}

/// Error returned by [`Channel::try_send`](crate::Channel::try_send).
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TrySendError {
  /// The channel cannot accept a message right now: the ring is full, or no
  /// receiver is waiting at an unbuffered rendezvous.
  Full,
  /// The channel is closed.
  Closed,
}

impl std::error::Error for TrySendError {}
impl fmt::Display for TrySendError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TrySendError::Full => write!(f, "channel not ready to accept a message"),
      TrySendError::Closed => write!(f, "sending on a closed channel"),
    }
  }
}

/// Error returned by [`Channel::try_recv`](crate::Channel::try_recv).
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TryRecvError {
  /// No message is available right now: the ring is empty, or no sender is
  /// waiting at an unbuffered rendezvous.
  Empty,
  /// The channel is closed and holds no more messages. The output buffer
  /// has been zero-filled.
  Closed,
}

impl std::error::Error for TryRecvError {}
impl fmt::Display for TryRecvError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TryRecvError::Empty => write!(f, "no message available"),
      TryRecvError::Closed => write!(f, "receiving on a closed, drained channel"),
    }
  }
}
