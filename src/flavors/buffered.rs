// src/flavors/buffered.rs

//! The buffered channel flavor: a byte ring guarded by one data mutex, with
//! `not_full` / `not_empty` condvars and an observer registry for selectors.
//!
//! Wake order after a completed operation is observers first, then the
//! in-channel condvar. Observers are selectors, which do not dispose of
//! channels; waking them first shortens the window in which a racing peer
//! could tear the channel down before the condvar signal lands.

use crate::error::{RecvError, SendError, TryRecvError, TrySendError};
use crate::observer::ObserverRegistry;
use crate::ring::ByteRing;

use log::trace;
use parking_lot::{Condvar, Mutex, MutexGuard};

pub(crate) struct BufferedState {
  pub(crate) ring: ByteRing,
  pub(crate) closed: bool,
}

pub(crate) struct BufferedChannel {
  pub(crate) state: Mutex<BufferedState>,
  /// Senders blocked on a full ring; signaled after a pop and on close.
  pub(crate) not_full: Condvar,
  /// Receivers blocked on an empty ring; signaled after a push and on close.
  pub(crate) not_empty: Condvar,
  pub(crate) observers: ObserverRegistry,
  msg_len: usize,
  capacity: usize,
}

impl BufferedChannel {
  pub(crate) fn new(capacity: usize, msg_len: usize) -> Self {
    BufferedChannel {
      state: Mutex::new(BufferedState {
        ring: ByteRing::new(capacity, msg_len),
        closed: false,
      }),
      not_full: Condvar::new(),
      not_empty: Condvar::new(),
      observers: ObserverRegistry::new(),
      msg_len,
      capacity,
    }
  }

  #[inline]
  pub(crate) fn msg_len(&self) -> usize {
    self.msg_len
  }

  #[inline]
  pub(crate) fn capacity(&self) -> usize {
    self.capacity
  }

  pub(crate) fn len(&self) -> usize {
    self.state.lock().ring.len()
  }

  pub(crate) fn is_empty(&self) -> bool {
    self.state.lock().ring.is_empty()
  }

  pub(crate) fn is_full(&self) -> bool {
    self.state.lock().ring.is_full()
  }

  pub(crate) fn is_closed(&self) -> bool {
    self.state.lock().closed
  }

  /// Blocks while the ring is full and the channel is open.
  pub(crate) fn send(&self, msg: &[u8]) -> Result<(), SendError> {
    let mut state = self.state.lock();
    loop {
      if state.closed {
        trace!("send on closed buffered channel rejected");
        return Err(SendError::Closed);
      }
      if !state.ring.is_full() {
        self.finish_send(state, msg);
        return Ok(());
      }
      self.not_full.wait(&mut state);
    }
  }

  /// Blocks while the ring is empty and the channel is open. Messages
  /// enqueued before close remain receivable; once closed and drained the
  /// output is zero-filled and `Err(Closed)` is returned.
  pub(crate) fn recv(&self, out: &mut [u8]) -> Result<(), RecvError> {
    let mut state = self.state.lock();
    loop {
      if !state.ring.is_empty() {
        self.finish_recv(state, out);
        return Ok(());
      }
      if state.closed {
        out.fill(0);
        return Err(RecvError::Closed);
      }
      self.not_empty.wait(&mut state);
    }
  }

  pub(crate) fn try_send(&self, msg: &[u8]) -> Result<(), TrySendError> {
    let state = self.state.lock();
    if state.closed {
      return Err(TrySendError::Closed);
    }
    if state.ring.is_full() {
      return Err(TrySendError::Full);
    }
    self.finish_send(state, msg);
    Ok(())
  }

  pub(crate) fn try_recv(&self, out: &mut [u8]) -> Result<(), TryRecvError> {
    let state = self.state.lock();
    if !state.ring.is_empty() {
      self.finish_recv(state, out);
      return Ok(());
    }
    if state.closed {
      out.fill(0);
      return Err(TryRecvError::Closed);
    }
    Err(TryRecvError::Empty)
  }

  /// Completes a send whose readiness the caller has already established
  /// under `state`: push, unlock, wake observers, wake one receiver.
  pub(crate) fn finish_send(&self, mut state: MutexGuard<'_, BufferedState>, msg: &[u8]) {
    state.ring.push(msg);
    drop(state);
    self.observers.notify_all();
    self.not_empty.notify_one();
  }

  /// Completes a receive whose readiness the caller has already established
  /// under `state`: pop, unlock, wake observers, wake one sender.
  pub(crate) fn finish_recv(&self, mut state: MutexGuard<'_, BufferedState>, out: &mut [u8]) {
    state.ring.pop(out);
    drop(state);
    self.observers.notify_all();
    self.not_full.notify_one();
  }

  /// Idempotent. Wakes every waiter and every observer; `notify_all`, never
  /// `notify_one`, so no waiter can be left behind.
  pub(crate) fn close(&self) {
    let mut state = self.state.lock();
    let already = state.closed;
    state.closed = true;
    drop(state);
    if !already {
      trace!("buffered channel closed");
    }
    self.observers.notify_all();
    self.not_full.notify_all();
    self.not_empty.notify_all();
  }
}
