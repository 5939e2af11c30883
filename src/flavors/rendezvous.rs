// src/flavors/rendezvous.rs

//! The unbuffered channel flavor: a rendezvous barrier that pairs exactly
//! one sender with exactly one receiver per handshake.
//!
//! The first-arrived peer publishes a pointer to its own message buffer
//! together with its polarity and parks on `handoff`. A peer of the opposite
//! polarity performs the copy through that pointer, marks the barrier done,
//! and signals `handoff`. Peers of the same polarity, and anyone arriving
//! while the barrier drains, park on `chain` until the first peer resumes
//! and resets the barrier. Advertising the needed polarity in the phase is
//! what keeps a wrong-polarity peer deferring instead of flipping the state.

use crate::error::{RecvError, SendError, TryRecvError, TrySendError};
use crate::observer::ObserverRegistry;
use crate::telemetry;

use log::trace;
use parking_lot::{Condvar, Mutex, MutexGuard};
use std::ptr;

const LOC_RENDEZVOUS: &str = "rendezvous";
const EVT_PUBLISHED: &str = "Barrier:Published";
const EVT_PAIRED: &str = "Barrier:Paired";

/// Barrier phase. The slot pointer lives inside the waiting variants, so
/// "one peer waiting" and "slot present" cannot disagree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Phase {
  /// No handshake in flight.
  Idle,
  /// A sender is parked; the pointer is the source of one message.
  SenderWaiting(*const u8),
  /// A receiver is parked; the pointer is the destination for one message.
  ReceiverWaiting(*mut u8),
  /// The copy is done; transient until the first peer resumes and resets.
  Done,
}

pub(crate) struct BarrierState {
  pub(crate) phase: Phase,
  pub(crate) closed: bool,
}

// The slot pointers are dereferenced only by the peer that observes the
// matching phase under the state lock, while the pointer's owner is parked
// inside the handshake on this same channel. The owner clears the phase
// before its buffer goes out of scope.
unsafe impl Send for BarrierState {}

pub(crate) struct RendezvousChannel {
  pub(crate) state: Mutex<BarrierState>,
  /// The first-arrived peer parks here; its partner signals after the copy.
  pub(crate) handoff: Condvar,
  /// Wrong-polarity and third-and-later arrivals park here; broadcast when
  /// the barrier returns to idle.
  pub(crate) chain: Condvar,
  pub(crate) observers: ObserverRegistry,
  msg_len: usize,
}

impl RendezvousChannel {
  pub(crate) fn new(msg_len: usize) -> Self {
    RendezvousChannel {
      state: Mutex::new(BarrierState {
        phase: Phase::Idle,
        closed: false,
      }),
      handoff: Condvar::new(),
      chain: Condvar::new(),
      observers: ObserverRegistry::new(),
      msg_len,
    }
  }

  #[inline]
  pub(crate) fn msg_len(&self) -> usize {
    self.msg_len
  }

  pub(crate) fn is_closed(&self) -> bool {
    self.state.lock().closed
  }

  /// True while a send right now would block: nothing is buffered at a
  /// rendezvous, so a send completes immediately only when a receiver is
  /// already parked at the barrier.
  pub(crate) fn is_full(&self) -> bool {
    !matches!(self.state.lock().phase, Phase::ReceiverWaiting(_))
  }

  /// Blocks until a receiver takes the message or the channel closes.
  pub(crate) fn send(&self, msg: &[u8]) -> Result<(), SendError> {
    let mut state = self.state.lock();
    loop {
      if state.closed {
        trace!("send on closed rendezvous channel rejected");
        return Err(SendError::Closed);
      }
      match state.phase {
        Phase::Idle => {
          state.phase = Phase::SenderWaiting(msg.as_ptr());
          telemetry::log_event(None, LOC_RENDEZVOUS, EVT_PUBLISHED, None);
          // Unlock before waking observers: a woken selector must be able
          // to take the lock on its next scan, or the wakeup is wasted and
          // never repeated. The wait below re-checks under the re-acquired
          // lock, so a handshake completing in the gap is not missed.
          drop(state);
          self.observers.notify_all();
          state = self.state.lock();
          while !state.closed && state.phase != Phase::Done {
            self.handoff.wait(&mut state);
          }
          let delivered = state.phase == Phase::Done;
          state.phase = Phase::Idle;
          drop(state);
          // Broadcast: the deferred peers are of mixed polarity, and waking
          // only one could pick the polarity that cannot make progress.
          self.chain.notify_all();
          return if delivered { Ok(()) } else { Err(SendError::Closed) };
        }
        Phase::ReceiverWaiting(_) => {
          self.finish_send(state, msg);
          return Ok(());
        }
        Phase::SenderWaiting(_) | Phase::Done => {
          self.chain.wait(&mut state);
        }
      }
    }
  }

  /// Blocks until a sender hands a message over or the channel closes; a
  /// closed channel zero-fills the output.
  pub(crate) fn recv(&self, out: &mut [u8]) -> Result<(), RecvError> {
    let mut state = self.state.lock();
    loop {
      if state.closed {
        out.fill(0);
        return Err(RecvError::Closed);
      }
      match state.phase {
        Phase::Idle => {
          state.phase = Phase::ReceiverWaiting(out.as_mut_ptr());
          telemetry::log_event(None, LOC_RENDEZVOUS, EVT_PUBLISHED, None);
          // Same unlock-then-notify discipline as the sending side.
          drop(state);
          self.observers.notify_all();
          state = self.state.lock();
          while !state.closed && state.phase != Phase::Done {
            self.handoff.wait(&mut state);
          }
          let delivered = state.phase == Phase::Done;
          state.phase = Phase::Idle;
          drop(state);
          self.chain.notify_all();
          if delivered {
            return Ok(());
          }
          out.fill(0);
          return Err(RecvError::Closed);
        }
        Phase::SenderWaiting(_) => {
          self.finish_recv(state, out);
          return Ok(());
        }
        Phase::ReceiverWaiting(_) | Phase::Done => {
          self.chain.wait(&mut state);
        }
      }
    }
  }

  pub(crate) fn try_send(&self, msg: &[u8]) -> Result<(), TrySendError> {
    let state = self.state.lock();
    if state.closed {
      return Err(TrySendError::Closed);
    }
    match state.phase {
      Phase::ReceiverWaiting(_) => {
        self.finish_send(state, msg);
        Ok(())
      }
      _ => Err(TrySendError::Full),
    }
  }

  pub(crate) fn try_recv(&self, out: &mut [u8]) -> Result<(), TryRecvError> {
    let state = self.state.lock();
    if state.closed {
      out.fill(0);
      return Err(TryRecvError::Closed);
    }
    match state.phase {
      Phase::SenderWaiting(_) => {
        self.finish_recv(state, out);
        Ok(())
      }
      _ => Err(TryRecvError::Empty),
    }
  }

  /// Completes a handshake with a parked receiver. Caller must have
  /// observed `Phase::ReceiverWaiting` under `state`.
  pub(crate) fn finish_send(&self, mut state: MutexGuard<'_, BarrierState>, msg: &[u8]) {
    let dst = match state.phase {
      Phase::ReceiverWaiting(dst) => dst,
      _ => unreachable!("rendezvous send committed without a waiting receiver"),
    };
    // Safety: the receiver owning `dst` is parked on `handoff` of this
    // channel and its buffer is `msg_len` bytes; we hold the state lock, so
    // the phase cannot change under us.
    unsafe {
      ptr::copy_nonoverlapping(msg.as_ptr(), dst, self.msg_len);
    }
    state.phase = Phase::Done;
    drop(state);
    telemetry::log_event(None, LOC_RENDEZVOUS, EVT_PAIRED, None);
    self.observers.notify_all();
    self.handoff.notify_one();
  }

  /// Completes a handshake with a parked sender. Caller must have observed
  /// `Phase::SenderWaiting` under `state`.
  pub(crate) fn finish_recv(&self, mut state: MutexGuard<'_, BarrierState>, out: &mut [u8]) {
    let src = match state.phase {
      Phase::SenderWaiting(src) => src,
      _ => unreachable!("rendezvous receive committed without a waiting sender"),
    };
    // Safety: the sender owning `src` is parked on `handoff` of this channel
    // and its message is `msg_len` bytes; we hold the state lock.
    unsafe {
      ptr::copy_nonoverlapping(src, out.as_mut_ptr(), self.msg_len);
    }
    state.phase = Phase::Done;
    drop(state);
    telemetry::log_event(None, LOC_RENDEZVOUS, EVT_PAIRED, None);
    self.observers.notify_all();
    self.handoff.notify_one();
  }

  /// Idempotent. Wakes every parked peer and every observer.
  pub(crate) fn close(&self) {
    let mut state = self.state.lock();
    let already = state.closed;
    state.closed = true;
    drop(state);
    if !already {
      trace!("rendezvous channel closed");
    }
    self.observers.notify_all();
    self.handoff.notify_all();
    self.chain.notify_all();
  }
}
