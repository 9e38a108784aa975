//=========================================================================
// Pending Results
//=========================================================================
//
// One-shot completion handles for vendor operations.
//
// Architecture:
//   vendor SDK (any thread) ── Completer::complete() ──┐
//                                                      ↓ crossbeam (cap 1)
//   core thread ─────────── Pending::poll() each tick ─┘
//
// The core loop never blocks on a vendor call: it polls the handle once
// per tick. Dropping the `Pending` abandons the result; the vendor call
// itself keeps running and its completion is discarded.
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError};
use log::debug;

//=== Completion ==========================================================

/// Outcome of polling a [`Pending`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion<T> {
    /// The operation finished with this value.
    Ready(T),

    /// Still running.
    Waiting,

    /// The completer was dropped without a value.
    Abandoned,
}

//=== Pending / Completer =================================================

/// Receiving side: owned by whoever started the operation.
#[derive(Debug)]
pub struct Pending<T> {
    receiver: Receiver<T>,
}

/// Sending side: handed to the vendor implementation.
#[derive(Debug)]
pub struct Completer<T> {
    sender: Sender<T>,
}

/// Creates a connected completer / pending pair.
pub fn pending<T>() -> (Completer<T>, Pending<T>) {
    let (sender, receiver) = bounded(1);
    (Completer { sender }, Pending { receiver })
}

impl<T> Pending<T> {
    /// A handle that is already complete.
    pub fn ready(value: T) -> Self {
        let (completer, pending) = pending();
        completer.complete(value);
        pending
    }

    /// Non-blocking check for the result.
    pub fn poll(&self) -> Completion<T> {
        match self.receiver.try_recv() {
            Ok(value) => Completion::Ready(value),
            Err(TryRecvError::Empty) => Completion::Waiting,
            Err(TryRecvError::Disconnected) => Completion::Abandoned,
        }
    }
}

impl<T> Completer<T> {
    /// Delivers the result. Returns `false` if nobody is waiting anymore.
    pub fn complete(self, value: T) -> bool {
        if self.sender.send(value).is_err() {
            debug!("Completion discarded: operation was abandoned");
            return false;
        }
        true
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
