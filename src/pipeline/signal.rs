//! Cancellation signal shared by every relay of one pipeline execution.
//!
//! Fire-once, observed-forever. Reads go through an atomic flag and a broadcast-close channel,
//! so observers never take a lock; only the single transition from unset to set touches the
//! trigger slot.

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, after, bounded, select};
use log::debug;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

struct DoneInner {
    fired: AtomicBool,
    /// Sole sender of `closed_rx`. Taken and dropped on fire, which disconnects every receiver.
    trigger: Mutex<Option<Sender<()>>>,
    closed_rx: Receiver<()>,
}

/// The "done" gate. Clones share the same state; firing any clone fires all of them.
#[derive(Clone)]
pub struct Done {
    inner: Arc<DoneInner>,
}

impl Done {
    pub fn new() -> Self {
        let (trigger, closed_rx) = bounded::<()>(0);
        Self {
            inner: Arc::new(DoneInner {
                fired: AtomicBool::new(false),
                trigger: Mutex::new(Some(trigger)),
                closed_rx,
            }),
        }
    }

    /// A signal that is already set (pipeline cancelled before it starts).
    pub fn fired() -> Self {
        let done = Self::new();
        done.fire();
        done
    }

    /// Set the signal. Idempotent: returns `true` only for the call that actually fired it.
    pub fn fire(&self) -> bool {
        if self.inner.fired.swap(true, Ordering::AcqRel) {
            return false;
        }
        let mut slot = self
            .inner
            .trigger
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        slot.take();
        true
    }

    /// Lock-free check.
    pub fn is_fired(&self) -> bool {
        self.inner.fired.load(Ordering::Acquire)
    }

    /// Receiver that becomes permanently ready (disconnected) once the signal fires.
    /// Use as a `recv` arm in `crossbeam_channel::select!`.
    pub fn receiver(&self) -> &Receiver<()> {
        &self.inner.closed_rx
    }

    /// Block until the signal fires.
    pub fn wait(&self) {
        let _ = self.inner.closed_rx.recv();
    }

    /// Block until the signal fires or `timeout` elapses. Returns whether it fired.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        match self.inner.closed_rx.recv_timeout(timeout) {
            Err(RecvTimeoutError::Disconnected) => true,
            _ => self.is_fired(),
        }
    }

    /// Fire the signal after `deadline` unless something else fires it first.
    /// The deadline thread exits as soon as the signal is set either way.
    pub fn fire_after(&self, deadline: Duration) -> JoinHandle<()> {
        let done = self.clone();
        thread::spawn(move || {
            select! {
                recv(done.receiver()) -> _ => {}
                recv(after(deadline)) -> _ => {
                    if done.fire() {
                        debug!("deadline of {:?} reached, cancelling pipeline", deadline);
                    }
                }
            }
        })
    }
}

impl Default for Done {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Done {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Done")
            .field("fired", &self.is_fired())
            .finish()
    }
}
