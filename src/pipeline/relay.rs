//! Cancellable relay: one forwarding thread that makes a sequence cancellation-aware.
//!
//! `Forwarding -> Cancelling -> Draining -> Closed`, `Forwarding -> Exhausted -> Closed`, or
//! `Forwarding -> Abandoned -> Closed` when the downstream receiver is dropped without cancellation.
//! The output sender is owned by the relay thread and dropped exactly once, on `Closed`.

use crossbeam_channel::{Receiver, Sender, bounded, select};
use log::{debug, trace};
use serde::Serialize;
use std::thread::{self, JoinHandle};

use super::drain::drain;
use super::signal::Done;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelayState {
    Forwarding,
    Cancelling,
    Draining,
    Exhausted,
    Abandoned,
    Closed,
}

/// How a relay ended. Not an error either way; the consumer just sees the sequence end.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RelayOutcome {
    /// Input closed with no cancellation.
    Exhausted,
    /// Cancellation fired and upstream was drained.
    Cancelled,
    /// Downstream receiver went away first. Upstream is released undrained; its next send fails.
    Abandoned,
}

/// What one relay thread did over its lifetime. Returned from its join handle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RelayReport {
    /// Position in the chain: relay `i` feeds stage `i`.
    pub index: usize,
    pub forwarded: usize,
    /// Value in hand when cancellation won the handoff (0 or 1).
    pub dropped: usize,
    /// Values read and discarded from upstream after cancellation.
    pub drained: usize,
    pub outcome: RelayOutcome,
}

impl RelayReport {
    fn new(index: usize) -> Self {
        Self {
            index,
            forwarded: 0,
            dropped: 0,
            drained: 0,
            outcome: RelayOutcome::Exhausted,
        }
    }
}

/// Output sequence of a relay plus the handle of the thread feeding it.
pub struct RelayHandle<T> {
    pub output: Receiver<T>,
    pub handle: JoinHandle<RelayReport>,
}

/// Spawn a relay reading `input` and handing values to a fresh `bounded(capacity)` output.
/// Capacity 0 makes every handoff a rendezvous with the downstream reader.
pub fn spawn_relay<T>(
    input: Receiver<T>,
    done: &Done,
    index: usize,
    capacity: usize,
) -> RelayHandle<T>
where
    T: Send + 'static,
{
    let (output_tx, output) = bounded::<T>(capacity);
    let done = done.clone();
    let handle = thread::spawn(move || run_relay_loop(input, output_tx, done, index));
    RelayHandle { output, handle }
}

/// Drive the state machine to `Closed`. The output sender is dropped on return.
pub fn run_relay_loop<T>(
    input: Receiver<T>,
    output: Sender<T>,
    done: Done,
    index: usize,
) -> RelayReport {
    let mut report = RelayReport::new(index);
    let mut state = RelayState::Forwarding;
    while state != RelayState::Closed {
        let next = match state {
            RelayState::Forwarding => forward_next(&input, &output, &done, &mut report),
            RelayState::Cancelling => {
                report.outcome = RelayOutcome::Cancelled;
                RelayState::Draining
            }
            RelayState::Draining => {
                report.drained = drain(&input);
                RelayState::Closed
            }
            RelayState::Exhausted => {
                report.outcome = RelayOutcome::Exhausted;
                RelayState::Closed
            }
            RelayState::Abandoned => {
                report.outcome = RelayOutcome::Abandoned;
                RelayState::Closed
            }
            RelayState::Closed => RelayState::Closed,
        };
        if next != state {
            trace!("relay-{}: {:?} -> {:?}", index, state, next);
        }
        state = next;
    }
    drop(output);
    drop(input);
    debug!(
        "relay-{}: closed ({:?}, forwarded {}, dropped {}, drained {})",
        index, report.outcome, report.forwarded, report.dropped, report.drained
    );
    report
}

/// One round of `Forwarding`: wait for a value or cancellation, then hand the value off while
/// still watching for cancellation.
fn forward_next<T>(
    input: &Receiver<T>,
    output: &Sender<T>,
    done: &Done,
    report: &mut RelayReport,
) -> RelayState {
    if done.is_fired() {
        return RelayState::Cancelling;
    }
    let value = select! {
        recv(done.receiver()) -> _ => return RelayState::Cancelling,
        recv(input) -> msg => match msg {
            Ok(value) => value,
            // Upstream closed because it saw the signal: report as a cancellation.
            Err(_) if done.is_fired() => return RelayState::Cancelling,
            Err(_) => return RelayState::Exhausted,
        },
    };
    // select! picks at random among ready arms; the flag keeps a set signal authoritative.
    if done.is_fired() {
        report.dropped += 1;
        return RelayState::Cancelling;
    }
    select! {
        recv(done.receiver()) -> _ => {
            report.dropped += 1;
            RelayState::Cancelling
        }
        send(output, value) -> res => match res {
            Ok(()) => {
                report.forwarded += 1;
                RelayState::Forwarding
            }
            Err(_) => {
                report.dropped += 1;
                if done.is_fired() {
                    return RelayState::Cancelling;
                }
                // No drain: upstream sees the disconnect once `input` is dropped.
                debug!("relay-{}: downstream closed, releasing upstream", report.index);
                RelayState::Abandoned
            }
        },
    }
}
