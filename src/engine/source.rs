//! Producers for the CLI. Both honor the cancellation signal on every handoff and close their
//! sequence when they stop, so the first relay's drain always finishes.

use crossbeam_channel::{Receiver, Sender, bounded, select};
use log::{debug, warn};
use std::io::BufRead;
use std::thread::{self, JoinHandle};

use crate::pipeline::Done;

/// Producer output plus the thread feeding it. The handle yields the number of values sent.
pub struct SourceHandle {
    pub values: Receiver<i64>,
    pub handle: JoinHandle<usize>,
}

/// Hand `value` to `tx` unless cancellation fires first. `false` = stop producing.
fn send_or_cancel(tx: &Sender<i64>, value: i64, done: &Done) -> bool {
    if done.is_fired() {
        return false;
    }
    select! {
        recv(done.receiver()) -> _ => false,
        send(tx, value) -> res => res.is_ok(),
    }
}

/// Emit `from, from + 1, ...`; `count: None` runs until cancelled (or `i64::MAX`).
pub fn spawn_range_source(
    from: i64,
    count: Option<u64>,
    done: &Done,
    capacity: usize,
) -> SourceHandle {
    let (tx, values) = bounded::<i64>(capacity);
    let done = done.clone();
    let handle = thread::spawn(move || {
        let mut sent = 0_usize;
        let mut next = Some(from);
        while let Some(value) = next {
            if count.is_some_and(|c| sent as u64 >= c) {
                break;
            }
            if !send_or_cancel(&tx, value, &done) {
                debug!("source: stopped after {} value(s)", sent);
                break;
            }
            sent += 1;
            next = value.checked_add(1);
        }
        sent
    });
    SourceHandle { values, handle }
}

/// Emit one integer per non-empty line of `reader`; unparsable lines are skipped with a warning.
///
/// Reading blocks outside the signal's reach, so lines are read on a detached helper thread and
/// the forwarding thread only ever waits on channels. On cancellation the forwarder closes the
/// sequence right away; the helper exits on its next failed send (or at EOF).
pub fn spawn_reader_source<R>(reader: R, done: &Done, capacity: usize) -> SourceHandle
where
    R: BufRead + Send + 'static,
{
    let (line_tx, line_rx) = bounded::<String>(0);
    thread::spawn(move || {
        for line in reader.lines() {
            let Ok(line) = line else { break };
            if line_tx.send(line).is_err() {
                break;
            }
        }
    });

    let (tx, values) = bounded::<i64>(capacity);
    let done = done.clone();
    let handle = thread::spawn(move || {
        let mut sent = 0_usize;
        loop {
            let line = select! {
                recv(done.receiver()) -> _ => break,
                recv(line_rx) -> msg => match msg {
                    Ok(line) => line,
                    Err(_) => break,
                },
            };
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let value = match trimmed.parse::<i64>() {
                Ok(v) => v,
                Err(e) => {
                    warn!("skipping input line {:?}: {}", trimmed, e);
                    continue;
                }
            };
            if !send_or_cancel(&tx, value, &done) {
                break;
            }
            sent += 1;
        }
        debug!("source: stdin forwarder done after {} value(s)", sent);
        sent
    });
    SourceHandle { values, handle }
}
