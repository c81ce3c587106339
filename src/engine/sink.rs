//! Consumer side of the CLI: drain the output sequence and report.

use anyhow::{Context, Result};
use crossbeam_channel::Receiver;
use serde::Serialize;
use std::io::Write;

use super::progress::{ProgressBar, flush_progress_remainder, report_progress_batched};
use crate::RunSummary;
use crate::utils::config::ProgressConsts;

#[derive(Serialize)]
struct ValueLine {
    value: i64,
}

/// Write every value from `output` to `out` until the sequence closes. Returns the count.
/// A write error (e.g. closed stdout) stops consumption; the caller should cancel the pipeline.
pub fn consume_output<W: Write>(
    output: &Receiver<i64>,
    json: bool,
    bar: Option<&ProgressBar>,
    out: &mut W,
) -> Result<usize> {
    let chunk = ProgressConsts::PROGRESS_UPDATE_BATCH_SIZE;
    let mut received = 0_usize;
    for value in output.iter() {
        if json {
            serde_json::to_writer(&mut *out, &ValueLine { value }).context("write value")?;
            writeln!(out).context("write value")?;
        } else {
            writeln!(out, "{}", value).context("write value")?;
        }
        received += 1;
        report_progress_batched(bar, received, chunk);
    }
    out.flush().context("flush output")?;
    flush_progress_remainder(bar, received, chunk);
    Ok(received)
}

/// JSON summary on `out`, or a debug log line in plain mode.
pub fn print_summary<W: Write>(summary: &RunSummary, json: bool, out: &mut W) -> Result<()> {
    if json {
        serde_json::to_writer(&mut *out, summary).context("write summary")?;
        writeln!(out).context("write summary")?;
        return Ok(());
    }
    log::debug!(
        "received {} of {} produced value(s) in {} ms{}",
        summary.received,
        summary.produced,
        summary.elapsed_ms,
        if summary.cancelled { " (cancelled)" } else { "" }
    );
    for r in &summary.relays {
        log::debug!(
            "  relay-{}: {:?}, forwarded {}, dropped {}, drained {}",
            r.index,
            r.outcome,
            r.forwarded,
            r.dropped,
            r.drained
        );
    }
    Ok(())
}
