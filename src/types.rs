//! Host-side types: run options and the end-of-run summary.

use serde::Serialize;

use crate::pipeline::RelayReport;

/// Full options for one CLI run (file config overlaid with flags).
#[derive(Clone, Debug)]
pub struct Opts {
    /// Stage specs in chain order, e.g. `["mul:2", "even"]`.
    pub stages: Vec<String>,
    /// First value of the range producer.
    pub from: i64,
    /// Number of values to produce. `None` = unbounded (run until cancelled).
    pub count: Option<u64>,
    /// Read values from stdin (one integer per line) instead of the range.
    pub read_stdin: bool,
    /// Cancel the pipeline after this many milliseconds.
    pub timeout_ms: Option<u64>,
    /// Relay output channel capacity.
    pub relay_capacity: usize,
    /// Print values and summary as JSON lines.
    pub json: bool,
    /// Debug logging and progress counter.
    pub verbose: bool,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            stages: Vec::new(),
            from: 1,
            count: None,
            read_stdin: false,
            timeout_ms: None,
            relay_capacity: crate::utils::config::DEFAULT_RELAY_CAPACITY,
            json: false,
            verbose: false,
        }
    }
}

/// What the consumer saw, plus per-relay reports once the relays are joined.
#[derive(Clone, Debug, Serialize)]
pub struct RunSummary {
    pub received: usize,
    pub produced: usize,
    pub cancelled: bool,
    pub elapsed_ms: u128,
    pub relays: Vec<RelayReport>,
}
