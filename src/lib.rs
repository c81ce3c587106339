//! relaypipe: concurrent staged-pipeline engine with a single cooperative cancellation signal.
//!
//! Every stage runs on its own thread and receives its input through a relay that watches the
//! shared [`Done`] signal. Once the signal fires no relay forwards another value; each one drains
//! its upstream until it closes, so producers blocked mid-handoff are released instead of leaked.

pub mod engine;
pub mod pipeline;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use types::*;

pub use pipeline::{
    BoxedStage, Done, PipelineHandles, PipelineOpts, RelayOutcome, RelayReport, Stage,
    boxed_stage, collect_pipeline, execute_pipeline, filter_stage, inspect_stage, map_stage,
    run_pipeline,
};

/// Result alias used by public relaypipe API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Single entry point: wire `stages` over `input` under `done` and return the final sequence.
///
/// The consumer sees the sequence end early when `done` fires; nothing is reported as an error.
/// Each stage is applied exactly once, in order; stage `i` reads what stage `i - 1` produced.
///
/// ```
/// let (tx, rx) = crossbeam_channel::unbounded();
/// for v in 1..=5 { tx.send(v).unwrap(); }
/// drop(tx);
/// let done = relaypipe::Done::new();
/// let double = || relaypipe::map_stage(|v: i64| v * 2);
/// let out = relaypipe::execute(rx, &done, vec![double(), double(), double()]);
/// assert_eq!(out.iter().collect::<Vec<_>>(), vec![8, 16, 24, 32, 40]);
/// ```
pub fn execute<T, I>(
    input: crossbeam_channel::Receiver<T>,
    done: &Done,
    stages: I,
) -> crossbeam_channel::Receiver<T>
where
    T: Send + 'static,
    I: IntoIterator<Item = BoxedStage<T>>,
{
    log::debug!("{} executing pipeline", env!("CARGO_PKG_NAME"));
    execute_pipeline(input, done, stages)
}
