use anyhow::Result;
use crossbeam_channel::Receiver;
use log::debug;
use std::thread::JoinHandle;

use super::context::{PipelineHandles, PipelineOpts};
use super::relay::{RelayReport, spawn_relay};
use super::signal::Done;
use super::stage::BoxedStage;

/// Chain `stages` over `input`, wrapping every stage's input in a relay bound to `done`.
/// Returns the last stage's output; relay threads are detached.
///
/// With no stages the input still goes through one relay, so cancellation applies to the
/// identity pipeline too.
pub fn execute_pipeline<T, I>(input: Receiver<T>, done: &Done, stages: I) -> Receiver<T>
where
    T: Send + 'static,
    I: IntoIterator<Item = BoxedStage<T>>,
{
    run_pipeline(input, done, stages, &PipelineOpts::default()).output
}

/// Same wiring as [`execute_pipeline`] but keeps the relay join handles.
/// Caller receives from `output` and should join via [`PipelineHandles::join`] when done.
pub fn run_pipeline<T, I>(
    input: Receiver<T>,
    done: &Done,
    stages: I,
    opts: &PipelineOpts,
) -> PipelineHandles<T>
where
    T: Send + 'static,
    I: IntoIterator<Item = BoxedStage<T>>,
{
    let mut relays = Vec::new();
    let mut sequence = input;
    for (index, stage) in stages.into_iter().enumerate() {
        let relay = spawn_relay(sequence, done, index, opts.relay_capacity);
        relays.push(relay.handle);
        sequence = stage.apply(relay.output);
    }
    if relays.is_empty() {
        let relay = spawn_relay(sequence, done, 0, opts.relay_capacity);
        relays.push(relay.handle);
        sequence = relay.output;
    }
    debug!(
        "pipeline wired: {} relay(s), capacity {}",
        relays.len(),
        opts.relay_capacity
    );
    PipelineHandles {
        output: sequence,
        relays,
    }
}

/// Join relay threads in chain order. A relay that panicked is the only error surfaced here.
pub fn shutdown_pipeline_handles(
    relays: Vec<JoinHandle<RelayReport>>,
) -> Result<Vec<RelayReport>> {
    relays
        .into_iter()
        .enumerate()
        .map(|(index, handle)| {
            handle
                .join()
                .map_err(|_| anyhow::anyhow!("relay-{} thread panicked", index))
        })
        .collect()
}

/// Run the pipeline to completion: collect every output value, then join the relays.
/// Output collected in the order the last stage emitted it.
pub fn collect_pipeline<T, I>(
    input: Receiver<T>,
    done: &Done,
    stages: I,
    opts: &PipelineOpts,
) -> Result<(Vec<T>, Vec<RelayReport>)>
where
    T: Send + 'static,
    I: IntoIterator<Item = BoxedStage<T>>,
{
    let handles = run_pipeline(input, done, stages, opts);
    let values: Vec<T> = handles.output.iter().collect();
    debug!("pipeline output closed, {} value(s) received", values.len());
    let reports = handles.join()?;
    Ok((values, reports))
}
