//! Pipeline options and the handles returned for hosts that want to join relay threads.

use crossbeam_channel::Receiver;
use std::thread::JoinHandle;

use super::relay::RelayReport;
use crate::utils::config::DEFAULT_RELAY_CAPACITY;

/// Wiring options for [`run_pipeline`](super::run_pipeline).
#[derive(Clone, Debug)]
pub struct PipelineOpts {
    /// Buffer size of every relay output channel. 0 = unbuffered rendezvous handoff.
    pub relay_capacity: usize,
}

impl Default for PipelineOpts {
    fn default() -> Self {
        Self {
            relay_capacity: DEFAULT_RELAY_CAPACITY,
        }
    }
}

/// Handles returned by [`run_pipeline`](super::run_pipeline): receive from `output`, then join.
/// `relays[i]` is the relay feeding stage `i` (one relay when there are no stages).
pub struct PipelineHandles<T> {
    pub output: Receiver<T>,
    pub relays: Vec<JoinHandle<RelayReport>>,
}

impl<T> PipelineHandles<T> {
    /// Join all relay threads. Call after `output` is drained or dropped.
    pub fn join(self) -> crate::Result<Vec<RelayReport>> {
        let PipelineHandles { output, relays } = self;
        drop(output);
        super::shutdown_pipeline_handles(relays)
    }
}
