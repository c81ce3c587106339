//! Staged pipeline engine: cancellation signal, relays, drain policy, stage contract, composer.

pub mod context;
pub mod drain;
pub mod orchestrator;
pub mod relay;
pub mod signal;
pub mod stage;

pub use context::{PipelineHandles, PipelineOpts};
pub use drain::drain;
pub use orchestrator::{
    collect_pipeline, execute_pipeline, run_pipeline, shutdown_pipeline_handles,
};
pub use relay::{RelayHandle, RelayOutcome, RelayReport, RelayState, run_relay_loop, spawn_relay};
pub use signal::Done;
pub use stage::{BoxedStage, Stage, boxed_stage, filter_stage, inspect_stage, map_stage};
