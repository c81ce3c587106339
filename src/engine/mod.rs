//! Engine module: the CLI host around the pipeline (producers, stage specs, consumer)

pub mod arg_parser;
pub mod cli;
pub mod progress;
pub mod sink;
pub mod source;
pub mod stages;

pub use arg_parser::Cli;
pub use cli::{build_opts, handle_run, run_with_opts};
pub use sink::{consume_output, print_summary};
pub use source::{SourceHandle, spawn_range_source, spawn_reader_source};
pub use stages::{StageSpec, build_stages, parse_stage_specs};
