pub mod config;
pub mod logger;
pub mod pipeline_toml;

pub use config::*;
pub use logger::setup_logging;
pub use pipeline_toml::{
    PipelineToml, apply_file_to_opts, default_config_path, load_pipeline_toml, parse_pipeline_toml,
};
