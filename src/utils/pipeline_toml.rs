//! Load `.relaypipe.toml` from a directory (CLI only). The library never reads it; embedding
//! code passes [`PipelineOpts`](crate::pipeline::PipelineOpts) directly.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::Opts;
use crate::utils::config::PackagePaths;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineToml {
    #[serde(default)]
    settings: RunSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RunSection {
    stages: Option<Vec<String>>,
    from: Option<i64>,
    count: Option<u64>,
    timeout_ms: Option<u64>,
    relay_capacity: Option<usize>,
    json: Option<bool>,
    verbose: Option<bool>,
}

/// Default config location: the package config filename inside `dir`.
pub fn default_config_path(dir: &Path) -> PathBuf {
    dir.join(PackagePaths::get().config_filename())
}

/// Load config from `path`. `Ok(None)` when the file does not exist; a malformed file is an error.
pub fn load_pipeline_toml(path: &Path) -> Result<Option<PipelineToml>> {
    if !path.is_file() {
        return Ok(None);
    }
    let s = std::fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    let file =
        parse_pipeline_toml(&s).with_context(|| format!("parse config {}", path.display()))?;
    Ok(Some(file))
}

pub fn parse_pipeline_toml(s: &str) -> std::result::Result<PipelineToml, toml::de::Error> {
    toml::from_str(s)
}

/// Overwrite opts field from file when present.
macro_rules! apply_file_opt {
    ($sec:expr, $opts:expr, $sec_field:ident => $opts_field:ident) => {
        if let Some(v) = $sec.$sec_field {
            $opts.$opts_field = v;
        }
    };
}

/// Apply file config to opts (only fields present in the file). Call before applying CLI.
pub fn apply_file_to_opts(file: &PipelineToml, opts: &mut Opts) {
    let sec = &file.settings;
    if let Some(ref stages) = sec.stages {
        opts.stages = stages.clone();
    }
    apply_file_opt!(sec, opts, from => from);
    if sec.count.is_some() {
        opts.count = sec.count;
    }
    if sec.timeout_ms.is_some() {
        opts.timeout_ms = sec.timeout_ms;
    }
    apply_file_opt!(sec, opts, relay_capacity => relay_capacity);
    apply_file_opt!(sec, opts, json => json);
    apply_file_opt!(sec, opts, verbose => verbose);
}
