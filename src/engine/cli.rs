//! CLI command handler: build producer, stages and consumer around the pipeline engine.

use anyhow::{Context, Result, bail};
use log::{debug, info, warn};
use std::io::{self, BufReader};
use std::path::Path;
use std::time::{Duration, Instant};

use crate::engine::arg_parser::Cli;
use crate::engine::progress::{create_counter, create_progress_bar};
use crate::engine::sink::{consume_output, print_summary};
use crate::engine::source::{SourceHandle, spawn_range_source, spawn_reader_source};
use crate::engine::stages::{build_stages, parse_stage_specs};
use crate::pipeline::{Done, PipelineOpts, RelayOutcome, run_pipeline};
use crate::utils::config::SOURCE_CHANNEL_CAP;
use crate::utils::{apply_file_to_opts, default_config_path, load_pipeline_toml, setup_logging};
use crate::{Opts, RunSummary};

/// Merge defaults, config file, then CLI flags (flags win).
pub fn build_opts(cli: &Cli) -> Result<Opts> {
    let mut opts = Opts::default();
    let config_path = match cli.config {
        Some(ref p) => {
            if !p.is_file() {
                bail!("config file {} not found", p.display());
            }
            p.clone()
        }
        None => default_config_path(Path::new(".")),
    };
    if let Some(file) = load_pipeline_toml(&config_path)? {
        apply_file_to_opts(&file, &mut opts);
    }
    apply_cli_to_opts(cli, &mut opts);
    Ok(opts)
}

fn apply_cli_to_opts(cli: &Cli, opts: &mut Opts) {
    if !cli.stages.is_empty() {
        opts.stages = cli.stages.clone();
    }
    if let Some(from) = cli.from {
        opts.from = from;
    }
    if cli.count.is_some() {
        opts.count = cli.count;
    }
    opts.read_stdin |= cli.stdin;
    if cli.timeout_ms.is_some() {
        opts.timeout_ms = cli.timeout_ms;
    }
    if let Some(cap) = cli.capacity {
        opts.relay_capacity = cap;
    }
    if let Some(json) = cli.json {
        opts.json = json;
    }
    if let Some(verbose) = cli.verbose {
        opts.verbose = verbose;
    }
}

/// Run the pipeline described by `opts` with `done` as its cancellation signal, writing values
/// to `out`. Returns the summary once every relay has been joined.
pub fn run_with_opts<W: io::Write>(opts: &Opts, done: &Done, out: &mut W) -> Result<RunSummary> {
    let specs = parse_stage_specs(&opts.stages)?;
    debug!(
        "stages: [{}]",
        specs
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );

    if let Some(ms) = opts.timeout_ms {
        done.fire_after(Duration::from_millis(ms));
    } else if opts.count.is_none() && !opts.read_stdin {
        info!("No count or timeout given: producing until Ctrl+C");
    }

    let start = Instant::now();
    let SourceHandle { values, handle } = if opts.read_stdin {
        spawn_reader_source(BufReader::new(io::stdin()), done, SOURCE_CHANNEL_CAP)
    } else {
        spawn_range_source(opts.from, opts.count, done, SOURCE_CHANNEL_CAP)
    };

    let handles = run_pipeline(
        values,
        done,
        build_stages(&specs),
        &PipelineOpts {
            relay_capacity: opts.relay_capacity,
        },
    );

    let bar = opts.verbose.then(|| match opts.count {
        Some(total) if !opts.read_stdin => create_progress_bar("Receiving", total as usize),
        _ => create_counter("Receiving"),
    });
    let received = match consume_output(&handles.output, opts.json, bar.as_ref(), out) {
        Ok(n) => n,
        Err(e) => {
            // Stop the producer; relays drain and exit on their own.
            done.fire();
            return Err(e);
        }
    };

    let relays = handles.join()?;
    // A deadline that fires after the last relay closed did not cut the run short.
    let cancelled = relays
        .iter()
        .any(|r| r.outcome == RelayOutcome::Cancelled);
    let produced = handle
        .join()
        .map_err(|_| anyhow::anyhow!("source thread panicked"))?;

    Ok(RunSummary {
        received,
        produced,
        cancelled,
        elapsed_ms: start.elapsed().as_millis(),
        relays,
    })
}

/// Run the CLI: Ctrl+C fires the pipeline's cancellation signal.
pub fn handle_run(cli: &Cli) -> Result<()> {
    let opts = build_opts(cli)?;
    setup_logging(opts.verbose);

    let done = Done::new();
    let handler_done = done.clone();
    ctrlc::set_handler(move || {
        handler_done.fire();
    })
    .context("set Ctrl+C handler")?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let summary = run_with_opts(&opts, &done, &mut out)?;
    if summary.cancelled {
        warn!(
            "Pipeline cancelled; output ended early after {} value(s)",
            summary.received
        );
    }
    print_summary(&summary, opts.json, &mut out)?;
    Ok(())
}
