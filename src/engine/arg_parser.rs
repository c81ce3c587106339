use clap::Parser;
use std::path::PathBuf;

/// Run integers through a chain of concurrent stages; Ctrl+C or --timeout-ms cancels the whole chain.
#[derive(Clone, Parser)]
#[command(name = "relaypipe")]
#[command(about = "Run a staged pipeline over a range (or stdin); stages run concurrently.")]
pub struct Cli {
    /// Stage specs in chain order: mul:N add:N sub:N div:N neg square even odd delay:MS.
    /// Overrides `stages` from the config file when given.
    #[arg(value_name = "STAGE")]
    pub stages: Vec<String>,

    /// First value of the range producer. Default: 1.
    #[arg(long, value_parser = clap::value_parser!(i64), allow_negative_numbers = true)]
    pub from: Option<i64>,

    /// Number of values to produce. Omit for an unbounded producer (stop with Ctrl+C or --timeout-ms).
    #[arg(long, short = 'n', value_parser = clap::value_parser!(u64))]
    pub count: Option<u64>,

    /// Read integers from stdin, one per line, instead of the range.
    #[arg(long)]
    pub stdin: bool,

    /// Cancel the pipeline after this many milliseconds.
    #[arg(long, short = 't', value_parser = clap::value_parser!(u64))]
    pub timeout_ms: Option<u64>,

    /// Relay channel capacity (0 = unbuffered handoff).
    #[arg(long, value_parser = clap::value_parser!(usize))]
    pub capacity: Option<usize>,

    /// Config file. Default: `.relaypipe.toml` in the current directory, if present.
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Print values and the run summary as JSON lines.
    #[arg(long, short = 'j', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub json: Option<bool>,

    /// Verbose output (debug logging and a progress counter on stderr).
    #[arg(long, short = 'v', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,
}
