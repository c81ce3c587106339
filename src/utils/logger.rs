use colored::Colorize;
use env_logger::Builder;
use log::{Level, LevelFilter};
use std::io::Write;

/// Overrides the crate's own level (e.g. `RELAYPIPE_LOG=trace` to watch relay state changes).
const LEVEL_ENV: &str = "RELAYPIPE_LOG";

/// Level for this crate's modules: env override, else debug when verbose, else info.
pub fn crate_level(verbose: bool) -> LevelFilter {
    std::env::var(LEVEL_ENV)
        .ok()
        .and_then(|s| s.trim().parse::<LevelFilter>().ok())
        .unwrap_or(if verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
}

/// Install the logger. Dependencies log warnings only; `RUST_LOG` still applies on top.
/// Safe to call more than once (later calls are ignored).
pub fn setup_logging(verbose: bool) {
    let _ = Builder::from_default_env()
        .filter_level(LevelFilter::Warn)
        .filter_module(env!("CARGO_PKG_NAME"), crate_level(verbose))
        .format(|buf, record| {
            let name = env!("CARGO_PKG_NAME").cyan();
            let line = match record.level() {
                Level::Error => format!("[{} {}] {}", name, "ERROR".red(), record.args()),
                Level::Warn => format!("[{} {}] {}", name, "WARN".yellow(), record.args()),
                Level::Trace => format!(
                    "[{} {} {}] {}",
                    name,
                    "TRACE".dimmed(),
                    record.target().white(),
                    record.args()
                ),
                Level::Info | Level::Debug => format!("[{}] {}", name, record.args()),
            };
            writeln!(buf, "{}", line)
        })
        .try_init();
}
