//! Application configuration constants.
//! Tuning and defaults in one place.

use std::sync::OnceLock;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    config_filename: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                config_filename: format!(".{pkg}.toml"),
            }
        })
    }

    /// Config file looked up in the working directory (e.g. `.relaypipe.toml`).
    pub fn config_filename(&self) -> &str {
        &self.config_filename
    }
}

// ---- Channels ----

/// Relay output capacity. 0 = rendezvous: a value is handed off only when downstream takes it.
pub const DEFAULT_RELAY_CAPACITY: usize = 0;

/// Capacity of the channel between the CLI producer and the first relay.
pub const SOURCE_CHANNEL_CAP: usize = 0;

// ---- Progress ----

pub struct ProgressConsts;

impl ProgressConsts {
    /// Values received between progress bar refreshes (reduce lock contention).
    pub const PROGRESS_UPDATE_BATCH_SIZE: usize = 100;
}

// ---- Stage specs ----

/// Upper bound for `delay:MS` so a typo can't park a stage for hours.
pub const MAX_STAGE_DELAY_MS: u64 = 60_000;
